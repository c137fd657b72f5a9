//! Domain types for patient evaluations.

pub mod evaluation;

pub use evaluation::{Evaluation, NewEvaluation, SubScores};
