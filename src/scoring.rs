//! Glasgow Coma Scale scoring.
//!
//! The engine is a set of pure functions over [`SubScores`]: summing the
//! three sub-scores, mapping the total to a severity band, and validating
//! a submission before it is saved.

use thiserror::Error;

use crate::models::SubScores;

/// Valid range for the ocular response.
pub const OCULAR_RANGE: (u8, u8) = (1, 4);
/// Valid range for the verbal response.
pub const VERBAL_RANGE: (u8, u8) = (1, 5);
/// Valid range for the motor response.
pub const MOTOR_RANGE: (u8, u8) = (1, 6);

/// Totals at or below this show the critical alert banner.
/// A score of 8 or less indicates coma; this is an alert threshold on top
/// of the band, not a band of its own.
pub const CRITICAL_ALERT_MAX: u8 = 8;

/// One of the three sub-score fields, for per-field validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ocular,
    Verbal,
    Motor,
}

impl Field {
    pub fn range(&self) -> (u8, u8) {
        match self {
            Field::Ocular => OCULAR_RANGE,
            Field::Verbal => VERBAL_RANGE,
            Field::Motor => MOTOR_RANGE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Ocular => "ocular",
            Field::Verbal => "verbal",
            Field::Motor => "motor",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{} response not selected", .0.name())]
    Missing(Field),

    #[error("{} response {value} outside range {min}-{max}", field.name())]
    OutOfRange { field: Field, value: u8, min: u8, max: u8 },
}

/// Severity band derived from the total score.
///
/// Thresholds (closed intervals, first match high-to-low): 13-15 mild,
/// 9-12 moderate, 3-8 severe. A total of 0 means the evaluation is
/// incomplete. Totals of 1-2 are impossible under valid sub-scores, so
/// there is no band below severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Incomplete,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Map a total score to its band.
    pub fn from_total(total: u8) -> Self {
        if total == 0 {
            Severity::Incomplete
        } else if total >= 13 {
            Severity::Mild
        } else if total >= 9 {
            Severity::Moderate
        } else {
            Severity::Severe
        }
    }
}

/// Sum of the present sub-scores. Missing sub-scores count as 0 for the
/// arithmetic; completeness is checked separately.
pub fn total_score(scores: &SubScores) -> u8 {
    scores.ocular.unwrap_or(0) + scores.verbal.unwrap_or(0) + scores.motor.unwrap_or(0)
}

/// Whether all three sub-scores have been answered.
pub fn is_complete(scores: &SubScores) -> bool {
    scores.ocular.is_some() && scores.verbal.is_some() && scores.motor.is_some()
}

/// Whether the total warrants the critical alert banner.
pub fn is_critical(total: u8) -> bool {
    total > 0 && total <= CRITICAL_ALERT_MAX
}

/// Validate a submission before saving. Every sub-score must be present
/// and within its declared range; the first problem found aborts the save.
pub fn validate(scores: &SubScores) -> Result<(), ValidationError> {
    for (field, value) in [
        (Field::Ocular, scores.ocular),
        (Field::Verbal, scores.verbal),
        (Field::Motor, scores.motor),
    ] {
        let (min, max) = field.range();
        match value {
            None => return Err(ValidationError::Missing(field)),
            Some(v) if v < min || v > max => {
                return Err(ValidationError::OutOfRange { field, value: v, min, max })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_matches_sum_for_all_valid_triples() {
        for o in 1..=4u8 {
            for v in 1..=5u8 {
                for m in 1..=6u8 {
                    let scores = SubScores::new(Some(o), Some(v), Some(m));
                    assert_eq!(total_score(&scores), o + v + m);
                    assert!(is_complete(&scores));
                    assert!(validate(&scores).is_ok());
                }
            }
        }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Severity::from_total(0), Severity::Incomplete);
        assert_eq!(Severity::from_total(3), Severity::Severe);
        assert_eq!(Severity::from_total(8), Severity::Severe);
        assert_eq!(Severity::from_total(9), Severity::Moderate);
        assert_eq!(Severity::from_total(12), Severity::Moderate);
        assert_eq!(Severity::from_total(13), Severity::Mild);
        assert_eq!(Severity::from_total(15), Severity::Mild);
    }

    #[test]
    fn test_every_valid_total_maps_into_a_band() {
        for o in 1..=4u8 {
            for v in 1..=5u8 {
                for m in 1..=6u8 {
                    let band = Severity::from_total(o + v + m);
                    assert_ne!(band, Severity::Incomplete);
                }
            }
        }
    }

    #[test]
    fn test_incomplete_scores_total_partial_sum() {
        let scores = SubScores::new(Some(4), None, Some(6));
        assert_eq!(total_score(&scores), 10);
        assert!(!is_complete(&scores));
    }

    #[test]
    fn test_critical_alert_threshold() {
        assert!(!is_critical(0));
        assert!(is_critical(3));
        assert!(is_critical(8));
        assert!(!is_critical(9));
        assert!(!is_critical(15));
    }

    #[test]
    fn test_validate_reports_missing_field() {
        let scores = SubScores::new(Some(4), None, Some(6));
        assert_eq!(validate(&scores), Err(ValidationError::Missing(Field::Verbal)));
    }

    #[test]
    fn test_validate_reports_out_of_range() {
        let scores = SubScores::new(Some(5), Some(5), Some(6));
        assert_eq!(
            validate(&scores),
            Err(ValidationError::OutOfRange {
                field: Field::Ocular,
                value: 5,
                min: 1,
                max: 4,
            })
        );
    }
}
