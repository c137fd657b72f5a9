// Allow dead code: Record constructors used across store and export
#![allow(dead_code)]

//! Evaluation record types.
//!
//! Field names are serialized in the camelCase form used by the exported
//! data files, so records round-trip with data exported by earlier versions
//! of the application.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The three Glasgow sub-scores. `None` means "not yet answered".
///
/// Valid ranges: ocular 1-4, verbal 1-5, motor 1-6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub ocular: Option<u8>,
    pub verbal: Option<u8>,
    #[serde(rename = "motora")]
    pub motor: Option<u8>,
}

impl SubScores {
    pub fn new(ocular: Option<u8>, verbal: Option<u8>, motor: Option<u8>) -> Self {
        Self {
            ocular,
            verbal,
            motor,
        }
    }
}

/// A stored patient evaluation. Immutable once persisted; the only
/// mutation the store supports is deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Surrogate key assigned by the store on insert. Unique and
    /// monotonically increasing in insertion order.
    pub id: u64,
    #[serde(rename = "patientName")]
    pub patient_name: Option<String>,
    #[serde(rename = "patientAge")]
    pub patient_age: Option<u32>,
    #[serde(rename = "patientId")]
    pub patient_id: Option<String>,
    pub location: Option<String>,
    pub evaluator: Option<String>,
    pub notes: Option<String>,
    pub scores: SubScores,
    /// 0 while any sub-score is missing, otherwise the 3-15 sum.
    #[serde(rename = "totalScore")]
    pub total_score: u8,
    /// Severity band label, localized at save time.
    pub interpretation: String,
    /// Creation time in milliseconds since epoch. The only sort key.
    pub timestamp: i64,
}

impl Evaluation {
    /// Creation time as a `DateTime`, falling back to the epoch for
    /// out-of-range values.
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp)
            .single()
            .unwrap_or_default()
    }
}

/// An evaluation as submitted for saving, before the store assigns an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEvaluation {
    #[serde(rename = "patientName")]
    pub patient_name: Option<String>,
    #[serde(rename = "patientAge")]
    pub patient_age: Option<u32>,
    #[serde(rename = "patientId")]
    pub patient_id: Option<String>,
    pub location: Option<String>,
    pub evaluator: Option<String>,
    pub notes: Option<String>,
    pub scores: SubScores,
    #[serde(rename = "totalScore")]
    pub total_score: u8,
    pub interpretation: String,
    pub timestamp: i64,
}

impl NewEvaluation {
    /// Re-submit an existing record (used by bulk import, which assigns
    /// fresh ids).
    pub fn from_record(record: &Evaluation) -> Self {
        Self {
            patient_name: record.patient_name.clone(),
            patient_age: record.patient_age,
            patient_id: record.patient_id.clone(),
            location: record.location.clone(),
            evaluator: record.evaluator.clone(),
            notes: record.notes.clone(),
            scores: record.scores,
            total_score: record.total_score,
            interpretation: record.interpretation.clone(),
            timestamp: record.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_serialize_with_wire_names() {
        let scores = SubScores::new(Some(4), Some(5), Some(6));
        let json = serde_json::to_string(&scores).unwrap();
        assert!(json.contains("\"motora\":6"));
        assert!(json.contains("\"ocular\":4"));
    }

    #[test]
    fn test_evaluation_round_trips_camel_case_fields() {
        let json = r#"{
            "id": 3,
            "patientName": "Ana",
            "patientAge": 41,
            "patientId": "H-204",
            "location": null,
            "evaluator": null,
            "notes": null,
            "scores": {"ocular": 3, "verbal": 4, "motora": 5},
            "totalScore": 12,
            "interpretation": "Moderado",
            "timestamp": 1700000000000
        }"#;
        let record: Evaluation = serde_json::from_str(json).unwrap();
        assert_eq!(record.patient_name.as_deref(), Some("Ana"));
        assert_eq!(record.scores.motor, Some(5));
        assert_eq!(record.total_score, 12);

        let back = serde_json::to_string(&record).unwrap();
        assert!(back.contains("\"patientName\""));
        assert!(back.contains("\"totalScore\""));
    }
}
