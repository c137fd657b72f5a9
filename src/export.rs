// Allow dead code: JSON backup helpers for bulk round-trips
#![allow(dead_code)]

//! Bulk export of saved evaluations.
//!
//! The delimited-text format matches the data exported by earlier
//! versions of the application: a fixed Spanish header row and one quoted
//! row per record, with empty cells for unanswered fields.

use chrono::Local;

use crate::models::{Evaluation, NewEvaluation};

/// Header row of the CSV export. Field order is part of the format.
const CSV_HEADER: [&str; 12] = [
    "Fecha",
    "Paciente",
    "Edad",
    "ID",
    "Ubicación",
    "Evaluador",
    "Ocular",
    "Verbal",
    "Motora",
    "Total",
    "Interpretación",
    "Observaciones",
];

/// Render records to delimited text. Every cell is double-quoted with
/// inner quotes doubled, so free-text notes cannot break the row shape.
pub fn to_csv(records: &[Evaluation]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|s| s.to_string()));

    for record in records {
        let cells = [
            record
                .created_at()
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            text_cell(&record.patient_name),
            number_cell(record.patient_age.map(u64::from)),
            text_cell(&record.patient_id),
            text_cell(&record.location),
            text_cell(&record.evaluator),
            number_cell(record.scores.ocular.map(u64::from)),
            number_cell(record.scores.verbal.map(u64::from)),
            number_cell(record.scores.motor.map(u64::from)),
            record.total_score.to_string(),
            record.interpretation.clone(),
            text_cell(&record.notes),
        ];
        push_row(&mut out, cells.into_iter());
    }
    out
}

/// Suggested file name for a CSV export, stamped with today's date.
pub fn csv_filename() -> String {
    format!("glasgow_evaluations_{}.csv", Local::now().format("%Y-%m-%d"))
}

/// Serialize the full record set for bulk backup.
pub fn to_json(records: &[Evaluation]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Parse a bulk backup into importable records. Surrogate ids in the
/// input are discarded; the store assigns fresh ones.
pub fn parse_json(data: &str) -> Result<Vec<NewEvaluation>, serde_json::Error> {
    let records: Vec<Evaluation> = serde_json::from_str(data)?;
    Ok(records.iter().map(NewEvaluation::from_record).collect())
}

fn text_cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn number_cell(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let row: Vec<String> = cells
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubScores;

    fn sample() -> Evaluation {
        Evaluation {
            id: 1,
            patient_name: Some("Ana María".to_string()),
            patient_age: Some(41),
            patient_id: Some("H-204".to_string()),
            location: None,
            evaluator: Some("Dr. Ruiz".to_string()),
            notes: Some("Dijo \"mareo\" al ingresar".to_string()),
            scores: SubScores::new(Some(3), Some(4), Some(5)),
            total_score: 12,
            interpretation: "Moderado".to_string(),
            timestamp: 1700000000000,
        }
    }

    #[test]
    fn test_header_row_is_exact() {
        let csv = to_csv(&[]);
        assert_eq!(
            csv.lines().next().unwrap(),
            "\"Fecha\",\"Paciente\",\"Edad\",\"ID\",\"Ubicación\",\"Evaluador\",\"Ocular\",\"Verbal\",\"Motora\",\"Total\",\"Interpretación\",\"Observaciones\""
        );
    }

    #[test]
    fn test_row_quotes_every_field_and_escapes_quotes() {
        let csv = to_csv(&[sample()]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"Ana María\""));
        assert!(row.contains("\"41\""));
        // Empty cell for the missing location
        assert!(row.contains(",\"\",\"Dr. Ruiz\""));
        // Inner quotes doubled
        assert!(row.contains("\"Dijo \"\"mareo\"\" al ingresar\""));
        assert!(row.contains("\"12\",\"Moderado\""));
    }

    #[test]
    fn test_json_round_trip_ignores_ids() {
        let records = vec![sample()];
        let json = to_json(&records).unwrap();
        let imported = parse_json(&json).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].patient_name, records[0].patient_name);
        assert_eq!(imported[0].scores, records[0].scores);
        assert_eq!(imported[0].total_score, records[0].total_score);
        assert_eq!(imported[0].timestamp, records[0].timestamp);
    }
}
