// Allow dead code: Bulk import/export operations for data round-trips
#![allow(dead_code)]

//! Durable store for patient evaluations.
//!
//! Records live in a single JSON file under the application cache
//! directory. The full record set is held in memory; every mutating
//! operation rewrites the file before returning, so reads are always
//! consistent with the most recent completed write and nothing is buffered
//! across restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::StoreError;
use crate::models::{Evaluation, NewEvaluation};

/// Records file name in the store directory.
const RECORDS_FILE: &str = "evaluations.json";

/// On-disk shape of the store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    /// Next surrogate id to assign. Ids are never reused, even after
    /// deletes.
    next_id: u64,
    records: Vec<Evaluation>,
}

pub struct EvaluationStore {
    path: PathBuf,
    next_id: u64,
    records: Vec<Evaluation>,
}

impl EvaluationStore {
    /// Open (or create) the store in `dir`.
    ///
    /// Fails with [`StoreError::Unavailable`] when the directory cannot be
    /// created and with [`StoreError::Corrupt`] when an existing records
    /// file does not parse; neither is a data-loss path, so callers may
    /// surface the error and retry later.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Unavailable {
            reason: format!("cannot create {}: {}", dir.display(), e),
        })?;

        let path = dir.join(RECORDS_FILE);
        let file = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str::<StoreFile>(&contents).map_err(|e| StoreError::Corrupt {
                path: path.clone(),
                source: e,
            })?
        } else {
            StoreFile {
                next_id: 1,
                ..Default::default()
            }
        };

        debug!(count = file.records.len(), path = %path.display(), "Evaluation store opened");

        Ok(Self {
            path,
            next_id: file.next_id.max(1),
            records: file.records,
        })
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record, assigning a fresh surrogate id. The record is on
    /// disk before the id is returned.
    pub fn insert(&mut self, new: NewEvaluation) -> Result<u64, StoreError> {
        let id = self.next_id;
        let record = Self::with_id(id, new);

        let mut records = self.records.clone();
        records.push(record);
        self.persist_with(self.next_id + 1, &records)?;

        self.records = records;
        self.next_id += 1;
        Ok(id)
    }

    /// All records, newest timestamp first. Ties are broken by id
    /// descending so the ordering is total and stable across calls.
    pub fn list(&self) -> Vec<Evaluation> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        records
    }

    /// Delete one record by id. Deleting an absent id is an idempotent
    /// no-op that returns `Ok(false)`.
    pub fn delete(&mut self, id: u64) -> Result<bool, StoreError> {
        let Some(pos) = self.records.iter().position(|r| r.id == id) else {
            debug!(id, "Delete of absent evaluation ignored");
            return Ok(false);
        };

        let mut records = self.records.clone();
        records.remove(pos);
        self.persist_with(self.next_id, &records)?;

        self.records = records;
        Ok(true)
    }

    /// Case-insensitive substring search over patient name, patient id,
    /// location, evaluator, and notes. An empty query returns the full
    /// unfiltered list. Newest first.
    pub fn search(&self, query: &str) -> Vec<Evaluation> {
        if query.is_empty() {
            return self.list();
        }

        let needle = query.to_lowercase();
        let matches = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        };

        let mut results: Vec<Evaluation> = self
            .records
            .iter()
            .filter(|r| {
                matches(&r.patient_name)
                    || matches(&r.patient_id)
                    || matches(&r.location)
                    || matches(&r.evaluator)
                    || matches(&r.notes)
            })
            .cloned()
            .collect();
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        results
    }

    /// Records with `min <= total_score <= max`, inclusive on both ends,
    /// newest first.
    pub fn range_query(&self, min: u8, max: u8) -> Vec<Evaluation> {
        let mut results: Vec<Evaluation> = self
            .records
            .iter()
            .filter(|r| r.total_score >= min && r.total_score <= max)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        results
    }

    /// All evaluations for an exact patient name, newest first.
    pub fn by_patient(&self, name: &str) -> Vec<Evaluation> {
        let mut results: Vec<Evaluation> = self
            .records
            .iter()
            .filter(|r| r.patient_name.as_deref() == Some(name))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        results
    }

    /// Every record in insertion order, for bulk serialization.
    pub fn export_all(&self) -> Vec<Evaluation> {
        self.records.clone()
    }

    /// Bulk insert, assigning fresh ids. Does not deduplicate against
    /// existing data. Persists once for the whole batch.
    pub fn import_many(&mut self, batch: Vec<NewEvaluation>) -> Result<Vec<u64>, StoreError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut records = self.records.clone();
        let mut next_id = self.next_id;
        let mut ids = Vec::with_capacity(batch.len());

        for new in batch {
            records.push(Self::with_id(next_id, new));
            ids.push(next_id);
            next_id += 1;
        }
        self.persist_with(next_id, &records)?;

        self.records = records;
        self.next_id = next_id;
        debug!(count = ids.len(), "Imported evaluations");
        Ok(ids)
    }

    /// Remove every record. Assigned ids are not reused afterwards.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.persist_with(self.next_id, &[])?;
        self.records.clear();
        Ok(())
    }

    fn with_id(id: u64, new: NewEvaluation) -> Evaluation {
        Evaluation {
            id,
            patient_name: new.patient_name,
            patient_age: new.patient_age,
            patient_id: new.patient_id,
            location: new.location,
            evaluator: new.evaluator,
            notes: new.notes,
            scores: new.scores,
            total_score: new.total_score,
            interpretation: new.interpretation,
            timestamp: new.timestamp,
        }
    }

    /// Write the records file. Goes through a temp file and rename so a
    /// failed write leaves the previous file intact.
    fn persist_with(&self, next_id: u64, records: &[Evaluation]) -> Result<(), StoreError> {
        let file = StoreFile {
            next_id,
            records: records.to_vec(),
        };
        let contents = serde_json::to_string_pretty(&file).map_err(StoreError::Encode)?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubScores;

    fn record(name: &str, total: u8, timestamp: i64) -> NewEvaluation {
        NewEvaluation {
            patient_name: Some(name.to_string()),
            scores: SubScores::new(Some(4), Some(5), Some(6)),
            total_score: total,
            interpretation: "Leve".to_string(),
            timestamp,
            ..Default::default()
        }
    }

    fn open_store(dir: &tempfile::TempDir) -> EvaluationStore {
        EvaluationStore::open(dir.path()).unwrap()
    }

    #[test]
    fn test_insert_assigns_monotonic_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let a = store.insert(record("A", 15, 100)).unwrap();
        let b = store.insert(record("B", 15, 200)).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert(record("Old", 15, 100)).unwrap();
        store.insert(record("New", 15, 300)).unwrap();
        store.insert(record("Mid", 15, 200)).unwrap();

        let names: Vec<_> = store
            .list()
            .into_iter()
            .map(|r| r.patient_name.unwrap())
            .collect();
        assert_eq!(names, vec!["New", "Mid", "Old"]);
    }

    #[test]
    fn test_delete_absent_id_is_soft_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let id = store.insert(record("A", 15, 100)).unwrap();
        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(!store.delete(9999).unwrap());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let a = store.insert(record("A", 15, 100)).unwrap();
        store.delete(a).unwrap();
        let b = store.insert(record("B", 15, 200)).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_search_case_insensitive_across_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let mut by_notes = record("Ana", 15, 100);
        by_notes.notes = Some("Revisar TRAUMA craneal".to_string());
        store.insert(by_notes).unwrap();

        let mut by_location = record("Luis", 15, 200);
        by_location.location = Some("Urgencias Trauma".to_string());
        store.insert(by_location).unwrap();

        store.insert(record("Marta", 15, 300)).unwrap();

        let results = store.search("trauma");
        assert_eq!(results.len(), 2);
        // Newest first
        assert_eq!(results[0].patient_name.as_deref(), Some("Luis"));
    }

    #[test]
    fn test_search_empty_query_returns_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert(record("A", 15, 100)).unwrap();
        store.insert(record("B", 15, 200)).unwrap();
        assert_eq!(store.search("").len(), 2);
    }

    #[test]
    fn test_range_query_inclusive_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        for (i, total) in [3u8, 8, 9, 12, 13, 15].iter().enumerate() {
            store
                .insert(record(&format!("P{}", total), *total, i as i64))
                .unwrap();
        }

        let totals: Vec<u8> = store
            .range_query(9, 12)
            .into_iter()
            .map(|r| r.total_score)
            .collect();
        assert_eq!(totals, vec![12, 9]);
    }

    #[test]
    fn test_by_patient_exact_match() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert(record("Ana", 15, 100)).unwrap();
        store.insert(record("Ana", 12, 300)).unwrap();
        store.insert(record("Anabel", 15, 200)).unwrap();

        let results = store.by_patient("Ana");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].total_score, 12);
    }

    #[test]
    fn test_import_assigns_fresh_ids_and_keeps_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert(record("A", 15, 100)).unwrap();
        let exported = store.export_all();

        let batch: Vec<NewEvaluation> =
            exported.iter().map(NewEvaluation::from_record).collect();
        let ids = store.import_many(batch).unwrap();

        assert_eq!(ids.len(), 1);
        assert_eq!(store.len(), 2);
        let all = store.export_all();
        assert_ne!(all[0].id, all[1].id);
        assert_eq!(all[0].patient_name, all[1].patient_name);
        assert_eq!(all[0].timestamp, all[1].timestamp);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id;
        {
            let mut store = open_store(&dir);
            id = store.insert(record("A", 15, 100)).unwrap();
        }

        let mut store = open_store(&dir);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].id, id);

        // Fresh ids continue past the persisted counter
        let next = store.insert(record("B", 15, 200)).unwrap();
        assert!(next > id);
    }

    #[test]
    fn test_clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert(record("A", 15, 100)).unwrap();
        store.insert(record("B", 15, 200)).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());

        let reopened = open_store(&dir);
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_corrupt_file_surfaces_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RECORDS_FILE), "not json").unwrap();

        match EvaluationStore::open(dir.path()) {
            Err(StoreError::Corrupt { .. }) => {}
            other => panic!("expected Corrupt, got {:?}", other.map(|_| ())),
        }
    }
}
