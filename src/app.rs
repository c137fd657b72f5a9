//! Application state management.
//!
//! This module contains the core `App` struct that manages all application
//! state: the evaluation form, the saved-history view, the offline cache
//! worker registration, and background task coordination.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::export;
use crate::i18n::{self, Language};
use crate::models::{Evaluation, NewEvaluation, SubScores};
use crate::scoring::{self, Field, Severity};
use crate::store::{EvaluationStore, StoreError};
use crate::worker::{OfflineWorker, WorkerCommand};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for patient text inputs.
pub const MAX_FIELD_LENGTH: usize = 80;

/// Subdirectory of the cache dir holding the worker's partitions.
const WORKER_CACHE_DIR: &str = "caches";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Evaluate,
    History,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Evaluate => "Evaluate",
            Tab::History => "History",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Evaluate => Tab::History,
            Tab::History => Tab::Evaluate,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    EditingPatient,
    ShowingHelp,
    ConfirmingClear,
    Quitting,
}

/// Patient metadata fields editable on the evaluate tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientField {
    Name,
    Age,
    PatientId,
    Location,
    Evaluator,
    Notes,
}

impl PatientField {
    pub fn next(&self) -> Self {
        match self {
            PatientField::Name => PatientField::Age,
            PatientField::Age => PatientField::PatientId,
            PatientField::PatientId => PatientField::Location,
            PatientField::Location => PatientField::Evaluator,
            PatientField::Evaluator => PatientField::Notes,
            PatientField::Notes => PatientField::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PatientField::Name => "Paciente",
            PatientField::Age => "Edad",
            PatientField::PatientId => "ID",
            PatientField::Location => "Ubicación",
            PatientField::Evaluator => "Evaluador",
            PatientField::Notes => "Observaciones",
        }
    }
}

/// Score-range filter for the history tab, layered over the band table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFilter {
    All,
    Mild,
    Moderate,
    Severe,
}

impl RangeFilter {
    pub fn next(&self) -> Self {
        match self {
            RangeFilter::All => RangeFilter::Mild,
            RangeFilter::Mild => RangeFilter::Moderate,
            RangeFilter::Moderate => RangeFilter::Severe,
            RangeFilter::Severe => RangeFilter::All,
        }
    }

    /// Inclusive total-score bounds, or `None` for no filtering.
    pub fn bounds(&self) -> Option<(u8, u8)> {
        match self {
            RangeFilter::All => None,
            RangeFilter::Mild => Some((13, 15)),
            RangeFilter::Moderate => Some((9, 12)),
            RangeFilter::Severe => Some((3, 8)),
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        let bundle = i18n::bundle(language);
        match self {
            RangeFilter::All => "—",
            RangeFilter::Mild => bundle.interpretation.mild,
            RangeFilter::Moderate => bundle.interpretation.moderate,
            RangeFilter::Severe => bundle.interpretation.severe,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Events sent back from the worker registration task.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Worker installed, activated, and cleaned up; ready for offline use.
    Ready { version: String, cleaned: usize },
    /// Install or activation failed; the app still works, just not offline.
    Failed(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    store: Option<EvaluationStore>,
    store_dir: PathBuf,
    pub worker: OfflineWorker,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub status_message: Option<String>,
    pub offline_ready: bool,

    // Evaluate tab
    pub scores: SubScores,
    pub focused_field: Field,
    pub patient_field: PatientField,
    pub patient_name: String,
    pub patient_age: String,
    pub patient_id: String,
    pub location: String,
    pub evaluator: String,
    pub notes: String,

    // History tab
    pub records: Vec<Evaluation>,
    pub history_selection: usize,
    pub search_query: String,
    pub range_filter: RangeFilter,

    // Background task channel
    worker_rx: mpsc::Receiver<WorkerEvent>,
    worker_tx: mpsc::Sender<WorkerEvent>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        i18n::set_current(config.language);

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let store = match EvaluationStore::open(&cache_dir) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(error = %e, "Evaluation store unavailable, will retry");
                None
            }
        };

        let worker = OfflineWorker::new(cache_dir.join(WORKER_CACHE_DIR), &config.origin())?;
        worker.connect_client("/");

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut app = Self {
            config,
            store,
            store_dir: cache_dir,
            worker,

            state: AppState::Normal,
            current_tab: Tab::Evaluate,
            status_message: None,
            offline_ready: false,

            scores: SubScores::default(),
            focused_field: Field::Ocular,
            patient_field: PatientField::Name,
            patient_name: String::new(),
            patient_age: String::new(),
            patient_id: String::new(),
            location: String::new(),
            evaluator: String::new(),
            notes: String::new(),

            records: Vec::new(),
            history_selection: 0,
            search_query: String::new(),
            range_filter: RangeFilter::All,

            worker_rx: rx,
            worker_tx: tx,
        };
        app.refresh_history();
        Ok(app)
    }

    // =========================================================================
    // Store access
    // =========================================================================

    /// The store, re-opened on demand after an earlier unavailability.
    fn store_mut(&mut self) -> Result<&mut EvaluationStore, StoreError> {
        if self.store.is_none() {
            self.store = Some(EvaluationStore::open(&self.store_dir)?);
            info!("Evaluation store became available");
        }
        Ok(self.store.as_mut().expect("store just opened"))
    }

    /// Recompute the history view from search/filter state.
    pub fn refresh_history(&mut self) {
        let query = self.search_query.clone();
        let bounds = self.range_filter.bounds();

        let records = match self.store_mut() {
            Ok(store) => {
                if !query.is_empty() {
                    store.search(&query)
                } else if let Some((min, max)) = bounds {
                    store.range_query(min, max)
                } else {
                    store.list()
                }
            }
            Err(e) => {
                self.status_message = Some(format!("⚠ {}", e));
                Vec::new()
            }
        };

        self.records = records;
        if self.history_selection >= self.records.len() {
            self.history_selection = self.records.len().saturating_sub(1);
        }
    }

    // =========================================================================
    // Evaluate tab
    // =========================================================================

    /// Current total from the selected sub-scores.
    pub fn total_score(&self) -> u8 {
        scoring::total_score(&self.scores)
    }

    /// Band for the current total, incomplete until all three are chosen.
    pub fn severity(&self) -> Severity {
        if scoring::is_complete(&self.scores) {
            Severity::from_total(self.total_score())
        } else {
            Severity::Incomplete
        }
    }

    /// Set the focused sub-score from a number key. Out-of-range values
    /// for the focused field are ignored.
    pub fn select_score(&mut self, value: u8) {
        let (min, max) = self.focused_field.range();
        if value < min || value > max {
            return;
        }
        match self.focused_field {
            Field::Ocular => self.scores.ocular = Some(value),
            Field::Verbal => self.scores.verbal = Some(value),
            Field::Motor => self.scores.motor = Some(value),
        }
    }

    pub fn focus_next_field(&mut self) {
        self.focused_field = match self.focused_field {
            Field::Ocular => Field::Verbal,
            Field::Verbal => Field::Motor,
            Field::Motor => Field::Ocular,
        };
    }

    pub fn focus_prev_field(&mut self) {
        self.focused_field = match self.focused_field {
            Field::Ocular => Field::Motor,
            Field::Verbal => Field::Ocular,
            Field::Motor => Field::Verbal,
        };
    }

    /// Validate and save the current evaluation. Nothing is written when
    /// validation fails; the error names the missing selector.
    pub fn save_evaluation(&mut self) {
        if let Err(e) = scoring::validate(&self.scores) {
            let message = match e {
                scoring::ValidationError::Missing(field) => {
                    i18n::t().validation_message(field).to_string()
                }
                other => other.to_string(),
            };
            self.status_message = Some(format!("⚠ {}", message));
            return;
        }

        let total = self.total_score();
        let interpretation = i18n::t().band_label(Severity::from_total(total)).to_string();
        let new = NewEvaluation {
            patient_name: non_empty(&self.patient_name),
            patient_age: self.patient_age.trim().parse().ok(),
            patient_id: non_empty(&self.patient_id),
            location: non_empty(&self.location),
            evaluator: non_empty(&self.evaluator),
            notes: non_empty(&self.notes),
            scores: self.scores,
            total_score: total,
            interpretation: interpretation.clone(),
            timestamp: Utc::now().timestamp_millis(),
        };

        match self.store_mut().and_then(|s| s.insert(new)) {
            Ok(id) => {
                info!(id, total, "Evaluation saved");
                self.status_message = Some(format!("✓ {} — {}/15 ({})", id, total, interpretation));
                self.clear_form();
                self.refresh_history();
            }
            Err(e) => {
                warn!(error = %e, "Save failed");
                self.status_message = Some(format!("⚠ {}", e));
            }
        }
    }

    /// Reset the form without saving.
    pub fn clear_form(&mut self) {
        self.scores = SubScores::default();
        self.focused_field = Field::Ocular;
        self.patient_name.clear();
        self.patient_age.clear();
        self.patient_id.clear();
        self.location.clear();
        self.evaluator.clear();
        self.notes.clear();
    }

    pub fn patient_field_value_mut(&mut self) -> &mut String {
        match self.patient_field {
            PatientField::Name => &mut self.patient_name,
            PatientField::Age => &mut self.patient_age,
            PatientField::PatientId => &mut self.patient_id,
            PatientField::Location => &mut self.location,
            PatientField::Evaluator => &mut self.evaluator,
            PatientField::Notes => &mut self.notes,
        }
    }

    pub fn patient_field_value(&self, field: PatientField) -> &str {
        match field {
            PatientField::Name => &self.patient_name,
            PatientField::Age => &self.patient_age,
            PatientField::PatientId => &self.patient_id,
            PatientField::Location => &self.location,
            PatientField::Evaluator => &self.evaluator,
            PatientField::Notes => &self.notes,
        }
    }

    // =========================================================================
    // History tab
    // =========================================================================

    /// Delete the selected record. A record already gone is a soft no-op.
    pub fn delete_selected(&mut self) {
        let Some(record) = self.records.get(self.history_selection) else {
            return;
        };
        let id = record.id;

        match self.store_mut().and_then(|s| s.delete(id)) {
            Ok(true) => {
                self.status_message = Some(format!("✓ #{} eliminado", id));
            }
            Ok(false) => {
                self.status_message = Some(format!("⚠ #{} ya no existe", id));
            }
            Err(e) => {
                warn!(error = %e, "Delete failed");
                self.status_message = Some(format!("⚠ {}", e));
            }
        }
        self.refresh_history();
    }

    /// Clear the whole history (after confirmation).
    pub fn clear_history(&mut self) {
        match self.store_mut().and_then(|s| {
            s.clear()?;
            Ok(s.len())
        }) {
            Ok(_) => {
                self.status_message = Some("✓ Historial vacío".to_string());
            }
            Err(e) => {
                warn!(error = %e, "Clear failed");
                self.status_message = Some(format!("⚠ {}", e));
            }
        }
        self.refresh_history();
    }

    /// Export every record to a CSV file in the working directory.
    pub fn export_csv(&mut self) {
        let records = match self.store_mut() {
            Ok(store) => store.export_all(),
            Err(e) => {
                self.status_message = Some(format!("⚠ {}", e));
                return;
            }
        };
        if records.is_empty() {
            self.status_message = Some("⚠ Sin datos para exportar".to_string());
            return;
        }

        let filename = export::csv_filename();
        match std::fs::write(&filename, export::to_csv(&records)) {
            Ok(()) => {
                info!(%filename, count = records.len(), "CSV exported");
                self.status_message = Some(format!("✓ {} ({} filas)", filename, records.len()));
            }
            Err(e) => {
                warn!(error = %e, "Export failed");
                self.status_message = Some(format!("⚠ {}", e));
            }
        }
    }

    /// Load a saved record back into the evaluation form.
    pub fn load_selected_into_form(&mut self) {
        let Some(record) = self.records.get(self.history_selection).cloned() else {
            return;
        };
        self.scores = record.scores;
        self.patient_name = record.patient_name.unwrap_or_default();
        self.patient_age = record
            .patient_age
            .map(|a| a.to_string())
            .unwrap_or_default();
        self.patient_id = record.patient_id.unwrap_or_default();
        self.location = record.location.unwrap_or_default();
        self.evaluator = record.evaluator.unwrap_or_default();
        self.notes = record.notes.unwrap_or_default();
        self.current_tab = Tab::Evaluate;
        self.status_message = Some(format!("✓ #{} cargado", record.id));
    }

    pub fn cycle_range_filter(&mut self) {
        self.range_filter = self.range_filter.next();
        self.refresh_history();
    }

    // =========================================================================
    // Language
    // =========================================================================

    /// Cycle to the next language and persist the preference.
    pub fn cycle_language(&mut self) {
        let next = i18n::current().next();
        i18n::set_current(next);
        self.config.language = next;
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        self.status_message = Some(format!("✓ {}", next.code()));
    }

    // =========================================================================
    // Worker registration
    // =========================================================================

    /// Register the offline worker in the background: install the static
    /// shell, activate (evicting stale partitions), then run the periodic
    /// cache cleanup.
    pub fn register_worker_background(&self) {
        let worker = self.worker.clone();
        let tx = self.worker_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = worker.install().await {
                let _ = tx.send(WorkerEvent::Failed(e.to_string())).await;
                return;
            }
            if let Err(e) = worker.activate().await {
                let _ = tx.send(WorkerEvent::Failed(e.to_string())).await;
                return;
            }

            let cleaned = match worker.cleanup_expired() {
                Ok(n) => n,
                Err(e) => {
                    debug!(error = %e, "Cache cleanup failed");
                    0
                }
            };

            let version = match worker.handle_command(WorkerCommand::GetVersion).await {
                Ok(Some(reply)) => reply.version,
                _ => String::new(),
            };
            let _ = tx.send(WorkerEvent::Ready { version, cleaned }).await;
        });
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(event) = self.worker_rx.try_recv() {
            match event {
                WorkerEvent::Ready { version, cleaned } => {
                    info!(%version, cleaned, "Offline worker ready");
                    self.offline_ready = true;
                }
                WorkerEvent::Failed(msg) => {
                    // Not fatal - the app works, just without the offline copy
                    warn!(error = %msg, "Offline worker registration failed");
                    self.offline_ready = false;
                }
            }
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_filter_bounds_match_band_table() {
        assert_eq!(RangeFilter::All.bounds(), None);
        assert_eq!(RangeFilter::Mild.bounds(), Some((13, 15)));
        assert_eq!(RangeFilter::Moderate.bounds(), Some((9, 12)));
        assert_eq!(RangeFilter::Severe.bounds(), Some((3, 8)));
    }

    #[test]
    fn test_patient_field_cycle_is_closed() {
        let mut field = PatientField::Name;
        for _ in 0..6 {
            field = field.next();
        }
        assert_eq!(field, PatientField::Name);
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty(" Ana "), Some("Ana".to_string()));
    }
}
