//! Session-scoped workflow state.
//!
//! One session holds at most one current record. The state machine is
//! explicit rather than implicit UI state:
//!
//! ```text
//! Idle ──begin──▶ Extracting ──success──▶ Ready ──export──▶ Exported
//!                     │                     ▲  ▲────re-export───┘
//!                     └──failure──▶ Idle (no record)        │
//!                                   or back to Ready ◀──────┘
//!                                   (record untouched)   re-extract allowed
//! ```
//!
//! A failed extraction never disturbs a previously held record: the state
//! returns to `Ready` when a record exists, `Idle` otherwise. A new successful
//! extraction replaces the record and form wholesale — fields are never
//! merged across calls.

use crate::config::ExtractionConfig;
use crate::error::FichaError;
use crate::export::{self, ExportArtifact};
use crate::extract;
use crate::form::FormState;
use crate::record::ExtractedRecord;
use tracing::info;

/// Where the capture workflow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// No record held.
    #[default]
    Idle,
    /// A remote extraction call is in flight.
    Extracting,
    /// A record is held and editable.
    Ready,
    /// An export artifact has been produced; the record stays editable.
    Exported,
}

/// One user's capture session: the workflow state, the current record, and
/// the in-progress form edits. Nothing here is persisted; dropping the
/// session discards the record.
#[derive(Debug, Default)]
pub struct Session {
    state: WorkflowState,
    record: Option<ExtractedRecord>,
    form: Option<FormState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// The currently held record, if any.
    pub fn record(&self) -> Option<&ExtractedRecord> {
        self.record.as_ref()
    }

    /// The editable form, if a record is held.
    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    /// Mutable access to the form for field and table edits.
    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        self.form.as_mut()
    }

    /// Mark the extraction call as in flight.
    pub fn begin_extraction(&mut self) {
        self.state = WorkflowState::Extracting;
    }

    /// Apply a successful extraction: record and form are replaced
    /// atomically and the session becomes `Ready`.
    pub fn complete_extraction(&mut self, record: ExtractedRecord) {
        self.form = Some(FormState::from_record(&record));
        self.record = Some(record);
        self.state = WorkflowState::Ready;
        info!("Extraction complete; record replaced");
    }

    /// Roll back a failed extraction. The previously held record (if any) is
    /// left untouched.
    pub fn fail_extraction(&mut self) {
        self.state = if self.record.is_some() {
            WorkflowState::Ready
        } else {
            WorkflowState::Idle
        };
    }

    /// Run the whole extraction sequence against the remote endpoint,
    /// driving the state transitions.
    pub async fn run_extraction(
        &mut self,
        images: &[Vec<u8>],
        config: &ExtractionConfig,
    ) -> Result<&FormState, FichaError> {
        self.begin_extraction();
        match extract::extract(images, config).await {
            Ok(record) => {
                self.complete_extraction(record);
                self.form
                    .as_ref()
                    .ok_or_else(|| FichaError::Internal("form missing after extraction".into()))
            }
            Err(e) => {
                self.fail_extraction();
                Err(e)
            }
        }
    }

    /// Export the current form edits as a one-row CSV artifact.
    ///
    /// Valid from `Ready` or `Exported`; the record remains held and editable
    /// afterwards, so the user can keep editing and export again.
    pub fn export(&mut self) -> Result<ExportArtifact, FichaError> {
        let form = self.form.as_ref().ok_or_else(|| {
            FichaError::Internal("export requested with no record held".into())
        })?;
        let artifact = export::export_record(form)?;
        self.state = WorkflowState::Exported;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NutrientRow;

    fn record_named(name: &str) -> ExtractedRecord {
        ExtractedRecord {
            nome_tecnico: Some(name.into()),
            tabela_nutricional: vec![NutrientRow::new("Sódio", "120mg", "5%")],
            ..Default::default()
        }
    }

    #[test]
    fn starts_idle_with_no_record() {
        let s = Session::new();
        assert_eq!(s.state(), WorkflowState::Idle);
        assert!(s.record().is_none());
        assert!(s.form().is_none());
    }

    #[test]
    fn success_path_reaches_ready() {
        let mut s = Session::new();
        s.begin_extraction();
        assert_eq!(s.state(), WorkflowState::Extracting);
        s.complete_extraction(record_named("A"));
        assert_eq!(s.state(), WorkflowState::Ready);
        assert_eq!(s.form().unwrap().product, "A");
    }

    #[test]
    fn first_failure_returns_to_idle() {
        let mut s = Session::new();
        s.begin_extraction();
        s.fail_extraction();
        assert_eq!(s.state(), WorkflowState::Idle);
        assert!(s.record().is_none());
    }

    #[test]
    fn failed_reextraction_keeps_previous_record() {
        let mut s = Session::new();
        s.begin_extraction();
        s.complete_extraction(record_named("A"));

        s.begin_extraction();
        s.fail_extraction();
        assert_eq!(s.state(), WorkflowState::Ready);
        assert_eq!(s.record().unwrap().nome_tecnico.as_deref(), Some("A"));
    }

    #[test]
    fn second_extraction_replaces_wholesale() {
        let mut s = Session::new();
        s.complete_extraction(record_named("A"));
        s.form_mut().unwrap().brand = "edited".into();

        let second = ExtractedRecord {
            marca: Some("B-brand".into()),
            ..Default::default()
        };
        s.complete_extraction(second);

        // No merging: the name from the first record and the in-progress
        // brand edit are both gone.
        assert!(s.record().unwrap().nome_tecnico.is_none());
        assert_eq!(s.form().unwrap().product, "");
        assert_eq!(s.form().unwrap().brand, "B-brand");
    }

    #[test]
    fn export_moves_to_exported_and_record_stays_editable() {
        let mut s = Session::new();
        s.complete_extraction(record_named("A"));
        let artifact = s.export().unwrap();
        assert_eq!(s.state(), WorkflowState::Exported);
        assert!(artifact.file_name.starts_with("produto_"));

        // Still editable, and exportable again.
        s.form_mut().unwrap().weight = "500g".into();
        let again = s.export().unwrap();
        assert!(String::from_utf8(again.bytes).unwrap().contains("500g"));
    }

    #[test]
    fn export_without_record_is_an_error() {
        let mut s = Session::new();
        assert!(s.export().is_err());
        assert_eq!(s.state(), WorkflowState::Idle);
    }
}
