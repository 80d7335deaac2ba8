use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::kv::{KeyValueStore, StoreError};
use crate::models::ReportData;

/// The single slot holding the JSON snapshot of the current draft.
pub const DRAFT_KEY: &str = "lemon-report-data";

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("could not save draft: {0}")]
    StorageWriteFailure(#[source] StoreError),

    #[error("could not read draft: {0}")]
    StorageReadFailure(#[source] StoreError),

    #[error("stored draft is not a valid report: {0}")]
    StorageReadCorrupt(String),

    #[error("could not serialize draft: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DraftError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            Self::StorageWriteFailure(StoreError::QuotaExceeded { .. })
        )
    }
}

/// Persists a [`ReportData`] snapshot in one fixed key of a
/// [`KeyValueStore`].
pub struct DraftStore {
    kv: Box<dyn KeyValueStore>,
}

impl DraftStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read the stored draft. `Ok(None)` when nothing has been saved.
    pub async fn try_load(&self) -> Result<Option<ReportData>, DraftError> {
        let Some(raw) = self
            .kv
            .get(DRAFT_KEY)
            .await
            .map_err(DraftError::StorageReadFailure)?
        else {
            return Ok(None);
        };

        let report: ReportData = serde_json::from_str(&raw)
            .map_err(|e| DraftError::StorageReadCorrupt(e.to_string()))?;

        for (kind, section) in report.sections() {
            if !section.matches_template(kind) {
                return Err(DraftError::StorageReadCorrupt(format!(
                    "section '{kind}' has {} items, expected {}",
                    section.total_count(),
                    kind.template_labels().len()
                )));
            }
        }

        Ok(Some(report))
    }

    /// Load the stored draft, or a fresh report dated `today` when the slot
    /// is empty, unreadable, or corrupt.
    pub async fn load(&self, today: NaiveDate) -> ReportData {
        match self.try_load().await {
            Ok(Some(report)) => {
                debug!(deficiencies = report.deficiencies.len(), "draft restored");
                report
            }
            Ok(None) => {
                info!("no saved draft, starting a new report");
                ReportData::with_date(today)
            }
            Err(err) => {
                warn!(error = %err, "discarding saved draft, starting a new report");
                ReportData::with_date(today)
            }
        }
    }

    pub async fn save(&self, report: &ReportData) -> Result<(), DraftError> {
        let json = serde_json::to_string(report)?;
        self.kv
            .set(DRAFT_KEY, &json)
            .await
            .map_err(DraftError::StorageWriteFailure)?;
        debug!(bytes = json.len(), "draft saved");
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), DraftError> {
        self.kv
            .remove(DRAFT_KEY)
            .await
            .map_err(DraftError::StorageWriteFailure)
    }
}
