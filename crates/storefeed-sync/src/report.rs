use serde::Serialize;

/// How a sync cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Supplier rows in the catalog were replaced with `written` records.
    Replaced { written: usize },
    /// Nothing usable was fetched; the catalog was left as it was.
    SkippedEmpty,
    /// A page deadline expired; the catalog was left as it was.
    Aborted { reason: String },
    /// Another cycle was already in progress.
    AlreadyRunning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub pages_requested: u32,
    pub records_accumulated: usize,
    pub dropped_untitled: usize,
    pub dropped_duplicates: usize,
    pub outcome: SyncOutcome,
}

impl SyncReport {
    pub(crate) fn empty(outcome: SyncOutcome) -> Self {
        Self {
            pages_requested: 0,
            records_accumulated: 0,
            dropped_untitled: 0,
            dropped_duplicates: 0,
            outcome,
        }
    }

    #[must_use]
    pub fn catalog_changed(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Replaced { .. })
    }
}
