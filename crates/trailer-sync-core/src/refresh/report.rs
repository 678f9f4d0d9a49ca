use serde::Serialize;
use std::time::Duration;

/// Where a folder ended up after one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderState {
    /// Pointer link not yet expired; nothing fetched
    Valid,
    /// Id is on the ignore list
    Ignored,
    /// New pointer written
    Refreshed,
    /// Source had no trailer; id added to the ignore list
    MarkedIgnored,
    /// Tag could not be mapped to an IMDb id
    Unresolved,
    /// Transient failure; retried next pass
    Failed,
}

/// Counts for one refresh pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub discovered: usize,
    pub valid: usize,
    pub ignored: usize,
    pub refreshed: usize,
    pub marked_ignored: usize,
    pub unresolved: usize,
    pub failed: usize,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl PassReport {
    pub fn record(&mut self, state: FolderState) {
        match state {
            FolderState::Valid => self.valid += 1,
            FolderState::Ignored => self.ignored += 1,
            FolderState::Refreshed => self.refreshed += 1,
            FolderState::MarkedIgnored => self.marked_ignored += 1,
            FolderState::Unresolved => self.unresolved += 1,
            FolderState::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub removed: usize,
    pub missing: usize,
    pub failed: usize,
}
