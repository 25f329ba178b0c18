//! Outcome of a sync run

use serde::{Serialize, Serializer};
use thiserror::Error;

use stocksync_core::domain::{EntityId, EntityKind};
use stocksync_core::ports::RemoteError;
use stocksync_core::repository::RepositoryError;

/// Why a record was not synced in this run
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FailureReason {
    /// A required foreign key points at a record that is still Local
    #[error("unresolved {field} reference '{reference}'")]
    Unresolved {
        field: &'static str,
        reference: EntityId,
    },

    /// The gateway call failed or timed out
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The outcome could not be written to the local store
    #[error("storage error: {0}")]
    Storage(String),

    /// The local repository refused a step before the push
    #[error("{0}")]
    Rejected(String),
}

impl From<RepositoryError> for FailureReason {
    fn from(err: RepositoryError) -> Self {
        if let Some(remote) = err.remote() {
            return FailureReason::Remote(remote.clone());
        }
        match err {
            RepositoryError::Storage(e) => FailureReason::Storage(format!("{e:#}")),
            other => FailureReason::Rejected(other.to_string()),
        }
    }
}

impl FailureReason {
    /// Skipped records were never sent
    pub fn is_skip(&self) -> bool {
        matches!(self, FailureReason::Unresolved { .. })
    }
}

/// One record that was not synced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFailure {
    pub kind: EntityKind,
    pub local_id: EntityId,
    #[serde(serialize_with = "display")]
    pub reason: FailureReason,
}

fn display<S: Serializer>(reason: &FailureReason, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// Counters for one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub kind: EntityKind,
    /// Local records selected at the start of the stage
    pub attempted: usize,
    pub synced: usize,
    /// Left Local because a required reference is unresolved
    pub skipped: usize,
    /// Left Local because the push failed
    pub failed: usize,
}

impl StageSummary {
    pub fn new(kind: EntityKind, attempted: usize) -> Self {
        Self {
            kind,
            attempted,
            synced: 0,
            skipped: 0,
            failed: 0,
        }
    }
}

/// Result of a single stage run
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub summary: StageSummary,
    pub failures: Vec<EntityFailure>,
}

impl StageOutcome {
    pub fn new(kind: EntityKind, attempted: usize) -> Self {
        Self {
            summary: StageSummary::new(kind, attempted),
            failures: Vec::new(),
        }
    }

    pub(crate) fn synced(&mut self) {
        self.summary.synced += 1;
    }

    pub(crate) fn fail(&mut self, local_id: EntityId, reason: FailureReason) {
        if reason.is_skip() {
            self.summary.skipped += 1;
        } else {
            self.summary.failed += 1;
        }
        self.failures.push(EntityFailure {
            kind: self.summary.kind,
            local_id,
            reason,
        });
    }
}

/// Summary of a completed sync run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// One entry per stage, in pipeline order
    pub stages: Vec<StageSummary>,
    /// Every record left Local, across all stages
    pub failures: Vec<EntityFailure>,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// True when no record was left behind
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Records synced across all stages
    pub fn synced(&self) -> usize {
        self.stages.iter().map(|s| s.synced).sum()
    }

    pub fn stage(&self, kind: EntityKind) -> Option<&StageSummary> {
        self.stages.iter().find(|s| s.kind == kind)
    }

    pub fn failures_for(&self, kind: EntityKind) -> impl Iterator<Item = &EntityFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }

    /// True if any push was rejected for missing or expired credentials
    pub fn requires_reauth(&self) -> bool {
        self.failures
            .iter()
            .any(|f| matches!(&f.reason, FailureReason::Remote(e) if e.requires_reauth()))
    }

    pub(crate) fn absorb(&mut self, outcome: StageOutcome) {
        self.stages.push(outcome.summary);
        self.failures.extend(outcome.failures);
    }
}
