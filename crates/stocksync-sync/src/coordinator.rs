//! Sync coordinator
//!
//! Walks the stage pipeline once over a workspace. A run never fails as a
//! whole: every record that could not be pushed stays Local and is listed in
//! the returned [`SyncReport`], to be retried by the next run.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let coordinator = SyncCoordinator::new(&config.sync);
//! let report = coordinator.run(&mut workspace).await;
//! if !report.is_complete() {
//!     for failure in &report.failures {
//!         eprintln!("{} {}: {}", failure.kind, failure.local_id, failure.reason);
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use tracing::{info, warn};

use stocksync_core::config::SyncConfig;
use stocksync_core::domain::EntityKind;
use stocksync_core::repository::Workspace;

use crate::remapper::IdRemapper;
use crate::report::SyncReport;
use crate::stage::{default_pipeline, StageContext, SyncStage};

/// Drives the ordered stage pipeline
pub struct SyncCoordinator {
    stages: Vec<Box<dyn SyncStage>>,
    ctx: StageContext,
}

impl SyncCoordinator {
    /// Coordinator over the default Branch, User, Product, Sale pipeline
    pub fn new(config: &SyncConfig) -> Self {
        Self::with_stages(
            default_pipeline(),
            Duration::from_secs(config.call_timeout_secs),
        )
    }

    /// Coordinator over a custom pipeline
    pub fn with_stages(stages: Vec<Box<dyn SyncStage>>, call_timeout: Duration) -> Self {
        Self {
            stages,
            ctx: StageContext { call_timeout },
        }
    }

    /// Kinds handled, in run order
    pub fn kinds(&self) -> Vec<EntityKind> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    pub fn call_timeout(&self) -> Duration {
        self.ctx.call_timeout
    }

    /// Pushes every Local record, stage by stage
    ///
    /// Taking the workspace mutably rules out a second run, or any other
    /// mutation, while this one is in flight.
    #[tracing::instrument(skip_all)]
    pub async fn run(&self, workspace: &mut Workspace) -> SyncReport {
        let start = Instant::now();
        let pending = workspace.status().pending();
        info!(pending, "Starting sync run");

        let mut remapper = IdRemapper::new();
        let mut report = SyncReport::default();

        for stage in &self.stages {
            let outcome = stage.run(workspace, &mut remapper, &self.ctx).await;
            if outcome.summary.attempted > 0 {
                info!(
                    kind = %outcome.summary.kind,
                    attempted = outcome.summary.attempted,
                    synced = outcome.summary.synced,
                    skipped = outcome.summary.skipped,
                    failed = outcome.summary.failed,
                    "Stage finished"
                );
            }
            report.absorb(outcome);
        }

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if report.is_complete() {
            info!(
                synced = report.synced(),
                duration_ms = report.duration_ms,
                "Sync run complete"
            );
        } else {
            warn!(
                synced = report.synced(),
                left_local = report.failures.len(),
                duration_ms = report.duration_ms,
                "Sync run finished with records left local"
            );
        }

        report
    }
}
