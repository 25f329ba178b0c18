//! StockSync Sync - pushes offline records to the server
//!
//! Provides:
//! - A fixed, ordered pipeline of per-kind stages (Branch, User, Product, Sale)
//! - Foreign-key rewriting from local ids to server ids between stages
//! - Per-record failure isolation with an aggregated report
//!
//! ## Modules
//!
//! - [`remapper`] - Local-to-server id tables per entity kind
//! - [`stage`] - Stage descriptors and the default pipeline
//! - [`coordinator`] - Runs the pipeline over a workspace
//! - [`report`] - Per-stage summaries and per-record failures

pub mod coordinator;
pub mod remapper;
pub mod report;
pub mod stage;

pub use coordinator::SyncCoordinator;
pub use remapper::IdRemapper;
pub use report::{EntityFailure, FailureReason, StageOutcome, StageSummary, SyncReport};
pub use stage::{default_pipeline, EntityStage, StageContext, SyncStage, Unresolved};
