//! Integration tests for stocksync-sync
//!
//! Runs the coordinator over a workspace backed by an in-memory SQLite blob
//! store and scripted server doubles.

mod common;

mod test_failures;
mod test_pipeline;
