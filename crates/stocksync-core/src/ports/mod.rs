//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteGateway`] - Per-kind operations against the remote system of record
//! - [`IProductGateway`] - Product gateway with server-side stock adjustments
//! - [`IBlobStore`] - Keyed persistence for serialized record collections

pub mod blob_store;
pub mod gateway;

pub use blob_store::IBlobStore;
pub use gateway::{IProductGateway, IRemoteGateway, RemoteError, Syncable};
