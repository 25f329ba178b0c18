//! StockSync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Branch`, `User`, `Product`, `Sale` and the `RecordMeta` envelope
//! - **Port definitions** - Traits for adapters: `IRemoteGateway`, `IProductGateway`, `IBlobStore`
//! - **Repositories** - Local collections with remote/local create modes and the `Workspace`
//! - **Configuration** - YAML config with validation and a builder
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Repositories orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod repository;
