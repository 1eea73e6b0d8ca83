//! Snapguard Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `BackupAction`, `SnapshotName`, `SnapshotClock`, `MonitorError`
//! - **Configuration** - typed YAML config with validation and a builder
//! - **Event journal** - bounded in-memory log ring consumed by control planes
//! - **Port definitions** - traits for adapters: `IBlobStore`, `IConnectivityProbe`
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates implement.

pub mod config;
pub mod domain;
pub mod journal;
pub mod ports;
