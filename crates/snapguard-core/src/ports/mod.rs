//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IBlobStore`] - Remote object storage keyed by unique filename
//! - [`IConnectivityProbe`] - Bounded network reachability check

pub mod blob_store;
pub mod connectivity;

pub use blob_store::{IBlobStore, RemoteObject};
pub use connectivity::IConnectivityProbe;
