//! Snapguard Store - blob store adapters
//!
//! Implementations of the [`IBlobStore`](snapguard_core::ports::IBlobStore)
//! port:
//!
//! - [`http::HttpBlobStore`] - talks to a remote vault over its HTTP API
//! - [`memory::MemoryBlobStore`] - in-memory store for tests and offline use

pub mod http;
pub mod memory;

pub use http::HttpBlobStore;
pub use memory::MemoryBlobStore;
