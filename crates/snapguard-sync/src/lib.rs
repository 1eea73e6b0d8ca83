//! Snapguard Sync - connectivity-gated backup upload scheduling
//!
//! Provides:
//! - Periodic upload of the backup directory to a remote blob store
//! - Replace-by-name semantics (at most one remote object per filename)
//! - A cheap TCP connectivity probe gating every upload pass
//!
//! ## Modules
//!
//! - [`scheduler`] - Interval-driven upload pass orchestration
//! - [`probe`] - Outbound TCP reachability check

pub mod probe;
pub mod scheduler;

pub use probe::TcpConnectivityProbe;
pub use scheduler::{SchedulerState, SyncReport, SyncScheduler};
