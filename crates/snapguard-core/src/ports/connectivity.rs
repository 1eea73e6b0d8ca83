//! Connectivity probe port - bounded network reachability check
//!
//! The sync scheduler gates each upload pass on a cheap reachability check.
//! The probe answers within its configured timeout; an unreachable network
//! is an ordinary `false`, never an error, so the scheduler has exactly one
//! decision to make.

/// Network reachability check
#[async_trait::async_trait]
pub trait IConnectivityProbe: Send + Sync {
    /// Returns whether the network currently appears reachable
    ///
    /// Implementations must complete within their configured timeout
    /// (seconds, not minutes); connection failures and timeouts both
    /// report `false`.
    async fn is_reachable(&self) -> bool;
}
