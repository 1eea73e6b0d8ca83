//! TCP connectivity probe
//!
//! A minimal reachability check used to gate upload passes: open one outbound
//! TCP connection to a well-known endpoint and report whether it succeeded
//! within a short, hard timeout. The default target is a public DNS resolver
//! on port 53, reachable from almost any network that has a route out.
//!
//! The probe answers a yes/no question and nothing more. It never retries,
//! never blocks past its timeout, and treats every failure mode (refused,
//! unroutable, timed out) the same way: not reachable right now.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

use snapguard_core::ports::IConnectivityProbe;

/// Default probe target: Google public DNS on the DNS port.
pub const DEFAULT_PROBE_ADDR: &str = "8.8.8.8:53";

/// Default upper bound on a single probe attempt.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Connectivity probe backed by a single outbound TCP connection attempt
///
/// Implements [`IConnectivityProbe`] for the sync scheduler. The connection
/// is closed immediately after the handshake; no data is sent.
pub struct TcpConnectivityProbe {
    /// Target address in `host:port` form
    addr: String,
    /// Hard bound on how long one attempt may take
    timeout: Duration,
}

impl TcpConnectivityProbe {
    /// Creates a probe against a specific address with a specific timeout
    ///
    /// # Arguments
    /// * `addr` - Target in `host:port` form (e.g. `"8.8.8.8:53"`)
    /// * `timeout` - Hard bound on the connection attempt
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    /// Returns the configured target address.
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl Default for TcpConnectivityProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_ADDR, DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl IConnectivityProbe for TcpConnectivityProbe {
    async fn is_reachable(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_stream)) => {
                debug!(addr = %self.addr, "Connectivity probe succeeded");
                true
            }
            Ok(Err(err)) => {
                debug!(addr = %self.addr, error = %err, "Connectivity probe failed");
                false
            }
            Err(_) => {
                debug!(
                    addr = %self.addr,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Connectivity probe timed out"
                );
                false
            }
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
