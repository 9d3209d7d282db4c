//! Configuration for the settle wait.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettleConfig {
    /// Quiet window in ms: how long zero in-flight requests must hold.
    pub quiet_ms: u64,
    /// Hard bound in ms: resolve even if the page never goes quiet.
    pub timeout_ms: u64,
    /// Requests older than this are force-removed from the in-flight set.
    pub stall_threshold_ms: u64,
    /// Cadence of the stall sweep when no events arrive.
    pub sweep_interval_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            quiet_ms: 500,
            timeout_ms: 5000,
            stall_threshold_ms: 2000,
            sweep_interval_ms: 100,
        }
    }
}
