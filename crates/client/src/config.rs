//! Transport tuning for the provisioning client

use std::time::Duration;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Connection and pool settings, fixed at construction time.
///
/// `None` leaves the corresponding transport default in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound for a whole exchange (connect, send, read body)
    pub timeout: Duration,

    /// TCP keep-alive probe interval
    pub keep_alive: Option<Duration>,

    /// How long an idle pooled connection is kept before closing
    pub idle_conn_timeout: Option<Duration>,

    /// Maximum idle connections kept in the pool
    ///
    /// The provisioning service is a single host, so this maps onto the
    /// per-host idle limit of the pool.
    pub max_idle_conns: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            keep_alive: None,
            idle_conn_timeout: None,
            max_idle_conns: None,
        }
    }
}
