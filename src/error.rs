//! Error types for resource discovery

use thiserror::Error;

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Errors raised while discovering resources
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The metrics catalog call failed (network, throttling, auth).
    /// The underlying error is carried as-is.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    /// A returned metric does not identify a resource of this kind
    #[error("Malformed metric at position {position} ({metric_name}): {reason}")]
    MalformedDescriptor {
        /// Position of the metric in the accumulated sequence
        position: usize,
        /// Metric name as returned by the catalog
        metric_name: String,
        /// What was wrong with it
        reason: String,
    },

    /// The request could not be issued
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No resource type is registered under this key
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),
}

impl DiscoveryError {
    /// True when the failure came from the metrics catalog call itself
    pub fn is_transport(&self) -> bool {
        matches!(self, DiscoveryError::Transport(_))
    }
}
