//! mdisco - resource discovery through the metrics catalog
//!
//! Cloud resources are enumerated indirectly: the metrics catalog is asked
//! for every metric of a fixed name, the catalog's continuation token is
//! followed to the end, and each metric's identifying dimension becomes a
//! resource name.
//!
//! # Module Structure
//!
//! - [`metrics`] - The metrics catalog capability and its HTTP client
//! - [`resource`] - Resource type registry, paginator and resource sources
//! - [`config`] - Persistent configuration
//! - [`output`] - Rendering of discovered resources
//!
//! # Example
//!
//! ```ignore
//! use mdisco::metrics::HttpMetricsClient;
//! use mdisco::resource::{get_resource_type, ResourceSource};
//!
//! async fn list_queues(client: HttpMetricsClient) -> mdisco::Result<()> {
//!     let def = get_resource_type("sqs-queues").unwrap();
//!     let queues = ResourceSource::new(client, def).discover_all().await?;
//!     for (name, queue) in &queues {
//!         println!("{name} error={}", queue.is_error_variant);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod output;
pub mod resource;

pub use error::{DiscoveryError, Result};
