//! Resource discovery layer
//!
//! Resources are discovered through the metrics they publish. Each resource
//! kind is a small data-driven definition: the metric to list, the dimension
//! carrying the resource name and the suffix marking its error variant.
//!
//! # Architecture
//!
//! - [`registry`] - Loads resource type definitions from embedded JSON
//! - [`paginator`] - Walks the metrics catalog's continuation token
//! - [`source`] - Builds named resources from the walked metrics
//!
//! # Resource Definitions
//!
//! Resource types are defined in JSON files under `src/resources/`:
//! - `sqs.json` - SQS queues, discovered via `ApproximateAgeOfOldestMessage`
//!
//! # Example
//!
//! ```ignore
//! use mdisco::metrics::FakeMetrics;
//! use mdisco::resource::ResourceSource;
//!
//! async fn find(api: FakeMetrics) -> mdisco::Result<()> {
//!     let source = ResourceSource::for_type(api, "sqs-queues")?;
//!     if let Some(queue) = source.discover_one("orders_error").await? {
//!         assert!(queue.is_error_variant);
//!     }
//!     Ok(())
//! }
//! ```

mod paginator;
mod registry;
mod source;

pub use paginator::{fetch_all, fetch_all_matching, fetch_page};
pub use registry::*;
pub use source::{discover_many, Resource, ResourceSet, ResourceSource};
