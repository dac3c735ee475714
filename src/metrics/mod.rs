//! Metrics catalog capability
//!
//! Discovery never lists resources directly; it lists metrics. This module
//! defines the request/page types exchanged with the metrics catalog and the
//! [`MetricsApi`] trait that any catalog client implements.
//!
//! # Module Structure
//!
//! - [`http`] - JSON-over-HTTP client for a `ListMetrics` endpoint
//! - [`fake`] - Canned-page catalog for tests (`testing` feature)
//!
//! # Example
//!
//! ```ignore
//! use mdisco::metrics::{HttpMetricsClient, ListMetricsRequest, MetricsApi};
//!
//! async fn first_page(client: &HttpMetricsClient) -> anyhow::Result<()> {
//!     let request = ListMetricsRequest::new("AWS/SQS", "ApproximateAgeOfOldestMessage");
//!     let page = client.list_metrics(&request).await?;
//!     println!("{} metrics, more: {}", page.metrics.len(), page.continuation().is_some());
//!     Ok(())
//! }
//! ```

#[cfg(any(test, feature = "testing"))]
pub mod fake;
pub mod http;

#[cfg(any(test, feature = "testing"))]
pub use fake::FakeMetrics;
pub use http::{format_api_error, HttpMetricsClient};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// Name/value pair attached to a metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Dimension filter for a `ListMetrics` request. A filter without a value
/// matches every metric that carries the dimension at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DimensionFilter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl DimensionFilter {
    /// Match metrics carrying dimension `name`, whatever its value
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

/// One entry of a metrics catalog page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDescriptor {
    #[serde(default)]
    pub namespace: String,
    pub metric_name: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

impl MetricDescriptor {
    pub fn new(namespace: &str, metric_name: &str, dimensions: Vec<Dimension>) -> Self {
        Self {
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            dimensions,
        }
    }

    /// Value of the first dimension called `name`
    pub fn dimension_value(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }
}

/// Request for one page of the metrics catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListMetricsRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub metric_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<DimensionFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl ListMetricsRequest {
    pub fn new(namespace: &str, metric_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_dimension_filter(mut self, filter: DimensionFilter) -> Self {
        self.dimensions.push(filter);
        self
    }

    /// Same request, continued at `token`
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            next_token: token,
            ..self.clone()
        }
    }
}

/// One page of the metrics catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricsPage {
    #[serde(default)]
    pub metrics: Vec<MetricDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl MetricsPage {
    /// Token for the next page, or `None` when this page is the last one.
    /// An empty token is terminal, same as a missing one.
    pub fn continuation(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// A metrics catalog that can list metrics one page at a time
pub trait MetricsApi: Send + Sync {
    /// Fetch the page selected by `request.next_token`
    fn list_metrics(
        &self,
        request: &ListMetricsRequest,
    ) -> impl Future<Output = Result<MetricsPage>> + Send;
}

impl<T: MetricsApi> MetricsApi for &T {
    fn list_metrics(
        &self,
        request: &ListMetricsRequest,
    ) -> impl Future<Output = Result<MetricsPage>> + Send {
        (**self).list_metrics(request)
    }
}

impl<T: MetricsApi> MetricsApi for Arc<T> {
    fn list_metrics(
        &self,
        request: &ListMetricsRequest,
    ) -> impl Future<Output = Result<MetricsPage>> + Send {
        (**self).list_metrics(request)
    }
}
