//! Resource Sources
//!
//! Turns the metrics of one resource kind into named resources.

use super::paginator::fetch_all_matching;
use super::registry::{get_resource_type, ResourceTypeDef};
use crate::error::{DiscoveryError, Result};
use crate::metrics::{DimensionFilter, ListMetricsRequest, MetricDescriptor, MetricsApi};
use futures::future::join_all;
use indexmap::IndexMap;
use serde::Serialize;

/// A discovered resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub name: String,
    /// Name follows the kind's error-variant convention (e.g. a dead-letter queue)
    pub is_error_variant: bool,
}

/// Discovered resources by name, in discovery order
pub type ResourceSet = IndexMap<String, Resource>;

/// Discovers the resources of one kind through a metrics catalog
pub struct ResourceSource<M> {
    api: M,
    def: ResourceTypeDef,
}

impl<M: MetricsApi> ResourceSource<M> {
    pub fn new(api: M, def: &ResourceTypeDef) -> Self {
        Self {
            api,
            def: def.clone(),
        }
    }

    /// Source for the registered resource type `key`
    pub fn for_type(api: M, key: &str) -> Result<Self> {
        let def = get_resource_type(key)
            .ok_or_else(|| DiscoveryError::UnknownResourceType(key.to_string()))?;
        Ok(Self::new(api, def))
    }

    pub fn definition(&self) -> &ResourceTypeDef {
        &self.def
    }

    pub fn is_error_variant(&self, name: &str) -> bool {
        self.def.is_error_variant(name)
    }

    /// Discover every resource of this kind.
    ///
    /// A name seen more than once keeps its first position and takes the
    /// value built from its last occurrence. Any metric that does not carry
    /// exactly one identifying dimension, or belongs to another metric, fails
    /// the whole call.
    pub async fn discover_all(&self) -> Result<ResourceSet> {
        let request = ListMetricsRequest::new(&self.def.namespace, &self.def.metric_name)
            .with_dimension_filter(DimensionFilter::named(&self.def.dimension_name));
        let metrics = fetch_all_matching(&self.api, &request).await?;

        let mut resources = ResourceSet::with_capacity(metrics.len());
        for (position, metric) in metrics.iter().enumerate() {
            let name = self.resource_name(position, metric)?;
            let resource = Resource {
                name: name.to_string(),
                is_error_variant: self.is_error_variant(name),
            };
            resources.insert(resource.name.clone(), resource);
        }

        tracing::info!(
            "Discovered {} {} from {} metrics",
            resources.len(),
            self.def.display_name,
            metrics.len()
        );

        Ok(resources)
    }

    /// Discover a single resource by name. Walks the whole catalog first;
    /// `Ok(None)` means the name is not among the live resources.
    pub async fn discover_one(&self, name: &str) -> Result<Option<Resource>> {
        let mut resources = self.discover_all().await?;
        let found = resources.swap_remove(name);
        if found.is_none() {
            tracing::debug!("{} '{}' not found", self.def.display_name, name);
        }
        Ok(found)
    }

    /// Names of every resource of this kind, in discovery order
    pub async fn resource_names(&self) -> Result<Vec<String>> {
        Ok(self.discover_all().await?.into_keys().collect())
    }

    fn resource_name<'a>(&self, position: usize, metric: &'a MetricDescriptor) -> Result<&'a str> {
        if metric.metric_name != self.def.metric_name {
            return Err(self.malformed(
                position,
                metric,
                format!("expected metric {}", self.def.metric_name),
            ));
        }

        let mut values = metric
            .dimensions
            .iter()
            .filter(|d| d.name == self.def.dimension_name)
            .map(|d| d.value.as_str());

        match (values.next(), values.next()) {
            (Some(name), None) => Ok(name),
            (None, _) => Err(self.malformed(
                position,
                metric,
                format!("missing dimension {}", self.def.dimension_name),
            )),
            (Some(_), Some(_)) => Err(self.malformed(
                position,
                metric,
                format!("dimension {} appears more than once", self.def.dimension_name),
            )),
        }
    }

    fn malformed(&self, position: usize, metric: &MetricDescriptor, reason: String) -> DiscoveryError {
        tracing::warn!(
            "Aborting {} discovery: metric {} at position {}: {}",
            self.def.display_name,
            metric.metric_name,
            position,
            reason
        );
        DiscoveryError::MalformedDescriptor {
            position,
            metric_name: metric.metric_name.clone(),
            reason,
        }
    }
}

/// Run several independent discoveries concurrently.
/// Results come back in the order of `sources`.
pub async fn discover_many<M: MetricsApi>(
    sources: &[&ResourceSource<M>],
) -> Vec<Result<ResourceSet>> {
    join_all(sources.iter().map(|source| source.discover_all())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Dimension, FakeMetrics, MetricsPage};
    use std::time::Duration;

    const METRIC: &str = "ApproximateAgeOfOldestMessage";

    fn queue_metric(name: &str) -> MetricDescriptor {
        MetricDescriptor::new("AWS/SQS", METRIC, vec![Dimension::new("QueueName", name)])
    }

    /// Four single-queue pages linked by token-1..token-3
    fn four_pages() -> FakeMetrics {
        FakeMetrics::chained(vec![
            vec![queue_metric("Queue-1")],
            vec![queue_metric("Queue-2")],
            vec![queue_metric("Queue-3")],
            vec![queue_metric("Queue-4_error")],
        ])
        .expecting_metric(METRIC)
    }

    fn queues(fake: FakeMetrics) -> ResourceSource<FakeMetrics> {
        ResourceSource::for_type(fake, "sqs-queues").unwrap()
    }

    #[tokio::test]
    async fn test_multiple_pages_all_fetched_and_returned() {
        let source = queues(four_pages());

        let result = source.discover_all().await.unwrap();

        let names: Vec<_> = result.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Queue-1", "Queue-2", "Queue-3", "Queue-4_error"]);
        assert_eq!(source.api.call_count(), 4);
        assert!(source
            .api
            .calls()
            .iter()
            .all(|c| c.dimensions == vec![DimensionFilter::named("QueueName")]));
    }

    #[tokio::test]
    async fn test_single_page_fetched_and_returned() {
        let source = queues(FakeMetrics::chained(vec![vec![queue_metric("Queue-1")]]));

        let result = source.discover_all().await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result["Queue-1"].name, "Queue-1");
        assert_eq!(source.api.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_empty_set() {
        let source = queues(FakeMetrics::new().with_page(None, MetricsPage::default()));

        let result = source.discover_all().await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_discover_one_returns_correct_resource() {
        let source = queues(four_pages());

        let queue = source.discover_one("Queue-2").await.unwrap();

        assert_eq!(
            queue,
            Some(Resource {
                name: "Queue-2".to_string(),
                is_error_variant: false,
            })
        );
        assert_eq!(source.api.call_count(), 4);
    }

    #[tokio::test]
    async fn test_discover_one_populates_error_variant() {
        let source = queues(four_pages());

        let queue = source.discover_one("Queue-4_error").await.unwrap().unwrap();

        assert!(queue.is_error_variant);
    }

    #[tokio::test]
    async fn test_discover_one_reports_not_found() {
        let source = queues(four_pages());

        let queue = source.discover_one("Queue-9").await.unwrap();

        assert_eq!(queue, None);
    }

    #[tokio::test]
    async fn test_discover_one_transport_failure_is_not_not_found() {
        let source = queues(four_pages().with_failure(Some("token-2"), "connection reset"));

        let err = source.discover_one("Queue-1").await.unwrap_err();

        assert!(err.is_transport());
    }

    /// Repeated names keep their first position. The entry itself cannot
    /// tell which occurrence it came from since it is built from the name.
    #[tokio::test]
    async fn test_repeated_names_keep_first_position() {
        let source = queues(FakeMetrics::chained(vec![
            vec![queue_metric("Queue-1"), queue_metric("Queue-2")],
            vec![queue_metric("Queue-3"), queue_metric("Queue-1")],
        ]));

        let result = source.discover_all().await.unwrap();

        let names: Vec<_> = result.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Queue-1", "Queue-2", "Queue-3"]);
        assert_eq!(result["Queue-1"].name, "Queue-1");
    }

    #[tokio::test]
    async fn test_missing_dimension_fails_fast() {
        let broken = MetricDescriptor::new("AWS/SQS", METRIC, vec![Dimension::new("Other", "x")]);
        let source = queues(FakeMetrics::chained(vec![
            vec![queue_metric("Queue-1")],
            vec![broken],
        ]));

        let err = source.discover_all().await.unwrap_err();

        match err {
            DiscoveryError::MalformedDescriptor { position, reason, .. } => {
                assert_eq!(position, 1);
                assert!(reason.contains("QueueName"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repeated_identifying_dimension_fails_fast() {
        let ambiguous = MetricDescriptor::new(
            "AWS/SQS",
            METRIC,
            vec![Dimension::new("QueueName", "A"), Dimension::new("QueueName", "B")],
        );
        let source = queues(FakeMetrics::chained(vec![vec![queue_metric("Queue-1"), ambiguous]]));

        let err = source.discover_all().await.unwrap_err();

        match err {
            DiscoveryError::MalformedDescriptor { position, reason, .. } => {
                assert_eq!(position, 1);
                assert!(reason.contains("more than once"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_dimensions_alongside_identifying_one() {
        let metric = MetricDescriptor::new(
            "AWS/SQS",
            METRIC,
            vec![Dimension::new("Region", "eu-west-1"), Dimension::new("QueueName", "Queue-1")],
        );
        let source = queues(FakeMetrics::chained(vec![vec![metric]]));

        let result = source.discover_all().await.unwrap();

        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["Queue-1"]);
    }

    #[tokio::test]
    async fn test_foreign_metric_name_fails_fast() {
        let foreign = MetricDescriptor::new(
            "AWS/SQS",
            "NumberOfMessagesSent",
            vec![Dimension::new("QueueName", "Queue-1")],
        );
        let source = queues(FakeMetrics::chained(vec![vec![foreign]]));

        let err = source.discover_all().await.unwrap_err();

        assert!(matches!(err, DiscoveryError::MalformedDescriptor { position: 0, .. }));
    }

    #[tokio::test]
    async fn test_resource_names_in_page_order() {
        let source = queues(four_pages());

        let names = source.resource_names().await.unwrap();

        assert_eq!(names, vec!["Queue-1", "Queue-2", "Queue-3", "Queue-4_error"]);
    }

    #[test]
    fn test_unknown_resource_type() {
        let err = ResourceSource::for_type(FakeMetrics::new(), "nope").err().unwrap();
        assert!(matches!(err, DiscoveryError::UnknownResourceType(_)));
    }

    #[tokio::test]
    async fn test_discover_many_keeps_sources_independent() {
        let first = queues(four_pages());
        let second = queues(FakeMetrics::chained(vec![vec![queue_metric("Other-1")]]));

        let results = discover_many(&[&first, &second]).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().len(), 4);
        assert_eq!(
            results[1].as_ref().unwrap().keys().collect::<Vec<_>>(),
            vec!["Other-1"]
        );
        assert_eq!(first.api.call_count(), 4);
        assert_eq!(second.api.call_count(), 1);
    }

    struct SlowMetrics;

    impl MetricsApi for SlowMetrics {
        async fn list_metrics(
            &self,
            request: &crate::metrics::ListMetricsRequest,
        ) -> anyhow::Result<MetricsPage> {
            if request.next_token.is_some() {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(MetricsPage {
                metrics: vec![queue_metric("Queue-1")],
                next_token: Some("token-1".to_string()),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_discovery_returns_nothing() {
        let source = ResourceSource::for_type(SlowMetrics, "sqs-queues").unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(1), source.discover_all()).await;

        assert!(outcome.is_err());
    }
}
