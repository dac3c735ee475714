//! Metrics Paginator
//!
//! Walks the metrics catalog's continuation token to the end and returns
//! every metric in arrival order.

use crate::error::{DiscoveryError, Result};
use crate::metrics::{ListMetricsRequest, MetricDescriptor, MetricsApi, MetricsPage};

/// Fetch every metric named `metric_name` in `namespace` (auto-paginate)
pub async fn fetch_all<M: MetricsApi>(
    api: &M,
    namespace: &str,
    metric_name: &str,
) -> Result<Vec<MetricDescriptor>> {
    fetch_all_matching(api, &ListMetricsRequest::new(namespace, metric_name)).await
}

/// Fetch every metric selected by `request` (auto-paginate).
///
/// The walk starts without a token regardless of `request.next_token` and
/// stops at the first page without a continuation token. No page cap is
/// applied: termination is up to the catalog.
pub async fn fetch_all_matching<M: MetricsApi>(
    api: &M,
    request: &ListMetricsRequest,
) -> Result<Vec<MetricDescriptor>> {
    if request.metric_name.is_empty() {
        return Err(DiscoveryError::InvalidRequest(
            "metric name must not be empty".to_string(),
        ));
    }

    let mut all_metrics = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch_page(api, &request.with_token(page_token.take())).await?;
        pages += 1;

        let next_token = page.continuation().map(str::to_string);
        tracing::debug!(
            "{}: page {} returned {} metrics, more: {}",
            request.metric_name,
            pages,
            page.metrics.len(),
            next_token.is_some()
        );
        all_metrics.extend(page.metrics);

        match next_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    tracing::debug!(
        "{}: {} metrics across {} pages",
        request.metric_name,
        all_metrics.len(),
        pages
    );

    Ok(all_metrics)
}

/// Fetch one page. Catalog errors pass through untouched.
pub async fn fetch_page<M: MetricsApi>(api: &M, request: &ListMetricsRequest) -> Result<MetricsPage> {
    api.list_metrics(request)
        .await
        .map_err(DiscoveryError::Transport)
}
