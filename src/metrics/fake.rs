//! In-memory metrics catalog for tests
//!
//! Serves canned pages keyed by the incoming continuation token and records
//! every request it receives.

use super::{ListMetricsRequest, MetricDescriptor, MetricsApi, MetricsPage};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned-page metrics catalog
#[derive(Default)]
pub struct FakeMetrics {
    pages: HashMap<Option<String>, MetricsPage>,
    failures: HashMap<Option<String>, String>,
    expected_metric: Option<String>,
    calls: Mutex<Vec<ListMetricsRequest>>,
}

impl FakeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` for requests carrying `token` (`None` is the first request)
    pub fn with_page(mut self, token: Option<&str>, page: MetricsPage) -> Self {
        self.pages.insert(token.map(str::to_string), page);
        self
    }

    /// Build a chain of pages: page `i` answers token `token-i` (the first
    /// answers no token) and points at `token-{i+1}`, except the last one.
    pub fn chained(pages: Vec<Vec<MetricDescriptor>>) -> Self {
        let count = pages.len();
        let mut fake = Self::new();
        for (i, metrics) in pages.into_iter().enumerate() {
            let token = (i > 0).then(|| format!("token-{i}"));
            let next_token = (i + 1 < count).then(|| format!("token-{}", i + 1));
            fake = fake.with_page(token.as_deref(), MetricsPage { metrics, next_token });
        }
        fake
    }

    /// Fail requests carrying `token` with `message`
    pub fn with_failure(mut self, token: Option<&str>, message: &str) -> Self {
        self.failures
            .insert(token.map(str::to_string), message.to_string());
        self
    }

    /// Reject requests for any other metric name
    pub fn expecting_metric(mut self, metric_name: &str) -> Self {
        self.expected_metric = Some(metric_name.to_string());
        self
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<ListMetricsRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

impl MetricsApi for FakeMetrics {
    async fn list_metrics(&self, request: &ListMetricsRequest) -> Result<MetricsPage> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        if let Some(expected) = &self.expected_metric {
            if *expected != request.metric_name {
                anyhow::bail!("unexpected metric name: {}", request.metric_name);
            }
        }

        if let Some(message) = self.failures.get(&request.next_token) {
            anyhow::bail!("{}", message);
        }

        self.pages
            .get(&request.next_token)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no page for token {:?}", request.next_token))
    }
}
