//! HTTP client for the metrics catalog `ListMetrics` call
//!
//! Speaks the JSON 1.0 protocol: the request is POSTed as a JSON body and the
//! operation is selected by the `X-Amz-Target` header. Request signing is the
//! endpoint's concern (signing proxy or local emulator).

use super::{ListMetricsRequest, MetricsApi, MetricsPage};
use anyhow::{Context, Result};
use reqwest::Client;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Operation selector for `ListMetrics`
pub const LIST_METRICS_TARGET: &str = "GraniteServiceVersion20100801.ListMetrics";

/// Content type of the JSON 1.0 protocol
pub const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Sanitize response body for logging
/// Truncates long responses and drops non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client for the metrics catalog
#[derive(Clone)]
pub struct HttpMetricsClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpMetricsClient {
    /// Create a new client for `endpoint`
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mdisco/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `token` as a bearer credential on every call
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one `ListMetrics` call and parse the page
    pub async fn list_metrics_page(&self, request: &ListMetricsRequest) -> Result<MetricsPage> {
        let url = format!("{}/", self.endpoint);
        tracing::debug!(
            "POST {} ListMetrics metric={} token={:?}",
            url,
            request.metric_name,
            request.next_token
        );

        let mut builder = self
            .client
            .post(&url)
            .header("X-Amz-Target", LIST_METRICS_TARGET)
            .header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(serde_json::to_vec(request).context("Failed to encode request")?);

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only the sanitized/truncated body reaches the log
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(anyhow::anyhow!("API request failed: {}", status));
        }

        if body.is_empty() {
            return Ok(MetricsPage::default());
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

impl MetricsApi for HttpMetricsClient {
    async fn list_metrics(&self, request: &ListMetricsRequest) -> Result<MetricsPage> {
        self.list_metrics_page(request).await
    }
}

/// Format a metrics API error for display
/// Maps status codes to short messages and never echoes response bodies
pub fn format_api_error(error: &anyhow::Error) -> String {
    let error_str = error.to_string();

    if error_str.contains("403") {
        return "Permission denied. Check that the caller may list metrics.".to_string();
    }
    if error_str.contains("401") {
        return "Authentication failed. Check the configured API token.".to_string();
    }
    if error_str.contains("404") {
        return "Metrics endpoint not found. Check --endpoint.".to_string();
    }
    if error_str.contains("429") {
        return "Rate limit exceeded. Please try again later.".to_string();
    }
    if error_str.contains("400") {
        return "Invalid request. Check the namespace and metric name.".to_string();
    }
    if error_str.contains("500") || error_str.contains("503") {
        return "Metrics service temporarily unavailable. Please try again.".to_string();
    }
    if error_str.contains("API request failed") {
        return "Request failed. Check your network connection and try again.".to_string();
    }

    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
