// SPDX-License-Identifier: PMPL-1.0-or-later
//! Client for the Tenon.io accessibility API
//!
//! Every call is a form POST to `{base_url}/index.php`. Transport and
//! HTTP failures never propagate: they come back as `{"error": ...}`
//! objects, the same shape the API itself uses.

use crate::config::TenonConfig;
use crate::engine::{AxeResults, NodeResult, RuleOutcome, UrlTestResult, UrlTester};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

pub struct TenonClient {
    client: Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
}

impl TenonClient {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        let client = Client::builder()
            .user_agent(concat!("a11yguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(5),
        }
    }

    pub fn from_config(api_key: &str, config: &TenonConfig) -> Self {
        Self::new(api_key, &config.base_url)
            .with_poll_interval(Duration::from_secs(config.poll_interval_secs))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/index.php", self.base_url)
    }

    async fn post_form(&self, fields: &[(&str, &str)]) -> Result<Value> {
        let mut form: Vec<(&str, &str)> = vec![("key", self.api_key.as_str())];
        form.extend_from_slice(fields);

        let response = self
            .client
            .post(self.endpoint())
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Submit a URL for testing. `options` are passed through as extra form fields.
    pub async fn test_url(&self, url: &str, options: &[(&str, &str)]) -> Value {
        info!("Testing URL with Tenon: {}", url);
        let mut fields = vec![("url", url)];
        fields.extend_from_slice(options);

        let metadata = json!({
            "url": url,
            "timestamp": Utc::now().to_rfc3339(),
            "api_version": "tenon.io",
        });

        match self.post_form(&fields).await {
            Ok(result) => with_metadata(result, metadata),
            Err(e) => {
                error!("Error testing {} with Tenon: {}", url, e);
                json!({ "error": e.to_string(), "metadata": metadata })
            }
        }
    }

    /// Submit raw HTML for testing
    pub async fn test_html(&self, html: &str, options: &[(&str, &str)]) -> Value {
        info!("Testing HTML content with Tenon");
        let mut fields = vec![("src", html)];
        fields.extend_from_slice(options);

        let metadata = json!({
            "content_type": "html",
            "timestamp": Utc::now().to_rfc3339(),
            "api_version": "tenon.io",
        });

        match self.post_form(&fields).await {
            Ok(result) => with_metadata(result, metadata),
            Err(e) => {
                error!("Error testing HTML with Tenon: {}", e);
                json!({ "error": e.to_string(), "metadata": metadata })
            }
        }
    }

    pub async fn get_test_status(&self, test_id: &str) -> Value {
        self.post_or_error(&[("testID", test_id)], "getting test status")
            .await
    }

    /// Poll [`get_test_status`](Self::get_test_status) until the test reports
    /// `complete`, an error comes back, or `max_wait` elapses.
    pub async fn wait_for_test_completion(&self, test_id: &str, max_wait: Duration) -> Value {
        let start = Instant::now();

        while start.elapsed() < max_wait {
            let status = self.get_test_status(test_id).await;
            if status.get("error").is_some() {
                return status;
            }
            if status.get("status").and_then(Value::as_str) == Some("complete") {
                return status;
            }
            debug!("Tenon test {} not complete yet", test_id);
            tokio::time::sleep(self.poll_interval).await;
        }

        json!({
            "error": format!(
                "Test {} did not complete within {} seconds",
                test_id,
                max_wait.as_secs()
            )
        })
    }

    pub async fn get_available_tests(&self) -> Value {
        self.post_or_error(&[("action", "tests")], "getting available tests")
            .await
    }

    pub async fn get_test_metadata(&self, test_id: &str) -> Value {
        self.post_or_error(&[("action", "metadata"), ("testID", test_id)], "getting test metadata")
            .await
    }

    /// The key is valid when listing available tests succeeds
    pub async fn validate_api_key(&self) -> bool {
        self.get_available_tests().await.get("error").is_none()
    }

    pub async fn get_usage_stats(&self) -> Value {
        self.post_or_error(&[("action", "usage")], "getting usage stats")
            .await
    }

    async fn post_or_error(&self, fields: &[(&str, &str)], what: &str) -> Value {
        match self.post_form(fields).await {
            Ok(value) => value,
            Err(e) => {
                error!("Error {}: {}", what, e);
                json!({ "error": e.to_string() })
            }
        }
    }
}

fn with_metadata(mut result: Value, metadata: Value) -> Value {
    match result.as_object_mut() {
        Some(map) => {
            map.insert("metadata".to_string(), metadata);
            result
        }
        None => json!({ "response": result, "metadata": metadata }),
    }
}

/// Convert a Tenon response into the common result shape.
///
/// Each `resultSet` entry becomes one violation. A response carrying
/// `error`, or a non-200 `status` code, becomes an error result.
pub fn to_url_result(url: &str, response: &Value) -> UrlTestResult {
    if let Some(err) = response.get("error") {
        let message = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
        return UrlTestResult::failure(url, Error::Tenon(message));
    }

    if let Some(code) = response.get("status").and_then(Value::as_u64) {
        if code != 200 {
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            return UrlTestResult::failure(url, Error::Tenon(format!("{} ({})", message, code)));
        }
    }

    let violations = response
        .get("resultSet")
        .and_then(Value::as_array)
        .map(|set| set.iter().map(result_set_entry).collect())
        .unwrap_or_default();

    UrlTestResult::success(
        url,
        AxeResults {
            violations,
            ..Default::default()
        },
    )
}

fn result_set_entry(entry: &Value) -> RuleOutcome {
    let text = |key: &str| entry.get(key).and_then(Value::as_str).unwrap_or("").to_string();

    let id = match entry.get("tID") {
        Some(Value::String(s)) => s.clone(),
        Some(v) if !v.is_null() => v.to_string(),
        _ => "tenon".to_string(),
    };

    let impact = entry.get("priority").and_then(Value::as_u64).map(|p| match p {
        p if p >= 80 => "critical".to_string(),
        p if p >= 60 => "serious".to_string(),
        p if p >= 40 => "moderate".to_string(),
        _ => "minor".to_string(),
    });

    let tags = entry
        .get("standards")
        .and_then(Value::as_array)
        .map(|s| s.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    let target = match text("xpath") {
        xpath if xpath.is_empty() => Vec::new(),
        xpath => vec![xpath],
    };

    RuleOutcome {
        id,
        impact,
        description: text("errorDescription"),
        help: text("errorTitle"),
        help_url: entry.get("ref").and_then(Value::as_str).map(str::to_string),
        tags,
        nodes: vec![NodeResult {
            html: text("errorSnippet"),
            target,
            failure_summary: None,
        }],
    }
}

#[async_trait]
impl UrlTester for TenonClient {
    fn name(&self) -> &str {
        "tenon.io"
    }

    async fn test_url(&mut self, url: &str, rules: Option<&[String]>) -> UrlTestResult {
        if rules.is_some() {
            debug!("Tenon does not support rule selection; running all tests");
        }
        let response = TenonClient::test_url(self, url, &[]).await;
        to_url_result(url, &response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = TenonClient::new("k", "https://tenon.io/api/");
        assert_eq!(client.endpoint(), "https://tenon.io/api/index.php");
    }

    #[test]
    fn test_result_set_maps_to_violations() {
        let response = json!({
            "status": 200,
            "resultSet": [{
                "tID": 31,
                "priority": 85,
                "errorTitle": "Image missing alt",
                "errorDescription": "This image has no alt attribute",
                "errorSnippet": "<img src=\"logo.png\">",
                "xpath": "/html/body/img",
                "ref": "https://tenon.io/bestpractice.php?tID=31",
                "standards": ["Web Content Accessibility Guidelines (WCAG) 2.0, Level A: 1.1.1"]
            }]
        });
        let result = to_url_result("https://example.com", &response);
        assert!(!result.is_error());
        let v = &result.violations()[0];
        assert_eq!(v.id, "31");
        assert_eq!(v.impact.as_deref(), Some("critical"));
        assert_eq!(v.nodes[0].target, vec!["/html/body/img"]);
        assert_eq!(result.violation_count(), 1);
    }

    #[test]
    fn test_error_and_status_responses_become_error_results() {
        let result = to_url_result("u", &json!({ "error": "connection refused" }));
        assert!(result.error.as_deref().unwrap().contains("connection refused"));

        let result = to_url_result("u", &json!({ "status": 401, "message": "Unauthorized" }));
        assert!(result.error.as_deref().unwrap().contains("Unauthorized (401)"));
    }

    #[test]
    fn test_metadata_on_non_object_response() {
        let value = with_metadata(json!([1, 2]), json!({ "api_version": "tenon.io" }));
        assert_eq!(value["response"], json!([1, 2]));
        assert_eq!(value["metadata"]["api_version"], "tenon.io");
    }
}
