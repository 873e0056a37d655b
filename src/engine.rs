// SPDX-License-Identifier: PMPL-1.0-or-later
//! Per-URL result model shared by every rule engine.
//!
//! The shape follows axe-core's result object (`violations`, `passes`,
//! `incomplete`, `inapplicable`) so that browser runs, remote API runs
//! and static analysis all feed the same reports.

use crate::error::{Error, Result};
use crate::issue::{Issue, Severity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// One element matched by a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeResult {
    pub html: String,
    pub target: Vec<String>,
    #[serde(rename = "failureSummary", skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

/// Outcome of a single rule on a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOutcome {
    pub id: String,
    pub impact: Option<String>,
    pub description: String,
    pub help: String,
    #[serde(rename = "helpUrl")]
    pub help_url: Option<String>,
    pub tags: Vec<String>,
    pub nodes: Vec<NodeResult>,
}

impl RuleOutcome {
    /// Convert a static analysis issue into a rule outcome with one node
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            id: issue.rule_id.clone(),
            impact: Some(issue.severity.as_str().to_string()),
            description: issue.message.clone(),
            help: issue.suggestion.clone().unwrap_or_else(|| issue.message.clone()),
            help_url: None,
            tags: vec!["static-analysis".to_string()],
            nodes: vec![NodeResult {
                html: issue.element.clone(),
                target: issue
                    .line_number
                    .map(|l| vec![format!("line {}", l)])
                    .unwrap_or_default(),
                failure_summary: None,
            }],
        }
    }
}

/// Rule engine results for one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxeResults {
    pub violations: Vec<RuleOutcome>,
    pub passes: Vec<RuleOutcome>,
    pub incomplete: Vec<RuleOutcome>,
    pub inapplicable: Vec<RuleOutcome>,
}

/// Result of testing one URL (or file)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlTestResult {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<AxeResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UrlTestResult {
    pub fn success(url: &str, results: AxeResults) -> Self {
        Self {
            url: url.to_string(),
            timestamp: Utc::now(),
            results: Some(results),
            error: None,
        }
    }

    pub fn failure(url: &str, error: impl std::fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            timestamp: Utc::now(),
            results: None,
            error: Some(error.to_string()),
        }
    }

    /// Wrap static analysis issues: errors become violations, warnings
    /// incomplete and info inapplicable.
    pub fn from_static_issues(source: &str, issues: &[Issue]) -> Self {
        let mut results = AxeResults::default();
        for issue in issues {
            let outcome = RuleOutcome::from_issue(issue);
            match issue.severity {
                Severity::Error => results.violations.push(outcome),
                Severity::Warning => results.incomplete.push(outcome),
                Severity::Info => results.inapplicable.push(outcome),
            }
        }
        Self::success(source, results)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn violations(&self) -> &[RuleOutcome] {
        self.results.as_ref().map(|r| r.violations.as_slice()).unwrap_or(&[])
    }

    pub fn passes(&self) -> &[RuleOutcome] {
        self.results.as_ref().map(|r| r.passes.as_slice()).unwrap_or(&[])
    }

    /// Violations count; errored results contribute none
    pub fn violation_count(&self) -> usize {
        if self.is_error() {
            0
        } else {
            self.violations().len()
        }
    }

    /// Passes count; errored results contribute none
    pub fn pass_count(&self) -> usize {
        if self.is_error() {
            0
        } else {
            self.passes().len()
        }
    }
}

/// Something that can test a URL for accessibility.
///
/// Implementations never fail: problems are recorded in
/// [`UrlTestResult::error`].
#[async_trait]
pub trait UrlTester: Send {
    /// Engine name for logs and reports
    fn name(&self) -> &str;

    /// Test one URL, optionally restricted to the given rule ids
    async fn test_url(&mut self, url: &str, rules: Option<&[String]>) -> UrlTestResult;

    /// Release any held resources
    async fn close(&mut self) {}
}

/// Read a URL list: one entry per non-blank line, surrounding whitespace ignored
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Fetch page HTML for a target.
///
/// `http`/`https` URLs are downloaded, `file` URLs and anything that does
/// not parse as a URL are read from disk.
pub async fn load_page(client: &reqwest::Client, target: &str) -> Result<String> {
    let local = match Url::parse(target) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            debug!("Fetching {}", url);
            let response = client.get(url).send().await?.error_for_status()?;
            return Ok(response.text().await?);
        }
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|_| Error::Config(format!("Invalid file URL: {}", target)))?,
        Ok(url) if url.scheme().len() > 1 => {
            return Err(Error::UnsupportedFormat(format!("URL scheme {}", url.scheme())));
        }
        // Relative paths and Windows drive letters
        _ => PathBuf::from(target),
    };

    debug!("Reading {}", local.display());
    Ok(std::fs::read_to_string(local)?)
}
