// SPDX-License-Identifier: PMPL-1.0-or-later
//! Named test-case registry and runner.
//!
//! A [`TestSuite`] holds [`TestCase`]s, runs the enabled ones in
//! registration order against a shared read-only [`TestContext`], and
//! collects one [`TestResult`] per case. A check that returns an error
//! or panics produces an `error` result; the run always continues.
//!
//! Two catalogs ship with the crate: [`wcag::test_cases`] and
//! [`section508::test_cases`].

mod export;
pub mod section508;
pub mod wcag;

pub use export::ExportFormat;

use crate::analyzer::StaticAnalyzer;
use crate::error::{Error, Result};
use crate::issue::Issue;
use crate::report::round2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, error, info};

/// Context keys understood by the bundled catalogs
pub const URL_KEY: &str = "url";
pub const HTML_CONTENT_KEY: &str = "html_content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Error,
    Skipped,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TestStatus::Passed => "✅",
            TestStatus::Failed => "❌",
            TestStatus::Error => "⚠️",
            TestStatus::Skipped => "⏭️",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passed" => Ok(TestStatus::Passed),
            "failed" => Ok(TestStatus::Failed),
            "error" => Ok(TestStatus::Error),
            "skipped" => Ok(TestStatus::Skipped),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// What a check function reports
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub status: TestStatus,
    pub message: String,
    pub details: Option<Map<String, Value>>,
}

impl CheckOutcome {
    pub fn new(status: TestStatus, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn passed(message: &str) -> Self {
        Self::new(TestStatus::Passed, message)
    }

    pub fn failed(message: &str) -> Self {
        Self::new(TestStatus::Failed, message)
    }

    pub fn skipped(message: &str) -> Self {
        Self::new(TestStatus::Skipped, message)
    }

    /// Passed, but flagged with `manual_review: true` in the details
    pub fn needs_review(message: &str) -> Self {
        Self::passed(message).with_detail("manual_review", true)
    }

    /// Skip used when the context carries no HTML
    pub fn no_content() -> Self {
        Self::skipped("No HTML content provided for testing")
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn is_manual_review(&self) -> bool {
        self.details
            .as_ref()
            .and_then(|d| d.get("manual_review"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl From<bool> for CheckOutcome {
    fn from(ok: bool) -> Self {
        if ok {
            CheckOutcome::passed("Test passed")
        } else {
            CheckOutcome::failed("Test failed")
        }
    }
}

/// Shared read-only input for every check in a run
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    values: HashMap<String, Value>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(self, url: &str) -> Self {
        self.with(URL_KEY, url)
    }

    pub fn with_html(self, html: &str) -> Self {
        self.with(HTML_CONTENT_KEY, html)
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn url(&self) -> Option<&str> {
        self.get(URL_KEY).and_then(Value::as_str)
    }

    /// HTML under test; `None` when absent or empty
    pub fn html_content(&self) -> Option<&str> {
        self.get(HTML_CONTENT_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

pub type CheckFn = dyn Fn(&TestContext) -> Result<CheckOutcome> + Send + Sync;

pub struct TestCase {
    pub name: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub enabled: bool,
    check: Box<CheckFn>,
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl TestCase {
    pub fn new<F>(name: &str, description: &str, category: &str, priority: Priority, check: F) -> Self
    where
        F: Fn(&TestContext) -> Result<CheckOutcome> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            priority,
            enabled: true,
            check: Box::new(check),
        }
    }

    /// Case whose check is a plain predicate: true passes, false fails
    pub fn from_predicate<F>(
        name: &str,
        description: &str,
        category: &str,
        priority: Priority,
        predicate: F,
    ) -> Self
    where
        F: Fn(&TestContext) -> bool + Send + Sync + 'static,
    {
        Self::new(name, description, category, priority, move |ctx| {
            Ok(CheckOutcome::from(predicate(ctx)))
        })
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Run the check, turning errors and panics into an outcome
    fn execute(&self, context: &TestContext) -> CheckOutcome {
        let outcome = catch_unwind(AssertUnwindSafe(|| (self.check)(context)));

        let reason = match outcome {
            Ok(Ok(outcome)) => return outcome,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        error!("Error running test case {}: {}", self.name, reason);
        CheckOutcome::new(TestStatus::Error, &format!("Test error: {}", reason))
            .with_detail("error", reason)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub test_name: String,
    pub status: TestStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
    /// Seconds
    pub duration: f64,
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuiteSummary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    /// passed / total as a percentage, two decimals
    pub success_rate: f64,
}

pub struct TestSuite {
    pub name: String,
    test_cases: Vec<TestCase>,
    results: Vec<TestResult>,
}

impl Default for TestSuite {
    fn default() -> Self {
        Self::new("Accessibility Test Suite")
    }
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            test_cases: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn add_test_case(&mut self, test_case: TestCase) {
        debug!("Added test case: {}", test_case.name);
        self.test_cases.push(test_case);
    }

    pub fn add_test_cases(&mut self, test_cases: impl IntoIterator<Item = TestCase>) {
        for test_case in test_cases {
            self.add_test_case(test_case);
        }
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Run every enabled case, replacing the previous results
    pub fn run_suite(&mut self, context: &TestContext) -> &[TestResult] {
        let enabled: Vec<&TestCase> = self.test_cases.iter().filter(|tc| tc.enabled).collect();
        info!(
            "Running test suite '{}' with {} test cases",
            self.name,
            enabled.len()
        );

        let mut results = Vec::with_capacity(enabled.len());
        for test_case in enabled {
            debug!("Running test case: {}", test_case.name);
            let start = Instant::now();
            let outcome = test_case.execute(context);
            let duration = start.elapsed().as_secs_f64();

            info!(
                "{} {}: {}",
                outcome.status.emoji(),
                test_case.name,
                outcome.message
            );

            results.push(TestResult {
                test_name: test_case.name.clone(),
                status: outcome.status,
                message: outcome.message,
                details: outcome.details,
                duration,
                timestamp: Utc::now(),
                category: test_case.category.clone(),
                priority: test_case.priority,
            });
        }

        self.results = results;
        &self.results
    }

    pub fn get_results_summary(&self) -> SuiteSummary {
        let count = |status: TestStatus| self.results.iter().filter(|r| r.status == status).count();
        let total_tests = self.results.len();
        let passed = count(TestStatus::Passed);

        SuiteSummary {
            total_tests,
            passed,
            failed: count(TestStatus::Failed),
            errors: count(TestStatus::Error),
            skipped: count(TestStatus::Skipped),
            success_rate: if total_tests == 0 {
                0.0
            } else {
                round2(passed as f64 / total_tests as f64 * 100.0)
            },
        }
    }

    pub fn get_results_by_category(&self) -> BTreeMap<String, Vec<&TestResult>> {
        let mut grouped: BTreeMap<String, Vec<&TestResult>> = BTreeMap::new();
        for result in &self.results {
            grouped.entry(result.category.clone()).or_default().push(result);
        }
        grouped
    }

    pub fn get_results_by_priority(&self) -> BTreeMap<Priority, Vec<&TestResult>> {
        let mut grouped: BTreeMap<Priority, Vec<&TestResult>> = BTreeMap::new();
        for result in &self.results {
            grouped.entry(result.priority).or_default().push(result);
        }
        grouped
    }

    /// Results matching every given criterion
    pub fn filter_results(
        &self,
        status: Option<TestStatus>,
        category: Option<&str>,
        priority: Option<Priority>,
    ) -> Vec<&TestResult> {
        self.results
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .filter(|r| category.map_or(true, |c| r.category == c))
            .filter(|r| priority.map_or(true, |p| r.priority == p))
            .collect()
    }
}

/// Run the static analyzer and keep issues with the given rule ids
pub(crate) fn issues_for(html: &str, rule_ids: &[&str]) -> Vec<Issue> {
    StaticAnalyzer::new()
        .analyze_html(html)
        .into_iter()
        .filter(|issue| rule_ids.contains(&issue.rule_id.as_str()))
        .collect()
}

/// Issues as a JSON array for `details.issues`
pub(crate) fn issues_value(issues: &[Issue]) -> Result<Value> {
    Ok(serde_json::to_value(issues)?)
}

/// Build a suite from a catalog name: `wcag`, `section508` or `all`
pub fn suite_for(name: &str) -> Result<TestSuite> {
    match name.to_lowercase().as_str() {
        "wcag" => {
            let mut suite = TestSuite::new("WCAG 2.2 Test Suite");
            suite.add_test_cases(wcag::test_cases());
            Ok(suite)
        }
        "section508" | "508" => {
            let mut suite = TestSuite::new("Section 508 Test Suite");
            suite.add_test_cases(section508::test_cases());
            Ok(suite)
        }
        "all" => {
            let mut suite = TestSuite::new("Comprehensive Accessibility Test Suite");
            suite.add_test_cases(wcag::test_cases());
            suite.add_test_cases(section508::test_cases());
            Ok(suite)
        }
        other => Err(Error::Config(format!("Unknown test suite: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_suite() -> TestSuite {
        let mut suite = TestSuite::new("sample");
        suite.add_test_cases(vec![
            TestCase::from_predicate("always", "passes", "core", Priority::High, |_| true),
            TestCase::from_predicate("never", "fails", "core", Priority::Low, |_| false),
            TestCase::new("broken", "errors", "extra", Priority::Critical, |_| {
                Err(Error::Check("selector exploded".to_string()))
            }),
            TestCase::new("panics", "panics", "extra", Priority::Critical, |_| {
                panic!("boom")
            }),
            TestCase::new("needs-html", "skips", "core", Priority::Medium, |ctx| {
                Ok(match ctx.html_content() {
                    Some(_) => CheckOutcome::passed("has html"),
                    None => CheckOutcome::no_content(),
                })
            }),
            TestCase::from_predicate("off", "disabled", "core", Priority::Low, |_| true).disabled(),
        ]);
        suite
    }

    #[test]
    fn test_run_collects_every_enabled_case() {
        let mut suite = sample_suite();
        let results = suite.run_suite(&TestContext::new());
        assert_eq!(results.len(), 5);

        let statuses: Vec<TestStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                TestStatus::Passed,
                TestStatus::Failed,
                TestStatus::Error,
                TestStatus::Error,
                TestStatus::Skipped
            ]
        );
        assert_eq!(results[0].message, "Test passed");
        assert_eq!(results[1].message, "Test failed");
    }

    #[test]
    fn test_errors_and_panics_are_trapped() {
        let mut suite = sample_suite();
        suite.run_suite(&TestContext::new());
        let broken = &suite.results()[2];
        assert_eq!(broken.message, "Test error: Check failed: selector exploded");
        assert_eq!(
            broken.details.as_ref().unwrap()["error"],
            "Check failed: selector exploded"
        );

        let panicked = &suite.results()[3];
        assert_eq!(panicked.status, TestStatus::Error);
        assert!(panicked.message.contains("boom"));
    }

    #[test]
    fn test_summary_invariant() {
        let mut suite = sample_suite();
        suite.run_suite(&TestContext::new());
        let s = suite.get_results_summary();
        assert_eq!(s.total_tests, 5);
        assert_eq!(s.passed + s.failed + s.errors + s.skipped, s.total_tests);
        assert_eq!(s.success_rate, 20.0);
    }

    #[test]
    fn test_empty_summary() {
        let s = TestSuite::new("empty").get_results_summary();
        assert_eq!(s, SuiteSummary::default());
    }

    #[test]
    fn test_rerun_replaces_results() {
        let mut suite = sample_suite();
        suite.run_suite(&TestContext::new());
        suite.run_suite(&TestContext::new().with_html("<p>x</p>"));
        assert_eq!(suite.results().len(), 5);
        assert_eq!(suite.results()[4].status, TestStatus::Passed);
    }

    #[test]
    fn test_grouping_and_filtering() {
        let mut suite = sample_suite();
        suite.run_suite(&TestContext::new());

        let by_category = suite.get_results_by_category();
        assert_eq!(by_category["core"].len(), 3);
        assert_eq!(by_category["extra"].len(), 2);

        let by_priority = suite.get_results_by_priority();
        assert_eq!(by_priority[&Priority::Critical].len(), 2);
        assert_eq!(by_priority.keys().next(), Some(&Priority::Critical));

        let errors = suite.filter_results(Some(TestStatus::Error), None, None);
        assert_eq!(errors.len(), 2);
        let core_failed = suite.filter_results(Some(TestStatus::Failed), Some("core"), None);
        assert_eq!(core_failed[0].test_name, "never");
        assert!(suite
            .filter_results(None, Some("core"), Some(Priority::Critical))
            .is_empty());
    }

    #[test]
    fn test_context_treats_empty_html_as_missing() {
        let ctx = TestContext::new().with_html("").with_url("https://example.com");
        assert!(ctx.html_content().is_none());
        assert_eq!(ctx.url(), Some("https://example.com"));
    }

    #[test]
    fn test_needs_review_is_a_pass() {
        let outcome = CheckOutcome::needs_review("check contrast by hand");
        assert_eq!(outcome.status, TestStatus::Passed);
        assert!(outcome.is_manual_review());
    }

    #[test]
    fn test_suite_for_names() {
        assert_eq!(suite_for("wcag").unwrap().test_cases().len(), 10);
        assert_eq!(suite_for("section508").unwrap().test_cases().len(), 15);
        assert_eq!(suite_for("all").unwrap().test_cases().len(), 25);
        assert!(suite_for("ada").is_err());
    }
}
