// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for the WCAG 2.2 / Section 508 suites

use a11yguard::engine::load_page;
use a11yguard::suite::{suite_for, ExportFormat, Priority, TestContext, TestStatus};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn context(name: &str) -> TestContext {
    let html = std::fs::read_to_string(fixture(name)).unwrap();
    TestContext::new().with_url(name).with_html(&html)
}

#[test]
fn test_accessible_fixture_passes_all_catalogs() {
    let mut suite = suite_for("all").unwrap();
    suite.run_suite(&context("accessible.html"));

    let summary = suite.get_results_summary();
    assert_eq!(summary.total_tests, 25);
    assert_eq!(
        summary.passed, 25,
        "unexpected failures: {:?}",
        suite
            .filter_results(Some(TestStatus::Failed), None, None)
            .iter()
            .map(|r| &r.test_name)
            .collect::<Vec<_>>()
    );
    assert_eq!(summary.success_rate, 100.0);
}

#[test]
fn test_inaccessible_fixture_failures() {
    let mut suite = suite_for("all").unwrap();
    suite.run_suite(&context("inaccessible.html"));

    let summary = suite.get_results_summary();
    assert_eq!(
        summary.passed + summary.failed + summary.errors + summary.skipped,
        summary.total_tests
    );
    assert_eq!(summary.failed, 12);
    assert_eq!(summary.errors, 0);

    let wcag_failures = suite.filter_results(Some(TestStatus::Failed), Some("WCAG 2.2"), None);
    assert_eq!(wcag_failures.len(), 8);

    let section_508: Vec<&str> = suite
        .filter_results(Some(TestStatus::Failed), Some("Section 508"), None)
        .iter()
        .map(|r| r.test_name.as_str())
        .collect();
    assert_eq!(
        section_508,
        vec![
            "Equivalent Alternatives",
            "Document Structure",
            "Electronic Forms",
            "Skip Navigation"
        ]
    );

    let critical = suite.filter_results(Some(TestStatus::Failed), None, Some(Priority::Critical));
    assert_eq!(critical.len(), 5);

    // Contrast hints are left for a human
    let contrast = suite.filter_results(None, Some("WCAG 2.2"), None);
    let contrast = contrast
        .iter()
        .find(|r| r.test_name == "Color Contrast")
        .unwrap();
    assert_eq!(contrast.status, TestStatus::Passed);
    assert_eq!(contrast.details.as_ref().unwrap()["manual_review"], true);
}

#[test]
fn test_grouping_by_category_and_priority() {
    let mut suite = suite_for("all").unwrap();
    suite.run_suite(&context("inaccessible.html"));

    let by_category = suite.get_results_by_category();
    assert_eq!(by_category["WCAG 2.2"].len(), 10);
    assert_eq!(by_category["Section 508"].len(), 15);

    let by_priority = suite.get_results_by_priority();
    let first = by_priority.keys().next().copied();
    assert_eq!(first, Some(Priority::Critical));
    assert_eq!(by_priority[&Priority::Low].len(), 1);
}

#[test]
fn test_unknown_catalog_is_rejected() {
    assert!(suite_for("aria-1.3").is_err());
    assert_eq!(suite_for("508").unwrap().test_cases().len(), 15);
}

#[test]
fn test_export_round_trip_files() {
    let dir = TempDir::new().unwrap();
    let mut suite = suite_for("wcag").unwrap();
    suite.run_suite(&context("inaccessible.html"));

    let json = suite
        .export_results(ExportFormat::Json, Some(&dir.path().join("wcag.json")))
        .unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(value["summary"]["total_tests"], 10);
    assert_eq!(value["results"][0]["test_name"], "Alt Text for Images");
    assert_eq!(value["results"][0]["details"]["wcag_criterion"], "1.1.1");

    let csv = suite
        .export_results(ExportFormat::Csv, Some(&dir.path().join("wcag.csv")))
        .unwrap();
    assert_eq!(std::fs::read_to_string(csv).unwrap().lines().count(), 11);
}

#[tokio::test]
async fn test_suite_over_fetched_page() {
    let server = MockServer::start().await;
    let html = std::fs::read_to_string(fixture("accessible.html")).unwrap();
    Mock::given(method("GET"))
        .and(path("/store"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/store", server.uri());
    let page = load_page(&client, &url).await.unwrap();

    let mut suite = suite_for("section508").unwrap();
    suite.run_suite(&TestContext::new().with_url(&url).with_html(&page));
    assert_eq!(suite.get_results_summary().failed, 0);

    assert!(load_page(&client, &format!("{}/gone", server.uri()))
        .await
        .is_err());
}
