// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for report generation and CI gating

use a11yguard::ci::{create_github_issue_comment, should_fail_build, CiHelper, CiPlatform};
use a11yguard::engine::{AxeResults, NodeResult, RuleOutcome, UrlTestResult};
use a11yguard::report::{ReportFormat, ReportGenerator, ReportSummary};
use tempfile::TempDir;

fn rule(id: &str, nodes: &[&str]) -> RuleOutcome {
    RuleOutcome {
        id: id.to_string(),
        impact: Some("serious".to_string()),
        description: format!("{} check", id),
        help: format!("Fix {}", id),
        help_url: None,
        tags: vec!["wcag2aa".to_string()],
        nodes: nodes
            .iter()
            .map(|html| NodeResult {
                html: html.to_string(),
                target: vec!["body".to_string()],
                failure_summary: None,
            })
            .collect(),
    }
}

fn results() -> Vec<UrlTestResult> {
    vec![
        UrlTestResult::success(
            "https://shop.example",
            AxeResults {
                violations: vec![rule("image-alt", &["<img src=\"a\">", "<img src=\"b\">"])],
                passes: vec![rule("label", &[]), rule("link-name", &[]), rule("region", &[])],
                ..Default::default()
            },
        ),
        UrlTestResult::success(
            "https://shop.example/about",
            AxeResults {
                passes: vec![rule("label", &[])],
                ..Default::default()
            },
        ),
        UrlTestResult::failure("https://shop.example/down", "connection refused"),
    ]
}

#[test]
fn test_summary_counts_exclude_errored_urls() {
    let summary = ReportSummary::from_results(&results());
    assert_eq!(summary.urls_tested, 3);
    assert_eq!(summary.total_violations, 1);
    assert_eq!(summary.total_passes, 4);
    assert_eq!(summary.total_errors, 1);
    assert_eq!(summary.compliance_rate, 80.0);
}

#[test]
fn test_every_format_is_written() {
    let dir = TempDir::new().unwrap();
    let generator = ReportGenerator::new(dir.path().join("reports")).unwrap();
    let results = results();

    for format in [
        ReportFormat::Json,
        ReportFormat::Html,
        ReportFormat::Csv,
        ReportFormat::Markdown,
    ] {
        let path = generator
            .generate(&results, format, Some(format!("report.{}", format.extension()).as_str()))
            .unwrap();
        assert!(path.exists(), "{} missing", path.display());
        assert!(path.starts_with(generator.output_dir()));
    }

    let csv = std::fs::read_to_string(generator.output_dir().join("report.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    // header, one row per violation node, one ERROR row
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "url,timestamp,rule_id,rule_name,severity,element,message");
    assert!(lines[3].contains(",ERROR,Test Error,error,"));

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(generator.output_dir().join("report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["metadata"]["total_tests"], 3);
    assert_eq!(json["summary"]["total_errors"], 1);
    assert_eq!(json["results"][0]["results"]["violations"][0]["helpUrl"], serde_json::Value::Null);

    let html = std::fs::read_to_string(generator.output_dir().join("report.html")).unwrap();
    assert!(html.contains("&lt;img src=\"a\"&gt;") || html.contains("&lt;img src=&quot;a&quot;&gt;"));
    assert!(html.contains("connection refused"));
}

#[test]
fn test_default_filenames_are_timestamped() {
    let dir = TempDir::new().unwrap();
    let generator = ReportGenerator::new(dir.path()).unwrap();
    let path = generator.generate_markdown_report(&results(), None).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("accessibility_report_"), "{}", name);
    assert!(name.ends_with(".md"), "{}", name);
}

#[test]
fn test_gate_fails_on_errors_and_threshold() {
    let results = results();
    // one violation is within the limit, but a URL errored
    assert!(should_fail_build(&results, 5));

    let clean: Vec<UrlTestResult> = results.into_iter().filter(|r| !r.is_error()).collect();
    assert!(!should_fail_build(&clean, 1));
    assert!(should_fail_build(&clean, 0));
}

#[test]
fn test_ci_reports_on_github_actions() {
    let dir = TempDir::new().unwrap();
    let output_file = dir.path().join("github_output");
    let helper = CiHelper::with_platform(CiPlatform::GithubActions).with_output_file(&output_file);

    let reports = helper.generate_ci_reports(&results(), dir.path()).unwrap();
    let kinds: Vec<&str> = reports.keys().map(String::as_str).collect();
    assert_eq!(kinds, vec!["ci_summary", "html", "json", "markdown"]);

    let summary = std::fs::read_to_string(&reports["ci_summary"]).unwrap();
    assert!(summary.contains("**URLs Tested:** 3"));
    assert!(summary.contains("❌ Failed"));

    let mut paths: Vec<_> = reports.values().cloned().collect();
    paths.push(dir.path().join("never-written.html"));
    assert_eq!(helper.upload_artifacts(&paths, "accessibility-reports").len(), 4);

    helper.set_ci_output("violations", "1").unwrap();
    helper.set_ci_output("status", "failed").unwrap();
    assert_eq!(
        std::fs::read_to_string(&output_file).unwrap(),
        "violations=1\nstatus=failed\n"
    );
}

#[test]
fn test_github_comment_lists_details() {
    let comment = create_github_issue_comment(&results());
    assert!(comment.contains("### https://shop.example\n"));
    assert!(comment.contains("- **Fix image-alt** (serious)"));
    assert!(comment.contains("#### Passes (3)"));
    assert!(comment.contains("❌ **Error:**"));
    assert!(comment.ends_with("</details>"));
}
