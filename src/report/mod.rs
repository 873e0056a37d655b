// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for per-URL test results.
//!
//! Supports multiple output formats:
//! - JSON: metadata, summary and the raw results
//! - HTML: self-contained page with summary metrics and per-URL details
//! - CSV: one row per violation node, one `ERROR` row per failed URL
//! - Markdown: summary bullets and per-URL detail, for PR comments

mod html;
mod markdown;

use crate::engine::UrlTestResult;
use crate::error::{Error, Result};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

pub use html::render_html;
pub use markdown::render_markdown;

/// Tool identifier written into report metadata
pub const TOOL_VERSION: &str = concat!("a11yguard-", env!("CARGO_PKG_VERSION"));

/// CSV columns, in order
pub const CSV_HEADER: [&str; 7] = [
    "url",
    "timestamp",
    "rule_id",
    "rule_name",
    "severity",
    "element",
    "message",
];

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Html,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
            ReportFormat::Csv => "csv",
            ReportFormat::Markdown => "md",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Html => write!(f, "html"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            "csv" => Ok(ReportFormat::Csv),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Aggregate numbers over a set of URL results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    /// Distinct URLs
    pub urls_tested: usize,
    pub total_violations: usize,
    pub total_passes: usize,
    /// URLs whose test errored
    pub total_errors: usize,
    /// Percentage, two decimals
    pub compliance_rate: f64,
}

impl ReportSummary {
    pub fn from_results(results: &[UrlTestResult]) -> Self {
        let urls: HashSet<&str> = results.iter().map(|r| r.url.as_str()).collect();
        let total_errors = results.iter().filter(|r| r.is_error()).count();
        let total_violations = results.iter().map(UrlTestResult::violation_count).sum();
        let total_passes = results.iter().map(UrlTestResult::pass_count).sum();

        Self {
            urls_tested: urls.len(),
            total_violations,
            total_passes,
            total_errors,
            compliance_rate: compliance_rate(total_violations, total_passes),
        }
    }
}

/// passes / (passes + violations) as a percentage rounded to 2 decimals; 0 when both are 0
pub fn compliance_rate(violations: usize, passes: usize) -> f64 {
    let total = violations + passes;
    if total == 0 {
        return 0.0;
    }
    round2(passes as f64 / total as f64 * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    metadata: JsonMetadata,
    summary: ReportSummary,
    results: &'a [UrlTestResult],
}

#[derive(Debug, Serialize)]
struct JsonMetadata {
    generated_at: DateTime<Utc>,
    total_tests: usize,
    tool_version: &'static str,
}

/// Render the JSON report document
pub fn render_json(results: &[UrlTestResult]) -> Result<String> {
    let report = JsonReport {
        metadata: JsonMetadata {
            generated_at: Utc::now(),
            total_tests: results.len(),
            tool_version: TOOL_VERSION,
        },
        summary: ReportSummary::from_results(results),
        results,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Flatten results into CSV rows (without the header)
pub fn csv_rows(results: &[UrlTestResult]) -> Vec<[String; 7]> {
    let mut rows = Vec::new();

    for result in results {
        let timestamp = result.timestamp.to_rfc3339();

        if let Some(error) = &result.error {
            rows.push([
                result.url.clone(),
                timestamp,
                "ERROR".to_string(),
                "Test Error".to_string(),
                "error".to_string(),
                String::new(),
                error.clone(),
            ]);
            continue;
        }

        for violation in result.violations() {
            for node in &violation.nodes {
                rows.push([
                    result.url.clone(),
                    timestamp.clone(),
                    violation.id.clone(),
                    violation.help.clone(),
                    violation.impact.clone().unwrap_or_default(),
                    node.html.clone(),
                    violation.description.clone(),
                ]);
            }
        }
    }

    rows
}

/// Writes report files into an output directory
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    /// Create a generator, creating `output_dir` if needed
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn report_path(&self, filename: Option<&str>, format: ReportFormat) -> PathBuf {
        match filename {
            Some(name) => self.output_dir.join(name),
            None => self.output_dir.join(default_filename(
                "accessibility_report",
                format.extension(),
            )),
        }
    }

    /// Generate a report in the given format
    pub fn generate(
        &self,
        results: &[UrlTestResult],
        format: ReportFormat,
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        match format {
            ReportFormat::Json => self.generate_json_report(results, filename),
            ReportFormat::Html => self.generate_html_report(results, filename),
            ReportFormat::Csv => self.generate_csv_report(results, filename),
            ReportFormat::Markdown => self.generate_markdown_report(results, filename),
        }
    }

    pub fn generate_json_report(
        &self,
        results: &[UrlTestResult],
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        let path = self.report_path(filename, ReportFormat::Json);
        std::fs::write(&path, render_json(results)?)?;
        info!("JSON report generated: {}", path.display());
        Ok(path)
    }

    pub fn generate_html_report(
        &self,
        results: &[UrlTestResult],
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        let path = self.report_path(filename, ReportFormat::Html);
        std::fs::write(&path, render_html(results))?;
        info!("HTML report generated: {}", path.display());
        Ok(path)
    }

    /// The header is written even when there are no rows
    pub fn generate_csv_report(
        &self,
        results: &[UrlTestResult],
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        let path = self.report_path(filename, ReportFormat::Csv);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(CSV_HEADER)?;
        for row in csv_rows(results) {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        info!("CSV report generated: {}", path.display());
        Ok(path)
    }

    pub fn generate_markdown_report(
        &self,
        results: &[UrlTestResult],
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        let path = self.report_path(filename, ReportFormat::Markdown);
        std::fs::write(&path, render_markdown(results))?;
        info!("Markdown report generated: {}", path.display());
        Ok(path)
    }
}

/// `<stem>_<YYYYmmdd_HHMMSS>.<ext>` in local time
pub fn default_filename(stem: &str, ext: &str) -> String {
    format!("{}_{}.{}", stem, Local::now().format("%Y%m%d_%H%M%S"), ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AxeResults, NodeResult, RuleOutcome};
    use tempfile::TempDir;

    pub(super) fn violation(id: &str, nodes: usize) -> RuleOutcome {
        RuleOutcome {
            id: id.to_string(),
            impact: Some("serious".to_string()),
            description: format!("{} description", id),
            help: format!("{} help", id),
            help_url: Some(format!("https://dequeuniversity.com/rules/axe/4.10/{}", id)),
            tags: vec!["wcag2aa".to_string()],
            nodes: (0..nodes)
                .map(|i| NodeResult {
                    html: format!("<div id=\"n{}\">", i),
                    target: vec![format!("#n{}", i)],
                    failure_summary: None,
                })
                .collect(),
        }
    }

    pub(super) fn sample_results() -> Vec<UrlTestResult> {
        vec![
            UrlTestResult::success(
                "https://example.com",
                AxeResults {
                    violations: vec![violation("color-contrast", 2)],
                    passes: vec![violation("image-alt", 1), violation("label", 1), violation("html-has-lang", 1)],
                    ..Default::default()
                },
            ),
            UrlTestResult::failure("https://broken.example.com", "net::ERR_NAME_NOT_RESOLVED"),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let summary = ReportSummary::from_results(&sample_results());
        assert_eq!(summary.urls_tested, 2);
        assert_eq!(summary.total_violations, 1);
        assert_eq!(summary.total_passes, 3);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.compliance_rate, 75.0);
    }

    #[test]
    fn test_compliance_rate_edges() {
        assert_eq!(compliance_rate(0, 0), 0.0);
        assert_eq!(compliance_rate(1, 2), 66.67);
        assert_eq!(compliance_rate(0, 5), 100.0);
    }

    #[test]
    fn test_duplicate_urls_counted_once() {
        let results = vec![
            UrlTestResult::success("https://a.example", AxeResults::default()),
            UrlTestResult::success("https://a.example", AxeResults::default()),
        ];
        assert_eq!(ReportSummary::from_results(&results).urls_tested, 1);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert!(matches!(
            "pdf".parse::<ReportFormat>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_csv_rows_per_node_and_error() {
        let rows = csv_rows(&sample_results());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][2], "color-contrast");
        assert_eq!(rows[0][5], "<div id=\"n0\">");
        assert_eq!(rows[2][2], "ERROR");
        assert_eq!(rows[2][3], "Test Error");
    }

    #[test]
    fn test_generators_write_files() {
        let dir = TempDir::new().unwrap();
        let generator = ReportGenerator::new(dir.path().join("reports")).unwrap();
        let results = sample_results();

        let json = generator.generate_json_report(&results, Some("r.json")).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["metadata"]["total_tests"], 2);
        assert_eq!(value["metadata"]["tool_version"], "a11yguard-1.0.0");
        assert_eq!(value["summary"]["total_errors"], 1);

        let csv = generator.generate_csv_report(&[], None).unwrap();
        let content = std::fs::read_to_string(&csv).unwrap();
        assert_eq!(content.trim(), CSV_HEADER.join(","));
        let name = csv.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("accessibility_report_"));
        assert!(name.ends_with(".csv"));

        let md = generator
            .generate(&results, ReportFormat::Markdown, None)
            .unwrap();
        assert_eq!(md.extension().unwrap(), "md");
    }
}
