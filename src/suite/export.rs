// SPDX-License-Identifier: PMPL-1.0-or-later
//! Export of suite results to JSON, CSV or HTML files

use super::{SuiteSummary, TestResult, TestSuite};
use crate::error::{Error, Result};
use crate::report::default_filename;
use html_escape::encode_text;
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    suite_name: &'a str,
    summary: SuiteSummary,
    results: &'a [TestResult],
}

impl TestSuite {
    /// Write the current results. Without a path the file is
    /// `test_results_<YYYYmmdd_HHMMSS>.<ext>` in the working directory.
    pub fn export_results(&self, format: ExportFormat, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(default_filename("test_results", format.extension())),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        match format {
            ExportFormat::Json => {
                let export = JsonExport {
                    suite_name: &self.name,
                    summary: self.get_results_summary(),
                    results: self.results(),
                };
                std::fs::write(&path, serde_json::to_string_pretty(&export)?)?;
            }
            ExportFormat::Csv => self.write_csv(&path)?,
            ExportFormat::Html => std::fs::write(&path, self.render_html())?,
        }

        info!("Exported {} results to {}", format, path.display());
        Ok(path)
    }

    fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "Test Name",
            "Category",
            "Priority",
            "Status",
            "Message",
            "Duration",
            "Timestamp",
        ])?;
        for r in self.results() {
            let duration = format!("{:.4}", r.duration);
            let timestamp = r.timestamp.to_rfc3339();
            writer.write_record([
                r.test_name.as_str(),
                r.category.as_str(),
                r.priority.as_str(),
                r.status.as_str(),
                r.message.as_str(),
                duration.as_str(),
                timestamp.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn render_html(&self) -> String {
        let summary = self.get_results_summary();
        let name = encode_text(&self.name);
        let mut out = String::new();

        let _ = write!(
            out,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Test Results - {name}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 20px; }}
.summary {{ background: #f5f5f5; padding: 20px; border-radius: 5px; margin-bottom: 20px; }}
.passed {{ color: green; }}
.failed {{ color: red; }}
.error {{ color: orange; }}
.skipped {{ color: gray; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
th {{ background-color: #f2f2f2; }}
</style>
</head>
<body>
<h1>Test Results: {name}</h1>
<div class="summary">
<h2>Summary</h2>
<p><strong>Total Tests:</strong> {total}</p>
<p><strong>Passed:</strong> <span class="passed">{passed}</span></p>
<p><strong>Failed:</strong> <span class="failed">{failed}</span></p>
<p><strong>Errors:</strong> <span class="error">{errors}</span></p>
<p><strong>Skipped:</strong> <span class="skipped">{skipped}</span></p>
<p><strong>Success Rate:</strong> {rate}%</p>
</div>
<h2>Detailed Results</h2>
<table>
<tr><th>Test Name</th><th>Category</th><th>Priority</th><th>Status</th><th>Message</th><th>Duration</th><th>Timestamp</th></tr>
"#,
            name = name,
            total = summary.total_tests,
            passed = summary.passed,
            failed = summary.failed,
            errors = summary.errors,
            skipped = summary.skipped,
            rate = summary.success_rate,
        );

        for r in self.results() {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{:.2}s</td><td>{}</td></tr>",
                encode_text(&r.test_name),
                encode_text(&r.category),
                r.priority,
                r.status,
                r.status,
                encode_text(&r.message),
                r.duration,
                r.timestamp.to_rfc3339()
            );
        }

        out.push_str("</table>\n</body>\n</html>\n");
        out
    }
}
