// SPDX-License-Identifier: PMPL-1.0-or-later
//! Self-contained HTML report

use super::ReportSummary;
use crate::engine::{RuleOutcome, UrlTestResult};
use chrono::Local;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f4f6f8; color: #1a202c; }
header { background: #2c3e50; color: #fff; padding: 24px 32px; }
main { max-width: 1100px; margin: 0 auto; padding: 24px; }
.metrics { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; margin-bottom: 24px; }
.metric { background: #fff; border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
.metric .value { font-size: 2em; font-weight: 700; }
.metric.violations .value { color: #c53030; }
.metric.passes .value { color: #22543d; }
.metric.errors .value { color: #b7791f; }
section.url { background: #fff; border-radius: 8px; padding: 16px 24px; margin-bottom: 16px; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
details { margin: 8px 0; }
summary { cursor: pointer; font-weight: 600; }
.violation { border-left: 4px solid #c53030; background: #fff5f5; padding: 8px 12px; margin: 8px 0; }
.pass { border-left: 4px solid #2f855a; background: #f0fff4; padding: 8px 12px; margin: 8px 0; }
.error { border-left: 4px solid #b7791f; background: #fffaf0; padding: 8px 12px; margin: 8px 0; }
code { background: #edf2f7; padding: 2px 4px; border-radius: 3px; font-size: .9em; }
.impact { text-transform: uppercase; font-size: .8em; font-weight: 700; }
"#;

/// Render the full HTML document. Every interpolated value is escaped.
pub fn render_html(results: &[UrlTestResult]) -> String {
    let summary = ReportSummary::from_results(results);
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<title>Accessibility Test Report</title>\n");
    let _ = writeln!(out, "<style>{}</style>\n</head>\n<body>", STYLE);

    let _ = writeln!(
        out,
        "<header><h1>Accessibility Test Report</h1><p><strong>Generated:</strong> {}</p></header>",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str("<main>\n");

    render_metrics(&mut out, &summary);

    let errored: Vec<&UrlTestResult> = results.iter().filter(|r| r.is_error()).collect();
    if !errored.is_empty() {
        out.push_str("<section class=\"url\">\n<h2>Errors</h2>\n");
        for result in errored {
            let _ = writeln!(
                out,
                "<div class=\"error\"><strong>{}</strong>: {}</div>",
                encode_text(&result.url),
                encode_text(result.error.as_deref().unwrap_or_default())
            );
        }
        out.push_str("</section>\n");
    }

    for result in results.iter().filter(|r| !r.is_error()) {
        render_url_section(&mut out, result);
    }

    out.push_str("</main>\n</body>\n</html>\n");
    out
}

fn render_metrics(out: &mut String, summary: &ReportSummary) {
    out.push_str("<div class=\"metrics\">\n");
    let metrics = [
        ("", "URLs Tested", summary.urls_tested.to_string()),
        ("violations", "Violations", summary.total_violations.to_string()),
        ("passes", "Passes", summary.total_passes.to_string()),
        ("errors", "Errors", summary.total_errors.to_string()),
        ("", "Compliance Rate", format!("{}%", summary.compliance_rate)),
    ];
    for (class, label, value) in metrics {
        let _ = writeln!(
            out,
            "<div class=\"metric {}\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
            class, label, value
        );
    }
    out.push_str("</div>\n");
}

fn render_url_section(out: &mut String, result: &UrlTestResult) {
    let _ = writeln!(
        out,
        "<section class=\"url\">\n<h2>{}</h2>\n<p>{} violation(s), {} pass(es)</p>",
        encode_text(&result.url),
        result.violation_count(),
        result.pass_count()
    );

    if !result.violations().is_empty() {
        let _ = writeln!(
            out,
            "<details open>\n<summary>Violations ({})</summary>",
            result.violations().len()
        );
        for violation in result.violations() {
            render_violation(out, violation);
        }
        out.push_str("</details>\n");
    }

    if !result.passes().is_empty() {
        let _ = writeln!(
            out,
            "<details>\n<summary>Passes ({})</summary>",
            result.passes().len()
        );
        for pass in result.passes() {
            let _ = writeln!(
                out,
                "<div class=\"pass\"><strong>{}</strong><br>{}</div>",
                encode_text(&pass.help),
                encode_text(&pass.description)
            );
        }
        out.push_str("</details>\n");
    }

    out.push_str("</section>\n");
}

fn render_violation(out: &mut String, violation: &RuleOutcome) {
    let _ = write!(
        out,
        "<div class=\"violation\"><span class=\"impact\">{}</span> <strong>{}</strong> <code>{}</code><br>{}",
        encode_text(violation.impact.as_deref().unwrap_or("unknown")),
        encode_text(&violation.help),
        encode_text(&violation.id),
        encode_text(&violation.description)
    );

    if let Some(url) = &violation.help_url {
        let _ = write!(
            out,
            "<br><a href=\"{}\">Learn more</a>",
            encode_double_quoted_attribute(url)
        );
    }

    if !violation.nodes.is_empty() {
        out.push_str("<ul>");
        for node in &violation.nodes {
            let _ = write!(
                out,
                "<li><code>{}</code> {}</li>",
                encode_text(&node.html),
                encode_text(&node.target.join(", "))
            );
        }
        out.push_str("</ul>");
    }

    out.push_str("</div>\n");
}
