// SPDX-License-Identifier: PMPL-1.0-or-later
//! Markdown report

use super::ReportSummary;
use crate::engine::UrlTestResult;
use chrono::Local;
use std::fmt::Write;

pub fn render_markdown(results: &[UrlTestResult]) -> String {
    let summary = ReportSummary::from_results(results);
    let mut out = String::new();

    out.push_str("# Accessibility Test Report\n\n## Summary\n\n");
    let _ = writeln!(out, "- **URLs Tested:** {}", summary.urls_tested);
    let _ = writeln!(out, "- **Total Violations:** {}", summary.total_violations);
    let _ = writeln!(out, "- **Total Passes:** {}", summary.total_passes);
    let _ = writeln!(out, "- **Errors:** {}", summary.total_errors);
    let _ = writeln!(out, "- **Compliance Rate:** {}%", summary.compliance_rate);
    let _ = writeln!(
        out,
        "- **Generated:** {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str("\n## Detailed Results\n\n");

    for result in results {
        let _ = writeln!(out, "### {}\n", result.url);

        if let Some(error) = &result.error {
            let _ = writeln!(out, "**Error:** {}\n", error);
            continue;
        }

        let violations = result.violations();
        if !violations.is_empty() {
            out.push_str("#### Violations\n\n");
            for v in violations {
                let _ = writeln!(
                    out,
                    "- **{}** ({})",
                    v.help,
                    v.impact.as_deref().unwrap_or("unknown")
                );
                let _ = writeln!(out, "  - {}", v.description);
                let _ = writeln!(
                    out,
                    "  - Help: {}\n",
                    v.help_url.as_deref().unwrap_or("No help URL")
                );
            }
        }

        let passes = result.passes();
        if !passes.is_empty() {
            out.push_str("#### Passes\n\n");
            for p in passes {
                let _ = writeln!(out, "- **{}** ✓", p.help);
                let _ = writeln!(out, "  - {}\n", p.description);
            }
        }

        if violations.is_empty() && passes.is_empty() {
            out.push_str("No violations or passes recorded.\n\n");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_results;

    #[test]
    fn test_markdown_summary_and_detail() {
        let md = render_markdown(&sample_results());
        assert!(md.starts_with("# Accessibility Test Report"));
        assert!(md.contains("- **URLs Tested:** 2"));
        assert!(md.contains("- **Compliance Rate:** 75%"));
        assert!(md.contains("- **color-contrast help** (serious)"));
        assert!(md.contains("**Error:** net::ERR_NAME_NOT_RESOLVED"));
    }
}
