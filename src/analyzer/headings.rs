// SPDX-License-Identifier: PMPL-1.0-or-later
//! Heading structure check - WCAG 1.3.1 Info and Relationships
//!
//! Reports documents without headings, and every place where the level
//! jumps down by more than one (h1 followed by h3). Going back up any
//! number of levels is fine.

use crate::analyzer::{anchor, selector, Check, SourceIndex};
use crate::issue::{Issue, Severity};
use scraper::{ElementRef, Html};

pub const NO_HEADINGS: &str = "NO_HEADINGS";
pub const SKIPPED_HEADING_LEVEL: &str = "SKIPPED_HEADING_LEVEL";

pub struct HeadingCheck;

impl Check for HeadingCheck {
    fn name(&self) -> &str {
        "Heading Structure"
    }

    fn rule_ids(&self) -> &[&str] {
        &[NO_HEADINGS, SKIPPED_HEADING_LEVEL]
    }

    fn check(&self, document: &Html, source: &SourceIndex) -> Vec<Issue> {
        let heading_sel = selector("h1, h2, h3, h4, h5, h6");
        let headings: Vec<(u8, ElementRef)> = document
            .select(&heading_sel)
            .filter_map(|el| heading_level(el.value().name()).map(|level| (level, el)))
            .collect();

        if headings.is_empty() {
            return vec![
                Issue::new(NO_HEADINGS, Severity::Warning, "No heading elements found")
                    .with_suggestion("Add heading elements to provide document structure"),
            ];
        }

        let mut issues = Vec::new();
        for pair in headings.windows(2) {
            let (prev, _) = pair[0];
            let (curr, element) = pair[1];
            if curr > prev + 1 {
                issues.push(anchor(
                    Issue::new(
                        SKIPPED_HEADING_LEVEL,
                        Severity::Warning,
                        &format!("Heading level skipped from h{} to h{}", prev, curr),
                    )
                    .with_suggestion("Use sequential heading levels (h1, h2, h3, etc.)"),
                    source,
                    element,
                ));
            }
        }

        issues
    }
}

/// Numeric level of a heading tag name ("h3" -> 3)
pub fn heading_level(tag: &str) -> Option<u8> {
    let level = tag.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Vec<Issue> {
        let document = Html::parse_document(html);
        HeadingCheck.check(&document, &SourceIndex::new(&document, html))
    }

    #[test]
    fn test_no_headings() {
        let issues = run("<html><body><p>Text</p></body></html>");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, NO_HEADINGS);
    }

    #[test]
    fn test_sequential_headings_pass() {
        let html = "<h1>A</h1><h2>B</h2><h3>C</h3><h2>D</h2><h1>E</h1>";
        assert!(run(html).is_empty());
    }

    #[test]
    fn test_skip_reports_later_heading() {
        let html = "<h1>Title</h1>\n<h3>Skipped</h3>\n<h4>Fine</h4>\n<h6>Again</h6>";
        let issues = run(html);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].rule_id, SKIPPED_HEADING_LEVEL);
        assert_eq!(issues[0].message, "Heading level skipped from h1 to h3");
        assert!(issues[0].element.starts_with("<h3>"));
        assert_eq!(issues[0].line_number, Some(2));
        assert_eq!(issues[1].message, "Heading level skipped from h4 to h6");
    }

    #[test]
    fn test_first_heading_need_not_be_h1() {
        assert!(run("<h2>Start</h2><h3>Next</h3>").is_empty());
    }

    #[test]
    fn test_heading_level_parse() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("header"), None);
    }
}
