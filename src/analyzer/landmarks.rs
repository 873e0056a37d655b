// SPDX-License-Identifier: PMPL-1.0-or-later
//! Landmark check - WCAG 1.3.1 Info and Relationships
//!
//! A page should expose at least one semantic region element so screen
//! reader users can jump between regions.

use crate::analyzer::{selector, Check, SourceIndex};
use crate::issue::{Issue, Severity};
use scraper::Html;

pub const MISSING_LANDMARKS: &str = "MISSING_LANDMARKS";

/// Elements that count as landmarks
pub const LANDMARK_ELEMENTS: &[&str] = &["header", "nav", "main", "aside", "footer"];

pub struct LandmarkCheck;

impl Check for LandmarkCheck {
    fn name(&self) -> &str {
        "Landmarks"
    }

    fn rule_ids(&self) -> &[&str] {
        &[MISSING_LANDMARKS]
    }

    fn check(&self, document: &Html, _source: &SourceIndex) -> Vec<Issue> {
        let landmark_sel = selector(&LANDMARK_ELEMENTS.join(", "));

        if document.select(&landmark_sel).next().is_some() {
            return Vec::new();
        }

        vec![
            Issue::new(MISSING_LANDMARKS, Severity::Warning, "No landmark elements found")
                .with_suggestion("Add semantic landmark elements (header, nav, main, etc.)"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Vec<Issue> {
        let document = Html::parse_document(html);
        LandmarkCheck.check(&document, &SourceIndex::new(&document, html))
    }

    #[test]
    fn test_div_only_page() {
        let issues = run(r#"<html><body><div class="header">Header</div></body></html>"#);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, MISSING_LANDMARKS);
        assert_eq!(issues[0].element, "document");
    }

    #[test]
    fn test_any_single_landmark_is_enough() {
        for tag in LANDMARK_ELEMENTS {
            let html = format!("<html><body><{0}>x</{0}></body></html>", tag);
            assert!(run(&html).is_empty(), "<{}> should count as a landmark", tag);
        }
    }
}
