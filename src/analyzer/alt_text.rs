// SPDX-License-Identifier: PMPL-1.0-or-later
//! Image alt text check - WCAG 1.1.1 Non-text Content
//!
//! Every `<img>` must carry a non-empty `alt` attribute.

use crate::analyzer::{anchor, selector, Check, SourceIndex};
use crate::issue::{Issue, Severity};
use scraper::Html;

pub const IMG_MISSING_ALT: &str = "IMG_MISSING_ALT";

pub struct AltTextCheck;

impl Check for AltTextCheck {
    fn name(&self) -> &str {
        "Alt Text"
    }

    fn rule_ids(&self) -> &[&str] {
        &[IMG_MISSING_ALT]
    }

    fn check(&self, document: &Html, source: &SourceIndex) -> Vec<Issue> {
        let img_sel = selector("img");
        let mut issues = Vec::new();

        for img in document.select(&img_sel) {
            let has_alt = img.value().attr("alt").is_some_and(|alt| !alt.is_empty());
            if has_alt {
                continue;
            }

            issues.push(anchor(
                Issue::new(IMG_MISSING_ALT, Severity::Error, "Image missing alt text")
                    .with_suggestion("Add descriptive alt text to the image"),
                source,
                img,
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Vec<Issue> {
        let document = Html::parse_document(html);
        AltTextCheck.check(&document, &SourceIndex::new(&document, html))
    }

    #[test]
    fn test_single_missing_alt() {
        let html = r#"<html><body><img src="photo.jpg"></body></html>"#;
        let issues = run(html);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, IMG_MISSING_ALT);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].element.starts_with("<img"));
        assert_eq!(issues[0].line_number, Some(1));
    }

    #[test]
    fn test_empty_alt_is_flagged() {
        let issues = run(r#"<img src="divider.png" alt="">"#);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_described_images_pass() {
        let html = r#"
            <img src="logo.png" alt="Company logo">
            <img src="chart.png" alt="Bar chart of Q4 revenue">
        "#;
        assert!(run(html).is_empty());
    }

    #[test]
    fn test_one_issue_per_image() {
        let html = "<body>\n<img src=\"a.png\">\n<img src=\"b.png\" alt=\"B\">\n<img src=\"c.png\">\n</body>";
        let issues = run(html);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].line_number, Some(2));
        assert_eq!(issues[1].line_number, Some(4));
    }
}
