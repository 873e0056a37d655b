// SPDX-License-Identifier: PMPL-1.0-or-later
//! Inline color check - WCAG 1.4.3 Contrast (Minimum)
//!
//! Without rendering we cannot compute contrast ratios. What we can flag
//! is an inline style mentioning `color:` without `background-color:`.
//! The match is a plain substring test, so `border-color:` counts as a
//! color and the `background:` shorthand does not count as a background.

use crate::analyzer::{anchor, selector, Check, SourceIndex};
use crate::issue::{Issue, Severity};
use scraper::Html;

pub const POTENTIAL_CONTRAST_ISSUE: &str = "POTENTIAL_CONTRAST_ISSUE";

pub struct ContrastCheck;

impl Check for ContrastCheck {
    fn name(&self) -> &str {
        "Inline Color"
    }

    fn rule_ids(&self) -> &[&str] {
        &[POTENTIAL_CONTRAST_ISSUE]
    }

    fn check(&self, document: &Html, source: &SourceIndex) -> Vec<Issue> {
        let styled_sel = selector("[style]");
        let mut issues = Vec::new();

        for element in document.select(&styled_sel) {
            let style = element.value().attr("style").unwrap_or("");
            if style.contains("color:") && !style.contains("background-color:") {
                issues.push(anchor(
                    Issue::new(
                        POTENTIAL_CONTRAST_ISSUE,
                        Severity::Info,
                        "Element has color but no background-color specified",
                    )
                    .with_suggestion(
                        "Ensure sufficient color contrast ratio (4.5:1 for normal text)",
                    ),
                    source,
                    element,
                ));
            }
        }

        issues
    }
}
