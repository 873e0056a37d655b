// SPDX-License-Identifier: PMPL-1.0-or-later
//! Link target check - WCAG 2.1.1 Keyboard
//!
//! An `<a>` without `href` is not focusable, so any click handler on it
//! is unreachable from the keyboard.

use crate::analyzer::{anchor, non_empty_attr, selector, Check, SourceIndex};
use crate::issue::{Issue, Severity};
use scraper::Html;

pub const LINK_NO_HREF: &str = "LINK_NO_HREF";

pub struct KeyboardCheck;

impl Check for KeyboardCheck {
    fn name(&self) -> &str {
        "Keyboard Navigation"
    }

    fn rule_ids(&self) -> &[&str] {
        &[LINK_NO_HREF]
    }

    fn check(&self, document: &Html, source: &SourceIndex) -> Vec<Issue> {
        let link_sel = selector("a");

        document
            .select(&link_sel)
            .filter(|link| non_empty_attr(link, "href").is_none())
            .map(|link| {
                anchor(
                    Issue::new(LINK_NO_HREF, Severity::Error, "Link element has no href attribute")
                        .with_suggestion("Add href attribute or use button element instead"),
                    source,
                    link,
                )
            })
            .collect()
    }
}
