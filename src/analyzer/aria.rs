// SPDX-License-Identifier: PMPL-1.0-or-later
//! ARIA naming check - WCAG 4.1.2 Name, Role, Value
//!
//! Elements given an explicit role need an accessible name, except for
//! roles that are presentational or are page-level landmarks named by
//! the document itself.

use crate::analyzer::{anchor, non_empty_attr, selector, Check, SourceIndex};
use crate::issue::{Issue, Severity};
use scraper::Html;

pub const ARIA_ROLE_NO_LABEL: &str = "ARIA_ROLE_NO_LABEL";

/// Roles that do not require an accessible name
pub const NAME_EXEMPT_ROLES: &[&str] = &["presentation", "none", "banner", "contentinfo"];

pub struct AriaCheck;

impl Check for AriaCheck {
    fn name(&self) -> &str {
        "ARIA Roles"
    }

    fn rule_ids(&self) -> &[&str] {
        &[ARIA_ROLE_NO_LABEL]
    }

    fn check(&self, document: &Html, source: &SourceIndex) -> Vec<Issue> {
        let role_sel = selector("[role]");
        let mut issues = Vec::new();

        for element in document.select(&role_sel) {
            let role = element.value().attr("role").unwrap_or("");
            if NAME_EXEMPT_ROLES.contains(&role) {
                continue;
            }

            let named = non_empty_attr(&element, "aria-label").is_some()
                || non_empty_attr(&element, "aria-labelledby").is_some();
            if named {
                continue;
            }

            issues.push(anchor(
                Issue::new(
                    ARIA_ROLE_NO_LABEL,
                    Severity::Warning,
                    &format!("Element with role '{}' has no accessible name", role),
                )
                .with_suggestion("Add aria-label or aria-labelledby attribute"),
                source,
                element,
            ));
        }

        issues
    }
}
