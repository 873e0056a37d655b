// SPDX-License-Identifier: PMPL-1.0-or-later
//! Form label check - WCAG 3.3.2 Labels or Instructions
//!
//! A form control with an `id` must be referenced by a `<label for>`.
//! Controls without an id cannot be associated this way and are left to
//! the rule engine.

use crate::analyzer::{anchor, selector, Check, SourceIndex};
use crate::issue::{Issue, Severity};
use scraper::Html;
use std::collections::HashSet;

pub const FORM_CONTROL_NO_LABEL: &str = "FORM_CONTROL_NO_LABEL";

pub struct FormLabelCheck;

impl Check for FormLabelCheck {
    fn name(&self) -> &str {
        "Form Labels"
    }

    fn rule_ids(&self) -> &[&str] {
        &[FORM_CONTROL_NO_LABEL]
    }

    fn check(&self, document: &Html, source: &SourceIndex) -> Vec<Issue> {
        let control_sel = selector("input, select, textarea");
        let label_sel = selector("label[for]");
        let mut issues = Vec::new();

        let label_fors: HashSet<&str> = document
            .select(&label_sel)
            .filter_map(|l| l.value().attr("for"))
            .collect();

        for control in document.select(&control_sel) {
            let Some(id) = control.value().attr("id").filter(|id| !id.is_empty()) else {
                continue;
            };

            if label_fors.contains(id) {
                continue;
            }

            issues.push(anchor(
                Issue::new(
                    FORM_CONTROL_NO_LABEL,
                    Severity::Error,
                    &format!("Form control with id '{}' has no associated label", id),
                )
                .with_suggestion(
                    "Add a label element with 'for' attribute matching the control's id",
                ),
                source,
                control,
            ));
        }

        issues
    }
}
