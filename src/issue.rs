// SPDX-License-Identifier: PMPL-1.0-or-later
//! Issues produced by static HTML analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum length of the element snippet stored on an issue
pub const ELEMENT_SNIPPET_LEN: usize = 100;

/// Severity levels for static analysis issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Definite failure
    Error,
    /// Likely problem, needs review
    Warning,
    /// Informational
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accessibility issue found during static analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Rule identifier (e.g., "IMG_MISSING_ALT")
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// Outer HTML of the element (truncated), or "document"
    pub element: String,
    /// Line number (1-indexed)
    pub line_number: Option<usize>,
    /// Column number (1-indexed)
    pub column_number: Option<usize>,
    pub suggestion: Option<String>,
}

impl Issue {
    /// Create a new issue anchored at the whole document
    pub fn new(rule_id: &str, severity: Severity, message: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            message: message.to_string(),
            element: "document".to_string(),
            line_number: None,
            column_number: None,
            suggestion: None,
        }
    }

    /// Set the element snippet, truncated to [`ELEMENT_SNIPPET_LEN`] characters
    pub fn with_element(mut self, element: &str) -> Self {
        self.element = truncate_chars(element, ELEMENT_SNIPPET_LEN);
        self
    }

    /// Set line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line_number = Some(line);
        self
    }

    /// Set column number
    pub fn with_column(mut self, column: usize) -> Self {
        self.column_number = Some(column);
        self
    }

    /// Set suggestion
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    /// Get location string for display
    pub fn location_string(&self) -> String {
        match (self.line_number, self.column_number) {
            (Some(l), Some(c)) => format!("{}:{}", l, c),
            (Some(l), None) => l.to_string(),
            _ => "-".to_string(),
        }
    }
}

/// Aggregate view over a list of issues
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_issues: usize,
    pub severity_breakdown: BTreeMap<Severity, usize>,
    pub has_errors: bool,
    pub has_warnings: bool,
}

impl AnalysisSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut severity_breakdown = BTreeMap::new();
        for issue in issues {
            *severity_breakdown.entry(issue.severity).or_insert(0) += 1;
        }

        Self {
            total_issues: issues.len(),
            has_errors: severity_breakdown.contains_key(&Severity::Error),
            has_warnings: severity_breakdown.contains_key(&Severity::Warning),
            severity_breakdown,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.severity_breakdown.get(&severity).copied().unwrap_or(0)
    }
}

/// Truncate to at most `max` characters without splitting a code point
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
