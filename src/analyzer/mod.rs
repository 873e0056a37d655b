// SPDX-License-Identifier: PMPL-1.0-or-later
//! Static HTML/ARIA analyzer.
//!
//! Parses markup without a browser and runs a fixed set of heuristic
//! checks. Each check lives in its own module and produces [`Issue`]s
//! keyed by a stable rule id:
//!
//! - **alt_text**: `IMG_MISSING_ALT`
//! - **landmarks**: `MISSING_LANDMARKS`
//! - **forms**: `FORM_CONTROL_NO_LABEL`
//! - **headings**: `NO_HEADINGS`, `SKIPPED_HEADING_LEVEL`
//! - **contrast**: `POTENTIAL_CONTRAST_ISSUE`
//! - **aria**: `ARIA_ROLE_NO_LABEL`
//! - **keyboard**: `LINK_NO_HREF`

pub mod alt_text;
pub mod aria;
pub mod contrast;
pub mod forms;
pub mod headings;
pub mod keyboard;
pub mod landmarks;

use crate::issue::{AnalysisSummary, Issue, Severity};
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::debug;

/// Rule id reported when the input cannot be analyzed at all
pub const PARSE_ERROR: &str = "PARSE_ERROR";

/// Trait implemented by every static check
pub trait Check: Send + Sync {
    /// Human-readable name of this check
    fn name(&self) -> &str;

    /// Rule ids this check can emit
    fn rule_ids(&self) -> &[&str];

    /// Inspect a parsed document and return issues
    fn check(&self, document: &Html, source: &SourceIndex) -> Vec<Issue>;
}

/// Runs all registered checks over HTML content
pub struct StaticAnalyzer {
    checks: Vec<Box<dyn Check>>,
}

impl Default for StaticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticAnalyzer {
    /// Analyzer with the full check set, in reporting order
    pub fn new() -> Self {
        Self {
            checks: vec![
                Box::new(alt_text::AltTextCheck),
                Box::new(landmarks::LandmarkCheck),
                Box::new(forms::FormLabelCheck),
                Box::new(headings::HeadingCheck),
                Box::new(contrast::ContrastCheck),
                Box::new(aria::AriaCheck),
                Box::new(keyboard::KeyboardCheck),
            ],
        }
    }

    /// Analyze HTML content for accessibility issues
    pub fn analyze_html(&self, content: &str) -> Vec<Issue> {
        let document = Html::parse_document(content);
        let source = SourceIndex::new(&document, content);
        let mut issues = Vec::new();

        for check in &self.checks {
            let found = check.check(&document, &source);
            debug!("{}: {} issue(s)", check.name(), found.len());
            issues.extend(found);
        }

        issues
    }

    /// Analyze raw bytes, reporting undecodable input as a parse error
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Vec<Issue> {
        match std::str::from_utf8(bytes) {
            Ok(content) => self.analyze_html(content),
            Err(e) => vec![parse_error(&e.to_string())],
        }
    }

    /// Summarize a list of issues
    pub fn summary(issues: &[Issue]) -> AnalysisSummary {
        AnalysisSummary::from_issues(issues)
    }
}

/// Build a `PARSE_ERROR` issue
pub fn parse_error(reason: &str) -> Issue {
    Issue::new(
        PARSE_ERROR,
        Severity::Error,
        &format!("Failed to parse HTML: {}", reason),
    )
}

/// Parse a static selector
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Non-empty attribute value, if present
pub(crate) fn non_empty_attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|v| !v.is_empty())
}

/// Attach the element snippet and its estimated source position to an issue
pub(crate) fn anchor(issue: Issue, source: &SourceIndex, element: ElementRef) -> Issue {
    let issue = issue.with_element(&element.html());
    match source.locate(element) {
        Some((line, column)) => issue.with_line(line).with_column(column),
        None => issue,
    }
}

/// Opening-tag positions of a document, built once per analysis.
///
/// An element is located by its ordinal among same-named elements, paired
/// with the matching `<tag` occurrence in the source. Markup inside
/// comments or scripts can throw the count off, so positions are
/// estimates.
pub struct SourceIndex {
    /// Lowercase tag name -> (line, column) of each `<tag`, in source order
    tags: HashMap<String, Vec<(usize, usize)>>,
    /// Element -> ordinal among elements with the same name
    ordinals: HashMap<*const Element, usize>,
}

impl SourceIndex {
    pub fn new(document: &Html, content: &str) -> Self {
        Self {
            tags: tag_positions(content),
            ordinals: element_ordinals(document),
        }
    }

    /// 1-indexed (line, column) of the element's opening tag
    pub fn locate(&self, element: ElementRef) -> Option<(usize, usize)> {
        let ordinal = self.ordinals.get(&std::ptr::from_ref(element.value()))?;
        self.tags.get(element.value().name())?.get(*ordinal).copied()
    }
}

fn element_ordinals(document: &Html) -> HashMap<*const Element, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut ordinals = HashMap::new();

    for element in document.select(&selector("*")) {
        let count = counts.entry(element.value().name()).or_insert(0);
        ordinals.insert(std::ptr::from_ref(element.value()), *count);
        *count += 1;
    }

    ordinals
}

fn tag_positions(content: &str) -> HashMap<String, Vec<(usize, usize)>> {
    let lower = content.to_ascii_lowercase();
    let mut tags: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in lower.char_indices() {
        if ch == '<' {
            if let Some(name) = tag_name_at(&lower[i + 1..]) {
                tags.entry(name.to_string()).or_default().push((line, column));
            }
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    tags
}

/// Tag name directly after a `<`, ending at whitespace, `>`, `/` or end of input
fn tag_name_at(rest: &str) -> Option<&str> {
    let end = rest
        .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/' || c == '<')
        .unwrap_or(rest.len());
    let name = &rest[..end];
    name.starts_with(|c: char| c.is_ascii_alphabetic()).then_some(name)
}
