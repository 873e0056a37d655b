// SPDX-License-Identifier: PMPL-1.0-or-later
//! Screen-reader oriented inspection of a page.
//!
//! [`extract_page_elements`] reduces a document to the elements a screen
//! reader user meets (links, controls, images, headings, landmarks, live
//! regions), with an approximate accessible name, role and state. The
//! remaining functions analyze that list.

use crate::analyzer::headings::heading_level;
use crate::analyzer::landmarks::LANDMARK_ELEMENTS;
use crate::analyzer::selector;
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

const LANDMARK_ROLES: &[&str] = &[
    "banner",
    "complementary",
    "contentinfo",
    "form",
    "main",
    "navigation",
    "region",
    "search",
];

const SKIP_LINK_PATTERNS: &[&str] = &["skip", "jump", "go to", "navigate to"];

const LIVE_VALUES: &[&str] = &["polite", "assertive", "off"];

const FORM_CONTROLS: &[&str] = &["input", "select", "textarea"];

/// One element as a screen reader would present it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageElement {
    pub tag_name: String,
    pub accessible_name: Option<String>,
    pub role: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
    pub position: Option<String>,
    pub href: Option<String>,
    pub alt: Option<String>,
    /// Text of an associated `<label>`
    pub label: Option<String>,
    pub aria_label: Option<String>,
    pub aria_live: Option<String>,
    pub focusable: bool,
}

impl PageElement {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            ..Default::default()
        }
    }

    fn has_name(&self) -> bool {
        self.accessible_name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// A problem found by one of the analyses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReaderIssue {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub element: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
}

impl ReaderIssue {
    fn new(kind: &'static str, element: &str, message: &str) -> Self {
        Self {
            kind,
            element: element.to_string(),
            position: None,
            value: None,
            message: message.to_string(),
        }
    }

    fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipLinkAnalysis {
    pub has_skip_links: bool,
    pub skip_link_count: usize,
    pub issues: Vec<ReaderIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LandmarkSummary {
    pub total_landmarks: usize,
    /// Landmark role (or tag) -> count
    pub landmark_types: BTreeMap<String, usize>,
    pub has_main: bool,
    pub has_navigation: bool,
    pub has_header: bool,
    pub has_footer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenReaderReport {
    pub focus_order_issues: Vec<ReaderIssue>,
    pub skip_link_analysis: SkipLinkAnalysis,
    pub landmark_summary: LandmarkSummary,
    pub live_region_issues: Vec<ReaderIssue>,
    pub total_focusable_elements: usize,
    pub total_elements: usize,
    /// 0-100
    pub accessibility_score: f64,
}

/// How a screen reader would announce the element
pub fn generate_announcement_text(element: &PageElement) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(name) = element.accessible_name.as_deref().filter(|n| !n.is_empty()) {
        parts.push(name.to_string());
    }
    if let Some(role) = element.role.as_deref().filter(|r| !matches!(*r, "text" | "generic")) {
        parts.push(format!("({})", role));
    }
    for extra in [&element.state, &element.description, &element.position] {
        if let Some(value) = extra.as_deref().filter(|v| !v.is_empty()) {
            parts.push(value.to_string());
        }
    }

    if parts.is_empty() {
        "Unnamed element".to_string()
    } else {
        parts.join(" ")
    }
}

/// Check focusable elements, in focus order, for missing names and heading jumps
pub fn validate_focus_order(focusable: &[PageElement]) -> Vec<ReaderIssue> {
    let mut issues = Vec::new();

    for (i, element) in focusable.iter().enumerate() {
        if !element.has_name() {
            issues.push(
                ReaderIssue::new(
                    "missing_name",
                    &element.tag_name,
                    "Focusable element has no accessible name",
                )
                .at(i + 1),
            );
        }

        if i == 0 {
            continue;
        }
        let prev = &focusable[i - 1];
        if let (Some(prev_level), Some(level)) =
            (heading_level(&prev.tag_name), heading_level(&element.tag_name))
        {
            if level > prev_level + 1 {
                issues.push(
                    ReaderIssue::new(
                        "heading_jump",
                        &element.tag_name,
                        &format!("Heading level jumps from h{} to h{}", prev_level, level),
                    )
                    .at(i + 1),
                );
            }
        }
    }

    issues
}

fn is_skip_link(element: &PageElement) -> bool {
    if element.tag_name != "a" {
        return false;
    }
    let href = element.href.as_deref().unwrap_or("");
    let text = element.accessible_name.as_deref().unwrap_or("").to_lowercase();
    href.starts_with('#') && SKIP_LINK_PATTERNS.iter().any(|p| text.contains(p))
}

pub fn check_skip_links(elements: &[PageElement]) -> SkipLinkAnalysis {
    let skip_links: Vec<&PageElement> = elements.iter().filter(|e| is_skip_link(e)).collect();
    let mut issues = Vec::new();

    if skip_links.is_empty() {
        issues.push(ReaderIssue::new(
            "no_skip_links",
            "document",
            "No skip links found for keyboard navigation",
        ));
    }
    for link in &skip_links {
        let target = link.href.as_deref().unwrap_or("").trim_start_matches('#');
        if target.is_empty() {
            issues.push(ReaderIssue::new(
                "invalid_skip_link",
                &link.tag_name,
                "Skip link has no target",
            ));
        }
    }

    SkipLinkAnalysis {
        has_skip_links: !skip_links.is_empty(),
        skip_link_count: skip_links.len(),
        issues,
    }
}

fn is_landmark(element: &PageElement) -> bool {
    element
        .role
        .as_deref()
        .is_some_and(|r| LANDMARK_ROLES.contains(&r))
        || LANDMARK_ELEMENTS.contains(&element.tag_name.as_str())
}

pub fn generate_landmark_summary(elements: &[PageElement]) -> LandmarkSummary {
    let mut summary = LandmarkSummary::default();

    for landmark in elements.iter().filter(|e| is_landmark(e)) {
        summary.total_landmarks += 1;

        let role = landmark.role.as_deref();
        let tag = landmark.tag_name.as_str();
        let kind = role.unwrap_or(tag).to_string();
        *summary.landmark_types.entry(kind).or_insert(0) += 1;

        summary.has_main |= role == Some("main") || tag == "main";
        summary.has_navigation |= role == Some("navigation") || tag == "nav";
        summary.has_header |= role == Some("banner") || tag == "header";
        summary.has_footer |= role == Some("contentinfo") || tag == "footer";
    }

    summary
}

pub fn check_aria_live_regions(elements: &[PageElement]) -> Vec<ReaderIssue> {
    let mut issues = Vec::new();

    for region in elements.iter().filter(|e| e.aria_live.is_some()) {
        if !region.has_name() {
            issues.push(ReaderIssue::new(
                "live_region_no_name",
                &region.tag_name,
                "ARIA live region has no accessible name",
            ));
        }

        let value = region.aria_live.as_deref().unwrap_or("");
        if !LIVE_VALUES.contains(&value) {
            let mut issue =
                ReaderIssue::new("invalid_live_value", &region.tag_name, "Invalid aria-live value");
            issue.value = Some(value.to_string());
            issues.push(issue);
        }
    }

    issues
}

/// 100 minus penalties: 5 per unnamed focusable element, 10 per image
/// without alt, 8 per form control with neither label nor aria-label.
/// Clamped at 0; an empty page scores 0.
pub fn accessibility_score(elements: &[PageElement]) -> f64 {
    if elements.is_empty() {
        return 0.0;
    }

    let mut score = 100.0;
    for element in elements {
        if element.focusable && !element.has_name() {
            score -= 5.0;
        }
        if element.tag_name == "img" && element.alt.as_deref().unwrap_or("").is_empty() {
            score -= 10.0;
        }
        if FORM_CONTROLS.contains(&element.tag_name.as_str())
            && element.label.is_none()
            && element.aria_label.is_none()
        {
            score -= 8.0;
        }
    }

    f64::max(0.0, score)
}

pub fn generate_screen_reader_report(elements: &[PageElement]) -> ScreenReaderReport {
    let focusable: Vec<PageElement> = elements.iter().filter(|e| e.focusable).cloned().collect();

    ScreenReaderReport {
        focus_order_issues: validate_focus_order(&focusable),
        skip_link_analysis: check_skip_links(elements),
        landmark_summary: generate_landmark_summary(elements),
        live_region_issues: check_aria_live_regions(elements),
        total_focusable_elements: focusable.len(),
        total_elements: elements.len(),
        accessibility_score: accessibility_score(elements),
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn text_of(element: ElementRef) -> String {
    collapse(&element.text().collect::<String>())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(collapse).filter(|v| !v.is_empty())
}

fn implicit_role(element: &ElementRef) -> Option<&'static str> {
    let el = element.value();
    let role = match el.name() {
        "a" if el.attr("href").is_some() => "link",
        "button" => "button",
        "img" => "img",
        "nav" => "navigation",
        "main" => "main",
        "header" => "banner",
        "footer" => "contentinfo",
        "aside" => "complementary",
        "select" => "combobox",
        "textarea" => "textbox",
        "input" => match el.attr("type").unwrap_or("text").to_ascii_lowercase().as_str() {
            "checkbox" => "checkbox",
            "radio" => "radio",
            "submit" | "button" | "reset" | "image" => "button",
            "range" => "slider",
            _ => "textbox",
        },
        name if heading_level(name).is_some() => "heading",
        _ => return None,
    };
    Some(role)
}

fn is_focusable(element: &ElementRef) -> bool {
    let el = element.value();
    if el.attr("disabled").is_some() {
        return false;
    }
    if let Some(tabindex) = el.attr("tabindex").and_then(|t| t.trim().parse::<i32>().ok()) {
        return tabindex >= 0;
    }
    match el.name() {
        "a" => el.attr("href").is_some(),
        "button" | "select" | "textarea" => true,
        "input" => el.attr("type") != Some("hidden"),
        _ => false,
    }
}

fn is_relevant(element: &ElementRef) -> bool {
    let el = element.value();
    let name = el.name();
    if name == "input" && el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")) {
        return false;
    }
    matches!(name, "a" | "button" | "img" | "input" | "select" | "textarea")
        || heading_level(name).is_some()
        || LANDMARK_ELEMENTS.contains(&name)
        || el.attr("role").is_some()
        || el.attr("aria-live").is_some()
        || el.attr("tabindex").is_some()
}

/// Reduce a document to its screen-reader relevant elements, in document order
pub fn extract_page_elements(html: &str) -> Vec<PageElement> {
    let document = Html::parse_document(html);

    let by_id: HashMap<&str, ElementRef> = document
        .select(&selector("[id]"))
        .filter_map(|e| e.value().id().map(|id| (id, e)))
        .collect();

    let mut labels: HashMap<&str, String> = HashMap::new();
    for label in document.select(&selector("label[for]")) {
        if let Some(target) = label.value().attr("for") {
            labels.entry(target).or_insert_with(|| text_of(label));
        }
    }

    let referenced_text = |ids: &str| -> Option<String> {
        let text: Vec<String> = ids
            .split_whitespace()
            .filter_map(|id| by_id.get(id).map(|e| text_of(*e)))
            .collect();
        non_empty(Some(text.join(" ").as_str()))
    };

    let mut elements = Vec::new();

    for element in document.select(&selector("body *")) {
        if !is_relevant(&element) {
            continue;
        }
        let el = element.value();
        let tag = el.name();

        let aria_label = non_empty(el.attr("aria-label"));
        let wrapping_label = element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "label")
            .map(text_of);
        let label = if FORM_CONTROLS.contains(&tag) {
            el.id()
                .and_then(|id| labels.get(id).cloned())
                .or(wrapping_label)
                .filter(|l| !l.is_empty())
        } else {
            None
        };

        let accessible_name = aria_label
            .clone()
            .or_else(|| el.attr("aria-labelledby").and_then(|ids| referenced_text(ids)))
            .or_else(|| match tag {
                "img" => non_empty(el.attr("alt")),
                "input" | "select" | "textarea" => label
                    .clone()
                    .or_else(|| non_empty(el.attr("value")).filter(|_| {
                        matches!(el.attr("type"), Some("submit") | Some("button") | Some("reset"))
                    }))
                    .or_else(|| non_empty(el.attr("placeholder"))),
                _ if LANDMARK_ELEMENTS.contains(&tag) => None,
                _ => non_empty(Some(text_of(element).as_str())),
            })
            .or_else(|| non_empty(el.attr("title")));

        let state = if matches!(el.attr("type"), Some("checkbox") | Some("radio")) {
            Some(if el.attr("checked").is_some() { "checked" } else { "not checked" }.to_string())
        } else {
            el.attr("aria-expanded").map(|v| {
                if v == "true" { "expanded" } else { "collapsed" }.to_string()
            })
        };

        let description = el
            .attr("aria-describedby")
            .and_then(|ids| referenced_text(ids));

        let role = non_empty(el.attr("role")).or_else(|| implicit_role(&element).map(str::to_string));

        elements.push(PageElement {
            tag_name: tag.to_string(),
            accessible_name,
            role,
            state,
            description,
            position: heading_level(tag).map(|l| format!("level {}", l)),
            href: el.attr("href").map(str::to_string),
            alt: el.attr("alt").map(str::to_string),
            label,
            aria_label,
            aria_live: el.attr("aria-live").map(str::to_string),
            focusable: is_focusable(&element),
        });
    }

    elements
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html lang="en"><body>
        <a href="#content">Skip to main content</a>
        <header><h1>News</h1></header>
        <nav aria-label="Primary"><a href="/">Home</a><a href="/about"></a></nav>
        <main id="content">
            <h3 tabindex="0">Deep heading</h3>
            <img src="photo.jpg">
            <label for="email">Email</label><input id="email" type="email">
            <input type="text" placeholder="Search">
            <input type="checkbox" id="agree" checked><label for="agree">Agree</label>
            <div aria-live="loud">Status</div>
            <div aria-live="polite"></div>
            <input type="hidden" name="csrf" value="x">
        </main>
        <footer>Footer</footer>
    </body></html>"##;

    fn find<'a>(elements: &'a [PageElement], tag: &str) -> Vec<&'a PageElement> {
        elements.iter().filter(|e| e.tag_name == tag).collect()
    }

    #[test]
    fn test_extraction_names_and_roles() {
        let elements = extract_page_elements(PAGE);

        let inputs = find(&elements, "input");
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].accessible_name.as_deref(), Some("Email"));
        assert_eq!(inputs[0].label.as_deref(), Some("Email"));
        assert_eq!(inputs[1].accessible_name.as_deref(), Some("Search"));
        assert!(inputs[1].label.is_none());
        assert_eq!(inputs[2].state.as_deref(), Some("checked"));
        assert_eq!(inputs[2].role.as_deref(), Some("checkbox"));

        let nav = find(&elements, "nav")[0];
        assert_eq!(nav.accessible_name.as_deref(), Some("Primary"));
        assert_eq!(nav.role.as_deref(), Some("navigation"));

        let h3 = find(&elements, "h3")[0];
        assert!(h3.focusable);
        assert_eq!(h3.position.as_deref(), Some("level 3"));
    }

    #[test]
    fn test_announcement_text() {
        let mut element = PageElement::new("input");
        assert_eq!(generate_announcement_text(&element), "Unnamed element");

        element.accessible_name = Some("Subscribe".to_string());
        element.role = Some("checkbox".to_string());
        element.state = Some("not checked".to_string());
        assert_eq!(
            generate_announcement_text(&element),
            "Subscribe (checkbox) not checked"
        );

        element.role = Some("generic".to_string());
        assert_eq!(generate_announcement_text(&element), "Subscribe not checked");
    }

    #[test]
    fn test_focus_order_issues() {
        let mut h1 = PageElement::new("h1");
        h1.accessible_name = Some("Title".to_string());
        let mut h4 = PageElement::new("h4");
        h4.accessible_name = Some("Deep".to_string());
        let header = PageElement::new("header");

        let issues = validate_focus_order(&[h1, h4, header]);
        let kinds: Vec<&str> = issues.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec!["heading_jump", "missing_name"]);
        assert_eq!(issues[0].message, "Heading level jumps from h1 to h4");
        assert_eq!(issues[1].position, Some(3));
    }

    #[test]
    fn test_skip_links() {
        let elements = extract_page_elements(PAGE);
        let analysis = check_skip_links(&elements);
        assert!(analysis.has_skip_links);
        assert_eq!(analysis.skip_link_count, 1);
        assert!(analysis.issues.is_empty());

        let mut bad = PageElement::new("a");
        bad.href = Some("#".to_string());
        bad.accessible_name = Some("Skip navigation".to_string());
        let analysis = check_skip_links(&[bad]);
        assert_eq!(analysis.issues[0].kind, "invalid_skip_link");

        let analysis = check_skip_links(&[]);
        assert!(!analysis.has_skip_links);
        assert_eq!(analysis.issues[0].kind, "no_skip_links");
    }

    #[test]
    fn test_landmarks_and_live_regions() {
        let elements = extract_page_elements(PAGE);

        let summary = generate_landmark_summary(&elements);
        assert_eq!(summary.total_landmarks, 4);
        assert!(summary.has_main && summary.has_navigation && summary.has_header && summary.has_footer);
        assert_eq!(summary.landmark_types["banner"], 1);

        let live = check_aria_live_regions(&elements);
        let kinds: Vec<&str> = live.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec!["invalid_live_value", "live_region_no_name"]);
        assert_eq!(live[0].value.as_deref(), Some("loud"));
    }

    #[test]
    fn test_report_and_score() {
        let elements = extract_page_elements(PAGE);
        let report = generate_screen_reader_report(&elements);
        // unnamed /about link (-5), image without alt (-10), placeholder-only input (-8)
        assert_eq!(report.accessibility_score, 77.0);
        assert_eq!(report.total_elements, elements.len());
        assert!(report
            .focus_order_issues
            .iter()
            .any(|i| i.kind == "missing_name"));

        assert_eq!(accessibility_score(&[]), 0.0);
    }
}
