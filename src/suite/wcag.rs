// SPDX-License-Identifier: PMPL-1.0-or-later
//! WCAG 2.2 test cases.
//!
//! Most cases reuse the static analyzer and look for specific rule ids;
//! the rest are text heuristics over the raw HTML.

use super::{issues_for, issues_value, CheckOutcome, Priority, TestCase, TestContext};
use crate::analyzer::{
    alt_text::IMG_MISSING_ALT,
    aria::ARIA_ROLE_NO_LABEL,
    contrast::POTENTIAL_CONTRAST_ISSUE,
    forms::FORM_CONTROL_NO_LABEL,
    headings::{NO_HEADINGS, SKIPPED_HEADING_LEVEL},
    keyboard::LINK_NO_HREF,
    landmarks::MISSING_LANDMARKS,
};
use crate::error::Result;

pub const CATEGORY: &str = "WCAG 2.2";

/// Text that commonly marks a skip link
pub(crate) const SKIP_LINK_PATTERNS: &[&str] = &["skip", "jump to", "go to main", "skip navigation"];

fn criterion(outcome: CheckOutcome, id: &str, level: &str) -> CheckOutcome {
    outcome
        .with_detail("wcag_criterion", id)
        .with_detail("level", level)
}

/// Shared shape of the analyzer-backed cases: fail with the matching
/// issues attached, pass otherwise.
fn analyzer_case(
    ctx: &TestContext,
    rule_ids: &[&str],
    id: &str,
    fail_message: impl Fn(usize) -> String,
    pass_message: &str,
) -> Result<CheckOutcome> {
    let Some(html) = ctx.html_content() else {
        return Ok(CheckOutcome::no_content());
    };

    let issues = issues_for(html, rule_ids);
    if issues.is_empty() {
        return Ok(criterion(CheckOutcome::passed(pass_message), id, "A"));
    }

    Ok(criterion(
        CheckOutcome::failed(&fail_message(issues.len())).with_detail("issues", issues_value(&issues)?),
        id,
        "A",
    ))
}

pub fn alt_text_for_images(ctx: &TestContext) -> Result<CheckOutcome> {
    analyzer_case(
        ctx,
        &[IMG_MISSING_ALT],
        "1.1.1",
        |n| format!("Found {} images without alt text", n),
        "All images have appropriate alt text",
    )
}

pub fn heading_structure(ctx: &TestContext) -> Result<CheckOutcome> {
    analyzer_case(
        ctx,
        &[NO_HEADINGS, SKIPPED_HEADING_LEVEL],
        "1.3.1",
        |n| format!("Found {} heading structure issues", n),
        "Proper heading structure found",
    )
}

pub fn form_labels(ctx: &TestContext) -> Result<CheckOutcome> {
    analyzer_case(
        ctx,
        &[FORM_CONTROL_NO_LABEL],
        "3.3.2",
        |n| format!("Found {} form controls without labels", n),
        "All form controls have appropriate labels",
    )
}

pub fn keyboard_navigation(ctx: &TestContext) -> Result<CheckOutcome> {
    analyzer_case(
        ctx,
        &[LINK_NO_HREF],
        "2.1.1",
        |n| format!("Found {} keyboard navigation issues", n),
        "Keyboard navigation appears to be properly implemented",
    )
}

pub fn landmark_elements(ctx: &TestContext) -> Result<CheckOutcome> {
    analyzer_case(
        ctx,
        &[MISSING_LANDMARKS],
        "1.3.1",
        |_| "No landmark elements found".to_string(),
        "Landmark elements are present",
    )
}

pub fn aria_attributes(ctx: &TestContext) -> Result<CheckOutcome> {
    analyzer_case(
        ctx,
        &[ARIA_ROLE_NO_LABEL],
        "4.1.2",
        |n| format!("Found {} ARIA implementation issues", n),
        "ARIA attributes appear to be properly implemented",
    )
}

/// Static analysis can only hint at contrast problems, so findings ask
/// for manual review instead of failing.
pub fn color_contrast(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = ctx.html_content() else {
        return Ok(CheckOutcome::no_content());
    };

    let issues = issues_for(html, &[POTENTIAL_CONTRAST_ISSUE]);
    if issues.is_empty() {
        return Ok(criterion(
            CheckOutcome::passed("No obvious contrast issues detected"),
            "1.4.3",
            "AA",
        ));
    }

    Ok(criterion(
        CheckOutcome::needs_review(&format!(
            "Found {} potential contrast issues (manual review recommended)",
            issues.len()
        ))
        .with_detail("issues", issues_value(&issues)?),
        "1.4.3",
        "AA",
    ))
}

pub fn focus_visible(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = ctx.html_content() else {
        return Ok(CheckOutcome::no_content());
    };

    let lower = html.to_lowercase();
    let outcome = if lower.contains("focus") || lower.contains("outline") {
        CheckOutcome::passed("Focus-related CSS properties detected")
    } else {
        CheckOutcome::needs_review("No obvious focus styling detected")
    };
    Ok(criterion(outcome, "2.4.7", "AA"))
}

pub fn skip_links(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = ctx.html_content() else {
        return Ok(CheckOutcome::no_content());
    };

    let lower = html.to_lowercase();
    if SKIP_LINK_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Ok(criterion(CheckOutcome::passed("Skip links detected"), "2.4.1", "A"));
    }
    Ok(criterion(
        CheckOutcome::failed("No skip links detected")
            .with_detail("suggestion", "Add skip links to bypass repetitive navigation"),
        "2.4.1",
        "A",
    ))
}

pub fn language_declaration(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = ctx.html_content() else {
        return Ok(CheckOutcome::no_content());
    };

    if html.to_lowercase().contains("lang=") {
        return Ok(criterion(
            CheckOutcome::passed("Language declaration found"),
            "3.1.1",
            "A",
        ));
    }
    Ok(criterion(
        CheckOutcome::failed("No language declaration found")
            .with_detail("suggestion", "Add lang attribute to the html element"),
        "3.1.1",
        "A",
    ))
}

/// All WCAG 2.2 cases in reporting order
pub fn test_cases() -> Vec<TestCase> {
    vec![
        TestCase::new(
            "Alt Text for Images",
            "Test 1.1.1: All images have appropriate alt text",
            CATEGORY,
            Priority::Critical,
            alt_text_for_images,
        ),
        TestCase::new(
            "Heading Structure",
            "Test 1.3.1: Proper heading hierarchy",
            CATEGORY,
            Priority::High,
            heading_structure,
        ),
        TestCase::new(
            "Form Labels",
            "Test 3.3.2: Form controls have labels",
            CATEGORY,
            Priority::Critical,
            form_labels,
        ),
        TestCase::new(
            "Keyboard Navigation",
            "Test 2.1.1: Keyboard accessibility",
            CATEGORY,
            Priority::Critical,
            keyboard_navigation,
        ),
        TestCase::new(
            "Landmark Elements",
            "Test 1.3.1: Semantic landmark elements",
            CATEGORY,
            Priority::High,
            landmark_elements,
        ),
        TestCase::new(
            "ARIA Attributes",
            "Test 4.1.2: Valid ARIA implementation",
            CATEGORY,
            Priority::High,
            aria_attributes,
        ),
        TestCase::new(
            "Color Contrast",
            "Test 1.4.3: Sufficient color contrast",
            CATEGORY,
            Priority::High,
            color_contrast,
        ),
        TestCase::new(
            "Focus Visible",
            "Test 2.4.7: Focus indicator visibility",
            CATEGORY,
            Priority::High,
            focus_visible,
        ),
        TestCase::new(
            "Skip Links",
            "Test 2.4.1: Skip navigation links",
            CATEGORY,
            Priority::Medium,
            skip_links,
        ),
        TestCase::new(
            "Language Declaration",
            "Test 3.1.1: Page language declaration",
            CATEGORY,
            Priority::Medium,
            language_declaration,
        ),
    ]
}
