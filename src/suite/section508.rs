// SPDX-License-Identifier: PMPL-1.0-or-later
//! Section 508 (§1194.22) test cases.

use super::wcag::SKIP_LINK_PATTERNS;
use super::{issues_for, issues_value, CheckOutcome, Priority, TestCase, TestContext};
use crate::analyzer::{
    alt_text::IMG_MISSING_ALT,
    forms::FORM_CONTROL_NO_LABEL,
    headings::{NO_HEADINGS, SKIPPED_HEADING_LEVEL},
};
use crate::error::Result;

pub const CATEGORY: &str = "Section 508";

const COLOR_DEPENDENT_PATTERNS: &[&str] = &[
    "required field",
    "error",
    "success",
    "warning",
    "click the red button",
    "green means go",
];

const FLICKER_PATTERNS: &[&str] = &["blink", "marquee", "animation", "transition", "flash"];

const TEXT_ONLY_PATTERNS: &[&str] = &[
    "text only",
    "text-only",
    "accessible version",
    "screen reader version",
];

fn paragraph(outcome: CheckOutcome, section: &str) -> CheckOutcome {
    outcome
        .with_detail("section_508", format!("§1194.22({})", section))
        .with_detail("requirement", requirement(section))
}

/// Lowercased HTML, or `None` when the context has none
fn lowered(ctx: &TestContext) -> Option<String> {
    ctx.html_content().map(str::to_lowercase)
}

fn found(html: &str, patterns: &[&str]) -> Vec<String> {
    patterns
        .iter()
        .filter(|p| html.contains(*p))
        .map(|p| p.to_string())
        .collect()
}

/// (a) Text equivalent for non-text elements
pub fn equivalent_alternatives(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = ctx.html_content() else {
        return Ok(CheckOutcome::no_content());
    };

    let issues = issues_for(html, &[IMG_MISSING_ALT]);
    if issues.is_empty() {
        return Ok(paragraph(
            CheckOutcome::passed("All non-text elements have equivalent alternatives"),
            "a",
        ));
    }
    Ok(paragraph(
        CheckOutcome::failed(&format!(
            "Found {} non-text elements without alternatives",
            issues.len()
        ))
        .with_detail("issues", issues_value(&issues)?),
        "a",
    ))
}

/// (c) Information not conveyed by color alone
pub fn color_independence(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let patterns = found(&html, COLOR_DEPENDENT_PATTERNS);
    if patterns.is_empty() {
        return Ok(paragraph(
            CheckOutcome::passed("No obvious color-dependent information detected"),
            "c",
        ));
    }
    Ok(paragraph(
        CheckOutcome::needs_review(&format!(
            "Found {} potential color-dependent information patterns",
            patterns.len()
        ))
        .with_detail("patterns", patterns),
        "c",
    ))
}

/// (d) Documents readable without style sheets
pub fn document_structure(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = ctx.html_content() else {
        return Ok(CheckOutcome::no_content());
    };

    let issues = issues_for(html, &[NO_HEADINGS, SKIPPED_HEADING_LEVEL]);
    if issues.is_empty() {
        return Ok(paragraph(
            CheckOutcome::passed("Document structure is accessible without style sheets"),
            "d",
        ));
    }
    Ok(paragraph(
        CheckOutcome::failed(&format!(
            "Found {} document structure issues",
            issues.len()
        ))
        .with_detail("issues", issues_value(&issues)?),
        "d",
    ))
}

/// (e) Redundant text links for server-side image maps
pub fn image_maps(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let outcome = if !html.contains("ismap") {
        CheckOutcome::passed("No server-side image maps detected")
    } else if html.contains("href=") {
        CheckOutcome::passed("Server-side image map with redundant text links found")
    } else {
        CheckOutcome::failed("Server-side image map without redundant text links")
            .with_detail("suggestion", "Add redundant text links for image map areas")
    };
    Ok(paragraph(outcome, "e"))
}

/// (f) Client-side image maps with alt text
pub fn client_side_image_maps(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let outcome = if !html.contains("usemap=") {
        CheckOutcome::passed("No client-side image maps detected")
    } else if html.contains("alt=") {
        CheckOutcome::passed("Client-side image map with alt text found")
    } else {
        CheckOutcome::failed("Client-side image map without alt text")
            .with_detail("suggestion", "Add alt text to map area elements")
    };
    Ok(paragraph(outcome, "f"))
}

/// (g) Row and column headers for data tables
pub fn data_table_headers(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let outcome = if !html.contains("<table") {
        CheckOutcome::passed("No data tables detected")
    } else if html.contains("<th") {
        CheckOutcome::passed("Data tables with header elements found")
    } else {
        CheckOutcome::needs_review("Tables found without obvious header elements")
    };
    Ok(paragraph(outcome, "g"))
}

/// (h) Markup for complex table headers
pub fn complex_table_headers(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let complex =
        html.contains("<table") && (html.contains("colspan=") || html.contains("rowspan="));
    let outcome = if !complex {
        CheckOutcome::passed("No complex tables detected")
    } else if html.contains("scope=") || html.contains("headers=") {
        CheckOutcome::passed("Complex tables with proper header markup found")
    } else {
        CheckOutcome::needs_review("Complex tables detected without obvious header markup")
    };
    Ok(paragraph(outcome, "h"))
}

/// (i) Frames with titles
pub fn frames_with_titles(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let outcome = if !html.contains("<frame") {
        CheckOutcome::passed("No frames detected")
    } else if html.contains("title=") {
        CheckOutcome::passed("Frames with title attributes found")
    } else {
        CheckOutcome::failed("Frames without title attributes")
            .with_detail("suggestion", "Add title attributes to frame elements")
    };
    Ok(paragraph(outcome, "i"))
}

/// (j) Avoid screen flicker
pub fn flicker_avoidance(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let patterns = found(&html, FLICKER_PATTERNS);
    if patterns.is_empty() {
        return Ok(paragraph(
            CheckOutcome::passed("No obvious flicker-inducing content detected"),
            "j",
        ));
    }
    Ok(paragraph(
        CheckOutcome::needs_review(&format!(
            "Found {} potential flicker-inducing elements",
            patterns.len()
        ))
        .with_detail("patterns", patterns),
        "j",
    ))
}

/// (k) Text-only page alternative
pub fn text_only_alternative(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let patterns = found(&html, TEXT_ONLY_PATTERNS);
    if patterns.is_empty() {
        return Ok(paragraph(
            CheckOutcome::needs_review("No text-only alternative indicators detected").with_detail(
                "note",
                "Consider providing a text-only alternative for complex pages",
            ),
            "k",
        ));
    }
    Ok(paragraph(
        CheckOutcome::passed("Text-only alternative indicators found").with_detail("patterns", patterns),
        "k",
    ))
}

/// (l) Script alternatives
pub fn script_alternatives(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let outcome = if !html.contains("<script") {
        CheckOutcome::passed("No scripts detected")
    } else if html.contains("<noscript") {
        CheckOutcome::passed("Scripts with noscript alternatives found")
    } else {
        CheckOutcome::needs_review("Scripts detected without obvious alternatives").with_detail(
            "note",
            "Consider adding noscript elements or server-side alternatives",
        )
    };
    Ok(paragraph(outcome, "l"))
}

/// (m) Applet alternatives
pub fn applet_alternatives(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let outcome = if !html.contains("<applet") {
        CheckOutcome::passed("No applets detected")
    } else if html.contains("alt=") {
        CheckOutcome::passed("Applets with alt text found")
    } else {
        CheckOutcome::failed("Applets without alt text")
            .with_detail("suggestion", "Add alt text to applet elements")
    };
    Ok(paragraph(outcome, "m"))
}

/// (n) Electronic forms
pub fn electronic_forms(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = ctx.html_content() else {
        return Ok(CheckOutcome::no_content());
    };

    let issues = issues_for(html, &[FORM_CONTROL_NO_LABEL]);
    if issues.is_empty() {
        return Ok(paragraph(
            CheckOutcome::passed("Forms appear to be accessible"),
            "n",
        ));
    }
    Ok(paragraph(
        CheckOutcome::failed(&format!(
            "Found {} form accessibility issues",
            issues.len()
        ))
        .with_detail("issues", issues_value(&issues)?),
        "n",
    ))
}

/// (o) Navigation links
pub fn navigation_links(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let outcome = if html.contains("<nav") || html.contains("navigation") {
        CheckOutcome::passed("Navigation elements found")
    } else {
        CheckOutcome::needs_review("No explicit navigation elements detected")
            .with_detail("note", "Consider adding semantic navigation elements")
    };
    Ok(paragraph(outcome, "o"))
}

/// (p) Skip navigation links
pub fn skip_navigation(ctx: &TestContext) -> Result<CheckOutcome> {
    let Some(html) = lowered(ctx) else {
        return Ok(CheckOutcome::no_content());
    };

    let outcome = if SKIP_LINK_PATTERNS.iter().any(|p| html.contains(p)) {
        CheckOutcome::passed("Skip navigation links found")
    } else {
        CheckOutcome::failed("No skip navigation links detected")
            .with_detail("suggestion", "Add skip navigation links for keyboard users")
    };
    Ok(paragraph(outcome, "p"))
}

/// All Section 508 cases in paragraph order
pub fn test_cases() -> Vec<TestCase> {
    let cases: [(&str, &str, Priority, fn(&TestContext) -> Result<CheckOutcome>); 15] = [
        ("Equivalent Alternatives", "a", Priority::Critical, equivalent_alternatives),
        ("Color Independence", "c", Priority::High, color_independence),
        ("Document Structure", "d", Priority::High, document_structure),
        ("Image Maps", "e", Priority::Medium, image_maps),
        ("Client-Side Image Maps", "f", Priority::Medium, client_side_image_maps),
        ("Data Table Headers", "g", Priority::High, data_table_headers),
        ("Complex Table Headers", "h", Priority::Medium, complex_table_headers),
        ("Frames with Titles", "i", Priority::Medium, frames_with_titles),
        ("Flicker Avoidance", "j", Priority::High, flicker_avoidance),
        ("Text-Only Alternative", "k", Priority::Medium, text_only_alternative),
        ("Script Alternatives", "l", Priority::High, script_alternatives),
        ("Applet Alternatives", "m", Priority::Low, applet_alternatives),
        ("Electronic Forms", "n", Priority::Critical, electronic_forms),
        ("Navigation Links", "o", Priority::Medium, navigation_links),
        ("Skip Navigation", "p", Priority::High, skip_navigation),
    ];

    cases
        .into_iter()
        .map(|(name, section, priority, check)| {
            let description = format!("§1194.22({}): {}", section, requirement(section));
            TestCase::new(name, &description, CATEGORY, priority, check)
        })
        .collect()
}

fn requirement(section: &str) -> &'static str {
    match section {
        "a" => "Text equivalent for non-text elements",
        "c" => "Information not conveyed by color alone",
        "d" => "Documents readable without style sheets",
        "e" => "Redundant text links for server-side image maps",
        "f" => "Client-side image maps with alt text",
        "g" => "Row and column headers for data tables",
        "h" => "Markup for complex table headers",
        "i" => "Frames with titles",
        "j" => "Avoid screen flicker",
        "k" => "Text-only page alternative",
        "l" => "Script alternatives",
        "m" => "Applet alternatives",
        "n" => "Electronic forms accessibility",
        "o" => "Navigation links",
        "p" => "Skip navigation links",
        _ => "",
    }
}
