// SPDX-License-Identifier: PMPL-1.0-or-later
//! a11yguard - Accessibility Testing Orchestration
//!
//! Runs accessibility checks against web pages and local HTML and turns the
//! findings into reports and CI verdicts.
//!
//! ## Engines
//!
//! - **axe-core** ([`browser`]): injected into a WebDriver session
//! - **Tenon.io** ([`tenon`]): remote accessibility API
//! - **Static analysis** ([`analyzer`]): HTML checks with no browser at all
//!
//! All engines produce [`engine::UrlTestResult`]s, which feed the
//! [`report`] generators and the [`ci`] build gate.
//!
//! ## Suites
//!
//! [`suite`] holds a small test-case runner with WCAG 2.2 and Section 508
//! catalogs, and [`screen_reader`] inspects a page the way a screen reader
//! user would navigate it.

pub mod analyzer;
pub mod browser;
pub mod ci;
pub mod config;
pub mod engine;
pub mod error;
pub mod issue;
pub mod report;
pub mod scanner;
pub mod screen_reader;
pub mod suite;
pub mod tenon;

pub use error::{Error, Result};
