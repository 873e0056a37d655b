// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration for a11yguard
//!
//! Loaded from YAML (default) or TOML depending on the file extension.
//! Every section is optional; missing keys fall back to defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Rules used when a ruleset is requested that the config does not define
pub const COMMON_RULES: &[&str] = &[
    "color-contrast",
    "image-alt",
    "label",
    "link-name",
    "page-has-heading-one",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub format: String,
    pub browser: BrowserConfig,
    pub tenon: TenonConfig,
    pub ci: CiConfig,
    /// Named rule lists selectable with `--ruleset`
    pub rulesets: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver, selenium, ...)
    pub webdriver_url: String,
    pub headless: bool,
    /// Explicit wait for the page body to appear
    pub page_load_timeout_secs: u64,
    /// Local copy of axe.min.js; takes precedence over the CDN URL
    pub axe_script: Option<PathBuf>,
    pub axe_cdn_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TenonConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CiConfig {
    pub max_violations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs/reports"),
            format: "html".to_string(),
            browser: BrowserConfig::default(),
            tenon: TenonConfig::default(),
            ci: CiConfig::default(),
            rulesets: BTreeMap::new(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            page_load_timeout_secs: 10,
            axe_script: None,
            axe_cdn_url: "https://cdnjs.cloudflare.com/ajax/libs/axe-core/4.10.2/axe.min.js"
                .to_string(),
        }
    }
}

impl Default for TenonConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tenon.io/api/".to_string(),
            api_key: None,
            poll_interval_secs: 5,
        }
    }
}

impl Default for CiConfig {
    fn default() -> Self {
        Self { max_violations: 0 }
    }
}

impl Config {
    /// Resolve a ruleset name to its rule ids.
    ///
    /// Unknown names resolve to [`COMMON_RULES`].
    pub fn ruleset_rules(&self, name: &str) -> Vec<String> {
        match self.rulesets.get(name) {
            Some(rules) => rules.clone(),
            None => COMMON_RULES.iter().map(|r| r.to_string()).collect(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("a11yguard")
        .join("config.yml")
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;

    if is_toml(path) {
        Ok(toml::from_str(&content)?)
    } else if content.trim().is_empty() {
        Ok(Config::default())
    } else {
        serde_yaml::from_str(&content).map_err(|e| Error::Config(format!("YAML parse error: {}", e)))
    }
}

pub fn write_default_config(path: &Path) -> Result<()> {
    let config = Config::default();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = if is_toml(path) {
        toml::to_string_pretty(&config)
            .map_err(|e| Error::Config(format!("TOML serialize error: {}", e)))?
    } else {
        serde_yaml::to_string(&config)?
    };

    std::fs::write(path, content)?;
    Ok(())
}
