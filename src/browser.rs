// SPDX-License-Identifier: PMPL-1.0-or-later
//! axe-core runner over a WebDriver session.
//!
//! The session is opened lazily against the configured WebDriver server
//! (chromedriver by default). For every URL the page is loaded, axe-core
//! is injected and `axe.run` is awaited inside the page.

use crate::config::BrowserConfig;
use crate::engine::{AxeResults, UrlTestResult, UrlTester};
use crate::error::{Error, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const LOAD_AXE_SCRIPT: &str = r#"
var src = arguments[0];
var done = arguments[arguments.length - 1];
if (window.axe) { done(true); return; }
var s = document.createElement('script');
s.src = src;
s.onload = function () { done(true); };
s.onerror = function () { done(false); };
(document.head || document.documentElement).appendChild(s);
"#;

const RUN_AXE_SCRIPT: &str = r#"
var options = arguments[0];
var done = arguments[arguments.length - 1];
axe.run(document, options).then(
    function (results) { done({ results: results }); },
    function (err) { done({ error: String(err) }); }
);
"#;

/// Runs axe-core in a real browser
pub struct AxeRunner {
    config: BrowserConfig,
    client: Option<Client>,
    local_script: Option<String>,
}

impl AxeRunner {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            client: None,
            local_script: None,
        }
    }

    /// Chrome command-line switches for the session
    pub fn chrome_args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();
        if self.config.headless {
            args.push("--headless");
        }
        args.push("--no-sandbox");
        args.push("--disable-dev-shm-usage");
        args
    }

    pub fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": self.chrome_args() }),
        );
        caps
    }

    async fn session(&mut self) -> Result<Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }

        debug!("Opening WebDriver session at {}", self.config.webdriver_url);
        let client = ClientBuilder::rustls()?
            .capabilities(self.capabilities())
            .connect(&self.config.webdriver_url)
            .await?;
        self.client = Some(client.clone());
        Ok(client)
    }

    async fn inject_axe(&mut self, client: &Client) -> Result<()> {
        if let Some(path) = &self.config.axe_script {
            if self.local_script.is_none() {
                self.local_script = Some(std::fs::read_to_string(path)?);
            }
            if let Some(script) = &self.local_script {
                client.execute(script, vec![]).await?;
            }
            return Ok(());
        }

        let loaded = client
            .execute_async(LOAD_AXE_SCRIPT, vec![json!(self.config.axe_cdn_url)])
            .await?;
        if loaded.as_bool() != Some(true) {
            return Err(Error::WebDriver(format!(
                "failed to load axe-core from {}",
                self.config.axe_cdn_url
            )));
        }
        Ok(())
    }

    async fn run_axe(&mut self, url: &str, rules: Option<&[String]>) -> Result<AxeResults> {
        let client = self.session().await?;

        client.goto(url).await?;
        client
            .wait()
            .at_most(Duration::from_secs(self.config.page_load_timeout_secs))
            .for_element(Locator::Css("body"))
            .await?;

        self.inject_axe(&client).await?;

        let outcome = client
            .execute_async(RUN_AXE_SCRIPT, vec![run_options(rules)])
            .await?;

        if let Some(err) = outcome.get("error").filter(|e| !e.is_null()) {
            let message = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
            return Err(Error::WebDriver(format!("axe.run failed: {}", message)));
        }

        let results = outcome.get("results").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(results)?)
    }
}

/// Options object passed to `axe.run`
pub fn run_options(rules: Option<&[String]>) -> Value {
    match rules {
        Some(rules) if !rules.is_empty() => {
            let enabled: Map<String, Value> = rules
                .iter()
                .map(|r| (r.clone(), json!({ "enabled": true })))
                .collect();
            json!({ "rules": enabled })
        }
        _ => json!({}),
    }
}

#[async_trait]
impl UrlTester for AxeRunner {
    fn name(&self) -> &str {
        "axe-core"
    }

    async fn test_url(&mut self, url: &str, rules: Option<&[String]>) -> UrlTestResult {
        info!("Testing accessibility for: {}", url);
        match self.run_axe(url, rules).await {
            Ok(results) => UrlTestResult::success(url, results),
            Err(e) => {
                error!("Error testing {}: {}", url, e);
                UrlTestResult::failure(url, e)
            }
        }
    }

    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }
}
