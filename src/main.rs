// SPDX-License-Identifier: PMPL-1.0-or-later
//! a11yguard CLI - accessibility testing orchestration

use a11yguard::analyzer::StaticAnalyzer;
use a11yguard::browser::AxeRunner;
use a11yguard::ci::{create_ci_summary, should_fail_build, CiHelper};
use a11yguard::config::{default_config_path, load_config, write_default_config, Config};
use a11yguard::engine::{load_page, read_url_list, UrlTestResult};
use a11yguard::issue::{Issue, Severity};
use a11yguard::report::{default_filename, ReportFormat, ReportGenerator, ReportSummary};
use a11yguard::scanner;
use a11yguard::screen_reader::{
    extract_page_elements, generate_announcement_text, generate_screen_reader_report,
};
use a11yguard::suite::{suite_for, ExportFormat, TestContext};
use a11yguard::tenon::TenonClient;
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Accessibility testing orchestration: axe-core, Tenon.io, static HTML checks and CI gating
#[derive(Parser)]
#[command(name = "a11yguard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Configuration file (YAML or TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run axe-core against URLs in a browser
    Test {
        /// URLs to test
        urls: Vec<String>,

        /// File with one URL per line
        #[arg(long, short)]
        file: Option<PathBuf>,

        /// Report directory
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long)]
        format: Option<FormatArg>,

        /// Run the browser headless
        #[arg(long)]
        headless: bool,

        /// Comma-separated axe rule ids to run
        #[arg(long, short, value_delimiter = ',')]
        rules: Vec<String>,

        /// Named ruleset from the configuration
        #[arg(long, conflicts_with = "rules")]
        ruleset: Option<String>,
    },

    /// Statically analyze an HTML file or directory
    Analyze {
        /// File or directory to analyze
        path: PathBuf,

        /// Report directory
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long)]
        format: Option<FormatArg>,
    },

    /// Run a WCAG 2.2 / Section 508 test suite against pages
    Suite {
        /// URLs or local HTML files
        urls: Vec<String>,

        /// File with one URL per line
        #[arg(long, short)]
        file: Option<PathBuf>,

        /// Which catalog to run
        #[arg(long, short, default_value = "all")]
        suite: SuiteArg,

        /// Export directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Test URLs with the Tenon.io API
    Tenon {
        /// Tenon API key
        #[arg(long, env = "TENON_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// File with one URL per line
        #[arg(long, short)]
        file: PathBuf,

        /// Report directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Test URLs and gate the build on the results
    Ci {
        /// File with one URL per line
        #[arg(long, short)]
        file: PathBuf,

        /// Violations allowed before the build fails
        #[arg(long)]
        max_violations: Option<usize>,

        /// Report directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Inspect an HTML file the way a screen reader user navigates it
    ScreenReader {
        /// HTML file
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination (defaults to the user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Report format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Html,
    Csv,
    Markdown,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Markdown => ReportFormat::Markdown,
        }
    }
}

/// Test suite CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SuiteArg {
    Wcag,
    Section508,
    All,
}

impl SuiteArg {
    fn catalog(&self) -> &'static str {
        match self {
            SuiteArg::Wcag => "wcag",
            SuiteArg::Section508 => "section508",
            SuiteArg::All => "all",
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("a11yguard=debug")
    } else {
        EnvFilter::new("a11yguard=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.unwrap_or_else(default_config_path);

    if !run(cli.command, &config_path).await? {
        std::process::exit(1);
    }
    Ok(())
}

fn load(config_path: &Path) -> anyhow::Result<Config> {
    load_config(config_path).with_context(|| format!("loading {}", config_path.display()))
}

/// Run one command; `Ok(false)` means the process should exit with status 1
async fn run(command: Commands, config_path: &Path) -> anyhow::Result<bool> {
    match command {
        Commands::Test {
            urls,
            file,
            output,
            format,
            headless,
            rules,
            ruleset,
        } => {
            let config = load(config_path)?;
            let urls = collect_urls(urls, file.as_deref())?;
            if urls.is_empty() {
                return Ok(no_urls());
            }

            let rules = match ruleset {
                Some(name) => Some(config.ruleset_rules(&name)),
                None if !rules.is_empty() => Some(rules),
                None => None,
            };

            let mut browser = config.browser.clone();
            browser.headless |= headless;
            let mut runner = AxeRunner::new(browser);

            let results = CiHelper::new()
                .run_accessibility_tests(&urls, &mut runner, rules.as_deref())
                .await;
            write_report(&config, &results, output, format)?;
            print_results(&results);
            Ok(all_clean(&results))
        }

        Commands::Analyze {
            path,
            output,
            format,
        } => {
            let config = load(config_path)?;
            let analyzer = StaticAnalyzer::new();
            let analyses = scanner::scan_path(&analyzer, &path);
            if analyses.is_empty() {
                println!("{}", format!("No HTML files found in {}", path.display()).yellow());
                return Ok(false);
            }

            for analysis in &analyses {
                print_issues(&analysis.path, &analysis.issues);
            }

            let results: Vec<UrlTestResult> = analyses
                .iter()
                .map(|a| UrlTestResult::from_static_issues(&a.path.display().to_string(), &a.issues))
                .collect();
            write_report(&config, &results, output, format)?;
            print_results(&results);

            Ok(!analyses
                .iter()
                .flat_map(|a| &a.issues)
                .any(|i| i.severity == Severity::Error))
        }

        Commands::Suite {
            urls,
            file,
            suite,
            output,
        } => {
            let config = load(config_path)?;
            let urls = collect_urls(urls, file.as_deref())?;
            if urls.is_empty() {
                return Ok(no_urls());
            }
            let output_dir = output.unwrap_or(config.output_dir);
            run_suites(&urls, suite, &output_dir).await
        }

        Commands::Tenon {
            api_key,
            file,
            output,
        } => {
            let config = load(config_path)?;
            let api_key = api_key
                .or_else(|| config.tenon.api_key.clone())
                .ok_or_else(|| anyhow!("Tenon API key required (--api-key or TENON_API_KEY)"))?;
            let urls = read_url_list(&file)?;
            if urls.is_empty() {
                return Ok(no_urls());
            }

            let mut client = TenonClient::from_config(&api_key, &config.tenon);
            let results = CiHelper::new()
                .run_accessibility_tests(&urls, &mut client, None)
                .await;
            write_report(&config, &results, output, None)?;
            print_results(&results);
            Ok(all_clean(&results))
        }

        Commands::Ci {
            file,
            max_violations,
            output,
        } => {
            let config = load(config_path)?;
            let urls = read_url_list(&file)?;
            if urls.is_empty() {
                return Ok(no_urls());
            }
            let max_violations = max_violations.unwrap_or(config.ci.max_violations);
            let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
            run_ci(&config, &urls, max_violations, &output_dir).await
        }

        Commands::ScreenReader { file, json } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            screen_reader(&html, json)
        }

        // Does not load the configuration, so a broken file can be replaced
        Commands::InitConfig { path, force } => {
            init_config(path.as_deref().unwrap_or(config_path), force)
        }
    }
}

fn collect_urls(mut urls: Vec<String>, file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    if let Some(file) = file {
        urls.extend(read_url_list(file).with_context(|| format!("reading {}", file.display()))?);
    }
    Ok(urls)
}

fn no_urls() -> bool {
    println!("{}", "No URLs provided".red());
    false
}

fn all_clean(results: &[UrlTestResult]) -> bool {
    results
        .iter()
        .all(|r| !r.is_error() && r.violation_count() == 0)
}

fn write_report(
    config: &Config,
    results: &[UrlTestResult],
    output: Option<PathBuf>,
    format: Option<FormatArg>,
) -> anyhow::Result<()> {
    let format = match format {
        Some(f) => f.into(),
        None => config.format.parse::<ReportFormat>()?,
    };
    let generator = ReportGenerator::new(output.unwrap_or_else(|| config.output_dir.clone()))?;
    let path = generator.generate(results, format, None)?;
    println!("Report written to {}", path.display());
    Ok(())
}

fn print_results(results: &[UrlTestResult]) {
    println!();
    for result in results {
        if let Some(err) = &result.error {
            println!("  {} {}: {}", "!".yellow().bold(), result.url, err);
        } else if result.violation_count() > 0 {
            println!(
                "  {} {}: {} violations",
                "✗".red().bold(),
                result.url,
                result.violation_count()
            );
            for violation in result.violations() {
                println!(
                    "      {} {} ({} elements)",
                    violation.id.red(),
                    violation.help,
                    violation.nodes.len()
                );
            }
        } else {
            println!("  {} {}", "✓".green().bold(), result.url);
        }
    }

    let summary = ReportSummary::from_results(results);
    println!();
    println!("{}", "Summary".bold());
    println!("  URLs tested:     {}", summary.urls_tested);
    println!("  Violations:      {}", summary.total_violations);
    println!("  Passes:          {}", summary.total_passes);
    println!("  Errors:          {}", summary.total_errors);
    println!("  Compliance rate: {}%", summary.compliance_rate);
}

fn print_issues(path: &Path, issues: &[Issue]) {
    if issues.is_empty() {
        println!("{} {}", "✓".green().bold(), path.display());
        return;
    }

    println!("{} {}", "✗".red().bold(), path.display());
    for issue in issues {
        let severity = match issue.severity {
            Severity::Error => issue.severity.as_str().red(),
            Severity::Warning => issue.severity.as_str().yellow(),
            Severity::Info => issue.severity.as_str().blue(),
        };
        println!(
            "    {} [{}] {} ({})",
            severity,
            issue.rule_id,
            issue.message,
            issue.location_string()
        );
        if let Some(suggestion) = &issue.suggestion {
            println!("      {}", suggestion.dimmed());
        }
    }
}

async fn run_suites(urls: &[String], suite: SuiteArg, output_dir: &Path) -> anyhow::Result<bool> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("a11yguard/", env!("CARGO_PKG_VERSION")))
        .build()?;
    std::fs::create_dir_all(output_dir)?;

    let mut passed = true;
    for (index, url) in urls.iter().enumerate() {
        let html = match load_page(&client, url).await {
            Ok(html) => html,
            Err(e) => {
                error!("Cannot load {}: {}", url, e);
                println!("{} {}: {}", "!".yellow().bold(), url, e);
                passed = false;
                continue;
            }
        };

        let mut test_suite = suite_for(suite.catalog())?;
        info!("Running {} against {}", test_suite.name, url);
        test_suite.run_suite(&TestContext::new().with_url(url).with_html(&html));

        println!("\n{} {}", test_suite.name.bold(), url);
        for result in test_suite.results() {
            println!(
                "  {} {} [{}]: {}",
                result.status.emoji(),
                result.test_name,
                result.priority,
                result.message
            );
        }

        let summary = test_suite.get_results_summary();
        println!(
            "  {} passed, {} failed, {} errors, {} skipped ({}% success)",
            summary.passed.to_string().green(),
            summary.failed.to_string().red(),
            summary.errors.to_string().yellow(),
            summary.skipped,
            summary.success_rate
        );
        passed &= summary.failed == 0 && summary.errors == 0;

        let export = output_dir.join(default_filename(
            &format!("test_results_{}", index + 1),
            ExportFormat::Html.extension(),
        ));
        let path = test_suite.export_results(ExportFormat::Html, Some(export.as_path()))?;
        println!("  Results exported to {}", path.display());
    }

    Ok(passed)
}

async fn run_ci(
    config: &Config,
    urls: &[String],
    max_violations: usize,
    output_dir: &Path,
) -> anyhow::Result<bool> {
    let helper = CiHelper::new();
    let environment = helper.get_ci_environment();
    info!(
        "CI platform: {} (branch {})",
        environment.platform,
        environment.branch.as_deref().unwrap_or("unknown")
    );

    let mut browser = config.browser.clone();
    browser.headless = true;
    let mut runner = AxeRunner::new(browser);
    let results = helper.run_accessibility_tests(urls, &mut runner, None).await;

    let reports = helper.generate_ci_reports(&results, output_dir)?;
    let paths: Vec<PathBuf> = reports.values().cloned().collect();
    helper.upload_artifacts(&paths, "accessibility-reports");

    let summary = ReportSummary::from_results(&results);
    let failed = should_fail_build(&results, max_violations);
    helper.set_ci_output("violations", &summary.total_violations.to_string())?;
    helper.set_ci_output("errors", &summary.total_errors.to_string())?;
    helper.set_ci_output("compliance_rate", &summary.compliance_rate.to_string())?;
    helper.set_ci_output("status", if failed { "failed" } else { "passed" })?;

    println!("{}", create_ci_summary(&results));
    if failed {
        println!(
            "{}",
            format!(
                "Accessibility gate failed: {} violations (max {}), {} errors",
                summary.total_violations, max_violations, summary.total_errors
            )
            .red()
            .bold()
        );
    } else {
        println!("{}", "Accessibility gate passed".green().bold());
    }

    Ok(!failed)
}

fn screen_reader(html: &str, json: bool) -> anyhow::Result<bool> {
    let elements = extract_page_elements(html);
    let report = generate_screen_reader_report(&elements);
    let clean = report.focus_order_issues.is_empty() && report.live_region_issues.is_empty();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(clean);
    }

    println!("{}", "Tab order".bold());
    for (i, element) in elements.iter().filter(|e| e.focusable).enumerate() {
        println!("  {:>3}. {}", i + 1, generate_announcement_text(element));
    }

    println!("\n{}", "Landmarks".bold());
    let landmarks = &report.landmark_summary;
    for (kind, count) in &landmarks.landmark_types {
        println!("  {} x{}", kind, count);
    }
    if !landmarks.has_main {
        println!("  {}", "No main landmark".yellow());
    }

    let issues = report
        .focus_order_issues
        .iter()
        .chain(&report.skip_link_analysis.issues)
        .chain(&report.live_region_issues);
    println!("\n{}", "Issues".bold());
    for issue in issues {
        match issue.position {
            Some(pos) => println!("  {} #{} <{}>: {}", "✗".red(), pos, issue.element, issue.message),
            None => println!("  {} <{}>: {}", "✗".red(), issue.element, issue.message),
        }
    }

    let score = format!("{:.0}/100", report.accessibility_score);
    let score = if report.accessibility_score >= 90.0 {
        score.green()
    } else if report.accessibility_score >= 70.0 {
        score.yellow()
    } else {
        score.red()
    };
    println!(
        "\nScreen reader score: {} ({} elements, {} focusable)",
        score.bold(),
        report.total_elements,
        report.total_focusable_elements
    );

    Ok(clean)
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        println!(
            "{}",
            format!("{} already exists (use --force to overwrite)", path.display()).yellow()
        );
        return Ok(false);
    }

    write_default_config(path)?;
    println!("{} {}", "Configuration written to".green(), path.display());
    Ok(true)
}
