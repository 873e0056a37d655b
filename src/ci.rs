// SPDX-License-Identifier: PMPL-1.0-or-later
//! CI/CD integration: platform detection, build gating and CI reports.

use crate::engine::{UrlTestResult, UrlTester};
use crate::error::Result;
use crate::report::ReportGenerator;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Supported CI platforms, detected from well-known environment variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CiPlatform {
    GithubActions,
    GitlabCi,
    Jenkins,
    Travis,
    Circleci,
    Unknown,
}

/// Detection order: the first variable that is set wins
const DETECTION_ORDER: &[(&str, CiPlatform)] = &[
    ("GITHUB_ACTIONS", CiPlatform::GithubActions),
    ("GITLAB_CI", CiPlatform::GitlabCi),
    ("JENKINS_URL", CiPlatform::Jenkins),
    ("TRAVIS", CiPlatform::Travis),
    ("CIRCLECI", CiPlatform::Circleci),
];

impl CiPlatform {
    pub fn detect() -> Self {
        Self::detect_with(|key| std::env::var(key).ok())
    }

    /// Detect using an arbitrary variable lookup
    pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        DETECTION_ORDER
            .iter()
            .find(|(var, _)| lookup(var).is_some_and(|v| !v.is_empty()))
            .map(|(_, platform)| *platform)
            .unwrap_or(CiPlatform::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CiPlatform::GithubActions => "github_actions",
            CiPlatform::GitlabCi => "gitlab_ci",
            CiPlatform::Jenkins => "jenkins",
            CiPlatform::Travis => "travis",
            CiPlatform::Circleci => "circleci",
            CiPlatform::Unknown => "unknown",
        }
    }

    fn build_id_var(&self) -> Option<&'static str> {
        match self {
            CiPlatform::GithubActions => Some("GITHUB_RUN_ID"),
            CiPlatform::GitlabCi => Some("CI_PIPELINE_ID"),
            CiPlatform::Jenkins => Some("BUILD_NUMBER"),
            CiPlatform::Travis => Some("TRAVIS_BUILD_NUMBER"),
            CiPlatform::Circleci => Some("CIRCLE_BUILD_NUM"),
            CiPlatform::Unknown => None,
        }
    }

    fn branch_var(&self) -> Option<&'static str> {
        match self {
            CiPlatform::GithubActions => Some("GITHUB_REF_NAME"),
            CiPlatform::GitlabCi => Some("CI_COMMIT_REF_NAME"),
            CiPlatform::Jenkins => Some("GIT_BRANCH"),
            CiPlatform::Travis => Some("TRAVIS_BRANCH"),
            CiPlatform::Circleci => Some("CIRCLE_BRANCH"),
            CiPlatform::Unknown => None,
        }
    }

    fn commit_var(&self) -> Option<&'static str> {
        match self {
            CiPlatform::GithubActions => Some("GITHUB_SHA"),
            CiPlatform::GitlabCi => Some("CI_COMMIT_SHA"),
            CiPlatform::Jenkins => Some("GIT_COMMIT"),
            CiPlatform::Travis => Some("TRAVIS_COMMIT"),
            CiPlatform::Circleci => Some("CIRCLE_SHA1"),
            CiPlatform::Unknown => None,
        }
    }
}

impl std::fmt::Display for CiPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequest {
    pub number: Option<String>,
    pub title: Option<String>,
}

/// Build metadata gathered from the CI environment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CiEnvironment {
    pub platform: CiPlatform,
    pub build_id: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub pull_request: Option<PullRequest>,
    pub workspace: PathBuf,
}

impl CiEnvironment {
    pub fn from_lookup(
        platform: CiPlatform,
        lookup: impl Fn(&str) -> Option<String>,
        workspace: PathBuf,
    ) -> Self {
        let var = |name: Option<&str>| name.and_then(&lookup);

        let pull_request = match platform {
            CiPlatform::GithubActions
                if lookup("GITHUB_EVENT_NAME").as_deref() == Some("pull_request") =>
            {
                // GITHUB_REF is refs/pull/<number>/merge for pull_request events
                let number = lookup("GITHUB_REF").and_then(|r| {
                    r.strip_prefix("refs/pull/")
                        .and_then(|rest| rest.split('/').next())
                        .map(str::to_string)
                });
                Some(PullRequest {
                    number,
                    title: lookup("GITHUB_HEAD_REF"),
                })
            }
            CiPlatform::GitlabCi => lookup("CI_MERGE_REQUEST_IID")
                .or_else(|| lookup("CI_MERGE_REQUEST_ID"))
                .map(|id| PullRequest {
                    number: Some(id),
                    title: Some(lookup("CI_MERGE_REQUEST_TITLE").unwrap_or_default()),
                }),
            _ => None,
        };

        Self {
            platform,
            build_id: var(platform.build_id_var()),
            branch: var(platform.branch_var()),
            commit: var(platform.commit_var()),
            pull_request,
            workspace,
        }
    }
}

/// Total violations and errored URLs
fn tally(results: &[UrlTestResult]) -> (usize, usize) {
    let violations = results.iter().map(UrlTestResult::violation_count).sum();
    let errors = results.iter().filter(|r| r.is_error()).count();
    (violations, errors)
}

/// Short markdown summary for CI job pages
pub fn create_ci_summary(results: &[UrlTestResult]) -> String {
    let (violations, errors) = tally(results);
    let status = if violations > 0 || errors > 0 {
        "❌ Failed"
    } else {
        "✅ Passed"
    };

    format!(
        "## Accessibility Test Results\n\n\
         - **URLs Tested:** {}\n\
         - **Total Violations:** {}\n\
         - **Test Errors:** {}\n\
         - **Status:** {}",
        results.len(),
        violations,
        errors,
        status
    )
}

/// Fail when violations exceed the threshold or any URL could not be tested
pub fn should_fail_build(results: &[UrlTestResult], max_violations: usize) -> bool {
    let (violations, errors) = tally(results);
    violations > max_violations || errors > 0
}

/// Markdown comment for a GitHub issue or pull request
pub fn create_github_issue_comment(results: &[UrlTestResult]) -> String {
    let mut comment = create_ci_summary(results);
    comment.push_str("\n\n<details>\n<summary>Detailed Results</summary>\n\n");

    for result in results {
        comment.push_str(&format!("\n### {}\n\n", result.url));

        if let Some(error) = &result.error {
            comment.push_str(&format!("❌ **Error:** {}\n\n", error));
            continue;
        }

        let violations = result.violations();
        if !violations.is_empty() {
            comment.push_str("#### Violations\n\n");
            for v in violations {
                comment.push_str(&format!(
                    "- **{}** ({})\n  - {}\n\n",
                    v.help,
                    v.impact.as_deref().unwrap_or("unknown"),
                    v.description
                ));
            }
        }

        let passes = result.passes();
        if !passes.is_empty() {
            comment.push_str(&format!("#### Passes ({})\n\n", passes.len()));
        }
    }

    comment.push_str("</details>");
    comment
}

/// CI-aware helpers bound to one detected platform
pub struct CiHelper {
    platform: CiPlatform,
    output_file: Option<PathBuf>,
}

impl Default for CiHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl CiHelper {
    /// Detect the platform from the process environment
    pub fn new() -> Self {
        Self {
            platform: CiPlatform::detect(),
            output_file: std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
        }
    }

    pub fn with_platform(platform: CiPlatform) -> Self {
        Self {
            platform,
            output_file: None,
        }
    }

    /// Override the GitHub Actions output file
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn platform(&self) -> CiPlatform {
        self.platform
    }

    pub fn get_ci_environment(&self) -> CiEnvironment {
        let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        CiEnvironment::from_lookup(self.platform, |key| std::env::var(key).ok(), workspace)
    }

    /// Publish `key=value`: appended to `$GITHUB_OUTPUT` on GitHub Actions,
    /// printed to stdout elsewhere.
    pub fn set_ci_output(&self, key: &str, value: &str) -> Result<()> {
        match (&self.platform, &self.output_file) {
            (CiPlatform::GithubActions, Some(path)) => {
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                writeln!(file, "{}={}", key, value)?;
            }
            _ => println!("{}={}", key, value),
        }
        Ok(())
    }

    /// Test every URL in order with one tester, then close it
    pub async fn run_accessibility_tests(
        &self,
        urls: &[String],
        tester: &mut dyn UrlTester,
        rules: Option<&[String]>,
    ) -> Vec<UrlTestResult> {
        let mut results = Vec::with_capacity(urls.len());

        for url in urls {
            info!("Testing URL: {} ({})", url, tester.name());
            let result = tester.test_url(url, rules).await;
            if self.platform != CiPlatform::Unknown {
                println!("Tested: {}", url);
            }
            results.push(result);
        }

        tester.close().await;
        results
    }

    /// Write JSON, HTML and Markdown reports, plus `ci_summary.md` on GitHub Actions
    pub fn generate_ci_reports(
        &self,
        results: &[UrlTestResult],
        output_dir: &Path,
    ) -> Result<BTreeMap<String, PathBuf>> {
        let generator = ReportGenerator::new(output_dir)?;
        let mut reports = BTreeMap::new();

        reports.insert("json".to_string(), generator.generate_json_report(results, None)?);
        reports.insert("html".to_string(), generator.generate_html_report(results, None)?);
        reports.insert(
            "markdown".to_string(),
            generator.generate_markdown_report(results, None)?,
        );

        if self.platform == CiPlatform::GithubActions {
            let path = output_dir.join("ci_summary.md");
            std::fs::write(&path, create_ci_summary(results))?;
            reports.insert("ci_summary".to_string(), path);
        }

        Ok(reports)
    }

    /// Announce report artifacts for the CI job.
    ///
    /// Uploading itself is done by the pipeline definition (e.g.
    /// `actions/upload-artifact`); this returns the paths that exist.
    pub fn upload_artifacts(&self, paths: &[PathBuf], artifact_name: &str) -> Vec<PathBuf> {
        let existing: Vec<PathBuf> = paths.iter().filter(|p| p.exists()).cloned().collect();
        for missing in paths.iter().filter(|p| !p.exists()) {
            warn!("Artifact not found: {}", missing.display());
        }

        for path in &existing {
            println!("{}: {}", artifact_name, path.display());
        }
        existing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AxeResults, RuleOutcome};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn with_violations(url: &str, n: usize) -> UrlTestResult {
        UrlTestResult::success(
            url,
            AxeResults {
                violations: (0..n)
                    .map(|i| RuleOutcome {
                        id: format!("rule-{}", i),
                        help: format!("Rule {}", i),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_detection_precedence() {
        assert_eq!(
            CiPlatform::detect_with(env(&[("GITLAB_CI", "true"), ("GITHUB_ACTIONS", "true")])),
            CiPlatform::GithubActions
        );
        assert_eq!(
            CiPlatform::detect_with(env(&[("CIRCLECI", "true"), ("TRAVIS", "true")])),
            CiPlatform::Travis
        );
        assert_eq!(
            CiPlatform::detect_with(env(&[("GITHUB_ACTIONS", "")])),
            CiPlatform::Unknown
        );
    }

    #[test]
    fn test_environment_from_gitlab_vars() {
        let lookup = env(&[
            ("CI_PIPELINE_ID", "42"),
            ("CI_COMMIT_REF_NAME", "main"),
            ("CI_COMMIT_SHA", "abc123"),
            ("CI_MERGE_REQUEST_IID", "7"),
        ]);
        let ci = CiEnvironment::from_lookup(CiPlatform::GitlabCi, lookup, PathBuf::from("/w"));
        assert_eq!(ci.build_id.as_deref(), Some("42"));
        assert_eq!(ci.branch.as_deref(), Some("main"));
        assert_eq!(ci.commit.as_deref(), Some("abc123"));
        assert_eq!(ci.pull_request.unwrap().number.as_deref(), Some("7"));
    }

    #[test]
    fn test_github_pull_request_number_from_ref() {
        let lookup = env(&[
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_REF", "refs/pull/15/merge"),
            ("GITHUB_HEAD_REF", "fix-alt-text"),
            ("GITHUB_RUN_ID", "9001"),
        ]);
        let ci = CiEnvironment::from_lookup(CiPlatform::GithubActions, lookup, PathBuf::from("."));
        let pr = ci.pull_request.unwrap();
        assert_eq!(pr.number.as_deref(), Some("15"));
        assert_eq!(pr.title.as_deref(), Some("fix-alt-text"));
        assert_eq!(ci.build_id.as_deref(), Some("9001"));
    }

    #[test]
    fn test_gate() {
        let clean = vec![with_violations("a", 0)];
        assert!(!should_fail_build(&clean, 0));

        let two = vec![with_violations("a", 2)];
        assert!(should_fail_build(&two, 1));
        assert!(!should_fail_build(&two, 2));

        let errored = vec![UrlTestResult::failure("b", "timeout")];
        assert!(should_fail_build(&errored, 100));
    }

    #[test]
    fn test_summary_status() {
        let summary = create_ci_summary(&[with_violations("a", 0)]);
        assert!(summary.contains("- **URLs Tested:** 1"));
        assert!(summary.contains("✅ Passed"));

        let summary = create_ci_summary(&[UrlTestResult::failure("b", "x")]);
        assert!(summary.contains("- **Test Errors:** 1"));
        assert!(summary.contains("❌ Failed"));
    }

    #[test]
    fn test_issue_comment_wraps_details() {
        let comment = create_github_issue_comment(&[
            with_violations("https://a.example", 1),
            UrlTestResult::failure("https://b.example", "boom"),
        ]);
        assert!(comment.contains("<details>"));
        assert!(comment.contains("### https://a.example"));
        assert!(comment.contains("- **Rule 0** (unknown)"));
        assert!(comment.contains("❌ **Error:** boom"));
        assert!(comment.ends_with("</details>"));
    }

    #[test]
    fn test_github_output_is_appended() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("output");
        let helper = CiHelper::with_platform(CiPlatform::GithubActions).with_output_file(&out);
        helper.set_ci_output("violations", "3").unwrap();
        helper.set_ci_output("status", "failed").unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "violations=3\nstatus=failed\n"
        );
    }

    #[test]
    fn test_ci_reports_include_summary_on_github() {
        let dir = TempDir::new().unwrap();
        let results = vec![with_violations("https://a.example", 1)];

        let reports = CiHelper::with_platform(CiPlatform::GithubActions)
            .generate_ci_reports(&results, dir.path())
            .unwrap();
        assert_eq!(reports.len(), 4);
        assert!(reports["ci_summary"].exists());

        let reports = CiHelper::with_platform(CiPlatform::Jenkins)
            .generate_ci_reports(&results, &dir.path().join("jenkins"))
            .unwrap();
        assert!(!reports.contains_key("ci_summary"));
    }

    #[test]
    fn test_upload_artifacts_filters_missing() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("report.json");
        std::fs::write(&present, "{}").unwrap();
        let uploaded = CiHelper::with_platform(CiPlatform::Unknown)
            .upload_artifacts(&[present.clone(), dir.path().join("gone.html")], "reports");
        assert_eq!(uploaded, vec![present]);
    }
}
