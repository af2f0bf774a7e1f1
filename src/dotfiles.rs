//! Dotfiles enricher.
//!
//! For every persisted showcase whose `dotfiles` map is still empty, the
//! linked GitHub repository is searched for a SketchyBar config directory
//! and its text files are copied into the record.
//!
//! # Locating the config
//!
//! 1. A URL of the form `github.com/owner/repo/tree/<branch>/<path>` names
//!    the directory directly (branch defaults to `main`).
//! 2. Otherwise the default branch is looked up and [`CANDIDATE_PATHS`] are
//!    probed in order; the first non-empty directory wins.
//! 3. Otherwise the repository root is used if it holds a `sketchybarrc`
//!    file or a `sketchybar` directory.
//!
//! Records are processed one at a time with a short pause in between.
//! A record that already has dotfiles is never touched again.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::catalog::{read_detail, showcase_files};
use crate::config::{Config, DotfilesConfig};
use crate::github::{contents_endpoint, repo_endpoint, GitHubApi};
use crate::materialize::write_json;
use crate::progress::{ProgressEvent, ProgressReporter};

/// Relative paths probed for a config directory, in order.
pub const CANDIDATE_PATHS: &[&str] = &[
    "sketchybar",
    ".config/sketchybar",
    "config/sketchybar",
    // chezmoi
    "dot_config/sketchybar",
    "private_dot_config/sketchybar",
];

const ROOT_MARKER_FILES: &[&str] = &["sketchybarrc", "sketchybarrc.sh"];
const ROOT_MARKER_DIR: &str = "sketchybar";

/// Branch assumed when a `/tree/` URL is followed without one.
const FALLBACK_BRANCH: &str = "main";

const BINARY_GLOBS: &[&str] = &["*.{png,jpg,jpeg,gif,ico,woff,ttf,pdf}"];

static GITHUB_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/]+)(?:/tree/([^/]+)/(.+))?").expect("valid github regex")
});

/// Owner/repository (and optionally branch and sub-path) parsed from a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub path: Option<String>,
}

pub fn parse_github_url(url: &str) -> Option<RepoRef> {
    let caps = GITHUB_URL_RE.captures(url)?;
    let repo = caps[2].trim_end_matches(".git").to_string();
    Some(RepoRef {
        owner: caps[1].to_string(),
        repo,
        branch: caps.get(3).map(|m| m.as_str().to_string()),
        path: caps
            .get(4)
            .map(|m| m.as_str().trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty()),
    })
}

/// One entry of a contents listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct FileContent {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

/// Where a config directory was found.
#[derive(Debug, Clone)]
pub struct ConfigLocation {
    /// Repository-relative path; empty for the root.
    pub path: String,
    pub branch: String,
    pub listing: Vec<ContentItem>,
}

impl ConfigLocation {
    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            "root"
        } else {
            &self.path
        }
    }
}

/// Why a showcase was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyEnriched,
    InvalidUrl,
    ProfileLink,
    ExcludedRepo,
    NoConfig,
    NoFiles,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::AlreadyEnriched => "already has dotfiles",
            SkipReason::InvalidUrl => "invalid/missing GitHub URL",
            SkipReason::ProfileLink => "no specific repo",
            SkipReason::ExcludedRepo => "not a dotfiles repo",
            SkipReason::NoConfig => "no config found",
            SkipReason::NoFiles => "no files fetched",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    Enriched { files: usize, path: String },
    Skipped(SkipReason),
}

#[derive(Debug, Clone)]
pub struct EnrichedShowcase {
    pub id: String,
    pub files: usize,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct SkippedShowcase {
    pub id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct FailedShowcase {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct DotfilesReport {
    pub success: Vec<EnrichedShowcase>,
    pub skipped: Vec<SkippedShowcase>,
    pub failed: Vec<FailedShowcase>,
}

/// Contents listing of a directory; `None` when the path is missing, is a
/// file, or the lookup fails.
async fn list_dir(
    api: &dyn GitHubApi,
    owner: &str,
    repo: &str,
    path: &str,
    branch: &str,
) -> Option<Vec<ContentItem>> {
    let value = api
        .rest(&contents_endpoint(owner, repo, path, branch))
        .await
        .ok()?;
    if !value.is_array() {
        return None;
    }
    serde_json::from_value(value).ok()
}

async fn default_branch(api: &dyn GitHubApi, owner: &str, repo: &str) -> Option<String> {
    let value = api.rest(&repo_endpoint(owner, repo)).await.ok()?;
    serde_json::from_value::<RepoInfo>(value)
        .ok()
        .map(|info| info.default_branch)
}

/// Find the config directory for `repo`.
pub async fn locate_config(api: &dyn GitHubApi, repo: &RepoRef) -> Option<ConfigLocation> {
    if let Some(path) = &repo.path {
        let branch = repo
            .branch
            .clone()
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string());
        let listing = list_dir(api, &repo.owner, &repo.repo, path, &branch).await?;
        return Some(ConfigLocation {
            path: path.clone(),
            branch,
            listing,
        });
    }

    let branch = match &repo.branch {
        Some(b) => b.clone(),
        None => default_branch(api, &repo.owner, &repo.repo).await?,
    };

    for candidate in CANDIDATE_PATHS {
        if let Some(listing) = list_dir(api, &repo.owner, &repo.repo, candidate, &branch).await {
            if !listing.is_empty() {
                return Some(ConfigLocation {
                    path: candidate.to_string(),
                    branch,
                    listing,
                });
            }
        }
    }

    let root = list_dir(api, &repo.owner, &repo.repo, "", &branch).await?;
    let has_marker = root.iter().any(|item| {
        ROOT_MARKER_FILES.contains(&item.name.as_str())
            || (item.name == ROOT_MARKER_DIR && item.kind == "dir")
    });
    if has_marker {
        Some(ConfigLocation {
            path: String::new(),
            branch,
            listing: root,
        })
    } else {
        None
    }
}

fn build_binary_globset() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in BINARY_GLOBS {
        builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
    }
    Ok(builder.build()?)
}

/// Limits applied while walking a config directory.
struct WalkLimits<'a> {
    max_file_size: u64,
    max_depth: usize,
    binary: &'a GlobSet,
}

struct RepoCursor<'a> {
    owner: &'a str,
    repo: &'a str,
    branch: &'a str,
}

/// Base64 from the contents API, with its embedded line breaks.
fn decode_content(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

async fn fetch_file(api: &dyn GitHubApi, at: &RepoCursor<'_>, path: &str) -> Option<String> {
    let value = api
        .rest(&contents_endpoint(at.owner, at.repo, path, at.branch))
        .await
        .ok()?;
    let file: FileContent = serde_json::from_value(value).ok()?;
    let content = file.content.filter(|c| !c.is_empty())?;
    decode_content(&content)
}

fn walk<'a>(
    api: &'a dyn GitHubApi,
    at: &'a RepoCursor<'a>,
    limits: &'a WalkLimits<'a>,
    listing: Vec<ContentItem>,
    prefix: String,
    out: &'a mut IndexMap<String, String>,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
    Box::pin(async move {
        for item in listing {
            let relative = if prefix.is_empty() {
                item.name.clone()
            } else {
                format!("{}/{}", prefix, item.name)
            };

            match item.kind.as_str() {
                "file" => {
                    if item.size > limits.max_file_size || limits.binary.is_match(&item.name) {
                        continue;
                    }
                    if let Some(content) = fetch_file(api, at, &item.path).await {
                        out.insert(relative, content);
                    }
                }
                "dir" => {
                    if relative.split('/').count() > limits.max_depth {
                        continue;
                    }
                    if let Some(children) =
                        list_dir(api, at.owner, at.repo, &item.path, at.branch).await
                    {
                        walk(api, at, limits, children, relative, out).await;
                    }
                }
                _ => {}
            }
        }
    })
}

/// Download the text files below a located config directory, keyed by
/// path relative to it.
pub async fn fetch_config_files(
    api: &dyn GitHubApi,
    repo: &RepoRef,
    location: &ConfigLocation,
    config: &DotfilesConfig,
) -> Result<IndexMap<String, String>> {
    let binary = build_binary_globset()?;
    let limits = WalkLimits {
        max_file_size: config.max_file_size,
        max_depth: config.max_depth,
        binary: &binary,
    };
    let at = RepoCursor {
        owner: &repo.owner,
        repo: &repo.repo,
        branch: &location.branch,
    };

    let mut files = IndexMap::new();
    walk(
        api,
        &at,
        &limits,
        location.listing.clone(),
        String::new(),
        &mut files,
    )
    .await;
    Ok(files)
}

/// Enrich a single showcase file in place.
pub async fn enrich_showcase(
    api: &dyn GitHubApi,
    path: &Path,
    config: &DotfilesConfig,
    progress: &dyn ProgressReporter,
) -> Result<EnrichOutcome> {
    let mut detail = read_detail(path)?;

    if !detail.dotfiles.is_empty() {
        return Ok(EnrichOutcome::Skipped(SkipReason::AlreadyEnriched));
    }

    let Some(repo) = parse_github_url(&detail.github_url) else {
        return Ok(EnrichOutcome::Skipped(SkipReason::InvalidUrl));
    };
    if repo.repo.is_empty() || repo.repo == repo.owner {
        return Ok(EnrichOutcome::Skipped(SkipReason::ProfileLink));
    }
    if config.skip_repos.iter().any(|r| *r == repo.repo) {
        return Ok(EnrichOutcome::Skipped(SkipReason::ExcludedRepo));
    }

    progress.report(ProgressEvent::Checking {
        owner: repo.owner.clone(),
        repo: repo.repo.clone(),
    });

    let Some(location) = locate_config(api, &repo).await else {
        return Ok(EnrichOutcome::Skipped(SkipReason::NoConfig));
    };
    progress.report(ProgressEvent::Found {
        id: detail.id.clone(),
        path: location.display_path().to_string(),
    });

    let files = fetch_config_files(api, &repo, &location, config).await?;
    if files.is_empty() {
        return Ok(EnrichOutcome::Skipped(SkipReason::NoFiles));
    }

    let count = files.len();
    detail.dotfiles = files;
    write_json(path, &detail)?;

    Ok(EnrichOutcome::Enriched {
        files: count,
        path: location.display_path().to_string(),
    })
}

/// Enrich every showcase under `showcases_dir`, one after another.
pub async fn enrich_all(
    api: &dyn GitHubApi,
    showcases_dir: &Path,
    config: &DotfilesConfig,
    progress: &dyn ProgressReporter,
) -> Result<DotfilesReport> {
    let files = showcase_files(showcases_dir)?;
    println!("Found {} showcases to process\n", files.len());

    let delay = Duration::from_millis(config.delay_ms);
    let mut report = DotfilesReport::default();

    for file in &files {
        let id = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        match enrich_showcase(api, file, config, progress).await {
            Ok(EnrichOutcome::Enriched { files, path }) => {
                progress.report(ProgressEvent::Enriched {
                    id: id.clone(),
                    files,
                });
                report.success.push(EnrichedShowcase { id, files, path });
            }
            Ok(EnrichOutcome::Skipped(reason)) => {
                progress.report(ProgressEvent::Skipped {
                    id: id.clone(),
                    reason: reason.to_string(),
                });
                report.skipped.push(SkippedShowcase { id, reason });
            }
            Err(e) => {
                progress.report(ProgressEvent::Failed {
                    id: id.clone(),
                    error: format!("{:#}", e),
                });
                report.failed.push(FailedShowcase {
                    id,
                    error: format!("{:#}", e),
                });
            }
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(report)
}

/// CLI entry point for `showcase dotfiles`.
pub async fn run_dotfiles(
    config: &Config,
    api: &dyn GitHubApi,
    progress: &dyn ProgressReporter,
) -> Result<DotfilesReport> {
    println!("Fetching dotfiles from GitHub repos...\n");

    let showcases_dir = config.output.showcases_dir();
    let report = enrich_all(api, &showcases_dir, &config.dotfiles, progress)
        .await
        .with_context(|| "Dotfiles run failed")?;

    println!("\n--- Summary ---");
    println!("Success: {}", report.success.len());
    println!("Skipped: {}", report.skipped.len());
    println!("Failed: {}", report.failed.len());

    if !report.success.is_empty() {
        println!("\nSuccessfully fetched:");
        for s in &report.success {
            println!("  - {}: {} files from {}", s.id, s.files, s.path);
        }
    }

    Ok(report)
}
