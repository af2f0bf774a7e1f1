use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub discussion: DiscussionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub dotfiles: DotfilesConfig,
    #[serde(default)]
    pub likes: LikesConfig,
}

/// The discussion thread that showcases are scraped from.
#[derive(Debug, Deserialize, Clone)]
pub struct DiscussionConfig {
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_number")]
    pub number: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            repo: default_repo(),
            number: default_number(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_owner() -> String {
    "FelixKratz".to_string()
}
fn default_repo() -> String {
    "SketchyBar".to_string()
}
fn default_number() -> u64 {
    47
}
fn default_page_size() -> u32 {
    100
}
fn default_max_pages() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// URL prefix under which screenshots are served by the gallery.
    #[serde(default = "default_screenshots_url_prefix")]
    pub screenshots_url_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
            screenshots_url_prefix: default_screenshots_url_prefix(),
        }
    }
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}
fn default_screenshots_url_prefix() -> String {
    "/screenshots".to_string()
}

impl OutputConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.static_dir.join("data")
    }

    pub fn showcases_dir(&self) -> PathBuf {
        self.data_dir().join("showcases")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.static_dir.join("screenshots")
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir().join("index.json")
    }

    pub fn tags_path(&self) -> PathBuf {
        self.data_dir().join("tags.json")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "SketchyBar-Showcase-Scraper".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DotfilesConfig {
    /// Pause between processed showcases.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Files larger than this (bytes, as reported by the listing) are skipped.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Deepest directory (in relative path segments) that is walked.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Repository names that are never treated as dotfiles.
    #[serde(default = "default_skip_repos")]
    pub skip_repos: Vec<String>,
}

impl Default for DotfilesConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_file_size: default_max_file_size(),
            max_depth: default_max_depth(),
            skip_repos: default_skip_repos(),
        }
    }
}

fn default_delay_ms() -> u64 {
    100
}
fn default_max_file_size() -> u64 {
    100_000
}
fn default_max_depth() -> usize {
    3
}
fn default_skip_repos() -> Vec<String> {
    ["SketchyBar", "SketchyBarHelper", "sketchybar-app-font", "catppuccin"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LikesConfig {
    #[serde(default = "default_likes_path")]
    pub path: PathBuf,
}

impl Default for LikesConfig {
    fn default() -> Self {
        Self {
            path: default_likes_path(),
        }
    }
}

fn default_likes_path() -> PathBuf {
    PathBuf::from("static/data/likes.json")
}

impl Config {
    /// Built-in defaults, used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load the config file if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    if !(1..=100).contains(&config.discussion.page_size) {
        anyhow::bail!("discussion.page_size must be in [1, 100]");
    }

    if config.discussion.max_pages == 0 {
        anyhow::bail!("discussion.max_pages must be >= 1");
    }

    if config.download.timeout_secs == 0 {
        anyhow::bail!("download.timeout_secs must be > 0");
    }

    if config.dotfiles.max_depth == 0 {
        anyhow::bail!("dotfiles.max_depth must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.discussion.number, 47);
        assert_eq!(config.discussion.max_pages, 10);
        assert_eq!(config.download.timeout_secs, 30);
        assert_eq!(config.dotfiles.max_depth, 3);
        assert!(config.dotfiles.skip_repos.contains(&"catppuccin".to_string()));
        validate(&config).unwrap();
    }

    #[test]
    fn derived_paths() {
        let config: Config = toml::from_str("[output]\nstatic_dir = \"site\"\n").unwrap();
        assert_eq!(
            config.output.index_path(),
            PathBuf::from("site/data/index.json")
        );
        assert_eq!(
            config.output.showcases_dir(),
            PathBuf::from("site/data/showcases")
        );
        assert_eq!(
            config.output.screenshots_dir(),
            PathBuf::from("site/screenshots")
        );
    }

    #[test]
    fn rejects_oversized_page() {
        let config: Config = toml::from_str("[discussion]\npage_size = 250\n").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn missing_file_falls_back() {
        let config = load_config_or_default(Path::new("/nonexistent/showcase.toml")).unwrap();
        assert_eq!(config.discussion.repo, "SketchyBar");
    }
}
