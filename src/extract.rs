//! Content extraction from free-form comment bodies.
//!
//! Every function here is a pure function of the body text: image URLs,
//! a candidate dotfiles repository URL, a light/dark guess, and topical
//! tags. Extraction is best-effort; free-form markdown has no schema.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::models::DisplayMode;

/// Tag assigned when no keyword pattern matches.
pub const FALLBACK_TAG: &str = "custom";

/// Ordered tag table. Tags are emitted in this order.
const TAG_PATTERNS: &[(&str, &str)] = &[
    ("minimal", r"(?i)minimal|simple|clean"),
    ("catppuccin", r"(?i)catppuccin"),
    ("nord", r"(?i)nord"),
    ("dracula", r"(?i)dracula"),
    ("tokyo-night", r"(?i)tokyo.?night"),
    ("gruvbox", r"(?i)gruvbox"),
    ("rose-pine", r"(?i)ros[eé].?pine"),
    ("icons", r"(?i)icon|symbol|nerd.?font"),
    ("widgets", r"(?i)widget|cpu|memory|battery|weather"),
    ("aerospace", r"(?i)aerospace"),
    ("yabai", r"(?i)yabai"),
    ("lua", r"(?i)lua"),
];

/// Substrings that make a repository link look like a dotfiles repo.
const DOTFILES_KEYWORDS: &[&str] = &["dotfiles", "sketchybar", "dots", "gist"];

const IMAGE_MARKERS: &[&str] = &[
    ".png",
    ".jpg",
    ".jpeg",
    ".gif",
    "user-images",
    "/assets/",
];

static IMAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // ![alt](url)
        r"!\[.*?\]\((https?://[^\s)]+)\)",
        // <img ... src="url">
        r#"(?i)<img[^>]+src=["']([^"']+)["']"#,
        r#"(https://user-images\.githubusercontent\.com/[^\s)"']+)"#,
        r#"(https://github\.com/[^/]+/[^/]+/assets/[^\s)"']+)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid image regex"))
    .collect()
});

static REPO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"https://github\.com/[a-zA-Z0-9_-]+/[a-zA-Z0-9_-]+",
        r"https://gist\.github\.com/[a-zA-Z0-9_-]+/[a-zA-Z0-9]+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid repo regex"))
    .collect()
});

static TAG_REGEXES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TAG_PATTERNS
        .iter()
        .map(|(tag, p)| (*tag, Regex::new(p).expect("valid tag regex")))
        .collect()
});

/// Extract screenshot URLs in discovery order, without duplicates.
pub fn extract_image_urls(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for pattern in IMAGE_PATTERNS.iter() {
        for cap in pattern.captures_iter(body) {
            let url = cap.get(1).or_else(|| cap.get(0)).map(|m| m.as_str());
            let Some(url) = url else { continue };
            if url.is_empty() || !IMAGE_MARKERS.iter().any(|m| url.contains(m)) {
                continue;
            }
            if seen.insert(url.to_string()) {
                urls.push(url.to_string());
            }
        }
    }

    urls
}

/// Pick the most likely dotfiles link.
///
/// The first repository or gist URL containing a dotfiles keyword wins;
/// otherwise the first URL either pattern matched.
pub fn extract_dotfiles_url(body: &str) -> Option<String> {
    for pattern in REPO_PATTERNS.iter() {
        for m in pattern.find_iter(body) {
            let url = m.as_str();
            if DOTFILES_KEYWORDS.iter().any(|k| url.contains(k)) {
                return Some(url.to_string());
            }
        }
    }

    REPO_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(body))
        .map(|m| m.as_str().to_string())
}

/// Keyword heuristic; most setups are dark so that is the default.
pub fn guess_mode(body: &str) -> DisplayMode {
    let lower = body.to_lowercase();
    let light = lower.contains("light");
    if light && lower.contains("dark") {
        DisplayMode::Both
    } else if light || lower.contains("bright") {
        DisplayMode::Light
    } else {
        DisplayMode::Dark
    }
}

/// Match the body against the tag table. Never returns an empty list.
pub fn extract_tags(body: &str) -> Vec<String> {
    let tags: Vec<String> = TAG_REGEXES
        .iter()
        .filter(|(_, re)| re.is_match(body))
        .map(|(tag, _)| tag.to_string())
        .collect();

    if tags.is_empty() {
        vec![FALLBACK_TAG.to_string()]
    } else {
        tags
    }
}
