//! Turns raw discussion comments into showcase entries.
//!
//! Comments are processed in thread order. A comment qualifies when it has
//! an author and at least one screenshot; a comment whose screenshot set was
//! already seen (a reply quoting its parent) is dropped. Each author gets a
//! running counter so ids stay stable across re-runs of the same thread.

use std::collections::{HashMap, HashSet};

use crate::extract::{extract_dotfiles_url, extract_image_urls, extract_tags, guess_mode};
use crate::models::{Comment, ShowcaseEntry};

/// Lowercase the name and replace everything outside `[a-z0-9]` with `-`.
pub fn slugify(author: &str) -> String {
    author
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}

pub fn showcase_id(author: &str, n: usize) -> String {
    format!("{}-{}", slugify(author), n)
}

pub fn author_url(author: &str) -> String {
    format!("https://github.com/{}", author)
}

/// Order-independent key for a screenshot set.
fn image_set_key(urls: &[String]) -> Vec<String> {
    let mut key = urls.to_vec();
    key.sort();
    key
}

/// Filter, deduplicate, and identify showcase comments.
pub fn build_entries(comments: &[Comment]) -> Vec<ShowcaseEntry> {
    let mut entries = Vec::new();
    let mut seen_sets: HashSet<Vec<String>> = HashSet::new();
    let mut author_counts: HashMap<&str, usize> = HashMap::new();

    for comment in comments {
        let Some(author) = comment.author_login() else {
            continue;
        };

        let image_urls = extract_image_urls(&comment.body);
        if image_urls.is_empty() {
            continue;
        }

        if !seen_sets.insert(image_set_key(&image_urls)) {
            continue;
        }

        let count = author_counts.entry(author).or_insert(0);
        *count += 1;

        entries.push(ShowcaseEntry {
            id: showcase_id(author, *count),
            author: author.to_string(),
            author_url: author_url(author),
            image_urls,
            dotfiles_url: extract_dotfiles_url(&comment.body),
            mode: guess_mode(&comment.body),
            tags: extract_tags(&comment.body),
            created_at: comment.created_at.date_naive(),
            body: comment.body.clone(),
        });
    }

    entries
}
