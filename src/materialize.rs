//! Writes showcase entries out as gallery artifacts.
//!
//! For every entry, screenshots are downloaded into
//! `screenshots/<id>/` (`main.<ext>`, then `screenshot-<i>.<ext>`), a
//! `showcases/<id>.json` detail record is written, and the entry is added
//! to `index.json` and the tag counts in `tags.json`.
//!
//! Existing screenshot files are never re-downloaded, so an interrupted
//! run can simply be started again. A failed image only loses that image;
//! an entry with no usable images is left out of every artifact.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::OutputConfig;
use crate::download::ImageSource;
use crate::models::{IndexEntry, ShowcaseDetail, ShowcaseEntry, ShowcaseIndex, TagCount, TagsFile};
use crate::progress::{ProgressEvent, ProgressReporter};

const DEPENDENCIES: &[&str] = &["sketchybar"];

/// Theme tags that earn a title suffix, in precedence order.
const TITLE_THEMES: &[(&str, &str)] = &[
    ("catppuccin", "Catppuccin"),
    ("nord", "Nord"),
    ("dracula", "Dracula"),
];

#[derive(Debug, Clone)]
pub struct ImageFailure {
    pub id: String,
    pub url: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct MaterializeReport {
    /// Ids written to the index, in order.
    pub processed: Vec<String>,
    /// Ids dropped because no screenshot could be downloaded.
    pub skipped: Vec<String>,
    pub image_failures: Vec<ImageFailure>,
}

/// File extension guessed from the URL text; `.jpg` when nothing matches.
pub fn image_extension(url: &str) -> &'static str {
    if url.contains(".png") {
        ".png"
    } else if url.contains(".gif") {
        ".gif"
    } else if url.contains(".jpeg") {
        ".jpeg"
    } else {
        ".jpg"
    }
}

pub fn screenshot_filename(index: usize, ext: &str) -> String {
    if index == 0 {
        format!("main{}", ext)
    } else {
        format!("screenshot-{}{}", index, ext)
    }
}

pub fn showcase_title(author: &str, tags: &[String]) -> String {
    let suffix = TITLE_THEMES
        .iter()
        .find(|(tag, _)| tags.iter().any(|t| t == tag))
        .map(|(_, label)| format!(" ({})", label))
        .unwrap_or_default();
    format!("{}'s Setup{}", author, suffix)
}

pub fn showcase_description(author: &str) -> String {
    format!(
        "A SketchyBar configuration shared by {} in the community showcase thread.",
        author
    )
}

/// Build the persisted record for an entry. `screenshots` must be non-empty;
/// the first one becomes the thumbnail.
pub fn build_detail(entry: &ShowcaseEntry, screenshots: Vec<String>) -> ShowcaseDetail {
    let thumbnail = screenshots.first().cloned().unwrap_or_default();
    ShowcaseDetail {
        id: entry.id.clone(),
        title: showcase_title(&entry.author, &entry.tags),
        author: entry.author.clone(),
        author_url: entry.author_url.clone(),
        description: showcase_description(&entry.author),
        screenshots,
        thumbnail,
        mode: entry.mode,
        tags: entry.tags.clone(),
        github_url: entry
            .dotfiles_url
            .clone()
            .unwrap_or_else(|| entry.author_url.clone()),
        dependencies: DEPENDENCIES.iter().map(|d| d.to_string()).collect(),
        dotfiles: IndexMap::new(),
        created_at: entry.created_at,
        image_urls: entry.image_urls.clone(),
        body: entry.body.clone(),
    }
}

/// Count tag occurrences, most frequent first. Ties keep first-seen order.
pub fn count_tags<'a, I>(tag_lists: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for tags in tag_lists {
        for tag in tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut out: Vec<TagCount> = counts
        .into_iter()
        .map(|(id, count)| TagCount {
            id: id.to_string(),
            label: id.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Pretty-print `value` to `path`, replacing any existing file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Download, persist, and index every entry.
pub async fn materialize(
    entries: &[ShowcaseEntry],
    images: &dyn ImageSource,
    output: &OutputConfig,
    progress: &dyn ProgressReporter,
) -> Result<MaterializeReport> {
    let showcases_dir = output.showcases_dir();
    let screenshots_dir = output.screenshots_dir();
    std::fs::create_dir_all(&showcases_dir)
        .with_context(|| format!("Failed to create directory: {}", showcases_dir.display()))?;

    let url_prefix = output.screenshots_url_prefix.trim_end_matches('/');
    let mut report = MaterializeReport::default();
    let mut index = ShowcaseIndex::default();

    for entry in entries {
        let entry_dir = screenshots_dir.join(&entry.id);
        std::fs::create_dir_all(&entry_dir)
            .with_context(|| format!("Failed to create directory: {}", entry_dir.display()))?;

        let mut screenshots = Vec::new();
        for (i, url) in entry.image_urls.iter().enumerate() {
            let filename = screenshot_filename(i, image_extension(url));
            let file_path = entry_dir.join(&filename);

            if !file_path.exists() {
                let saved = match images.fetch(url).await {
                    Ok(bytes) => std::fs::write(&file_path, bytes)
                        .with_context(|| format!("Failed to write {}", file_path.display())),
                    Err(e) => Err(e),
                };
                if let Err(e) = saved {
                    progress.report(ProgressEvent::DownloadFailed {
                        url: url.clone(),
                        error: e.to_string(),
                    });
                    report.image_failures.push(ImageFailure {
                        id: entry.id.clone(),
                        url: url.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
                progress.report(ProgressEvent::Downloaded {
                    id: entry.id.clone(),
                    file: filename.clone(),
                });
            }

            screenshots.push(format!("{}/{}/{}", url_prefix, entry.id, filename));
        }

        if screenshots.is_empty() {
            progress.report(ProgressEvent::Skipped {
                id: entry.id.clone(),
                reason: "no screenshots downloaded".to_string(),
            });
            report.skipped.push(entry.id.clone());
            continue;
        }

        let detail = build_detail(entry, screenshots);
        write_json(&showcases_dir.join(format!("{}.json", entry.id)), &detail)?;
        index.showcases.push(IndexEntry::from(&detail));
        report.processed.push(entry.id.clone());
    }

    let tags = TagsFile {
        tags: count_tags(index.showcases.iter().map(|s| s.tags.as_slice())),
    };
    write_json(&output.index_path(), &index)?;
    write_json(&output.tags_path(), &tags)?;

    Ok(report)
}
