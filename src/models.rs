//! Core data models used throughout the showcase pipeline.
//!
//! Comments come in from the discussion thread, become [`ShowcaseEntry`]
//! records after extraction and deduplication, and are persisted as
//! [`ShowcaseDetail`] files plus the derived [`ShowcaseIndex`] and
//! [`TagsFile`] artifacts read by the gallery front-end.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A discussion comment as returned by the GraphQL API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub author: Option<CommentAuthor>,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentAuthor {
    pub login: String,
}

impl Comment {
    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.login.as_str())
    }
}

/// Light/dark guess for a setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Dark,
    Light,
    Both,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayMode::Dark => "dark",
            DisplayMode::Light => "light",
            DisplayMode::Both => "both",
        };
        f.write_str(s)
    }
}

/// One qualifying comment after extraction and deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseEntry {
    pub id: String,
    pub author: String,
    pub author_url: String,
    pub image_urls: Vec<String>,
    pub dotfiles_url: Option<String>,
    pub mode: DisplayMode,
    pub tags: Vec<String>,
    pub created_at: NaiveDate,
    pub body: String,
}

/// Persisted `showcases/<id>.json` record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowcaseDetail {
    pub id: String,
    pub title: String,
    pub author: String,
    pub author_url: String,
    pub description: String,
    pub screenshots: Vec<String>,
    pub thumbnail: String,
    pub mode: DisplayMode,
    pub tags: Vec<String>,
    #[serde(default)]
    pub github_url: String,
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub dotfiles: IndexMap<String, String>,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub body: String,
}

/// Summary row of `index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    pub author: String,
    pub thumbnail: String,
    pub tags: Vec<String>,
    pub mode: DisplayMode,
}

impl From<&ShowcaseDetail> for IndexEntry {
    fn from(detail: &ShowcaseDetail) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            author: detail.author.clone(),
            thumbnail: detail.thumbnail.clone(),
            tags: detail.tags.clone(),
            mode: detail.mode,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowcaseIndex {
    pub showcases: Vec<IndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    pub id: String,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsFile {
    pub tags: Vec<TagCount>,
}
