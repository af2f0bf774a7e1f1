//! Read access to the generated gallery data.
//!
//! A [`Catalog`] loads `index.json` lazily the first time it is needed and
//! keeps it for the rest of the run; detail records are read on demand.
//! Used by `showcase get`, `showcase tags`, and the dotfiles enricher.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::config::{Config, OutputConfig};
use crate::models::{ShowcaseDetail, ShowcaseIndex, TagsFile};

/// Position of a showcase within the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbours {
    pub prev: Option<String>,
    pub next: Option<String>,
    /// 1-based.
    pub position: usize,
    pub total: usize,
}

pub struct Catalog {
    output: OutputConfig,
    index: OnceLock<ShowcaseIndex>,
}

impl Catalog {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            output: output.clone(),
            index: OnceLock::new(),
        }
    }

    pub fn index(&self) -> Result<&ShowcaseIndex> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let loaded: ShowcaseIndex = read_json(&self.output.index_path())?;
        Ok(self.index.get_or_init(|| loaded))
    }

    pub fn ids(&self) -> Result<Vec<&str>> {
        Ok(self
            .index()?
            .showcases
            .iter()
            .map(|s| s.id.as_str())
            .collect())
    }

    pub fn detail_path(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            bail!("invalid showcase id: {}", id);
        }
        Ok(self.output.showcases_dir().join(format!("{}.json", id)))
    }

    pub fn load_detail(&self, id: &str) -> Result<ShowcaseDetail> {
        read_detail(&self.detail_path(id)?)
    }

    /// Previous/next ids around `id`, or `None` when it is not indexed.
    pub fn neighbours(&self, id: &str) -> Result<Option<Neighbours>> {
        let ids = self.ids()?;
        let Some(pos) = ids.iter().position(|i| *i == id) else {
            return Ok(None);
        };
        Ok(Some(Neighbours {
            prev: pos.checked_sub(1).map(|p| ids[p].to_string()),
            next: ids.get(pos + 1).map(|s| s.to_string()),
            position: pos + 1,
            total: ids.len(),
        }))
    }

    pub fn tags(&self) -> Result<TagsFile> {
        read_json(&self.output.tags_path())
    }

    pub fn showcase_files(&self) -> Result<Vec<PathBuf>> {
        showcase_files(&self.output.showcases_dir())
    }
}

/// Every `*.json` file directly inside `dir`, sorted by file name.
pub fn showcase_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Showcases directory not found: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "json") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

pub fn read_detail(path: &Path) -> Result<ShowcaseDetail> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// CLI entry point for `showcase get <id>`.
pub fn run_get(config: &Config, id: &str) -> Result<()> {
    let catalog = Catalog::new(&config.output);
    let detail = catalog.load_detail(id)?;
    let neighbours = catalog.neighbours(id)?;

    println!("--- Showcase ---");
    println!("id:           {}", detail.id);
    println!("title:        {}", detail.title);
    println!("author:       {} ({})", detail.author, detail.author_url);
    println!("created_at:   {}", detail.created_at);
    println!("mode:         {}", detail.mode);
    println!("tags:         {}", detail.tags.join(", "));
    println!("github_url:   {}", detail.github_url);
    println!("thumbnail:    {}", detail.thumbnail);
    match neighbours {
        Some(n) => {
            println!("position:     {} / {}", n.position, n.total);
            println!("prev:         {}", n.prev.as_deref().unwrap_or("-"));
            println!("next:         {}", n.next.as_deref().unwrap_or("-"));
        }
        None => println!("position:     (not in index)"),
    }
    println!();

    println!("--- Screenshots ({}) ---", detail.screenshots.len());
    for shot in &detail.screenshots {
        println!("{}", shot);
    }
    println!();

    println!("--- Dotfiles ({}) ---", detail.dotfiles.len());
    for (path, content) in &detail.dotfiles {
        println!("{}  ({} bytes)", path, content.len());
    }

    Ok(())
}

/// CLI entry point for `showcase tags`.
pub fn run_tags(config: &Config) -> Result<()> {
    let catalog = Catalog::new(&config.output);
    let tags = catalog.tags()?;

    println!("{:<16} COUNT", "TAG");
    for tag in &tags.tags {
        println!("{:<16} {}", tag.label, tag.count);
    }

    Ok(())
}
