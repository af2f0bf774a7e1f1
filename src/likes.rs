//! Locally liked showcases.
//!
//! A small persisted set of showcase ids, kept in insertion order in a JSON
//! array file. Every mutation rewrites the whole file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use indexmap::IndexSet;

use crate::config::Config;
use crate::materialize::write_json;

pub struct LikeStore {
    path: PathBuf,
    likes: IndexSet<String>,
}

impl LikeStore {
    /// Load the set from `path`. A missing file is an empty set; a file that
    /// cannot be read or parsed is reported and treated as empty.
    pub fn open(path: &Path) -> Self {
        let likes = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    eprintln!("Warning: failed to parse likes from {}: {}", path.display(), e);
                    IndexSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexSet::new(),
            Err(e) => {
                eprintln!("Warning: failed to load likes from {}: {}", path.display(), e);
                IndexSet::new()
            }
        };
        Self {
            path: path.to_path_buf(),
            likes,
        }
    }

    /// Flip the like state of `id`. Returns `true` if it is now liked.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let liked = if self.likes.shift_remove(id) {
            false
        } else {
            self.likes.insert(id.to_string());
            true
        };
        self.save()?;
        Ok(liked)
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.likes.contains(id)
    }

    pub fn liked_ids(&self) -> Vec<String> {
        self.likes.iter().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.likes.len()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.likes.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        write_json(&self.path, &self.likes)
    }
}

pub fn run_toggle(config: &Config, id: &str) -> Result<()> {
    let mut store = LikeStore::open(&config.likes.path);
    if store.toggle(id)? {
        println!("liked {}", id);
    } else {
        println!("unliked {}", id);
    }
    Ok(())
}

pub fn run_list(config: &Config) -> Result<()> {
    let store = LikeStore::open(&config.likes.path);
    println!("{} liked", store.count());
    for id in store.liked_ids() {
        println!("  {}", id);
    }
    Ok(())
}

pub fn run_clear(config: &Config) -> Result<()> {
    let mut store = LikeStore::open(&config.likes.path);
    store.clear()?;
    println!("cleared all likes");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn toggle_persists_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("likes.json");

        let mut store = LikeStore::open(&path);
        assert!(store.toggle("b-1").unwrap());
        assert!(store.toggle("a-1").unwrap());
        assert!(store.is_liked("a-1"));

        let reopened = LikeStore::open(&path);
        assert_eq!(reopened.liked_ids(), vec!["b-1", "a-1"]);

        let mut store = reopened;
        assert!(!store.toggle("b-1").unwrap());
        assert_eq!(store.count(), 1);
        assert!(!LikeStore::open(&path).is_liked("b-1"));
    }

    #[test]
    fn clear_empties_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("likes.json");
        let mut store = LikeStore::open(&path);
        store.toggle("x-1").unwrap();
        store.clear().unwrap();
        assert_eq!(LikeStore::open(&path).count(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("likes.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(LikeStore::open(&path).count(), 0);
    }
}
