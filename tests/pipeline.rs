//! Integration tests for the scrape pipeline.
//!
//! The GitHub API and the image host are replaced with in-memory fakes so
//! pagination, deduplication, and artifact writing can be checked end to end
//! against a scratch directory.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use showcase_harvest::config::Config;
use showcase_harvest::discussion::fetch_all_comments;
use showcase_harvest::download::ImageSource;
use showcase_harvest::github::GitHubApi;
use showcase_harvest::models::{ShowcaseDetail, ShowcaseIndex, TagsFile};
use showcase_harvest::progress::NoProgress;
use showcase_harvest::scrape::run_scrape;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

// ─── Fakes ──────────────────────────────────────────────────────────

/// Serves discussion pages keyed by the cursor they were requested with
/// (`""` for the first page).
struct FakeDiscussion {
    pages: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
}

impl FakeDiscussion {
    fn new(pages: Vec<(&str, Value)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(cursor, page)| (cursor.to_string(), page))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitHubApi for FakeDiscussion {
    async fn graphql(&self, _query: &str, variables: &Map<String, Value>) -> Result<Value> {
        let cursor = variables
            .get("cursor")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        self.calls.lock().unwrap().push(cursor.clone());
        let comments = self
            .pages
            .get(&cursor)
            .cloned()
            .ok_or_else(|| anyhow!("unexpected cursor: {}", cursor))?;
        Ok(json!({ "data": { "repository": { "discussion": { "comments": comments } } } }))
    }

    async fn rest(&self, endpoint: &str) -> Result<Value> {
        Err(anyhow!("unexpected REST call: {}", endpoint))
    }
}

struct FakeImages {
    files: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl FakeImages {
    fn new(files: &[(&str, &[u8])]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(url, bytes)| (url.to_string(), bytes.to_vec()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageSource for FakeImages {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(url.to_string());
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("Failed to download: 404"))
    }
}

fn node(author: Option<&str>, body: &str) -> Value {
    json!({
        "author": author.map(|login| json!({ "login": login })),
        "body": body,
        "createdAt": "2024-01-02T03:04:05Z"
    })
}

fn page(nodes: Vec<Value>, has_next: bool, end_cursor: Option<&str>) -> Value {
    json!({
        "pageInfo": { "hasNextPage": has_next, "endCursor": end_cursor },
        "nodes": nodes
    })
}

fn config_in(tmp: &TempDir) -> Config {
    let mut config = Config::minimal();
    config.output.static_dir = tmp.path().join("static");
    config
}

fn read<T: serde::de::DeserializeOwned>(path: std::path::PathBuf) -> T {
    serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap()
}

// ─── Pagination ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_pagination_stops_on_last_page() {
    let api = FakeDiscussion::new(vec![
        ("", page(vec![node(Some("a"), "one"), node(Some("b"), "two")], true, Some("c1"))),
        ("c1", page(vec![node(Some("c"), "three")], true, Some("c2"))),
        ("c2", page(vec![node(Some("d"), "four")], false, Some("c3"))),
    ]);
    let config = Config::minimal();

    let comments = fetch_all_comments(&api, &config.discussion, &NoProgress)
        .await
        .unwrap();

    let bodies: Vec<&str> = comments.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, vec!["one", "two", "three", "four"]);
    assert_eq!(api.calls(), vec!["", "c1", "c2"]);
}

#[tokio::test]
async fn test_deleted_comments_are_dropped() {
    let api = FakeDiscussion::new(vec![(
        "",
        page(vec![node(Some("a"), "kept"), Value::Null], false, None),
    )]);
    let config = Config::minimal();

    let comments = fetch_all_comments(&api, &config.discussion, &NoProgress)
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author_login(), Some("a"));
}

#[tokio::test]
async fn test_empty_cursor_stops() {
    let api = FakeDiscussion::new(vec![("", page(vec![node(Some("a"), "x")], true, Some("")))]);
    let config = Config::minimal();

    let comments = fetch_all_comments(&api, &config.discussion, &NoProgress)
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn test_pagination_ceiling_is_fatal() {
    let api = FakeDiscussion::new(vec![
        ("", page(vec![node(Some("a"), "x")], true, Some("c1"))),
        ("c1", page(vec![node(Some("b"), "y")], true, Some("c2"))),
        ("c2", page(vec![node(Some("c"), "z")], false, None)),
    ]);
    let mut config = Config::minimal();
    config.discussion.max_pages = 2;

    let err = fetch_all_comments(&api, &config.discussion, &NoProgress)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Pagination ceiling"));
    assert_eq!(api.calls(), vec!["", "c1"]);
}

#[tokio::test]
async fn test_graphql_errors_are_fatal() {
    struct Broken;

    #[async_trait]
    impl GitHubApi for Broken {
        async fn graphql(&self, _q: &str, _v: &Map<String, Value>) -> Result<Value> {
            Ok(json!({ "data": null, "errors": [{ "message": "Bad credentials" }] }))
        }
        async fn rest(&self, _e: &str) -> Result<Value> {
            unreachable!()
        }
    }

    let config = Config::minimal();
    let err = fetch_all_comments(&Broken, &config.discussion, &NoProgress)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Bad credentials"));
}

// ─── Scrape end to end ──────────────────────────────────────────────

fn thread() -> FakeDiscussion {
    FakeDiscussion::new(vec![
        (
            "",
            page(
                vec![
                    node(
                        Some("alice"),
                        "![bar](https://x.io/a1.png) catppuccin light https://github.com/alice/dotfiles",
                    ),
                    node(Some("bob"), "> ![bar](https://x.io/a1.png)\nso nice"),
                    node(None, "![ghost](https://x.io/ghost.png)"),
                ],
                true,
                Some("c1"),
            ),
        ),
        (
            "c1",
            page(
                vec![
                    node(
                        Some("alice"),
                        r#"<img src="https://x.io/a2.gif"> and <img src="https://x.io/a3.jpg">"#,
                    ),
                    node(Some("carol"), "![](https://x.io/broken.png)"),
                    node(Some("dave"), "what font is that?"),
                ],
                false,
                None,
            ),
        ),
    ])
}

fn images() -> FakeImages {
    FakeImages::new(&[
        ("https://x.io/a1.png", b"png-1"),
        ("https://x.io/a2.gif", b"gif-2"),
        ("https://x.io/a3.jpg", b"jpg-3"),
    ])
}

#[tokio::test]
async fn test_scrape_writes_artifacts() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);
    let api = thread();
    let images = images();

    let report = run_scrape(&config, &api, &images, &NoProgress).await.unwrap();
    assert_eq!(report.processed, vec!["alice-1", "alice-2"]);
    assert_eq!(report.skipped, vec!["carol-1"]);
    assert_eq!(report.image_failures.len(), 1);
    assert_eq!(report.image_failures[0].url, "https://x.io/broken.png");

    let index: ShowcaseIndex = read(config.output.index_path());
    let ids: Vec<&str> = index.showcases.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["alice-1", "alice-2"]);

    let first: ShowcaseDetail = read(config.output.showcases_dir().join("alice-1.json"));
    assert_eq!(first.title, "alice's Setup (Catppuccin)");
    assert_eq!(first.screenshots, vec!["/screenshots/alice-1/main.png"]);
    assert_eq!(first.thumbnail, "/screenshots/alice-1/main.png");
    assert_eq!(first.github_url, "https://github.com/alice/dotfiles");
    assert_eq!(first.mode.to_string(), "light");
    assert_eq!(first.dependencies, vec!["sketchybar"]);
    assert!(first.dotfiles.is_empty());
    assert_eq!(first.created_at.to_string(), "2024-01-02");

    let second: ShowcaseDetail = read(config.output.showcases_dir().join("alice-2.json"));
    assert_eq!(
        second.screenshots,
        vec![
            "/screenshots/alice-2/main.gif",
            "/screenshots/alice-2/screenshot-1.jpg"
        ]
    );
    assert_eq!(second.github_url, "https://github.com/alice");
    assert_eq!(second.tags, vec!["custom"]);

    let shot = tmp.path().join("static/screenshots/alice-1/main.png");
    assert_eq!(std::fs::read(shot).unwrap(), b"png-1");

    assert!(tmp.path().join("static/screenshots/carol-1").is_dir());
    assert!(!config.output.showcases_dir().join("carol-1.json").exists());

    let tags: TagsFile = read(config.output.tags_path());
    let tag_ids: Vec<&str> = tags.tags.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(tag_ids, vec!["catppuccin", "custom"]);
    assert!(tags.tags.iter().all(|t| t.count == 1 && t.label == t.id));
}

#[tokio::test]
async fn test_scrape_json_uses_camel_case() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);

    run_scrape(&config, &thread(), &images(), &NoProgress)
        .await
        .unwrap();

    let raw: Value = read(config.output.showcases_dir().join("alice-1.json"));
    for key in ["authorUrl", "githubUrl", "createdAt", "imageUrls", "dotfiles"] {
        assert!(raw.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(raw["dotfiles"], json!({}));
}

#[tokio::test]
async fn test_rerun_skips_existing_screenshots() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);
    let images = images();

    run_scrape(&config, &thread(), &images, &NoProgress)
        .await
        .unwrap();
    assert_eq!(images.call_count(), 4);

    let report = run_scrape(&config, &thread(), &images, &NoProgress)
        .await
        .unwrap();
    // Only the broken image is attempted again.
    assert_eq!(images.call_count(), 5);
    assert_eq!(report.processed, vec!["alice-1", "alice-2"]);
}
