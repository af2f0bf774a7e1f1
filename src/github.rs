//! Access to the GitHub GraphQL and REST APIs.
//!
//! All calls go through the [`GitHubApi`] trait so the pipeline can be
//! driven by in-memory fakes in tests. The production implementation,
//! [`GhCli`], shells out to the `gh` CLI, which carries whatever
//! credentials the user has configured with `gh auth login`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::process::Command;

#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Run a GraphQL query and return the full response document
    /// (including the top-level `data` key).
    async fn graphql(&self, query: &str, variables: &Map<String, Value>) -> Result<Value>;

    /// `GET` a REST endpoint relative to `https://api.github.com/`,
    /// e.g. `repos/owner/name/contents/path?ref=main`.
    async fn rest(&self, endpoint: &str) -> Result<Value>;
}

/// [`GitHubApi`] backed by `gh api`.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
}

impl GhCli {
    pub fn new() -> Self {
        Self {
            program: "gh".to_string(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<Value> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .with_context(|| "Failed to execute 'gh api'. Is the GitHub CLI installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("gh api failed: {}", stderr.trim());
        }

        serde_json::from_slice(&output.stdout).with_context(|| "gh api returned invalid JSON")
    }
}

impl Default for GhCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitHubApi for GhCli {
    async fn graphql(&self, query: &str, variables: &Map<String, Value>) -> Result<Value> {
        let mut args = vec![
            "api".to_string(),
            "graphql".to_string(),
            "-f".to_string(),
            format!("query={}", query),
        ];
        args.extend(variable_args(variables));
        self.run(&args).await
    }

    async fn rest(&self, endpoint: &str) -> Result<Value> {
        self.run(&["api".to_string(), endpoint.to_string()]).await
    }
}

/// Strings are passed raw with `-f`; numbers and booleans are typed with `-F`.
/// Nulls are omitted so the variable takes its GraphQL default.
fn variable_args(variables: &Map<String, Value>) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in variables {
        match value {
            Value::Null => {}
            Value::String(s) => {
                args.push("-f".to_string());
                args.push(format!("{}={}", key, s));
            }
            other => {
                args.push("-F".to_string());
                args.push(format!("{}={}", key, other));
            }
        }
    }
    args
}

/// REST path for a contents listing or file. An empty `path` addresses the
/// repository root.
pub fn contents_endpoint(owner: &str, repo: &str, path: &str, branch: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("repos/{}/{}/contents?ref={}", owner, repo, branch)
    } else {
        format!("repos/{}/{}/contents/{}?ref={}", owner, repo, path, branch)
    }
}

pub fn repo_endpoint(owner: &str, repo: &str) -> String {
    format!("repos/{}/{}", owner, repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variables_are_typed() {
        let mut vars = Map::new();
        vars.insert("owner".into(), json!("FelixKratz"));
        vars.insert("number".into(), json!(47));
        vars.insert("cursor".into(), Value::Null);
        let args = variable_args(&vars);
        assert!(args.windows(2).any(|w| w == ["-f", "owner=FelixKratz"]));
        assert!(args.windows(2).any(|w| w == ["-F", "number=47"]));
        assert!(!args.iter().any(|a| a.starts_with("cursor")));
    }

    #[test]
    fn contents_paths() {
        assert_eq!(
            contents_endpoint("a", "b", "", "main"),
            "repos/a/b/contents?ref=main"
        );
        assert_eq!(
            contents_endpoint("a", "b", ".config/sketchybar", "dev"),
            "repos/a/b/contents/.config/sketchybar?ref=dev"
        );
    }
}
