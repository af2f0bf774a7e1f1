//! Pipeline progress reporting.
//!
//! Both pipelines emit [`ProgressEvent`]s as they work so users see what is
//! being fetched, downloaded, or skipped. Human progress goes to stdout next
//! to the final summary; JSON progress is one object per line on **stderr**
//! so it can be collected separately.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// A page of discussion comments was fetched.
    Page { page: u32, fetched: usize, total: usize },
    /// An image was written to disk.
    Downloaded { id: String, file: String },
    /// An image could not be fetched. The showcase continues without it.
    DownloadFailed { url: String, error: String },
    /// A showcase was dropped or left untouched.
    Skipped { id: String, reason: String },
    /// The enricher started looking at a repository.
    Checking { owner: String, repo: String },
    /// A configuration directory was located.
    Found { id: String, path: String },
    /// Dotfiles were written into a showcase.
    Enriched { id: String, files: usize },
    /// A showcase failed with an error.
    Failed { id: String, error: String },
}

/// Receives progress events from the pipelines.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress lines on stdout.
pub struct HumanProgress;

impl ProgressReporter for HumanProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Page {
                page,
                fetched,
                total,
            } => format!(
                "  Page {}: fetched {} comments (total: {})\n",
                page,
                format_number(*fetched as u64),
                format_number(*total as u64)
            ),
            ProgressEvent::Downloaded { id, file } => format!("  Downloaded: {}/{}\n", id, file),
            ProgressEvent::DownloadFailed { url, error } => {
                format!("  Failed to download {}: {}\n", url, error)
            }
            ProgressEvent::Skipped { id, reason } => format!("  Skipping {} - {}\n", id, reason),
            ProgressEvent::Checking { owner, repo } => format!("  Checking {}/{}...\n", owner, repo),
            ProgressEvent::Found { path, .. } => format!("    Found config at: {}\n", path),
            ProgressEvent::Enriched { files, .. } => format!("    ✓ Downloaded {} files\n", files),
            ProgressEvent::Failed { id, error } => format!("    ✗ Error in {}: {}\n", id, error),
        };
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Page {
                page,
                fetched,
                total,
            } => serde_json::json!({
                "event": "page",
                "page": page,
                "fetched": fetched,
                "total": total
            }),
            ProgressEvent::Downloaded { id, file } => serde_json::json!({
                "event": "downloaded",
                "id": id,
                "file": file
            }),
            ProgressEvent::DownloadFailed { url, error } => serde_json::json!({
                "event": "download_failed",
                "url": url,
                "error": error
            }),
            ProgressEvent::Skipped { id, reason } => serde_json::json!({
                "event": "skipped",
                "id": id,
                "reason": reason
            }),
            ProgressEvent::Checking { owner, repo } => serde_json::json!({
                "event": "checking",
                "owner": owner,
                "repo": repo
            }),
            ProgressEvent::Found { id, path } => serde_json::json!({
                "event": "found",
                "id": id,
                "path": path
            }),
            ProgressEvent::Enriched { id, files } => serde_json::json!({
                "event": "enriched",
                "id": id,
                "files": files
            }),
            ProgressEvent::Failed { id, error } => serde_json::json!({
                "event": "failed",
                "id": id,
                "error": error
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stdout), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(HumanProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
