//! The `showcase scrape` pipeline: fetch → extract → dedup → materialize.

use anyhow::Result;

use crate::config::Config;
use crate::discussion::fetch_all_comments;
use crate::download::ImageSource;
use crate::github::GitHubApi;
use crate::materialize::{materialize, MaterializeReport};
use crate::progress::ProgressReporter;
use crate::showcase::build_entries;

pub async fn run_scrape(
    config: &Config,
    api: &dyn GitHubApi,
    images: &dyn ImageSource,
    progress: &dyn ProgressReporter,
) -> Result<MaterializeReport> {
    let d = &config.discussion;
    println!(
        "Fetching comments from {}/{} discussion #{}...",
        d.owner, d.repo, d.number
    );

    let comments = fetch_all_comments(api, d, progress).await?;
    println!("\nTotal comments fetched: {}", comments.len());

    let entries = build_entries(&comments);
    println!("Found {} showcases with images", entries.len());

    println!("\nProcessing {} showcases...", entries.len());
    let report = materialize(&entries, images, &config.output, progress).await?;

    println!(
        "\nDone! Processed {} showcases, skipped {}",
        report.processed.len(),
        report.skipped.len()
    );
    if !report.image_failures.is_empty() {
        println!("Failed images: {}", report.image_failures.len());
    }
    println!("Index: {}", config.output.index_path().display());
    println!("Tags: {}", config.output.tags_path().display());

    Ok(report)
}
