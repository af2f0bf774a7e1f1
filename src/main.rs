//! # Showcase CLI (`showcase`)
//!
//! Builds and inspects the SketchyBar showcase gallery data.
//!
//! ## Usage
//!
//! ```bash
//! showcase --config ./config/showcase.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `showcase scrape` | Scrape the discussion and write index, tags, and showcase files |
//! | `showcase dotfiles` | Fetch dotfiles for showcases that link a repository |
//! | `showcase get <id>` | Print one showcase with its neighbours in the index |
//! | `showcase tags` | Print tag counts |
//! | `showcase likes toggle <id>` | Like or unlike a showcase |
//! | `showcase likes list` | List liked showcases |
//! | `showcase likes clear` | Remove all likes |
//!
//! The config file is optional; without it the built-in defaults scrape
//! `FelixKratz/SketchyBar` discussion #47 into `./static`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use showcase_harvest::catalog;
use showcase_harvest::config;
use showcase_harvest::dotfiles;
use showcase_harvest::download::HttpImageSource;
use showcase_harvest::github::GhCli;
use showcase_harvest::likes;
use showcase_harvest::progress::ProgressMode;
use showcase_harvest::scrape;

/// Showcase CLI: builds the data for the SketchyBar showcase gallery.
#[derive(Parser)]
#[command(
    name = "showcase",
    about = "Scrape SketchyBar setups from GitHub and build the showcase gallery data",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/showcase.toml`. When the file does not exist
    /// the built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/showcase.toml")]
    config: PathBuf,

    /// Progress output: human lines on stdout, JSON lines on stderr, or off.
    #[arg(long, global = true, value_enum, default_value = "human")]
    progress: ProgressMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the discussion thread and write the gallery artifacts.
    ///
    /// Fetches every comment, keeps those with screenshots, downloads the
    /// screenshots, and writes `index.json`, `tags.json`, and one file per
    /// showcase. Already-downloaded screenshots are not fetched again.
    Scrape,

    /// Fetch dotfiles from the repositories linked by each showcase.
    ///
    /// Showcases that already have dotfiles are skipped, so the command is
    /// safe to re-run.
    Dotfiles,

    /// Print a showcase by id.
    Get {
        /// Showcase id, e.g. `alice-1`.
        id: String,
    },

    /// Print tag counts.
    Tags,

    /// Manage locally liked showcases.
    Likes {
        #[command(subcommand)]
        action: LikesAction,
    },
}

#[derive(Subcommand)]
enum LikesAction {
    /// Like a showcase, or unlike it if it is already liked.
    Toggle {
        /// Showcase id.
        id: String,
    },
    /// List liked showcases in the order they were liked.
    List,
    /// Remove all likes.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;
    let progress = cli.progress.reporter();

    match cli.command {
        Commands::Scrape => {
            let api = GhCli::new();
            let images = HttpImageSource::new(&cfg.download)?;
            scrape::run_scrape(&cfg, &api, &images, progress.as_ref()).await?;
        }
        Commands::Dotfiles => {
            let api = GhCli::new();
            dotfiles::run_dotfiles(&cfg, &api, progress.as_ref()).await?;
        }
        Commands::Get { id } => {
            catalog::run_get(&cfg, &id)?;
        }
        Commands::Tags => {
            catalog::run_tags(&cfg)?;
        }
        Commands::Likes { action } => match action {
            LikesAction::Toggle { id } => likes::run_toggle(&cfg, &id)?,
            LikesAction::List => likes::run_list(&cfg)?,
            LikesAction::Clear => likes::run_clear(&cfg)?,
        },
    }

    Ok(())
}
