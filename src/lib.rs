//! # Showcase Harvest
//!
//! Builds the data behind the SketchyBar showcase gallery.
//!
//! Community setups are posted as comments on a single GitHub Discussion.
//! This crate pages through that thread, pulls screenshots and dotfiles
//! links out of each comment, drops quoted duplicates, downloads the
//! screenshots, and writes the JSON artifacts the static front-end reads.
//! A second pass copies the linked SketchyBar config files into each
//! showcase record.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────┐   ┌───────────┐   ┌──────────────┐
//! │ Discussion │──▶│  Extract  │──▶│  Dedup +  │──▶│ Materialize  │
//! │  (GraphQL) │   │ per body  │   │  ids      │   │ images+JSON  │
//! └────────────┘   └───────────┘   └───────────┘   └──────┬───────┘
//!                                                         │
//!                  ┌────────────────┐                     ▼
//!                  │ Dotfiles (REST)│──────────▶ showcases/<id>.json
//!                  └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! showcase scrape       # fetch the thread and write static/data/*
//! showcase dotfiles     # fill in dotfiles for linked repositories
//! showcase get alice-1  # inspect one showcase
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Comment, entry, and artifact types |
//! | [`github`] | GitHub API seam (`gh` CLI) |
//! | [`discussion`] | Paged comment fetcher |
//! | [`extract`] | Image/link/mode/tag extraction |
//! | [`showcase`] | Filtering, deduplication, ids |
//! | [`download`] | Screenshot HTTP client |
//! | [`materialize`] | Artifact writer |
//! | [`scrape`] | `scrape` pipeline |
//! | [`dotfiles`] | Dotfiles enricher |
//! | [`catalog`] | Reading generated data |
//! | [`likes`] | Local liked-showcases set |
//! | [`progress`] | Progress reporting |

pub mod catalog;
pub mod config;
pub mod discussion;
pub mod dotfiles;
pub mod download;
pub mod extract;
pub mod github;
pub mod likes;
pub mod materialize;
pub mod models;
pub mod progress;
pub mod scrape;
pub mod showcase;
