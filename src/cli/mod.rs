pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "galley")]
#[command(about = "Content aggregation and feed engine for an API-backed site", long_about = None)]
pub struct Cli {
    /// Path to the site configuration file
    #[arg(short, long, default_value = "galley.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all posts and rebuild the index artifacts and feed
    Build,
    /// Fetch and print a single post
    Post {
        /// Identifier of the post
        id: String,
    },
    /// Regenerate only the feed artifact
    Feed,
}
