use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-transcript-mcp",
    about = "MCP server that fetches YouTube video transcripts",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Address to listen on [default: 0.0.0.0]
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to listen on [default: 8000]
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Config file (default: ~/.config/yt-transcript-mcp/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Per-request timeout for YouTube calls, in seconds [default: 30]
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the get_transcript tool over HTTP (default)
    Serve,

    /// Fetch one transcript and print the tool's JSON result
    Get {
        /// YouTube video URL or video ID
        video: String,

        /// Comma-separated language codes in priority order
        #[arg(short, long)]
        languages: Option<String>,

        /// Omit [MM:SS] prefixes
        #[arg(long)]
        no_timestamps: bool,
    },
}
