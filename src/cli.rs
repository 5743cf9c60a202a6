//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0 = all torrents saved
  1 = partial success (some page URLs failed)
  2 = complete failure or fatal error";

/// Download torrent files from tracker detail pages.
///
/// Each page URL is resolved to its download link with the logged-in
/// session cookie, and the torrent is saved under a cleaned-up name.
#[derive(Parser, Debug)]
#[command(name = "torrent-downloader")]
#[command(author, version, about, after_help = EXIT_CODES_HELP)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Torrent page URLs (read from stdin, one per line, when omitted)
    #[arg(value_name = "PAGE_URL")]
    pub urls: Vec<String>,

    /// Directory to save torrent files into (created if missing)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Tracker site root
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Raw Cookie header of a logged-in session
    #[arg(long, value_name = "COOKIE", conflicts_with = "cookie_file")]
    pub cookie: Option<String>,

    /// Read the Cookie header from a file ('-' for stdin)
    #[arg(long, value_name = "PATH")]
    pub cookie_file: Option<PathBuf>,

    /// Whole-request timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the `;`-separated authentication parameters of a feed URL
    FeedParams {
        /// Feed URL, e.g. https://tracker.example/t.rss?7;u=1;tp=abc
        url: String,
    },
}
