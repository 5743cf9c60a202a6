//! CLI entry point for the torrent downloader.

use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use torrent_downloader_core::{
    DEFAULT_BASE_URL, DownloaderSettings, HttpTimeouts, LinkMarker, NormalizerRules,
    TorrentDownloader, parse_feed_auth_params,
};
use tracing::{debug, error, info};

mod app_config;
mod cli;

use app_config::FileConfig;
use cli::{Args, Command};

/// Process outcome, mapped to the documented exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Partial,
    Failure,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(default_log_level(&args));
    debug!(
        urls = args.urls.len(),
        command = ?args.command,
        download_dir = ?args.download_dir,
        "CLI arguments parsed"
    );

    match run(args).await {
        Ok(exit) => ExitCode::from(exit.code()),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(ProcessExit::Failure.code())
        }
    }
}

/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > default (info)
fn default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

async fn run(args: Args) -> Result<ProcessExit> {
    if let Some(Command::FeedParams { url }) = &args.command {
        print_feed_params(url);
        return Ok(ProcessExit::Success);
    }

    let file_config = match &args.config {
        Some(path) => app_config::load_file_config(path)?,
        None => {
            let loaded = app_config::load_default_file_config()?;
            if let Some(path) = loaded.path.as_deref().filter(|_| loaded.config.is_some()) {
                debug!(path = %path.display(), "loaded config file");
            }
            loaded.config.unwrap_or_default()
        }
    };

    let cookie_reads_stdin = cookie_source_is_stdin(&args, &file_config);
    let urls = if !args.urls.is_empty() {
        args.urls.clone()
    } else if !cookie_reads_stdin && !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read page URLs from stdin")?;
        parse_url_lines(&buffer)
    } else {
        Vec::new()
    };

    if urls.is_empty() {
        info!("No input provided. Pass torrent page URLs as arguments or via stdin.");
        info!("Example: torrent-downloader --cookie 'uid=1; pass=abc' https://www.torrentday.com/t/12345");
        return Ok(ProcessExit::Success);
    }

    let settings = resolve_settings(&args, &file_config)?;
    let downloader = TorrentDownloader::new(settings)?;
    info!(
        urls = urls.len(),
        dir = %downloader.download_dir().display(),
        "Torrent downloader starting"
    );

    let mut completed = 0usize;
    let mut failed = 0usize;
    for url in &urls {
        match downloader.download_torrent(url).await {
            Ok(saved) => {
                println!("Saving as: {}", saved.filename);
                completed += 1;
            }
            Err(err) => {
                error!(url = %url, error = %err, "Torrent download failed");
                failed += 1;
            }
        }
    }

    info!(completed, failed, total = urls.len(), "Download complete");
    Ok(determine_exit_outcome(completed, failed))
}

fn determine_exit_outcome(completed: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if completed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

fn print_feed_params(feed_url: &str) {
    let params: BTreeMap<_, _> = parse_feed_auth_params(feed_url).into_iter().collect();
    if params.is_empty() {
        info!("Feed URL carries no query parameters");
    }
    for (key, value) in params {
        println!("{key}={value}");
    }
}

/// Page URLs from stdin: one per line, blank lines and `#` comments skipped.
fn parse_url_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn cookie_source_is_stdin(args: &Args, file_config: &FileConfig) -> bool {
    let from_file = if args.cookie.is_some() {
        None
    } else {
        args.cookie_file.as_deref().or_else(|| {
            if file_config.cookie.is_none() {
                file_config.cookie_file.as_deref()
            } else {
                None
            }
        })
    };
    from_file.is_some_and(|path| path == Path::new("-"))
}

/// Merges CLI flags over file config over built-in defaults.
fn resolve_settings(args: &Args, file_config: &FileConfig) -> Result<DownloaderSettings> {
    let cookie = resolve_cookie(args, file_config)?;

    let download_dir = args
        .download_dir
        .clone()
        .or_else(|| file_config.download_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let base_url = args
        .base_url
        .clone()
        .or_else(|| file_config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let defaults = HttpTimeouts::default();
    let timeouts = HttpTimeouts {
        connect_secs: file_config
            .connect_timeout_secs
            .unwrap_or(defaults.connect_secs),
        request_secs: args
            .timeout
            .or(file_config.request_timeout_secs)
            .unwrap_or(defaults.request_secs),
    };

    let default_marker = LinkMarker::default();
    let marker = LinkMarker {
        attribute: file_config
            .link_marker_attribute
            .clone()
            .unwrap_or(default_marker.attribute),
        value: file_config
            .link_marker_value
            .clone()
            .unwrap_or(default_marker.value),
    };

    let default_rules = NormalizerRules::default();
    let rules = NormalizerRules {
        suffix: file_config
            .filename_suffix
            .clone()
            .unwrap_or(default_rules.suffix),
        noise_substrings: file_config
            .noise_substrings
            .clone()
            .unwrap_or(default_rules.noise_substrings),
        quality_tokens: file_config
            .quality_tokens
            .clone()
            .unwrap_or(default_rules.quality_tokens),
    };

    Ok(DownloaderSettings {
        download_dir,
        base_url,
        cookie,
        timeouts,
        marker,
        rules,
    })
}

fn resolve_cookie(args: &Args, file_config: &FileConfig) -> Result<String> {
    if let Some(cookie) = &args.cookie {
        return Ok(cookie.trim().to_string());
    }
    if let Some(path) = &args.cookie_file {
        return read_cookie_file(path);
    }
    if let Some(cookie) = &file_config.cookie {
        return Ok(cookie.trim().to_string());
    }
    if let Some(path) = &file_config.cookie_file {
        return read_cookie_file(path);
    }
    bail!(
        "No session cookie configured\n  Suggestion: pass --cookie 'uid=...; pass=...' or --cookie-file <path>, or set `cookie` in the config file"
    );
}

fn read_cookie_file(path: &Path) -> Result<String> {
    let raw = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read cookie from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cookie file '{}'", path.display()))?
    };

    let cookie = raw.trim();
    if cookie.is_empty() {
        bail!("Cookie file '{}' is empty", path.display());
    }
    Ok(cookie.to_string())
}
