//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Directory name under the config root.
const APP_DIR: &str = "torrent-downloader";

/// File configuration for downloader defaults. Every field is optional; CLI
/// flags override whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default directory torrent files are saved to.
    pub download_dir: Option<PathBuf>,
    /// Tracker site root.
    pub base_url: Option<String>,
    /// Raw `Cookie` header value.
    pub cookie: Option<String>,
    /// File holding the raw `Cookie` header value.
    pub cookie_file: Option<PathBuf>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Attribute name identifying the download anchor.
    pub link_marker_attribute: Option<String>,
    /// Attribute value identifying the download anchor.
    pub link_marker_value: Option<String>,
    /// File-type suffix handled by filename cleanup.
    pub filename_suffix: Option<String>,
    /// Substrings removed from file names, replacing the built-in list.
    pub noise_substrings: Option<Vec<String>>,
    /// Whole-word tokens removed from file names, replacing the built-in list.
    pub quality_tokens: Option<Vec<String>>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("request_timeout_secs", self.request_timeout_secs)?;

        if self.cookie.is_some() && self.cookie_file.is_some() {
            bail!("Config sets both `cookie` and `cookie_file`; keep only one");
        }
        if let Some(attribute) = &self.link_marker_attribute
            && attribute.trim().is_empty()
        {
            bail!("Invalid config value for `link_marker_attribute`: must not be empty");
        }
        if let Some(suffix) = &self.filename_suffix
            && suffix.is_empty()
        {
            bail!("Invalid config value for `filename_suffix`: must not be empty");
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/torrent-downloader/config.toml`
/// 2. `$HOME/.config/torrent-downloader/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR).join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Loads config from an explicit path; a missing file is an error.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let string_value = || {
            parse_string_literal(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };
        let integer_value = || {
            parse_integer_u64(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };
        let array_value = || {
            parse_string_array(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };

        match key {
            "download_dir" => cfg.download_dir = Some(PathBuf::from(string_value()?)),
            "base_url" => cfg.base_url = Some(string_value()?),
            "cookie" => cfg.cookie = Some(string_value()?),
            "cookie_file" => cfg.cookie_file = Some(PathBuf::from(string_value()?)),
            "connect_timeout_secs" => cfg.connect_timeout_secs = Some(integer_value()?),
            "request_timeout_secs" => cfg.request_timeout_secs = Some(integer_value()?),
            "link_marker_attribute" => cfg.link_marker_attribute = Some(string_value()?),
            "link_marker_value" => cfg.link_marker_value = Some(string_value()?),
            "filename_suffix" => cfg.filename_suffix = Some(string_value()?),
            "noise_substrings" => cfg.noise_substrings = Some(array_value()?),
            "quality_tokens" => cfg.quality_tokens = Some(array_value()?),
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    let raw_value = raw_value.trim();
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    let inner = &raw_value[1..raw_value.len() - 1];
    if inner.contains('"') {
        bail!("Unexpected quote inside string");
    }
    Ok(inner.to_string())
}

/// Parses a single-line array of double-quoted strings: `["a", "b"]`.
/// A trailing comma is allowed.
fn parse_string_array(raw_value: &str) -> Result<Vec<String>> {
    let Some(inner) = raw_value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        bail!("Expected array of double-quoted strings");
    };

    let mut items = Vec::new();
    let mut in_string = false;
    let mut start = 0;
    for (index, ch) in inner.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            ',' if !in_string => {
                items.push(&inner[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if in_string {
        bail!("Unterminated string in array");
    }
    let tail = &inner[start..];
    if !tail.trim().is_empty() {
        items.push(tail);
    }

    items.into_iter().map(parse_string_literal).collect()
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
