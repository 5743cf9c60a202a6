//! Torrent filename normalization and filesystem-safe path resolution.
//!
//! The tracker names its torrents after the release, percent-encoded and
//! padded with source, codec, and group tags. [`FilenameNormalizer`] turns
//! that into a stable on-disk name. The tag lists are data
//! ([`NormalizerRules`]) so they can be changed from configuration.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use super::constants::{DEFAULT_NOISE_SUBSTRINGS, DEFAULT_QUALITY_TOKENS, TORRENT_SUFFIX};

/// Suffix and tag lists driving [`FilenameNormalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerRules {
    /// File-type suffix stripped before cleanup and re-appended afterwards.
    pub suffix: String,
    /// Substrings removed verbatim, in list order.
    pub noise_substrings: Vec<String>,
    /// Tokens removed wherever they appear as whole words (case-sensitive),
    /// together with one separator directly in front of them. An edge made
    /// of punctuation (`[HDR]`, `H.264+`) matches without a word boundary.
    pub quality_tokens: Vec<String>,
}

impl Default for NormalizerRules {
    fn default() -> Self {
        Self {
            suffix: TORRENT_SUFFIX.to_string(),
            noise_substrings: DEFAULT_NOISE_SUBSTRINGS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            quality_tokens: DEFAULT_QUALITY_TOKENS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Cleans raw torrent filenames into canonical names.
///
/// Normalization is pure and idempotent: `normalize(normalize(x)) ==
/// normalize(x)` for any name that does not itself contain percent-escapes.
#[derive(Debug, Clone)]
pub struct FilenameNormalizer {
    rules: NormalizerRules,
    quality_pattern: Option<Regex>,
}

static DEFAULT_NORMALIZER: LazyLock<FilenameNormalizer> =
    LazyLock::new(FilenameNormalizer::default);

impl Default for FilenameNormalizer {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        // Built-in token list, safe to panic
        Self::new(NormalizerRules::default()).expect("built-in quality token pattern is valid")
    }
}

impl FilenameNormalizer {
    /// Builds a normalizer, compiling the quality-token pattern.
    ///
    /// Empty entries in either list are ignored.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the token alternation exceeds the regex
    /// size limit.
    pub fn new(mut rules: NormalizerRules) -> Result<Self, regex::Error> {
        rules.noise_substrings.retain(|s| !s.is_empty());
        rules.quality_tokens.retain(|s| !s.is_empty());

        let quality_pattern = if rules.quality_tokens.is_empty() {
            None
        } else {
            let alternation = rules
                .quality_tokens
                .iter()
                .map(String::as_str)
                .map(token_pattern)
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"[\s._-]?(?:{alternation})"))?)
        };

        Ok(Self {
            rules,
            quality_pattern,
        })
    }

    /// Returns the rules this normalizer applies.
    #[must_use]
    pub fn rules(&self) -> &NormalizerRules {
        &self.rules
    }

    /// Normalizes a raw (percent-encoded) filename.
    ///
    /// 1. Percent-decode; on invalid UTF-8 keep the raw string.
    /// 2. Strip the suffix once.
    /// 3. Remove noise substrings.
    /// 4. Remove quality tokens.
    /// 5. Collapse whitespace runs and trim.
    ///    Steps 3-5 repeat until nothing changes.
    /// 6. Re-append the suffix.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let decoded = urlencoding::decode(raw).unwrap_or_else(|e| {
            debug!(raw = %raw, error = %e, "percent-decoding failed, using raw filename");
            raw.into()
        });

        let suffix = self.rules.suffix.as_str();
        let decoded: &str = &decoded;
        let mut current = decoded.strip_suffix(suffix).unwrap_or(decoded).to_string();

        loop {
            let next = self.clean_pass(&current);
            if next == current {
                break;
            }
            current = next;
        }

        current.push_str(suffix);
        current
    }

    fn clean_pass(&self, name: &str) -> String {
        let mut cleaned = name.to_string();
        for noise in &self.rules.noise_substrings {
            if cleaned.contains(noise.as_str()) {
                cleaned = cleaned.replace(noise.as_str(), "");
            }
        }
        if let Some(pattern) = &self.quality_pattern {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Escaped token with a word boundary on each edge that is a word character.
///
/// `\b` next to `[` or `+` would demand a word character on the other side,
/// so tokens like `[HDR]` only get boundaries where they can hold.
fn token_pattern(token: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if token.chars().next().is_some_and(is_word) { r"\b" } else { "" };
    let trail = if token.chars().next_back().is_some_and(is_word) { r"\b" } else { "" };
    format!("{lead}{}{trail}", regex::escape(token))
}

/// Normalizes a raw filename with the built-in rules.
#[must_use]
pub fn normalize_filename(raw: &str) -> String {
    DEFAULT_NORMALIZER.normalize(raw)
}

/// Raw filename of a download link: its last path segment, still encoded.
///
/// Query string and fragment are not part of the name.
pub(crate) fn raw_filename_from_url(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("")
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// Joins a sanitized `filename` onto `dir`; the result never leaves `dir`.
pub(crate) fn destination_path(dir: &Path, filename: &str) -> PathBuf {
    dir.join(sanitize_filename(filename))
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
