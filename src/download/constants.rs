//! Constants for the download module (timeouts, filename rules).

/// Default HTTP connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default whole-request timeout (2 minutes; torrent files are small).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Extension every saved torrent file carries.
pub const TORRENT_SUFFIX: &str = ".torrent";

/// Release-group, audio, and video tags the tracker appends to names.
///
/// Removed by exact substring replacement, in this order. Each tag appears
/// with the separator the tracker uses in front of it.
pub const DEFAULT_NOISE_SUBSTRINGS: &[&str] = &[
    ".WEB-DL",
    " WEB-DL",
    ".DDP5.1",
    ".DD 5.1",
    ".DD5.1",
    ".DD 2.0",
    ".DD2.0",
    " DD 5 1",
    " DD 2 0",
    ".AAC2.0",
    ".H.264",
    ".H.265",
    " H 264",
    " H 265",
    "-playWEB",
    "-NF",
    " NF",
    ".1080p",
    " 1080p",
];

/// Quality and encoding tokens removed wherever they stand as whole words.
pub const DEFAULT_QUALITY_TOKENS: &[&str] = &[
    "1080p", "720p", "2160p", "x264", "x265", "BluRay", "HDRip", "WEBRip",
];
