//! Title normalization - turns noisy torrent listing titles into comparable keys.
//!
//! Indexer listings carry release tags, site branding, spam suffixes and
//! quality tokens that have nothing to do with the scene itself. This module
//! strips that noise so two listings of the same scene compare equal.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Phrases that mark the start of a spam suffix. Everything from the first
/// occurrence onward is dropped.
const SPAM_MARKERS: &[&str] = &[
    "watch and download",
    "watch online",
    "watch free",
    "download for free",
    "free download",
    "click here",
    "join now",
];

/// Site brand names stripped when they appear as a title prefix.
const SITE_PREFIXES: &[&str] = &[
    "onlyfans",
    "pornhub",
    "modelhub",
    "manyvids",
    "clips4sale",
    "fansly",
];

/// Generic hype keywords that carry no identifying information.
static HYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(exclusive|premium|new release|full video|full scene|hd porn|must watch|uncut)\b",
    )
    .unwrap()
});

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(https?://\S+|www\.\S+|t\.me/\S+|@[a-z0-9_]{3,}|\b[a-z0-9-]+\.(com|net|org|xxx|info|biz|to|cc|tv|me)\b)",
    )
    .unwrap()
});

/// Embedded dates in any of the supported listing formats.
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d{4}[-._ ]\d{1,2}[-._ ]\d{1,2}|\d{1,2}[-._ ]\d{1,2}[-._ ]\d{4}|\d{8}|\d{2}[-._]\d{2}[-._]\d{2})\b",
    )
    .unwrap()
});

/// Quality, source, codec, audio and container tokens.
static QUALITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(2160p|1080p|1080i|720p|480p|576p|4k|uhd|hdr10|hdr|sd|bluray|blu-ray|bdrip|brrip|remux|web-?dl|web-?rip|hdtv|dvdrip|dvd-?rip|dvd|x26[45]|h\.?26[45]|hevc|avc|av1|xvid|divx|aac|ac3|eac3|dts|atmos|truehd|dd5\.?1|5\.1|7\.1|mp3|mp4|mkv|avi|wmv|mov)\b",
    )
    .unwrap()
});

/// Bracketed or parenthesized release-group tags.
static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\[[^\]]*\]|\([^)]*\)|\{[^}]*\})").unwrap());

/// Trailing release group attached with a dash, e.g. `-GRP`.
static TRAILING_GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-[A-Za-z0-9]{2,20}\s*$").unwrap());

/// File size tokens like `1.37 GB` or `700MB`.
static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\d+(\.\d+)?\s?(gib|mib|kib|gb|mb|kb)\b").unwrap());

/// Episode numbering tokens.
static EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(s\d{1,2}e\d{1,3}|e\d{2,3}|ep\.?\s?\d{1,3}|episode\s?\d{1,3}|part\s?\d{1,2})\b").unwrap()
});

/// Release tag keywords.
static RELEASE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(proper|repack|rerip|internal|limited|remastered|readnfo|nfofix)\b").unwrap()
});

static NON_ALNUM_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static PUNCT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_.,:;!?/\\|+*&#~\s]{2,}").unwrap());

/// Lowercase, collapse non-alphanumeric runs to single spaces, trim.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(title: &str) -> String {
    let lower = title.to_lowercase();
    let collapsed = NON_ALNUM_RUN_RE.replace_all(&lower, " ");
    collapsed.trim().to_string()
}

/// Strip noise from a raw listing title, leaving the core scene title.
///
/// Removal happens in a fixed sequence: spam suffixes, URLs and domains,
/// site-brand prefixes, hype keywords, embedded dates, quality tokens,
/// bracketed group tags, size tokens, episode tokens, release tags. If
/// cleaning leaves nothing, the original title is returned unchanged.
pub fn extract_core_title(title: &str) -> String {
    let mut cleaned = title.to_string();

    // Spam suffix: cut at the first marker phrase.
    let lower = cleaned.to_lowercase();
    if let Some(pos) = SPAM_MARKERS.iter().filter_map(|m| lower.find(m)).min() {
        cleaned.truncate(pos);
    }

    cleaned = URL_RE.replace_all(&cleaned, " ").into_owned();
    cleaned = strip_site_prefix(&cleaned);
    cleaned = HYPE_RE.replace_all(&cleaned, " ").into_owned();
    cleaned = DATE_RE.replace_all(&cleaned, " ").into_owned();
    cleaned = QUALITY_RE.replace_all(&cleaned, " ").into_owned();
    cleaned = BRACKET_RE.replace_all(&cleaned, " ").into_owned();
    cleaned = SIZE_RE.replace_all(&cleaned, " ").into_owned();
    cleaned = EPISODE_RE.replace_all(&cleaned, " ").into_owned();
    cleaned = RELEASE_TAG_RE.replace_all(&cleaned, " ").into_owned();
    cleaned = TRAILING_GROUP_RE
        .replace_all(cleaned.trim(), " ")
        .into_owned();
    cleaned = PUNCT_RUN_RE.replace_all(&cleaned, " ").into_owned();

    let cleaned = cleaned
        .trim_matches(|c: char| !c.is_alphanumeric())
        .trim()
        .to_string();

    if cleaned.is_empty() {
        title.to_string()
    } else {
        cleaned
    }
}

/// Canonical comparison key: `normalize(extract_core_title(title))`.
pub fn remove_metadata(title: &str) -> String {
    normalize(&extract_core_title(title))
}

fn strip_site_prefix(title: &str) -> String {
    let trimmed = title.trim_start();
    let lower = trimmed.to_lowercase();
    for prefix in SITE_PREFIXES {
        if lower.starts_with(prefix) {
            let rest = &trimmed[prefix.len()..];
            // Only strip when followed by a separator, not mid-word.
            let rest_trimmed = rest.trim_start_matches(|c: char| {
                c.is_whitespace() || matches!(c, '-' | ':' | '.' | '_' | '|')
            });
            if rest.len() != rest_trimmed.len() || rest.is_empty() {
                return rest_trimmed.to_string();
            }
        }
    }
    trimmed.to_string()
}
