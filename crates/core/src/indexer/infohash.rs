//! Info hash canonicalization and magnet helpers.
//!
//! Indexers report info hashes as 40-char hex (any case) or 32-char base32.
//! The canonical form used everywhere downstream is uppercase hex.

use data_encoding::{BASE32, HEXUPPER};
use once_cell::sync::Lazy;
use regex_lite::Regex;

static MAGNET_HASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)xt=urn:btih:([A-Za-z0-9]{32,40})").unwrap());

/// Canonicalize an info hash to 40-char uppercase hex.
///
/// Accepts 40-char hex in any case and 32-char base32. Anything else
/// returns `None`.
pub fn normalize_info_hash(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    match trimmed.len() {
        40 if trimmed.chars().all(|c| c.is_ascii_hexdigit()) => Some(trimmed.to_uppercase()),
        32 => {
            let bytes = BASE32.decode(trimmed.to_uppercase().as_bytes()).ok()?;
            (bytes.len() == 20).then(|| HEXUPPER.encode(&bytes))
        }
        _ => None,
    }
}

/// Pull the info hash out of a magnet URI, canonicalized.
pub fn extract_hash_from_magnet(magnet: &str) -> Option<String> {
    let caps = MAGNET_HASH_RE.captures(magnet)?;
    normalize_info_hash(caps.get(1)?.as_str())
}

/// Build a minimal magnet URI from a canonical info hash.
pub fn magnet_for_hash(hash: &str) -> String {
    format!("magnet:?xt=urn:btih:{hash}")
}
