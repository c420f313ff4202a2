//! Date extraction and date-proximity scoring.
//!
//! Listing titles embed release dates in a handful of formats. Extraction
//! tries patterns in order of specificity and accepts the first
//! syntactically valid date inside the allowed range.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Earliest accepted release date. Anything before this is noise.
const MIN_YEAR: i32 = 1980;

static YMD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})[-._](\d{1,2})[-._](\d{1,2})\b").unwrap());
static DMY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[-._](\d{1,2})[-._](\d{4})\b").unwrap());
static COMPACT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})(\d{2})(\d{2})\b").unwrap());
static SHORT_YMD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2})[-._](\d{2})[-._](\d{2})\b").unwrap());

/// Extract the first plausible calendar date from a title.
///
/// Patterns are tried in order: `YYYY-MM-DD` (also `.`/`_` separators),
/// `DD-MM-YYYY`, compact `YYYYMMDD`, then 2-digit-year `YY-MM-DD` with a
/// pivot (>= 50 is 19xx, otherwise 20xx). A match only wins if it forms a
/// valid date between 1980-01-01 and today; otherwise the next occurrence
/// or pattern is tried.
pub fn extract_date(title: &str) -> Option<NaiveDate> {
    for caps in YMD_RE.captures_iter(title) {
        if let Some(date) = build_date(parse_num(&caps, 1), parse_num(&caps, 2), parse_num(&caps, 3))
        {
            return Some(date);
        }
    }

    for caps in DMY_RE.captures_iter(title) {
        if let Some(date) = build_date(parse_num(&caps, 3), parse_num(&caps, 2), parse_num(&caps, 1))
        {
            return Some(date);
        }
    }

    for caps in COMPACT_RE.captures_iter(title) {
        if let Some(date) = build_date(parse_num(&caps, 1), parse_num(&caps, 2), parse_num(&caps, 3))
        {
            return Some(date);
        }
    }

    for caps in SHORT_YMD_RE.captures_iter(title) {
        let yy = parse_num(&caps, 1);
        let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };
        if let Some(date) = build_date(year, parse_num(&caps, 2), parse_num(&caps, 3)) {
            return Some(date);
        }
    }

    None
}

/// Similarity between two dates by absolute day difference, in [0, 1].
///
/// Symmetric: `date_similarity(a, b) == date_similarity(b, a)`.
pub fn date_similarity(a: NaiveDate, b: NaiveDate) -> f64 {
    let days = (a - b).num_days().abs();
    match days {
        0 => 1.0,
        1..=7 => 0.95,
        8..=30 => 0.8,
        31..=90 => 0.6,
        91..=180 => 0.4,
        181..=365 => 0.2,
        _ => 0.0,
    }
}

/// Score bonus (0..=5) for date proximity between a torrent date and a
/// scene's release date string. Zero when either side is missing or
/// unparseable.
pub fn date_bonus(torrent_date: Option<NaiveDate>, scene_date: Option<&str>) -> u32 {
    let torrent = match torrent_date {
        Some(d) => d,
        None => return 0,
    };
    let scene = match scene_date.and_then(parse_scene_date) {
        Some(d) => d,
        None => return 0,
    };

    let sim = date_similarity(torrent, scene);
    if sim >= 0.95 {
        5
    } else if sim >= 0.8 {
        3
    } else if sim >= 0.6 {
        2
    } else if sim >= 0.4 {
        1
    } else {
        0
    }
}

/// Parse a scene release date string: ISO `YYYY-MM-DD` first, then any of
/// the listing formats.
fn parse_scene_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if in_range(date) {
            return Some(date);
        }
    }
    extract_date(trimmed)
}

fn parse_num(caps: &regex_lite::Captures, idx: usize) -> i32 {
    caps.get(idx)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn build_date(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32)?;
    in_range(date).then_some(date)
}

fn in_range(date: NaiveDate) -> bool {
    date.year() >= MIN_YEAR && date <= Utc::now().date_naive()
}
