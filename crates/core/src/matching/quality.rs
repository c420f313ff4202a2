//! Quality attribute parsing from raw listing titles.
//!
//! Tokenizes a title into resolution, source, codec and container via
//! ordered case-insensitive matching. Parsing never fails: unmatched
//! dimensions come back as `Unknown` so downstream filtering treats them as
//! non-matching instead of erroring.

use serde::{Deserialize, Serialize};

/// Video resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    #[serde(rename = "2160p")]
    R2160p,
    #[serde(rename = "1080p")]
    R1080p,
    #[serde(rename = "720p")]
    R720p,
    #[serde(rename = "480p")]
    R480p,
    Unknown,
}

impl Resolution {
    /// Returns the resolution as a display/search keyword.
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Resolution::R2160p => "2160p",
            Resolution::R1080p => "1080p",
            Resolution::R720p => "720p",
            Resolution::R480p => "480p",
            Resolution::Unknown => "unknown",
        }
    }
}

/// Video source type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VideoSource {
    BluRay,
    WebDl,
    WebRip,
    Hdtv,
    DvdRip,
    Unknown,
}

impl VideoSource {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            VideoSource::BluRay => "bluray",
            VideoSource::WebDl => "web-dl",
            VideoSource::WebRip => "webrip",
            VideoSource::Hdtv => "hdtv",
            VideoSource::DvdRip => "dvdrip",
            VideoSource::Unknown => "unknown",
        }
    }
}

/// Video codec.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    X264,
    X265,
    Av1,
    Xvid,
    Unknown,
}

impl VideoCodec {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            VideoCodec::X264 => "x264",
            VideoCodec::X265 => "x265",
            VideoCodec::Av1 => "av1",
            VideoCodec::Xvid => "xvid",
            VideoCodec::Unknown => "unknown",
        }
    }
}

/// File container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    Mp4,
    Mkv,
    Avi,
    Wmv,
    Unknown,
}

impl Container {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mkv => "mkv",
            Container::Avi => "avi",
            Container::Wmv => "wmv",
            Container::Unknown => "unknown",
        }
    }
}

/// Structured quality attributes parsed from a listing title.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedQuality {
    pub resolution: Resolution,
    pub source: VideoSource,
    pub codec: VideoCodec,
    pub container: Container,
}

impl Default for ParsedQuality {
    fn default() -> Self {
        Self {
            resolution: Resolution::Unknown,
            source: VideoSource::Unknown,
            codec: VideoCodec::Unknown,
            container: Container::Unknown,
        }
    }
}

/// Alias tables, matched in order. The first alias found in the title wins
/// the dimension.
const RESOLUTION_ALIASES: &[(Resolution, &[&str])] = &[
    (Resolution::R2160p, &["2160p", "4k", "uhd"]),
    (Resolution::R1080p, &["1080p", "1080i"]),
    (Resolution::R720p, &["720p"]),
    (Resolution::R480p, &["480p", "576p"]),
];

const SOURCE_ALIASES: &[(VideoSource, &[&str])] = &[
    (VideoSource::BluRay, &["bluray", "blu-ray", "bdrip", "brrip", "remux"]),
    (VideoSource::WebDl, &["web-dl", "webdl", "web dl"]),
    (VideoSource::WebRip, &["webrip", "web-rip"]),
    (VideoSource::Hdtv, &["hdtv"]),
    (VideoSource::DvdRip, &["dvdrip", "dvd-rip", "dvd"]),
];

const CODEC_ALIASES: &[(VideoCodec, &[&str])] = &[
    (VideoCodec::X265, &["x265", "h265", "h.265", "hevc"]),
    (VideoCodec::X264, &["x264", "h264", "h.264", "avc"]),
    (VideoCodec::Av1, &["av1"]),
    (VideoCodec::Xvid, &["xvid", "divx"]),
];

const CONTAINER_ALIASES: &[(Container, &[&str])] = &[
    (Container::Mp4, &["mp4"]),
    (Container::Mkv, &["mkv"]),
    (Container::Avi, &["avi"]),
    (Container::Wmv, &["wmv"]),
];

/// Parse quality attributes from a raw title. Never fails.
pub fn parse_quality(title: &str) -> ParsedQuality {
    let lower = title.to_lowercase();
    ParsedQuality {
        resolution: match_dimension(&lower, RESOLUTION_ALIASES, Resolution::Unknown),
        source: match_dimension(&lower, SOURCE_ALIASES, VideoSource::Unknown),
        codec: match_dimension(&lower, CODEC_ALIASES, VideoCodec::Unknown),
        container: match_dimension(&lower, CONTAINER_ALIASES, Container::Unknown),
    }
}

fn match_dimension<T: Copy>(lower_title: &str, aliases: &[(T, &[&str])], unknown: T) -> T {
    for (value, tokens) in aliases {
        if tokens.iter().any(|t| lower_title.contains(t)) {
            return *value;
        }
    }
    unknown
}
