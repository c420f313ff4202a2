//! Title matching: normalization, date extraction, quality parsing and
//! composite scoring of torrent listings against scenes.

pub mod dates;
pub mod normalize;
pub mod pipeline;
pub mod quality;
pub mod scorer;

pub use dates::{date_bonus, extract_date};
pub use normalize::{extract_core_title, normalize, remove_metadata};
pub use pipeline::rank_candidates;
pub use quality::{parse_quality, Container, ParsedQuality, Resolution, VideoCodec, VideoSource};
pub use scorer::{score, ScorerConfig};
