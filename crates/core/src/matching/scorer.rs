//! Composite match scoring between a torrent candidate and a scene.
//!
//! The score blends a lexical similarity over metadata-stripped titles with
//! an optional semantic similarity supplied by an external scorer, then adds
//! a small date-proximity bonus. Pure computation, no IO.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::date_bonus;
use super::normalize::remove_metadata;

/// Scoring knobs. Defaults are untuned starting points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScorerConfig {
    /// Weight of the semantic score in the blend, in [0, 1]. The lexical
    /// score takes the remainder.
    pub semantic_weight: f32,
    /// Semantic scores below this floor are treated as absent.
    pub semantic_confidence_min: f32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.7,
            semantic_confidence_min: 0.5,
        }
    }
}

/// Score a candidate title against a scene, in [0, 100].
///
/// Lexical similarity is normalized Levenshtein over `remove_metadata` of
/// both titles, scaled to 0..100. When a semantic score is supplied and
/// clears the confidence floor, the two are blended per
/// `ScorerConfig::semantic_weight`; otherwise the lexical score stands
/// alone. A date bonus of up to 5 points is added and the total is capped
/// at 100.
pub fn score(
    config: &ScorerConfig,
    candidate_title: &str,
    scene_title: &str,
    candidate_date: Option<NaiveDate>,
    scene_date: Option<&str>,
    semantic: Option<f32>,
) -> f32 {
    let lexical = lexical_score(candidate_title, scene_title);

    let base = match semantic {
        Some(s) if s >= config.semantic_confidence_min => {
            let w = config.semantic_weight.clamp(0.0, 1.0);
            s.clamp(0.0, 1.0) * 100.0 * w + lexical * (1.0 - w)
        }
        _ => lexical,
    };

    let bonus = date_bonus(candidate_date, scene_date) as f32;
    (base + bonus).clamp(0.0, 100.0)
}

/// Lexical similarity alone, in [0, 100].
pub fn lexical_score(a: &str, b: &str) -> f32 {
    let a = remove_metadata(a);
    let b = remove_metadata(b);
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    (strsim::normalized_levenshtein(&a, &b) * 100.0) as f32
}
