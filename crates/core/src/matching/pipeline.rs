//! Candidate ranking pipeline: score, filter, sort.
//!
//! Semantic scores are fetched up front so the scoring itself stays a pure
//! computation. A failing semantic scorer degrades to lexical-only scoring
//! for the affected candidates, never aborting the batch.

use tracing::debug;

use super::scorer::{score, ScorerConfig};
use crate::indexer::types::TorrentCandidate;
use crate::metadata::SemanticScorer;
use crate::metrics;
use crate::profile::{self, QualityProfile};
use crate::scene::types::Scene;

/// Rank candidates for a scene: composite score, profile filter, then the
/// deterministic profile sort. The best candidate comes first.
pub async fn rank_candidates(
    config: &ScorerConfig,
    mut candidates: Vec<TorrentCandidate>,
    scene: &Scene,
    quality_profile: &QualityProfile,
    semantic: Option<&dyn SemanticScorer>,
) -> Vec<TorrentCandidate> {
    let scene_date = scene
        .release_date
        .map(|d| d.format("%Y-%m-%d").to_string());

    for candidate in &mut candidates {
        let semantic_score = match semantic {
            Some(scorer) => match scorer.score(&candidate.title, &scene.title).await {
                Ok(s) => Some(s),
                Err(err) => {
                    debug!(title = %candidate.title, error = %err, "semantic scoring failed, lexical fallback");
                    None
                }
            },
            None => None,
        };

        candidate.score = Some(score(
            config,
            &candidate.title,
            &scene.title,
            candidate.publish_date,
            scene_date.as_deref(),
            semantic_score,
        ));
    }

    let mut kept = profile::filter(candidates, quality_profile);
    profile::sort(&mut kept, quality_profile);
    metrics::CANDIDATES_RANKED.inc_by(kept.len() as u64);
    kept
}
