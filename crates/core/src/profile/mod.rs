//! Quality profile filtering and ranking.
//!
//! A profile is an ordered preference list. Earlier items are more
//! desirable; a candidate must satisfy at least one item to survive
//! filtering, and its best (lowest) matching item index drives ranking.

use serde::{Deserialize, Serialize};

use crate::indexer::types::TorrentCandidate;
use crate::matching::quality::{Resolution, VideoSource};

/// Resolution constraint for one profile item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QualityRule {
    /// Any resolution, including unknown.
    Any,
    /// Exactly this resolution.
    Exact { resolution: Resolution },
}

/// Source constraint for one profile item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceRule {
    Any,
    Exact { source: VideoSource },
}

/// Seeder floor for one profile item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeederRule {
    Any,
    AtLeast { min: u32 },
}

/// One entry in a quality profile's preference list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityProfileItem {
    pub quality: QualityRule,
    pub source: SourceRule,
    pub min_seeders: SeederRule,
    /// Maximum size in bytes. 0 means unbounded.
    #[serde(default)]
    pub max_size_bytes: u64,
}

impl QualityProfileItem {
    /// An item matching every candidate.
    pub fn any() -> Self {
        Self {
            quality: QualityRule::Any,
            source: SourceRule::Any,
            min_seeders: SeederRule::Any,
            max_size_bytes: 0,
        }
    }

    /// Whether a candidate satisfies every constraint of this item.
    pub fn matches(&self, candidate: &TorrentCandidate) -> bool {
        let quality_ok = match self.quality {
            QualityRule::Any => true,
            QualityRule::Exact { resolution } => candidate.parsed.resolution == resolution,
        };
        let source_ok = match self.source {
            SourceRule::Any => true,
            SourceRule::Exact { source } => candidate.parsed.source == source,
        };
        let seeders_ok = match self.min_seeders {
            SeederRule::Any => true,
            SeederRule::AtLeast { min } => candidate.seeders >= min,
        };
        let size_ok = self.max_size_bytes == 0 || candidate.size_bytes <= self.max_size_bytes;

        quality_ok && source_ok && seeders_ok && size_ok
    }
}

/// Ordered preference list of acceptable qualities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityProfile {
    pub name: String,
    pub items: Vec<QualityProfileItem>,
}

impl QualityProfile {
    /// Index of the first item the candidate satisfies.
    pub fn match_index(&self, candidate: &TorrentCandidate) -> Option<usize> {
        self.items.iter().position(|item| item.matches(candidate))
    }
}

/// Weights for the multi-criteria ranking variant. Components are
/// normalized to [0, 1] before weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RankWeights {
    pub priority: f64,
    pub score: f64,
    pub seeders: f64,
    pub size: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            priority: 0.4,
            score: 0.3,
            seeders: 0.2,
            size: 0.1,
        }
    }
}

/// Keep only candidates that satisfy at least one profile item.
pub fn filter(candidates: Vec<TorrentCandidate>, profile: &QualityProfile) -> Vec<TorrentCandidate> {
    candidates
        .into_iter()
        .filter(|c| profile.match_index(c).is_some())
        .collect()
}

/// Deterministic total ordering: profile priority first (lower matching
/// item index wins), then seeders descending, then score descending, then
/// info hash and title as tie-breaks.
pub fn sort(candidates: &mut [TorrentCandidate], profile: &QualityProfile) {
    candidates.sort_by(|a, b| {
        let idx_a = profile.match_index(a).unwrap_or(usize::MAX);
        let idx_b = profile.match_index(b).unwrap_or(usize::MAX);
        idx_a
            .cmp(&idx_b)
            .then_with(|| b.seeders.cmp(&a.seeders))
            .then_with(|| {
                let score_a = a.score.unwrap_or(0.0);
                let score_b = b.score.unwrap_or(0.0);
                score_b.total_cmp(&score_a)
            })
            .then_with(|| a.info_hash.cmp(&b.info_hash))
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Multi-criteria ranking: weighted blend of profile priority, match
/// score, seeder count and inverse size. Higher blended value ranks first.
pub fn rank_weighted(
    mut candidates: Vec<TorrentCandidate>,
    profile: &QualityProfile,
    weights: &RankWeights,
) -> Vec<TorrentCandidate> {
    let max_seeders = candidates.iter().map(|c| c.seeders).max().unwrap_or(0);
    let max_size = candidates.iter().map(|c| c.size_bytes).max().unwrap_or(0);
    let item_count = profile.items.len();

    let rank_value = |c: &TorrentCandidate| -> f64 {
        let priority = match profile.match_index(c) {
            Some(idx) if item_count > 0 => 1.0 - idx as f64 / item_count as f64,
            _ => 0.0,
        };
        let score = f64::from(c.score.unwrap_or(0.0)) / 100.0;
        let seeders = if max_seeders > 0 {
            f64::from(c.seeders) / f64::from(max_seeders)
        } else {
            0.0
        };
        let size = if max_size > 0 {
            1.0 - c.size_bytes as f64 / max_size as f64
        } else {
            0.0
        };

        weights.priority * priority
            + weights.score * score
            + weights.seeders * seeders
            + weights.size * size
    };

    candidates.sort_by(|a, b| {
        rank_value(b)
            .total_cmp(&rank_value(a))
            .then_with(|| a.info_hash.cmp(&b.info_hash))
            .then_with(|| a.title.cmp(&b.title))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::quality::parse_quality;

    fn candidate(title: &str, seeders: u32, size_bytes: u64) -> TorrentCandidate {
        TorrentCandidate {
            title: title.to_string(),
            info_hash: format!("{:040}", seeders),
            link: None,
            size_bytes,
            seeders,
            leechers: 0,
            indexer: "idx".to_string(),
            publish_date: None,
            parsed: parse_quality(title),
            score: None,
        }
    }

    fn profile_1080_then_720() -> QualityProfile {
        QualityProfile {
            name: "hd".to_string(),
            items: vec![
                QualityProfileItem {
                    quality: QualityRule::Exact {
                        resolution: Resolution::R1080p,
                    },
                    source: SourceRule::Any,
                    min_seeders: SeederRule::AtLeast { min: 2 },
                    max_size_bytes: 0,
                },
                QualityProfileItem {
                    quality: QualityRule::Exact {
                        resolution: Resolution::R720p,
                    },
                    source: SourceRule::Any,
                    min_seeders: SeederRule::Any,
                    max_size_bytes: 0,
                },
            ],
        }
    }

    #[test]
    fn test_filter_rejects_unmatched() {
        let profile = profile_1080_then_720();
        let candidates = vec![
            candidate("Beach Day 1080p", 10, 1024),
            candidate("Beach Day 480p", 10, 1024),
            candidate("Beach Day 720p", 1, 1024),
        ];

        let kept = filter(candidates, &profile);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|c| !c.title.contains("480p")));
    }

    #[test]
    fn test_filter_seeder_floor() {
        let profile = profile_1080_then_720();
        // 1080p item wants >= 2 seeders; this candidate matches no item.
        let kept = filter(vec![candidate("Beach Day 1080p", 1, 1024)], &profile);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_filter_size_cap() {
        let profile = QualityProfile {
            name: "small".to_string(),
            items: vec![QualityProfileItem {
                max_size_bytes: 2048,
                ..QualityProfileItem::any()
            }],
        };

        let kept = filter(
            vec![
                candidate("Fits 1080p", 1, 2048),
                candidate("Too big 1080p", 1, 2049),
            ],
            &profile,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Fits 1080p");
    }

    #[test]
    fn test_unknown_quality_fails_exact_rule() {
        let profile = profile_1080_then_720();
        let kept = filter(vec![candidate("Beach Day no tokens", 10, 1024)], &profile);
        assert!(kept.is_empty());

        // But an Any item accepts it.
        let lax = QualityProfile {
            name: "lax".to_string(),
            items: vec![QualityProfileItem::any()],
        };
        let kept = filter(vec![candidate("Beach Day no tokens", 10, 1024)], &lax);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_sort_profile_priority_beats_seeders() {
        let profile = profile_1080_then_720();
        let mut candidates = vec![
            candidate("Beach Day 720p", 100, 1024),
            candidate("Beach Day 1080p", 5, 1024),
        ];

        sort(&mut candidates, &profile);
        assert_eq!(candidates[0].title, "Beach Day 1080p");
    }

    #[test]
    fn test_sort_seeders_break_same_item() {
        let profile = profile_1080_then_720();
        let mut candidates = vec![
            candidate("Beach Day A 1080p", 5, 1024),
            candidate("Beach Day B 1080p", 50, 1024),
        ];

        sort(&mut candidates, &profile);
        assert_eq!(candidates[0].title, "Beach Day B 1080p");
    }

    #[test]
    fn test_sort_score_break() {
        let profile = QualityProfile {
            name: "any".to_string(),
            items: vec![QualityProfileItem::any()],
        };
        let mut a = candidate("Beach Day A 1080p", 5, 1024);
        a.score = Some(60.0);
        let mut b = candidate("Beach Day B 1080p", 5, 1024);
        b.score = Some(90.0);

        let mut candidates = vec![a, b];
        sort(&mut candidates, &profile);
        assert_eq!(candidates[0].title, "Beach Day B 1080p");
    }

    #[test]
    fn test_sort_deterministic_on_full_tie() {
        let profile = QualityProfile {
            name: "any".to_string(),
            items: vec![QualityProfileItem::any()],
        };
        let mut forward = vec![
            candidate("Alpha 1080p", 5, 1024),
            candidate("Beta 1080p", 5, 1024),
        ];
        let mut reversed: Vec<_> = forward.iter().rev().cloned().collect();

        sort(&mut forward, &profile);
        sort(&mut reversed, &profile);
        let f: Vec<_> = forward.iter().map(|c| c.title.clone()).collect();
        let r: Vec<_> = reversed.iter().map(|c| c.title.clone()).collect();
        assert_eq!(f, r);
    }

    #[test]
    fn test_rank_weighted_defaults() {
        let weights = RankWeights::default();
        assert!((weights.priority + weights.score + weights.seeders + weights.size - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_weighted_prefers_priority() {
        let profile = profile_1080_then_720();
        let mut hi = candidate("Beach Day 1080p", 5, 1024);
        hi.score = Some(50.0);
        let mut lo = candidate("Beach Day 720p", 8, 1024);
        lo.score = Some(55.0);

        let ranked = rank_weighted(vec![lo, hi], &profile, &RankWeights::default());
        assert_eq!(ranked[0].title, "Beach Day 1080p");
    }

    #[test]
    fn test_rank_weighted_smaller_size_wins_ties() {
        let profile = QualityProfile {
            name: "any".to_string(),
            items: vec![QualityProfileItem::any()],
        };
        let ranked = rank_weighted(
            vec![
                candidate("Big 1080p", 5, 4096),
                candidate("Small 1080p", 5, 1024),
            ],
            &profile,
            &RankWeights::default(),
        );
        assert_eq!(ranked[0].title, "Small 1080p");
    }
}
