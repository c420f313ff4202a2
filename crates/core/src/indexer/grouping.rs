//! Clustering of raw listings into torrent groups.
//!
//! Listings whose titles collapse to the same metadata-stripped key are
//! assumed to describe the same scene. Groups start Unknown and get marked
//! Matched once a scene is identified.

use std::collections::BTreeMap;
use std::collections::HashSet;

use super::types::TorrentCandidate;
use crate::matching::normalize::remove_metadata;
use crate::scene::types::{GroupStatus, SearchPhase, TorrentGroup};

/// Cluster candidates by their normalized title key.
///
/// Output order is deterministic: descending torrent count, then group
/// title.
pub fn group_candidates(candidates: &[TorrentCandidate], phase: SearchPhase) -> Vec<TorrentGroup> {
    let mut buckets: BTreeMap<String, Vec<&TorrentCandidate>> = BTreeMap::new();
    for candidate in candidates {
        let key = remove_metadata(&candidate.title);
        buckets.entry(key).or_default().push(candidate);
    }

    let mut groups: Vec<TorrentGroup> = buckets
        .into_iter()
        .map(|(group_title, members)| {
            let indexers: HashSet<&str> =
                members.iter().map(|c| c.indexer.as_str()).collect();
            TorrentGroup {
                id: uuid::Uuid::new_v4().to_string(),
                group_title,
                raw_titles: members.iter().map(|c| c.title.clone()).collect(),
                scene_id: None,
                torrent_count: members.len() as u32,
                indexer_count: indexers.len() as u32,
                status: GroupStatus::Unknown,
                semantic_score: None,
                phase,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.torrent_count
            .cmp(&a.torrent_count)
            .then_with(|| a.group_title.cmp(&b.group_title))
    });
    groups
}

/// Bind a group to a matched scene.
pub fn mark_matched(group: &mut TorrentGroup, scene_id: impl Into<String>) {
    group.scene_id = Some(scene_id.into());
    group.status = GroupStatus::Matched;
}
