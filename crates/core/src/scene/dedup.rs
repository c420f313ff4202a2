//! Scene duplicate detection.
//!
//! Checks run in strict priority order and the first hit wins: external id,
//! then exact title plus release date, then (jav content only) normalized
//! product code.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::store::SceneStore;
use super::types::{ContentType, SceneCandidate, SceneStoreError};

/// Leading letters, a digit run of 3+, optional `-NNN` part suffix.
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)[-_ ]?(\d{3,})(?:-\d+)?$").unwrap());

/// Normalize a jav product code to its comparable base form.
///
/// `abc-00123-1` and `ABC123` both normalize to `ABC00123` / `ABC123`
/// style keys (letters uppercased, separators dropped, part suffix
/// removed). Codes that do not fit the pattern are uppercased as-is.
pub fn normalize_code(code: &str) -> String {
    let trimmed = code.trim();
    match CODE_RE.captures(trimmed) {
        Some(caps) => format!(
            "{}{}",
            caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_uppercase(),
            caps.get(2).map(|m| m.as_str()).unwrap_or_default(),
        ),
        None => trimmed.to_uppercase(),
    }
}

/// Find an existing scene the candidate duplicates, returning its id.
pub fn find_duplicate_scene(
    candidate: &SceneCandidate,
    store: &dyn SceneStore,
) -> Result<Option<String>, SceneStoreError> {
    // 1. Any shared external id.
    for (source, external_id) in &candidate.external_ids {
        if let Some(scene) = store.get_by_external_id(source, external_id)? {
            return Ok(Some(scene.id));
        }
    }

    // 2. Exact title + release date.
    if let Some(date) = candidate.release_date {
        if let Some(scene) = store.get_by_title_and_date(&candidate.title, date)? {
            return Ok(Some(scene.id));
        }
    }

    // 3. Normalized product code, jav content only.
    if candidate.content_type == ContentType::Jav {
        if let Some(code) = &candidate.code {
            let normalized = normalize_code(code);
            for scene in store.list_by_content_type(ContentType::Jav)? {
                if let Some(stored_code) = &scene.code {
                    if normalize_code(stored_code) == normalized {
                        return Ok(Some(scene.id));
                    }
                }
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::sqlite_store::SqliteSceneStore;
    use chrono::NaiveDate;

    fn store_with(candidates: Vec<SceneCandidate>) -> (SqliteSceneStore, Vec<String>) {
        let store = SqliteSceneStore::in_memory().unwrap();
        let ids = candidates
            .into_iter()
            .map(|c| store.create(c).unwrap().id)
            .collect();
        (store, ids)
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("ABC-123"), "ABC123");
        assert_eq!(normalize_code("abc-123"), "ABC123");
        assert_eq!(normalize_code("ABC-123-2"), "ABC123");
        assert_eq!(normalize_code("ABC 123"), "ABC123");
        assert_eq!(normalize_code("ABC123"), "ABC123");
        // Non-conforming codes fall back to uppercase as-is.
        assert_eq!(normalize_code("123ABC"), "123ABC");
        assert_eq!(normalize_code("ab-12"), "AB-12");
    }

    #[test]
    fn test_external_id_hit_wins() {
        let (store, ids) = store_with(vec![
            SceneCandidate::new("Stored", ContentType::Scene).with_external_id("stashdb", "x-1"),
        ]);

        let candidate = SceneCandidate::new("Completely Different", ContentType::Scene)
            .with_external_id("stashdb", "x-1");
        assert_eq!(
            find_duplicate_scene(&candidate, &store).unwrap(),
            Some(ids[0].clone())
        );
    }

    #[test]
    fn test_title_date_hit() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let (store, ids) = store_with(vec![
            SceneCandidate::new("Beach Day", ContentType::Scene).with_release_date(date),
        ]);

        let candidate =
            SceneCandidate::new("Beach Day", ContentType::Scene).with_release_date(date);
        assert_eq!(
            find_duplicate_scene(&candidate, &store).unwrap(),
            Some(ids[0].clone())
        );

        // Same title, different date: not a duplicate.
        let other = SceneCandidate::new("Beach Day", ContentType::Scene)
            .with_release_date(NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(find_duplicate_scene(&other, &store).unwrap(), None);
    }

    #[test]
    fn test_jav_code_hit() {
        let (store, ids) = store_with(vec![
            SceneCandidate::new("Stored Jav", ContentType::Jav).with_code("ABC-123"),
        ]);

        let candidate =
            SceneCandidate::new("Other Title", ContentType::Jav).with_code("abc-123-2");
        assert_eq!(
            find_duplicate_scene(&candidate, &store).unwrap(),
            Some(ids[0].clone())
        );
    }

    #[test]
    fn test_code_check_skipped_for_non_jav() {
        let (store, _) = store_with(vec![
            SceneCandidate::new("Stored", ContentType::Jav).with_code("ABC-123"),
        ]);

        // Same code on a non-jav candidate does not match.
        let candidate = SceneCandidate::new("Movie", ContentType::Movie).with_code("ABC-123");
        assert_eq!(find_duplicate_scene(&candidate, &store).unwrap(), None);
    }

    #[test]
    fn test_priority_order() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let (store, ids) = store_with(vec![
            // Matches by title+date.
            SceneCandidate::new("Beach Day", ContentType::Jav)
                .with_release_date(date)
                .with_code("XYZ-999"),
            // Matches by external id.
            SceneCandidate::new("Unrelated", ContentType::Jav).with_external_id("stashdb", "x-1"),
        ]);

        // Candidate matches both; the external id check runs first.
        let candidate = SceneCandidate::new("Beach Day", ContentType::Jav)
            .with_release_date(date)
            .with_external_id("stashdb", "x-1");
        assert_eq!(
            find_duplicate_scene(&candidate, &store).unwrap(),
            Some(ids[1].clone())
        );
    }

    #[test]
    fn test_no_duplicate() {
        let (store, _) = store_with(vec![
            SceneCandidate::new("Stored", ContentType::Scene),
        ]);

        let candidate = SceneCandidate::new("Fresh", ContentType::Scene);
        assert_eq!(find_duplicate_scene(&candidate, &store).unwrap(), None);
    }
}
