//! Scene store trait.

use chrono::NaiveDate;

use super::types::{
    ContentType, ExclusionReason, Scene, SceneCandidate, SceneExclusion, SceneFileRecord,
    SceneStoreError, TorrentGroup,
};

/// Persistent storage for scenes, exclusions, torrent groups and file
/// records. Implementations enforce the external-id uniqueness invariant
/// atomically.
pub trait SceneStore: Send + Sync {
    /// Insert a new scene. Fails with `DuplicateExternalId` when any of the
    /// candidate's (source, external_id) pairs is already registered.
    fn create(&self, candidate: SceneCandidate) -> Result<Scene, SceneStoreError>;

    fn get(&self, id: &str) -> Result<Option<Scene>, SceneStoreError>;

    /// Look up a scene by one of its external ids.
    fn get_by_external_id(
        &self,
        source: &str,
        external_id: &str,
    ) -> Result<Option<Scene>, SceneStoreError>;

    /// Exact title + release date lookup.
    fn get_by_title_and_date(
        &self,
        title: &str,
        date: NaiveDate,
    ) -> Result<Option<Scene>, SceneStoreError>;

    /// All scenes of a content type, for code-based duplicate scans.
    fn list_by_content_type(&self, content_type: ContentType)
        -> Result<Vec<Scene>, SceneStoreError>;

    /// Record an exclusion. Idempotent: re-excluding an already excluded
    /// scene returns `false` and changes nothing.
    fn add_exclusion(
        &self,
        scene_id: &str,
        reason: ExclusionReason,
    ) -> Result<bool, SceneStoreError>;

    fn get_exclusion(&self, scene_id: &str) -> Result<Option<SceneExclusion>, SceneStoreError>;

    fn is_excluded(&self, scene_id: &str) -> Result<bool, SceneStoreError> {
        Ok(self.get_exclusion(scene_id)?.is_some())
    }

    /// Upsert a torrent group by id.
    fn save_group(&self, group: &TorrentGroup) -> Result<(), SceneStoreError>;

    fn get_group(&self, id: &str) -> Result<Option<TorrentGroup>, SceneStoreError>;

    fn list_groups(&self) -> Result<Vec<TorrentGroup>, SceneStoreError>;

    /// Record the on-disk media file for a scene, replacing any previous
    /// record.
    fn set_file_record(&self, scene_id: &str, path: &str) -> Result<(), SceneStoreError>;

    fn get_file_record(&self, scene_id: &str) -> Result<Option<SceneFileRecord>, SceneStoreError>;

    /// Drop the file record for a scene. Returns whether one existed.
    fn clear_file_record(&self, scene_id: &str) -> Result<bool, SceneStoreError>;
}
