//! Scene registry: persistent scene records, exclusions, torrent groups
//! and duplicate detection.

pub mod dedup;
pub mod sqlite_store;
pub mod store;
pub mod types;

pub use dedup::{find_duplicate_scene, normalize_code};
pub use sqlite_store::SqliteSceneStore;
pub use store::SceneStore;
pub use types::{
    ContentType, ExclusionReason, GroupStatus, Scene, SceneCandidate, SceneExclusion,
    SceneFileRecord, SceneStoreError, SearchPhase, TorrentGroup,
};
