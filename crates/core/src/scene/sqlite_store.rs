//! SQLite-backed scene store implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, ErrorCode};

use super::store::SceneStore;
use super::types::{
    ContentType, ExclusionReason, GroupStatus, Scene, SceneCandidate, SceneExclusion,
    SceneFileRecord, SceneStoreError, SearchPhase, TorrentGroup,
};

/// SQLite-backed scene store.
pub struct SqliteSceneStore {
    conn: Mutex<Connection>,
}

impl SqliteSceneStore {
    /// Open (and initialize) a scene store at the given path.
    pub fn new(path: &Path) -> Result<Self, SceneStoreError> {
        let conn = Connection::open(path).map_err(|e| SceneStoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory scene store (useful for testing).
    pub fn in_memory() -> Result<Self, SceneStoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SceneStoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SceneStoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS scenes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                release_date TEXT,
                code TEXT,
                content_type TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS scene_external_ids (
                scene_id TEXT NOT NULL REFERENCES scenes(id),
                source TEXT NOT NULL,
                external_id TEXT NOT NULL,
                UNIQUE(source, external_id)
            );

            CREATE TABLE IF NOT EXISTS scene_exclusions (
                scene_id TEXT PRIMARY KEY,
                reason TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS scene_files (
                scene_id TEXT PRIMARY KEY,
                path TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS torrent_groups (
                id TEXT PRIMARY KEY,
                group_title TEXT NOT NULL,
                raw_titles TEXT NOT NULL,
                scene_id TEXT,
                torrent_count INTEGER NOT NULL,
                indexer_count INTEGER NOT NULL,
                status TEXT NOT NULL,
                semantic_score REAL,
                phase TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_scenes_title ON scenes(title);
            CREATE INDEX IF NOT EXISTS idx_scenes_content_type ON scenes(content_type);
            CREATE INDEX IF NOT EXISTS idx_external_ids_scene ON scene_external_ids(scene_id);
            "#,
        )
        .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_scene(row: &rusqlite::Row) -> rusqlite::Result<Scene> {
        let id: String = row.get(0)?;
        let title: String = row.get(1)?;
        let release_date: Option<String> = row.get(2)?;
        let code: Option<String> = row.get(3)?;
        let content_type_str: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        let content_type = match content_type_str.as_str() {
            "jav" => ContentType::Jav,
            "movie" => ContentType::Movie,
            _ => ContentType::Scene,
        };

        Ok(Scene {
            id,
            title,
            release_date: release_date
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            code,
            external_ids: HashMap::new(),
            content_type,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }

    fn load_external_ids(
        conn: &Connection,
        scene_id: &str,
    ) -> Result<HashMap<String, String>, SceneStoreError> {
        let mut stmt = conn
            .prepare("SELECT source, external_id FROM scene_external_ids WHERE scene_id = ?")
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![scene_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        let mut ids = HashMap::new();
        for row in rows {
            let (source, external_id) = row.map_err(|e| SceneStoreError::Database(e.to_string()))?;
            ids.insert(source, external_id);
        }
        Ok(ids)
    }

    fn fetch_scene(conn: &Connection, id: &str) -> Result<Option<Scene>, SceneStoreError> {
        let result = conn.query_row(
            "SELECT id, title, release_date, code, content_type, created_at, updated_at FROM scenes WHERE id = ?",
            params![id],
            Self::row_to_scene,
        );

        match result {
            Ok(mut scene) => {
                scene.external_ids = Self::load_external_ids(conn, id)?;
                Ok(Some(scene))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SceneStoreError::Database(e.to_string())),
        }
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl SceneStore for SqliteSceneStore {
    fn create(&self, candidate: SceneCandidate) -> Result<Scene, SceneStoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        tx.execute(
            "INSERT INTO scenes (id, title, release_date, code, content_type, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                candidate.title,
                candidate.release_date.map(|d| d.format("%Y-%m-%d").to_string()),
                candidate.code,
                candidate.content_type.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        for (source, external_id) in &candidate.external_ids {
            tx.execute(
                "INSERT INTO scene_external_ids (scene_id, source, external_id) VALUES (?, ?, ?)",
                params![id, source, external_id],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    SceneStoreError::DuplicateExternalId {
                        source_name: source.clone(),
                        external_id: external_id.clone(),
                    }
                } else {
                    SceneStoreError::Database(e.to_string())
                }
            })?;
        }

        tx.commit()
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        Ok(Scene {
            id,
            title: candidate.title,
            release_date: candidate.release_date,
            code: candidate.code,
            external_ids: candidate.external_ids,
            content_type: candidate.content_type,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Scene>, SceneStoreError> {
        let conn = self.conn.lock().unwrap();
        Self::fetch_scene(&conn, id)
    }

    fn get_by_external_id(
        &self,
        source: &str,
        external_id: &str,
    ) -> Result<Option<Scene>, SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        let scene_id: Option<String> = match conn.query_row(
            "SELECT scene_id FROM scene_external_ids WHERE source = ? AND external_id = ?",
            params![source, external_id],
            |row| row.get(0),
        ) {
            Ok(id) => Some(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(SceneStoreError::Database(e.to_string())),
        };

        match scene_id {
            Some(id) => Self::fetch_scene(&conn, &id),
            None => Ok(None),
        }
    }

    fn get_by_title_and_date(
        &self,
        title: &str,
        date: NaiveDate,
    ) -> Result<Option<Scene>, SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        let scene_id: Option<String> = match conn.query_row(
            "SELECT id FROM scenes WHERE title = ? AND release_date = ?",
            params![title, date.format("%Y-%m-%d").to_string()],
            |row| row.get(0),
        ) {
            Ok(id) => Some(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(SceneStoreError::Database(e.to_string())),
        };

        match scene_id {
            Some(id) => Self::fetch_scene(&conn, &id),
            None => Ok(None),
        }
    }

    fn list_by_content_type(
        &self,
        content_type: ContentType,
    ) -> Result<Vec<Scene>, SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT id, title, release_date, code, content_type, created_at, updated_at FROM scenes WHERE content_type = ? ORDER BY created_at ASC")
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![content_type.as_str()], Self::row_to_scene)
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        let mut scenes = Vec::new();
        for row in rows {
            let mut scene = row.map_err(|e| SceneStoreError::Database(e.to_string()))?;
            scene.external_ids = Self::load_external_ids(&conn, &scene.id)?;
            scenes.push(scene);
        }
        Ok(scenes)
    }

    fn add_exclusion(
        &self,
        scene_id: &str,
        reason: ExclusionReason,
    ) -> Result<bool, SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        // INSERT OR IGNORE keeps this idempotent against the primary key.
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO scene_exclusions (scene_id, reason, created_at) VALUES (?, ?, ?)",
                params![scene_id, reason.as_str(), Utc::now().to_rfc3339()],
            )
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    fn get_exclusion(&self, scene_id: &str) -> Result<Option<SceneExclusion>, SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT scene_id, reason, created_at FROM scene_exclusions WHERE scene_id = ?",
            params![scene_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );

        match result {
            Ok((scene_id, reason_str, created_at_str)) => Ok(Some(SceneExclusion {
                scene_id,
                reason: ExclusionReason::parse(&reason_str)
                    .unwrap_or(ExclusionReason::ManualRemoval),
                created_at: parse_timestamp(&created_at_str),
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SceneStoreError::Database(e.to_string())),
        }
    }

    fn save_group(&self, group: &TorrentGroup) -> Result<(), SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        let raw_titles = serde_json::to_string(&group.raw_titles)
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO torrent_groups (id, group_title, raw_titles, scene_id, torrent_count, indexer_count, status, semantic_score, phase) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                group.id,
                group.group_title,
                raw_titles,
                group.scene_id,
                group.torrent_count,
                group.indexer_count,
                group.status.as_str(),
                group.semantic_score,
                group.phase.as_str(),
            ],
        )
        .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_group(&self, id: &str) -> Result<Option<TorrentGroup>, SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, group_title, raw_titles, scene_id, torrent_count, indexer_count, status, semantic_score, phase FROM torrent_groups WHERE id = ?",
            params![id],
            row_to_group,
        );

        match result {
            Ok(group) => Ok(Some(group)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SceneStoreError::Database(e.to_string())),
        }
    }

    fn list_groups(&self) -> Result<Vec<TorrentGroup>, SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT id, group_title, raw_titles, scene_id, torrent_count, indexer_count, status, semantic_score, phase FROM torrent_groups ORDER BY torrent_count DESC, group_title ASC")
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], row_to_group)
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        let mut groups = Vec::new();
        for row in rows {
            groups.push(row.map_err(|e| SceneStoreError::Database(e.to_string()))?);
        }
        Ok(groups)
    }

    fn set_file_record(&self, scene_id: &str, path: &str) -> Result<(), SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT OR REPLACE INTO scene_files (scene_id, path, recorded_at) VALUES (?, ?, ?)",
            params![scene_id, path, Utc::now().to_rfc3339()],
        )
        .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_file_record(&self, scene_id: &str) -> Result<Option<SceneFileRecord>, SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT scene_id, path, recorded_at FROM scene_files WHERE scene_id = ?",
            params![scene_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );

        match result {
            Ok((scene_id, path, recorded_at_str)) => Ok(Some(SceneFileRecord {
                scene_id,
                path,
                recorded_at: parse_timestamp(&recorded_at_str),
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SceneStoreError::Database(e.to_string())),
        }
    }

    fn clear_file_record(&self, scene_id: &str) -> Result<bool, SceneStoreError> {
        let conn = self.conn.lock().unwrap();

        let deleted = conn
            .execute("DELETE FROM scene_files WHERE scene_id = ?", params![scene_id])
            .map_err(|e| SceneStoreError::Database(e.to_string()))?;

        Ok(deleted > 0)
    }
}

fn row_to_group(row: &rusqlite::Row) -> rusqlite::Result<TorrentGroup> {
    let id: String = row.get(0)?;
    let group_title: String = row.get(1)?;
    let raw_titles_json: String = row.get(2)?;
    let scene_id: Option<String> = row.get(3)?;
    let torrent_count: u32 = row.get(4)?;
    let indexer_count: u32 = row.get(5)?;
    let status_str: String = row.get(6)?;
    let semantic_score: Option<f32> = row.get(7)?;
    let phase_str: String = row.get(8)?;

    Ok(TorrentGroup {
        id,
        group_title,
        raw_titles: serde_json::from_str(&raw_titles_json).unwrap_or_default(),
        scene_id,
        torrent_count,
        indexer_count,
        status: GroupStatus::parse(&status_str).unwrap_or(GroupStatus::Unknown),
        semantic_score,
        phase: SearchPhase::parse(&phase_str).unwrap_or(SearchPhase::Targeted),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteSceneStore {
        SqliteSceneStore::in_memory().unwrap()
    }

    fn jav_candidate(code: &str) -> SceneCandidate {
        SceneCandidate::new(format!("Title {code}"), ContentType::Jav).with_code(code)
    }

    #[test]
    fn test_create_and_get_scene() {
        let store = create_test_store();
        let candidate = SceneCandidate::new("Beach Day", ContentType::Scene)
            .with_release_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .with_external_id("stashdb", "abc-123");

        let scene = store.create(candidate).unwrap();
        assert!(!scene.id.is_empty());

        let fetched = store.get(&scene.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Beach Day");
        assert_eq!(
            fetched.release_date,
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(fetched.external_ids["stashdb"], "abc-123");
    }

    #[test]
    fn test_duplicate_external_id_rejected() {
        let store = create_test_store();
        store
            .create(
                SceneCandidate::new("First", ContentType::Scene)
                    .with_external_id("stashdb", "same-id"),
            )
            .unwrap();

        let result = store.create(
            SceneCandidate::new("Second", ContentType::Scene)
                .with_external_id("stashdb", "same-id"),
        );

        assert!(matches!(
            result,
            Err(SceneStoreError::DuplicateExternalId { .. })
        ));
        // The failed transaction must not leave a partial scene behind.
        let by_id = store.get_by_external_id("stashdb", "same-id").unwrap().unwrap();
        assert_eq!(by_id.title, "First");
    }

    #[test]
    fn test_same_external_id_different_source_allowed() {
        let store = create_test_store();
        store
            .create(SceneCandidate::new("A", ContentType::Scene).with_external_id("src1", "id"))
            .unwrap();
        store
            .create(SceneCandidate::new("B", ContentType::Scene).with_external_id("src2", "id"))
            .unwrap();
    }

    #[test]
    fn test_get_by_title_and_date() {
        let store = create_test_store();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        store
            .create(SceneCandidate::new("Beach Day", ContentType::Scene).with_release_date(date))
            .unwrap();

        assert!(store.get_by_title_and_date("Beach Day", date).unwrap().is_some());
        assert!(store
            .get_by_title_and_date("Beach Day", NaiveDate::from_ymd_opt(2024, 3, 16).unwrap())
            .unwrap()
            .is_none());
        assert!(store
            .get_by_title_and_date("Other", date)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_list_by_content_type() {
        let store = create_test_store();
        store.create(jav_candidate("ABC-123")).unwrap();
        store.create(jav_candidate("DEF-456")).unwrap();
        store
            .create(SceneCandidate::new("Western", ContentType::Scene))
            .unwrap();

        let javs = store.list_by_content_type(ContentType::Jav).unwrap();
        assert_eq!(javs.len(), 2);
        assert!(javs.iter().all(|s| s.content_type == ContentType::Jav));
    }

    #[test]
    fn test_exclusion_idempotent() {
        let store = create_test_store();
        let scene = store
            .create(SceneCandidate::new("Beach Day", ContentType::Scene))
            .unwrap();

        assert!(store
            .add_exclusion(&scene.id, ExclusionReason::UserDeleted)
            .unwrap());
        // Second insert is a no-op, reason unchanged.
        assert!(!store
            .add_exclusion(&scene.id, ExclusionReason::ManualRemoval)
            .unwrap());

        let exclusion = store.get_exclusion(&scene.id).unwrap().unwrap();
        assert_eq!(exclusion.reason, ExclusionReason::UserDeleted);
        assert!(store.is_excluded(&scene.id).unwrap());
    }

    #[test]
    fn test_group_round_trip() {
        let store = create_test_store();
        let group = TorrentGroup {
            id: uuid::Uuid::new_v4().to_string(),
            group_title: "beach day".to_string(),
            raw_titles: vec!["Beach Day 1080p".to_string(), "Beach Day 720p".to_string()],
            scene_id: None,
            torrent_count: 2,
            indexer_count: 1,
            status: GroupStatus::Unknown,
            semantic_score: Some(0.82),
            phase: SearchPhase::Performer,
        };

        store.save_group(&group).unwrap();
        let fetched = store.get_group(&group.id).unwrap().unwrap();
        assert_eq!(fetched, group);

        // Upsert with a matched scene.
        let mut matched = group.clone();
        matched.scene_id = Some("scene-1".to_string());
        matched.status = GroupStatus::Matched;
        store.save_group(&matched).unwrap();

        let groups = store.list_groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].status, GroupStatus::Matched);
    }

    #[test]
    fn test_file_record_lifecycle() {
        let store = create_test_store();
        let scene = store
            .create(SceneCandidate::new("Beach Day", ContentType::Scene))
            .unwrap();

        assert!(store.get_file_record(&scene.id).unwrap().is_none());
        store.set_file_record(&scene.id, "/media/beach_day.mp4").unwrap();

        let record = store.get_file_record(&scene.id).unwrap().unwrap();
        assert_eq!(record.path, "/media/beach_day.mp4");

        assert!(store.clear_file_record(&scene.id).unwrap());
        assert!(!store.clear_file_record(&scene.id).unwrap());
        assert!(store.get_file_record(&scene.id).unwrap().is_none());
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("scenes.db");

        let store = SqliteSceneStore::new(&db_path).unwrap();
        let scene = store
            .create(SceneCandidate::new("Beach Day", ContentType::Scene))
            .unwrap();

        assert!(db_path.exists());
        assert!(store.get(&scene.id).unwrap().is_some());
    }
}
