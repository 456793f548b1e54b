pub mod spots;

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppResult;
use crate::state::DbPool;

/// Generic key -> JSON-blob persistence over the `settings` table.
///
/// Admin-editable content with no fixed schema lives here, so new fields can
/// be added without a migration. Blobs are read and written wholesale;
/// concurrent writers are last-writer-wins on the whole row.
#[derive(Clone)]
pub struct SettingsStore {
    pool: DbPool,
}

impl SettingsStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Fetch and decode the blob stored under `key`. A missing row and an
    /// undecodable blob both come back as `None`: listing pages must fall
    /// back to defaults rather than surface a 500 over stale content.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let conn = self.pool.get()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            None => Ok(None),
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    tracing::warn!("Undecodable settings blob under {key:?}, ignoring: {e}");
                    Ok(None)
                }
            },
        }
    }

    /// Encode and upsert the whole blob under `key`. Insert-or-replace on the
    /// row, atomic from the store's perspective.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let conn = self.pool.get()?;
        let text = serde_json::to_string(value)?;
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, text],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::spots::EatDrinkSettings;
    use super::*;
    use crate::db;
    use serde_json::json;

    fn test_store() -> SettingsStore {
        let pool = db::create_memory_pool().unwrap();
        db::run_migrations(&pool).unwrap();
        SettingsStore::new(pool)
    }

    #[test]
    fn get_missing_key_returns_none() {
        let store = test_store();
        let got: Option<serde_json::Value> = store.get("never_saved").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = test_store();
        let blob = json!({ "spots": [], "featuredIds": ["a", "b"] });
        store.put("eat_drink_spots", &blob).unwrap();
        let got: Option<serde_json::Value> = store.get("eat_drink_spots").unwrap();
        assert_eq!(got, Some(blob));
    }

    #[test]
    fn put_replaces_existing_value() {
        let store = test_store();
        store.put("k", &json!({"v": 1})).unwrap();
        store.put("k", &json!({"v": 2})).unwrap();
        let got: Option<serde_json::Value> = store.get("k").unwrap();
        assert_eq!(got, Some(json!({"v": 2})));
    }

    #[test]
    fn corrupt_blob_reads_as_none() {
        let store = test_store();
        let conn = store.pool.get().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES ('broken', 'not json {')",
            [],
        )
        .unwrap();
        drop(conn);

        let got: Option<EatDrinkSettings> = store.get("broken").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn typed_round_trip() {
        let store = test_store();
        let settings = EatDrinkSettings::default();
        store.put("eat_drink_spots", &settings).unwrap();
        let got: Option<EatDrinkSettings> = store.get("eat_drink_spots").unwrap();
        assert_eq!(got, Some(settings));
    }
}
