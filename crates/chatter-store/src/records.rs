//! CRUD operations on collection records.
//!
//! Records are append-only: there is no update or delete path.

use chrono::Utc;
use rusqlite::params;
use serde_json::Value;

use chatter_shared::{DataPath, SnapshotChild};

use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a record. Fails with [`StoreError::Duplicate`] when `key` is
    /// already present under `path`.
    pub fn insert_record(&self, path: &DataPath, key: &str, value: &Value) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.insert_raw_record(path, key, &json)
    }

    /// Insert a record whose stored text is taken verbatim, valid JSON or not.
    pub fn insert_raw_record(&self, path: &DataPath, key: &str, raw: &str) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO records (path, key, value, written_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![path.as_str(), key, raw, Utc::now().to_rfc3339()],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate {
                    path: path.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// All children of a collection, ordered by key.
    ///
    /// Stored text that is not valid JSON comes back as a JSON string so the
    /// caller can decide to drop it; one bad row never fails the read.
    pub fn list_records(&self, path: &DataPath) -> Result<Vec<SnapshotChild>> {
        let mut stmt = self.conn().prepare(
            "SELECT key, value
             FROM records
             WHERE path = ?1
             ORDER BY key ASC",
        )?;

        let rows = stmt.query_map(params![path.as_str()], |row| {
            let key: String = row.get(0)?;
            let raw: String = row.get(1)?;
            Ok((key, raw))
        })?;

        let mut children = Vec::new();
        for row in rows {
            let (key, raw) = row?;
            let value = match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(path = %path, key = %key, error = %e, "stored record is not valid JSON");
                    Value::String(raw)
                }
            };
            children.push(SnapshotChild { key, value });
        }
        Ok(children)
    }

    /// Number of records in a collection.
    pub fn count_records(&self, path: &DataPath) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM records WHERE path = ?1",
            params![path.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> DataPath {
        DataPath::parse(s).unwrap()
    }

    #[test]
    fn insert_and_list() {
        let db = Database::open_in_memory().unwrap();
        let messages = path("messages/c1");

        db.insert_record(&messages, "-B", &json!({ "createdAt": 2 }))
            .unwrap();
        db.insert_record(&messages, "-A", &json!({ "createdAt": 1 }))
            .unwrap();
        db.insert_record(&path("messages/c2"), "-C", &json!({}))
            .unwrap();

        let children = db.list_records(&messages).unwrap();
        let keys: Vec<_> = children.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["-A", "-B"]);
        assert_eq!(children[0].value["createdAt"], 1);
        assert_eq!(db.count_records(&messages).unwrap(), 2);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let channels = DataPath::channels();

        db.insert_record(&channels, "-A", &json!({ "name": "one" }))
            .unwrap();
        let err = db
            .insert_record(&channels, "-A", &json!({ "name": "two" }))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        // The first write survives.
        let children = db.list_records(&channels).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].value["name"], "one");
    }

    #[test]
    fn invalid_json_comes_back_as_string() {
        let db = Database::open_in_memory().unwrap();
        let messages = path("messages/c1");

        db.insert_raw_record(&messages, "-A", "{not json").unwrap();
        let children = db.list_records(&messages).unwrap();
        assert_eq!(children[0].value, Value::String("{not json".into()));
    }
}
