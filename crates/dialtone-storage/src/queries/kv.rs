// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-document reads and writes on the `report_store` table.

use dialtone_core::DialtoneError;
use rusqlite::{OptionalExtension, params};
use serde_json::Value;

use crate::database::Database;

/// Read the JSON document stored under `key`.
pub async fn get(db: &Database, key: &str) -> Result<Option<Value>, DialtoneError> {
    let key = key.to_string();
    let raw: Option<String> = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM report_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    raw.map(|text| serde_json::from_str(&text).map_err(DialtoneError::from))
        .transpose()
}

/// Overwrite the document under `key`, creating the row if needed.
pub async fn set(db: &Database, key: &str, value: &Value) -> Result<(), DialtoneError> {
    let key = key.to_string();
    let text = serde_json::to_string(value)?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO report_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, text],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn memory_db() -> Database {
        Database::open(":memory:", false).await.unwrap()
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let db = memory_db().await;
        assert!(get(&db, "feedback").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_overwrites_whole_document() {
        let db = memory_db().await;
        set(&db, "feedback", &json!([{"a": 1}, {"b": 2}])).await.unwrap();
        set(&db, "feedback", &json!({})).await.unwrap();
        assert_eq!(get(&db, "feedback").await.unwrap(), Some(json!({})));
    }
}
