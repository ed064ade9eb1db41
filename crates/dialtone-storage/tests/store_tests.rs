// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite report store.

use dialtone_config::model::StorageConfig;
use dialtone_core::{HealthStatus, PluginAdapter, ReportStore};
use dialtone_storage::SqliteReportStore;
use serde_json::json;

fn config_in(dir: &tempfile::TempDir) -> StorageConfig {
    StorageConfig {
        database_path: dir.path().join("reports.db").display().to_string(),
        wal_mode: true,
    }
}

#[tokio::test]
async fn operations_before_initialize_fail() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteReportStore::new(config_in(&dir));
    assert!(store.get("feedback").await.is_err());
    assert!(store.health_check().await.is_err());
    // Shutdown of a never-opened store is a no-op.
    store.shutdown().await.unwrap();
}

#[tokio::test]
async fn double_initialize_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteReportStore::new(config_in(&dir));
    store.initialize().await.unwrap();
    assert!(store.initialize().await.is_err());
}

#[tokio::test]
async fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let value = json!([{"id": "a"}, {"id": "b"}]);

    let store = SqliteReportStore::new(config_in(&dir));
    store.initialize().await.unwrap();
    store.set("feedback", &value).await.unwrap();
    store
        .set("feedback.watermark", &json!("2026-03-01T00:00:00Z"))
        .await
        .unwrap();
    store.close().await.unwrap();
    drop(store);

    let reopened = SqliteReportStore::new(config_in(&dir));
    reopened.initialize().await.unwrap();
    assert_eq!(reopened.get("feedback").await.unwrap(), Some(value));
    assert_eq!(
        reopened.get("feedback.watermark").await.unwrap(),
        Some(json!("2026-03-01T00:00:00Z"))
    );
    assert!(matches!(
        reopened.health_check().await.unwrap(),
        HealthStatus::Healthy
    ));
    assert_eq!(reopened.name(), "sqlite");
}
