// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ReportStore trait.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use dialtone_config::model::StorageConfig;
use dialtone_core::{AdapterType, DialtoneError, HealthStatus, PluginAdapter, ReportStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed report store.
///
/// The database is opened lazily on the first call to
/// [`ReportStore::initialize`]; every other operation fails until then.
pub struct SqliteReportStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteReportStore {
    /// Create a new store. The database is not opened until `initialize`.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, DialtoneError> {
        self.db.get().ok_or_else(|| DialtoneError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteReportStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DialtoneError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DialtoneError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn initialize(&self) -> Result<(), DialtoneError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| DialtoneError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite report store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), DialtoneError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, DialtoneError> {
        queries::kv::get(self.db()?, key).await
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), DialtoneError> {
        queries::kv::set(self.db()?, key, value).await
    }
}
