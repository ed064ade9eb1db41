// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait for the durable key/value substrate the engine persists into.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DialtoneError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for durable, key-addressed storage of opaque report collections.
///
/// Values are whole JSON documents: a `set` overwrites everything under the
/// key. The engine never relies on partial updates.
#[async_trait]
pub trait ReportStore: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), DialtoneError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), DialtoneError>;

    /// Reads the value under `key`. `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<Value>, DialtoneError>;

    /// Overwrites the value under `key`.
    async fn set(&self, key: &str, value: &Value) -> Result<(), DialtoneError>;
}
