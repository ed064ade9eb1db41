// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Dialtone report-delivery engine.
//!
//! This crate provides the report model, the error type, and the adapter
//! traits for the engine's external collaborators (durable store, HTTP
//! transport, connectivity oracle, wall clock). Every other crate in the workspace
//! builds on the types defined here.

pub mod error;
pub mod report;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DialtoneError;
pub use report::{
    EnvelopeInfo, FeedbackPayload, Report, ReportPayload, ReportSet, UrlUsagePayload,
};
pub use types::{AdapterType, ChannelKey, HealthStatus, is_accepted_status};

// Re-export all adapter traits at crate root.
pub use traits::{
    Clock, ConnectivityOracle, PluginAdapter, ReportStore, ReportTransport, SystemClock,
};
