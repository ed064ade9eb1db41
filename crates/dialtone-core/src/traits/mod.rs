// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the engine's external collaborators.
//!
//! Store and transport adapters extend the [`PluginAdapter`] base trait and
//! use `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod clock;
pub mod connectivity;
pub mod storage;
pub mod transport;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use clock::{Clock, SystemClock};
pub use connectivity::ConnectivityOracle;
pub use storage::ReportStore;
pub use transport::ReportTransport;
