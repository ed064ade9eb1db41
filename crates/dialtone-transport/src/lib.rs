// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound side of the Dialtone report-delivery engine.
//!
//! [`HttpTransport`] posts encoded reports to a collector with a hard
//! per-request timeout. The connectivity oracles answer the engine's
//! "is it worth trying" question before each dispatch.

pub mod connectivity;
pub mod http;

pub use connectivity::{AlwaysOnline, SwitchableConnectivity};
pub use http::HttpTransport;
