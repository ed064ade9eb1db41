// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Online/offline oracle consulted before every dispatch.

/// Reports whether the device currently has network connectivity.
///
/// Queried synchronously at dispatch time; when it answers `false` the
/// engine fails the request immediately instead of waiting for a timeout.
pub trait ConnectivityOracle: Send + Sync + 'static {
    /// Returns `true` when a request has a chance of reaching the collector.
    fn is_online(&self) -> bool;
}
