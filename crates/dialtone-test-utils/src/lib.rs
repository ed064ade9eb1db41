// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for Dialtone integration tests.
//!
//! Provides in-process stand-ins for every external collaborator so engine
//! and scheduler tests run deterministically under paused tokio time.
//!
//! # Components
//!
//! - [`MemoryStore`] - HashMap-backed report store with write-failure injection
//! - [`ScriptedTransport`] - Transport replaying scripted outcomes and capturing dispatches
//! - [`ManualClock`] - Wall clock that follows tokio time and can be jumped
//! - [`SwitchableConnectivity`] - Connectivity oracle flipped by the test

pub mod clock;
pub mod memory_store;
pub mod scripted_transport;

pub use clock::ManualClock;
pub use dialtone_transport::SwitchableConnectivity;
pub use memory_store::MemoryStore;
pub use scripted_transport::{Dispatch, ScriptedResponse, ScriptedTransport};
