// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity oracles.

use std::sync::atomic::{AtomicBool, Ordering};

use dialtone_core::ConnectivityOracle;

/// Oracle for hosts without a platform network monitor. Always answers online
/// and lets the transport's timeout decide.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

impl ConnectivityOracle for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Oracle whose answer is flipped by whoever watches the network.
#[derive(Debug)]
pub struct SwitchableConnectivity {
    online: AtomicBool,
}

impl SwitchableConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Default for SwitchableConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityOracle for SwitchableConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switchable_follows_last_write() {
        let oracle = SwitchableConnectivity::new(true);
        assert!(oracle.is_online());
        oracle.set_online(false);
        assert!(!oracle.is_online());
        oracle.set_online(true);
        assert!(oracle.is_online());
    }

    #[test]
    fn always_online_is_online() {
        assert!(AlwaysOnline.is_online());
    }
}
