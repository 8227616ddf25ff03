// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-identity serialisation of inbound message handling.

use std::sync::Arc;

use dashmap::DashMap;
use meterwise_core::ChannelIdentity;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per channel identity. Messages from the same chat are
/// handled one at a time; different chats proceed in parallel.
///
/// Entries exist only while some task holds or waits for the lock.
#[derive(Debug, Default)]
pub struct IdentityLocks {
    locks: DashMap<ChannelIdentity, Arc<Mutex<()>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `identity`.
    pub async fn acquire(&self, identity: &ChannelIdentity) -> IdentityGuard<'_> {
        let lock = self
            .locks
            .entry(identity.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        IdentityGuard {
            guard: Some(lock.lock_owned().await),
            identity: identity.clone(),
            locks: &self.locks,
        }
    }

    /// Number of identities currently locked or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one identity. Dropping it releases the lock and
/// forgets the identity when no other task is queued on it.
#[derive(Debug)]
pub struct IdentityGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    identity: ChannelIdentity,
    locks: &'a DashMap<ChannelIdentity, Arc<Mutex<()>>>,
}

impl Drop for IdentityGuard<'_> {
    fn drop(&mut self) {
        // Release first so our own Arc no longer counts.
        self.guard.take();
        self.locks
            .remove_if(&self.identity, |_, lock| Arc::strong_count(lock) == 1);
    }
}
