//! Row leases serializing read-modify-write sequences on one obligation.
//!
//! A lease is taken before an obligation (or card) is charged and released
//! when the guard drops, which the charge pass arranges to happen only after
//! the owning batch has committed or rolled back.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-wide table of held leases.
#[derive(Debug, Default)]
pub struct LeaseRegistry {
    held: Mutex<HashSet<String>>,
}

impl LeaseRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn obligation_key(obligation_id: &str) -> String {
        format!("obligation:{}", obligation_id)
    }

    pub fn card_key(credit_card_id: &str) -> String {
        format!("card:{}", credit_card_id)
    }

    fn table(&self) -> MutexGuard<'_, HashSet<String>> {
        // A panic while holding the table cannot leave it half-updated.
        self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Takes the lease on `key`, or `None` when another holder has it.
    pub fn try_acquire(self: &Arc<Self>, key: impl Into<String>) -> Option<Lease> {
        let key = key.into();
        if !self.table().insert(key.clone()) {
            return None;
        }
        Some(Lease {
            registry: Arc::clone(self),
            key,
        })
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.table().contains(key)
    }

    pub fn held_count(&self) -> usize {
        self.table().len()
    }
}

/// A held lease; released on drop.
#[derive(Debug)]
pub struct Lease {
    registry: Arc<LeaseRegistry>,
    key: String,
}

impl Lease {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.registry.table().remove(&self.key);
    }
}
