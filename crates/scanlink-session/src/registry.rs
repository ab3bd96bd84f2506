//! Scanner registry.
//!
//! Holds the scanners the gateway has reported as discoverable (`available`)
//! and those holding an established session (`active`). Both sets are kept as
//! insertion-ordered vectors keyed by id; scanner populations are small
//! enough that a linear scan beats hashing and keeps first-seen order for
//! free.
//!
//! All mutations are idempotent. Re-adding an id updates the record in place
//! without moving it, removing an absent id does nothing.

use scanlink_core::{ScannerId, ScannerRecord, constants::UNKNOWN_NAME};

/// In-memory set of known and connected scanners.
#[derive(Debug, Clone, Default)]
pub struct ScannerRegistry {
    available: Vec<ScannerRecord>,
    active: Vec<ScannerRecord>,
}

impl ScannerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a discoverable scanner.
    pub fn upsert_available(&mut self, record: ScannerRecord) {
        upsert(&mut self.available, record);
    }

    /// Drop a scanner from the discoverable set.
    ///
    /// Returns the removed record, if any.
    pub fn remove_available(&mut self, id: ScannerId) -> Option<ScannerRecord> {
        remove(&mut self.available, id)
    }

    /// Mark a scanner as holding a session.
    pub fn add_active(&mut self, record: ScannerRecord) {
        upsert(&mut self.active, record);
    }

    /// Clear a scanner's session.
    ///
    /// Returns the removed record, if any.
    pub fn remove_active(&mut self, id: ScannerId) -> Option<ScannerRecord> {
        remove(&mut self.active, id)
    }

    /// Remove a scanner from both sets.
    ///
    /// Returns `true` if anything was removed.
    pub fn forget(&mut self, id: ScannerId) -> bool {
        let was_available = self.remove_available(id).is_some();
        let was_active = self.remove_active(id).is_some();
        was_available || was_active
    }

    /// Stored record for an id, preferring the available entry.
    pub fn get(&self, id: ScannerId) -> Option<&ScannerRecord> {
        self.available
            .iter()
            .chain(self.active.iter())
            .find(|r| r.id == id)
    }

    pub fn is_active(&self, id: ScannerId) -> bool {
        self.active.iter().any(|r| r.id == id)
    }

    /// Whether the id is present in either set.
    pub fn contains(&self, id: ScannerId) -> bool {
        self.available.iter().any(|r| r.id == id) || self.is_active(id)
    }

    /// Merged copy of the registry with `is_active` computed.
    ///
    /// Available scanners come first in first-seen order, followed by active
    /// scanners whose available entry has been evicted, in activation order.
    pub fn snapshot(&self) -> Vec<ScannerRecord> {
        let mut scanners: Vec<ScannerRecord> = self
            .available
            .iter()
            .map(|r| r.clone().with_active(self.is_active(r.id)))
            .collect();

        scanners.extend(
            self.active
                .iter()
                .filter(|r| !self.available.iter().any(|a| a.id == r.id))
                .map(|r| r.clone().with_active(true)),
        );

        scanners
    }

    /// Name of a scanner, or `"Unknown"` if the id is not registered.
    pub fn lookup_name(&self, id: ScannerId) -> String {
        self.get(id)
            .map_or_else(|| UNKNOWN_NAME.to_string(), |r| r.name.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty() && self.active.is_empty()
    }
}

fn upsert(set: &mut Vec<ScannerRecord>, record: ScannerRecord) {
    let record = record.with_active(false);
    match set.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => *existing = record,
        None => set.push(record),
    }
}

fn remove(set: &mut Vec<ScannerRecord>, id: ScannerId) -> Option<ScannerRecord> {
    let index = set.iter().position(|r| r.id == id)?;
    Some(set.remove(index))
}
