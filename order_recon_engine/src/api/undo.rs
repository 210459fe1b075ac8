use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use log::debug;

use crate::db_types::NewOrder;

/// Default length of the undo window after a delete.
pub const DEFAULT_UNDO_GRACE: Duration = Duration::from_secs(5);

struct Entry {
    id: i64,
    payload: NewOrder,
    deleted_at: Instant,
}

/// Grace-period retention for deleted orders.
///
/// A delete removes the record from the store but parks its content here for a short window
/// so an admin can undo it. The retained payload has already been stripped of store identity
/// (id, timestamps) and goes back through the creation coordinator on restore.
///
/// This is process-local state: a restart forfeits pending undos, which is acceptable for a
/// five-second window.
pub struct UndoBuffer {
    grace: Duration,
    entries: Mutex<Vec<Entry>>,
}

impl Default for UndoBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_GRACE)
    }
}

impl UndoBuffer {
    pub fn new(grace: Duration) -> Self {
        Self { grace, entries: Mutex::new(Vec::new()) }
    }

    /// Parks the stripped content of a just-deleted order under its old store id.
    pub fn remember(&self, id: i64, payload: NewOrder) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.retain(|e| e.deleted_at.elapsed() < self.grace && e.id != id);
        debug!("🗑️ Retaining deleted order id {id} for undo ({:?} window)", self.grace);
        entries.push(Entry { id, payload, deleted_at: Instant::now() });
    }

    /// Takes the retained payload back out, if the grace period has not lapsed.
    pub fn reclaim(&self, id: i64) -> Option<NewOrder> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.retain(|e| e.deleted_at.elapsed() < self.grace);
        let pos = entries.iter().position(|e| e.id == id)?;
        Some(entries.remove(pos).payload)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::{CustomerInfo, NewOrder, OrderItem};
    use sor_common::Money;

    fn payload() -> NewOrder {
        NewOrder::new(
            "ORD-1".into(),
            CustomerInfo::new("Jane", "Doe", "jane@example.com"),
            vec![OrderItem::new("sku-1", "Teapot", 1, Money::from(10.0))],
        )
    }

    #[test]
    fn reclaim_within_the_window() {
        let buffer = UndoBuffer::new(Duration::from_secs(5));
        buffer.remember(42, payload());
        let reclaimed = buffer.reclaim(42).expect("payload should still be retained");
        assert_eq!(reclaimed.order_number.as_str(), "ORD-1");
        // One-shot: a second reclaim finds nothing.
        assert!(buffer.reclaim(42).is_none());
    }

    #[test]
    fn reclaim_after_the_window_fails() {
        let buffer = UndoBuffer::new(Duration::from_millis(20));
        buffer.remember(42, payload());
        std::thread::sleep(Duration::from_millis(40));
        assert!(buffer.reclaim(42).is_none());
    }

    #[test]
    fn unknown_ids_are_not_reclaimable() {
        let buffer = UndoBuffer::default();
        buffer.remember(1, payload());
        assert!(buffer.reclaim(2).is_none());
    }
}
