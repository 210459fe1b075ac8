//! Order Reconciliation Engine
//!
//! The storefront's checkout has up to three independent, mutually-unaware writers that can
//! each try to create "the same" order: the buyer's browser after a payment confirmation,
//! the payment processor's success callback, and an administrative undo of a delete. The
//! backing store is a plain document store with no transactions and no unique constraints,
//! so at-most-once creation cannot be delegated to the storage layer.
//!
//! This library is that guarantee, to the extent it can be given heuristically:
//! * [`matching`] is the pure duplicate detector: exact identifier rules (idempotency
//!   token, processor payment id) followed by a bounded content/time-window heuristic.
//! * [`OrderFlowApi`] is the creation coordinator every writer goes through, plus the
//!   lifecycle state machine, statistics, and delete/undo.
//! * [`checkout`] is the per-session client-side guard (single-flight, debounce, pre-check).
//! * Storage backends sit behind the [`traits::OrderStore`] trait: SQLite for production,
//!   an in-memory document store for tests and the deterministic property suite.
//!
//! The engine also emits events (order created, status changed) through a small async hook
//! system so that follow-up actions such as confirmation emails can subscribe without being
//! wired into the order flow.
pub mod checkout;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod matching;
pub mod memory;
pub mod traits;

mod api;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{OrderFlowApi, OrderFlowError, OrderStatistics, UndoBuffer};
pub use memory::MemoryOrderStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteOrderStore;
