use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderStatusType, UpdateOrderRequest};

/// Persistence contract for order documents.
///
/// The store is deliberately weak: no transactions, no uniqueness constraints, no upsert.
/// It models a plain (possibly eventually-consistent) document store. All uniqueness in the
/// system is advisory, computed by the duplicate detector over [`OrderStore::fetch_orders`]
/// at write time. A backend that *does* support conditional writes ("insert if no row
/// matches this payment id / request id") should use them in
/// [`OrderStore::insert_order`] to close the scan-then-write race window; the trait permits
/// but does not require that.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Clone {
    /// The URL or identifier of the backing store.
    fn url(&self) -> &str;

    /// Fetches the full order list, ordered by creation time ascending.
    ///
    /// There is no pagination: duplicate detection needs the complete set, and callers
    /// accept the O(n) scan cost per creation attempt.
    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderStoreError>;

    /// Fetches a single order by its store-assigned id.
    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError>;

    /// Fetches all orders for the given customer email, ordered by creation time ascending.
    async fn fetch_orders_by_email(&self, email: &str) -> Result<Vec<Order>, OrderStoreError>;

    /// Persists a candidate order, assigning the id and timestamps. The caller has already
    /// decided the candidate is not a duplicate; the store just writes.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Applies a partial update to an order and returns the updated record, or `None` if no
    /// order with that id exists.
    async fn update_order(&self, id: i64, update: UpdateOrderRequest) -> Result<Option<Order>, OrderStoreError>;

    /// Sets the status for an order, bumping `updated_at`. Transition legality is the
    /// caller's concern, not the store's.
    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, OrderStoreError>;

    /// Deletes an order. Returns `true` if a record was removed.
    async fn delete_order(&self, id: i64) -> Result<bool, OrderStoreError>;

    /// Closes the store connection.
    async fn close(&mut self) -> Result<(), OrderStoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Internal store engine error: {0}")]
    DatabaseError(String),
    #[error("The requested order (id {0}) does not exist")]
    OrderNotFound(i64),
    #[error("Stored order document could not be decoded: {0}")]
    MalformedOrder(String),
    #[error("The requested update would not change anything")]
    UpdateNoOp,
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}
