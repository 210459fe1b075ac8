use thiserror::Error;

use crate::{db_types::OrderStatusType, traits::OrderStoreError};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    /// The candidate is missing required fields (items, names, a usable email) or its
    /// amounts do not add up. Surfaced to the caller; the system never retries these.
    #[error("Invalid order: {0}")]
    ValidationError(String),
    /// The candidate's identity is the synthetic placeholder with nothing to back it up.
    /// Guards against orders built from incomplete payment-processor callback data.
    #[error("Incomplete customer identity: {0}")]
    PlaceholderCustomer(String),
    #[error("An order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("The requested order (id {0}) does not exist")]
    OrderNotFound(i64),
    #[error("No recently deleted order with id {0}. The undo window may have lapsed.")]
    NothingToRestore(i64),
    #[error("{0}")]
    StoreError(#[from] OrderStoreError),
}
