//! An in-memory implementation of [`OrderStore`].
//!
//! This is the honest model of the storage layer the reconciliation design targets: a plain
//! document store with no transactions and no uniqueness constraints. It backs the
//! deterministic test suite and works as a throwaway backend for demos; production
//! deployments use [`SqliteOrderStore`](crate::SqliteOrderStore).
use std::sync::Arc;

use chrono::Utc;
use log::debug;
use tokio::sync::RwLock;

use crate::{
    db_types::{NewOrder, Order, OrderStatusType, UpdateOrderRequest},
    traits::{OrderStore, OrderStoreError},
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    orders: Vec<Order>,
}

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites an order's creation time. Document stores let callers write arbitrary field
    /// values; the deterministic tests use this to age records past the match window.
    pub async fn backdate_order(&self, id: i64, created_at: chrono::DateTime<Utc>) -> bool {
        let mut inner = self.inner.write().await;
        match inner.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.created_at = created_at;
                true
            },
            None => false,
        }
    }
}

impl OrderStore for MemoryOrderStore {
    fn url(&self) -> &str {
        "memory://orders"
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderStoreError> {
        let inner = self.inner.read().await;
        // Insertion order is creation order, so this is already created_at ascending.
        Ok(inner.orders.clone())
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn fetch_orders_by_email(&self, email: &str) -> Result<Vec<Order>, OrderStoreError> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().filter(|o| o.customer.email == email).cloned().collect())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let now = Utc::now();
        let order = Order {
            id: inner.next_id,
            order_number: order.order_number,
            request_id: order.request_id,
            payment_id: order.payment_id,
            customer: order.customer,
            items: order.items,
            subtotal: order.subtotal,
            shipping: order.shipping,
            total: order.total,
            status: order.status.unwrap_or(OrderStatusType::Pending),
            email_sent: order.email_sent,
            created_at: now,
            updated_at: now,
        };
        debug!("🗃️ Order {} inserted with id {}", order.order_number, order.id);
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn update_order(&self, id: i64, update: UpdateOrderRequest) -> Result<Option<Order>, OrderStoreError> {
        if update.is_empty() {
            return Err(OrderStoreError::UpdateNoOp);
        }
        let mut inner = self.inner.write().await;
        let Some(order) = inner.orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        if let Some(status) = update.new_status {
            order.status = status;
        }
        if let Some(email_sent) = update.new_email_sent {
            order.email_sent = email_sent;
        }
        if let Some(instructions) = update.new_special_instructions {
            order.customer.special_instructions = instructions;
        }
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, OrderStoreError> {
        let mut inner = self.inner.write().await;
        let order = inner.orders.iter_mut().find(|o| o.id == id).ok_or(OrderStoreError::OrderNotFound(id))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: i64) -> Result<bool, OrderStoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.orders.len();
        inner.orders.retain(|o| o.id != id);
        Ok(inner.orders.len() < before)
    }
}
