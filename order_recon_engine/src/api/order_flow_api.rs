use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sor_common::{trimmed_non_empty, Money};

use crate::{
    api::{errors::OrderFlowError, order_objects::OrderStatistics, undo::UndoBuffer},
    db_types::{
        CustomerInfo,
        NewOrder,
        Order,
        OrderItem,
        OrderStatusType,
        PaymentSucceededEvent,
        PLACEHOLDER_FIRST_NAME,
    },
    events::{EventProducers, OrderCreatedEvent, OrderStatusChangedEvent},
    helpers::{is_valid_email, new_order_number, DEFAULT_ORDER_PREFIX},
    matching::{audit_orders, find_duplicate, AuditFinding},
    traits::OrderStore,
};

/// `OrderFlowApi` is the order creation coordinator plus the administrative order surface
/// (lifecycle transitions, statistics, delete/undo).
///
/// Every writer goes through [`OrderFlowApi::create_or_reuse`]: the buyer's browser (via the
/// checkout guard), the payment-processor fallback, and the admin undo path. The coordinator
/// has no notion of which caller invoked it and applies identical rules to all of them; that
/// symmetry is what makes the independent writers safe to race against each other.
///
/// The `fetch_orders` → `find_duplicate` → `insert_order` sequence is **not** atomic. Two
/// logically-identical candidates arriving within the same scan window can both be written;
/// the store offers no transactional upsert to close that gap, and the debounce on the
/// client path plus the processor's notification delay make it rare in practice. A backend
/// with conditional writes should close it inside [`OrderStore::insert_order`].
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
    undo: UndoBuffer,
    order_prefix: String,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, undo: UndoBuffer::default(), order_prefix: DEFAULT_ORDER_PREFIX.to_string() }
    }

    pub fn with_undo_buffer(mut self, undo: UndoBuffer) -> Self {
        self.undo = undo;
        self
    }

    /// Sets the prefix used for order numbers minted on the fallback creation path.
    pub fn with_order_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.order_prefix = prefix.into();
        self
    }
}

impl<B> OrderFlowApi<B>
where B: OrderStore
{
    /// Submit a candidate order, creating it at most once.
    ///
    /// Returns the persisted record and `true` if a new record was written, or the existing
    /// matching record and `false` if the candidate was recognised as a duplicate. On the
    /// reuse path the existing record is returned **unchanged**: better data carried by the
    /// candidate (a resolved payment id, a corrected name) is not merged in.
    ///
    /// A failing duplicate scan is treated as "no information": the create proceeds, since a
    /// possible duplicate beats a silently dropped order.
    pub async fn create_or_reuse(&self, mut candidate: NewOrder) -> Result<(Order, bool), OrderFlowError> {
        validate_candidate(&candidate)?;
        let existing = match self.db.fetch_orders().await {
            Ok(orders) => orders,
            Err(e) => {
                warn!("🔄️ Could not scan existing orders for duplicates ({e}). Proceeding as if the store were empty.");
                Vec::new()
            },
        };
        if let Some(duplicate) = find_duplicate(&candidate, &existing, Utc::now()) {
            info!(
                "🔄️ Candidate {} is a duplicate of existing order {} (id {}). Returning the existing record.",
                candidate.order_number, duplicate.order_number, duplicate.id
            );
            return Ok((duplicate.clone(), false));
        }
        if candidate.status.is_none() {
            candidate.status = Some(OrderStatusType::Pending);
        }
        let order = self.db.insert_order(candidate).await?;
        info!("🔄️ Order {} created with id {}", order.order_number, order.id);
        self.call_order_created_hook(&order).await;
        Ok((order, true))
    }

    /// The full order list, creation time ascending.
    pub async fn fetch_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        Ok(self.db.fetch_orders().await?)
    }

    pub async fn fetch_order(&self, id: i64) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_by_id(id).await?.ok_or(OrderFlowError::OrderNotFound(id))
    }

    /// Client-side existence check by payment id. Used by the checkout guard's pre-check;
    /// purely an optimisation, since the coordinator reaches the same conclusion.
    pub async fn fetch_order_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>, OrderFlowError> {
        let Some(payment_id) = trimmed_non_empty(Some(payment_id)) else {
            return Ok(None);
        };
        let orders = self.db.fetch_orders().await?;
        Ok(orders.into_iter().find(|o| o.payment_id.as_deref() == Some(payment_id)))
    }

    pub async fn statistics(&self) -> Result<OrderStatistics, OrderFlowError> {
        let orders = self.db.fetch_orders().await?;
        Ok(OrderStatistics::collect(&orders))
    }

    /// Runs the offline reconciliation audit over the full order list.
    pub async fn audit(&self) -> Result<Vec<AuditFinding>, OrderFlowError> {
        let orders = self.db.fetch_orders().await?;
        Ok(audit_orders(&orders))
    }

    /// Changes the status of an order.
    ///
    /// Legal transitions are `pending → processing → shipped → completed`, plus `cancelled`
    /// from any non-terminal state. Everything else, including self-transitions, fails with
    /// [`OrderFlowError::InvalidTransition`]. Transitions are assumed to be invoked serially
    /// per order by an administrative actor; concurrent updates are last-write-wins.
    pub async fn modify_status(&self, id: i64, new_status: OrderStatusType) -> Result<Order, OrderFlowError> {
        let order = self.fetch_order(id).await?;
        let old_status = order.status;
        if !old_status.can_transition_to(new_status) {
            debug!("🔄️ Rejected status change {old_status} → {new_status} for order {}", order.order_number);
            return Err(OrderFlowError::InvalidTransition { from: old_status, to: new_status });
        }
        let order = self.db.update_order_status(id, new_status).await?;
        info!("🔄️ Order {} moved from {old_status} to {new_status}", order.order_number);
        self.call_status_changed_hook(old_status, &order).await;
        Ok(order)
    }

    /// Deletes an order, retaining its content in memory for the undo grace period.
    pub async fn delete_order(&self, id: i64) -> Result<Order, OrderFlowError> {
        let order = self.fetch_order(id).await?;
        if !self.db.delete_order(id).await? {
            return Err(OrderFlowError::OrderNotFound(id));
        }
        info!("🔄️ Order {} (id {id}) deleted", order.order_number);
        self.undo.remember(id, NewOrder::from(order.clone()));
        Ok(order)
    }

    /// Undoes a recent delete by resubmitting the retained content through
    /// [`OrderFlowApi::create_or_reuse`].
    ///
    /// The payload kept its `request_id`/`payment_id`, so if the order somehow never left
    /// the store's list the resubmission is absorbed as a duplicate-reuse instead of a
    /// second write. A successful restore mints a **new** store identity; external
    /// references to the old id (receipt links and the like) are best-effort after an undo.
    pub async fn restore_order(&self, id: i64) -> Result<(Order, bool), OrderFlowError> {
        let payload = self.undo.reclaim(id).ok_or(OrderFlowError::NothingToRestore(id))?;
        let (order, created) = match self.create_or_reuse(payload.clone()).await {
            Ok(result) => result,
            Err(e) => {
                // Park the payload again so a retry within the grace period can still
                // restore after a transient store failure.
                self.undo.remember(id, payload);
                return Err(e);
            },
        };
        info!(
            "🔄️ Order {} restored as id {} ({})",
            order.order_number,
            order.id,
            if created { "re-created" } else { "absorbed as duplicate" }
        );
        Ok((order, created))
    }

    /// The fallback creation path, driven by the payment processor's "payment succeeded"
    /// notification.
    ///
    /// Builds a minimal single-line-item candidate from the event and submits it through the
    /// common coordinator. Every error is logged and swallowed here: the notification sender
    /// retries on failed acknowledgements, and a transient store error must not turn into a
    /// storm of re-deliveries. Returns the order when one was created or matched, purely for
    /// the caller's logging.
    pub async fn handle_payment_succeeded(&self, event: PaymentSucceededEvent) -> Option<Order> {
        let payment_id = event.payment_id.clone();
        debug!("💸️ Payment succeeded notification received for {payment_id} ({})", event.amount);
        let candidate = candidate_from_payment_event(event, &self.order_prefix);
        match self.create_or_reuse(candidate).await {
            Ok((order, true)) => {
                info!("💸️ Fallback path created order {} for payment {payment_id}", order.order_number);
                Some(order)
            },
            Ok((order, false)) => {
                info!(
                    "💸️ Payment {payment_id} matched existing order {} (id {}). Nothing to do.",
                    order.order_number, order.id
                );
                Some(order)
            },
            Err(e) => {
                warn!("💸️ Fallback order creation for payment {payment_id} failed and was discarded. {e}");
                None
            },
        }
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            trace!("🔄️ Notifying order created subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone())).await;
        }
    }

    async fn call_status_changed_hook(&self, old_status: OrderStatusType, order: &Order) {
        for emitter in &self.producers.status_changed_producer {
            trace!("🔄️ Notifying status changed subscribers");
            emitter.publish_event(OrderStatusChangedEvent::new(old_status, order.clone())).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

/// Candidate validation, applied identically to every caller.
fn validate_candidate(candidate: &NewOrder) -> Result<(), OrderFlowError> {
    if candidate.items.is_empty() {
        return Err(OrderFlowError::ValidationError("an order must contain at least one item".to_string()));
    }
    if !is_valid_email(&candidate.customer.email) {
        return Err(OrderFlowError::ValidationError(format!(
            "missing or invalid customer email address: '{}'",
            candidate.customer.email
        )));
    }
    let first_name = candidate.customer.first_name.trim();
    let last_name = candidate.customer.last_name.trim();
    if first_name.is_empty() || (candidate.customer.has_placeholder_name() && last_name.is_empty()) {
        return Err(OrderFlowError::PlaceholderCustomer(
            "the customer identity is empty or a bare placeholder".to_string(),
        ));
    }
    if last_name.is_empty() {
        return Err(OrderFlowError::ValidationError("missing customer last name".to_string()));
    }
    if !candidate.total.is_sum_of(candidate.subtotal, candidate.shipping) {
        return Err(OrderFlowError::ValidationError(format!(
            "total {} does not equal subtotal {} plus shipping {}",
            candidate.total, candidate.subtotal, candidate.shipping
        )));
    }
    Ok(())
}

/// Builds the minimal candidate for a processor notification: one synthetic line item for
/// the charged amount, no shipping split, and whatever identity the event carried. An absent
/// payer name becomes the full placeholder identity ("Valued Customer Customer"); an absent
/// email is left empty and rejected by validation further down.
fn candidate_from_payment_event(event: PaymentSucceededEvent, order_prefix: &str) -> NewOrder {
    let (first_name, last_name) = match trimmed_non_empty(event.payer_name.as_deref()) {
        Some(name) => {
            let mut parts = name.split_whitespace();
            let first = parts.next().unwrap_or(PLACEHOLDER_FIRST_NAME).to_string();
            let rest = parts.collect::<Vec<_>>().join(" ");
            let last = if rest.is_empty() { "Customer".to_string() } else { rest };
            (first, last)
        },
        None => (PLACEHOLDER_FIRST_NAME.to_string(), "Customer".to_string()),
    };
    let email = event.payer_email.unwrap_or_default();
    let customer = CustomerInfo::new(first_name, last_name, email);
    let item = OrderItem::new("payment", format!("Online payment {}", event.payment_id), 1, event.amount);
    NewOrder::new(new_order_number(order_prefix), customer, vec![item])
        .with_shipping(Money::ZERO)
        .with_payment_id(event.payment_id)
}
