//! Client-side checkout protection.
//!
//! A single buyer action (clicking "place order") must invoke the creation coordinator at
//! most once, even under double-clicks, reloads and impatient retries. The guard is an
//! explicit per-session struct, one per checkout session and owned by that session's
//! context, so that two concurrent sessions (two browser tabs, say) cannot interfere with
//! each other's debounce state.
use std::time::{Duration, Instant};

use log::*;
use thiserror::Error;

use crate::{
    api::{OrderFlowApi, OrderFlowError},
    db_types::{NewOrder, Order},
    helpers::is_valid_email,
    traits::OrderStore,
};

/// Minimum spacing between creation attempts from one session.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// Where a checkout session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Nothing submitted yet.
    Idle,
    /// The buyer has confirmed payment and the session may submit the order.
    AwaitingPayment,
    /// A creation call is outstanding.
    Creating,
    /// An order exists for this session. Terminal.
    Done,
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("An order creation call is already in flight for this session")]
    CreationInProgress,
    #[error("This checkout session has already produced an order")]
    AlreadyCompleted,
    #[error("Please wait a moment before retrying")]
    TooSoon,
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Please complete your name and email address")]
    IncompleteCustomer,
    #[error("{0}")]
    Flow(#[from] OrderFlowError),
}

/// Single-flight / debounce guard for one checkout session.
pub struct CheckoutGuard {
    phase: CheckoutPhase,
    last_attempt: Option<Instant>,
    debounce: Duration,
}

impl Default for CheckoutGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutGuard {
    pub fn new() -> Self {
        Self { phase: CheckoutPhase::Idle, last_attempt: None, debounce: DEFAULT_DEBOUNCE }
    }

    /// Overrides the debounce interval. Tests use this; real sessions keep the default.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Marks the session as having received a payment confirmation.
    pub fn payment_confirmed(&mut self) {
        if self.phase == CheckoutPhase::Idle {
            self.phase = CheckoutPhase::AwaitingPayment;
        }
    }

    /// Submits the session's order through the coordinator, at most once.
    ///
    /// Refuses when a call is already outstanding, when the session is done, or when the
    /// last attempt was under the debounce interval ago. Cart and customer problems are
    /// reported locally, mirroring coordinator validation, so the buyer gets feedback
    /// without a network round trip. When the candidate carries a payment id, a cheap
    /// existence pre-check short-circuits straight to `Done`; an optimisation only, since
    /// the coordinator would reach the same conclusion.
    pub async fn submit<B: OrderStore>(
        &mut self,
        api: &OrderFlowApi<B>,
        candidate: NewOrder,
    ) -> Result<Order, CheckoutError> {
        match self.phase {
            CheckoutPhase::Creating => return Err(CheckoutError::CreationInProgress),
            CheckoutPhase::Done => return Err(CheckoutError::AlreadyCompleted),
            CheckoutPhase::Idle | CheckoutPhase::AwaitingPayment => {},
        }
        if let Some(last) = self.last_attempt {
            if last.elapsed() < self.debounce {
                debug!("🛒️ Debounced a creation attempt {:?} after the last one", last.elapsed());
                return Err(CheckoutError::TooSoon);
            }
        }
        if candidate.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if !customer_fields_complete(&candidate) {
            return Err(CheckoutError::IncompleteCustomer);
        }
        self.last_attempt = Some(Instant::now());

        if let Some(payment_id) = candidate.payment_id.as_deref() {
            match api.fetch_order_by_payment_id(payment_id).await {
                Ok(Some(order)) => {
                    info!("🛒️ Pre-check found existing order {} for payment {payment_id}", order.order_number);
                    self.phase = CheckoutPhase::Done;
                    return Ok(order);
                },
                Ok(None) => {},
                // The pre-check is advisory; a failed scan falls through to the coordinator.
                Err(e) => debug!("🛒️ Payment pre-check failed ({e}); continuing to the coordinator"),
            }
        }

        self.phase = CheckoutPhase::Creating;
        match api.create_or_reuse(candidate).await {
            Ok((order, created)) => {
                self.phase = CheckoutPhase::Done;
                info!(
                    "🛒️ Checkout session finished with order {} ({})",
                    order.order_number,
                    if created { "created" } else { "reused" }
                );
                Ok(order)
            },
            Err(e) => {
                // Recovery edge: the session returns to idle so the buyer can retry
                // manually after the debounce interval.
                warn!("🛒️ Order creation failed for this session. {e}");
                self.phase = CheckoutPhase::Idle;
                Err(CheckoutError::Flow(e))
            },
        }
    }
}

fn customer_fields_complete(candidate: &NewOrder) -> bool {
    let customer = &candidate.customer;
    let placeholder_without_surname = customer.has_placeholder_name() && customer.last_name.trim().is_empty();
    !customer.first_name.trim().is_empty()
        && !customer.last_name.trim().is_empty()
        && !placeholder_without_surname
        && is_valid_email(&customer.email)
}

#[cfg(test)]
mod test {
    use sor_common::Money;

    use super::*;
    use crate::{
        db_types::{CustomerInfo, OrderItem, PLACEHOLDER_FIRST_NAME},
        events::EventProducers,
        memory::MemoryOrderStore,
    };

    fn api() -> OrderFlowApi<MemoryOrderStore> {
        OrderFlowApi::new(MemoryOrderStore::new(), EventProducers::default())
    }

    fn candidate(request_id: &str) -> NewOrder {
        NewOrder::new(
            "WEB-100".into(),
            CustomerInfo::new("Jane", "Doe", "jane@example.com"),
            vec![OrderItem::new("sku-1", "Teapot", 1, Money::from(10.0))],
        )
        .with_request_id(request_id)
    }

    #[tokio::test]
    async fn a_session_creates_at_most_one_order() {
        let api = api();
        let mut guard = CheckoutGuard::new().with_debounce(Duration::ZERO);
        guard.payment_confirmed();
        let order = guard.submit(&api, candidate("req-1")).await.unwrap();
        assert_eq!(guard.phase(), CheckoutPhase::Done);
        // The session refuses a second submission outright.
        let err = guard.submit(&api, candidate("req-1")).await.unwrap_err();
        assert!(matches!(err, CheckoutError::AlreadyCompleted));
        let all = api.fetch_orders().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, order.id);
    }

    #[tokio::test]
    async fn debounce_blocks_rapid_retries() {
        let api = api();
        let mut guard = CheckoutGuard::new().with_debounce(Duration::from_millis(50));
        // First attempt fails validation (empty email) and leaves the session idle.
        let mut bad = candidate("req-1");
        bad.customer.email = String::new();
        // Local validation catches the empty email before the debounce clock starts.
        assert!(matches!(guard.submit(&api, bad).await.unwrap_err(), CheckoutError::IncompleteCustomer));
        // A real attempt, then an immediate retry inside the debounce window.
        guard.submit(&api, candidate("req-1")).await.unwrap();
        let mut second = CheckoutGuard::new().with_debounce(Duration::from_millis(50));
        second.last_attempt = Some(Instant::now());
        let err = second.submit(&api, candidate("req-2")).await.unwrap_err();
        assert!(matches!(err, CheckoutError::TooSoon));
        // After the window lapses the retry goes through (and is absorbed as a duplicate).
        tokio::time::sleep(Duration::from_millis(60)).await;
        let order = second.submit(&api, candidate("req-1")).await.unwrap();
        assert_eq!(api.fetch_orders().await.unwrap().len(), 1);
        assert_eq!(order.request_id.as_deref(), Some("req-1"));
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_locally() {
        let api = api();
        let mut guard = CheckoutGuard::new().with_debounce(Duration::ZERO);
        let mut c = candidate("req-1");
        c.items.clear();
        assert!(matches!(guard.submit(&api, c).await.unwrap_err(), CheckoutError::EmptyCart));
        assert!(api.fetch_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn placeholder_customer_is_rejected_locally() {
        let api = api();
        let mut guard = CheckoutGuard::new().with_debounce(Duration::ZERO);
        let mut c = candidate("req-1");
        c.customer = CustomerInfo::new(PLACEHOLDER_FIRST_NAME, "", "jane@example.com");
        assert!(matches!(guard.submit(&api, c).await.unwrap_err(), CheckoutError::IncompleteCustomer));
    }

    #[tokio::test]
    async fn payment_precheck_short_circuits() {
        let api = api();
        let (existing, _) = api.create_or_reuse(candidate("req-1").with_payment_id("pay_9")).await.unwrap();
        let mut guard = CheckoutGuard::new().with_debounce(Duration::ZERO);
        let order = guard.submit(&api, candidate("req-2").with_payment_id("pay_9")).await.unwrap();
        assert_eq!(order.id, existing.id);
        assert_eq!(guard.phase(), CheckoutPhase::Done);
        assert_eq!(api.fetch_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_creation_returns_the_session_to_idle() {
        let api = api();
        let mut guard = CheckoutGuard::new().with_debounce(Duration::ZERO);
        let mut c = candidate("req-1");
        c.total = Money::from(999.0); // breaks the subtotal + shipping invariant
        let err = guard.submit(&api, c).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Flow(OrderFlowError::ValidationError(_))));
        assert_eq!(guard.phase(), CheckoutPhase::Idle);
        // The session can recover and submit a corrected order.
        guard.submit(&api, candidate("req-1")).await.unwrap();
        assert_eq!(guard.phase(), CheckoutPhase::Done);
    }
}
