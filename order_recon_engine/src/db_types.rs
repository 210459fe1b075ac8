//! Core data types for the order reconciliation engine.
//!
//! Everything here is backend-agnostic. The SQLite layer maps these types onto rows (customer
//! and item payloads are stored as JSON text columns); the wire format uses camelCase field
//! names because the storefront clients are browser JavaScript.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sor_common::Money;
use sqlx::Type;
use thiserror::Error;

/// The synthetic first name substituted when a real customer identity was unavailable at
/// order-creation time (typically a payment-processor notification with no payer name).
pub const PLACEHOLDER_FIRST_NAME: &str = "Valued Customer";

//--------------------------------------   OrderNumber   -------------------------------------------------------------
/// The human-readable order identifier generated by the creating caller.
///
/// Unlike the store-assigned `id`, an order number exists before persistence. It is unique by
/// convention only (prefix + timestamp + random suffix); the store enforces nothing.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been created and is awaiting fulfilment.
    Pending,
    /// The order is being picked and packed.
    Processing,
    /// The order has been handed to the carrier.
    Shipped,
    /// The order has been delivered. Terminal.
    Completed,
    /// The order was cancelled by the customer or an admin. Terminal.
    Cancelled,
}

impl OrderStatusType {
    /// The fulfilment state machine.
    ///
    /// `Pending → Processing → Shipped → Completed`, with `Cancelled` reachable from any
    /// non-terminal state. Everything else, including self-transitions, is rejected.
    pub fn can_transition_to(self, new_status: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!(
            (self, new_status),
            (Pending, Processing) | (Processing, Shipped) | (Shipped, Completed) |
            (Pending | Processing | Shipped, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatusType::Completed | OrderStatusType::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Processing => write!(f, "processing"),
            OrderStatusType::Shipped => write!(f, "shipped"),
            OrderStatusType::Completed => write!(f, "completed"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to pending");
            OrderStatusType::Pending
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for OrderStatusType {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   CustomerInfo   ------------------------------------------------------------
/// Customer identity and delivery details as captured at checkout.
///
/// The email address is the join key for the soft duplicate-matching rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub special_instructions: String,
}

impl CustomerInfo {
    pub fn new<S1: Into<String>, S2: Into<String>, S3: Into<String>>(first_name: S1, last_name: S2, email: S3) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    /// True if the first name is the synthetic "unknown customer" identity.
    pub fn has_placeholder_name(&self) -> bool {
        self.first_name == PLACEHOLDER_FIRST_NAME
    }
}

//--------------------------------------   OrderItem   ---------------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: Money,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
}

impl OrderItem {
    pub fn new<S1: Into<String>, S2: Into<String>>(id: S1, name: S2, quantity: u32, price: Money) -> Self {
        Self { id: id.into(), name: name.into(), quantity, price, ..Default::default() }
    }
}

//--------------------------------------   Order   -------------------------------------------------------------------
/// A persisted order document. Only the store creates these; the `id` and timestamps are
/// store-assigned and never client-supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    /// Idempotency token generated once per checkout attempt by the browser. Empty for
    /// fallback-created orders.
    pub request_id: Option<String>,
    /// Identifier from the external payment processor. The strongest duplicate signal when
    /// present, since the processor guarantees it is unique per successful charge.
    pub payment_id: Option<String>,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub status: OrderStatusType,
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// An order without line items cannot have come from a real checkout. Fake orders are
    /// excluded from statistics and flagged by the reconciliation audit.
    pub fn is_fake(&self) -> bool {
        self.items.is_empty()
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order {} ({} items, {}, {}, {})",
            self.order_number,
            self.items.len(),
            self.total,
            self.status,
            self.customer.email
        )
    }
}

//--------------------------------------   NewOrder   ----------------------------------------------------------------
/// A candidate order: an in-memory payload not yet confirmed to be new or a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_number: OrderNumber,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    /// Defaulted to `pending` by the coordinator when unset.
    #[serde(default)]
    pub status: Option<OrderStatusType>,
    #[serde(default)]
    pub email_sent: bool,
}

impl NewOrder {
    pub fn new(order_number: OrderNumber, customer: CustomerInfo, items: Vec<OrderItem>) -> Self {
        let subtotal = items.iter().fold(Money::ZERO, |acc, item| acc + Money::from(item.price.value() * f64::from(item.quantity)));
        Self {
            order_number,
            request_id: None,
            payment_id: None,
            customer,
            items,
            subtotal,
            shipping: Money::ZERO,
            total: subtotal,
            status: None,
            email_sent: false,
        }
    }

    pub fn with_request_id<S: Into<String>>(mut self, request_id: S) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_payment_id<S: Into<String>>(mut self, payment_id: S) -> Self {
        self.payment_id = Some(payment_id.into());
        self
    }

    /// Sets the shipping amount and recalculates the total as `subtotal + shipping`. The
    /// shipping value itself comes from the external rate calculator.
    pub fn with_shipping(mut self, shipping: Money) -> Self {
        self.shipping = shipping;
        self.total = self.subtotal + shipping;
        self
    }
}

/// Re-submission payload for delete/undo: the order content minus the store-assigned
/// identity and timestamp fields. `request_id` and `payment_id` survive, so a restore of an
/// order that never actually left the store is absorbed as a duplicate-reuse.
impl From<Order> for NewOrder {
    fn from(order: Order) -> Self {
        Self {
            order_number: order.order_number,
            request_id: order.request_id,
            payment_id: order.payment_id,
            customer: order.customer,
            items: order.items,
            subtotal: order.subtotal,
            shipping: order.shipping,
            total: order.total,
            status: Some(order.status),
            email_sent: order.email_sent,
        }
    }
}

//--------------------------------------   UpdateOrderRequest   ------------------------------------------------------
/// Partial-update request for an order record. Empty requests are rejected by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    pub new_status: Option<OrderStatusType>,
    pub new_email_sent: Option<bool>,
    pub new_special_instructions: Option<String>,
}

impl UpdateOrderRequest {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.new_status = Some(status);
        self
    }

    pub fn with_email_sent(mut self, email_sent: bool) -> Self {
        self.new_email_sent = Some(email_sent);
        self
    }

    pub fn with_special_instructions<S: Into<String>>(mut self, instructions: S) -> Self {
        self.new_special_instructions = Some(instructions.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.new_status.is_none() && self.new_email_sent.is_none() && self.new_special_instructions.is_none()
    }
}

//--------------------------------------   PaymentSucceededEvent   ---------------------------------------------------
/// The "payment succeeded" notification pushed by the external payment processor.
///
/// Delivery is at-least-once with arbitrary delay; the payer identity is best-effort and
/// frequently just an email address, or nothing at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSucceededEvent {
    pub payment_id: String,
    pub amount: Money,
    #[serde(default)]
    pub payer_email: Option<String>,
    #[serde(default)]
    pub payer_name: Option<String>,
}
