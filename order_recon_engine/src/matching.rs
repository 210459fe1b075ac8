//! Duplicate detection over the full order list.
//!
//! Up to three mutually-unaware writers can try to create "the same" order: the buyer's
//! browser after payment confirmation, the payment-processor callback, and an admin undo of a
//! delete. The store enforces no uniqueness, so this module is the only thing standing
//! between a checkout session and a duplicate record.
//!
//! [`find_duplicate`] is pure and deterministic: rules are evaluated in strict priority
//! order and the first match wins. Exact identifiers (idempotency token, processor payment
//! id) are authoritative; the content/time-window rule is a best-effort fallback for retries
//! where no stable identifier survived (e.g. a reload regenerated a fresh token).
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use sor_common::trimmed_non_empty;

use crate::db_types::{NewOrder, Order};

/// How far back the content/time-window rule looks for an earlier copy of the same order.
///
/// Wide enough to tolerate realistic network and retry delay between the browser path and
/// the processor callback; narrow enough to bound false positives from genuine repeat
/// purchases by the same customer.
pub fn match_window() -> Duration {
    Duration::minutes(5)
}

/// Given a candidate and the full existing-order list, decide whether the candidate already
/// exists and return the matching record if so.
///
/// Rule priority, first match wins:
/// 1. Token match: the candidate carries a `request_id` and an existing order has the same
///    `request_id` or the same `order_number`.
/// 2. Payment match: the candidate carries a (non-whitespace) `payment_id` that an existing
///    order already holds.
/// 3. Content/time-window match: an order for the same email created less than
///    [`match_window`] ago, with an identical item list (same ids and quantities, same
///    order) and the same total, or one where exactly one of the two first names is the
///    `"Valued Customer"` placeholder.
///
/// On a match the existing record is canonical and is returned unchanged; the candidate's
/// (possibly better) data is **not** merged in. Only the duplicate write is avoided.
pub fn find_duplicate<'a>(candidate: &NewOrder, existing: &'a [Order], now: DateTime<Utc>) -> Option<&'a Order> {
    if let Some(token) = trimmed_non_empty(candidate.request_id.as_deref()) {
        if let Some(order) = existing
            .iter()
            .find(|o| o.request_id.as_deref() == Some(token) || o.order_number == candidate.order_number)
        {
            debug!("🔍️ Candidate {} matched existing order {} by token", candidate.order_number, order.order_number);
            return Some(order);
        }
    }

    if let Some(payment_id) = trimmed_non_empty(candidate.payment_id.as_deref()) {
        if let Some(order) = existing.iter().find(|o| o.payment_id.as_deref() == Some(payment_id)) {
            debug!(
                "🔍️ Candidate {} matched existing order {} by payment id {payment_id}",
                candidate.order_number, order.order_number
            );
            return Some(order);
        }
    }

    let recent =
        existing.iter().filter(|o| o.customer.email == candidate.customer.email && now - o.created_at < match_window());
    for order in recent {
        if same_cart(candidate, order) {
            debug!(
                "🔍️ Candidate {} matched existing order {} by cart contents within the window",
                candidate.order_number, order.order_number
            );
            return Some(order);
        }
        if placeholder_mismatch(candidate, order) {
            debug!(
                "🔍️ Candidate {} matched existing order {} by the placeholder-name rule",
                candidate.order_number, order.order_number
            );
            return Some(order);
        }
    }
    None
}

/// Identical item lists (same id and quantity at every index) and totals within epsilon.
fn same_cart(candidate: &NewOrder, order: &Order) -> bool {
    order.items.len() == candidate.items.len()
        && order.items.iter().zip(&candidate.items).all(|(a, b)| a.id == b.id && a.quantity == b.quantity)
        && order.total.approx_eq(candidate.total)
}

/// Exactly one of the two first names is the placeholder. One writer knew the customer and
/// the other did not; same email plus the window is enough to call them the same order.
fn placeholder_mismatch(candidate: &NewOrder, order: &Order) -> bool {
    order.customer.has_placeholder_name() != candidate.customer.has_placeholder_name()
}

//--------------------------------------   Reconciliation audit   ----------------------------------------------------

/// A finding from the offline reconciliation audit. The audit is advisory: it never blocks a
/// write, it reports invariants that the heuristic gate could not (or did not) hold.
///
/// Findings travel over the admin audit endpoint, so the wire names are camelCase like the
/// other order document types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditFinding {
    /// An order with no line items. Cannot have come from a real checkout.
    #[serde(rename_all = "camelCase")]
    FakeOrder { id: i64 },
    /// Two or more orders share a payment id, which the processor guarantees is unique per
    /// successful charge.
    #[serde(rename_all = "camelCase")]
    DuplicatePaymentId { payment_id: String, order_ids: Vec<i64> },
    /// Two or more orders share an idempotency token.
    #[serde(rename_all = "camelCase")]
    DuplicateRequestId { request_id: String, order_ids: Vec<i64> },
}

/// Scans the full order list for reconciliation invariant violations.
pub fn audit_orders(orders: &[Order]) -> Vec<AuditFinding> {
    let mut findings = Vec::new();
    for order in orders.iter().filter(|o| o.is_fake()) {
        findings.push(AuditFinding::FakeOrder { id: order.id });
    }
    findings.extend(duplicate_key_findings(orders, |o| o.payment_id.as_deref(), |key, ids| {
        AuditFinding::DuplicatePaymentId { payment_id: key, order_ids: ids }
    }));
    findings.extend(duplicate_key_findings(orders, |o| o.request_id.as_deref(), |key, ids| {
        AuditFinding::DuplicateRequestId { request_id: key, order_ids: ids }
    }));
    findings
}

fn duplicate_key_findings<K, F>(orders: &[Order], key: K, finding: F) -> Vec<AuditFinding>
where
    K: Fn(&Order) -> Option<&str>,
    F: Fn(String, Vec<i64>) -> AuditFinding,
{
    let mut seen: Vec<(&str, Vec<i64>)> = Vec::new();
    for order in orders {
        let Some(k) = trimmed_non_empty(key(order)) else { continue };
        match seen.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, ids)) => ids.push(order.id),
            None => seen.push((k, vec![order.id])),
        }
    }
    seen.into_iter().filter(|(_, ids)| ids.len() > 1).map(|(k, ids)| finding(k.to_string(), ids)).collect()
}
