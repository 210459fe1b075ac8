use serde::{Deserialize, Serialize};
use sor_common::Money;

use crate::db_types::{Order, OrderStatusType};

/// Aggregate order statistics for the admin dashboard.
///
/// Fake orders (zero items) are excluded from every figure here except their own count;
/// cancelled orders are counted but contribute nothing to revenue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total_orders: usize,
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total_revenue: Money,
    pub fake_orders: usize,
}

impl OrderStatistics {
    pub fn collect(orders: &[Order]) -> Self {
        let mut stats = OrderStatistics::default();
        for order in orders {
            if order.is_fake() {
                stats.fake_orders += 1;
                continue;
            }
            stats.total_orders += 1;
            match order.status {
                OrderStatusType::Pending => stats.pending += 1,
                OrderStatusType::Processing => stats.processing += 1,
                OrderStatusType::Shipped => stats.shipped += 1,
                OrderStatusType::Completed => stats.completed += 1,
                OrderStatusType::Cancelled => stats.cancelled += 1,
            }
            if order.status != OrderStatusType::Cancelled {
                stats.total_revenue += order.total;
            }
        }
        stats
    }
}
