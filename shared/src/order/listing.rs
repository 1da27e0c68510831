//! Back-office order listing: status filter, sort orders and dashboard stats

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::round_money;
use super::status::OrderStatus;
use crate::models::OrderDetail;

/// Sort order for the order list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    /// Most recent `order_date` first
    #[default]
    Newest,
    /// Largest `total_amount` first
    HighestPrice,
    /// Largest number of units first
    HighestSold,
}

/// List filter + sort, used as the query string of `GET /api/orders`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub sort: OrderSort,
}

impl OrderListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_sort(mut self, sort: OrderSort) -> Self {
        self.sort = sort;
        self
    }

    /// Filter then sort; the sort is stable so ties keep their input order
    pub fn apply(&self, orders: Vec<OrderDetail>) -> Vec<OrderDetail> {
        let mut result: Vec<OrderDetail> = match self.status {
            Some(status) => orders
                .into_iter()
                .filter(|o| o.order.status == status)
                .collect(),
            None => orders,
        };

        match self.sort {
            OrderSort::Newest => {
                result.sort_by(|a, b| b.order.order_date.cmp(&a.order.order_date));
            }
            OrderSort::HighestPrice => {
                result.sort_by(|a, b| b.order.total_amount.cmp(&a.order.total_amount));
            }
            OrderSort::HighestSold => {
                result.sort_by_key(|o| std::cmp::Reverse(o.item_count()));
            }
        }
        result
    }
}

/// Dashboard counters over a set of orders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    /// Sum of all order totals
    pub revenue: Decimal,
}

impl OrderStats {
    pub fn compute<'a, I>(orders: I) -> Self
    where
        I: IntoIterator<Item = &'a OrderDetail>,
    {
        let mut stats = Self::default();
        for detail in orders {
            stats.total += 1;
            match detail.order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Completed => stats.completed += 1,
                _ => {}
            }
            stats.revenue += detail.order.total_amount;
        }
        stats.revenue = round_money(stats.revenue);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Order, OrderItem};
    use chrono::{Duration, TimeZone, Utc};

    fn order(id: i64, minutes: i64, total: i64, qty: i32, status: OrderStatus) -> OrderDetail {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        OrderDetail {
            order: Order {
                order_id: id,
                customer_id: 1,
                order_date: base + Duration::minutes(minutes),
                total_amount: Decimal::new(total, 2),
                status,
                idempotency_key: None,
            },
            order_items: vec![OrderItem {
                order_item_id: id,
                order_id: id,
                item_id: 1,
                quantity: qty,
            }],
            payments: vec![],
        }
    }

    fn sample() -> Vec<OrderDetail> {
        vec![
            order(1, 0, 1000, 1, OrderStatus::Pending),
            order(2, 30, 2650, 3, OrderStatus::Completed),
            order(3, 10, 2650, 5, OrderStatus::Pending),
            order(4, 20, 500, 3, OrderStatus::Cancelled),
        ]
    }

    fn ids(orders: &[OrderDetail]) -> Vec<i64> {
        orders.iter().map(|o| o.order.order_id).collect()
    }

    #[test]
    fn test_newest_first() {
        let sorted = OrderListQuery::new().apply(sample());
        assert_eq!(ids(&sorted), vec![2, 4, 3, 1]);
        assert!(
            sorted
                .windows(2)
                .all(|w| w[0].order.order_date >= w[1].order.order_date)
        );
    }

    #[test]
    fn test_highest_price_is_stable() {
        let sorted = OrderListQuery::new()
            .with_sort(OrderSort::HighestPrice)
            .apply(sample());
        // 2 and 3 tie at 26.50 and keep their input order
        assert_eq!(ids(&sorted), vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_highest_sold_is_stable() {
        let sorted = OrderListQuery::new()
            .with_sort(OrderSort::HighestSold)
            .apply(sample());
        assert_eq!(ids(&sorted), vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_status_filter() {
        let pending = OrderListQuery::new()
            .with_status(OrderStatus::Pending)
            .apply(sample());
        assert_eq!(ids(&pending), vec![3, 1]);
    }

    #[test]
    fn test_query_from_query_string_shape() {
        let query: OrderListQuery =
            serde_json::from_str(r#"{"status":"pending","sort":"highest_sold"}"#).unwrap();
        assert_eq!(query.status, Some(OrderStatus::Pending));
        assert_eq!(query.sort, OrderSort::HighestSold);

        let query: OrderListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query, OrderListQuery::default());
    }

    #[test]
    fn test_stats() {
        let orders = sample();
        let stats = OrderStats::compute(&orders);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.revenue, Decimal::new(6800, 2));
    }
}
