//! Order Model
//!
//! 订单是追加型账本: 创建后只能通过状态转换变更，绝不删除。
//! 行项目价格在下单时快照，之后菜单改价不影响历史订单。

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::Timestamp;
use surrealdb::RecordId;

pub type OrderId = RecordId;

// =============================================================================
// Status enums
// =============================================================================

/// Order fulfillment status
///
/// ```text
/// placed ──► preparing ──► ready ──► served
///    │            │
///    └────────────┴──────► canceled
/// ```
///
/// `served` and `canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Placed,
    Preparing,
    Ready,
    Served,
    Canceled,
}

impl OrderStatus {
    /// Allowed next statuses for this status
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Placed => &[OrderStatus::Preparing, OrderStatus::Canceled],
            OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Canceled],
            OrderStatus::Ready => &[OrderStatus::Served],
            OrderStatus::Served | OrderStatus::Canceled => &[],
        }
    }

    /// Whether `next` is a legal transition from this status
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Terminal statuses have no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Customer-initiated cancellation is only allowed before the food is ready
    pub fn is_cancelable(&self) -> bool {
        self.can_transition_to(OrderStatus::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Digital,
}

// =============================================================================
// Order
// =============================================================================

/// One (menu item, quantity, note, captured price) tuple within an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Record link to menu_item
    #[serde(with = "serde_helpers::record_id")]
    pub menu_item: RecordId,
    /// Name snapshot at placement time (keeps analytics self-contained)
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Unit price captured at placement time
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    /// Human-readable sequential number, e.g. `ORD-000042`
    pub order_number: String,
    /// Record link to dining_table
    #[serde(with = "serde_helpers::record_id")]
    pub dining_table: RecordId,
    /// Placing customer; None for guest orders
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub customer: Option<RecordId>,
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_ready_time: Option<Timestamp>,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
}

// =============================================================================
// Payloads
// =============================================================================

/// One requested line in a cart submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineCreate {
    /// Menu item id ("menu_item:xxx")
    pub menu_item: String,
    pub quantity: u32,
    #[serde(default)]
    pub note: Option<String>,
}

/// Cart submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    /// Table id ("dining_table:xxx")
    pub dining_table: String,
    pub items: Vec<OrderLineCreate>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 5] = [
        OrderStatus::Placed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Canceled,
    ];

    #[test]
    fn test_transition_matrix() {
        // The only legal pairs, nothing else
        let legal = [
            (OrderStatus::Placed, OrderStatus::Preparing),
            (OrderStatus::Placed, OrderStatus::Canceled),
            (OrderStatus::Preparing, OrderStatus::Ready),
            (OrderStatus::Preparing, OrderStatus::Canceled),
            (OrderStatus::Ready, OrderStatus::Served),
        ];

        for from in ALL {
            for to in ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Served.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(!OrderStatus::Placed.is_terminal());
        assert!(!OrderStatus::Preparing.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_ready_cannot_cancel() {
        assert!(!OrderStatus::Ready.is_cancelable());
        assert!(!OrderStatus::Served.is_cancelable());
        assert!(OrderStatus::Placed.is_cancelable());
        assert!(OrderStatus::Preparing.is_cancelable());
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"preparing\""
        );
        let s: OrderStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(s, OrderStatus::Canceled);
    }
}
