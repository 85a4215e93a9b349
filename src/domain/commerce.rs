//! Carts, orders and purchase records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    PAYMENT_POLICY_COMPLETE, PAYMENT_POLICY_PENDING, PAYMENT_STATUS_COMPLETE,
    PAYMENT_STATUS_FAILED, PAYMENT_STATUS_PENDING,
};

/// Settlement state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Complete,
    Failed,
}

impl PaymentStatus {
    /// Storage code
    pub fn code(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => PAYMENT_STATUS_PENDING,
            PaymentStatus::Complete => PAYMENT_STATUS_COMPLETE,
            PaymentStatus::Failed => PAYMENT_STATUS_FAILED,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            PAYMENT_STATUS_PENDING => Some(PaymentStatus::Pending),
            PAYMENT_STATUS_COMPLETE => Some(PaymentStatus::Complete),
            PAYMENT_STATUS_FAILED => Some(PaymentStatus::Failed),
            _ => None,
        }
    }

    /// Only pending orders settle, and only once.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Complete)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

/// How checkout settles the orders it creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentPolicy {
    /// No gateway in front: orders are complete at checkout
    #[default]
    SettleImmediately,
    /// Orders stay pending until an external settlement arrives
    AwaitSettlement,
}

impl PaymentPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            PAYMENT_POLICY_COMPLETE => Some(PaymentPolicy::SettleImmediately),
            PAYMENT_POLICY_PENDING => Some(PaymentPolicy::AwaitSettlement),
            _ => None,
        }
    }

    pub fn initial_status(&self) -> PaymentStatus {
        match self {
            PaymentPolicy::SettleImmediately => PaymentStatus::Complete,
            PaymentPolicy::AwaitSettlement => PaymentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: Uuid,
    pub course_id: i32,
}

/// Cart with its items and current prices
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartSnapshot {
    pub id: Uuid,
    pub items: Vec<CartLine>,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub price: Decimal,
}

impl CartSnapshot {
    pub fn new(id: Uuid, items: Vec<CartLine>) -> Self {
        let total_price = items.iter().map(|l| l.price).sum();
        Self { id, items, total_price }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub customer_id: i32,
    pub payment_status: PaymentStatus,
    pub placed_at: DateTime<Utc>,
}

/// Immutable purchase record; `price` is the snapshot at purchase time.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub course_id: i32,
    pub customer_id: i32,
    pub instructor_id: Uuid,
    pub price: Decimal,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderSnapshot {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
}

impl OrderSnapshot {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        let total_price = items.iter().map(|i| i.price).sum();
        Self { order, items, total_price }
    }
}

/// Courses in the cart the customer already bought, sorted and deduplicated.
pub fn already_purchased(cart_courses: &[i32], purchased: &[i32]) -> Vec<i32> {
    let owned: BTreeSet<i32> = purchased.iter().copied().collect();
    cart_courses
        .iter()
        .copied()
        .filter(|c| owned.contains(c))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Client message listing the offending course ids.
pub fn already_purchased_message(course_ids: &[i32]) -> String {
    let ids = course_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("You have already purchased course: [{}]", ids)
}
