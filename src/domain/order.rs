use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// The next step in the forward chain, if any.
    pub fn successor(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Forward moves go one step at a time; cancelling is allowed from any
    /// non-terminal status.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == OrderStatus::Cancelled || self.successor() == Some(next)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == lowered)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown order status '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub notes: Option<String>,
}

/// A cart line frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

impl OrderItem {
    pub fn line_total(&self) -> Result<i64, DomainError> {
        self.unit_price
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| {
                DomainError::InvalidInput(format!("line total for '{}' is out of range", self.name))
            })
    }
}

pub fn items_subtotal(items: &[OrderItem]) -> Result<i64, DomainError> {
    items.iter().try_fold(0i64, |acc, item| {
        acc.checked_add(item.line_total()?)
            .ok_or_else(|| DomainError::InvalidInput("order subtotal is out of range".into()))
    })
}

/// Fields handed to the store for a new order. The store assigns the
/// storage id and creation time.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: String,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub subtotal: i64,
    pub shipping: i64,
    pub total: i64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Storage key; never shown to customers.
    pub id: Uuid,
    /// Public tracking id.
    pub order_id: String,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub subtotal: i64,
    pub shipping: i64,
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Checks the shape every stored order must have. Store adapters call
    /// this on everything they read back.
    pub fn validate(&self) -> Result<(), DomainError> {
        let malformed =
            |what: &str| DomainError::Store(format!("malformed order {}: {what}", self.order_id));

        if self.items.is_empty() {
            return Err(malformed("no items"));
        }
        match items_subtotal(&self.items) {
            Ok(sum) if sum == self.subtotal => {}
            _ => return Err(malformed("subtotal does not match item lines")),
        }
        if self.subtotal.checked_add(self.shipping) != Some(self.total) {
            return Err(malformed("total != subtotal + shipping"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_email: Option<String>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|s| s != order.status) {
            return false;
        }
        match &self.customer_email {
            Some(wanted) => order
                .customer
                .email
                .as_deref()
                .is_some_and(|email| email.trim().eq_ignore_ascii_case(wanted.trim())),
            None => true,
        }
    }
}

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RANDOM_SUFFIX_LEN: usize = 10;

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Builds a customer-facing tracking id: `PREFIX-<time>-<random>`.
///
/// The random part carries ~51 bits from a v4 UUID, so ids minted in the
/// same millisecond still differ.
pub fn generate_order_id(prefix: &str, now: DateTime<Utc>) -> String {
    let millis = u128::try_from(now.timestamp_millis()).unwrap_or_default();
    let mut entropy = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(RANDOM_SUFFIX_LEN);
    for _ in 0..RANDOM_SUFFIX_LEN {
        suffix.push(char::from(BASE36[(entropy % 36) as usize]));
        entropy /= 36;
    }
    format!("{}-{}-{}", prefix.to_ascii_uppercase(), to_base36(millis), suffix)
}

/// Normalises a tracking id the way customers tend to type it.
pub fn normalize_order_id(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
    pub cancelled: usize,
    /// Sum of `total` over delivered orders only.
    pub revenue: i64,
}

pub fn compute_stats(orders: &[Order]) -> OrderStats {
    orders.iter().fold(
        OrderStats {
            total: orders.len(),
            ..OrderStats::default()
        },
        |mut stats, order| {
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Processing => stats.processing += 1,
                OrderStatus::Shipped => stats.shipped += 1,
                OrderStatus::Delivered => {
                    stats.delivered += 1;
                    stats.revenue += order.total;
                }
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
            stats
        },
    )
}
