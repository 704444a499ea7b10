//! Order records written to the hosted backend after checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};
use super::status::OrderStatus;

/// Payload for inserting an order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub customer_email: Option<String>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    /// Payment provider session that produced this order.
    pub payment_session_id: Option<String>,
}

/// An order row as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_session_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for inserting one order line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price snapshot taken from the cart line.
    pub price: Decimal,
}
