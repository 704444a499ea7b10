//! Order write after a completed checkout.

use rust_decimal::Decimal;
use shopfront_core::{CartLine, NewOrder, NewOrderItem, Order, OrderStatus};
use tracing::instrument;

use crate::backend::{BackendClient, BackendError};

/// Order row for the given cart contents.
///
/// The total is the cart subtotal, which is what the hosted payment page
/// charged.
#[must_use]
pub fn new_order(lines: &[CartLine], email: Option<&str>, session_id: Option<&str>) -> NewOrder {
    NewOrder {
        customer_email: email.map(String::from),
        total_amount: lines.iter().map(CartLine::line_total).sum::<Decimal>(),
        status: OrderStatus::Pending,
        payment_session_id: session_id.map(String::from),
    }
}

/// Line items for `order`, one per cart line, with the snapshot unit price.
#[must_use]
pub fn order_items(order: &Order, lines: &[CartLine]) -> Vec<NewOrderItem> {
    lines
        .iter()
        .map(|line| NewOrderItem {
            order_id: order.id.clone(),
            product_id: line.id.clone(),
            quantity: line.quantity,
            price: line.price,
        })
        .collect()
}

/// Write the order and its items.
///
/// # Errors
///
/// Returns error if either insert fails. Items are not written if the order
/// insert fails.
#[instrument(skip(backend, lines, email), fields(lines = lines.len()))]
pub async fn record_order(
    backend: &BackendClient,
    lines: &[CartLine],
    email: Option<&str>,
    session_id: Option<&str>,
) -> Result<Order, BackendError> {
    let order = backend
        .create_order(&new_order(lines, email, session_id))
        .await?;
    backend
        .create_order_items(&order_items(&order, lines))
        .await?;

    tracing::info!(order_id = %order.id, total = %order.total_amount, "Order recorded");
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::str::FromStr;

    use shopfront_core::{OrderId, ProductId};

    use super::*;

    fn line(id: &str, price: &str, quantity: u32) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            name: id.to_string(),
            price: Decimal::from_str(price).unwrap(),
            image: String::new(),
            quantity,
        }
    }

    #[test]
    fn test_new_order_totals_cart() {
        let lines = [line("1", "99.99", 1), line("2", "299.99", 2)];
        let order = new_order(&lines, Some("a@b.co"), Some("cs_test_1"));

        assert_eq!(order.total_amount, Decimal::from_str("699.97").unwrap());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer_email.as_deref(), Some("a@b.co"));
        assert_eq!(order.payment_session_id.as_deref(), Some("cs_test_1"));
    }

    #[test]
    fn test_order_items_copy_snapshots() {
        let lines = [line("1", "99.99", 1), line("2", "299.99", 2)];
        let order = Order {
            id: OrderId::new("ord_1"),
            customer_email: None,
            total_amount: Decimal::from_str("699.97").unwrap(),
            status: OrderStatus::Pending,
            payment_session_id: None,
            created_at: None,
        };

        let items = order_items(&order, &lines);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].order_id, OrderId::new("ord_1"));
        assert_eq!(items[1].product_id, ProductId::new("2"));
        assert_eq!(items[1].quantity, 2);
        assert_eq!(items[1].price, Decimal::from_str("299.99").unwrap());
    }
}
