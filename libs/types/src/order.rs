//! Order lifecycle types
//!
//! An order's identity (id, symbol, price, quantity, side, type, creation
//! time) is fixed at construction; only the filled quantity and the status
//! change afterwards, and every mutation goes through [`Order::fill`] and
//! [`Order::set_status`] so the lifecycle invariants cannot be bypassed.

use crate::errors::OrderError;
use crate::ids::{OrderId, Symbol};
use crate::time::now_nanos;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order
    Bid,
    /// Sell order
    Ask,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// Execution policy for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Rest any unfilled remainder on the book until cancelled
    GoodTilCanceled,
    /// Fill completely on entry or leave the book untouched
    FillOrKill,
    /// Fill as much as possible on entry, discard the remainder
    ImmediateOrCancel,
}

/// Order status
///
/// Transitions form a DAG: Open → Closed (fully filled) and
/// Open → Cancelled. Open is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted and live (possibly partially filled)
    Open,
    /// Completely filled (terminal)
    Closed,
    /// Cancelled by request (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if the status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Closed | OrderStatus::Cancelled)
    }
}

/// A single order
///
/// Identity and terms are immutable after construction; `filled` and
/// `status` carry the mutable lifecycle state. Prices and quantities are
/// integers in caller-defined units; there are no fractional prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    symbol: Symbol,
    price: u32,
    quantity: u32,
    side: Side,
    order_type: OrderType,
    created_at: u64, // Unix nanos
    filled: u32,
    status: OrderStatus,
}

impl Order {
    /// Create a new open order stamped with the current time
    ///
    /// Fails with [`OrderError::InvalidQuantity`] when `quantity` is zero.
    pub fn new(
        id: OrderId,
        symbol: Symbol,
        price: u32,
        quantity: u32,
        side: Side,
        order_type: OrderType,
    ) -> Result<Self, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }
        Ok(Self {
            id,
            symbol,
            price,
            quantity,
            side,
            order_type,
            created_at: now_nanos(),
            filled: 0,
            status: OrderStatus::Open,
        })
    }

    /// Record a fill of `amount`
    ///
    /// Fails with [`OrderError::Overfill`] when `amount` exceeds the
    /// remaining quantity, leaving the order unchanged. Driving the
    /// remainder to zero closes the order.
    pub fn fill(&mut self, amount: u32) -> Result<(), OrderError> {
        if amount > self.remaining() {
            return Err(OrderError::Overfill {
                remaining: self.remaining(),
                requested: amount,
            });
        }
        self.filled += amount;
        if self.is_filled() && self.status == OrderStatus::Open {
            self.set_status(OrderStatus::Closed)?;
        }
        Ok(())
    }

    /// Transition the status
    ///
    /// Only Open → Closed and Open → Cancelled are legal; anything else
    /// fails with [`OrderError::InvalidStatusTransition`].
    pub fn set_status(&mut self, target: OrderStatus) -> Result<(), OrderError> {
        if self.status != OrderStatus::Open || target == OrderStatus::Open {
            return Err(OrderError::InvalidStatusTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }

    /// Unfilled quantity
    pub fn remaining(&self) -> u32 {
        self.quantity - self.filled
    }

    /// Check if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining() == 0
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn price(&self) -> u32 {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn filled(&self) -> u32 {
        self.filled
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u64, quantity: u32) -> Order {
        Order::new(
            OrderId::from_u64(id),
            Symbol::new("AAPL"),
            100,
            quantity,
            Side::Bid,
            OrderType::GoodTilCanceled,
        )
        .unwrap()
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Bid.opposite(), Side::Ask);
        assert_eq!(Side::Ask.opposite(), Side::Bid);
    }

    #[test]
    fn test_order_creation() {
        let order = order(1, 10);

        assert_eq!(order.id(), OrderId::from_u64(1));
        assert_eq!(order.price(), 100);
        assert_eq!(order.quantity(), 10);
        assert_eq!(order.remaining(), 10);
        assert_eq!(order.filled(), 0);
        assert_eq!(order.status(), OrderStatus::Open);
        assert!(!order.is_filled());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = Order::new(
            OrderId::from_u64(1),
            Symbol::new("AAPL"),
            100,
            0,
            Side::Bid,
            OrderType::GoodTilCanceled,
        );
        assert_eq!(result.unwrap_err(), OrderError::InvalidQuantity);
    }

    #[test]
    fn test_fill_and_close() {
        let mut order = order(1, 10);

        order.fill(5).unwrap();
        assert_eq!(order.remaining(), 5);
        assert_eq!(order.filled(), 5);
        assert_eq!(order.status(), OrderStatus::Open);

        order.fill(5).unwrap();
        assert_eq!(order.remaining(), 0);
        assert!(order.is_filled());
        assert_eq!(order.status(), OrderStatus::Closed);
    }

    #[test]
    fn test_overfill_rejected() {
        let mut order = order(1, 10);
        order.fill(5).unwrap();

        let err = order.fill(6).unwrap_err();
        assert_eq!(
            err,
            OrderError::Overfill {
                remaining: 5,
                requested: 6
            }
        );
        // State is untouched by the failed fill
        assert_eq!(order.filled(), 5);
        assert_eq!(order.status(), OrderStatus::Open);
    }

    #[test]
    fn test_fill_after_close_rejected() {
        let mut order = order(1, 10);
        order.fill(10).unwrap();
        assert!(order.fill(1).is_err());
    }

    #[test]
    fn test_cancel_transition() {
        let mut order = order(1, 10);
        order.set_status(OrderStatus::Cancelled).unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.status().is_terminal());
    }

    #[test]
    fn test_terminal_status_is_frozen() {
        let mut order = order(1, 10);
        order.set_status(OrderStatus::Closed).unwrap();

        let err = order.set_status(OrderStatus::Cancelled).unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidStatusTransition {
                from: OrderStatus::Closed,
                to: OrderStatus::Cancelled,
            }
        );
    }

    #[test]
    fn test_reopen_rejected() {
        let mut order = order(1, 10);
        assert!(order.set_status(OrderStatus::Open).is_err());
    }

    #[test]
    fn test_creation_timestamp() {
        let start = now_nanos();
        let order = order(1, 10);
        let end = now_nanos();

        assert!(order.created_at() >= start);
        assert!(order.created_at() <= end);
    }

    #[test]
    fn test_max_quantity_and_price() {
        let order = Order::new(
            OrderId::from_u64(1),
            Symbol::new("AAPL"),
            u32::MAX,
            u32::MAX,
            Side::Ask,
            OrderType::GoodTilCanceled,
        )
        .unwrap();
        assert_eq!(order.price(), u32::MAX);
        assert_eq!(order.quantity(), u32::MAX);
    }

    #[test]
    fn test_order_serialization() {
        let order = order(7, 25);
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(order, deserialized);
    }
}
