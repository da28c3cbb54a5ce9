//! Global order registry
//!
//! The exchange owns every accepted order in one arena keyed by id; books
//! and price levels store ids and borrow the registry per operation. Fully
//! matched and cancelled orders stay in the registry so status queries keep
//! working after the book has forgotten them.

use std::collections::HashMap;
use types::{BookError, Order, OrderId};

/// Arena of accepted orders, keyed by id.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: HashMap<OrderId, Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an accepted order.
    ///
    /// Fails with [`BookError::DuplicateOrder`] when the id is taken.
    pub fn insert(&mut self, order: Order) -> Result<(), BookError> {
        if self.orders.contains_key(&order.id()) {
            return Err(BookError::DuplicateOrder(order.id()));
        }
        self.orders.insert(order.id(), order);
        Ok(())
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(&id)
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{OrderType, Side, Symbol};

    fn order(id: u64) -> Order {
        Order::new(
            OrderId::from_u64(id),
            Symbol::new("AAPL"),
            100,
            10,
            Side::Bid,
            OrderType::GoodTilCanceled,
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = OrderStore::new();
        store.insert(order(1)).unwrap();

        assert!(store.contains(OrderId::from_u64(1)));
        assert_eq!(store.get(OrderId::from_u64(1)).unwrap().quantity(), 10);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut store = OrderStore::new();
        store.insert(order(1)).unwrap();

        let err = store.insert(order(1)).unwrap_err();
        assert_eq!(err, BookError::DuplicateOrder(OrderId::from_u64(1)));
    }

    #[test]
    fn test_get_mut_mutates_in_place() {
        let mut store = OrderStore::new();
        store.insert(order(1)).unwrap();

        store.get_mut(OrderId::from_u64(1)).unwrap().fill(4).unwrap();
        assert_eq!(store.get(OrderId::from_u64(1)).unwrap().filled(), 4);
    }
}
