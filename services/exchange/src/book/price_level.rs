//! Price level with FIFO queue
//!
//! A price level holds every resting order at one price on one side of a
//! book, in arrival order. Draining always consumes from the head, which
//! is what enforces time priority within the level.

use std::collections::VecDeque;
use types::{BookError, Order, OrderId};

use crate::orders::OrderStore;

/// FIFO queue of resting orders at a single price.
///
/// Stores order ids; order state lives in the [`OrderStore`], which
/// callers lend per operation. `total_quantity` mirrors the sum of
/// `remaining` across the queued orders after every mutation.
#[derive(Debug, Default)]
pub struct PriceLevel {
    orders: VecDeque<OrderId>,
    total_quantity: u64,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order at the tail of the queue.
    ///
    /// Fails with [`BookError::DuplicateOrder`] when the id is already
    /// queued at this level.
    pub fn add(&mut self, order: &Order) -> Result<(), BookError> {
        if self.orders.contains(&order.id()) {
            return Err(BookError::DuplicateOrder(order.id()));
        }
        self.orders.push_back(order.id());
        self.total_quantity += order.remaining() as u64;
        Ok(())
    }

    /// Unlink an order from the queue.
    ///
    /// Fails with [`BookError::UnknownOrder`] when the id is not queued
    /// here.
    pub fn remove(&mut self, id: OrderId, store: &OrderStore) -> Result<(), BookError> {
        let position = self
            .orders
            .iter()
            .position(|&queued| queued == id)
            .ok_or(BookError::UnknownOrder(id))?;
        let remaining = store
            .get(id)
            .map(|order| order.remaining())
            .ok_or(BookError::UnknownOrder(id))?;

        self.orders.remove(position);
        self.total_quantity -= remaining as u64;
        Ok(())
    }

    /// Whether the level holds at least `amount` in aggregate.
    pub fn can_fill(&self, amount: u64) -> bool {
        amount <= self.total_quantity
    }

    /// Drain resting liquidity into `incoming` from the head of the queue.
    ///
    /// Each step fills `min(incoming.remaining, head.remaining)` on both
    /// orders; fully filled heads are popped. Stops when the incoming
    /// order is filled or the level is empty. Order-type semantics are not
    /// applied here; this is the mechanical primitive the book drives.
    ///
    /// Returns the ids of resting orders that were completely filled and
    /// removed, so the book can clear its location entries.
    pub fn fill(&mut self, incoming: &mut Order, store: &mut OrderStore) -> Vec<OrderId> {
        let mut closed = Vec::new();
        while !incoming.is_filled() {
            let Some(&head) = self.orders.front() else {
                break;
            };
            let resting = store
                .get_mut(head)
                .expect("resting order is present in the registry");

            let amount = incoming.remaining().min(resting.remaining());
            resting.fill(amount).expect("fill within resting remainder");
            incoming.fill(amount).expect("fill within incoming remainder");
            self.total_quantity -= amount as u64;

            if resting.is_filled() {
                self.orders.pop_front();
                closed.push(head);
            }
        }
        closed
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Number of orders queued at this level.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Queued order ids in arrival order.
    pub fn ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.orders.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{OrderType, Side, Symbol};

    fn resting(store: &mut OrderStore, id: u64, quantity: u32) -> OrderId {
        let order = Order::new(
            OrderId::from_u64(id),
            Symbol::new("AAPL"),
            100,
            quantity,
            Side::Bid,
            OrderType::GoodTilCanceled,
        )
        .unwrap();
        let order_id = order.id();
        store.insert(order).unwrap();
        order_id
    }

    fn incoming(id: u64, quantity: u32) -> Order {
        Order::new(
            OrderId::from_u64(id),
            Symbol::new("AAPL"),
            100,
            quantity,
            Side::Ask,
            OrderType::ImmediateOrCancel,
        )
        .unwrap()
    }

    fn level_matches_store(level: &PriceLevel, store: &OrderStore) -> bool {
        let sum: u64 = level
            .ids()
            .map(|id| store.get(id).unwrap().remaining() as u64)
            .sum();
        sum == level.total_quantity()
    }

    #[test]
    fn test_add_accumulates_total() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new();

        assert!(level.is_empty());
        let id1 = resting(&mut store, 1, 10);
        level.add(store.get(id1).unwrap()).unwrap();
        assert!(!level.is_empty());
        assert_eq!(level.total_quantity(), 10);

        let id2 = resting(&mut store, 2, 5);
        level.add(store.get(id2).unwrap()).unwrap();
        assert_eq!(level.total_quantity(), 15);
        assert!(level_matches_store(&level, &store));
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new();

        let id = resting(&mut store, 1, 10);
        level.add(store.get(id).unwrap()).unwrap();

        let err = level.add(store.get(id).unwrap()).unwrap_err();
        assert_eq!(err, BookError::DuplicateOrder(id));
        assert_eq!(level.total_quantity(), 10);
    }

    #[test]
    fn test_remove_updates_total() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new();

        let id1 = resting(&mut store, 1, 10);
        let id2 = resting(&mut store, 2, 5);
        level.add(store.get(id1).unwrap()).unwrap();
        level.add(store.get(id2).unwrap()).unwrap();

        level.remove(id1, &store).unwrap();
        assert_eq!(level.total_quantity(), 5);
        assert!(level_matches_store(&level, &store));

        let err = level.remove(id1, &store).unwrap_err();
        assert_eq!(err, BookError::UnknownOrder(id1));

        level.remove(id2, &store).unwrap();
        assert!(level.is_empty());
        assert_eq!(level.total_quantity(), 0);
    }

    #[test]
    fn test_remove_uses_current_remaining() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new();

        let id = resting(&mut store, 1, 10);
        level.add(store.get(id).unwrap()).unwrap();

        // Partial fill through the level keeps the cached total honest
        let mut taker = incoming(2, 4);
        level.fill(&mut taker, &mut store);
        assert_eq!(level.total_quantity(), 6);

        level.remove(id, &store).unwrap();
        assert_eq!(level.total_quantity(), 0);
    }

    #[test]
    fn test_can_fill_is_level_local() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new();

        let id1 = resting(&mut store, 1, 10);
        let id2 = resting(&mut store, 2, 5);
        level.add(store.get(id1).unwrap()).unwrap();
        level.add(store.get(id2).unwrap()).unwrap();

        assert!(level.can_fill(10));
        assert!(level.can_fill(15));
        assert!(!level.can_fill(16));
    }

    #[test]
    fn test_fill_drains_head_first() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new();

        let id1 = resting(&mut store, 1, 10);
        let id2 = resting(&mut store, 2, 5);
        level.add(store.get(id1).unwrap()).unwrap();
        level.add(store.get(id2).unwrap()).unwrap();

        let mut taker = incoming(3, 12);
        let closed = level.fill(&mut taker, &mut store);

        assert_eq!(level.total_quantity(), 3);
        assert_eq!(taker.filled(), 12);
        assert!(store.get(id1).unwrap().is_filled());
        assert_eq!(store.get(id2).unwrap().filled(), 2);
        assert_eq!(closed, vec![id1]);
        assert!(level_matches_store(&level, &store));
    }

    #[test]
    fn test_fill_empty_level_is_noop() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new();

        let mut taker = incoming(1, 10);
        let closed = level.fill(&mut taker, &mut store);

        assert_eq!(taker.filled(), 0);
        assert!(closed.is_empty());
    }

    #[test]
    fn test_fill_stops_when_incoming_filled() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new();

        let id1 = resting(&mut store, 1, 10);
        let id2 = resting(&mut store, 2, 10);
        level.add(store.get(id1).unwrap()).unwrap();
        level.add(store.get(id2).unwrap()).unwrap();

        let mut taker = incoming(3, 10);
        let closed = level.fill(&mut taker, &mut store);

        assert!(taker.is_filled());
        assert_eq!(closed, vec![id1]);
        // Second order untouched: time priority
        assert_eq!(store.get(id2).unwrap().filled(), 0);
        assert_eq!(level.len(), 1);
    }

    #[test]
    fn test_many_orders_at_one_level() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new();

        for id in 0..1_000 {
            let order_id = resting(&mut store, id, 1);
            level.add(store.get(order_id).unwrap()).unwrap();
        }
        assert_eq!(level.total_quantity(), 1_000);
        assert_eq!(level.len(), 1_000);
    }
}
