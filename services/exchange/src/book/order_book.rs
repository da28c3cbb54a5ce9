//! Per-instrument order book
//!
//! Both ladders plus a location map for resting orders. `place_order` is
//! the matching algorithm: it checks feasibility first (so fill-or-kill
//! never consumes partial liquidity), drains crossing levels best-first,
//! and only then rests a good-till-cancelled remainder. Matches always
//! execute against resting levels head to head, so the incoming side gets
//! any price improvement implicitly.

use std::collections::HashMap;
use types::{BookError, Order, OrderId, OrderType, Side};

use crate::matching::crossing;
use crate::orders::OrderStore;

use super::ask_book::AskBook;
use super::bid_book::BidBook;

/// Limit order book for a single instrument.
#[derive(Debug, Default)]
pub struct OrderBook {
    bids: BidBook,
    asks: AskBook,
    /// Where each *resting* order lives. Orders fully matched or killed on
    /// entry never appear here.
    resting: HashMap<OrderId, (Side, u32)>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the opposite side currently holds enough crossing liquidity
    /// to fill `order` completely.
    pub fn can_fill(&self, order: &Order) -> bool {
        let needed = order.remaining() as u64;
        match order.side() {
            Side::Ask => self.bids.can_fill(order.price(), needed),
            Side::Bid => self.asks.can_fill(order.price(), needed),
        }
    }

    /// Place an incoming order.
    ///
    /// Returns `Ok(false)` for a fill-or-kill that cannot be fully filled;
    /// the book is left untouched in that case. Returns
    /// [`BookError::DuplicateOrder`] when the id is already resting here.
    /// `Ok(true)` means the order executed according to its type: FOK and
    /// IOC never rest a remainder, GTC rests whatever is left unfilled.
    pub fn place_order(
        &mut self,
        order: &mut Order,
        store: &mut OrderStore,
    ) -> Result<bool, BookError> {
        if self.resting.contains_key(&order.id()) {
            return Err(BookError::DuplicateOrder(order.id()));
        }

        if order.order_type() == OrderType::FillOrKill && !self.can_fill(order) {
            return Ok(false);
        }

        self.drain(order, store);

        match order.order_type() {
            // Never rest; any leftover quantity is discarded
            OrderType::FillOrKill | OrderType::ImmediateOrCancel => Ok(true),
            OrderType::GoodTilCanceled => {
                if !order.is_filled() {
                    match order.side() {
                        Side::Bid => self.bids.insert(order)?,
                        Side::Ask => self.asks.insert(order)?,
                    }
                    self.resting.insert(order.id(), (order.side(), order.price()));
                }
                Ok(true)
            }
        }
    }

    /// Consume crossing liquidity into `order`, best price first.
    fn drain(&mut self, order: &mut Order, store: &mut OrderStore) {
        while !order.is_filled() {
            let (price, closed, emptied) = match order.side() {
                Side::Ask => {
                    let Some((price, level)) = self.bids.best_level_mut() else {
                        break;
                    };
                    if !crossing::bid_crosses(price, order.price()) {
                        break;
                    }
                    let closed = level.fill(order, store);
                    (price, closed, level.is_empty())
                }
                Side::Bid => {
                    let Some((price, level)) = self.asks.best_level_mut() else {
                        break;
                    };
                    if !crossing::ask_crosses(price, order.price()) {
                        break;
                    }
                    let closed = level.fill(order, store);
                    (price, closed, level.is_empty())
                }
            };

            for id in closed {
                self.resting.remove(&id);
            }
            if emptied {
                match order.side() {
                    Side::Ask => self.bids.remove_level(price),
                    Side::Bid => self.asks.remove_level(price),
                }
            }
        }
    }

    /// Cancel a resting order.
    ///
    /// Fails with [`BookError::UnknownOrder`] when the id is not resting
    /// here — including orders that were already fully matched or killed
    /// on entry.
    pub fn cancel_order(&mut self, id: OrderId, store: &OrderStore) -> Result<(), BookError> {
        let &(side, price) = self.resting.get(&id).ok_or(BookError::UnknownOrder(id))?;
        match side {
            Side::Bid => self.bids.remove(id, price, store)?,
            Side::Ask => self.asks.remove(id, price, store)?,
        }
        self.resting.remove(&id);
        Ok(())
    }

    /// Whether `id` is currently resting in this book.
    pub fn is_resting(&self, id: OrderId) -> bool {
        self.resting.contains_key(&id)
    }

    /// Best (highest) resting bid price.
    pub fn best_bid(&self) -> Option<u32> {
        self.bids.best_price()
    }

    /// Best (lowest) resting ask price.
    pub fn best_ask(&self) -> Option<u32> {
        self.asks.best_price()
    }

    pub fn bids(&self) -> &BidBook {
        &self.bids
    }

    pub fn asks(&self) -> &AskBook {
        &self.asks
    }
}
