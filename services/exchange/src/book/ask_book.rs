//! Ask (sell-side) ladder
//!
//! Sell levels keyed by price in a BTreeMap, with the best (lowest) ask at
//! the front. Mirror image of the bid ladder.

use std::collections::BTreeMap;
use types::{BookError, Order, OrderId};

use crate::matching::crossing;
use crate::orders::OrderStore;

use super::price_level::PriceLevel;

/// Sell side of an order book.
#[derive(Debug, Default)]
pub struct AskBook {
    levels: BTreeMap<u32, PriceLevel>,
}

impl AskBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order to its price level, creating the level if new.
    pub fn insert(&mut self, order: &Order) -> Result<(), BookError> {
        self.levels.entry(order.price()).or_default().add(order)
    }

    /// Remove an order from the level at `price`, pruning the level if it
    /// empties.
    pub fn remove(&mut self, id: OrderId, price: u32, store: &OrderStore) -> Result<(), BookError> {
        let level = self
            .levels
            .get_mut(&price)
            .ok_or(BookError::UnknownOrder(id))?;
        level.remove(id, store)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Ok(())
    }

    /// Lowest resting ask price.
    pub fn best_price(&self) -> Option<u32> {
        self.levels.keys().next().copied()
    }

    /// The best (lowest-priced) level, mutable.
    pub fn best_level_mut(&mut self) -> Option<(u32, &mut PriceLevel)> {
        self.levels
            .iter_mut()
            .next()
            .map(|(price, level)| (*price, level))
    }

    /// Drop the level at `price` outright.
    pub fn remove_level(&mut self, price: u32) {
        self.levels.remove(&price);
    }

    /// Whether asks crossing an incoming bid limit hold at least `amount`
    /// in aggregate. Walks levels best-first and stops as soon as the
    /// target is reached or prices stop crossing.
    pub fn can_fill(&self, bid_limit: u32, amount: u64) -> bool {
        let mut available = 0u64;
        for (&price, level) in self.levels.iter() {
            if !crossing::ask_crosses(price, bid_limit) {
                break;
            }
            available += level.total_quantity();
            if available >= amount {
                return true;
            }
        }
        false
    }

    /// Levels best-first as `(price, total_quantity)`.
    pub fn depth(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.levels
            .iter()
            .map(|(price, level)| (*price, level.total_quantity()))
    }

    /// Levels best-first.
    pub fn levels(&self) -> impl Iterator<Item = (u32, &PriceLevel)> {
        self.levels.iter().map(|(price, level)| (*price, level))
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
