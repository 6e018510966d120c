//! Side Book: one side (bid or ask) of an order book, keyed by price bucket.
//!
//! Prices are discretised to an integer bucket (`round(price / tick_size)`)
//! before lookup or insertion, so level identity never depends on float
//! equality. The level sequence is implicitly ordered by the bucket key: an
//! ordered map (`BTreeMap`) keyed by bucket gives the sorted sequence for
//! free, rather than re-sorting a `Vec` on every insert — the cheaper of the
//! two designs the spec allows.

use std::collections::{BTreeMap, HashMap};

use crate::error::SimError;
use crate::order::{Order, Side};
use crate::price_level::PriceLevel;

/// One side of an [`crate::order_book::OrderBook`].
#[derive(Debug, Clone)]
pub struct SideBook {
    side: Side,
    tick_size: f64,
    levels: BTreeMap<i64, PriceLevel>,
    /// order id -> price bucket, so cancel-by-id doesn't need to scan every
    /// level. Mirrors the spec's "long-lived handle via (price_bucket,
    /// order_id) pairs, never a raw interior reference".
    locations: HashMap<i64, i64>,
}

impl SideBook {
    /// Create an empty side book.
    pub fn new(side: Side, tick_size: f64) -> Self {
        SideBook {
            side,
            tick_size,
            levels: BTreeMap::new(),
            locations: HashMap::new(),
        }
    }

    /// The discretised price bucket: `round(price / tick_size)`.
    pub fn bucket(&self, price: f64) -> i64 {
        (price / self.tick_size).round() as i64
    }

    /// Whether this side has no resting orders or anonymous depth at any
    /// price.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Look up an existing level by bucket, or create an empty one.
    pub fn get_or_create_level(&mut self, price: f64) -> &mut PriceLevel {
        let bucket = self.bucket(price);
        self.levels
            .entry(bucket)
            .or_insert_with(|| PriceLevel::new(price))
    }

    /// Levels in priority order: descending price for bids (index 0 = best
    /// bid), ascending for asks (index 0 = best ask).
    fn priority_order(&self) -> Box<dyn Iterator<Item = (&i64, &PriceLevel)> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev()),
            _ => Box::new(self.levels.iter()),
        }
    }

    /// Insert `order`, routing it to its price bucket's level.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidSide`] if `order.side` doesn't match this
    /// side book, or if the target level already holds orders of the
    /// opposite side.
    pub fn add(&mut self, order: Order) -> Result<(), SimError> {
        if order.side != self.side {
            return Err(SimError::InvalidSide);
        }
        let bucket = self.bucket(order.price);
        let id = order.id;
        self.get_or_create_level(order.price).add(order)?;
        self.locations.insert(id, bucket);
        Ok(())
    }

    /// Cancel the order with `order_id` resting at `price`, removing its
    /// level if that empties it.
    ///
    /// # Errors
    /// Returns [`SimError::OrderNotFound`] if no such order is resting.
    pub fn cancel(&mut self, order_id: i64, price: f64) -> Result<Order, SimError> {
        let bucket = self.bucket(price);
        let level = self
            .levels
            .get_mut(&bucket)
            .ok_or(SimError::OrderNotFound { order_id })?;
        let order = level.cancel(order_id)?;
        if level.is_empty() {
            self.levels.remove(&bucket);
        }
        self.locations.remove(&order_id);
        Ok(order)
    }

    /// The n-th best price (0 = best), or `None` if there are fewer than
    /// `n + 1` levels.
    pub fn best_price(&self, n: usize) -> Option<f64> {
        self.priority_order().nth(n).map(|(_, level)| level.price)
    }

    /// The n-th best level's total quantity, or `None` if there are fewer
    /// than `n + 1` levels.
    pub fn best_qty(&self, n: usize) -> Option<f64> {
        self.priority_order()
            .nth(n)
            .map(|(_, level)| level.total_qty())
    }

    /// `(price, total_qty)` for the top `n` levels, best-first.
    pub fn depth(&self, n: usize) -> Vec<(f64, f64)> {
        self.priority_order()
            .take(n)
            .map(|(_, level)| (level.price, level.total_qty()))
            .collect()
    }

    /// Whether `price` is marketable against this side's best level for an
    /// incoming order arriving from the opposite side.
    ///
    /// A buy-incoming order is marketable against asks when `best_ask <=
    /// price`; a sell-incoming order is marketable against bids when
    /// `best_bid >= price`. `None` means "no price limit" (a market order),
    /// which is always marketable while any level remains.
    pub fn is_marketable(&self, incoming_side: Side, price: Option<f64>) -> bool {
        let Some((_, best)) = self.priority_order().next() else {
            return false;
        };
        match price {
            None => true,
            Some(price) => match incoming_side {
                Side::Buy => best.price <= price,
                Side::Sell => best.price >= price,
                Side::None => false,
            },
        }
    }

    /// Total quantity marketable against `price` (or all depth, if `price`
    /// is `None` for a market order) — used to evaluate `fok` orders before
    /// committing any fill.
    pub fn marketable_depth(&self, incoming_side: Side, price: Option<f64>) -> f64 {
        let mut total = 0.0;
        for (_, level) in self.priority_order() {
            let marketable = match price {
                None => true,
                Some(price) => match incoming_side {
                    Side::Buy => level.price <= price,
                    Side::Sell => level.price >= price,
                    Side::None => false,
                },
            };
            if !marketable {
                break;
            }
            total += level.total_qty();
        }
        total
    }

    /// Match `incoming` against this side's levels in priority order until
    /// either `incoming` is exhausted or no remaining level is marketable.
    ///
    /// Empty levels are removed from the book as they're consumed. Returns
    /// every trade snapshot produced across all levels touched, in the order
    /// they occurred.
    pub fn match_order(&mut self, incoming: &mut Order) -> Vec<Order> {
        let mut trades = Vec::new();
        let incoming_side = incoming.side;
        let limit_price = match incoming.order_type {
            crate::order::OrderType::Market => None,
            crate::order::OrderType::Limit => Some(incoming.price),
        };
        // Reset once for the whole sweep: a break-through accumulates
        // `current_exec_qty` across every level crossed in this pass.
        incoming.current_exec_qty = 0.0;

        loop {
            if incoming.remaining() <= 0.0 {
                break;
            }
            let Some(bucket) = self.priority_order().next().map(|(bucket, _)| *bucket) else {
                break;
            };
            if !self.is_marketable(incoming_side, limit_price) {
                break;
            }
            let level = self.levels.get_mut(&bucket).expect("bucket just observed");
            let (_, level_trades) = level.match_order(incoming);
            for trade in &level_trades {
                if trade.id != incoming.id {
                    self.locations.remove(&trade.id);
                }
            }
            trades.extend(level_trades);
            if level.is_empty() {
                self.levels.remove(&bucket);
            }
        }

        trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderType, TimeInForce};

    fn order(id: i64, price: f64, side: Side, qty: f64) -> Order {
        Order::new(id, price, side, qty, OrderType::Limit, TimeInForce::Gtc, 0)
    }

    #[test]
    fn best_price_ordering_for_bids() {
        let mut bids = SideBook::new(Side::Buy, 1.0);
        bids.add(order(1, 100.0, Side::Buy, 100.0)).unwrap();
        bids.add(order(2, 100.0, Side::Buy, 200.0)).unwrap();
        bids.add(order(3, 99.0, Side::Buy, 200.0)).unwrap();
        bids.add(order(4, 101.0, Side::Buy, 200.0)).unwrap();

        assert_eq!(bids.best_price(0), Some(101.0));
        assert_eq!(bids.best_price(2), Some(99.0));
        assert_eq!(bids.best_qty(1), Some(300.0));
    }

    #[test]
    fn asks_ordered_ascending() {
        let mut asks = SideBook::new(Side::Sell, 1.0);
        asks.add(order(1, 103.0, Side::Sell, 200.0)).unwrap();
        asks.add(order(2, 105.0, Side::Sell, 200.0)).unwrap();
        assert_eq!(asks.best_price(0), Some(103.0));
        assert_eq!(asks.best_price(1), Some(105.0));
    }

    #[test]
    fn cancel_removes_empty_level_from_map() {
        let mut bids = SideBook::new(Side::Buy, 1.0);
        bids.add(order(1, 100.0, Side::Buy, 10.0)).unwrap();
        bids.cancel(1, 100.0).unwrap();
        assert!(bids.is_empty());
        assert_eq!(bids.best_price(0), None);
    }

    #[test]
    fn price_bucketing_merges_near_equal_floats() {
        let mut bids = SideBook::new(Side::Buy, 0.01);
        bids.add(order(1, 100.001, Side::Buy, 1.0)).unwrap();
        bids.add(order(2, 99.999, Side::Buy, 1.0)).unwrap();
        // Both round to the same bucket (10000), so they share one level.
        assert_eq!(bids.depth(10).len(), 1);
        assert_eq!(bids.best_qty(0), Some(2.0));
    }

    #[test]
    fn match_order_sweeps_multiple_levels() {
        let mut bids = SideBook::new(Side::Buy, 1.0);
        bids.add(order(1, 100.0, Side::Buy, 5.0)).unwrap();
        bids.add(order(2, 99.0, Side::Buy, 5.0)).unwrap();

        let mut incoming = order(3, 98.0, Side::Sell, 8.0);
        let trades = bids.match_order(&mut incoming);
        // Level 100 filled for 5, level 99 filled for 3, incoming snapshot twice.
        assert_eq!(trades.len(), 4);
        assert_eq!(incoming.remaining(), 0.0);
        assert_eq!(bids.best_price(0), Some(99.0));
        assert_eq!(bids.best_qty(0), Some(2.0));
        // The taker's current_exec_qty accumulates across both levels
        // crossed in this pass rather than resetting between them.
        assert_eq!(incoming.current_exec_qty, 8.0);
        let taker_snapshots: Vec<_> = trades.iter().filter(|o| o.id == 3).collect();
        assert_eq!(taker_snapshots[0].current_exec_qty, 5.0);
        assert_eq!(taker_snapshots[1].current_exec_qty, 8.0);
    }
}
