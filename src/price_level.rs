//! Price Level: the orders resting at one price on one side of the book.
//!
//! Orders are held in strict insertion (time-priority) order. The only
//! operations that may reorder them are cancel (which must preserve the
//! relative order of survivors) and match (which removes fully-executed
//! orders from the front).

use std::collections::VecDeque;

use crate::error::SimError;
use crate::order::{Order, OrderStatus, Side};

/// All resting orders at a single price, plus anonymous (non-owned) depth.
///
/// The `market_qty` field covers the spec's "snap level" variant: when a
/// level is built from a vendor depth snapshot rather than from the
/// strategy's own resting orders, the snapshot's aggregate size at this
/// price is carried here rather than as synthetic `Order`s. It defaults to
/// zero, which makes a `PriceLevel` built purely from owned orders behave
/// identically to a level with no anonymous depth.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The price this level represents (tick-snapped or original, per the
    /// owning side book).
    pub price: f64,
    orders: VecDeque<Order>,
    /// Aggregate anonymous depth at this price not backed by an `Order`.
    pub market_qty: f64,
}

impl PriceLevel {
    /// Create an empty level at `price`.
    pub fn new(price: f64) -> Self {
        PriceLevel {
            price,
            orders: VecDeque::new(),
            market_qty: 0.0,
        }
    }

    /// Number of resting orders (excludes anonymous depth).
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Whether the level has neither resting orders nor anonymous depth.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.market_qty <= 0.0
    }

    /// Iterate resting orders in FIFO (time-priority) order.
    pub fn iter_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Append `order` to the tail of the queue (time priority).
    ///
    /// # Errors
    /// Returns [`SimError::InvalidSide`] if `order.side` does not match the
    /// side this level belongs to (determined by the first order already
    /// resting here; an empty level accepts any side).
    pub fn add(&mut self, order: Order) -> Result<(), SimError> {
        if order.side == Side::None {
            return Err(SimError::InvalidSide);
        }
        if let Some(existing) = self.orders.front()
            && existing.side != order.side
        {
            return Err(SimError::InvalidSide);
        }
        self.orders.push_back(order);
        Ok(())
    }

    /// Remove the order with `order_id`, mark it canceled, and return it.
    ///
    /// Removal preserves the relative time priority of the remaining
    /// orders (no swap-remove) — cancel must never let a later order jump
    /// ahead of an earlier one at the same price.
    ///
    /// # Errors
    /// Returns [`SimError::OrderNotFound`] if no resting order has that id.
    pub fn cancel(&mut self, order_id: i64) -> Result<Order, SimError> {
        let idx = self
            .orders
            .iter()
            .position(|o| o.id == order_id)
            .ok_or(SimError::OrderNotFound { order_id })?;
        let mut order = self.orders.remove(idx).expect("index just located");
        order.status = OrderStatus::Canceled;
        Ok(order)
    }

    /// Sum of remaining quantity across resting orders, plus anonymous
    /// depth.
    pub fn total_qty(&self) -> f64 {
        self.market_qty + self.orders.iter().map(Order::remaining).sum::<f64>()
    }

    /// Match `incoming` against this level's resting orders in FIFO order.
    ///
    /// Precondition (caller-guaranteed): `incoming.price` is marketable
    /// against this level for its side. `incoming.current_exec_qty` is
    /// accumulated across calls (callers sweeping several levels in one
    /// pass must reset it once before the first call, not between levels).
    ///
    /// Returns `(level_broken_through, trades)`: `level_broken_through` is
    /// true if the level was fully consumed and `incoming` still has
    /// remaining quantity; `trades` holds a snapshot of every resting order
    /// touched (reflecting its fill) followed by a snapshot of `incoming`.
    pub fn match_order(&mut self, incoming: &mut Order) -> (bool, Vec<Order>) {
        let mut trades = Vec::new();

        while let Some(resting) = self.orders.front_mut() {
            if incoming.remaining() <= 0.0 {
                break;
            }
            let take = incoming.remaining().min(resting.remaining());
            if take <= 0.0 {
                break;
            }

            resting.exec_qty += take;
            incoming.exec_qty += take;
            resting.current_exec_qty = take;
            incoming.current_exec_qty += take;
            resting.current_exec_price = self.price;
            incoming.current_exec_price = self.price;
            resting.current_is_maker = true;
            incoming.current_is_maker = false;

            resting.status = if resting.is_fully_executed() {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            };

            // Snapshot after stamping fill fields, before possible removal.
            trades.push(resting.clone());

            if resting.is_fully_executed() {
                self.orders.pop_front();
            } else {
                break;
            }
        }

        incoming.status = if incoming.is_fully_executed() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        trades.push(incoming.clone());

        let level_broken_through = self.orders.is_empty() && incoming.remaining() > 0.0;
        (level_broken_through, trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderType, TimeInForce};

    fn buy(id: i64, qty: f64) -> Order {
        Order::new(
            id,
            100.0,
            Side::Buy,
            qty,
            OrderType::Limit,
            TimeInForce::Gtc,
            0,
        )
    }

    fn sell(id: i64, qty: f64) -> Order {
        Order::new(
            id,
            98.0,
            Side::Sell,
            qty,
            OrderType::Limit,
            TimeInForce::Gtc,
            0,
        )
    }

    #[test]
    fn add_rejects_side_mismatch() {
        let mut level = PriceLevel::new(100.0);
        level.add(buy(1, 1.0)).unwrap();
        let err = level.add(sell(2, 1.0)).unwrap_err();
        assert!(matches!(err, SimError::InvalidSide));
    }

    #[test]
    fn cancel_preserves_fifo_order() {
        let mut level = PriceLevel::new(100.0);
        level.add(buy(1, 1.0)).unwrap();
        level.add(buy(2, 1.0)).unwrap();
        level.add(buy(3, 1.0)).unwrap();
        level.cancel(2).unwrap();
        let ids: Vec<i64> = level.iter_orders().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn cancel_missing_order_errs() {
        let mut level = PriceLevel::new(100.0);
        let err = level.cancel(99).unwrap_err();
        assert!(matches!(err, SimError::OrderNotFound { order_id: 99 }));
    }

    #[test]
    fn partial_then_full_fill() {
        let mut level = PriceLevel::new(100.0);
        level.add(buy(1, 3.0)).unwrap();
        level.add(buy(2, 2.0)).unwrap();

        let mut incoming = Order::new(
            99,
            98.0,
            Side::Sell,
            4.0,
            OrderType::Limit,
            TimeInForce::Gtc,
            0,
        );
        let (broken_through, trades) = level.match_order(&mut incoming);

        assert!(!broken_through);
        assert_eq!(trades.len(), 3);
        assert_eq!(trades[0].id, 1);
        assert_eq!(trades[0].status, OrderStatus::Filled);
        assert_eq!(trades[0].current_exec_qty, 3.0);
        assert_eq!(trades[1].id, 2);
        assert_eq!(trades[1].status, OrderStatus::PartiallyFilled);
        assert_eq!(trades[1].current_exec_qty, 1.0);
        assert_eq!(trades[1].remaining(), 1.0);
        assert_eq!(trades[2].id, 99);
        assert_eq!(trades[2].status, OrderStatus::Filled);

        assert_eq!(level.order_count(), 1);
        assert_eq!(level.total_qty(), 1.0);
        assert_eq!(incoming.remaining(), 0.0);
    }

    #[test]
    fn break_through_empties_level() {
        let mut level = PriceLevel::new(100.0);
        level.add(buy(1, 5.0)).unwrap();

        let mut incoming = Order::new(
            2,
            98.0,
            Side::Sell,
            8.0,
            OrderType::Limit,
            TimeInForce::Gtc,
            0,
        );
        let (broken_through, trades) = level.match_order(&mut incoming);

        assert!(broken_through);
        assert_eq!(trades[0].current_exec_qty, 5.0);
        assert_eq!(trades[0].status, OrderStatus::Filled);
        assert_eq!(trades[1].status, OrderStatus::PartiallyFilled);
        assert_eq!(incoming.remaining(), 3.0);
        assert!(level.is_empty());
    }

    #[test]
    fn no_fill_when_not_marketable_quantity_zero() {
        let mut level = PriceLevel::new(100.0);
        level.add(buy(1, 1.0)).unwrap();
        let mut incoming = Order::new(
            2,
            98.0,
            Side::Sell,
            0.0,
            OrderType::Limit,
            TimeInForce::Gtc,
            0,
        );
        let (broken_through, trades) = level.match_order(&mut incoming);
        assert!(!broken_through);
        // Only the incoming snapshot; the resting order was never touched.
        assert_eq!(trades.len(), 1);
        assert_eq!(level.order_count(), 1);
    }
}
