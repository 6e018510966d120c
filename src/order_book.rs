//! Order Book: bid and ask side books plus derived market metrics.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::error::SimError;
use crate::order::{Order, OrderStatus, OrderType, Side, TimeInForce};
use crate::side_book::SideBook;

/// Immutable book-wide configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookOptions {
    /// Smallest allowed price increment; also the price discretisation
    /// unit used by each [`SideBook`].
    pub tick_size: f64,
    /// Smallest allowed quantity increment.
    pub lot_size: f64,
}

impl Default for BookOptions {
    fn default() -> Self {
        BookOptions {
            tick_size: 0.0001,
            lot_size: 1.0,
        }
    }
}

/// Outcome of [`OrderBook::match_or_rest`]: the taker's final state plus
/// every trade snapshot produced while matching it.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// The incoming order's final state: filled, partially filled and
    /// resting, partially filled and canceled (`ioc`), or rejected (`gtx`
    /// cross / `fok` under-depth).
    pub order: Order,
    /// Snapshot of every maker order touched, interleaved with a taker
    /// snapshot after each price level, in the order fills occurred. Empty
    /// when the order rested untouched or was rejected.
    pub trades: Vec<Order>,
}

/// A two-sided limit order book: one [`SideBook`] per side, plus the shared
/// tick/lot configuration and an id -> (side, price) index for cancel-by-id.
#[derive(Debug, Clone)]
pub struct OrderBook {
    options: BookOptions,
    bid: SideBook,
    ask: SideBook,
    order_index: HashMap<i64, (Side, f64)>,
}

impl OrderBook {
    /// Construct an empty book with the given options.
    pub fn new(options: BookOptions) -> Self {
        OrderBook {
            options,
            bid: SideBook::new(Side::Buy, options.tick_size),
            ask: SideBook::new(Side::Sell, options.tick_size),
            order_index: HashMap::new(),
        }
    }

    /// The book's tick/lot configuration.
    pub fn options(&self) -> BookOptions {
        self.options
    }

    fn side_book(&self, side: Side) -> &SideBook {
        match side {
            Side::Buy => &self.bid,
            _ => &self.ask,
        }
    }

    fn side_book_mut(&mut self, side: Side) -> &mut SideBook {
        match side {
            Side::Buy => &mut self.bid,
            _ => &mut self.ask,
        }
    }

    /// Insert `order` directly into the side book matching `order.side`,
    /// without matching it against the opposite side.
    ///
    /// Intended for seeding book state (e.g. replaying a depth snapshot);
    /// strategy order flow should use [`Self::match_or_rest`] instead.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidSide`] if `order.side == Side::None`.
    pub fn add_order(&mut self, order: Order) -> Result<(), SimError> {
        if order.side == Side::None {
            return Err(SimError::InvalidSide);
        }
        let id = order.id;
        let price = order.price;
        let side = order.side;
        self.side_book_mut(side).add(order)?;
        self.order_index.insert(id, (side, price));
        Ok(())
    }

    /// Cancel the order with `order_id`, wherever it is resting.
    ///
    /// # Errors
    /// Returns [`SimError::OrderNotFound`] if no such order is resting.
    pub fn cancel_order(&mut self, order_id: i64) -> Result<Order, SimError> {
        let (side, price) = self
            .order_index
            .remove(&order_id)
            .ok_or(SimError::OrderNotFound { order_id })?;
        self.side_book_mut(side).cancel(order_id, price)
    }

    /// Match `order` against the opposite side, then rest the residual (if
    /// any and if time-in-force allows) on its own side.
    ///
    /// Time-in-force semantics:
    /// - `gtc`: residual rests.
    /// - `gtx`: rejected before matching if it would have crossed.
    /// - `fok`: rejected before matching if marketable depth can't fill it
    ///   completely; otherwise behaves like `gtc` once filled.
    /// - `ioc`: residual after matching is discarded, never rests.
    ///
    /// Market orders never rest regardless of time-in-force, since they
    /// carry no price to rest at.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidSide`] if `order.side == Side::None`, or
    /// [`SimError::InvalidPrice`] if a limit order's price isn't finite and
    /// positive. `gtx` crossing and `fok` under-depth are *not* errors —
    /// they're reported in-band via [`OrderStatus::Rejected`] on the
    /// returned order.
    pub fn match_or_rest(&mut self, mut order: Order) -> Result<MatchOutcome, SimError> {
        if order.side == Side::None {
            return Err(SimError::InvalidSide);
        }
        if order.order_type == OrderType::Limit && !(order.price.is_finite() && order.price > 0.0) {
            return Err(SimError::InvalidPrice { price: order.price });
        }

        trace!(
            id = order.id,
            side = ?order.side,
            qty = order.qty,
            tif = ?order.time_in_force,
            "matching order"
        );

        let limit_price = match order.order_type {
            OrderType::Market => None,
            OrderType::Limit => Some(order.price),
        };
        let opposite = order.side.opposite();

        if order.time_in_force == TimeInForce::Gtx
            && self
                .side_book(opposite)
                .is_marketable(order.side, limit_price)
        {
            warn!(id = order.id, "gtx order would cross, rejecting");
            order.status = OrderStatus::Rejected;
            return Ok(MatchOutcome {
                order,
                trades: Vec::new(),
            });
        }

        if order.time_in_force == TimeInForce::Fok {
            let available = self
                .side_book(opposite)
                .marketable_depth(order.side, limit_price);
            if available < order.remaining() {
                warn!(
                    id = order.id,
                    requested = order.remaining(),
                    available,
                    "fok order under-depth, rejecting"
                );
                order.status = OrderStatus::Rejected;
                return Ok(MatchOutcome {
                    order,
                    trades: Vec::new(),
                });
            }
        }

        let trades = self.side_book_mut(opposite).match_order(&mut order);
        if !trades.is_empty() {
            debug!(id = order.id, fills = trades.len(), "order matched");
        }

        if order.remaining() > 0.0 {
            let should_rest = order.order_type == OrderType::Limit
                && order.time_in_force != TimeInForce::Ioc
                && order.time_in_force != TimeInForce::Fok;
            if should_rest {
                order.status = if order.exec_qty > 0.0 {
                    OrderStatus::PartiallyFilled
                } else {
                    OrderStatus::New
                };
                let id = order.id;
                let price = order.price;
                let side = order.side;
                self.side_book_mut(side)
                    .add(order.clone())
                    .expect("side already validated");
                self.order_index.insert(id, (side, price));
            } else {
                order.status = OrderStatus::Canceled;
            }
        }

        Ok(MatchOutcome { order, trades })
    }

    /// The n-th best bid price (0 = best).
    pub fn bid(&self, n: usize) -> Option<f64> {
        self.bid.best_price(n)
    }

    /// The n-th best ask price (0 = best).
    pub fn ask(&self, n: usize) -> Option<f64> {
        self.ask.best_price(n)
    }

    /// Total quantity at the n-th best bid level.
    pub fn bid_qty(&self, n: usize) -> Option<f64> {
        self.bid.best_qty(n)
    }

    /// Total quantity at the n-th best ask level.
    pub fn ask_qty(&self, n: usize) -> Option<f64> {
        self.ask.best_qty(n)
    }

    /// `(price, qty)` for the top `n` bid levels, best-first.
    pub fn bid_depth(&self, n: usize) -> Vec<(f64, f64)> {
        self.bid.depth(n)
    }

    /// `(price, qty)` for the top `n` ask levels, best-first.
    pub fn ask_depth(&self, n: usize) -> Vec<(f64, f64)> {
        self.ask.depth(n)
    }

    /// `ask(0) - bid(0)`, or `None` if either side is empty.
    pub fn spread(&self) -> Option<f64> {
        Some(self.ask(0)? - self.bid(0)?)
    }

    /// `(ask(0) + bid(0)) / 2`, or `None` if either side is empty.
    pub fn mid_price(&self) -> Option<f64> {
        Some((self.ask(0)? + self.bid(0)?) / 2.0)
    }
}
