//! Order record and its supporting enums.
//!
//! An [`Order`] is a value type describing both a trader's intent (price,
//! side, quantity, type, time-in-force) and its mutable execution state
//! (status, cumulative fill, last-fill fields). It is owned by exactly one
//! [`crate::price_level::PriceLevel`] while resting, and copied by value into
//! [`crate::event::Event`]s otherwise — there is no shared ownership.

/// Which side of the book an order belongs to.
///
/// `None` is a valid value for an order that has not yet been assigned a
/// side; submitting one to the book is an [`crate::error::SimError::InvalidSide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// A buy (bid) order.
    Buy,
    /// A sell (ask) order.
    Sell,
    /// No side assigned. Never valid as input to book operations.
    None,
}

impl Side {
    /// The opposite side, used to find the book an order matches against.
    ///
    /// `None` has no opposite; it maps to itself since no caller should ever
    /// dereference it for routing.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
            Side::None => Side::None,
        }
    }
}

/// The order's execution type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    /// Rests at a specified price if not immediately fully matched (subject
    /// to time-in-force).
    Limit,
    /// Matches against the best available price(s) until filled or the book
    /// is exhausted; never rests.
    Market,
}

/// Time-in-force policy, enforced by [`crate::order_book::OrderBook::match_or_rest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeInForce {
    /// Good-till-canceled: rests indefinitely until filled or canceled.
    Gtc,
    /// Good-till-crossing / post-only: rejected if it would cross the book.
    Gtx,
    /// Fill-or-kill: filled entirely immediately, or rejected with no fills.
    Fok,
    /// Immediate-or-cancel: filled as much as possible immediately, residual
    /// canceled rather than rested.
    Ioc,
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// No status assigned yet.
    None,
    /// Accepted and not yet touched by matching.
    New,
    /// Time-in-force expired before being filled (reserved for future
    /// good-till-date support; unused by the current matching engine).
    Expired,
    /// Fully executed.
    Filled,
    /// Removed from the book before being fully executed.
    Canceled,
    /// Executed for less than its original quantity and still resting, or
    /// canceled with a partial fill already credited.
    PartiallyFilled,
    /// Rejected by a time-in-force policy check (`gtx` cross, `fok`
    /// under-depth) before any fill was committed.
    Rejected,
    /// Submitted with a combination of fields the book cannot process
    /// (e.g. `side == Side::None`).
    Unsupported,
}

/// An order: immutable intent plus mutable execution state.
///
/// `id` is unique within the simulation and is the only thing equality looks
/// at, matching spec's "equality-by-id is sufficient for lookups".
#[derive(Debug, Clone)]
pub struct Order {
    /// Identifier unique within the simulation.
    pub id: i64,
    /// Limit price. Ignored for [`OrderType::Market`] orders.
    pub price: f64,
    /// Which side of the book this order belongs to.
    pub side: Side,
    /// Original requested quantity.
    pub qty: f64,
    /// Cumulative quantity executed so far. Invariant: `0 <= exec_qty <= qty`.
    pub exec_qty: f64,
    /// Quantity credited by the most recent fill (single level, single pass).
    pub current_exec_qty: f64,
    /// Price at which the most recent fill occurred.
    pub current_exec_price: f64,
    /// Whether the most recent fill was as the resting (maker) side.
    pub current_is_maker: bool,
    /// Limit or market.
    pub order_type: OrderType,
    /// Time-in-force policy.
    pub time_in_force: TimeInForce,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Virtual timestamp at which the order was created.
    pub create_timestamp: i64,
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

impl Order {
    /// Construct a new order in [`OrderStatus::New`] with no fills yet.
    pub fn new(
        id: i64,
        price: f64,
        side: Side,
        qty: f64,
        order_type: OrderType,
        time_in_force: TimeInForce,
        create_timestamp: i64,
    ) -> Self {
        Order {
            id,
            price,
            side,
            qty,
            exec_qty: 0.0,
            current_exec_qty: 0.0,
            current_exec_price: 0.0,
            current_is_maker: false,
            order_type,
            time_in_force,
            status: OrderStatus::New,
            create_timestamp,
        }
    }

    /// Remaining (unexecuted) quantity: `qty - exec_qty`.
    pub fn remaining(&self) -> f64 {
        self.qty - self.exec_qty
    }

    /// Whether the order has no remaining quantity.
    pub fn is_fully_executed(&self) -> bool {
        self.remaining() <= 0.0
    }
}
