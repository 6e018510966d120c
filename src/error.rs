//! Crate-wide error type.

use std::fmt;

/// Errors surfaced by the order book and side book layers.
///
/// Policy-driven rejections (`gtx` crossing, `fok` under-depth) are *not*
/// reported through this type — per the error handling design, those are
/// mapped to [`crate::order::OrderStatus::Rejected`] and a synthetic
/// local-bound event, reported in-band to the strategy. This enum exists
/// for genuine structural errors: a missing order, a malformed side, or a
/// caller that inspects fill-or-kill depth directly.
#[derive(Debug)]
#[non_exhaustive]
pub enum SimError {
    /// A cancel targeted an order id that isn't resting at the given level
    /// or side.
    OrderNotFound {
        /// The order id that could not be found.
        order_id: i64,
    },

    /// An order with [`crate::order::Side::None`] was submitted, or an
    /// order was added to a level/side it does not belong to.
    InvalidSide,

    /// A `fok` order cannot be completely filled against currently
    /// marketable depth.
    InsufficientDepth {
        /// Quantity requested.
        requested: f64,
        /// Quantity actually available at marketable prices.
        available: f64,
    },

    /// The order price is not finite, or not positive.
    InvalidPrice {
        /// The price that failed validation.
        price: f64,
    },

    /// A container growth failed. Reserved for fallible-allocation paths
    /// (`try_reserve`); the infallible `std` collections used elsewhere in
    /// this crate abort on allocation failure rather than returning this
    /// variant, so it is never constructed today.
    OutOfMemory,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::OrderNotFound { order_id } => write!(f, "order not found: {order_id}"),
            SimError::InvalidSide => write!(f, "invalid side: order has no buy/sell side"),
            SimError::InsufficientDepth {
                requested,
                available,
            } => write!(
                f,
                "insufficient depth: requested {requested}, available {available}"
            ),
            SimError::InvalidPrice { price } => write!(f, "invalid price: {price}"),
            SimError::OutOfMemory => write!(f, "allocation failed"),
        }
    }
}

impl std::error::Error for SimError {}
