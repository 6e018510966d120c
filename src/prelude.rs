//! Prelude module that re-exports the commonly used types and traits.
//!
//! ```
//! use backsim_core::prelude::*;
//! ```

pub use crate::asset::{Asset, Delay};
pub use crate::config::WorldConfig;
pub use crate::error::SimError;
pub use crate::event::{Event, EventPayload, EventPool};
pub use crate::order::{Order, OrderStatus, OrderType, Side, TimeInForce};
pub use crate::order_book::{BookOptions, MatchOutcome, OrderBook};
pub use crate::price_level::PriceLevel;
pub use crate::side_book::SideBook;
pub use crate::world::{LocalStrategy, World};
