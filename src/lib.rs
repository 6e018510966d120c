//! # Backtesting Core: Order Book + Simulation World
//!
//! A deterministic, event-driven core for a market-microstructure
//! backtesting engine: a trading strategy interacting with one or more
//! limit-order-book venues, with configurable network/processing latencies
//! between the strategy ("local") and the exchange.
//!
//! ## Components
//!
//! - [`order`] — the [`order::Order`] record and its status/type/TIF enums.
//! - [`price_level`] — [`price_level::PriceLevel`], the price-time-priority
//!   matching unit.
//! - [`side_book`] — [`side_book::SideBook`], one side of a book keyed by
//!   discretised price bucket.
//! - [`order_book`] — [`order_book::OrderBook`], the composed two-sided
//!   book with time-in-force-aware matching.
//! - [`event`] — [`event::Event`] and [`event::EventPool`], the delayed
//!   message queues connecting Local and Exchange.
//! - [`world`] — [`world::World`], the virtual clock binding Local and
//!   Exchange through two event pools.
//! - [`asset`] — per-instrument tick/lot/delay configuration.
//! - [`error`] — [`error::SimError`], the crate-wide error type.
//!
//! ## Design
//!
//! The core is strictly single-threaded, cooperatively scheduled by virtual
//! time: one logical thread of control, no locks, no I/O suspension. The
//! only "suspension" point is a return from [`world::World::goto_time`], at
//! which point the host may inject further orders before the next advance.
//!
//! Out of scope: the process entrypoint, allocator selection, logging
//! configuration, file loading of historical data, and strategy code
//! itself — those are external collaborators.

pub mod asset;
pub mod config;
pub mod error;
pub mod event;
pub mod order;
pub mod order_book;
pub mod prelude;
pub mod price_level;
pub mod side_book;
pub mod world;
