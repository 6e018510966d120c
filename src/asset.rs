//! Asset configuration: per-venue tick/lot sizes and network delays.

/// Network/processing delay between Local and Exchange for one asset.
///
/// Units match [`crate::world::World::time`] (e.g. nanoseconds); the world
/// never interprets them beyond adding them to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delay {
    /// Delay applied when an order travels from Local to Exchange.
    pub send: i64,
    /// Delay applied when a fill travels from Exchange back to Local.
    pub receive: i64,
}

/// One tradeable instrument's venue configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Human-readable identifier, not used for routing (routing is by
    /// index into [`crate::world::World`]'s asset list).
    pub name: String,
    /// Smallest allowed quantity increment.
    pub lot_size: f64,
    /// Smallest allowed price increment.
    pub tick_size: f64,
    /// Local <-> Exchange network/processing delay.
    pub delay: Delay,
}

impl Asset {
    /// Construct an asset with the given name and delay, and the default
    /// `lot_size` (1) / `tick_size` (0.0001).
    pub fn new(name: impl Into<String>, delay: Delay) -> Self {
        Asset {
            name: name.into(),
            lot_size: 1.0,
            tick_size: 0.0001,
            delay,
        }
    }
}
