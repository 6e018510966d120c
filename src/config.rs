//! Validated construction inputs for [`crate::world::World`].
//!
//! [`World::new`](crate::world::World::new) takes already-trusted
//! [`Asset`] values directly, the same way [`OrderBook::new`]
//! (crate::order_book::OrderBook::new) takes an already-trusted
//! [`BookOptions`](crate::order_book::BookOptions). `WorldConfig` is the
//! validating front door for the common case of building a world from
//! externally-sourced (e.g. config-file) asset definitions, where a
//! non-finite or non-positive tick/lot size is an input error rather than a
//! programmer error.

use crate::asset::Asset;
use crate::error::SimError;

/// A validated set of assets ready to build a [`crate::world::World`] from.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    assets: Vec<Asset>,
}

impl WorldConfig {
    /// Validate `assets` and wrap them for world construction.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidPrice`] if any asset's `tick_size` or
    /// `lot_size` is non-finite or not strictly positive.
    pub fn new(assets: Vec<Asset>) -> Result<Self, SimError> {
        for asset in &assets {
            validate_increment(asset.tick_size)?;
            validate_increment(asset.lot_size)?;
        }
        Ok(WorldConfig { assets })
    }

    /// The validated asset list, consuming the config.
    pub fn into_assets(self) -> Vec<Asset> {
        self.assets
    }
}

fn validate_increment(value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidPrice { price: value })
    }
}
