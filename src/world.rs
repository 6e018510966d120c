//! World: the virtual clock binding a Local (strategy-facing) side and an
//! Exchange side through two delayed event pools.
//!
//! Per the design notes, the cyclic "façades reach back into the world"
//! shape of the original design is collapsed into plain methods on
//! [`World`]. [`World::local`] still returns a handle so call sites read as
//! `world.local().new_order(...)`, matching the spec's vocabulary, but the
//! handle is a transient borrow (`&mut World`), not a stored back-pointer —
//! there is no cycle to manage.

use tracing::{debug, trace};

use crate::asset::Asset;
use crate::config::WorldConfig;
use crate::error::SimError;
use crate::event::{Event, EventPayload, EventPool};
use crate::order::Order;
use crate::order_book::{BookOptions, OrderBook};

/// Callback interface the host (backtest driver / strategy) implements to
/// receive local-bound events after each [`World::goto_time`] advance.
///
/// The core never calls this synchronously from [`World::local`] — only
/// from `goto_time`, once the delivery time has actually arrived.
pub trait LocalStrategy {
    /// Invoked once per `goto_time` advance with the local-bound events
    /// (fills, rejects) delivered at that timestamp, in delivery order.
    fn on_local_events(&mut self, batch: &[Event]);
}

/// The simulation clock, asset configuration, and the two event pools
/// connecting Local and Exchange.
pub struct World {
    /// Current virtual time. Monotonically non-decreasing across every
    /// public operation.
    pub time: i64,
    assets: Vec<Asset>,
    books: Vec<OrderBook>,
    ex_ep: EventPool,
    local_ep: EventPool,
    strategy: Option<Box<dyn LocalStrategy>>,
}

impl World {
    /// Construct a world at `time = 0` with one order book per asset,
    /// configured from each asset's `tick_size`/`lot_size`.
    pub fn new(assets: Vec<Asset>) -> Self {
        let books = assets
            .iter()
            .map(|asset| {
                OrderBook::new(BookOptions {
                    tick_size: asset.tick_size,
                    lot_size: asset.lot_size,
                })
            })
            .collect();
        World {
            time: 0,
            assets,
            books,
            ex_ep: EventPool::new(),
            local_ep: EventPool::new(),
            strategy: None,
        }
    }

    /// Validate `assets` and construct a world from them.
    ///
    /// Unlike [`World::new`], which trusts its caller the way
    /// [`OrderBook::new`] trusts an already-built [`BookOptions`], this
    /// rejects a non-finite or non-positive tick/lot size up front.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidPrice`] if any asset fails validation; see
    /// [`WorldConfig::new`].
    pub fn try_new(assets: Vec<Asset>) -> Result<Self, SimError> {
        let config = WorldConfig::new(assets)?;
        Ok(World::new(config.into_assets()))
    }

    /// Install the strategy callback invoked by [`World::goto_time`].
    pub fn set_strategy(&mut self, strategy: Box<dyn LocalStrategy>) {
        self.strategy = Some(strategy);
    }

    /// Read-only access to an asset's configuration.
    pub fn asset(&self, asset_idx: usize) -> &Asset {
        &self.assets[asset_idx]
    }

    /// Read-only access to an asset's order book.
    pub fn book(&self, asset_idx: usize) -> &OrderBook {
        &self.books[asset_idx]
    }

    /// Number of events currently in flight toward the exchange.
    pub fn ex_ep_len(&self) -> usize {
        self.ex_ep.len()
    }

    /// Number of events currently in flight toward the strategy.
    pub fn local_ep_len(&self) -> usize {
        self.local_ep.len()
    }

    /// Borrow `self` as the Local façade: `world.local().new_order(...)`.
    pub fn local(&mut self) -> LocalHandle<'_> {
        LocalHandle(self)
    }

    /// Advance virtual time and process both event pools.
    ///
    /// `t = None` advances to the minimum of the two pools' earliest
    /// pending times (a no-op if both are empty). Otherwise advances
    /// directly to `t`. Exchange events are processed before Local events
    /// at the same timestamp, so strategy orders submitted "now" are seen
    /// by the exchange ahead of any fills the exchange produces for this
    /// same tick.
    pub fn goto_time(&mut self, t: Option<i64>) {
        let target = match t {
            Some(t) => t,
            None => match (self.ex_ep.earliest(), self.local_ep.earliest()) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => return,
            },
        };
        // Time never moves backwards, even if a caller passes a stale `t`.
        let target = target.max(self.time);
        self.time = target;

        let ex_batch = self.ex_ep.drain_until(target);
        self.process_exchange_batch(ex_batch);

        let local_batch = self.local_ep.drain_until(target);
        self.process_local_batch(local_batch);
    }

    fn process_exchange_batch(&mut self, batch: Vec<Event>) {
        for event in batch {
            let EventPayload::NewOrder(order) = event.payload else {
                continue;
            };
            let asset_id = event.asset_id;
            let receive_delay = self.assets[asset_id].delay.receive;
            let outcome = match self.books[asset_id].match_or_rest(order) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(%err, asset_id, "exchange rejected malformed order");
                    continue;
                }
            };

            let fire_time = self.time + receive_delay;
            if outcome.order.status == crate::order::OrderStatus::Rejected {
                self.local_ep.add(Event::new(
                    fire_time,
                    asset_id,
                    EventPayload::Reject(outcome.order),
                ));
                continue;
            }
            if !outcome.trades.is_empty() {
                debug!(
                    asset_id,
                    fills = outcome.trades.len(),
                    "emitting fill events"
                );
            }
            for trade in outcome.trades {
                self.local_ep
                    .add(Event::new(fire_time, asset_id, EventPayload::Fill(trade)));
            }
        }
    }

    fn process_local_batch(&mut self, batch: Vec<Event>) {
        if batch.is_empty() {
            return;
        }
        if let Some(strategy) = self.strategy.as_mut() {
            strategy.on_local_events(&batch);
        }
    }
}

/// Transient handle for strategy-facing operations. Borrows `&mut World`
/// for the duration of one call; never stored.
pub struct LocalHandle<'a>(&'a mut World);

impl LocalHandle<'_> {
    /// Submit a new order for `asset_idx`. Stamps `order.create_timestamp`
    /// with the current virtual time and enqueues it for delivery to the
    /// exchange after that asset's send delay.
    pub fn new_order(&mut self, asset_idx: usize, mut order: Order) {
        let world = &mut *self.0;
        order.create_timestamp = world.time;
        let fire_time = world.time + world.assets[asset_idx].delay.send;
        trace!(
            asset_idx,
            id = order.id,
            fire_time,
            "local submitting new order"
        );
        world.ex_ep.add(Event::new(
            fire_time,
            asset_idx,
            EventPayload::NewOrder(order),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Delay;
    use crate::order::{OrderType, Side, TimeInForce};

    fn order(id: i64, price: f64, side: Side, qty: f64) -> Order {
        Order::new(id, price, side, qty, OrderType::Limit, TimeInForce::Gtc, 0)
    }

    // Orders submitted before an advance rest on the book without producing
    // fills when nothing crosses; time advances to the next pending event.
    #[test]
    fn world_round_trip_rests_non_crossing_orders() {
        let assets = vec![
            Asset {
                name: "A".into(),
                lot_size: 1.0,
                tick_size: 0.01,
                delay: Delay {
                    send: 1,
                    receive: 2,
                },
            },
            Asset {
                name: "B".into(),
                lot_size: 1.0,
                tick_size: 0.01,
                delay: Delay {
                    send: 1,
                    receive: 1,
                },
            },
        ];
        let mut world = World::new(assets);
        assert_eq!(world.time, 0);

        world.local().new_order(0, order(1, 100.0, Side::Buy, 1.0));
        world.local().new_order(1, order(2, 100.0, Side::Buy, 1.0));
        assert_eq!(world.ex_ep_len(), 2);

        world.goto_time(None);
        assert_eq!(world.time, 1);
        assert_eq!(world.ex_ep_len(), 0);
        // Neither order crossed anything (both rest as the book's first
        // order), so no fills are generated yet.
        assert_eq!(world.local_ep_len(), 0);
        assert_eq!(world.book(0).bid(0), Some(100.0));
        assert_eq!(world.book(1).bid(0), Some(100.0));
    }

    #[test]
    fn crossing_orders_produce_fills_after_receive_delay() {
        let assets = vec![Asset {
            name: "A".into(),
            lot_size: 1.0,
            tick_size: 1.0,
            delay: Delay {
                send: 1,
                receive: 2,
            },
        }];
        let mut world = World::new(assets);
        world.local().new_order(0, order(1, 100.0, Side::Sell, 5.0));
        world.goto_time(None); // time = 1, resting sell sits on the book.

        world.local().new_order(0, order(2, 101.0, Side::Buy, 5.0));
        world.goto_time(None); // time = 2, exchange matches, fills enqueued for time = 4.
        assert_eq!(world.time, 2);
        assert_eq!(world.local_ep_len(), 2);

        world.goto_time(None);
        assert_eq!(world.time, 4);
        assert_eq!(world.local_ep_len(), 0);
    }

    #[test]
    fn try_new_rejects_invalid_asset_config() {
        let bad = Asset {
            name: "A".into(),
            lot_size: 1.0,
            tick_size: 0.0,
            delay: Delay {
                send: 0,
                receive: 0,
            },
        };
        let result = World::try_new(vec![bad]);
        assert!(result.is_err());
        match result {
            Ok(_) => unreachable!(),
            Err(err) => assert!(matches!(err, crate::error::SimError::InvalidPrice { .. })),
        }
    }

    #[test]
    fn time_never_moves_backwards() {
        let mut world = World::new(vec![Asset::new(
            "A",
            Delay {
                send: 0,
                receive: 0,
            },
        )]);
        world.goto_time(Some(10));
        assert_eq!(world.time, 10);
        world.goto_time(Some(3));
        assert_eq!(world.time, 10);
    }

    struct RecordingStrategy {
        events_seen: std::rc::Rc<std::cell::Cell<usize>>,
    }

    impl LocalStrategy for RecordingStrategy {
        fn on_local_events(&mut self, batch: &[Event]) {
            self.events_seen.set(self.events_seen.get() + batch.len());
        }
    }

    #[test]
    fn strategy_callback_invoked_on_local_delivery() {
        let assets = vec![Asset {
            name: "A".into(),
            lot_size: 1.0,
            tick_size: 1.0,
            delay: Delay {
                send: 0,
                receive: 0,
            },
        }];
        let mut world = World::new(assets);
        let events_seen = std::rc::Rc::new(std::cell::Cell::new(0));
        world.set_strategy(Box::new(RecordingStrategy {
            events_seen: events_seen.clone(),
        }));

        world.local().new_order(0, order(1, 100.0, Side::Sell, 5.0));
        world.goto_time(None);
        world.local().new_order(0, order(2, 101.0, Side::Buy, 5.0));
        world.goto_time(None);

        // Two trade snapshots (maker + taker) delivered to the strategy.
        assert_eq!(events_seen.get(), 2);
    }
}
