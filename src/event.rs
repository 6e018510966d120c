//! Event & Event Pool: time-tagged messages shuttled between Local and
//! Exchange, and the delayed queues that hold them until their delivery
//! time.

use crate::order::Order;

/// The payload carried by an [`Event`].
///
/// Currently spans order submission and the two outcomes the matching
/// engine can report back to the strategy. `#[non_exhaustive]` because the
/// wire protocol this models is meant to grow (cancel/replace acks, market
/// data) without breaking downstream matches on this enum.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EventPayload {
    /// A new order submitted by the strategy, destined for the exchange.
    NewOrder(Order),
    /// A fill (full or partial) reported back to the strategy. Carries the
    /// snapshot produced by the matching engine — either the maker or the
    /// taker side of a trade.
    Fill(Order),
    /// An order rejected by a time-in-force policy check (`gtx` cross,
    /// `fok` under-depth), reported back to the strategy in-band.
    Reject(Order),
}

/// A time-tagged message in transit between Local and Exchange.
#[derive(Debug, Clone)]
pub struct Event {
    /// Virtual time at which this event is delivered.
    pub finish_time: i64,
    /// Index into [`crate::world::World`]'s asset list this event concerns.
    pub asset_id: usize,
    /// The message itself.
    pub payload: EventPayload,
}

impl Event {
    /// Construct a new event. `finish_time` must be `>= ` the time at which
    /// it was enqueued; callers are responsible for that invariant (it's
    /// cheaper to check once at the call site than on every event).
    pub fn new(finish_time: i64, asset_id: usize, payload: EventPayload) -> Self {
        Event {
            finish_time,
            asset_id,
            payload,
        }
    }
}

/// An unordered collection of events awaiting delivery, with a cached
/// earliest finish time so [`EventPool::earliest`] and the no-op fast path
/// of [`EventPool::drain_until`] are O(1).
#[derive(Debug, Clone, Default)]
pub struct EventPool {
    events: Vec<Event>,
    cached_earliest: Option<i64>,
}

impl EventPool {
    /// Construct an empty pool.
    pub fn new() -> Self {
        EventPool::default()
    }

    /// Number of events currently held.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the pool holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The earliest `finish_time` among held events, or `None` if empty.
    pub fn earliest(&self) -> Option<i64> {
        self.cached_earliest
    }

    /// Append `event`, updating the cached earliest time.
    pub fn add(&mut self, event: Event) {
        self.cached_earliest = Some(match self.cached_earliest {
            Some(earliest) => earliest.min(event.finish_time),
            None => event.finish_time,
        });
        self.events.push(event);
    }

    /// Remove and return every event with `finish_time <= t`, in
    /// non-decreasing `finish_time` order (equal times preserve enqueue
    /// order). The pool keeps the rest, with the cached earliest
    /// recomputed from what remains.
    ///
    /// Idempotent: calling this again with the same `t` (or smaller)
    /// immediately afterward returns an empty sequence.
    pub fn drain_until(&mut self, t: i64) -> Vec<Event> {
        if self.events.is_empty() {
            return Vec::new();
        }
        if let Some(earliest) = self.cached_earliest
            && earliest > t
        {
            return Vec::new();
        }

        let mut delivered = Vec::new();
        let mut retained = Vec::new();
        for event in self.events.drain(..) {
            if event.finish_time <= t {
                delivered.push(event);
            } else {
                retained.push(event);
            }
        }
        // `sort_by_key` is a stable sort, so events with equal finish_time
        // keep their relative enqueue order.
        delivered.sort_by_key(|e| e.finish_time);
        self.cached_earliest = retained.iter().map(|e| e.finish_time).min();
        self.events = retained;
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderType, Side, TimeInForce};

    fn order(id: i64) -> Order {
        Order::new(
            id,
            100.0,
            Side::Buy,
            1.0,
            OrderType::Limit,
            TimeInForce::Gtc,
            0,
        )
    }

    fn event_at(t: i64, id: i64) -> Event {
        Event::new(t, 0, EventPayload::NewOrder(order(id)))
    }

    #[test]
    fn drain_until_delivers_earliest_in_enqueue_order() {
        let mut pool = EventPool::new();
        pool.add(event_at(2, 1));
        pool.add(event_at(1, 2));
        pool.add(event_at(3, 3));
        pool.add(event_at(1, 4));

        assert_eq!(pool.earliest(), Some(1));
        let delivered = pool.drain_until(pool.earliest().unwrap());
        let ids: Vec<i64> = delivered
            .iter()
            .map(|e| match &e.payload {
                EventPayload::NewOrder(o) => o.id,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.earliest(), Some(2));
    }

    // Property 5: drain idempotence.
    #[test]
    fn drain_until_is_idempotent() {
        let mut pool = EventPool::new();
        pool.add(event_at(5, 1));
        let first = pool.drain_until(5);
        assert_eq!(first.len(), 1);
        let second = pool.drain_until(5);
        assert!(second.is_empty());
    }

    // Property 4.
    #[test]
    fn empty_iff_no_earliest() {
        let mut pool = EventPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.earliest(), None);
        pool.add(event_at(1, 1));
        assert!(!pool.is_empty());
        assert_eq!(pool.earliest(), Some(1));
    }

    #[test]
    fn drain_until_before_earliest_is_a_no_op() {
        let mut pool = EventPool::new();
        pool.add(event_at(10, 1));
        assert!(pool.drain_until(5).is_empty());
        assert_eq!(pool.len(), 1);
    }
}
