use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use crate::arena::OrderArena;
use crate::error::ExecutionError;
use crate::level::PriceLevel;
use crate::models::{
    BookLevel, Order, OrderId, OrderKind, OrderModify, Price, Quantity, Side,
    TimeInForce, Trade,
};

const DEFAULT_ARENA_CAPACITY: usize = 10_000;

/// A single-instrument limit order book matching under price-time
/// priority.
///
/// The bid map is keyed by `Reverse<Price>` so that for either side the
/// first map entry is the best of book. Resting orders live in an arena;
/// the order index maps an id to its arena slot, which doubles as the
/// positional handle used for O(1) cancellation.
///
/// All operations are synchronous and the book is not internally
/// synchronized; concurrent submitters must serialize outside.
#[derive(Debug)]
pub struct OrderBook {
    bids: BTreeMap<Reverse<Price>, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    arena: OrderArena,
    index: HashMap<OrderId, usize>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new(DEFAULT_ARENA_CAPACITY)
    }
}

impl OrderBook {
    pub fn new(arena_capacity: usize) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            arena: OrderArena::new(arena_capacity),
            index: HashMap::with_capacity(arena_capacity),
        }
    }

    #[inline(always)]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next().map(|Reverse(price)| *price)
    }

    #[inline(always)]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    #[inline(always)]
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn volume_at(&self, price: Price, side: Side) -> Quantity {
        let level = match side {
            Side::Buy => self.bids.get(&Reverse(price)),
            Side::Sell => self.asks.get(&price),
        };
        level.map_or(0, PriceLevel::total_volume)
    }

    /// Top `levels` bid prices with merged volumes, best (highest) first.
    pub fn bid_depth(&self, levels: usize) -> Vec<BookLevel> {
        self.bids
            .iter()
            .take(levels)
            .map(|(&Reverse(price), level)| BookLevel {
                price,
                volume: level.total_volume(),
            })
            .collect()
    }

    /// Top `levels` ask prices with merged volumes, best (lowest) first.
    pub fn ask_depth(&self, levels: usize) -> Vec<BookLevel> {
        self.asks
            .iter()
            .take(levels)
            .map(|(&price, level)| BookLevel {
                price,
                volume: level.total_volume(),
            })
            .collect()
    }

    #[inline(always)]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Submits an order and returns the trades it produced, in execution
    /// order.
    ///
    /// A FOK limit first checks that the opposite side can fill it
    /// completely at prices satisfying the limit; if not, nothing changes
    /// and no trades are returned. An unfilled GTC limit remainder rests;
    /// IOC and market remainders are discarded. Submitting an id that is
    /// already resting is a caller bug and is not checked.
    pub fn add_order(&mut self, mut order: Order) -> Vec<Trade> {
        match order.kind {
            OrderKind::Limit => {
                if order.tif == TimeInForce::Fok && !self.can_fully_match(&order) {
                    return Vec::new();
                }
                let limit = order.price;
                let trades = match order.side {
                    Side::Buy => self.match_asks(&mut order, Some(limit)),
                    Side::Sell => self.match_bids(&mut order, Some(limit)),
                };
                if order.tif == TimeInForce::Gtc && !order.is_filled() {
                    self.rest(order);
                }
                trades
            }
            // Market orders trade at any price and never rest, whatever
            // their time-in-force says.
            OrderKind::Market => match order.side {
                Side::Buy => self.match_asks(&mut order, None),
                Side::Sell => self.match_bids(&mut order, None),
            },
        }
    }

    /// Removes a resting order. Returns `false` when the id is not
    /// resting, which is not an error: the order may simply have been
    /// filled or cancelled already.
    pub fn cancel_order(&mut self, id: OrderId) -> bool {
        let Some(idx) = self.index.remove(&id) else {
            return false;
        };
        let (side, price) = {
            let order = &self.arena[idx];
            (order.side, order.price)
        };
        match side {
            Side::Buy => {
                let level = self
                    .bids
                    .get_mut(&Reverse(price))
                    .expect("resting bid without a price level");
                level.unlink(&mut self.arena, idx);
                if level.is_empty() {
                    self.bids.remove(&Reverse(price));
                }
            }
            Side::Sell => {
                let level = self
                    .asks
                    .get_mut(&price)
                    .expect("resting ask without a price level");
                level.unlink(&mut self.arena, idx);
                if level.is_empty() {
                    self.asks.remove(&price);
                }
            }
        }
        self.arena.remove(idx);
        true
    }

    /// Cancels the resting order and resubmits its id with the new price
    /// and quantity, keeping the original side, kind and time-in-force.
    /// The replacement re-enters the full matching pipeline as a fresh
    /// arrival, so it loses time priority even at an unchanged price.
    pub fn modify_order(
        &mut self,
        modify: OrderModify,
    ) -> Result<Vec<Trade>, ExecutionError> {
        let &idx = self
            .index
            .get(&modify.id)
            .ok_or(ExecutionError::OrderNotFound)?;
        let (side, kind, tif) = {
            let order = &self.arena[idx];
            (order.side, order.kind, order.tif)
        };
        self.cancel_order(modify.id);
        Ok(self.add_order(Order::new(
            modify.id,
            side,
            kind,
            modify.price,
            modify.quantity,
            tif,
        )))
    }

    /// Pure feasibility walk for FOK: accumulates opposite-side volume at
    /// prices satisfying the limit, using the same price comparison as
    /// the matcher, so a feasible order can never end partially filled.
    fn can_fully_match(&self, order: &Order) -> bool {
        let required = order.remaining();
        let mut available: Quantity = 0;
        match order.side {
            Side::Buy => {
                for (&price, level) in &self.asks {
                    if price > order.price {
                        break;
                    }
                    available += level.total_volume();
                    if available >= required {
                        return true;
                    }
                }
            }
            Side::Sell => {
                for (&Reverse(price), level) in &self.bids {
                    if price < order.price {
                        break;
                    }
                    available += level.total_volume();
                    if available >= required {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn match_asks(&mut self, taker: &mut Order, limit: Option<Price>) -> Vec<Trade> {
        let mut trades = Vec::new();
        while taker.remaining() > 0 {
            let Some((&price, level)) = self.asks.iter_mut().next() else {
                break;
            };
            if limit.is_some_and(|limit| price > limit) {
                break;
            }
            Self::fill_level(&mut self.arena, &mut self.index, level, taker, price, &mut trades);
            if level.is_empty() {
                self.asks.remove(&price);
            }
        }
        trades
    }

    fn match_bids(&mut self, taker: &mut Order, limit: Option<Price>) -> Vec<Trade> {
        let mut trades = Vec::new();
        while taker.remaining() > 0 {
            let Some((&Reverse(price), level)) = self.bids.iter_mut().next() else {
                break;
            };
            if limit.is_some_and(|limit| price < limit) {
                break;
            }
            Self::fill_level(&mut self.arena, &mut self.index, level, taker, price, &mut trades);
            if level.is_empty() {
                self.bids.remove(&Reverse(price));
            }
        }
        trades
    }

    fn fill_level(
        arena: &mut OrderArena,
        index: &mut HashMap<OrderId, usize>,
        level: &mut PriceLevel,
        taker: &mut Order,
        price: Price,
        trades: &mut Vec<Trade>,
    ) {
        while taker.remaining() > 0 {
            let Some(front) = level.front() else {
                break;
            };
            let fill_qty = taker.remaining().min(arena[front].remaining());
            taker.fill(fill_qty);
            arena[front].fill(fill_qty);
            level.reduce_volume(fill_qty);
            let (buy_order_id, sell_order_id) = match taker.side {
                Side::Buy => (taker.id, arena[front].id),
                Side::Sell => (arena[front].id, taker.id),
            };
            trades.push(Trade {
                buy_order_id,
                sell_order_id,
                price,
                quantity: fill_qty,
            });
            if arena[front].is_filled() {
                // The id must leave the index before the order leaves the
                // level, or it would still be visible in the book while
                // unreachable by id.
                index.remove(&arena[front].id);
                level.pop_front(arena);
                arena.remove(front);
            }
        }
    }

    fn rest(&mut self, order: Order) {
        let (id, side, price) = (order.id, order.side, order.price);
        let idx = self.arena.insert(order);
        let level = match side {
            Side::Buy => self.bids.entry(Reverse(price)).or_insert_with(PriceLevel::new),
            Side::Sell => self.asks.entry(price).or_insert_with(PriceLevel::new),
        };
        level.push_back(&mut self.arena, idx);
        self.index.insert(id, idx);
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut resting = 0usize;

        let mut prev: Option<Price> = None;
        for (&Reverse(price), level) in &self.bids {
            if let Some(prev) = prev {
                assert!(price < prev, "bid keys must descend");
            }
            prev = Some(price);
            resting += Self::check_level(&self.arena, &self.index, level, price, Side::Buy);
        }

        let mut prev: Option<Price> = None;
        for (&price, level) in &self.asks {
            if let Some(prev) = prev {
                assert!(price > prev, "ask keys must ascend");
            }
            prev = Some(price);
            resting += Self::check_level(&self.arena, &self.index, level, price, Side::Sell);
        }

        assert_eq!(resting, self.index.len(), "index out of step with books");
        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            assert!(bid < ask, "book must not be crossed");
        }
    }

    #[cfg(test)]
    fn check_level(
        arena: &OrderArena,
        index: &HashMap<OrderId, usize>,
        level: &PriceLevel,
        price: Price,
        side: Side,
    ) -> usize {
        let slots = level.slots(arena);
        assert!(!slots.is_empty(), "empty level left in a side book");
        let volume: Quantity = slots.iter().map(|&idx| arena[idx].remaining()).sum();
        assert_eq!(volume, level.total_volume(), "stale level volume cache");
        for &idx in &slots {
            let order = &arena[idx];
            assert_eq!(order.side, side);
            assert_eq!(order.price, price);
            assert!(order.remaining() > 0, "filled order left resting");
            assert_eq!(index.get(&order.id), Some(&idx), "handle mismatch");
        }
        slots.len()
    }
}
