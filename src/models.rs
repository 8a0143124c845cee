#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A price expressed in integral ticks.
pub type Price = i64;

/// An order or trade quantity. Fractional quantities do not exist.
pub type Quantity = u64;

/// A process-unique, caller-assigned order identifier. Ids are never
/// reused once an order has left the book.
pub type OrderId = u64;

/// An order book side.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// The bid (or buy) side.
    Buy,
    /// The ask (or sell) side.
    Sell,
}

/// How an order interacts with the opposite side of the book.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderKind {
    /// Matches only at the limit price or better; the remainder may rest.
    Limit,
    /// Matches at any price until filled or the opposite side is empty;
    /// the remainder is always discarded.
    Market,
}

/// How long an unfilled remainder stays eligible for matching.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeInForce {
    /// Good-till-cancel: the remainder rests until filled or cancelled.
    Gtc,
    /// Immediate-or-cancel: match what is available, discard the rest.
    Ioc,
    /// Fill-or-kill: match completely on arrival or do nothing at all.
    Fok,
}

/// A single order: immutable identity plus a mutable fill counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    /// The unique ID of this order.
    pub id: OrderId,
    /// The order side. It is matched against resting orders on the other
    /// side of the book.
    pub side: Side,
    /// Limit or market.
    pub kind: OrderKind,
    /// The limit price in ticks. Ignored for market orders.
    pub price: Price,
    /// The original order quantity. Must be greater than zero.
    pub quantity: Quantity,
    /// The quantity filled so far. Never exceeds `quantity`.
    pub filled: Quantity,
    /// The time-in-force policy.
    pub tif: TimeInForce,
}

impl Order {
    pub fn new(
        id: OrderId,
        side: Side,
        kind: OrderKind,
        price: Price,
        quantity: Quantity,
        tif: TimeInForce,
    ) -> Self {
        Self {
            id,
            side,
            kind,
            price,
            quantity,
            filled: 0,
            tif,
        }
    }

    /// The quantity still open for matching.
    #[inline(always)]
    pub fn remaining(&self) -> Quantity {
        self.quantity - self.filled
    }

    #[inline(always)]
    pub fn is_filled(&self) -> bool {
        self.filled == self.quantity
    }

    pub(crate) fn fill(&mut self, amount: Quantity) {
        debug_assert!(amount <= self.remaining());
        self.filled += amount;
    }
}

/// A price/quantity replacement for a resting order. Applying it cancels
/// the standing order and resubmits the same id as a fresh arrival, so
/// the order loses its place in the queue.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderModify {
    /// The ID of the resting order to replace.
    pub id: OrderId,
    /// The new limit price.
    pub price: Price,
    /// The new original quantity. Any previous partial fill is discarded.
    pub quantity: Quantity,
}

/// A match between two orders. When an aggressor crosses several resting
/// orders, one `Trade` is emitted per consuming fill, in execution order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    /// The ID of the buy-side order.
    pub buy_order_id: OrderId,
    /// The ID of the sell-side order.
    pub sell_order_id: OrderId,
    /// The execution price: always the resting order's level price, so an
    /// aggressor crossing deeper than the touch receives price improvement.
    pub price: Price,
    /// The quantity traded. Always greater than zero.
    pub quantity: Quantity,
}

/// One aggregated price point of book depth: every resting order at the
/// price, merged into a single volume.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookLevel {
    /// The price point this level represents.
    pub price: Price,
    /// The total remaining quantity resting at this price.
    pub volume: Quantity,
}
