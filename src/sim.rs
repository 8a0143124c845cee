//! Synthetic market flow.
//!
//! [`MarketSim`] drives an [`OrderBook`] with a random mix of add, cancel
//! and modify operations around a configurable mid price. It tracks the
//! ids of resting GTC remainders so cancels and modifies target live
//! orders, and it is deterministic for a fixed seed, which makes it
//! usable from benchmarks and tests as well as interactive demos.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::models::{
    Order, OrderId, OrderKind, OrderModify, Price, Quantity, Side, TimeInForce,
    Trade,
};
use crate::OrderBook;

/// Flow mix and price bands for the simulator.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Mid price the synthetic flow oscillates around.
    pub center_price: Price,
    /// Half the nominal gap between the strongest bid and ask quotes.
    pub half_spread: Price,
    /// Width of the band below (bids) or above (asks) the touch that
    /// limit prices are drawn from.
    pub band: Price,
    /// Largest generated order quantity; quantities are uniform in
    /// `1..=max_quantity`.
    pub max_quantity: Quantity,
    /// Percentage of steps that submit a new order. The remainder is
    /// split between `cancel_pct` cancels and modifies.
    pub add_pct: u32,
    /// Percentage of steps that cancel a tracked resting order.
    pub cancel_pct: u32,
    /// Percentage of submissions that are market orders.
    pub market_pct: u32,
    /// Percentage of limit submissions sent immediate-or-cancel.
    pub ioc_pct: u32,
    /// Percentage of limit submissions sent fill-or-kill.
    pub fok_pct: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            center_price: 10_000,
            half_spread: 50,
            band: 100,
            max_quantity: 100,
            add_pct: 70,
            cancel_pct: 20,
            market_pct: 10,
            ioc_pct: 15,
            fok_pct: 5,
        }
    }
}

/// A random order-flow driver over a single book.
pub struct MarketSim {
    config: SimConfig,
    rng: ChaCha8Rng,
    next_id: OrderId,
    resting: Vec<OrderId>,
}

impl MarketSim {
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: 1,
            resting: Vec::new(),
        }
    }

    /// Applies one random operation to `book` and returns its trades.
    /// Falls back to an add while nothing is resting.
    pub fn step(&mut self, book: &mut OrderBook) -> Vec<Trade> {
        let roll = self.rng.gen_range(0..100);
        if roll < self.config.add_pct || self.resting.is_empty() {
            self.add_random(book)
        } else if roll < self.config.add_pct + self.config.cancel_pct {
            self.cancel_random(book);
            Vec::new()
        } else {
            self.modify_random(book)
        }
    }

    /// Number of order ids currently tracked as resting. May run ahead
    /// of the book when tracked orders get consumed by later aggressors.
    pub fn tracked_orders(&self) -> usize {
        self.resting.len()
    }

    fn add_random(&mut self, book: &mut OrderBook) -> Vec<Trade> {
        let side = if self.rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let kind = if self.rng.gen_range(0..100) < self.config.market_pct {
            OrderKind::Market
        } else {
            OrderKind::Limit
        };
        let tif = match kind {
            OrderKind::Market => TimeInForce::Ioc,
            OrderKind::Limit => {
                let roll = self.rng.gen_range(0..100);
                if roll < self.config.ioc_pct {
                    TimeInForce::Ioc
                } else if roll < self.config.ioc_pct + self.config.fok_pct {
                    TimeInForce::Fok
                } else {
                    TimeInForce::Gtc
                }
            }
        };
        let price = match kind {
            OrderKind::Market => 0,
            OrderKind::Limit => self.quote(side),
        };
        let quantity = self.rng.gen_range(1..=self.config.max_quantity);
        let id = self.next_id;
        self.next_id += 1;

        let trades = book.add_order(Order::new(id, side, kind, price, quantity, tif));
        let filled: Quantity = trades.iter().map(|t| t.quantity).sum();
        if kind == OrderKind::Limit && tif == TimeInForce::Gtc && filled < quantity {
            self.resting.push(id);
        }
        debug!(id, ?side, ?kind, price, quantity, trades = trades.len(), "add");
        trades
    }

    fn cancel_random(&mut self, book: &mut OrderBook) {
        let at = self.rng.gen_range(0..self.resting.len());
        let id = self.resting.swap_remove(at);
        // A tracked id may already have been consumed by an aggressor.
        let cancelled = book.cancel_order(id);
        debug!(id, cancelled, "cancel");
    }

    fn modify_random(&mut self, book: &mut OrderBook) -> Vec<Trade> {
        let at = self.rng.gen_range(0..self.resting.len());
        let id = self.resting[at];
        let width = self.config.band * 3;
        let price = self
            .rng
            .gen_range(self.config.center_price - width..=self.config.center_price + width);
        let quantity = self.rng.gen_range(1..=self.config.max_quantity);

        match book.modify_order(OrderModify { id, price, quantity }) {
            Ok(trades) => {
                let filled: Quantity = trades.iter().map(|t| t.quantity).sum();
                if filled >= quantity {
                    self.resting.swap_remove(at);
                }
                debug!(id, price, quantity, trades = trades.len(), "modify");
                trades
            }
            Err(_) => {
                // Consumed since we last saw it; stop tracking.
                self.resting.swap_remove(at);
                debug!(id, "modify miss");
                Vec::new()
            }
        }
    }

    fn quote(&mut self, side: Side) -> Price {
        let center = self.config.center_price;
        let half = self.config.half_spread;
        let band = self.config.band;
        match side {
            Side::Buy => self.rng.gen_range(center - half - band..=center - half),
            Side::Sell => self.rng.gen_range(center + half..=center + half + band),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{MarketSim, SimConfig};
    use crate::OrderBook;

    #[test]
    fn deterministic_for_a_fixed_seed() {
        let run = |seed: u64| {
            let mut book = OrderBook::default();
            let mut sim = MarketSim::new(SimConfig::default(), seed);
            let mut trades = Vec::new();
            for _ in 0..500 {
                trades.extend(sim.step(&mut book));
            }
            (trades, book.order_count(), book.best_bid(), book.best_ask())
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn book_invariants_survive_sustained_flow() {
        let mut book = OrderBook::default();
        let mut sim = MarketSim::new(SimConfig::default(), 42);
        for step in 1..=2_000 {
            sim.step(&mut book);
            if step % 100 == 0 {
                book.check_invariants();
            }
        }
        book.check_invariants();
    }
}
