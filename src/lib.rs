//! A single-instrument limit order book with price-time priority matching.
//!
//! Limit and market orders are matched against resting liquidity, best
//! price first and earliest arrival first within a price, with GTC, IOC
//! and FOK time-in-force semantics. Cancellation is O(1) through a
//! by-id index of stable positional handles. The book is synchronous and
//! single-threaded; see [`OrderBook`] for the full contract.

mod arena;
mod error;
mod level;
mod models;
mod orderbook;
pub mod sim;

pub use error::ExecutionError;
pub use models::{
    BookLevel, Order, OrderId, OrderKind, OrderModify, Price, Quantity, Side,
    TimeInForce, Trade,
};
pub use orderbook::OrderBook;
