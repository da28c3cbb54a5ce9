//! Types library for the matching engine exchange
//!
//! Core type definitions shared by the wire codec and the exchange service.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, Symbol)
//! - `order`: Order lifecycle types
//! - `errors`: Error taxonomy
//! - `time`: Nanosecond wall-clock helper

pub mod errors;
pub mod ids;
pub mod order;
pub mod time;

pub use errors::{BookError, ExchangeError, OrderError};
pub use ids::{OrderId, Symbol};
pub use order::{Order, OrderStatus, OrderType, Side};
pub use time::now_nanos;
