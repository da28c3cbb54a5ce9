//! Matching engine exchange service
//!
//! A multi-instrument exchange speaking FIX 4.2 session frames over TCP.
//! Each instrument has a limit order book with strict price-time priority;
//! incoming orders execute according to their type (good-till-cancelled,
//! fill-or-kill, immediate-or-cancel) before any remainder rests.
//!
//! # Modules
//! - `book`: price levels, one-sided ladders, per-instrument order book
//! - `matching`: crossing predicates
//! - `orders`: global order registry
//! - `exchange`: dispatcher and TCP acceptor
//! - `protocol`: FIX frame ↔ exchange operation translation
//! - `session`: per-connection state machine
//! - `client`: convenience wrapper over the wire protocol

pub mod book;
pub mod client;
pub mod exchange;
pub mod matching;
pub mod orders;
pub mod protocol;
pub mod session;

pub use book::OrderBook;
pub use client::{Client, ClientError};
pub use exchange::Exchange;
pub use orders::OrderStore;
