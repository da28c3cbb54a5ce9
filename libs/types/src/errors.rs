//! Error taxonomy for the exchange
//!
//! Domain errors raised by the core data structures, and the service-level
//! errors raised by the dispatcher. Request handling translates domain
//! errors into wire-level Rejects; they are never fatal.

use crate::ids::OrderId;
use crate::order::OrderStatus;
use thiserror::Error;

/// Errors raised by order construction and mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order quantity must be positive")]
    InvalidQuantity,

    #[error("Fill of {requested} exceeds remaining quantity {remaining}")]
    Overfill { remaining: u32, requested: u32 },

    #[error("Invalid status transition from {from:?} to {to:?}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
}

/// Errors raised by price levels and order books
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Order {0} already exists here")]
    DuplicateOrder(OrderId),

    #[error("Order {0} does not exist here")]
    UnknownOrder(OrderId),
}

/// Errors raised by the exchange dispatcher
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Cannot modify instruments while the exchange is running")]
    InstrumentsLocked,

    #[error("Instrument {0} is already registered")]
    DuplicateInstrument(String),

    #[error("Instrument {0} is not registered")]
    UnknownInstrument(String),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Book error: {0}")]
    Book(#[from] BookError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_error_display() {
        let err = OrderError::Overfill {
            remaining: 5,
            requested: 6,
        };
        assert_eq!(err.to_string(), "Fill of 6 exceeds remaining quantity 5");
    }

    #[test]
    fn test_book_error_display() {
        let err = BookError::UnknownOrder(OrderId::from_u64(999));
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn test_exchange_error_from_book_error() {
        let book_err = BookError::DuplicateOrder(OrderId::from_u64(1));
        let exchange_err: ExchangeError = book_err.into();
        assert!(matches!(exchange_err, ExchangeError::Book(_)));
    }
}
