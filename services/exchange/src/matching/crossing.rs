//! Crossing detection logic
//!
//! Determines when resting liquidity is reachable by an incoming limit.
//! An incoming ask at `p_a` reaches resting bids at `p_b >= p_a`; an
//! incoming bid at `p_b` reaches resting asks at `p_a <= p_b`. Equal
//! prices always cross, including zero.

use types::Side;

/// Check if a resting bid price crosses an incoming ask limit.
pub fn bid_crosses(bid_price: u32, ask_limit: u32) -> bool {
    bid_price >= ask_limit
}

/// Check if a resting ask price crosses an incoming bid limit.
pub fn ask_crosses(ask_price: u32, bid_limit: u32) -> bool {
    ask_price <= bid_limit
}

/// Check if an incoming order's limit reaches a resting price on the
/// opposite side.
pub fn incoming_crosses(incoming_side: Side, incoming_limit: u32, resting_price: u32) -> bool {
    match incoming_side {
        Side::Bid => ask_crosses(resting_price, incoming_limit),
        Side::Ask => bid_crosses(resting_price, incoming_limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_crosses_ask_limit() {
        assert!(bid_crosses(15100, 15000));
        assert!(bid_crosses(15000, 15000));
        assert!(!bid_crosses(14900, 15000));
    }

    #[test]
    fn test_ask_crosses_bid_limit() {
        assert!(ask_crosses(14900, 15000));
        assert!(ask_crosses(15000, 15000));
        assert!(!ask_crosses(15100, 15000));
    }

    #[test]
    fn test_zero_prices_cross() {
        assert!(bid_crosses(0, 0));
        assert!(ask_crosses(0, 0));
    }

    #[test]
    fn test_incoming_crosses_by_side() {
        assert!(incoming_crosses(Side::Bid, 15000, 14900));
        assert!(!incoming_crosses(Side::Bid, 15000, 15100));
        assert!(incoming_crosses(Side::Ask, 15000, 15100));
        assert!(!incoming_crosses(Side::Ask, 15000, 14900));
    }
}
