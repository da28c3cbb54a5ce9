//! Wire translation between FIX frames and exchange operations
//!
//! Decoding turns inbound D/F/H frames into typed requests; encoding
//! produces the server's Logon, ExecutionReport, and Reject frames. The
//! server always writes SenderCompID=SERVER / TargetCompID=CLIENT, the
//! mirror image of what it expects from clients.

use fix::{msg_type, tags, FixMessage, FixWriter};
use thiserror::Error;
use types::{Order, OrderId, OrderStatus, OrderType, Side, Symbol};

/// CompID the server writes as sender and expects as target.
pub const SERVER_COMP_ID: &str = "SERVER";
/// CompID the server expects as sender and writes as target.
pub const CLIENT_COMP_ID: &str = "CLIENT";

/// A decoded inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    NewOrder {
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        price: u32,
        quantity: u32,
    },
    Cancel {
        id: OrderId,
    },
    Status {
        id: OrderId,
    },
}

/// Why an inbound frame could not be turned into a request.
///
/// The display text goes straight into the Reject's Text field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Malformed message")]
    Malformed,

    #[error("Invalid order side")]
    InvalidSide,

    #[error("Invalid order type")]
    InvalidOrderType,

    #[error("Unsupported message type")]
    UnsupportedMsgType,
}

/// FIX Side field character for a side.
pub fn side_char(side: Side) -> char {
    match side {
        Side::Bid => '1',
        Side::Ask => '2',
    }
}

/// Side for a FIX Side field character.
pub fn side_from_char(c: char) -> Option<Side> {
    match c {
        '1' => Some(Side::Bid),
        '2' => Some(Side::Ask),
        _ => None,
    }
}

/// FIX OrdType field character for an order type.
pub fn ord_type_char(order_type: OrderType) -> char {
    match order_type {
        OrderType::GoodTilCanceled => '1',
        OrderType::FillOrKill => '3',
        OrderType::ImmediateOrCancel => '4',
    }
}

/// Order type for a FIX OrdType field character.
pub fn ord_type_from_char(c: char) -> Option<OrderType> {
    match c {
        '1' => Some(OrderType::GoodTilCanceled),
        '3' => Some(OrderType::FillOrKill),
        '4' => Some(OrderType::ImmediateOrCancel),
        _ => None,
    }
}

/// FIX OrdStatus character for an order's current state.
pub fn ord_status_char(order: &Order) -> char {
    match order.status() {
        OrderStatus::Closed => '2',
        OrderStatus::Cancelled => '4',
        OrderStatus::Open => {
            if order.filled() == 0 {
                '0'
            } else {
                '1'
            }
        }
    }
}

/// Check an inbound frame for a valid logon.
pub fn is_valid_logon(msg: &FixMessage) -> bool {
    msg.msg_type() == Some(msg_type::LOGON)
        && msg.get(tags::SENDER_COMP_ID) == Some(CLIENT_COMP_ID)
        && msg.get(tags::TARGET_COMP_ID) == Some(SERVER_COMP_ID)
        && msg.get_u64(tags::ENCRYPT_METHOD) == Some(0)
}

/// Decode an inbound frame into a typed request.
pub fn decode_request(msg: &FixMessage) -> Result<Request, ProtocolError> {
    match msg.msg_type() {
        Some(msg_type::NEW_ORDER_SINGLE) => {
            let symbol = msg
                .get(tags::SYMBOL)
                .and_then(Symbol::try_new)
                .ok_or(ProtocolError::Malformed)?;
            let side = msg
                .get_char(tags::SIDE)
                .ok_or(ProtocolError::Malformed)
                .and_then(|c| side_from_char(c).ok_or(ProtocolError::InvalidSide))?;
            let order_type = msg
                .get_char(tags::ORD_TYPE)
                .ok_or(ProtocolError::Malformed)
                .and_then(|c| ord_type_from_char(c).ok_or(ProtocolError::InvalidOrderType))?;
            let price = msg.get_u32(tags::PRICE).ok_or(ProtocolError::Malformed)?;
            let quantity = msg
                .get_u32(tags::ORDER_QTY)
                .ok_or(ProtocolError::Malformed)?;

            Ok(Request::NewOrder {
                symbol,
                side,
                order_type,
                price,
                quantity,
            })
        }
        Some(msg_type::ORDER_CANCEL_REQUEST) => {
            let id = msg.get_u64(tags::ORDER_ID).ok_or(ProtocolError::Malformed)?;
            Ok(Request::Cancel {
                id: OrderId::from_u64(id),
            })
        }
        Some(msg_type::ORDER_STATUS_REQUEST) => {
            let id = msg.get_u64(tags::ORDER_ID).ok_or(ProtocolError::Malformed)?;
            Ok(Request::Status {
                id: OrderId::from_u64(id),
            })
        }
        _ => Err(ProtocolError::UnsupportedMsgType),
    }
}

fn server_header(msg_type: &str) -> FixWriter {
    FixWriter::new()
        .field(tags::MSG_TYPE, msg_type)
        .field(tags::SENDER_COMP_ID, SERVER_COMP_ID)
        .field(tags::TARGET_COMP_ID, CLIENT_COMP_ID)
}

/// Server's logon response.
pub fn encode_logon() -> Vec<u8> {
    server_header(msg_type::LOGON)
        .field_u64(tags::ENCRYPT_METHOD, 0)
        .finish()
}

/// Reject with a human-readable reason.
pub fn encode_reject(reason: &str) -> Vec<u8> {
    server_header(msg_type::REJECT)
        .field(tags::TEXT, reason)
        .finish()
}

/// Acknowledgement for an accepted new order (ExecType 0 / OrdStatus 0).
pub fn encode_new_order_ack(order: &Order) -> Vec<u8> {
    server_header(msg_type::EXECUTION_REPORT)
        .field_u64(tags::ORDER_ID, order.id().as_u64())
        .field(tags::EXEC_TYPE, "0")
        .field(tags::ORD_STATUS, "0")
        .field(tags::SYMBOL, order.symbol().as_str())
        .field_char(tags::SIDE, side_char(order.side()))
        .field_char(tags::ORD_TYPE, ord_type_char(order.order_type()))
        .field_u64(tags::ORDER_QTY, order.quantity() as u64)
        .field_u64(tags::PRICE, order.price() as u64)
        .finish()
}

/// Acknowledgement for a cancelled order (ExecType 4 / OrdStatus 4).
pub fn encode_cancel_ack(id: OrderId) -> Vec<u8> {
    server_header(msg_type::EXECUTION_REPORT)
        .field_u64(tags::ORDER_ID, id.as_u64())
        .field(tags::EXEC_TYPE, "4")
        .field(tags::ORD_STATUS, "4")
        .finish()
}

/// Status snapshot report (ExecType I).
pub fn encode_order_status(order: &Order) -> Vec<u8> {
    server_header(msg_type::EXECUTION_REPORT)
        .field_u64(tags::ORDER_ID, order.id().as_u64())
        .field(tags::EXEC_TYPE, "I")
        .field_char(tags::ORD_STATUS, ord_status_char(order))
        .field(tags::SYMBOL, order.symbol().as_str())
        .field_char(tags::SIDE, side_char(order.side()))
        .field_char(tags::ORD_TYPE, ord_type_char(order.order_type()))
        .field_u64(tags::ORDER_QTY, order.quantity() as u64)
        .field_u64(tags::CUM_QTY, order.filled() as u64)
        .field_u64(tags::LEAVES_QTY, order.remaining() as u64)
        .field_u64(tags::PRICE, order.price() as u64)
        .finish()
}
