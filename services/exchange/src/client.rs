//! Convenience client over the wire protocol
//!
//! Connects, performs the logon handshake, and exposes the three request
//! types as plain async calls. The client tracks the ids the exchange
//! assigned to its own accepted orders; cancel and status requests for
//! ids it never placed are answered locally without touching the wire.

use std::collections::HashSet;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use fix::{msg_type, tags, FixMessage, FixWriter};
use types::{Order, OrderId, OrderStatus, OrderType, Side, Symbol};

use crate::protocol::{self, CLIENT_COMP_ID, SERVER_COMP_ID};
use crate::session::READ_BUFFER_SIZE;

/// Errors surfaced by the client wrapper.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Exchange host is invalid: {0}")]
    BadAddress(String),

    #[error("Logon rejected by the exchange")]
    LogonFailed,

    #[error("Connection closed by the exchange")]
    Disconnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A logged-on connection to the exchange.
pub struct Client {
    stream: TcpStream,
    orders: HashSet<OrderId>,
}

fn client_header(msg_type: &str) -> FixWriter {
    FixWriter::new()
        .field(tags::MSG_TYPE, msg_type)
        .field(tags::SENDER_COMP_ID, CLIENT_COMP_ID)
        .field(tags::TARGET_COMP_ID, SERVER_COMP_ID)
}

/// Check that a response frame came from the server side of the session.
fn from_server(msg: &FixMessage) -> bool {
    msg.get(tags::SENDER_COMP_ID) == Some(SERVER_COMP_ID)
        && msg.get(tags::TARGET_COMP_ID) == Some(CLIENT_COMP_ID)
}

impl Client {
    /// Connect to the exchange and log on.
    pub async fn connect(host: &str, port: u16) -> Result<Self, ClientError> {
        let addr = tokio::net::lookup_host((host, port))
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ClientError::BadAddress(host.to_string()))?;
        let stream = TcpStream::connect(addr).await?;

        let mut client = Self {
            stream,
            orders: HashSet::new(),
        };
        client.logon().await?;
        Ok(client)
    }

    async fn logon(&mut self) -> Result<(), ClientError> {
        let frame = client_header(msg_type::LOGON)
            .field_u64(tags::ENCRYPT_METHOD, 0)
            .finish();
        let raw = self.request(&frame).await.map_err(|err| match err {
            // A silently closed socket is the server declining the logon
            ClientError::Disconnected => ClientError::LogonFailed,
            other => other,
        })?;

        let msg = FixMessage::parse(&raw).map_err(|_| ClientError::LogonFailed)?;
        if msg.msg_type() == Some(msg_type::LOGON) && from_server(&msg) {
            Ok(())
        } else {
            Err(ClientError::LogonFailed)
        }
    }

    /// Send one frame and read the single response.
    async fn request(&mut self, frame: &[u8]) -> Result<Vec<u8>, ClientError> {
        self.stream.write_all(frame).await?;

        let mut buf = [0u8; READ_BUFFER_SIZE];
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            return Err(ClientError::Disconnected);
        }
        Ok(buf[..n].to_vec())
    }

    /// Place an order; true when the exchange acknowledged it.
    ///
    /// The assigned id is recorded so the order can be cancelled or
    /// queried through this client later.
    pub async fn place_order(
        &mut self,
        ticker: &str,
        side: Side,
        order_type: OrderType,
        price: u32,
        quantity: u32,
    ) -> Result<bool, ClientError> {
        let frame = client_header(msg_type::NEW_ORDER_SINGLE)
            .field(tags::SYMBOL, ticker)
            .field_char(tags::SIDE, protocol::side_char(side))
            .field_char(tags::ORD_TYPE, protocol::ord_type_char(order_type))
            .field_u64(tags::PRICE, price as u64)
            .field_u64(tags::ORDER_QTY, quantity as u64)
            .finish();
        let raw = self.request(&frame).await?;

        let Ok(msg) = FixMessage::parse(&raw) else {
            return Ok(false);
        };
        if msg.msg_type() != Some(msg_type::EXECUTION_REPORT)
            || !from_server(&msg)
            || msg.get(tags::EXEC_TYPE) != Some("0")
            || msg.get(tags::ORD_STATUS) != Some("0")
        {
            return Ok(false);
        }
        let Some(id) = msg.get_u64(tags::ORDER_ID) else {
            return Ok(false);
        };

        self.orders.insert(OrderId::from_u64(id));
        Ok(true)
    }

    /// Cancel an order previously placed through this client.
    ///
    /// Returns false without sending anything when the id is not tracked
    /// here; otherwise true iff the exchange acknowledged the cancel.
    pub async fn cancel_order(&mut self, id: OrderId) -> Result<bool, ClientError> {
        if !self.orders.contains(&id) {
            return Ok(false);
        }

        let frame = client_header(msg_type::ORDER_CANCEL_REQUEST)
            .field_u64(tags::ORDER_ID, id.as_u64())
            .finish();
        let raw = self.request(&frame).await?;

        let Ok(msg) = FixMessage::parse(&raw) else {
            return Ok(false);
        };
        let acked = msg.msg_type() == Some(msg_type::EXECUTION_REPORT)
            && from_server(&msg)
            && msg.get(tags::EXEC_TYPE) == Some("4")
            && msg.get(tags::ORD_STATUS) == Some("4")
            && msg.get_u64(tags::ORDER_ID) == Some(id.as_u64());

        if acked {
            self.orders.remove(&id);
        }
        Ok(acked)
    }

    /// Query the current state of an order placed through this client.
    ///
    /// Returns a snapshot rebuilt from the execution report, or None when
    /// the id is untracked or the exchange rejected the request.
    pub async fn order_status(&mut self, id: OrderId) -> Result<Option<Order>, ClientError> {
        if !self.orders.contains(&id) {
            return Ok(None);
        }

        let frame = client_header(msg_type::ORDER_STATUS_REQUEST)
            .field_u64(tags::ORDER_ID, id.as_u64())
            .finish();
        let raw = self.request(&frame).await?;

        let Ok(msg) = FixMessage::parse(&raw) else {
            return Ok(None);
        };
        if msg.msg_type() != Some(msg_type::EXECUTION_REPORT)
            || !from_server(&msg)
            || msg.get(tags::EXEC_TYPE) != Some("I")
            || msg.get_u64(tags::ORDER_ID) != Some(id.as_u64())
        {
            return Ok(None);
        }

        Ok(Self::snapshot_from_report(id, &msg))
    }

    fn snapshot_from_report(id: OrderId, msg: &FixMessage) -> Option<Order> {
        let symbol = Symbol::try_new(msg.get(tags::SYMBOL)?)?;
        let side = protocol::side_from_char(msg.get_char(tags::SIDE)?)?;
        let order_type = protocol::ord_type_from_char(msg.get_char(tags::ORD_TYPE)?)?;
        let price = msg.get_u32(tags::PRICE)?;
        let quantity = msg.get_u32(tags::ORDER_QTY)?;
        let filled = msg.get_u32(tags::CUM_QTY)?;
        let status = msg.get_char(tags::ORD_STATUS)?;

        let mut order = Order::new(id, symbol, price, quantity, side, order_type).ok()?;
        order.fill(filled).ok()?;
        if status == '4' {
            order.set_status(OrderStatus::Cancelled).ok()?;
        }
        Some(order)
    }

    /// Ids of orders accepted for this client and not yet cancelled.
    pub fn orders(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.orders.iter().copied()
    }

    /// Shut the connection down.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
