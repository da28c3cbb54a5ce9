//! Exchange dispatcher
//!
//! Owns the instrument registry, the global order registry, and the TCP
//! acceptor. One readers-writer lock guards the shared state: existence
//! checks and status queries take it shared, placements and cancellations
//! take it exclusive, which linearizes every book mutation across
//! sessions. The instrument set is frozen while the exchange runs.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use types::{ExchangeError, Order, OrderId, OrderStatus, Symbol};

use crate::book::OrderBook;
use crate::orders::OrderStore;
use crate::protocol::{self, Request};
use crate::session;

/// Pending-connection queue depth for the listening socket.
const LISTEN_BACKLOG: u32 = 5;

#[derive(Default)]
struct ExchangeState {
    store: OrderStore,
    books: HashMap<Symbol, OrderBook>,
}

/// The exchange: instrument books, order registry, and session acceptor.
pub struct Exchange {
    running: AtomicBool,
    next_order_id: AtomicU64,
    shutdown: Notify,
    state: RwLock<ExchangeState>,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            next_order_id: AtomicU64::new(0),
            shutdown: Notify::new(),
            state: RwLock::new(ExchangeState::default()),
        }
    }

    /// Register an instrument with an empty book.
    ///
    /// Only permitted while the exchange is not running.
    pub fn add_instrument(&self, ticker: &str) -> Result<(), ExchangeError> {
        if self.is_running() {
            return Err(ExchangeError::InstrumentsLocked);
        }
        let symbol = Symbol::new(ticker);
        let mut state = self.state.write();
        if state.books.contains_key(&symbol) {
            return Err(ExchangeError::DuplicateInstrument(ticker.to_string()));
        }
        state.books.insert(symbol, OrderBook::new());
        Ok(())
    }

    /// Drop an instrument and its book.
    ///
    /// Only permitted while the exchange is not running.
    pub fn remove_instrument(&self, ticker: &str) -> Result<(), ExchangeError> {
        if self.is_running() {
            return Err(ExchangeError::InstrumentsLocked);
        }
        let symbol = Symbol::new(ticker);
        let mut state = self.state.write();
        if state.books.remove(&symbol).is_none() {
            return Err(ExchangeError::UnknownInstrument(ticker.to_string()));
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the exchange: the acceptor exits and sessions close after
    /// their current read.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("exchange stopping");
        }
        self.shutdown.notify_waiters();
    }

    /// Wait until [`Exchange::stop`] is called.
    pub(crate) async fn shutdown_notified(&self) {
        self.shutdown.notified().await;
    }

    /// Bind `0.0.0.0:port` and serve until stopped.
    pub async fn start(self: &Arc<Self>, port: u16) -> Result<(), ExchangeError> {
        let socket = TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(SocketAddr::from(([0, 0, 0, 0], port)))?;
        let listener = socket.listen(LISTEN_BACKLOG)?;
        info!(port, "exchange started");
        self.run(listener).await
    }

    /// Serve connections on an already-bound listener until stopped.
    pub async fn run(self: &Arc<Self>, listener: TcpListener) -> Result<(), ExchangeError> {
        self.running.store(true, Ordering::SeqCst);

        while self.is_running() {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let exchange = Arc::clone(self);
                        tokio::spawn(async move {
                            session::run(exchange, stream, peer).await;
                        });
                    }
                    Err(err) => warn!(%err, "accept failed"),
                },
                _ = self.shutdown_notified() => break,
            }
        }

        info!("exchange stopped");
        Ok(())
    }

    /// Handle one decoded request, returning the single response frame.
    pub(crate) fn handle_request(&self, request: Request) -> Vec<u8> {
        match request {
            Request::NewOrder {
                symbol,
                side,
                order_type,
                price,
                quantity,
            } => self.handle_new_order(symbol, side, order_type, price, quantity),
            Request::Cancel { id } => self.handle_cancel(id),
            Request::Status { id } => self.handle_status(id),
        }
    }

    fn handle_new_order(
        &self,
        symbol: Symbol,
        side: types::Side,
        order_type: types::OrderType,
        price: u32,
        quantity: u32,
    ) -> Vec<u8> {
        {
            let state = self.state.read();
            if !state.books.contains_key(&symbol) {
                debug!(%symbol, "new order for unknown instrument");
                return protocol::encode_reject("Invalid symbol");
            }
        }

        let mut guard = self.state.write();
        let state = &mut *guard;
        let Some(book) = state.books.get_mut(&symbol) else {
            return protocol::encode_reject("Invalid symbol");
        };

        // Allocated under the write lock, after ticker validation, so ids
        // follow the linearized acceptance order
        let id = OrderId::from_u64(self.next_order_id.fetch_add(1, Ordering::SeqCst));
        let mut order = match Order::new(id, symbol.clone(), price, quantity, side, order_type) {
            Ok(order) => order,
            Err(err) => {
                debug!(%id, %err, "order construction failed");
                return protocol::encode_reject(&err.to_string());
            }
        };

        match book.place_order(&mut order, &mut state.store) {
            Ok(true) => {
                debug!(%id, %symbol, filled = order.filled(), "order accepted");
                let ack = protocol::encode_new_order_ack(&order);
                if let Err(err) = state.store.insert(order) {
                    warn!(%id, %err, "registry insert failed");
                    return protocol::encode_reject("Order placement failed");
                }
                ack
            }
            Ok(false) => {
                debug!(%id, %symbol, "fill-or-kill lacked liquidity");
                protocol::encode_reject("Order placement failed")
            }
            Err(err) => {
                warn!(%id, %symbol, %err, "order placement failed");
                protocol::encode_reject("Order placement failed")
            }
        }
    }

    fn handle_cancel(&self, id: OrderId) -> Vec<u8> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let Some(order) = state.store.get(id) else {
            return protocol::encode_reject("Invalid order ID");
        };
        let symbol = order.symbol().clone();
        let Some(book) = state.books.get_mut(&symbol) else {
            return protocol::encode_reject("Order cancellation failed");
        };

        match book.cancel_order(id, &state.store) {
            Ok(()) => {
                let cancelled = state
                    .store
                    .get_mut(id)
                    .map(|order| order.set_status(OrderStatus::Cancelled));
                match cancelled {
                    Some(Ok(())) => {
                        debug!(%id, "order cancelled");
                        protocol::encode_cancel_ack(id)
                    }
                    _ => {
                        warn!(%id, "cancelled order missing or not open");
                        protocol::encode_reject("Order cancellation failed")
                    }
                }
            }
            Err(err) => {
                debug!(%id, %err, "cancel rejected");
                protocol::encode_reject("Order cancellation failed")
            }
        }
    }

    fn handle_status(&self, id: OrderId) -> Vec<u8> {
        let state = self.state.read();
        match state.store.get(id) {
            Some(order) => protocol::encode_order_status(order),
            None => protocol::encode_reject("Invalid order ID"),
        }
    }
}
