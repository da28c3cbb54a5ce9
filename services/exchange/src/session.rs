//! Per-connection session state machine
//!
//! Each accepted connection runs one of these tasks: validate a logon,
//! then loop reading framed requests and writing the single response each
//! produces. Frames are bounded by the 1024-byte read buffer; one read is
//! one frame. Failures stay inside the session; they never touch the
//! acceptor or sibling sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use fix::FixMessage;

use crate::exchange::Exchange;
use crate::protocol;

/// Largest frame a session will read.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected; the first frame must be a valid Logon.
    AwaitingLogon,
    /// Logged on; reading and dispatching requests.
    Active,
    /// Terminal; the socket is dropped.
    Closed,
}

/// Drive a connection from logon to close.
pub(crate) async fn run(exchange: Arc<Exchange>, mut stream: TcpStream, peer: SocketAddr) {
    debug!(%peer, "session opened");
    let mut state = SessionState::AwaitingLogon;
    let mut buf = [0u8; READ_BUFFER_SIZE];

    while state != SessionState::Closed && exchange.is_running() {
        let n = tokio::select! {
            read = stream.read(&mut buf) => match read {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) => {
                    debug!(%peer, %err, "read failed");
                    break;
                }
            },
            _ = exchange.shutdown_notified() => break,
        };
        let frame = &buf[..n];

        state = match state {
            SessionState::AwaitingLogon => match FixMessage::parse(frame) {
                Ok(msg) if protocol::is_valid_logon(&msg) => {
                    if stream.write_all(&protocol::encode_logon()).await.is_err() {
                        SessionState::Closed
                    } else {
                        info!(%peer, "session logged on");
                        SessionState::Active
                    }
                }
                // Anything but a valid logon closes the socket silently
                _ => {
                    debug!(%peer, "invalid logon");
                    SessionState::Closed
                }
            },
            SessionState::Active => {
                let response = match FixMessage::parse(frame) {
                    Ok(msg) => match protocol::decode_request(&msg) {
                        Ok(request) => exchange.handle_request(request),
                        Err(err) => protocol::encode_reject(&err.to_string()),
                    },
                    Err(err) => {
                        debug!(%peer, %err, "undecodable frame");
                        protocol::encode_reject("Malformed message")
                    }
                };
                if stream.write_all(&response).await.is_err() {
                    SessionState::Closed
                } else {
                    SessionState::Active
                }
            }
            SessionState::Closed => SessionState::Closed,
        };
    }

    debug!(%peer, "session closed");
}
