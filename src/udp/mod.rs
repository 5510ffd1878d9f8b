//! # UDP Receiver Module
//!
//! Owns the listening socket the phone app sends sensor frames to.
//!
//! This module handles:
//! - Binding the configured address for the process lifetime
//! - Receiving one datagram at a time into a fixed buffer
//!
//! Any sender is accepted. Datagrams longer than [`RECV_BUFFER_SIZE`] are
//! truncated by the OS.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::info;

use crate::error::{BridgeError, Result};

/// Receive buffer size in bytes
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Bound UDP socket
///
/// The socket is closed when this value is dropped.
#[derive(Debug)]
pub struct DatagramReceiver {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl DatagramReceiver {
    /// Bind the listening socket
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to listen on (e.g., 0.0.0.0:5005)
    ///
    /// # Errors
    ///
    /// Returns `Bind` error if the address is in use or not available
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use powersteer_bridge::udp::DatagramReceiver;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let receiver = DatagramReceiver::bind("0.0.0.0:5005".parse()?).await?;
    ///     println!("Listening on {}", receiver.local_addr());
    ///     Ok(())
    /// }
    /// ```
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| BridgeError::Bind { addr, source })?;
        let local_addr = socket.local_addr()?;

        info!("Listening for data on {}...", local_addr);
        Ok(Self { socket, local_addr })
    }

    /// Address the socket is bound to
    ///
    /// Differs from the requested address when binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the next datagram
    ///
    /// # Returns
    ///
    /// * `Result<(usize, SocketAddr)>` - Bytes written into `buf` and the sender
    pub async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let received = self.socket.recv_from(buf).await?;
        Ok(received)
    }
}
