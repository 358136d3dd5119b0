//! Datagram transport to the peer.
//!
//! [`Transport`] is the seam between the worker roles and the network: the
//! Sender calls [`Transport::send`], the Receiver polls
//! [`Transport::recv`].  [`UdpTransport`] is the real implementation, a thin
//! wrapper around `std::net::UdpSocket`; tests plug in their own.
//!
//! Receives are bounded by a read timeout so the Receiver can notice a
//! shutdown request between datagrams instead of blocking forever.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::config::Config;
use crate::error::TalkError;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Send and receive raw datagrams to and from one configured peer.
///
/// Both methods take `&self` so one transport can be shared by the Sender
/// and the Receiver.
pub trait Transport: Send + Sync + 'static {
    /// Transmit `payload` as one datagram.
    fn send(&self, payload: &[u8]) -> io::Result<()>;

    /// Wait for the next datagram and copy it into `buf`.
    ///
    /// Returns `Ok(None)` when nothing arrived within the poll interval.
    fn recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>>;
}

// ---------------------------------------------------------------------------
// UdpTransport
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct UdpTransport {
    /// Address this socket is bound to (filled in after the OS picks a port).
    pub local_addr: SocketAddr,
    /// Where every outgoing datagram goes.
    pub remote_addr: SocketAddr,
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind `0.0.0.0:<local_port>` and resolve the peer from `config`.
    pub fn open(config: &Config) -> Result<Self, TalkError> {
        let remote = resolve(&config.remote_host, config.remote_port)?;
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.local_port))
            .map_err(TalkError::Network)?;
        Self::new(socket, remote, config.poll_interval)
    }

    /// Wrap an already-bound socket.
    pub fn new(
        socket: UdpSocket,
        remote_addr: SocketAddr,
        poll_interval: Duration,
    ) -> Result<Self, TalkError> {
        socket
            .set_read_timeout(Some(poll_interval))
            .map_err(TalkError::Network)?;
        let local_addr = socket.local_addr().map_err(TalkError::Network)?;
        Ok(Self {
            local_addr,
            remote_addr,
            socket,
        })
    }
}

impl Transport for UdpTransport {
    fn send(&self, payload: &[u8]) -> io::Result<()> {
        let sent = self.socket.send_to(payload, self.remote_addr)?;
        if sent != payload.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short send: {sent} of {} bytes", payload.len()),
            ));
        }
        Ok(())
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.socket.recv_from(buf) {
            Ok((n, from)) => {
                log::trace!("datagram of {n} bytes from {from}");
                Ok(Some(n))
            }
            Err(e) if is_poll_timeout(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Resolve `host:port`, preferring an IPv4 address.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, TalkError> {
    let unresolved = || TalkError::Resolve {
        host: host.to_string(),
        port,
    };
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|_| unresolved())?
        .collect();
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(unresolved)
}

/// A read timeout surfaces as `WouldBlock` on Unix and `TimedOut` on Windows.
fn is_poll_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
