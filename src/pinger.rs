use async_trait::async_trait;
use rand::random;
use socket2::{Domain, Protocol, Socket, Type};
use std::mem::MaybeUninit;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::time;

use crate::error::PingError;
use crate::host::resolve_host;
use crate::icmp::{is_matching_reply, IcmpEchoRequest, IcmpFamily};
use crate::probe::{Probe, ProbeReply};

pub const DEFAULT_PAYLOAD_SIZE: usize = 32;
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// ICMP echo transport over raw sockets.
pub struct Pinger {
    payload_size: usize,
}

impl Pinger {
    pub fn new(payload_size: usize) -> Self {
        Self { payload_size }
    }

    fn open_socket(addr: IpAddr) -> Result<(Socket, IcmpFamily), PingError> {
        let (domain, protocol, family) = match addr {
            IpAddr::V4(_) => (Domain::IPV4, Protocol::ICMPV4, IcmpFamily::V4),
            IpAddr::V6(_) => (Domain::IPV6, Protocol::ICMPV6, IcmpFamily::V6),
        };

        let socket = Socket::new(domain, Type::RAW, Some(protocol)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                PingError::PermissionDenied
            } else {
                PingError::SendError(e)
            }
        })?;
        socket.set_nonblocking(true)?;

        Ok((socket, family))
    }

    /// Sends one echo request and polls for the matching reply. Runs until a
    /// reply arrives or an I/O error occurs, the caller bounds it.
    async fn echo(&self, addr: IpAddr) -> Result<Duration, PingError> {
        let (socket, family) = Self::open_socket(addr)?;
        let identifier = random::<u16>();
        let sequence = random::<u16>();
        let packet = IcmpEchoRequest::new(family, identifier, sequence, self.payload_size).encode()?;

        let start = Instant::now();
        socket.send_to(&packet, &SocketAddr::new(addr, 0).into())?;

        let mut recv_buffer = [MaybeUninit::new(0u8); 2048];
        loop {
            match socket.recv(&mut recv_buffer) {
                Ok(len) => {
                    // SAFETY: recv initialized the first `len` bytes.
                    let data = unsafe {
                        std::slice::from_raw_parts(recv_buffer.as_ptr() as *const u8, len)
                    };
                    if is_matching_reply(family, data, identifier, sequence) {
                        return Ok(start.elapsed());
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    time::sleep(POLL_INTERVAL).await;
                }
                Err(e) => return Err(PingError::SendError(e)),
            }
        }
    }
}

impl Default for Pinger {
    fn default() -> Self {
        Self::new(DEFAULT_PAYLOAD_SIZE)
    }
}

#[async_trait]
impl Probe for Pinger {
    async fn probe(&self, address: &str, timeout: Duration) -> Result<ProbeReply, PingError> {
        let deadline = Instant::now() + timeout;
        let addr = time::timeout(timeout, resolve_host(address))
            .await
            .map_err(|_| PingError::Timeout)??;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let rtt = time::timeout(remaining, self.echo(addr))
            .await
            .map_err(|_| PingError::Timeout)??;

        Ok(ProbeReply {
            success: true,
            resolved_address: addr.to_string(),
            round_trip_millis: rtt.as_millis() as i64,
        })
    }
}
