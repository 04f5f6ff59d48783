//! Landmark receiver for the hand tracker helper.
//!
//! Receives JSON-over-UDP packets from `scripts/hand_tracker.py`, one per
//! processed camera frame:
//!
//! ```json
//! {"timestamp_ms": 1234.5, "hands": [[[0.51, 0.62, -0.03], ...21 points]]}
//! ```
//!
//! An empty `hands` list means the detector ran and saw no hand.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};

use serde::Deserialize;

use crate::error::PerceptionError;
use crate::hand::HandFrame;
use crate::perception::{Detection, HandSource};

/// Largest datagram accepted.
const MAX_PACKET: usize = 65536;

/// A single JSON packet from the tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct LandmarkPacket {
    #[serde(default)]
    pub timestamp_ms: f64,
    /// Detected hands, each a list of `[x, y, z]` landmarks.
    #[serde(default)]
    pub hands: Vec<Vec<[f32; 3]>>,
}

impl LandmarkPacket {
    pub fn parse(bytes: &[u8]) -> Result<Self, PerceptionError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The first hand, or `NoHand`. Extra hands are ignored.
    pub fn into_detection(self) -> Result<Detection, PerceptionError> {
        match self.hands.first() {
            Some(points) => Ok(Detection::Hand(HandFrame::from_points(points, self.timestamp_ms)?)),
            None => Ok(Detection::NoHand),
        }
    }
}

/// Non-blocking UDP receiver.
pub struct UdpLandmarkReceiver {
    socket: UdpSocket,
    buf: Vec<u8>,
    latest: Vec<u8>,
}

impl UdpLandmarkReceiver {
    /// Bind the socket on `addr` (`host:port`).
    pub fn bind(addr: &str) -> Result<Self, PerceptionError> {
        let bind_err = |source| PerceptionError::Bind {
            addr: addr.to_string(),
            source,
        };
        let socket = UdpSocket::bind(addr).map_err(bind_err)?;
        socket.set_nonblocking(true).map_err(bind_err)?;

        tracing::info!("Hand landmark receiver listening on {}", addr);
        Ok(Self {
            socket,
            buf: vec![0; MAX_PACKET],
            latest: Vec::with_capacity(MAX_PACKET),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    /// Drain pending datagrams and return the newest, if any.
    fn drain(&mut self) -> Result<Option<&[u8]>, PerceptionError> {
        let mut received = 0usize;
        loop {
            match self.socket.recv(&mut self.buf) {
                Ok(size) => {
                    received += 1;
                    self.latest.clear();
                    self.latest.extend_from_slice(&self.buf[..size]);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                // Reported by some platforms after an ICMP port unreachable.
                Err(e) if e.kind() == ErrorKind::ConnectionReset => break,
                Err(e) => return Err(PerceptionError::Receive(e)),
            }
        }
        if received > 1 {
            tracing::trace!(dropped = received - 1, "Skipped stale landmark packets");
        }
        Ok((received > 0).then_some(self.latest.as_slice()))
    }
}

impl HandSource for UdpLandmarkReceiver {
    fn poll(&mut self) -> Result<Option<Detection>, PerceptionError> {
        match self.drain()? {
            Some(bytes) => Ok(Some(LandmarkPacket::parse(bytes)?.into_detection()?)),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "udp"
    }
}
