// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Framed TCP transport for one Name Service session.
//!
//! The socket carries an absolute deadline rather than a per-call timeout:
//! every read or write is armed with the time *remaining* until the
//! deadline, so a peer trickling bytes cannot stretch a frame past it.

use crate::address::NsAddress;
use crate::codec::{read_frame, write_frame};
use crate::config::LookupConfig;
use crate::error::NsError;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

/// TCP stream whose reads and writes share one deadline.
struct DeadlineStream {
    stream: TcpStream,
    deadline: Instant,
}

impl DeadlineStream {
    fn remaining(&self) -> io::Result<Duration> {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "session deadline exceeded",
            ));
        }
        Ok(remaining)
    }
}

impl Read for DeadlineStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining()?;
        self.stream.set_read_timeout(Some(remaining))?;
        self.stream.read(buf)
    }
}

impl Write for DeadlineStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = self.remaining()?;
        self.stream.set_write_timeout(Some(remaining))?;
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// `now + timeout`, or a config error when the sum is not representable.
fn deadline_after(timeout: Duration) -> Result<Instant, NsError> {
    Instant::now().checked_add(timeout).ok_or_else(|| {
        NsError::Config(format!("timeout of {}s is out of range", timeout.as_secs()))
    })
}

/// Framed transport over a connected socket.
pub struct FrameTransport {
    stream: DeadlineStream,
    peer_addr: SocketAddr,
    timeout: Duration,
    max_frame_size: usize,
}

impl FrameTransport {
    /// Resolve `address`, connect, and arm the deadline at `now + timeout`.
    ///
    /// The deadline is armed before connecting, so dialing and every later
    /// exchange share the same budget. Resolution failures are
    /// `AddressInvalid`; every resolved candidate refusing the connection is
    /// `DialFailed`.
    pub fn dial(address: &NsAddress, config: &LookupConfig) -> Result<Self, NsError> {
        let timeout = config.timeout();
        let deadline = deadline_after(timeout)?;

        let candidates: Vec<SocketAddr> = (address.host.as_str(), address.port)
            .to_socket_addrs()
            .map_err(|e| NsError::AddressInvalid(format!("unable to resolve {}: {}", address, e)))?
            .collect();

        if candidates.is_empty() {
            return Err(NsError::AddressInvalid(format!(
                "{} did not resolve to any address",
                address
            )));
        }

        let mut last_error = None;
        for candidate in candidates {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(NsError::DeadlineExceeded);
            }

            match TcpStream::connect_timeout(&candidate, remaining) {
                Ok(stream) => {
                    log::debug!("[gridns] connected to {} ({})", address, candidate);
                    return Self::attach(stream, config, deadline).map_err(|e| {
                        NsError::DialFailed {
                            address: address.to_string(),
                            reason: e.to_string(),
                        }
                    });
                }
                Err(e) => {
                    log::debug!("[gridns] connect to {} failed: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        Err(NsError::DialFailed {
            address: address.to_string(),
            reason: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no address attempted".into()),
        })
    }

    /// Wrap an already connected stream, arming the deadline at
    /// `now + timeout`.
    pub fn from_stream(stream: TcpStream, config: &LookupConfig) -> Result<Self, NsError> {
        let deadline = deadline_after(config.timeout())?;
        Ok(Self::attach(stream, config, deadline)?)
    }

    fn attach(stream: TcpStream, config: &LookupConfig, deadline: Instant) -> io::Result<Self> {
        stream.set_nodelay(config.tcp_nodelay)?;
        if config.tcp_keepalive {
            socket2::SockRef::from(&stream).set_keepalive(true)?;
        }
        let peer_addr = stream.peer_addr()?;

        Ok(Self {
            stream: DeadlineStream { stream, deadline },
            peer_addr,
            timeout: config.timeout(),
            max_frame_size: config.max_frame_size,
        })
    }

    /// Remote socket address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Instant after which all I/O fails with `DeadlineExceeded`.
    pub fn deadline(&self) -> Instant {
        self.stream.deadline
    }

    /// Push the deadline out to `now + timeout`.
    pub fn refresh_deadline(&mut self) -> Result<(), NsError> {
        self.stream.deadline = deadline_after(self.timeout)?;
        Ok(())
    }

    /// Write bytes without a length prefix.
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<(), NsError> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Write one length-prefixed frame.
    pub fn send_frame(&mut self, payload: &[u8]) -> Result<(), NsError> {
        log::trace!("[gridns] -> frame {} bytes", payload.len());
        write_frame(&mut self.stream, payload)?;
        Ok(())
    }

    /// Read one length-prefixed frame.
    pub fn recv_frame(&mut self) -> Result<Vec<u8>, NsError> {
        let frame = read_frame(&mut self.stream, self.max_frame_size)?;
        log::trace!("[gridns] <- frame {} bytes", frame.len());
        Ok(frame)
    }

    /// Close both halves of the socket.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.stream.stream.shutdown(Shutdown::Both) {
            if e.kind() != io::ErrorKind::NotConnected {
                log::debug!("[gridns] shutdown of {} failed: {}", self.peer_addr, e);
            }
        }
    }
}

impl std::fmt::Debug for FrameTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameTransport")
            .field("peer_addr", &self.peer_addr)
            .field("timeout", &self.timeout)
            .field("max_frame_size", &self.max_frame_size)
            .finish()
    }
}
