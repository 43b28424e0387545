/*
 * Copyright © 2026, the nodewire authors.
 *
 * Licensed under the Apache License, Version 2.0 (the "License"); you may not use this
 * file except in compliance with the License. You may obtain a copy of the License at
 * http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
//! minimal DNS resolver: A-record lookups only, over UDP, with request
//! coalescing so that N concurrent lookups of the same hostname produce one wire
//! query, fanning the single response out to every waiter.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::os::unix::io::AsRawFd;
use std::rc::Rc;
use std::time::Duration;

use nodewire_common::{debug, warn};

use crate::suspend::ReadReady;

const DEFAULT_SERVER: &str = "8.8.8.8:53";
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("malformed hostname: {0}")]
    InvalidName(String),
    #[error("no A record found")]
    NotFound,
    #[error("malformed response")]
    MalformedResponse,
    #[error("query timed out")]
    Timeout,
    #[error(transparent)]
    Io(#[from] io::Error),
}

type Waiters = Vec<flume::Sender<Result<Vec<Ipv4Addr>, String>>>;

/// one resolver per reactor thread. Holds the in-flight query table that
/// coalescing reads from; nothing here is `Send`, matching the rest of the crate.
pub struct Resolver {
    socket: UdpSocket,
    server: SocketAddr,
    next_query_id: RefCell<u16>,
    inflight: Rc<RefCell<HashMap<String, Waiters>>>,
}

impl Resolver {
    pub fn new() -> io::Result<Self> {
        Self::with_server(DEFAULT_SERVER.parse().expect("valid default resolver addr"))
    }

    pub fn with_server(server: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_nonblocking(true)?;
        Ok(Resolver {
            socket,
            server,
            next_query_id: RefCell::new(1),
            inflight: Rc::new(RefCell::new(HashMap::new())),
        })
    }

    /// resolve `host` to its IPv4 addresses. A literal dotted-quad short-circuits
    /// without touching the network. Concurrent calls for the same `host` share
    /// one wire query: the first caller issues it, later callers just wait on the
    /// first one's result.
    pub async fn resolve(&self, host: &str) -> Result<Vec<Ipv4Addr>, ResolveError> {
        if let Ok(IpAddr::V4(addr)) = host.parse() {
            return Ok(vec![addr]);
        }
        if host.parse::<IpAddr>().is_ok() {
            return Err(ResolveError::NotFound); // AAAA literal, no A record to give back
        }

        let (tx, rx) = flume::bounded(1);
        let is_first = {
            let mut inflight = self.inflight.borrow_mut();
            match inflight.get_mut(host) {
                Some(waiters) => {
                    waiters.push(tx);
                    false
                }
                None => {
                    inflight.insert(host.to_string(), vec![tx]);
                    true
                }
            }
        };

        if is_first {
            debug!(host, "issuing DNS query");
            let outcome = self.query(host).await;
            if let Err(ref e) = outcome {
                warn!(host, error = %e, "DNS query failed");
            }
            let waiters = self
                .inflight
                .borrow_mut()
                .remove(host)
                .unwrap_or_default();
            let to_send = outcome.map_err(|e| e.to_string());
            for waiter in waiters {
                let _ = waiter.send(to_send.clone());
            }
        }

        match rx.recv_async().await {
            Ok(Ok(addrs)) => Ok(addrs),
            Ok(Err(message)) => Err(ResolveError::Io(io::Error::new(io::ErrorKind::Other, message))),
            Err(_) => Err(ResolveError::MalformedResponse),
        }
    }

    async fn query(&self, host: &str) -> Result<Vec<Ipv4Addr>, ResolveError> {
        let id = {
            let mut next = self.next_query_id.borrow_mut();
            let id = *next;
            *next = next.wrapping_add(1).max(1);
            id
        };
        let packet = encode_query(id, host)?;
        self.socket.send_to(&packet, self.server)?;

        let deadline = std::time::Instant::now() + QUERY_TIMEOUT;
        let mut buf = [0u8; 512];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((len, from)) if from == self.server => {
                    let addrs = decode_response(id, &buf[..len])?;
                    if addrs.is_empty() {
                        return Err(ResolveError::NotFound);
                    }
                    return Ok(addrs);
                }
                Ok(_) => continue, // stray datagram from somewhere else, ignore
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if std::time::Instant::now() >= deadline {
                        return Err(ResolveError::Timeout);
                    }
                    ReadReady::new(self.socket.as_raw_fd()).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn encode_name(out: &mut Vec<u8>, host: &str) -> Result<(), ResolveError> {
    for label in host.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(ResolveError::InvalidName(host.to_string()));
        }
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    Ok(())
}

fn encode_query(id: u16, host: &str) -> Result<Vec<u8>, ResolveError> {
    let mut packet = Vec::with_capacity(32 + host.len());
    packet.extend_from_slice(&id.to_be_bytes());
    packet.extend_from_slice(&0x0100u16.to_be_bytes()); // RD (recursion desired)
    packet.extend_from_slice(&1u16.to_be_bytes()); // qdcount
    packet.extend_from_slice(&0u16.to_be_bytes()); // ancount
    packet.extend_from_slice(&0u16.to_be_bytes()); // nscount
    packet.extend_from_slice(&0u16.to_be_bytes()); // arcount
    encode_name(&mut packet, host)?;
    packet.extend_from_slice(&1u16.to_be_bytes()); // QTYPE A
    packet.extend_from_slice(&1u16.to_be_bytes()); // QCLASS IN
    Ok(packet)
}

/// skip a (possibly pointer-compressed) name starting at `pos`, returning the
/// offset just past it.
fn skip_name(buf: &[u8], mut pos: usize) -> Result<usize, ResolveError> {
    loop {
        let len = *buf.get(pos).ok_or(ResolveError::MalformedResponse)? as usize;
        if len == 0 {
            return Ok(pos + 1);
        }
        if len & 0xc0 == 0xc0 {
            return Ok(pos + 2); // pointer: two bytes, done
        }
        pos += 1 + len;
        if pos >= buf.len() {
            return Err(ResolveError::MalformedResponse);
        }
    }
}

fn decode_response(expected_id: u16, buf: &[u8]) -> Result<Vec<Ipv4Addr>, ResolveError> {
    if buf.len() < 12 {
        return Err(ResolveError::MalformedResponse);
    }
    let id = u16::from_be_bytes([buf[0], buf[1]]);
    if id != expected_id {
        return Err(ResolveError::MalformedResponse);
    }
    let qdcount = u16::from_be_bytes([buf[4], buf[5]]) as usize;
    let ancount = u16::from_be_bytes([buf[6], buf[7]]) as usize;

    let mut pos = 12;
    for _ in 0..qdcount {
        pos = skip_name(buf, pos)?;
        pos += 4; // QTYPE + QCLASS
    }

    let mut addrs = Vec::new();
    for _ in 0..ancount {
        pos = skip_name(buf, pos)?;
        if pos + 10 > buf.len() {
            return Err(ResolveError::MalformedResponse);
        }
        let rtype = u16::from_be_bytes([buf[pos], buf[pos + 1]]);
        let rdlength = u16::from_be_bytes([buf[pos + 8], buf[pos + 9]]) as usize;
        pos += 10;
        if pos + rdlength > buf.len() {
            return Err(ResolveError::MalformedResponse);
        }
        if rtype == 1 && rdlength == 4 {
            addrs.push(Ipv4Addr::new(buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]));
        }
        pos += rdlength;
    }
    Ok(addrs)
}

/// helper used by callers that just want "give me a `SocketAddr` to connect to",
/// picking the first A record.
pub async fn resolve_one(resolver: &Resolver, host: &str, port: u16) -> Result<SocketAddr, ResolveError> {
    let addrs = resolver.resolve(host).await?;
    let addr = addrs.into_iter().next().ok_or(ResolveError::NotFound)?;
    Ok(SocketAddr::new(IpAddr::V4(addr), port))
}
