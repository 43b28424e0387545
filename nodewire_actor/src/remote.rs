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
//! outbound half of a connection to a peer node: buffer outgoing frames,
//! (re)connect lazily, and drain the buffer over the socket whenever there's
//! something to send. The handshake frame sent right after `connect` succeeds
//! gives the peer's demux loop something harmless to read and discard before
//! any real traffic arrives, so a freshly accepted socket is never mistaken for
//! one that's already mid-frame.

use std::cell::RefCell;
use std::net::TcpStream;
use std::rc::Rc;
use std::time::Duration;

use nodewire_common::{info, warn};
use nodewire_reactor::resolver::Resolver;
use nodewire_reactor::suspend;

use crate::envelope::Envelope;
use crate::header::Header;

struct Inner {
    host: String,
    port: u16,
    resolver: Rc<Resolver>,
    socket: Option<TcpStream>,
    connected: bool,
    output: Vec<u8>,
    doorbell: flume::Sender<()>,
    doorbell_rx: flume::Receiver<()>,
}

/// a handle to one outbound peer connection. Cheap to clone (shared `Rc`), same
/// shape as [`crate::system::ActorSystem`] and
/// [`nodewire_reactor::reactor::ReactorHandle`].
#[derive(Clone)]
pub struct RemoteNode(Rc<RefCell<Inner>>);

impl RemoteNode {
    pub fn new(host: impl Into<String>, port: u16, resolver: Rc<Resolver>) -> Self {
        let (doorbell, doorbell_rx) = flume::bounded(1);
        RemoteNode(Rc::new(RefCell::new(Inner {
            host: host.into(),
            port,
            resolver,
            socket: None,
            connected: false,
            output: Vec::new(),
            doorbell,
            doorbell_rx,
        })))
    }

    pub fn host_port(&self) -> (String, u16) {
        let inner = self.0.borrow();
        (inner.host.clone(), inner.port)
    }

    /// append one outbound envelope's wire frame and wake the drain loop. `Near`
    /// blobs cannot reach this point: `ActorSystem::send` always encodes remote
    /// sends to `Far` before calling here.
    pub fn enqueue(&self, envelope: Envelope) {
        let header =
            Header { sender: envelope.sender, recipient: envelope.recipient, message_id: envelope.message_id, size: envelope.blob.wire_len() as u32 };
        let mut inner = self.0.borrow_mut();
        header.encode(&mut inner.output);
        if envelope.blob.wire_len() > 0 {
            inner.output.extend_from_slice(envelope.blob.as_far_slice());
        }
        let _ = inner.doorbell.try_send(());
    }

    /// (re)connect loop: resolves the host, connects, sends the handshake frame,
    /// then idles — reconnection on failure is handled by `drain_loop` calling
    /// back into `connect` when a write fails.
    pub async fn connect_loop(self) {
        loop {
            if self.0.borrow().connected {
                return;
            }
            if let Err(e) = self.try_connect().await {
                warn!(host = %self.0.borrow().host, error = %e, "connect failed, retrying");
                suspend::sleep(Duration::from_secs(1)).await;
                continue;
            }
            return;
        }
    }

    async fn try_connect(&self) -> std::io::Result<()> {
        let (host, port, resolver) = {
            let inner = self.0.borrow();
            (inner.host.clone(), inner.port, inner.resolver.clone())
        };
        let addr = resolver
            .resolve(&host)
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no A record"))?;
        let socket_addr = std::net::SocketAddr::new(std::net::IpAddr::V4(addr), port);

        let stream = suspend::connect(socket_addr).await?;
        stream.set_nodelay(true).ok();
        let handshake = Header::handshake().encoded();
        suspend::write_all(&stream, &handshake).await?;

        let mut inner = self.0.borrow_mut();
        inner.socket = Some(stream);
        inner.connected = true;
        info!(host, port, "connected to remote node");
        Ok(())
    }

    /// wait for outbound data, then write it all out; on failure, drop the
    /// connection and kick off a fresh `connect_loop`.
    pub async fn drain_loop(self) {
        loop {
            let rx = self.0.borrow().doorbell_rx.clone();
            let _ = rx.recv_async().await;
            if let Err(e) = self.drain_once().await {
                warn!(error = %e, "error draining outbound buffer, reconnecting");
                self.0.borrow_mut().connected = false;
                self.0.borrow_mut().socket = None;
                self.connect_loop().await;
            }
        }
    }

    async fn drain_once(&self) -> std::io::Result<()> {
        if !self.0.borrow().connected {
            return Ok(());
        }
        let buf = {
            let mut inner = self.0.borrow_mut();
            std::mem::take(&mut inner.output)
        };
        if buf.is_empty() {
            return Ok(());
        }
        let stream = self.0.borrow().socket.as_ref().expect("connected implies a socket").try_clone()?;
        suspend::write_all(&stream, &buf).await
    }
}
