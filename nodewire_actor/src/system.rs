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
//! the actor system: actor registration with reused local ids, local/remote
//! send, scheduled delivery, the ask pattern via a throwaway one-shot actor, and
//! remote node bookkeeping.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use nodewire_common::{debug, warn};
use nodewire_reactor::{Arena, ArenaBox, LocalExecutor};

use crate::actor::{Actor, Behavior};
use crate::context::ActorContext;
use crate::envelope::Envelope;
use crate::errors::{ActorError, Result};
use crate::header::PoisonPill;
use crate::id::{ActorId, Cookie, LocalActorId, NodeId};
use crate::mailbox::{self, MailboxReceiver, MailboxSender};
use crate::reader::{chunk_reader::ChunkEnvelopeReader, EnvelopeReader};
use crate::registry::{Message, MessageRegistry};
use crate::remote::RemoteNode;

struct ContextSlotData {
    #[allow(dead_code)] // read via the slot's own copy, not through this field directly
    self_id: ActorId,
}

struct Slot {
    cookie: Cookie,
    mailbox: MailboxSender,
    context_slot: ArenaBox<ContextSlotData>,
}

struct Inner {
    node_id: NodeId,
    executor: Rc<LocalExecutor>,
    registry: Rc<RefCell<MessageRegistry>>,
    context_arena: Arena<ContextSlotData>,
    slots: Vec<Option<Slot>>,
    free_ids: Vec<LocalActorId>,
    next_cookie: Cookie,
    alive: usize,
    nodes: HashMap<NodeId, RemoteNode>,
}

/// a cheap, cloneable handle onto the shared system state — same `Rc<RefCell<_>>`
/// handle shape as [`nodewire_reactor::reactor::ReactorHandle`].
#[derive(Clone)]
pub struct ActorSystem(Rc<RefCell<Inner>>);

/// returned by [`ActorSystem::schedule`]/[`ActorContext::schedule`]; dropping this
/// does *not* cancel the delivery — it's fire-and-forget unless the caller
/// explicitly calls `cancel`.
pub struct ScheduleHandle {
    cancelled: Rc<Cell<bool>>,
}

impl ScheduleHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }
}

impl ActorSystem {
    pub fn new(node_id: NodeId, executor: Rc<LocalExecutor>) -> Self {
        ActorSystem(Rc::new(RefCell::new(Inner {
            node_id,
            executor,
            registry: Rc::new(RefCell::new(MessageRegistry::new())),
            context_arena: Arena::new(),
            slots: Vec::new(),
            free_ids: Vec::new(),
            next_cookie: 1,
            alive: 0,
            nodes: HashMap::new(),
        })))
    }

    pub fn node_id(&self) -> NodeId {
        self.0.borrow().node_id
    }

    pub fn alive_count(&self) -> usize {
        self.0.borrow().alive
    }

    pub fn registry(&self) -> Rc<RefCell<MessageRegistry>> {
        self.0.borrow().registry.clone()
    }

    fn executor(&self) -> Rc<LocalExecutor> {
        self.0.borrow().executor.clone()
    }

    /// register a new actor, spawning its run loop on the executor. Reuses a
    /// freed local id when one is available; otherwise grows the slot table.
    pub fn register<A: Actor + 'static>(&self, actor: A) -> ActorId {
        self.register_boxed(Box::new(actor))
    }

    pub fn register_boxed(&self, actor: Box<dyn Actor>) -> ActorId {
        let (tx, rx) = mailbox::channel();
        let self_id = {
            let mut inner = self.0.borrow_mut();
            let local_id = inner.free_ids.pop().unwrap_or_else(|| {
                let id = inner.slots.len() as LocalActorId;
                inner.slots.push(None);
                id
            });
            let cookie = inner.next_cookie;
            inner.next_cookie = if inner.next_cookie == Cookie::MAX { 1 } else { inner.next_cookie + 1 };
            let self_id = ActorId::new(inner.node_id, local_id, cookie);
            let context_slot = inner.context_arena.allocate(ContextSlotData { self_id });
            inner.slots[local_id as usize] = Some(Slot { cookie, mailbox: tx, context_slot });
            inner.alive += 1;
            self_id
        };

        debug!(actor = %self_id, "actor registered");
        let system = self.clone();
        self.executor().spawn(run_actor(system, self_id, actor, rx));
        self_id
    }

    /// reclaim a slot once its run loop has exited. Not part of the public API:
    /// called only from [`run_actor`]'s own cleanup.
    fn deregister(&self, actor_id: ActorId) {
        let mut inner = self.0.borrow_mut();
        let idx = actor_id.local_id() as usize;
        if let Some(slot) = inner.slots.get(idx).and_then(|s| s.as_ref()) {
            if slot.cookie != actor_id.cookie() {
                return; // already replaced by a newer incarnation; nothing to do
            }
        } else {
            return;
        }
        if let Some(slot) = inner.slots[idx].take() {
            inner.context_arena.deallocate(slot.context_slot);
            inner.alive -= 1;
            inner.free_ids.push(actor_id.local_id());
        }
        debug!(actor = %actor_id, "actor deregistered");
    }

    fn mailbox_for(&self, actor_id: ActorId) -> Option<MailboxSender> {
        let inner = self.0.borrow();
        let slot = inner.slots.get(actor_id.local_id() as usize)?.as_ref()?;
        if slot.cookie != actor_id.cookie() {
            return None; // stale id: the slot has since been reused by another actor
        }
        Some(slot.mailbox.clone())
    }

    /// send `message` from `sender` to `recipient`. Local delivery carries the
    /// value as `Blob::Near` with no serialization; remote delivery always goes
    /// through `Message::encode` since bytes are the only thing that can cross
    /// a `RemoteNode` connection.
    pub fn send<M: Message>(&self, sender: ActorId, recipient: ActorId, message: M) {
        if recipient.node_id() == self.node_id() {
            self.deliver_local(Envelope::new(sender, recipient, M::MESSAGE_ID, crate::blob::Blob::near(message)));
        } else {
            self.send_remote(sender, recipient, M::MESSAGE_ID, message.encode());
        }
    }

    /// send `message` to `recipient` on behalf of whoever sent `original` to us,
    /// rather than on behalf of this actor. The recipient's `envelope.sender`
    /// ends up naming the original sender, so a reply it sends goes straight
    /// back to the original caller instead of to the actor that forwarded it.
    pub fn forward<M: Message>(&self, original: &Envelope, recipient: ActorId, message: M) {
        self.send(original.sender, recipient, message);
    }

    /// deliver an already-constructed envelope to a local actor's mailbox.
    /// Silently drops messages addressed to an unknown or stale actor id; no
    /// tombstone reply is ever sent.
    pub fn deliver_local(&self, envelope: Envelope) {
        if let Some(mailbox) = self.mailbox_for(envelope.recipient) {
            let _ = mailbox.send(envelope);
        } else {
            warn!(recipient = %envelope.recipient, "dropping message for unknown actor");
        }
    }

    fn send_remote(&self, sender: ActorId, recipient: ActorId, message_id: u32, bytes: Vec<u8>) {
        let node = self.0.borrow().nodes.get(&recipient.node_id()).cloned();
        match node {
            Some(node) => node.enqueue(Envelope::new(
                sender,
                recipient,
                message_id,
                crate::blob::Blob::far(bytes),
            )),
            None => warn!(node = recipient.node_id(), "no route to node"),
        }
    }

    pub fn send_poison_pill(&self, sender: ActorId, recipient: ActorId) {
        self.send(sender, recipient, PoisonPill);
    }

    /// register a remote peer this system can send to and accept frames from.
    pub fn add_node(&self, node_id: NodeId, node: RemoteNode) {
        self.0.borrow_mut().nodes.insert(node_id, node.clone());
        let executor = self.executor();
        executor.spawn(node.clone().connect_loop());
        executor.spawn(node.drain_loop());
    }

    /// accept inbound connections on `listener` forever, spawning one demux task
    /// per peer. Each frame keeps its bytes as a `Far` blob so the recipient
    /// actor can still decode it.
    pub async fn serve_inbound(&self, listener: std::net::TcpListener) -> Result<()> {
        listener.set_nonblocking(true)?;
        loop {
            let (stream, _addr) = nodewire_reactor::suspend::accept(&listener).await?;
            stream.set_nodelay(true).ok();
            let system = self.clone();
            self.executor().spawn(serve_inbound_connection(system, stream));
        }
    }

    /// run `deliver_local` for every envelope a `RemoteNode` hands up from an
    /// inbound connection, rejecting anything not addressed to this node.
    pub(crate) fn deliver_from_remote(&self, envelope: Envelope) {
        if envelope.recipient.node_id() != self.node_id() {
            warn!(recipient = %envelope.recipient, this_node = self.node_id(), "received message for a different node");
            return;
        }
        self.deliver_local(envelope);
    }

    /// deliver `message` at `deadline`, from an anonymous system sender (local id
    /// 0) unless `sender` names a real actor. Implemented as a task that sleeps
    /// and then sends rather than a second timer-wheel instance, since the
    /// reactor already has one.
    pub fn schedule<M: Message>(&self, sender: ActorId, recipient: ActorId, message: M, when: Instant) -> ScheduleHandle {
        let cancelled = Rc::new(Cell::new(false));
        let handle = ScheduleHandle { cancelled: cancelled.clone() };
        let system = self.clone();
        self.executor().spawn(async move {
            nodewire_reactor::suspend::Sleep::until(when).await;
            if !cancelled.get() {
                system.send(sender, recipient, message);
            }
        });
        handle
    }

    /// the ask pattern: register a throwaway one-shot actor, send it `request`,
    /// and await its reply. The one-shot actor resolves a oneshot channel on
    /// receipt and returns `Behavior::Stop`, so it's gone again before the
    /// caller even sees the reply.
    pub async fn ask<Req: Message, Resp: Message>(&self, recipient: ActorId, request: Req) -> Result<Resp> {
        self.ask_timeout(recipient, request, Duration::from_secs(30)).await
    }

    pub async fn ask_timeout<Req: Message, Resp: Message>(
        &self,
        recipient: ActorId,
        request: Req,
        timeout: Duration,
    ) -> Result<Resp> {
        let (tx, rx) = flume::bounded(1);
        let ask_actor_id = self.register(AskActor::<Resp> { reply: Some(tx) });
        self.send(ask_actor_id, recipient, request);

        let deadline = Instant::now() + timeout;
        let recv_fut = Box::pin(rx.recv_async());
        let timeout_fut = Box::pin(nodewire_reactor::suspend::Sleep::until(deadline));
        match futures::future::select(recv_fut, timeout_fut).await {
            futures::future::Either::Left((result, _)) => {
                result.map_err(|_| ActorError::AskTimeout(timeout))
            }
            futures::future::Either::Right((_, _)) => Err(ActorError::AskTimeout(timeout)),
        }
    }
}

/// the run loop every registered actor executes on the [`LocalExecutor`]. A free
/// function rather than a method so it can own `actor` and move across await
/// points without holding a borrow of `Inner`.
async fn run_actor(system: ActorSystem, self_id: ActorId, mut actor: Box<dyn Actor>, rx: MailboxReceiver) {
    let ctx = ActorContext::new(self_id, system.clone());
    loop {
        let envelope = match rx.recv_async().await {
            Ok(envelope) => envelope,
            Err(_) => break, // every sender (this actor's own id) has been dropped
        };
        if envelope.is_poison_pill() {
            break;
        }
        match actor.receive(envelope, &ctx).await {
            Ok(Behavior::Same) => {}
            Ok(Behavior::Become(next)) => actor = next,
            Ok(Behavior::Stop) => break,
            Err(err) => warn!(actor = %self_id, error = %err, "actor receive failed"),
        }
        // give other ready tasks a turn before draining the next mailbox message,
        // so one actor's backlog can't starve the rest of the executor.
        nodewire_reactor::suspend::yield_now().await;
    }
    actor.stopped(&ctx).await;
    system.deregister(self_id);
}

/// per-connection inbound demux: read bytes, hand complete envelopes to the
/// system, drop the connection's reader state (and whatever chunk it still
/// shares) once the peer disconnects.
async fn serve_inbound_connection(system: ActorSystem, stream: std::net::TcpStream) {
    let mut reader = ChunkEnvelopeReader::new();
    let mut buf = [0u8; 16 * 1024];
    loop {
        let n = match nodewire_reactor::suspend::read(&stream, &mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "inbound connection read error");
                break;
            }
        };
        reader.push(&buf[..n]);
        while let Some(envelope) = reader.pop() {
            if envelope.is_handshake() {
                continue;
            }
            system.deliver_from_remote(envelope);
        }
    }
}

/// the one-shot actor behind [`ActorSystem::ask`]. `Resp` must be registered so
/// `receive`'s downcast of a remote reply's decoded `Near` value succeeds; local
/// asks never go through the registry at all since the reply arrives as `Near`.
struct AskActor<Resp> {
    reply: Option<flume::Sender<Resp>>,
}

#[async_trait::async_trait(?Send)]
impl<Resp: Message> Actor for AskActor<Resp> {
    async fn receive(&mut self, envelope: Envelope, _ctx: &ActorContext) -> Result<Behavior> {
        let response = match envelope.blob {
            crate::blob::Blob::Near(value) => {
                let rc = value
                    .downcast::<Resp>()
                    .map_err(|_| ActorError::Protocol("ask reply type mismatch".into()))?;
                Rc::try_unwrap(rc).unwrap_or_else(|rc| Resp::decode(&rc.encode()).expect("re-encode of Near reply"))
            }
            crate::blob::Blob::Far(bytes) => Resp::decode(&bytes)?,
        };
        if let Some(tx) = self.reply.take() {
            let _ = tx.send(response);
        }
        Ok(Behavior::Stop)
    }
}
