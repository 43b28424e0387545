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
//! per-dispatch actor context. The "reuse the slot's memory across actor
//! generations" behavior comes straight from [`nodewire_reactor::Arena`] (see
//! `ActorSystem`'s `context_arena` field); each `receive` call just gets a
//! fresh lightweight `ActorContext` view over the arena-held data.

use std::time::{Duration, Instant};

use crate::envelope::Envelope;
use crate::errors::Result;
use crate::id::ActorId;
use crate::registry::Message;
use crate::system::{ActorSystem, ScheduleHandle};

pub struct ActorContext {
    self_id: ActorId,
    system: ActorSystem,
}

impl ActorContext {
    pub(crate) fn new(self_id: ActorId, system: ActorSystem) -> Self {
        ActorContext { self_id, system }
    }

    pub fn self_id(&self) -> ActorId {
        self.self_id
    }

    pub fn system(&self) -> &ActorSystem {
        &self.system
    }

    pub fn send<M: Message>(&self, recipient: ActorId, message: M) {
        self.system.send(self.self_id, recipient, message);
    }

    /// send `message` to `recipient` as if `original` had sent it directly,
    /// preserving `original.sender` instead of substituting this actor.
    pub fn forward<M: Message>(&self, original: &Envelope, recipient: ActorId, message: M) {
        self.system.forward(original, recipient, message);
    }

    pub async fn ask<Req: Message, Resp: Message>(&self, recipient: ActorId, request: Req) -> Result<Resp> {
        self.system.ask(recipient, request).await
    }

    pub async fn ask_timeout<Req: Message, Resp: Message>(
        &self,
        recipient: ActorId,
        request: Req,
        timeout: Duration,
    ) -> Result<Resp> {
        self.system.ask_timeout(recipient, request, timeout).await
    }

    pub fn schedule<M: Message>(&self, recipient: ActorId, message: M, when: Instant) -> ScheduleHandle {
        self.system.schedule(self.self_id, recipient, message, when)
    }

    pub async fn sleep(&self, duration: Duration) {
        nodewire_reactor::suspend::sleep(duration).await
    }

    pub async fn sleep_until(&self, deadline: Instant) {
        nodewire_reactor::suspend::Sleep::until(deadline).await
    }
}
