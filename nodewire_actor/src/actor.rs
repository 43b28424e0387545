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
//! the `Actor` trait and its `Behavior` return value. `Behavior::Become` is a
//! common actor-model refinement on top of a fixed `receive` override: it lets
//! an actor change how it handles the *next* message without an explicit state
//! machine field.

use async_trait::async_trait;

use crate::context::ActorContext;
use crate::envelope::Envelope;
use crate::errors::Result;

/// what an actor's run loop should do after a `receive` call returns.
pub enum Behavior {
    /// keep handling messages with the same actor value.
    Same,
    /// replace the actor value used for subsequent messages.
    Become(Box<dyn Actor>),
    /// stop the actor: the run loop exits and the slot is reclaimed.
    Stop,
}

#[async_trait(?Send)]
pub trait Actor {
    async fn receive(&mut self, envelope: Envelope, ctx: &ActorContext) -> Result<Behavior>;

    /// called once when the run loop exits, whether from `Behavior::Stop`, a
    /// `PoisonPill`, or a `receive` error. Default is a no-op.
    async fn stopped(&mut self, _ctx: &ActorContext) {}
}
