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
//! an actor's inbox. `flume` (already pulled in by the reactor crate for the
//! executor's wake queue) gives us an unbounded FIFO with an async-aware
//! receiver, so the actor run loop can just `recv_async().await` instead of
//! polling a queue and a notification primitive separately.

use crate::envelope::Envelope;

pub type MailboxSender = flume::Sender<Envelope>;
pub type MailboxReceiver = flume::Receiver<Envelope>;

/// single-flight invariant: `recv_async` yields exactly one envelope
/// per call, and a `flume::Receiver` is never polled concurrently from more than
/// one place in this codebase — each actor owns exactly one receiver, read only
/// from that actor's own run-loop task.
pub fn channel() -> (MailboxSender, MailboxReceiver) {
    flume::unbounded()
}
