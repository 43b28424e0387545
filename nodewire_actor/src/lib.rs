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
//! a location-transparent actor runtime. Actors are registered with an
//! [`ActorSystem`], addressed by [`ActorId`], and exchange [`Envelope`]s
//! carrying either an in-process [`blob::Blob::Near`] value or a wire-ready
//! [`blob::Blob::Far`] one.

pub mod actor;
pub mod blob;
pub mod context;
pub mod envelope;
pub mod errors;
pub mod header;
pub mod id;
pub mod mailbox;
pub mod reader;
pub mod registry;
pub mod remote;
pub mod system;

pub use actor::{Actor, Behavior};
pub use blob::Blob;
pub use context::ActorContext;
pub use envelope::Envelope;
pub use errors::{ActorError, Result};
pub use header::{PoisonPill, HANDSHAKE_MESSAGE_ID, POISON_PILL_MESSAGE_ID};
pub use id::{ActorId, Cookie, LocalActorId, MessageId, NodeId};
pub use registry::{Message, MessageRegistry};
pub use remote::RemoteNode;
pub use system::{ActorSystem, ScheduleHandle};

pub mod prelude {
    pub use crate::actor::{Actor, Behavior};
    pub use crate::blob::Blob;
    pub use crate::context::ActorContext;
    pub use crate::envelope::Envelope;
    pub use crate::errors::{ActorError, Result};
    pub use crate::header::PoisonPill;
    pub use crate::id::ActorId;
    pub use crate::registry::Message;
    pub use crate::remote::RemoteNode;
    pub use crate::system::ActorSystem;
}
