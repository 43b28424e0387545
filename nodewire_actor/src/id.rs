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
//! actor identity: a `(node, local, cookie)` triple. The cookie disambiguates a
//! reused local slot from the actor that previously held it, so a message
//! addressed to a dead incarnation is dropped rather than delivered to whatever
//! was registered next at the same local id.

use std::fmt;

pub type LocalActorId = u32;
pub type NodeId = u16;
pub type Cookie = u16;
pub type MessageId = u32;

/// globally (cluster-wide) unique actor address. The all-zero value is reserved
/// as an invalid/sentinel id — also the remote handshake frame's sender and
/// recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActorId {
    node_id: NodeId,
    local_id: LocalActorId,
    cookie: Cookie,
}

impl ActorId {
    pub const INVALID: ActorId = ActorId { node_id: 0, local_id: 0, cookie: 0 };

    pub const fn new(node_id: NodeId, local_id: LocalActorId, cookie: Cookie) -> Self {
        ActorId { node_id, local_id, cookie }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn local_id(&self) -> LocalActorId {
        self.local_id
    }

    pub fn cookie(&self) -> Cookie {
        self.cookie
    }

    /// false only for the all-zero sentinel.
    pub fn is_valid(&self) -> bool {
        !(self.node_id == 0 && self.local_id == 0 && self.cookie == 0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId:{}:{}:{}", self.node_id, self.local_id, self.cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_is_all_zero() {
        assert!(!ActorId::INVALID.is_valid());
        assert!(!ActorId::default().is_valid());
    }

    #[test]
    fn distinct_cookies_are_distinct_ids() {
        let a = ActorId::new(1, 7, 1);
        let b = ActorId::new(1, 7, 2);
        assert_ne!(a, b);
        assert_eq!(a.local_id(), b.local_id());
    }
}
