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
//! wire frame header: sender, recipient, message id, payload size. Encoded as a
//! fixed 24-byte little-endian struct so a reader can recognize a complete
//! header without any length-prefix-of-a-length-prefix indirection.

use crate::errors::ActorError;
use crate::id::{ActorId, Cookie, LocalActorId, MessageId, NodeId};
use crate::registry::Message;

/// reserved message id for the handshake frame: the very first frame a
/// connecting node sends, with an all-zero sender and recipient.
pub const HANDSHAKE_MESSAGE_ID: MessageId = 0;
/// reserved message id for `PoisonPill`; enforced by [`crate::registry::Message`]
/// impls never claiming id 0 or 1 (see `nodewire_macro`'s `fnv1a`).
pub const POISON_PILL_MESSAGE_ID: MessageId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub sender: ActorId,
    pub recipient: ActorId,
    pub message_id: MessageId,
    pub size: u32,
}

const ACTOR_ID_LEN: usize = 8; // node_id: u16, local_id: u32, cookie: u16
pub const HEADER_LEN: usize = ACTOR_ID_LEN * 2 + 4 + 4;

fn encode_actor_id(id: ActorId, out: &mut Vec<u8>) {
    out.extend_from_slice(&id.node_id().to_le_bytes());
    out.extend_from_slice(&id.local_id().to_le_bytes());
    out.extend_from_slice(&id.cookie().to_le_bytes());
}

fn decode_actor_id(buf: &[u8]) -> ActorId {
    let node_id = NodeId::from_le_bytes([buf[0], buf[1]]);
    let local_id = LocalActorId::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]);
    let cookie = Cookie::from_le_bytes([buf[6], buf[7]]);
    ActorId::new(node_id, local_id, cookie)
}

impl Header {
    pub fn handshake() -> Header {
        Header {
            sender: ActorId::INVALID,
            recipient: ActorId::INVALID,
            message_id: HANDSHAKE_MESSAGE_ID,
            size: 0,
        }
    }

    pub fn is_handshake(&self) -> bool {
        self.message_id == HANDSHAKE_MESSAGE_ID
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        encode_actor_id(self.sender, out);
        encode_actor_id(self.recipient, out);
        out.extend_from_slice(&self.message_id.to_le_bytes());
        out.extend_from_slice(&self.size.to_le_bytes());
    }

    pub fn encoded(&self) -> [u8; HEADER_LEN] {
        let mut out = Vec::with_capacity(HEADER_LEN);
        self.encode(&mut out);
        out.try_into().expect("encode always writes HEADER_LEN bytes")
    }

    /// `None` if `buf` is shorter than [`HEADER_LEN`]; the caller should wait for
    /// more bytes rather than treat that as an error.
    pub fn decode(buf: &[u8]) -> Option<Header> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        let sender = decode_actor_id(&buf[0..8]);
        let recipient = decode_actor_id(&buf[8..16]);
        let message_id = MessageId::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]);
        let size = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);
        Some(Header { sender, recipient, message_id, size })
    }
}

/// the one system-reserved message every actor understands without a registry
/// lookup: tells the run loop to stop after this delivery.
pub struct PoisonPill;

impl Message for PoisonPill {
    const MESSAGE_ID: u32 = POISON_PILL_MESSAGE_ID;

    fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    fn decode(_bytes: &[u8]) -> std::result::Result<Self, ActorError> {
        Ok(PoisonPill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let header = Header {
            sender: ActorId::new(1, 2, 3),
            recipient: ActorId::new(4, 5, 6),
            message_id: 42,
            size: 128,
        };
        let bytes = header.encoded();
        assert_eq!(bytes.len(), HEADER_LEN);
        let decoded = Header::decode(&bytes).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn handshake_is_all_zero_ids() {
        let header = Header::handshake();
        assert!(header.is_handshake());
        assert!(!header.sender.is_valid());
        assert!(!header.recipient.is_valid());
    }

    #[test]
    fn short_buffer_is_none() {
        assert!(Header::decode(&[0u8; HEADER_LEN - 1]).is_none());
    }
}
