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
use crate::blob::Blob;
use crate::id::{ActorId, MessageId};

/// one message in flight.
pub struct Envelope {
    pub sender: ActorId,
    pub recipient: ActorId,
    pub message_id: MessageId,
    pub blob: Blob,
}

impl Envelope {
    pub fn new(sender: ActorId, recipient: ActorId, message_id: MessageId, blob: Blob) -> Self {
        Envelope { sender, recipient, message_id, blob }
    }

    pub fn is_poison_pill(&self) -> bool {
        self.message_id == crate::header::POISON_PILL_MESSAGE_ID
    }

    pub fn is_handshake(&self) -> bool {
        self.message_id == crate::header::HANDSHAKE_MESSAGE_ID
    }

    #[cfg(test)]
    pub fn blob_as_far(&self) -> &[u8] {
        self.blob.as_far_slice()
    }
}
