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
//! message registry: `message_id -> (encode, decode)`.
//! `#[derive(Message)]` (in `nodewire_macro`) is the usual way to
//! implement [`Message`]; the registry itself only matters at the boundary where
//! a `Far` blob arrives with nothing but a `message_id` attached (a frame off the
//! wire) and needs to become a concrete value before a local actor can downcast
//! it — the in-process `Near` path never touches this at all.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::ActorError;

/// a type that can be sent as an actor message. `MESSAGE_ID` must be unique
/// within one deployment; 0 and 1 are reserved ([`crate::header::HANDSHAKE_MESSAGE_ID`],
/// [`crate::header::POISON_PILL_MESSAGE_ID`]).
pub trait Message: Sized + 'static {
    const MESSAGE_ID: u32;

    fn encode(&self) -> Vec<u8>;
    fn decode(bytes: &[u8]) -> Result<Self, ActorError>;
}

type DecodeFn = Box<dyn Fn(&[u8]) -> Result<Rc<dyn Any>, ActorError>>;

/// per-node table of decoders, populated once at startup via [`MessageRegistry::register`]
/// for every message type the node expects to receive off the wire.
#[derive(Default)]
pub struct MessageRegistry {
    decoders: HashMap<u32, DecodeFn>,
}

impl MessageRegistry {
    pub fn new() -> Self {
        MessageRegistry::default()
    }

    pub fn register<M: Message>(&mut self) {
        self.decoders.insert(
            M::MESSAGE_ID,
            Box::new(|bytes| M::decode(bytes).map(|v| Rc::new(v) as Rc<dyn Any>)),
        );
    }

    pub fn is_registered(&self, message_id: u32) -> bool {
        self.decoders.contains_key(&message_id)
    }

    pub fn decode(&self, message_id: u32, bytes: &[u8]) -> Result<Rc<dyn Any>, ActorError> {
        let decode = self
            .decoders
            .get(&message_id)
            .ok_or(ActorError::UnknownMessage(message_id))?;
        decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping(u32);
    impl Message for Ping {
        const MESSAGE_ID: u32 = 100;
        fn encode(&self) -> Vec<u8> {
            self.0.to_le_bytes().to_vec()
        }
        fn decode(bytes: &[u8]) -> Result<Self, ActorError> {
            Ok(Ping(u32::from_le_bytes(bytes.try_into().map_err(|_| {
                ActorError::Protocol("bad Ping payload".into())
            })?)))
        }
    }

    #[test]
    fn round_trips_through_the_registry() {
        let mut registry = MessageRegistry::new();
        registry.register::<Ping>();
        let encoded = Ping(7).encode();
        let decoded = registry.decode(Ping::MESSAGE_ID, &encoded).unwrap();
        assert_eq!(decoded.downcast_ref::<Ping>().unwrap().0, 7);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let registry = MessageRegistry::new();
        assert!(matches!(
            registry.decode(999, &[]),
            Err(ActorError::UnknownMessage(999))
        ));
    }
}
