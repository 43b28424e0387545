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
//! procedural macros for nodewire message types.
//!
//! the actor system dispatches at runtime on a `u32 message_id`, so the only
//! thing worth generating per message type is the codec glue: a stable message
//! id and the serde/bincode encode+decode pair a
//! [`nodewire_actor::registry::Message`] impl needs.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// FNV-1a, evaluated at macro-expansion time over the type's path string. Stable
/// across compilations as long as the type isn't renamed - good enough for a wire
/// message id that only has to be consistent within one deployment.
fn fnv1a(s: &str) -> u32 {
    let mut hash: u32 = 0x811c9dc5;
    for b in s.as_bytes() {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(0x01000193);
    }
    // 0 and 1 are reserved for the handshake and PoisonPill
    if hash <= 1 { hash + 2 } else { hash }
}

/// `#[derive(Message)]` on a `Serialize + Deserialize` struct/enum generates a
/// `nodewire_actor::registry::Message` impl: a fixed `MESSAGE_ID` and bincode-backed
/// `encode`/`decode`. Requires `nodewire_actor` to be a visible dependency of the
/// crate the derive is used in.
#[proc_macro_derive(Message)]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let message_id = fnv1a(&name.to_string());

    let expanded = quote! {
        impl ::nodewire_actor::registry::Message for #name {
            const MESSAGE_ID: u32 = #message_id;

            fn encode(&self) -> ::std::vec::Vec<u8> {
                ::bincode::serialize(self).expect("message payload must be serializable")
            }

            fn decode(bytes: &[u8]) -> ::std::result::Result<Self, ::nodewire_actor::ActorError> {
                ::bincode::deserialize(bytes).map_err(|e| ::nodewire_actor::ActorError::Protocol(e.to_string()))
            }
        }
    };

    expanded.into()
}
