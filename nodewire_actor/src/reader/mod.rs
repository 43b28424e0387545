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
//! envelope readers: incremental decoders that turn a stream of inbound bytes
//! into `Envelope`s. Two implementations share one contract: a deque-backed one
//! that always copies, and a chunk-ring one that shares its backing buffer with
//! every envelope extracted from it.

pub mod chunk_reader;
pub mod deque_reader;

use crate::envelope::Envelope;

pub trait EnvelopeReader {
    /// append freshly-received bytes.
    fn push(&mut self, data: &[u8]);

    /// pop one complete envelope if the buffer holds one, else `None`.
    fn pop(&mut self) -> Option<Envelope>;

    /// true until a full header and its payload have both been pushed.
    fn needs_more_data(&self) -> bool;

    /// bytes currently buffered (including any already-parsed header).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
