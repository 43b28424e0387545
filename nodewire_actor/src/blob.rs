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
//! message payload representation: a value is carried either `Near` (an
//! in-process handle, valid only within this node) or `Far` (a byte
//! representation suitable for the wire). The representation is picked per-send
//! based on whether the recipient is local or remote (see `ActorSystem::send`).

use std::any::Any;
use std::ops::Deref;
use std::rc::Rc;

/// an immutable byte range, possibly shared with other `ChunkRef`s over the same
/// backing allocation. [`reader::chunk_reader`] hands these out without copying;
/// [`reader::deque_reader`] allocates a fresh one per envelope since it never
/// shares a backing buffer across pops.
#[derive(Clone)]
pub struct ChunkRef {
    chunk: Rc<[u8]>,
    start: usize,
    len: usize,
}

impl ChunkRef {
    pub fn owned(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        ChunkRef { chunk: Rc::from(bytes.into_boxed_slice()), start: 0, len }
    }

    /// a sub-range of an already-shared chunk; no copy, just another reference
    /// into `chunk` plus its own `(start, len)`.
    pub fn slice_of(chunk: Rc<[u8]>, start: usize, len: usize) -> Self {
        debug_assert!(start + len <= chunk.len());
        ChunkRef { chunk, start, len }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.chunk[self.start..self.start + self.len]
    }

    /// true if `self` and `other` are views into the same backing allocation —
    /// the zero-copy property a [`reader::chunk_reader::ChunkEnvelopeReader`] is
    /// expected to uphold for every payload extracted from one push.
    pub fn shares_allocation_with(&self, other: &ChunkRef) -> bool {
        Rc::ptr_eq(&self.chunk, &other.chunk)
    }
}

impl Deref for ChunkRef {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// a message payload: either a live in-process value (`Near`) or its wire bytes
/// (`Far`). `Near` is used for intra-node delivery so actors can exchange large
/// values without a serialize/deserialize round trip; `Far` is what crosses a
/// `RemoteNode` connection and what a reader hands back from incoming bytes.
pub enum Blob {
    Near(Rc<dyn Any>),
    Far(ChunkRef),
}

impl Blob {
    pub fn near<T: 'static>(value: T) -> Self {
        Blob::Near(Rc::new(value))
    }

    pub fn far(bytes: Vec<u8>) -> Self {
        Blob::Far(ChunkRef::owned(bytes))
    }

    pub fn is_far(&self) -> bool {
        matches!(self, Blob::Far(_))
    }

    /// byte length for wire framing: the encoded size for `Far`, 0 for `Near`
    /// (an in-process handle has no wire representation until it is serialized).
    pub fn wire_len(&self) -> usize {
        match self {
            Blob::Near(_) => 0,
            Blob::Far(chunk) => chunk.len,
        }
    }

    /// panics if called on a `Near` blob; used at call sites that already know,
    /// from the message's locality, which variant they have.
    pub fn as_far_slice(&self) -> &[u8] {
        match self {
            Blob::Far(chunk) => chunk.as_slice(),
            Blob::Near(_) => panic!("as_far_slice called on a Near blob"),
        }
    }
}
