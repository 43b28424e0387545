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
//! zero-copy reader: bytes land directly in a growable chunk, and a popped
//! envelope's payload is a [`crate::blob::ChunkRef`] into that same chunk rather
//! than a fresh allocation. A chunk is only dropped once every envelope sliced
//! out of it has been dropped too — `Rc`'s own strong count tracks that for us.
//! The current chunk is sealed and a fresh one started whenever it fills up.

use std::rc::Rc;

use super::EnvelopeReader;
use crate::blob::{Blob, ChunkRef};
use crate::envelope::Envelope;
use crate::header::{Header, HEADER_LEN};

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

pub struct ChunkEnvelopeReader {
    chunk_size: usize,
    current: Vec<u8>,
    pending_header: Option<Header>,
    /// offset within `current` where the in-progress frame's payload begins.
    payload_start: usize,
    /// `Rc<[u8]>` view of `current` as of the last time it changed. Built lazily
    /// on the first `pop()` that needs it and reused by every subsequent `pop()`
    /// until `current` is appended to or rotated, so every envelope drawn from
    /// one buffer state shares a single backing allocation.
    shared: Option<Rc<[u8]>>,
}

impl ChunkEnvelopeReader {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        ChunkEnvelopeReader {
            chunk_size,
            current: Vec::with_capacity(chunk_size),
            pending_header: None,
            payload_start: 0,
            shared: None,
        }
    }

    fn try_parse_header(&mut self) {
        if self.pending_header.is_some() {
            return;
        }
        if self.current.len() - self.payload_start < HEADER_LEN {
            return;
        }
        let start = self.payload_start;
        if let Some(header) = Header::decode(&self.current[start..start + HEADER_LEN]) {
            self.payload_start += HEADER_LEN;
            self.pending_header = Some(header);
        }
    }
}

impl Default for ChunkEnvelopeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeReader for ChunkEnvelopeReader {
    fn push(&mut self, data: &[u8]) {
        self.current.extend_from_slice(data);
        self.shared = None;
        self.try_parse_header();
    }

    fn pop(&mut self) -> Option<Envelope> {
        self.try_parse_header();
        let header = self.pending_header?;
        let size = header.size as usize;
        if self.current.len() - self.payload_start < size {
            return None;
        }
        let start = self.payload_start;

        let blob = if size == 0 {
            Blob::far(Vec::new())
        } else {
            let shared = self
                .shared
                .get_or_insert_with(|| Rc::from(self.current.clone().into_boxed_slice()))
                .clone();
            Blob::Far(ChunkRef::slice_of(shared, start, size))
        };

        self.payload_start += size;
        self.pending_header = None;

        // chunk exhausted: start fresh so `current` doesn't grow without bound.
        if self.payload_start == self.current.len() {
            self.current.clear();
            self.payload_start = 0;
            self.shared = None;
        }
        self.try_parse_header();

        Some(Envelope::new(header.sender, header.recipient, header.message_id, blob))
    }

    fn needs_more_data(&self) -> bool {
        match self.pending_header {
            None => self.current.len() - self.payload_start < HEADER_LEN,
            Some(header) => self.current.len() - self.payload_start < header.size as usize,
        }
    }

    fn len(&self) -> usize {
        self.current.len() - self.payload_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_several_frames_from_one_chunk() {
        let mut bytes = Vec::new();
        for (id, payload) in [(1u32, &b"aa"[..]), (2u32, &b"bbb"[..])] {
            let header = Header {
                sender: Default::default(),
                recipient: Default::default(),
                message_id: id,
                size: payload.len() as u32,
            };
            bytes.extend_from_slice(&header.encoded());
            bytes.extend_from_slice(payload);
        }

        let mut reader = ChunkEnvelopeReader::new();
        reader.push(&bytes);

        let first = reader.pop().unwrap();
        assert_eq!(first.message_id, 1);
        assert_eq!(first.blob_as_far(), b"aa");

        let second = reader.pop().unwrap();
        assert_eq!(second.message_id, 2);
        assert_eq!(second.blob_as_far(), b"bbb");

        assert!(reader.pop().is_none());
    }

    #[test]
    fn incomplete_payload_yields_none() {
        let header = Header { sender: Default::default(), recipient: Default::default(), message_id: 9, size: 10 };
        let mut reader = ChunkEnvelopeReader::new();
        reader.push(&header.encoded());
        reader.push(b"short");
        assert!(reader.pop().is_none());
        assert!(reader.needs_more_data());
    }
}
