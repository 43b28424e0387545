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
use std::collections::VecDeque;

use super::EnvelopeReader;
use crate::blob::Blob;
use crate::envelope::Envelope;
use crate::header::{Header, HEADER_LEN};

/// straightforward reader: buffer everything in a `VecDeque<u8>`, parse a
/// `Header` once enough bytes are in, then wait for the payload and copy it out.
/// No chunk sharing, so every `pop()` allocates its own payload buffer.
pub struct DequeEnvelopeReader {
    buffer: VecDeque<u8>,
    pending_header: Option<Header>,
}

impl DequeEnvelopeReader {
    pub fn new() -> Self {
        DequeEnvelopeReader { buffer: VecDeque::new(), pending_header: None }
    }

    fn try_parse_header(&mut self) {
        if self.pending_header.is_some() || self.buffer.len() < HEADER_LEN {
            return;
        }
        let bytes: Vec<u8> = self.buffer.iter().take(HEADER_LEN).copied().collect();
        if let Some(header) = Header::decode(&bytes) {
            self.buffer.drain(..HEADER_LEN);
            self.pending_header = Some(header);
        }
    }
}

impl Default for DequeEnvelopeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeReader for DequeEnvelopeReader {
    fn push(&mut self, data: &[u8]) {
        self.buffer.extend(data.iter().copied());
        self.try_parse_header();
    }

    fn pop(&mut self) -> Option<Envelope> {
        self.try_parse_header();
        let header = self.pending_header?;
        let size = header.size as usize;
        if self.buffer.len() < size {
            return None;
        }
        let payload: Vec<u8> = self.buffer.drain(..size).collect();
        self.pending_header = None;
        self.try_parse_header();

        let blob = if header.is_handshake() || size == 0 {
            Blob::far(Vec::new())
        } else {
            Blob::far(payload)
        };
        Some(Envelope::new(header.sender, header.recipient, header.message_id, blob))
    }

    fn needs_more_data(&self) -> bool {
        match self.pending_header {
            None => self.buffer.len() < HEADER_LEN,
            Some(header) => self.buffer.len() < header.size as usize,
        }
    }

    fn len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_frame_pushed_whole() {
        let header = Header { sender: Default::default(), recipient: Default::default(), message_id: 42, size: 3 };
        let mut bytes = header.encoded().to_vec();
        bytes.extend_from_slice(b"abc");

        let mut reader = DequeEnvelopeReader::new();
        reader.push(&bytes);
        let envelope = reader.pop().expect("frame should be complete");
        assert_eq!(envelope.message_id, 42);
        assert_eq!(&*envelope.blob_as_far(), b"abc");
    }

    #[test]
    fn parses_frame_split_across_several_pushes() {
        let header = Header { sender: Default::default(), recipient: Default::default(), message_id: 7, size: 5 };
        let mut bytes = header.encoded().to_vec();
        bytes.extend_from_slice(b"hello");

        let mut reader = DequeEnvelopeReader::new();
        for chunk in bytes.chunks(3) {
            reader.push(chunk);
            if reader.needs_more_data() {
                assert!(reader.pop().is_none());
            }
        }
        let envelope = reader.pop().expect("frame should now be complete");
        assert_eq!(&*envelope.blob_as_far(), b"hello");
    }
}
