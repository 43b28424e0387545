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
//! integration-level check that `ChunkEnvelopeReader` really shares one backing
//! allocation across every envelope extracted from the same push, rather than
//! just producing byte-identical but independently-owned copies.

use nodewire_actor::header::Header;
use nodewire_actor::reader::chunk_reader::ChunkEnvelopeReader;
use nodewire_actor::reader::EnvelopeReader;
use nodewire_actor::Blob;

fn frame(message_id: u32, payload: &[u8]) -> Vec<u8> {
    let header = Header {
        sender: Default::default(),
        recipient: Default::default(),
        message_id,
        size: payload.len() as u32,
    };
    let mut bytes = header.encoded().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

#[test]
fn payloads_extracted_from_one_push_share_their_backing_chunk() {
    let mut bytes = Vec::new();
    bytes.extend(frame(1, b"alpha"));
    bytes.extend(frame(2, b"beta"));

    let mut reader = ChunkEnvelopeReader::new();
    reader.push(&bytes);

    let first = reader.pop().expect("first frame");
    let second = reader.pop().expect("second frame");

    let Blob::Far(first_chunk) = &first.blob else { panic!("expected a Far blob") };
    let Blob::Far(second_chunk) = &second.blob else { panic!("expected a Far blob") };

    assert_eq!(first_chunk.as_slice(), b"alpha");
    assert_eq!(second_chunk.as_slice(), b"beta");
    assert!(first_chunk.shares_allocation_with(second_chunk));
}

#[test]
fn a_fresh_chunk_after_rotation_does_not_share_with_the_previous_one() {
    let mut reader = ChunkEnvelopeReader::with_chunk_size(64);
    reader.push(&frame(1, b"alpha"));
    let first = reader.pop().expect("first frame fully buffered");

    // the reader's `current` buffer was cleared and restarted after that pop
    // (payload_start caught up to current.len()), so a second push starts a new
    // backing allocation entirely.
    reader.push(&frame(2, b"beta"));
    let second = reader.pop().expect("second frame fully buffered");

    let Blob::Far(first_chunk) = &first.blob else { panic!("expected a Far blob") };
    let Blob::Far(second_chunk) = &second.blob else { panic!("expected a Far blob") };
    assert!(!first_chunk.shares_allocation_with(second_chunk));
}
