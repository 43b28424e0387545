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
//! min-heap of deadlines with cancellation by generation. Cancellation is a
//! stale-generation marker rather than a heap removal — cheaper, and lets
//! `remove_timer` answer "already fired" without rummaging through the heap.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::os::unix::io::RawFd;
use std::task::Waker;
use std::time::Instant;

struct TimerEntry {
    deadline: Instant,
    generation: u64,
    fd: Option<RawFd>,
    waker: Waker,
}

// BinaryHeap is a max-heap; we want the earliest deadline (then lowest generation)
// on top, so reverse the comparison.
impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.generation == other.generation
    }
}
impl Eq for TimerEntry {}
impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

pub struct TimerWheel {
    heap: BinaryHeap<TimerEntry>,
    stale: HashSet<u64>,
    next_generation: u64,
    last_processed_generation: u64,
    last_process_time: Option<Instant>,
}

impl TimerWheel {
    pub fn new() -> Self {
        TimerWheel {
            heap: BinaryHeap::new(),
            stale: HashSet::new(),
            next_generation: 0,
            last_processed_generation: 0,
            last_process_time: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|e| e.deadline)
    }

    /// register a deadline. `fd` associates the timer with an in-flight I/O wait on
    /// that fd, so `remove_timer` can later distinguish "fired" from "cancelled" for
    /// the same logical operation.
    pub fn add_timer(&mut self, deadline: Instant, fd: Option<RawFd>, waker: Waker) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.heap.push(TimerEntry { deadline, generation, fd, waker });
        generation
    }

    /// true if the deadline has already been processed (fired); false if it was
    /// still pending and has now been cancelled.
    pub fn remove_timer(&mut self, generation: u64) -> bool {
        if generation <= self.last_processed_generation && self.last_process_time.is_some() {
            true
        } else {
            self.stale.insert(generation);
            false
        }
    }

    /// pop every entry with `deadline <= now`, returning the wakers to resume.
    /// Cancelled (stale) entries and fd-duplicates within this pass are dropped
    /// without resuming anything — only the first non-cancelled entry per fd per
    /// processing pass is resumed.
    pub fn process(&mut self, now: Instant) -> Vec<Waker> {
        let mut fired = Vec::new();
        let mut seen_fds = HashSet::new();

        while let Some(top) = self.heap.peek() {
            if top.deadline > now {
                break;
            }
            let entry = self.heap.pop().expect("peeked Some above");
            if entry.generation > self.last_processed_generation {
                self.last_processed_generation = entry.generation;
            }
            if self.stale.remove(&entry.generation) {
                continue;
            }
            if let Some(fd) = entry.fd {
                if !seen_fds.insert(fd) {
                    continue;
                }
            }
            fired.push(entry.waker);
        }

        self.last_process_time = Some(now);
        fired
    }
}

impl Default for TimerWheel {
    fn default() -> Self {
        Self::new()
    }
}
