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
//! Backend trait: the one seam the reactor crosses into an OS-specific wait call.
//! Two implementations are provided:
//!
//! - [`mio_backend::MioBackend`] — the default. Delegates to `mio`, which itself
//!   picks epoll (Linux, with edge-triggered readiness), kqueue (BSD/macOS) or an
//!   IOCP-backed selector (Windows) per target, so one implementation here covers
//!   every OS variant without hand-rolled unsafe epoll/kqueue/IOCP glue.
//! - [`select_backend::SelectBackend`] — a `libc::select`-based fallback; used in
//!   tests and as a portable baseline.
//!
//! See DESIGN.md for the tradeoffs behind collapsing everything into these two.

pub mod mio_backend;
pub mod select_backend;

use std::os::unix::io::RawFd;
use std::task::Waker;
use std::time::Duration;

use crate::errors::Result;

/// interest kinds a caller can register for an fd. `ReadHup` corresponds to the
/// source's `EPOLLRDHUP`-style "peer shutdown writing" readiness; backends that
/// cannot distinguish it from plain readability fold it into `Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interest {
    Read,
    Write,
    ReadHup,
}

/// an event produced by a backend wait call: which fd became ready for which
/// interest. For completion-style backends this also carries the completion
/// result so the awaiter can retrieve it without re-issuing a syscall.
#[derive(Debug)]
pub struct RawReadyEvent {
    pub fd: RawFd,
    pub interest: Interest,
    pub completion: Option<std::io::Result<usize>>,
}

/// a pending registration change, accumulated by the reactor and applied to the
/// backend in one batch at the start of each `poll()`.
#[derive(Debug, Clone)]
pub enum Change {
    Add(RawFd, Interest),
    /// drop one interest kind after it fired and was consumed, without touching the
    /// fd's other registered interests (mirrors mio's one-shot-readiness idiom: a
    /// fired interest stays quiet until the caller explicitly re-adds it).
    RemoveInterest(RawFd, Interest),
    /// drop all interest in the fd.
    Remove(RawFd),
}

pub trait Backend {
    /// apply a batch of pending registration changes.
    fn apply_changes(&mut self, changes: &[Change]) -> Result<()>;

    /// block for up to `timeout` (None = wait indefinitely) for readiness, appending
    /// any events observed to `out`. `EINTR` must be retried internally and must
    /// never surface as an error.
    fn wait(&mut self, timeout: Option<Duration>, out: &mut Vec<RawReadyEvent>) -> Result<()>;
}
