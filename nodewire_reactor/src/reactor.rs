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
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::os::unix::io::RawFd;
use std::rc::Rc;
use std::task::Waker;
use std::time::{Duration, Instant};

use crate::backend::{Backend, Change, Interest, RawReadyEvent};
use crate::backend::mio_backend::MioBackend;
use crate::backend::select_backend::SelectBackend;
use crate::errors::Result;
use crate::timer::TimerWheel;

/// upper bound on how long a single `poll()` blocks when no timer is due sooner;
/// keeps the loop responsive to out-of-band wakeups (e.g. a `schedule()` call from
/// a different part of the same tick).
const DEFAULT_MAX_IDLE: Duration = Duration::from_millis(100);

/// the reactor. One per loop.
pub struct Reactor {
    backend: Box<dyn Backend>,
    timers: TimerWheel,
    pending_changes: Vec<Change>,
    interests: HashMap<(RawFd, Interest), Waker>,
    completions: HashMap<(RawFd, Interest), io::Result<usize>>,
    ready_queue: VecDeque<Waker>,
    max_idle: Duration,
}

impl Reactor {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Reactor {
            backend,
            timers: TimerWheel::new(),
            pending_changes: Vec::new(),
            interests: HashMap::new(),
            completions: HashMap::new(),
            ready_queue: VecDeque::new(),
            max_idle: DEFAULT_MAX_IDLE,
        }
    }

    pub fn with_mio() -> Result<Self> {
        Ok(Self::new(Box::new(MioBackend::new()?)))
    }

    /// the portable `select(2)` fallback; used in tests and on platforms
    /// without a `mio` backend.
    pub fn with_select() -> Self {
        Self::new(Box::new(SelectBackend::new()))
    }

    pub fn set_max_idle(&mut self, d: Duration) {
        self.max_idle = d;
    }

    fn register(&mut self, fd: RawFd, interest: Interest, waker: Waker) {
        self.interests.insert((fd, interest), waker);
        self.pending_changes.push(Change::Add(fd, interest));
    }

    pub fn add_read(&mut self, fd: RawFd, waker: Waker) {
        self.register(fd, Interest::Read, waker);
    }

    pub fn add_write(&mut self, fd: RawFd, waker: Waker) {
        self.register(fd, Interest::Write, waker);
    }

    pub fn add_rhup(&mut self, fd: RawFd, waker: Waker) {
        self.register(fd, Interest::ReadHup, waker);
    }

    /// drop all interest in `fd`. Idempotent: calling this repeatedly after the
    /// first has no further effect.
    pub fn remove_fd(&mut self, fd: RawFd) {
        let had_any = self.interests.remove(&(fd, Interest::Read)).is_some()
            | self.interests.remove(&(fd, Interest::Write)).is_some()
            | self.interests.remove(&(fd, Interest::ReadHup)).is_some();
        self.completions.remove(&(fd, Interest::Read));
        self.completions.remove(&(fd, Interest::Write));
        if had_any {
            self.pending_changes.push(Change::Remove(fd));
        }
    }

    /// register a deadline, optionally tied to an in-flight fd wait.
    pub fn add_timer(&mut self, fd: Option<RawFd>, deadline: Instant, waker: Waker) -> u64 {
        self.timers.add_timer(deadline, fd, waker)
    }

    /// true if the deadline already fired.
    pub fn remove_timer(&mut self, id: u64) -> bool {
        self.timers.remove_timer(id)
    }

    pub fn take_completion(&mut self, fd: RawFd, interest: Interest) -> Option<io::Result<usize>> {
        self.completions.remove(&(fd, interest))
    }

    /// exactly one OS wait: apply pending changes, wait up to
    /// `min(next_deadline, max_idle)`, collect ready events, then process fired
    /// timers.
    pub fn poll(&mut self) -> Result<()> {
        if !self.pending_changes.is_empty() {
            let changes = std::mem::take(&mut self.pending_changes);
            self.backend.apply_changes(&changes)?;
        }

        let now = Instant::now();
        let timeout = match self.timers.next_deadline() {
            Some(deadline) if deadline > now => Some((deadline - now).min(self.max_idle)),
            Some(_) => Some(Duration::ZERO),
            None => Some(self.max_idle),
        };

        let mut raw_events = Vec::new();
        self.backend.wait(timeout, &mut raw_events)?;

        for ev in raw_events {
            let RawReadyEvent { fd, interest, completion } = ev;
            if let Some(waker) = self.interests.remove(&(fd, interest)) {
                if let Some(result) = completion {
                    self.completions.insert((fd, interest), result);
                }
                self.ready_queue.push_back(waker);
                // one-shot readiness: stop watching this interest until the awaiter
                // re-registers (see backend::Change::RemoveInterest docs).
                self.pending_changes.push(Change::RemoveInterest(fd, interest));
            }
        }

        let now = Instant::now();
        for waker in self.timers.process(now) {
            self.ready_queue.push_back(waker);
        }

        Ok(())
    }

    /// drain ready-events, resuming each handle at most once.
    pub fn wakeup_ready(&mut self) {
        while let Some(waker) = self.ready_queue.pop_front() {
            waker.wake();
        }
    }

    pub fn has_pending_work(&self) -> bool {
        !self.interests.is_empty() || !self.timers.is_empty()
    }
}

pub type ReactorHandle = Rc<RefCell<Reactor>>;

thread_local! {
    static CURRENT: RefCell<Option<ReactorHandle>> = RefCell::new(None);
}

/// install the reactor this thread's suspension primitives should use. Called once
/// by [`crate::executor::LocalExecutor::new`].
pub fn set_current(handle: ReactorHandle) {
    CURRENT.with(|cell| *cell.borrow_mut() = Some(handle));
}

pub fn current() -> ReactorHandle {
    CURRENT.with(|cell| {
        cell.borrow()
            .clone()
            .expect("no reactor installed on this thread; run inside LocalExecutor::block_on")
    })
}
