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
use std::collections::HashMap;
use std::os::unix::io::RawFd;
use std::time::Duration;

use mio::unix::SourceFd;
use mio::{Events, Poll, Token};

use super::{Backend, Change, Interest, RawReadyEvent};
use crate::errors::{ReactorError, Result};

fn to_mio(interest: Interest) -> mio::Interest {
    match interest {
        // mio has no EPOLLRDHUP equivalent; fold it into readability. A HUP shows up
        // as a zero-length read at the call site, same as a plain orderly close.
        Interest::Read | Interest::ReadHup => mio::Interest::READABLE,
        Interest::Write => mio::Interest::WRITABLE,
    }
}

/// default [`Backend`]: one `mio::Poll` instance, which is epoll on Linux, kqueue on
/// BSD/macOS, and an IOCP-backed selector on Windows. Interests are tracked per-fd so
/// that adding a write interest to an fd already registered for reads reregisters
/// with the union rather than clobbering it.
pub struct MioBackend {
    poll: Poll,
    events: Events,
    registered: HashMap<RawFd, mio::Interest>,
}

impl MioBackend {
    pub fn new() -> Result<Self> {
        Ok(MioBackend {
            poll: Poll::new().map_err(ReactorError::System)?,
            events: Events::with_capacity(1024),
            registered: HashMap::new(),
        })
    }

    fn token_for(fd: RawFd) -> Token {
        Token(fd as usize)
    }

    fn apply_one(&mut self, change: &Change) -> Result<()> {
        match *change {
            Change::Add(fd, interest) => {
                let want = to_mio(interest);
                let token = Self::token_for(fd);
                if let Some(existing) = self.registered.get(&fd).copied() {
                    let merged = existing.add(want);
                    self.poll
                        .registry()
                        .reregister(&mut SourceFd(&fd), token, merged)
                        .map_err(ReactorError::System)?;
                    self.registered.insert(fd, merged);
                } else {
                    self.poll
                        .registry()
                        .register(&mut SourceFd(&fd), token, want)
                        .map_err(ReactorError::System)?;
                    self.registered.insert(fd, want);
                }
                Ok(())
            }
            Change::RemoveInterest(fd, interest) => {
                let drop_kind = to_mio(interest);
                if let Some(existing) = self.registered.get(&fd).copied() {
                    match remove_interest(existing, drop_kind) {
                        Some(remaining) => {
                            self.poll
                                .registry()
                                .reregister(&mut SourceFd(&fd), Self::token_for(fd), remaining)
                                .map_err(ReactorError::System)?;
                            self.registered.insert(fd, remaining);
                        }
                        None => {
                            let _ = self.poll.registry().deregister(&mut SourceFd(&fd));
                            self.registered.remove(&fd);
                        }
                    }
                }
                Ok(())
            }
            Change::Remove(fd) => {
                if self.registered.remove(&fd).is_some() {
                    let _ = self.poll.registry().deregister(&mut SourceFd(&fd));
                }
                Ok(())
            }
        }
    }
}

/// mio::Interest has no subtraction operator; reconstruct what remains after
/// dropping one kind from a (possibly combined) interest set.
fn remove_interest(existing: mio::Interest, drop_kind: mio::Interest) -> Option<mio::Interest> {
    let keep_read = existing.is_readable() && !drop_kind.is_readable();
    let keep_write = existing.is_writable() && !drop_kind.is_writable();
    match (keep_read, keep_write) {
        (true, true) => Some(mio::Interest::READABLE.add(mio::Interest::WRITABLE)),
        (true, false) => Some(mio::Interest::READABLE),
        (false, true) => Some(mio::Interest::WRITABLE),
        (false, false) => None,
    }
}

impl Backend for MioBackend {
    fn apply_changes(&mut self, changes: &[Change]) -> Result<()> {
        for change in changes {
            self.apply_one(change)?;
        }
        Ok(())
    }

    fn wait(&mut self, timeout: Option<Duration>, out: &mut Vec<RawReadyEvent>) -> Result<()> {
        loop {
            match self.poll.poll(&mut self.events, timeout) {
                Ok(()) => break,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ReactorError::System(e)),
            }
        }
        for ev in self.events.iter() {
            let fd = ev.token().0 as RawFd;
            if ev.is_readable() {
                // mio folds Read and ReadHup into one READABLE bit (see `to_mio`); emit
                // both so whichever one the reactor actually has a waiter under fires.
                out.push(RawReadyEvent { fd, interest: Interest::Read, completion: None });
                out.push(RawReadyEvent { fd, interest: Interest::ReadHup, completion: None });
            }
            if ev.is_writable() {
                out.push(RawReadyEvent { fd, interest: Interest::Write, completion: None });
            }
        }
        Ok(())
    }
}
