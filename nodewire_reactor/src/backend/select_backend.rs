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
use std::collections::HashSet;
use std::mem::MaybeUninit;
use std::os::unix::io::RawFd;
use std::time::Duration;

use super::{Backend, Change, Interest, RawReadyEvent};
use crate::errors::{ReactorError, Result};

/// `select(2)`-based portable fallback backend. `libc::fd_set` has no safe
/// constructor, so the bit twiddling below reimplements `FD_SET`/`FD_ISSET`/
/// `FD_ZERO` directly on the raw `fds_bits` array — the same thing the C macros
/// do, just spelled out since Rust has no macro access to them.
pub struct SelectBackend {
    reads: HashSet<RawFd>,
    writes: HashSet<RawFd>,
}

const BITS_PER_SLOT: usize = std::mem::size_of::<libc::c_long>() * 8;

fn fd_zero(set: &mut libc::fd_set) {
    unsafe { std::ptr::write_bytes(set, 0, 1) };
}

fn fd_set(fd: RawFd, set: &mut libc::fd_set) {
    let fd = fd as usize;
    let slot = fd / BITS_PER_SLOT;
    let bit = fd % BITS_PER_SLOT;
    set.fds_bits[slot] |= 1 << bit;
}

fn fd_isset(fd: RawFd, set: &libc::fd_set) -> bool {
    let fd = fd as usize;
    let slot = fd / BITS_PER_SLOT;
    let bit = fd % BITS_PER_SLOT;
    (set.fds_bits[slot] & (1 << bit)) != 0
}

impl SelectBackend {
    pub fn new() -> Self {
        SelectBackend { reads: HashSet::new(), writes: HashSet::new() }
    }
}

impl Backend for SelectBackend {
    fn apply_changes(&mut self, changes: &[Change]) -> Result<()> {
        for change in changes {
            match *change {
                Change::Add(fd, Interest::Read) | Change::Add(fd, Interest::ReadHup) => {
                    self.reads.insert(fd);
                }
                Change::Add(fd, Interest::Write) => {
                    self.writes.insert(fd);
                }
                Change::RemoveInterest(fd, Interest::Read)
                | Change::RemoveInterest(fd, Interest::ReadHup) => {
                    self.reads.remove(&fd);
                }
                Change::RemoveInterest(fd, Interest::Write) => {
                    self.writes.remove(&fd);
                }
                Change::Remove(fd) => {
                    self.reads.remove(&fd);
                    self.writes.remove(&fd);
                }
            }
        }
        Ok(())
    }

    fn wait(&mut self, timeout: Option<Duration>, out: &mut Vec<RawReadyEvent>) -> Result<()> {
        if self.reads.is_empty() && self.writes.is_empty() {
            if let Some(d) = timeout {
                std::thread::sleep(d);
            }
            return Ok(());
        }

        let mut read_set = unsafe { MaybeUninit::<libc::fd_set>::zeroed().assume_init() };
        let mut write_set = unsafe { MaybeUninit::<libc::fd_set>::zeroed().assume_init() };
        fd_zero(&mut read_set);
        fd_zero(&mut write_set);

        let mut max_fd = 0;
        for &fd in self.reads.iter() {
            fd_set(fd, &mut read_set);
            max_fd = max_fd.max(fd);
        }
        for &fd in self.writes.iter() {
            fd_set(fd, &mut write_set);
            max_fd = max_fd.max(fd);
        }

        let mut tv = timeout.map(|d| libc::timeval {
            tv_sec: d.as_secs() as libc::time_t,
            tv_usec: d.subsec_micros() as libc::suseconds_t,
        });

        let rc = loop {
            let tv_ptr = tv
                .as_mut()
                .map(|t| t as *mut libc::timeval)
                .unwrap_or(std::ptr::null_mut());
            let rc = unsafe {
                libc::select(
                    max_fd + 1,
                    &mut read_set,
                    &mut write_set,
                    std::ptr::null_mut(),
                    tv_ptr,
                )
            };
            if rc < 0 {
                let err = std::io::Error::last_os_error();
                if err.kind() == std::io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(ReactorError::System(err));
            }
            break rc;
        };

        if rc == 0 {
            return Ok(());
        }

        for &fd in self.reads.iter() {
            if fd_isset(fd, &read_set) {
                out.push(RawReadyEvent { fd, interest: Interest::Read, completion: None });
            }
        }
        for &fd in self.writes.iter() {
            if fd_isset(fd, &write_set) {
                out.push(RawReadyEvent { fd, interest: Interest::Write, completion: None });
            }
        }
        Ok(())
    }
}

impl Default for SelectBackend {
    fn default() -> Self {
        Self::new()
    }
}
