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
//! suspension primitives: the `Future` impls that bridge blocking-looking async
//! code to the reactor's readiness events. Each one follows the same three-phase
//! shape: try the syscall first (readiness may already be there from a previous
//! pass), register with the reactor and return `Pending` if it would block, and
//! unregister on drop so a future that is cancelled mid-await never leaves a
//! stale reactor registration.

use std::future::Future;
use std::io;
use std::net::TcpStream;
use std::os::unix::io::{AsRawFd, RawFd};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use crate::backend::Interest;
use crate::reactor::{self, ReactorHandle};

fn would_block(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
}

/// await readability on `fd`, then call `op` once. Retries internally on
/// `WouldBlock`; any other error (including a peer close, surfaced as `Ok(0)` by
/// the caller's own read logic) is returned as-is.
pub struct ReadReady {
    reactor: ReactorHandle,
    fd: RawFd,
    registered: bool,
}

impl ReadReady {
    pub fn new(fd: RawFd) -> Self {
        ReadReady { reactor: reactor::current(), fd, registered: false }
    }
}

impl Future for ReadReady {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.registered {
            self.registered = false;
            return Poll::Ready(());
        }
        self.registered = true;
        self.reactor.borrow_mut().add_read(self.fd, cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for ReadReady {
    fn drop(&mut self) {
        if self.registered {
            self.reactor.borrow_mut().remove_fd(self.fd);
        }
    }
}

/// await writability on `fd`. Same shape as [`ReadReady`]; split into its own type
/// because callers need to name the interest rather than pass a direction flag.
pub struct WriteReady {
    reactor: ReactorHandle,
    fd: RawFd,
    registered: bool,
}

impl WriteReady {
    pub fn new(fd: RawFd) -> Self {
        WriteReady { reactor: reactor::current(), fd, registered: false }
    }
}

impl Future for WriteReady {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.registered {
            self.registered = false;
            return Poll::Ready(());
        }
        self.registered = true;
        self.reactor.borrow_mut().add_write(self.fd, cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for WriteReady {
    fn drop(&mut self) {
        if self.registered {
            self.reactor.borrow_mut().remove_fd(self.fd);
        }
    }
}

/// await the peer side of `fd` shutting down writes (or the connection otherwise
/// becoming readable-with-nothing-left), without committing to a read.
pub struct ReadHupReady {
    reactor: ReactorHandle,
    fd: RawFd,
    registered: bool,
}

impl ReadHupReady {
    pub fn new(fd: RawFd) -> Self {
        ReadHupReady { reactor: reactor::current(), fd, registered: false }
    }
}

impl Future for ReadHupReady {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.registered {
            self.registered = false;
            return Poll::Ready(());
        }
        self.registered = true;
        self.reactor.borrow_mut().add_rhup(self.fd, cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for ReadHupReady {
    fn drop(&mut self) {
        if self.registered {
            self.reactor.borrow_mut().remove_fd(self.fd);
        }
    }
}

/// read from `stream` once it is ready, retrying on `WouldBlock`. The common case
/// (data already buffered) completes without ever touching the reactor.
pub async fn read(stream: &TcpStream, buf: &mut [u8]) -> io::Result<usize> {
    use std::io::Read;
    loop {
        match (&*stream).read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if would_block(&e) => ReadReady::new(stream.as_raw_fd()).await,
            Err(e) => return Err(e),
        }
    }
}

pub async fn write(stream: &TcpStream, buf: &[u8]) -> io::Result<usize> {
    use std::io::Write;
    loop {
        match (&*stream).write(buf) {
            Ok(n) => return Ok(n),
            Err(e) if would_block(&e) => WriteReady::new(stream.as_raw_fd()).await,
            Err(e) => return Err(e),
        }
    }
}

/// write the full buffer, looping over short writes the way `write_all` does but
/// yielding to the reactor between `WouldBlock`s instead of spinning.
pub async fn write_all(stream: &TcpStream, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        let n = write(stream, buf).await?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
        }
        buf = &buf[n..];
    }
    Ok(())
}

/// connect to `addr`, suspending until the non-blocking connect completes.
pub async fn connect(addr: std::net::SocketAddr) -> io::Result<TcpStream> {
    let domain = socket2::Domain::for_address(addr);
    let socket = socket2::Socket::new(domain, socket2::Type::STREAM, Some(socket2::Protocol::TCP))?;
    socket.set_nonblocking(true)?;
    match socket.connect(&addr.into()) {
        Ok(()) => {}
        Err(e) if e.raw_os_error() == Some(libc::EINPROGRESS) => {}
        Err(e) if would_block(&e) => {}
        Err(e) => return Err(e),
    }
    let fd = socket.as_raw_fd();
    WriteReady::new(fd).await;
    if let Some(err) = socket.take_error()? {
        return Err(err);
    }
    Ok(socket.into())
}

/// accept one connection from `listener`, suspending between `WouldBlock`s.
pub async fn accept(
    listener: &std::net::TcpListener,
) -> io::Result<(TcpStream, std::net::SocketAddr)> {
    loop {
        match listener.accept() {
            Ok(pair) => return Ok(pair),
            Err(e) if would_block(&e) => ReadReady::new(listener.as_raw_fd()).await,
            Err(e) => return Err(e),
        }
    }
}

/// race `op` against `deadline`: whichever resolves first wins, and the loser is
/// dropped (cleaning up its reactor registration through its own `Drop` impl).
/// `None` skips the race entirely, so the op's own suspension points are the only
/// cost. The op either completes or times out, never both.
async fn with_deadline<T>(op: impl Future<Output = io::Result<T>>, deadline: Option<Instant>) -> io::Result<T> {
    match deadline {
        None => op.await,
        Some(deadline) => {
            let op = Box::pin(op);
            let timeout = Box::pin(Sleep::until(deadline));
            match futures::future::select(op, timeout).await {
                futures::future::Either::Left((result, _)) => result,
                futures::future::Either::Right(_) => {
                    Err(io::Error::new(io::ErrorKind::TimedOut, "operation timed out"))
                }
            }
        }
    }
}

/// [`read`], failing with `ErrorKind::TimedOut` if `deadline` passes first.
pub async fn read_deadline(stream: &TcpStream, buf: &mut [u8], deadline: Option<Instant>) -> io::Result<usize> {
    with_deadline(read(stream, buf), deadline).await
}

/// [`write`], failing with `ErrorKind::TimedOut` if `deadline` passes first.
pub async fn write_deadline(stream: &TcpStream, buf: &[u8], deadline: Option<Instant>) -> io::Result<usize> {
    with_deadline(write(stream, buf), deadline).await
}

/// [`write_all`], failing with `ErrorKind::TimedOut` if `deadline` passes first.
pub async fn write_all_deadline(stream: &TcpStream, buf: &[u8], deadline: Option<Instant>) -> io::Result<()> {
    with_deadline(write_all(stream, buf), deadline).await
}

/// [`connect`], failing with `ErrorKind::TimedOut` if `deadline` passes first.
pub async fn connect_deadline(addr: std::net::SocketAddr, deadline: Option<Instant>) -> io::Result<TcpStream> {
    with_deadline(connect(addr), deadline).await
}

/// [`accept`], failing with `ErrorKind::TimedOut` if `deadline` passes first.
pub async fn accept_deadline(
    listener: &std::net::TcpListener,
    deadline: Option<Instant>,
) -> io::Result<(TcpStream, std::net::SocketAddr)> {
    with_deadline(accept(listener), deadline).await
}

/// suspend until `deadline`. Used directly by `sleep()`/`sleep_for()` and as the
/// building block for read/write/connect timeouts elsewhere in the crate.
pub struct Sleep {
    reactor: ReactorHandle,
    deadline: Instant,
    timer_id: Option<u64>,
}

impl Sleep {
    pub fn until(deadline: Instant) -> Self {
        Sleep { reactor: reactor::current(), deadline, timer_id: None }
    }

    pub fn for_duration(d: Duration) -> Self {
        Self::until(Instant::now() + d)
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.timer_id.is_some() {
            return Poll::Ready(());
        }
        if Instant::now() >= self.deadline {
            return Poll::Ready(());
        }
        let id = self
            .reactor
            .borrow_mut()
            .add_timer(None, self.deadline, cx.waker().clone());
        self.timer_id = Some(id);
        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        if let Some(id) = self.timer_id.take() {
            self.reactor.borrow_mut().remove_timer(id);
        }
    }
}

pub fn sleep(duration: Duration) -> Sleep {
    Sleep::for_duration(duration)
}

/// yield once to the executor: resolves on the reactor's next processing pass
/// rather than blocking on any fd or a real deadline. Implemented as a zero-length
/// sleep so it shares the timer wheel's fairness instead of a separate code path.
pub fn yield_now() -> Sleep {
    Sleep::until(Instant::now())
}
