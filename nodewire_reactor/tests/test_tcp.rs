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
//! round-trips a small message over a loopback TCP connection through the
//! suspension primitives (`connect`/`accept`/`write_all`/`read`), exercising the
//! reactor's readiness path end to end rather than just the timer/arena unit tests.

use std::net::TcpListener;

use nodewire_reactor::suspend::{accept, connect, read, write_all};
use nodewire_reactor::{LocalExecutor, Reactor};

#[test]
fn echoes_a_message_over_loopback() {
    let exec = LocalExecutor::new(Reactor::with_mio().expect("mio backend available"));

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    exec.spawn(async move {
        let (stream, _) = accept(&listener).await.expect("accept");
        let mut buf = [0u8; 64];
        let n = read(&stream, &mut buf).await.expect("server read");
        write_all(&stream, &buf[..n]).await.expect("server echo");
    });

    let reply = exec
        .block_on(async move {
            let stream = connect(addr).await.expect("connect");
            write_all(&stream, b"ping").await.expect("client write");
            let mut buf = [0u8; 64];
            let n = read(&stream, &mut buf).await.expect("client read");
            buf[..n].to_vec()
        })
        .unwrap();

    assert_eq!(reply, b"ping");
}

#[test]
fn remove_fd_is_idempotent_after_the_connection_closes() {
    let exec = LocalExecutor::new(Reactor::with_mio().expect("mio backend available"));
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    exec.spawn(async move {
        let (_stream, _) = accept(&listener).await.expect("accept");
    });

    exec.block_on(async move {
        let stream = connect(addr).await.expect("connect");
        drop(stream); // ReadReady/WriteReady were never constructed here, nothing to unregister
    })
    .unwrap();

    // calling remove_fd twice directly on a fd nothing is registered for must not panic.
    let reactor = exec.reactor();
    reactor.borrow_mut().remove_fd(12345);
    reactor.borrow_mut().remove_fd(12345);
}
