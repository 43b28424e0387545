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
//! two `ActorSystem`s, each on its own `LocalExecutor` on its own OS thread (a
//! reactor is strictly single-threaded, so cross-node traffic is the only case
//! where this test suite needs more than one), joined by a loopback TCP
//! connection: node 1 sends a message that only exists on node 2's registry,
//! and node 2 decodes and delivers it to the addressed actor.

use std::net::TcpListener;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nodewire_actor::{Actor, ActorContext, ActorId, ActorSystem, Behavior, Envelope, Message, RemoteNode};
use nodewire_macro::Message;
use nodewire_reactor::resolver::Resolver;
use nodewire_reactor::suspend::sleep;
use nodewire_reactor::{LocalExecutor, Reactor};

#[derive(Serialize, Deserialize, Message)]
struct Greeting(String);

struct Recorder {
    out: mpsc::Sender<String>,
}

#[async_trait(?Send)]
impl Actor for Recorder {
    async fn receive(&mut self, envelope: Envelope, _ctx: &ActorContext) -> nodewire_actor::Result<Behavior> {
        let greeting = match &envelope.blob {
            nodewire_actor::Blob::Far(bytes) => Greeting::decode(bytes)?,
            nodewire_actor::Blob::Near(_) => unreachable!("remote delivery always arrives as Far"),
        };
        let _ = self.out.send(greeting.0);
        Ok(Behavior::Same)
    }
}

#[test]
fn greeting_sent_from_one_node_arrives_on_another() {
    let (addr_tx, addr_rx) = mpsc::channel::<(u16, ActorId)>();
    let (greeting_tx, greeting_rx) = mpsc::channel::<String>();

    let server = std::thread::spawn(move || {
        let executor = LocalExecutor::new(Reactor::with_mio().expect("mio backend available"));
        let system = ActorSystem::new(2, executor.clone());
        system.registry().borrow_mut().register::<Greeting>();
        let recorder = system.register(Recorder { out: greeting_tx });

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let port = listener.local_addr().unwrap().port();
        addr_tx.send((port, recorder)).unwrap();

        let accept_system = system.clone();
        executor.spawn(async move {
            let _ = accept_system.serve_inbound(listener).await;
        });

        executor.block_on(sleep(Duration::from_millis(400))).unwrap();
    });

    let (port, recorder_id) = addr_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("server node should report its listening port and actor id");

    let executor = LocalExecutor::new(Reactor::with_mio().expect("mio backend available"));
    let system = ActorSystem::new(1, executor.clone());
    let resolver = Rc::new(Resolver::new().expect("bind resolver socket"));
    system.add_node(2, RemoteNode::new("127.0.0.1", port, resolver));

    executor
        .block_on(async move {
            sleep(Duration::from_millis(80)).await; // let connect_loop finish dialing node 2
            system.send(ActorId::INVALID, recorder_id, Greeting("hello from node 1".into()));
            sleep(Duration::from_millis(150)).await; // let drain_loop flush the frame
        })
        .unwrap();

    let received = greeting_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("node 2 should have decoded and delivered the greeting");
    assert_eq!(received, "hello from node 1");

    server.join().unwrap();
}
