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
//! two local actors exchanging messages through one `ActorSystem`: five ping-pong
//! round trips, then a `PoisonPill` to each actor to confirm both slots free up.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nodewire_actor::{Actor, ActorContext, ActorId, ActorSystem, Behavior, Envelope};
use nodewire_reactor::{LocalExecutor, Reactor};
use nodewire_macro::Message;

#[derive(Serialize, Deserialize, Message)]
struct Ping(u32);

#[derive(Serialize, Deserialize, Message)]
struct Pong(u32);

struct Ponger {
    replies_sent: Rc<RefCell<Vec<u32>>>,
}

#[async_trait(?Send)]
impl Actor for Ponger {
    async fn receive(&mut self, envelope: Envelope, ctx: &ActorContext) -> nodewire_actor::Result<Behavior> {
        if let nodewire_actor::Blob::Near(value) = &envelope.blob {
            if let Some(ping) = value.downcast_ref::<Ping>() {
                self.replies_sent.borrow_mut().push(ping.0);
                ctx.send(envelope.sender, Pong(ping.0 * 2));
            }
        }
        Ok(Behavior::Same)
    }
}

const ROUND_TRIPS: u32 = 5;

struct Pinger {
    ponger: ActorId,
    received: Rc<RefCell<Vec<u32>>>,
}

#[async_trait(?Send)]
impl Actor for Pinger {
    async fn receive(&mut self, envelope: Envelope, ctx: &ActorContext) -> nodewire_actor::Result<Behavior> {
        if let nodewire_actor::Blob::Near(value) = &envelope.blob {
            if let Some(pong) = value.downcast_ref::<Pong>() {
                self.received.borrow_mut().push(pong.0);
                let round = self.received.borrow().len() as u32;
                if round < ROUND_TRIPS {
                    ctx.send(self.ponger, Ping(round + 1));
                }
            }
        }
        Ok(Behavior::Same)
    }
}

#[test]
fn five_round_trips_then_poison_pill_frees_both_actors() {
    let executor = LocalExecutor::new(Reactor::with_select());
    let system = ActorSystem::new(1, executor.clone());

    let replies_sent = Rc::new(RefCell::new(Vec::new()));
    let received = Rc::new(RefCell::new(Vec::new()));

    let ponger = system.register(Ponger { replies_sent: replies_sent.clone() });
    let pinger = system.register(Pinger { ponger, received: received.clone() });

    system.send(pinger, ponger, Ping(1));

    executor.run_until_idle().expect("no outstanding fds or timers");

    assert_eq!(*replies_sent.borrow(), vec![1, 2, 3, 4, 5]);
    assert_eq!(*received.borrow(), vec![2, 4, 6, 8, 10]);
    assert_eq!(system.alive_count(), 2);

    system.send(ActorId::INVALID, pinger, nodewire_actor::PoisonPill);
    system.send(ActorId::INVALID, ponger, nodewire_actor::PoisonPill);

    executor.run_until_idle().expect("no outstanding fds or timers");

    assert_eq!(system.alive_count(), 0);
}
