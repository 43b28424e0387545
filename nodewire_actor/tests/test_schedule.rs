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
//! `ActorSystem::schedule`: deliver a message at a future deadline, and confirm
//! `ScheduleHandle::cancel` actually prevents delivery.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nodewire_actor::{Actor, ActorContext, ActorId, ActorSystem, Behavior, Envelope};
use nodewire_reactor::{LocalExecutor, Reactor};
use nodewire_macro::Message;

#[derive(Serialize, Deserialize, Message)]
struct Tick;

struct Counter {
    ticks: Rc<RefCell<u32>>,
}

#[async_trait(?Send)]
impl Actor for Counter {
    async fn receive(&mut self, _envelope: Envelope, _ctx: &ActorContext) -> nodewire_actor::Result<Behavior> {
        *self.ticks.borrow_mut() += 1;
        Ok(Behavior::Same)
    }
}

fn drive_until(executor: &Rc<LocalExecutor>, deadline: Instant) {
    while Instant::now() < deadline {
        executor.run_until_idle().unwrap();
    }
}

#[test]
fn scheduled_message_is_delivered_after_its_deadline() {
    let executor = LocalExecutor::new(Reactor::with_select());
    let system = ActorSystem::new(1, executor.clone());
    let ticks = Rc::new(RefCell::new(0));
    let counter = system.register(Counter { ticks: ticks.clone() });

    system.schedule(ActorId::INVALID, counter, Tick, Instant::now() + Duration::from_millis(20));

    drive_until(&executor, Instant::now() + Duration::from_millis(100));
    assert_eq!(*ticks.borrow(), 1);
}

#[test]
fn cancelling_a_schedule_prevents_delivery() {
    let executor = LocalExecutor::new(Reactor::with_select());
    let system = ActorSystem::new(1, executor.clone());
    let ticks = Rc::new(RefCell::new(0));
    let counter = system.register(Counter { ticks: ticks.clone() });

    let handle = system.schedule(ActorId::INVALID, counter, Tick, Instant::now() + Duration::from_millis(20));
    handle.cancel();

    drive_until(&executor, Instant::now() + Duration::from_millis(100));
    assert_eq!(*ticks.borrow(), 0);
}
