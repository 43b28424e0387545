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
//! `ActorSystem::ask`/`ask_timeout`: a request/reply round trip through the
//! throwaway one-shot `AskActor`, and a timeout firing when nobody answers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nodewire_actor::{Actor, ActorContext, ActorError, ActorSystem, Behavior, Envelope};
use nodewire_reactor::{LocalExecutor, Reactor};
use nodewire_macro::Message;

#[derive(Serialize, Deserialize, Message)]
struct Add(u32, u32);

#[derive(Serialize, Deserialize, Message)]
struct Sum(u32);

struct Adder;

#[async_trait(?Send)]
impl Actor for Adder {
    async fn receive(&mut self, envelope: Envelope, ctx: &ActorContext) -> nodewire_actor::Result<Behavior> {
        if let nodewire_actor::Blob::Near(value) = &envelope.blob {
            if let Some(add) = value.downcast_ref::<Add>() {
                ctx.send(envelope.sender, Sum(add.0 + add.1));
            }
        }
        Ok(Behavior::Same)
    }
}

struct Silent;

#[async_trait(?Send)]
impl Actor for Silent {
    async fn receive(&mut self, _envelope: Envelope, _ctx: &ActorContext) -> nodewire_actor::Result<Behavior> {
        Ok(Behavior::Same) // never replies
    }
}

#[test]
fn ask_returns_the_actors_reply() {
    let executor = LocalExecutor::new(Reactor::with_select());
    let system = ActorSystem::new(1, executor.clone());
    let adder = system.register(Adder);

    let sum: Sum = executor
        .block_on(async move { system.ask(adder, Add(3, 4)).await })
        .expect("executor should not error")
        .expect("adder should answer");
    assert_eq!(sum.0, 7);
}

#[test]
fn ask_timeout_fires_when_nobody_replies() {
    let executor = LocalExecutor::new(Reactor::with_select());
    let system = ActorSystem::new(1, executor.clone());
    let silent = system.register(Silent);

    let result: nodewire_actor::Result<Sum> = executor
        .block_on(async move {
            system
                .ask_timeout(silent, Add(1, 1), std::time::Duration::from_millis(20))
                .await
        })
        .expect("executor should not error");
    assert!(matches!(result, Err(ActorError::AskTimeout(_))));
}
