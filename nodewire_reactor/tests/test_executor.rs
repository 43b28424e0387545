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
//! executor-level integration tests: several tasks driven to completion on one
//! `LocalExecutor`, and a `block_on` root future that itself awaits a spawned child.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nodewire_reactor::{LocalExecutor, Reactor};

fn executor() -> Rc<LocalExecutor> {
    LocalExecutor::new(Reactor::with_select())
}

#[test]
fn run_until_idle_drains_every_spawned_task() {
    let exec = executor();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..8 {
        let counter = counter.clone();
        exec.spawn(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    exec.run_until_idle().expect("no pending fds or timers, should return promptly");
    assert_eq!(counter.load(Ordering::SeqCst), 8);
}

#[test]
fn task_result_is_available_after_completion() {
    let exec = executor();
    let task = exec.spawn(async { 6 * 7 });
    exec.run_until_idle().unwrap();
    assert_eq!(task.take_result(), Some(42));
    // a second take is empty: the result is consumed, not cached.
    assert_eq!(task.take_result(), None);
}

#[test]
fn block_on_awaits_a_nested_spawn() {
    let exec = executor();
    let exec_for_root = exec.clone();
    let value = exec
        .block_on(async move {
            let child = exec_for_root.spawn(async { "child done" });
            loop {
                if let Some(v) = child.take_result() {
                    break v;
                }
                nodewire_reactor::suspend::yield_now().await;
            }
        })
        .unwrap();
    assert_eq!(value, "child done");
}

#[test]
fn cancel_removes_a_not_yet_polled_task() {
    let exec = executor();
    let task = exec.spawn(async { unreachable!("cancelled before its first poll") });
    assert!(exec.cancel(task.id()));
    // draining now should not run the cancelled future.
    exec.run_until_idle().unwrap();
}
