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
//! `suspend::sleep`/`Sleep::until` driven through a real `LocalExecutor`, and a
//! cancellation check (dropping a `Sleep` before it fires must deregister its timer).

use std::future::Future;
use std::rc::Rc;
use std::time::{Duration, Instant};

use nodewire_reactor::suspend::{sleep, yield_now, Sleep};
use nodewire_reactor::{LocalExecutor, Reactor};

fn executor() -> Rc<LocalExecutor> {
    LocalExecutor::new(Reactor::with_select())
}

#[test]
fn sleep_blocks_until_roughly_its_duration() {
    let exec = executor();
    let start = Instant::now();
    exec.block_on(sleep(Duration::from_millis(30))).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn yield_now_resolves_without_a_real_deadline() {
    let exec = executor();
    let mut ticks = 0;
    exec.block_on(async {
        for _ in 0..5 {
            yield_now().await;
            ticks += 1;
        }
    })
    .unwrap();
    assert_eq!(ticks, 5);
}

#[test]
fn dropping_a_pending_sleep_deregisters_its_timer() {
    let exec = executor();
    exec.block_on(async {
        let mut fut = Box::pin(Sleep::until(Instant::now() + Duration::from_secs(30)));
        // poll once to register the timer, then drop before it can fire.
        futures::future::poll_fn(|cx| {
            let _ = fut.as_mut().poll(cx);
            std::task::Poll::Ready(())
        })
        .await;
        drop(fut);
    })
    .unwrap();
    // no pending timer should be left behind for run_until_idle to wait out.
    exec.run_until_idle().expect("no leftover timer");
}
