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
//! task-level conveniences layered on [`crate::executor`]. Thin wrappers around
//! `futures::future` combinators rather than hand-rolled ones — no reason to
//! reimplement `join_all`/`select_all` when the crate is already a dependency.

use std::future::Future;
use std::pin::Pin;

pub use crate::executor::Task;

/// a spawned task whose result the caller does not intend to collect; dropping
/// the handle leaves the task running to completion.
pub type DetachedTask = Task<()>;

/// run every future to completion, in registration order for the output vector
/// (order of completion may differ; this only fixes where each result lands).
pub async fn all<F>(futures: Vec<F>) -> Vec<F::Output>
where
    F: Future,
{
    futures::future::join_all(futures).await
}

/// resolve as soon as any one future completes; the rest are dropped (and, for
/// suspension primitives, unregistered from the reactor via their `Drop` impls).
pub async fn any<F>(futures: Vec<F>) -> (F::Output, usize)
where
    F: Future + Unpin,
{
    let (output, index, _rest) = futures::future::select_all(futures).await;
    (output, index)
}

/// box a future for storage in a homogeneous collection (e.g. a mailbox of
/// in-flight handler futures).
pub fn boxed<F>(future: F) -> Pin<Box<dyn Future<Output = F::Output>>>
where
    F: Future + 'static,
{
    Box::pin(future)
}
