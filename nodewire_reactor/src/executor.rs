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
//! single-threaded, non-work-stealing task executor driven by [`Reactor::poll`].
//! The loop body is "run ready tasks, then block in the reactor until something
//! else is ready", repeated until the root future completes.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

use crate::errors::Result;
use crate::reactor::{self, Reactor, ReactorHandle};

pub type LocalFuture = Pin<Box<dyn Future<Output = ()>>>;

struct TaskInner {
    id: u64,
    future: RefCell<Option<LocalFuture>>,
    /// true while a wake is already sitting in `ready_tx`; collapses redundant
    /// wakeups from the same tick into a single re-poll, so a task that
    /// re-registers its own fd without having suspended again is never
    /// double-scheduled.
    scheduled: AtomicBool,
    ready_tx: flume::Sender<u64>,
}

struct TaskWaker(Arc<TaskInner>);

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }
    fn wake_by_ref(self: &Arc<Self>) {
        if !self.0.scheduled.swap(true, Ordering::AcqRel) {
            let _ = self.0.ready_tx.send(self.0.id);
        }
    }
}

/// a spawned unit of work. Dropping it does not cancel the underlying task; use
/// [`Task::cancel`] for that.
pub struct Task<T> {
    id: u64,
    result: Rc<RefCell<Option<T>>>,
}

impl<T> Task<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// `Some` once the task's future has resolved.
    pub fn take_result(&self) -> Option<T> {
        self.result.borrow_mut().take()
    }
}

pub struct LocalExecutor {
    reactor: ReactorHandle,
    tasks: RefCell<std::collections::HashMap<u64, Arc<TaskInner>>>,
    next_id: AtomicU64,
    ready_tx: flume::Sender<u64>,
    ready_rx: flume::Receiver<u64>,
}

impl LocalExecutor {
    pub fn new(reactor: Reactor) -> Rc<Self> {
        let (ready_tx, ready_rx) = flume::unbounded();
        let handle: ReactorHandle = Rc::new(RefCell::new(reactor));
        reactor::set_current(handle.clone());
        Rc::new(LocalExecutor {
            reactor: handle,
            tasks: RefCell::new(std::collections::HashMap::new()),
            next_id: AtomicU64::new(1),
            ready_tx,
            ready_rx,
        })
    }

    pub fn reactor(&self) -> ReactorHandle {
        self.reactor.clone()
    }

    /// schedule `future` to run on this executor's next drain pass.
    pub fn spawn<F>(self: &Rc<Self>, future: F) -> Task<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let result: Rc<RefCell<Option<F::Output>>> = Rc::new(RefCell::new(None));
        let result_slot = result.clone();

        let wrapped: LocalFuture = Box::pin(async move {
            let value = future.await;
            *result_slot.borrow_mut() = Some(value);
        });

        let inner = Arc::new(TaskInner {
            id,
            future: RefCell::new(Some(wrapped)),
            scheduled: AtomicBool::new(true),
            ready_tx: self.ready_tx.clone(),
        });
        self.tasks.borrow_mut().insert(id, inner);
        let _ = self.ready_tx.send(id);

        Task { id, result }
    }

    pub fn cancel(&self, id: u64) -> bool {
        self.tasks.borrow_mut().remove(&id).is_some()
    }

    fn poll_one(&self, inner: &Arc<TaskInner>) {
        let mut slot = inner.future.borrow_mut();
        let Some(mut fut) = slot.take() else { return };
        inner.scheduled.store(false, Ordering::Release);

        let waker: Waker = Arc::new(TaskWaker(inner.clone())).into();
        let mut cx = Context::from_waker(&waker);
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(()) => {
                drop(slot);
                self.tasks.borrow_mut().remove(&inner.id);
            }
            Poll::Pending => {
                *slot = Some(fut);
            }
        }
    }

    /// drain every currently-ready task, then make exactly one `Reactor::poll`
    /// call, then drain whatever that woke. Returns once there is no more
    /// immediately-ready work and the reactor has no pending interests or timers.
    pub fn run_until_idle(&self) -> Result<()> {
        loop {
            while let Ok(id) = self.ready_rx.try_recv() {
                if let Some(inner) = self.tasks.borrow().get(&id).cloned() {
                    self.poll_one(&inner);
                }
            }

            let has_work = self.reactor.borrow().has_pending_work();
            if !has_work && self.ready_rx.is_empty() {
                return Ok(());
            }

            self.reactor.borrow_mut().poll()?;
            self.reactor.borrow_mut().wakeup_ready();

            if self.ready_rx.is_empty() && !self.reactor.borrow().has_pending_work() {
                return Ok(());
            }
        }
    }

    /// run the executor until `root` resolves, returning its output. Intended for
    /// tests and `main` entry points. Any reactor-poll error (other than the
    /// `EINTR` the reactor already retries internally) is propagated rather than
    /// panicking the process.
    pub fn block_on<F>(self: &Rc<Self>, root: F) -> Result<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let task = self.spawn(root);
        loop {
            if let Some(value) = task.take_result() {
                return Ok(value);
            }
            while let Ok(id) = self.ready_rx.try_recv() {
                if let Some(inner) = self.tasks.borrow().get(&id).cloned() {
                    self.poll_one(&inner);
                }
            }
            if let Some(value) = task.take_result() {
                return Ok(value);
            }
            self.reactor.borrow_mut().poll()?;
            self.reactor.borrow_mut().wakeup_ready();
        }
    }
}

/// convenience used by tests: build a default (mio-backed) executor.
pub fn new_default_executor() -> Result<Rc<LocalExecutor>> {
    Ok(LocalExecutor::new(Reactor::with_mio()?))
}
