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
//! a single-threaded, cooperative reactor over a pluggable OS backend, built on
//! native `std::future::Future`s: [`executor::LocalExecutor`] drains the ready
//! queue, and the types in [`suspend`] are the awaiters that bridge ordinary
//! async code to reactor readiness events.

pub mod arena;
pub mod backend;
pub mod errors;
pub mod executor;
pub mod reactor;
pub mod resolver;
pub mod suspend;
pub mod task;

pub use arena::{Arena, ArenaBox};
pub use backend::{Backend, Change, Interest, RawReadyEvent};
pub use errors::{ReactorError, Result};
pub use executor::LocalExecutor;
pub use reactor::Reactor;
pub use resolver::{ResolveError, Resolver};

pub mod prelude {
    pub use crate::executor::{LocalExecutor, Task};
    pub use crate::reactor::Reactor;
    pub use crate::suspend::{accept, connect, read, sleep, write, write_all, yield_now};
    pub use crate::task::{all, any, DetachedTask};
    pub use crate::{ReactorError, Result};
}
