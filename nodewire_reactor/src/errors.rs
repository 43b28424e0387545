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
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReactorError>;

/// error taxonomy for the reactor and its suspension primitives. `ActorError` in
/// the actor crate composes this via `#[from]`.
#[derive(Error, Debug)]
pub enum ReactorError {
    #[error("system error: {0}")]
    System(#[from] std::io::Error),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("peer closed")]
    Closed,
}
