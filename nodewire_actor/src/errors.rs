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

use nodewire_reactor::ReactorError;

pub type Result<T> = std::result::Result<T, ActorError>;

/// error taxonomy for the actor runtime. Composes [`ReactorError`] alongside the
/// failure modes unique to message delivery, the registry, and remote nodes.
#[derive(Error, Debug)]
pub enum ActorError {
    #[error("reactor error: {0}")]
    Reactor(#[from] ReactorError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown message id {0}")]
    UnknownMessage(u32),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("mailbox closed")]
    MailboxClosed,

    #[error("actor not registered: {0}")]
    ActorNotFound(String),

    #[error("node not registered: {0}")]
    NodeNotFound(u16),

    #[error("ask timed out after {0:?}")]
    AskTimeout(Duration),

    #[error("operation failed: {0}")]
    OpFailed(String),
}

pub fn op_failed(msg: impl ToString) -> ActorError {
    ActorError::OpFailed(msg.to_string())
}
