// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Error types returned by every fallible world operation
//!
//! Operations validate their inputs up front and return on the first
//! violated precondition, so a failed call never leaves a half-applied
//! structural change behind.

use thiserror::Error;

/// Errors produced by the runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An allocation needed to grow a table, pool or set could not be made
    #[error("out of memory")]
    OutOfMemory,

    /// Unknown entity/component/system id, out-of-range index, or mismatched payload
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The call is not allowed in the world's current state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A limited-capacity component pool has no free slot left
    #[error("component '{component}' is full (capacity {capacity})")]
    FullComponent {
        /// Name of the exhausted component
        component: String,
        /// Fixed slot capacity of its pool
        capacity: u32,
    },

    /// A system, manager or derive callback reported a failure
    #[error("callback failed: {0}")]
    Callback(String),
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, Error>;
