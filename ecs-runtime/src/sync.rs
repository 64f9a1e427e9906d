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
//! Structural lock strategies
//!
//! The world guards its structural state (row table, lifecycle staging sets,
//! free ids, component pools) with a raw mutex chosen by type parameter:
//!
//! - [`SharedLock`]: `parking_lot`'s raw mutex. The world is `Sync` and can be
//!   driven from several threads at once.
//! - [`LocalLock`]: a single flag for single-threaded embedding. The world is
//!   `!Sync`, so the flag never sees contention; locking it twice from the same
//!   thread is a bug and panics instead of deadlocking.

use parking_lot::lock_api::{GuardNoSend, RawMutex};
use std::cell::Cell;

/// Thread-safe structural lock (the default)
pub type SharedLock = parking_lot::RawMutex;

/// Mutex over world state parameterised by the lock strategy
pub(crate) type StructuralMutex<R, T> = parking_lot::lock_api::Mutex<R, T>;

/// Guard returned by [`StructuralMutex::lock`]
pub(crate) type StructuralGuard<'a, R, T> = parking_lot::lock_api::MutexGuard<'a, R, T>;

/// Flag lock for worlds that never leave one thread
pub struct LocalLock {
    held: Cell<bool>,
}

unsafe impl RawMutex for LocalLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: LocalLock = LocalLock {
        held: Cell::new(false),
    };

    type GuardMarker = GuardNoSend;

    fn lock(&self) {
        assert!(
            !self.held.replace(true),
            "structural lock re-entered; world calls must not be nested inside a locked section"
        );
    }

    fn try_lock(&self) -> bool {
        !self.held.replace(true)
    }

    unsafe fn unlock(&self) {
        self.held.set(false);
    }

    fn is_locked(&self) -> bool {
        self.held.get()
    }
}
