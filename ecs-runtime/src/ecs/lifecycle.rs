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
//! Entity lifecycle staging
//!
//! Signals record intent; they take effect when the scheduler drains the
//! queue at the start of the next tick. An id moves between the four staging
//! sets as follows:
//!
//! | signal   | added  | enabled | disabled | deleted |
//! |----------|--------|---------|----------|---------|
//! | Added    | insert | insert  | remove   | remove  |
//! | Enabled  |        | insert  | remove   | remove  |
//! | Disabled |        | remove  | insert   | remove  |
//! | Deleted  | remove | remove  | insert   | insert  |
//!
//! Repeating a signal before a drain changes nothing.

use crate::ecs::Entity;
use crate::sets::SparseSet;

/// Lifecycle transition requested for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The entity joins the world (and starts enabled)
    Added,
    /// The entity becomes visible to systems
    Enabled,
    /// The entity is hidden from systems but keeps its data
    Disabled,
    /// The entity is torn down and its id recycled
    Deleted,
}

/// Staged transitions taken out of the queue in one drain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drained {
    /// Entities signalled [`Signal::Added`]
    pub added: Vec<Entity>,
    /// Entities to enable
    pub enabled: Vec<Entity>,
    /// Entities to disable
    pub disabled: Vec<Entity>,
    /// Entities to delete
    pub deleted: Vec<Entity>,
}

impl Drained {
    /// Whether nothing was staged
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.enabled.is_empty() && self.disabled.is_empty() && self.deleted.is_empty()
    }
}

/// The four pending-transition sets
#[derive(Debug, Clone, Default)]
pub struct LifecycleQueue {
    added: SparseSet,
    enabled: SparseSet,
    disabled: SparseSet,
    deleted: SparseSet,
}

impl LifecycleQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `signal` for `entity`
    pub fn signal(&mut self, entity: Entity, signal: Signal) {
        let id = entity.raw();
        match signal {
            Signal::Added => {
                self.added.insert(id);
                self.enabled.insert(id);
                self.disabled.remove(id);
                self.deleted.remove(id);
            }
            Signal::Enabled => {
                self.enabled.insert(id);
                self.disabled.remove(id);
                self.deleted.remove(id);
            }
            Signal::Disabled => {
                self.enabled.remove(id);
                self.disabled.insert(id);
                self.deleted.remove(id);
            }
            Signal::Deleted => {
                self.added.remove(id);
                self.enabled.remove(id);
                self.disabled.insert(id);
                self.deleted.insert(id);
            }
        }
    }

    /// Whether `entity` is staged for `signal`
    pub fn is_staged(&self, entity: Entity, signal: Signal) -> bool {
        let id = entity.raw();
        match signal {
            Signal::Added => self.added.contains(id),
            Signal::Enabled => self.enabled.contains(id),
            Signal::Disabled => self.disabled.contains(id),
            Signal::Deleted => self.deleted.contains(id),
        }
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.enabled.is_empty() && self.disabled.is_empty() && self.deleted.is_empty()
    }

    /// Snapshot every staging set and clear them
    pub fn drain(&mut self) -> Drained {
        fn entities(set: &mut SparseSet) -> Vec<Entity> {
            set.take().into_iter().map(Entity::new).collect()
        }
        Drained {
            added: entities(&mut self.added),
            enabled: entities(&mut self.enabled),
            disabled: entities(&mut self.disabled),
            deleted: entities(&mut self.deleted),
        }
    }

    /// Drop every staged transition
    pub fn clear(&mut self) {
        self.added.clear();
        self.enabled.clear();
        self.disabled.clear();
        self.deleted.clear();
    }
}
