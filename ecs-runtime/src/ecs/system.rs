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
//! Systems and managers
//!
//! A system declares the components it watches and excludes; every enabled
//! entity matching that filter is a subscriber, and each tick the system's
//! `process` callback runs once per subscriber. A manager receives lifecycle
//! notifications for every entity regardless of components.
//!
//! Callbacks receive a shared `&World` and may spawn, signal and read or
//! write component values. They run without the structural lock held.

use crate::ecs::component::RowLayout;
use crate::ecs::{ComponentId, Entity, World};
use crate::error::Result;
use crate::sets::{DenseBitset, SparseSet};
use crate::sync::SharedLock;
use parking_lot::lock_api::RawMutex;
use parking_lot::{Mutex, RwLock};

/// Whether the scheduler runs a system on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemMode {
    /// Run on every [`World::process`]
    #[default]
    Normal,
    /// Only run through [`World::process_system`]
    Passive,
}

/// Per-entity logic driven by the scheduler
///
/// Only [`System::process`] is required. Returning an error aborts the
/// current sweep and hands the error back to the caller of `process`.
pub trait System<R: RawMutex = SharedLock>: Send + Sync {
    /// Called once before the subscribers are visited
    fn starting(&mut self, _world: &World<R>) -> Result<()> {
        Ok(())
    }

    /// Called for every subscriber, in ascending id order
    fn process(&mut self, world: &World<R>, entity: Entity, delta: f32) -> Result<()>;

    /// Called once after the subscribers are visited
    fn ending(&mut self, _world: &World<R>) -> Result<()> {
        Ok(())
    }

    /// An enabled entity started matching this system's filter
    fn subscribed(&mut self, _world: &World<R>, _entity: Entity) -> Result<()> {
        Ok(())
    }

    /// A subscriber stopped matching, was disabled or was deleted
    fn unsubscribed(&mut self, _world: &World<R>, _entity: Entity) -> Result<()> {
        Ok(())
    }

    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Lifecycle observer notified about every entity
pub trait Manager<R: RawMutex = SharedLock>: Send + Sync {
    /// The entity was signalled as added
    fn added(&mut self, _world: &World<R>, _entity: Entity) -> Result<()> {
        Ok(())
    }

    /// The entity became active
    fn enabled(&mut self, _world: &World<R>, _entity: Entity) -> Result<()> {
        Ok(())
    }

    /// The entity stopped being active
    fn disabled(&mut self, _world: &World<R>, _entity: Entity) -> Result<()> {
        Ok(())
    }

    /// The entity is about to be released
    fn deleted(&mut self, _world: &World<R>, _entity: Entity) -> Result<()> {
        Ok(())
    }

    /// Get the name of this manager for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Registered system plus its filter and subscribers
pub(crate) struct SystemSlot<R: RawMutex> {
    pub name: String,
    pub mode: SystemMode,
    pub watch: SparseSet,
    pub exclude: SparseSet,
    pub subscribers: RwLock<DenseBitset>,
    pub callbacks: Mutex<Box<dyn System<R>>>,
}

impl<R: RawMutex> SystemSlot<R> {
    pub fn new(system: Box<dyn System<R>>, mode: SystemMode) -> Self {
        SystemSlot {
            name: system.name().to_string(),
            mode,
            watch: SparseSet::new(),
            exclude: SparseSet::new(),
            subscribers: RwLock::new(DenseBitset::new()),
            callbacks: Mutex::new(system),
        }
    }

    /// Every watched component present and no excluded component present
    pub fn wants(&self, layout: &RowLayout, row: &[u8]) -> bool {
        let has = |c: u32| layout.has(row, ComponentId::from_index(c as usize));
        self.watch.iter().all(has) && !self.exclude.iter().any(has)
    }
}

pub(crate) struct ManagerSlot<R: RawMutex> {
    pub name: String,
    pub callbacks: Mutex<Box<dyn Manager<R>>>,
}

impl<R: RawMutex> ManagerSlot<R> {
    pub fn new(manager: Box<dyn Manager<R>>) -> Self {
        ManagerSlot {
            name: manager.name().to_string(),
            callbacks: Mutex::new(manager),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{ComponentDescriptor, Storage};

    struct Noop;

    impl System for Noop {
        fn process(&mut self, _world: &World, _entity: Entity, _delta: f32) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "Noop"
        }
    }

    struct Unnamed;

    impl Manager for Unnamed {}

    fn layout(n: usize) -> RowLayout {
        let components: Vec<_> = (0..n)
            .map(|i| ComponentDescriptor {
                name: format!("c{}", i),
                size: 1,
                storage: Storage::Inline,
                derived: false,
            })
            .collect();
        RowLayout::new(&components)
    }

    #[test]
    fn test_system_slot_names() {
        let slot: SystemSlot<SharedLock> = SystemSlot::new(Box::new(Noop), SystemMode::Passive);
        assert_eq!(slot.name, "Noop");
        assert_eq!(slot.mode, SystemMode::Passive);

        let manager: ManagerSlot<SharedLock> = ManagerSlot::new(Box::new(Unnamed));
        assert!(manager.name.ends_with("Unnamed"));
    }

    #[test]
    fn test_filter_watch_and_exclude() {
        let layout = layout(3);
        let mut slot: SystemSlot<SharedLock> = SystemSlot::new(Box::new(Noop), SystemMode::Normal);
        slot.watch.insert(0);
        slot.watch.insert(1);
        slot.exclude.insert(2);

        let mut row = vec![0u8; layout.stride()];
        assert!(!slot.wants(&layout, &row));

        layout.mark(&mut row, ComponentId::from_index(0));
        assert!(!slot.wants(&layout, &row));

        layout.mark(&mut row, ComponentId::from_index(1));
        assert!(slot.wants(&layout, &row));

        layout.mark(&mut row, ComponentId::from_index(2));
        assert!(!slot.wants(&layout, &row));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let layout = layout(1);
        let slot: SystemSlot<SharedLock> = SystemSlot::new(Box::new(Noop), SystemMode::Normal);
        assert!(slot.wants(&layout, &vec![0u8; layout.stride()]));
    }

    #[test]
    fn test_default_mode() {
        assert_eq!(SystemMode::default(), SystemMode::Normal);
    }
}
