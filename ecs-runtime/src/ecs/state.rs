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
//! Structural world state
//!
//! Everything in [`WorldState`] is only touched while holding the world's
//! structural lock: the row table, component pools, lifecycle staging sets,
//! free ids and the active set.

use crate::ecs::component::{ComponentDescriptor, RowLayout, Storage};
use crate::ecs::lifecycle::LifecycleQueue;
use crate::ecs::table::EntityTable;
use crate::ecs::{ComponentId, Entity, WorldConfig};
use crate::error::{Error, Result};
use crate::pool::{SlotHandle, SlotPool};
use crate::sets::{DenseBitset, SparseSet};

/// Out-of-line storage of one indexed or multiple component
struct ComponentPool {
    slots: SlotPool,
    bags: Vec<Vec<SlotHandle>>,
    free_bags: SparseSet,
}

impl ComponentPool {
    fn bag(&self, bag: u32) -> &[SlotHandle] {
        &self.bags[bag as usize]
    }

    fn new_bag(&mut self, first: SlotHandle) -> u32 {
        if let Some(bag) = self.free_bags.pop() {
            self.bags[bag as usize].push(first);
            bag
        } else {
            self.bags.push(vec![first]);
            (self.bags.len() - 1) as u32
        }
    }

    fn free_bag(&mut self, bag: u32) {
        for handle in std::mem::take(&mut self.bags[bag as usize]) {
            self.slots.release(handle);
        }
        self.free_bags.insert(bag);
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.bags.clear();
        self.free_bags.clear();
    }
}

pub(crate) struct WorldState {
    pub layout: RowLayout,
    pub table: EntityTable,
    pub lifecycle: LifecycleQueue,
    pub active: DenseBitset,
    storages: Vec<Storage>,
    pools: Vec<Option<ComponentPool>>,
    free_ids: SparseSet,
    next_id: u32,
    /// Bumped whenever an id is released, so work started on an entity can
    /// tell whether that id has since been recycled
    epoch: u64,
}

impl WorldState {
    /// Placeholder used until the world is initialized
    pub fn empty() -> Self {
        WorldState {
            layout: RowLayout::default(),
            table: EntityTable::empty(0),
            lifecycle: LifecycleQueue::new(),
            active: DenseBitset::new(),
            storages: Vec::new(),
            pools: Vec::new(),
            free_ids: SparseSet::new(),
            next_id: 0,
            epoch: 0,
        }
    }

    pub fn new(components: &[ComponentDescriptor], config: &WorldConfig) -> Result<Self> {
        let layout = RowLayout::new(components);
        let table = EntityTable::new(
            layout.stride(),
            config.initial_capacity,
            config.growth_factor,
            config.log_growth_events,
        )?;
        let pools = components
            .iter()
            .map(|c| match c.storage {
                Storage::Inline => Ok(None),
                storage => Ok(Some(ComponentPool {
                    slots: SlotPool::new(&c.name, c.size, storage.limit(), config.pool.clone())?,
                    bags: Vec::new(),
                    free_bags: SparseSet::new(),
                })),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(WorldState {
            layout,
            table,
            lifecycle: LifecycleQueue::new(),
            active: DenseBitset::with_capacity(config.initial_capacity),
            storages: components.iter().map(|c| c.storage).collect(),
            pools,
            free_ids: SparseSet::new(),
            next_id: 0,
            epoch: 0,
        })
    }

    pub fn is_alive(&self, e: Entity) -> bool {
        self.table.contains(e) && !self.free_ids.contains(e.raw())
    }

    pub fn check_alive(&self, e: Entity) -> Result<()> {
        if self.is_alive(e) {
            Ok(())
        } else {
            Err(Error::InvalidValue(format!("{} is not a live entity", e)))
        }
    }

    pub fn has(&self, e: Entity, c: ComponentId) -> bool {
        self.layout.has(self.table.row(e), c)
    }

    pub fn is_dirty(&self, e: Entity, c: ComponentId) -> bool {
        self.layout.is_dirty(self.table.row(e), c)
    }

    pub fn set_dirty(&mut self, e: Entity, c: ComponentId, dirty: bool) {
        self.layout.set_dirty(self.table.row_mut(e), c, dirty);
    }

    pub fn set_computing(&mut self, e: Entity, c: ComponentId) {
        self.layout.set_computing(self.table.row_mut(e), c);
    }

    pub fn is_computing(&self, e: Entity, c: ComponentId) -> bool {
        self.layout.is_computing(self.table.row(e), c)
    }

    pub fn pool_stats(&self, c: ComponentId) -> Option<crate::pool::PoolStats> {
        self.pools[c.index()].as_ref().map(|p| p.slots.stats())
    }

    /// Hand out a recycled or fresh id with a zeroed row
    pub fn allocate(&mut self, in_flight: bool) -> Result<Entity> {
        if let Some(id) = self.free_ids.pop() {
            let e = Entity::new(id);
            if let Err(err) = self.table.make_room(e, in_flight) {
                self.free_ids.insert(id);
                return Err(err);
            }
            return Ok(e);
        }
        let id = self.next_id;
        let next = id
            .checked_add(1)
            .ok_or_else(|| Error::InvalidOperation("entity ids exhausted".to_string()))?;
        let e = Entity::new(id);
        self.table.make_room(e, in_flight)?;
        self.next_id = next;
        Ok(e)
    }

    /// Release every component of `e` and return its id for reuse
    pub fn release(&mut self, e: Entity) {
        for c in (0..self.storages.len()).map(ComponentId::from_index) {
            if self.has(e, c) {
                self.detach(e, c);
            }
        }
        self.table.row_mut(e).fill(0);
        self.active.remove(e.raw());
        self.free_ids.insert(e.raw());
        self.epoch += 1;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of values `e` carries for `c`
    pub fn count(&self, e: Entity, c: ComponentId) -> usize {
        if !self.has(e, c) {
            return 0;
        }
        match (self.storages[c.index()], &self.pools[c.index()]) {
            (Storage::Multiple { .. }, Some(pool)) => pool.bag(self.layout.handle(self.table.row(e), c)).len(),
            _ => 1,
        }
    }

    pub fn value(&self, e: Entity, c: ComponentId, index: usize) -> Result<&[u8]> {
        let row = self.table.row(e);
        if !self.layout.has(row, c) {
            return Err(missing(e, c));
        }
        match (self.storages[c.index()], &self.pools[c.index()]) {
            (Storage::Inline, _) if index == 0 => Ok(self.layout.slot(row, c)),
            (Storage::Indexed { .. }, Some(pool)) if index == 0 => pool
                .slots
                .block(self.layout.handle(row, c))
                .ok_or_else(|| dangling(e, c)),
            (Storage::Multiple { .. }, Some(pool)) => {
                let bag = pool.bag(self.layout.handle(row, c));
                let handle = bag.get(index).ok_or_else(|| out_of_range(e, c, index, bag.len()))?;
                Ok(pool.slots.get(handle))
            }
            _ => Err(out_of_range(e, c, index, 1)),
        }
    }

    pub fn value_mut(&mut self, e: Entity, c: ComponentId, index: usize) -> Result<&mut [u8]> {
        let storage = self.storages[c.index()];
        let row = self.table.row(e);
        if !self.layout.has(row, c) {
            return Err(missing(e, c));
        }
        if storage == Storage::Inline {
            if index != 0 {
                return Err(out_of_range(e, c, index, 1));
            }
            return Ok(self.layout.slot_mut(self.table.row_mut(e), c));
        }
        let handle = self.layout.handle(row, c);
        let Some(pool) = self.pools[c.index()].as_mut() else {
            return Err(out_of_range(e, c, index, 1));
        };
        match storage {
            Storage::Multiple { .. } => {
                let bag = &pool.bags[handle as usize];
                let slot = bag.get(index).ok_or_else(|| out_of_range(e, c, index, bag.len()))?;
                Ok(pool.slots.get_mut(slot))
            }
            _ if index == 0 => pool.slots.block_mut(handle).ok_or_else(|| dangling(e, c)),
            _ => Err(out_of_range(e, c, index, 1)),
        }
    }

    /// Make `c` present on `e` with one zeroed value
    ///
    /// Storage is acquired before the presence bit is set, so a full pool
    /// leaves the row untouched.
    pub fn attach(&mut self, e: Entity, c: ComponentId) -> Result<()> {
        let layout = &self.layout;
        match (self.storages[c.index()], &mut self.pools[c.index()]) {
            (Storage::Indexed { .. }, Some(pool)) => {
                let handle = pool.slots.acquire()?;
                layout.set_handle(self.table.row_mut(e), c, handle.into_raw());
            }
            (Storage::Multiple { .. }, Some(pool)) => {
                let handle = pool.slots.acquire()?;
                let bag = pool.new_bag(handle);
                layout.set_handle(self.table.row_mut(e), c, bag);
            }
            _ => layout.slot_mut(self.table.row_mut(e), c).fill(0),
        }
        let row = self.table.row_mut(e);
        layout.mark(row, c);
        layout.set_dirty(row, c, false);
        Ok(())
    }

    /// Append one zeroed value to a present multiple component, returning its index
    pub fn push(&mut self, e: Entity, c: ComponentId) -> Result<usize> {
        let bag = self.layout.handle(self.table.row(e), c) as usize;
        let pool = self.pools[c.index()]
            .as_mut()
            .ok_or_else(|| Error::InvalidOperation(format!("{} is not multiple-valued", c)))?;
        let handle = pool.slots.acquire()?;
        pool.bags[bag].push(handle);
        Ok(pool.bags[bag].len() - 1)
    }

    /// Drop `c` from `e`, returning its storage to the pool
    pub fn detach(&mut self, e: Entity, c: ComponentId) {
        let layout = &self.layout;
        let row = self.table.row_mut(e);
        if !layout.has(row, c) {
            return;
        }
        match (self.storages[c.index()], &mut self.pools[c.index()]) {
            (Storage::Indexed { .. }, Some(pool)) => pool.slots.release(SlotHandle::from_raw(layout.handle(row, c))),
            (Storage::Multiple { .. }, Some(pool)) => pool.free_bag(layout.handle(row, c)),
            _ => {}
        }
        layout.unmark(row, c);
        layout.set_dirty(row, c, false);
    }

    /// Remove value `index` of a multiple component that holds more than one value
    pub fn remove_at(&mut self, e: Entity, c: ComponentId, index: usize) -> Result<()> {
        let bag = self.layout.handle(self.table.row(e), c) as usize;
        let pool = self.pools[c.index()]
            .as_mut()
            .ok_or_else(|| Error::InvalidOperation(format!("{} is not multiple-valued", c)))?;
        let len = pool.bags[bag].len();
        if index >= len {
            return Err(out_of_range(e, c, index, len));
        }
        let handle = pool.bags[bag].remove(index);
        pool.slots.release(handle);
        Ok(())
    }

    /// Forget every entity, keeping the layout and reserved memory
    pub fn clear(&mut self) {
        self.table.clear();
        self.lifecycle.clear();
        self.active.clear();
        self.free_ids.clear();
        self.next_id = 0;
        self.epoch += 1;
        for pool in self.pools.iter_mut().flatten() {
            pool.clear();
        }
    }
}

fn missing(e: Entity, c: ComponentId) -> Error {
    Error::InvalidValue(format!("{} does not have {}", e, c))
}

fn dangling(e: Entity, c: ComponentId) -> Error {
    Error::InvalidValue(format!("{} of {} points at a released slot", c, e))
}

fn out_of_range(e: Entity, c: ComponentId, index: usize, len: usize) -> Error {
    Error::InvalidValue(format!("index {} out of range for {} of {} ({} values)", index, c, e, len))
}
