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
//! World: registration, entities and component access
//!
//! A [`World`] goes through two phases. While configuring (`&mut self`)
//! components, systems, managers and derive functions are registered;
//! [`World::initialize`] then freezes the row layout. From that point on every
//! call takes `&self` and may be issued from system callbacks or, with the
//! default [`SharedLock`], from several threads at once.
//!
//! Component values are accessed as bytes ([`World::set_component`],
//! [`World::get_component`]) or through the typed helpers ([`World::set`],
//! [`World::get`], [`World::update`]) for any [`bytemuck::Pod`] type whose
//! size matches the registered payload size.

use crate::ecs::component::{ComponentDescriptor, Derivations, Storage};
use crate::ecs::lifecycle::Signal;
use crate::ecs::state::WorldState;
use crate::ecs::system::{Manager, ManagerSlot, System, SystemMode, SystemSlot};
use crate::ecs::{ComponentId, Entity, ManagerId, SystemId};
use crate::error::{Error, Result};
use crate::pool::{PoolConfig, PoolStats};
use crate::sync::{LocalLock, SharedLock, StructuralGuard, StructuralMutex};
use bytemuck::Pod;
use parking_lot::lock_api::RawMutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Configuration for entity table sizing and component pools
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Rows reserved when the world is initialized
    pub initial_capacity: usize,
    /// Multiplier applied when the entity table grows
    pub growth_factor: f64,
    /// Log table growth at `info` instead of `debug`
    pub log_growth_events: bool,
    /// Settings shared by every indexed and multiple component pool
    pub pool: PoolConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            initial_capacity: 64,
            growth_factor: 1.5,
            log_growth_events: false,
            pool: PoolConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Create a configuration reserving `initial_capacity` rows
    pub fn new(initial_capacity: usize) -> Self {
        WorldConfig {
            initial_capacity,
            ..Default::default()
        }
    }

    /// Enable logging of table growth events
    pub fn with_logging(mut self) -> Self {
        self.log_growth_events = true;
        self
    }

    /// Set the table growth factor
    pub fn with_growth_factor(mut self, factor: f64) -> Self {
        assert!(factor >= 1.0, "Growth factor must be >= 1.0");
        self.growth_factor = factor;
        self
    }

    /// Set the configuration used for component pools
    pub fn with_pool_config(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}

/// The entity component system runtime
///
/// `R` selects the structural lock: [`SharedLock`] (default, the world is
/// `Sync`) or [`LocalLock`] for single-threaded use.
pub struct World<R: RawMutex = SharedLock> {
    config: WorldConfig,
    components: Vec<ComponentDescriptor>,
    derivations: Derivations<R>,
    pub(crate) systems: Vec<SystemSlot<R>>,
    pub(crate) managers: Vec<ManagerSlot<R>>,
    initialized: bool,
    pub(crate) state: StructuralMutex<R, WorldState>,
    pub(crate) in_flight: AtomicUsize,
}

impl World {
    /// Create a new thread-safe world with default configuration
    pub fn new() -> Self {
        Self::build(WorldConfig::default())
    }

    /// Create a new thread-safe world
    pub fn with_config(config: WorldConfig) -> Self {
        Self::build(config)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World<LocalLock> {
    /// Create a single-threaded world with default configuration
    pub fn local() -> Self {
        Self::build(WorldConfig::default())
    }

    /// Create a single-threaded world
    pub fn local_with_config(config: WorldConfig) -> Self {
        Self::build(config)
    }
}

impl<R: RawMutex> World<R> {
    fn build(config: WorldConfig) -> Self {
        World {
            config,
            components: Vec::new(),
            derivations: Derivations::new(),
            systems: Vec::new(),
            managers: Vec::new(),
            initialized: false,
            state: StructuralMutex::new(WorldState::empty()),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn ensure_configuring(&self) -> Result<()> {
        if self.initialized {
            Err(Error::InvalidOperation(
                "cannot register after the world is initialized".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    /// Register a component type with a payload of `size` bytes
    pub fn register_component(&mut self, name: &str, size: usize, storage: Storage) -> Result<ComponentId> {
        self.ensure_configuring()?;
        let id = ComponentId::from_index(self.components.len());
        self.components.push(ComponentDescriptor {
            name: name.to_string(),
            size,
            storage,
            derived: false,
        });
        self.derivations.push_component();
        Ok(id)
    }

    /// Compute `component` on demand with `derive`
    ///
    /// `reads` lists the components the function depends on: marking any of
    /// them dirty marks `component` dirty too. The function runs without the
    /// structural lock held and may read other components of the entity.
    pub fn register_derived<F>(&mut self, component: ComponentId, derive: F, reads: &[ComponentId]) -> Result<()>
    where
        F: Fn(&World<R>, Entity, &mut [u8]) -> Result<()> + Send + Sync + 'static,
    {
        self.ensure_configuring()?;
        self.descriptor(component)?;
        for &dependency in reads {
            self.descriptor(dependency)?;
        }
        let descriptor = &mut self.components[component.index()];
        if descriptor.storage.is_multiple() {
            return Err(Error::InvalidValue(format!(
                "derived component '{}' must be single-valued",
                descriptor.name
            )));
        }
        descriptor.derived = true;
        self.derivations.set_function(component, Box::new(derive));
        for &dependency in reads {
            self.derivations.depend(component, dependency);
        }
        Ok(())
    }

    /// Mark `derived` dirty whenever `dependency` is marked dirty
    pub fn depend(&mut self, derived: ComponentId, dependency: ComponentId) -> Result<()> {
        self.ensure_configuring()?;
        self.descriptor(dependency)?;
        if !self.descriptor(derived)?.derived {
            return Err(Error::InvalidValue(format!("{} is not a derived component", derived)));
        }
        self.derivations.depend(derived, dependency);
        Ok(())
    }

    /// Register a system; filters are added with [`World::watch`] and [`World::exclude`]
    pub fn register_system<S: System<R> + 'static>(&mut self, system: S, mode: SystemMode) -> Result<SystemId> {
        self.ensure_configuring()?;
        let id = SystemId::from_index(self.systems.len());
        self.systems.push(SystemSlot::new(Box::new(system), mode));
        Ok(id)
    }

    /// Require `component` for entities processed by `system`
    pub fn watch(&mut self, system: SystemId, component: ComponentId) -> Result<()> {
        self.ensure_configuring()?;
        self.descriptor(component)?;
        self.system_slot_mut(system)?.watch.insert(component.raw());
        Ok(())
    }

    /// Skip entities carrying `component` in `system`
    pub fn exclude(&mut self, system: SystemId, component: ComponentId) -> Result<()> {
        self.ensure_configuring()?;
        self.descriptor(component)?;
        self.system_slot_mut(system)?.exclude.insert(component.raw());
        Ok(())
    }

    /// Register a lifecycle manager
    pub fn register_manager<M: Manager<R> + 'static>(&mut self, manager: M) -> Result<ManagerId> {
        self.ensure_configuring()?;
        let id = ManagerId::from_index(self.managers.len());
        self.managers.push(ManagerSlot::new(Box::new(manager)));
        Ok(id)
    }

    /// Freeze registration and lay out entity rows
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(Error::InvalidOperation("world is already initialized".to_string()));
        }
        let state = WorldState::new(&self.components, &self.config)?;
        log::debug!(
            "world initialized: {} components, {} systems, {} managers, {} bytes per row",
            self.components.len(),
            self.systems.len(),
            self.managers.len(),
            state.layout.stride()
        );
        *self.state.get_mut() = state;
        self.initialized = true;
        Ok(())
    }

    /// Whether [`World::initialize`] has been called
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn lock(&self) -> Result<StructuralGuard<'_, R, WorldState>> {
        if !self.initialized {
            return Err(Error::InvalidOperation("world is not initialized".to_string()));
        }
        Ok(self.state.lock())
    }

    fn descriptor(&self, c: ComponentId) -> Result<&ComponentDescriptor> {
        self.components
            .get(c.index())
            .ok_or_else(|| Error::InvalidValue(format!("unknown {}", c)))
    }

    pub(crate) fn system_slot(&self, system: SystemId) -> Result<&SystemSlot<R>> {
        self.systems
            .get(system.index())
            .ok_or_else(|| Error::InvalidValue(format!("unknown {}", system)))
    }

    fn system_slot_mut(&mut self, system: SystemId) -> Result<&mut SystemSlot<R>> {
        self.systems
            .get_mut(system.index())
            .ok_or_else(|| Error::InvalidValue(format!("unknown {}", system)))
    }

    // Entities

    /// Allocate an entity id with an empty row
    ///
    /// Ids of deleted entities are reused. While systems are processing the
    /// row may be parked in the processing buffer until the sweep ends; it is
    /// fully usable in the meantime.
    pub fn spawn(&self) -> Result<Entity> {
        let mut state = self.lock()?;
        let in_flight = self.in_flight.load(Ordering::Acquire) > 0;
        let entity = state.allocate(in_flight)?;
        log::trace!("spawned {}", entity);
        Ok(entity)
    }

    /// Spawn a new entity carrying a copy of every component of `entity`
    ///
    /// Derived components are refreshed before being copied. Out-of-line
    /// values get their own pool slots. If a copy fails the new entity is
    /// released again.
    pub fn clone_entity(&self, entity: Entity) -> Result<Entity> {
        self.lock()?.check_alive(entity)?;
        let copy = self.spawn()?;
        match self.copy_components(entity, copy) {
            Ok(()) => Ok(copy),
            Err(err) => {
                self.state.lock().release(copy);
                Err(err)
            }
        }
    }

    fn copy_components(&self, from: Entity, to: Entity) -> Result<()> {
        for c in (0..self.components.len()).map(ComponentId::from_index) {
            for index in 0..self.get_component_count(from, c)? {
                let value = self.get_component_at(from, c, index)?;
                self.append_component(to, c, Some(&value))?;
            }
        }
        Ok(())
    }

    /// Stage a lifecycle transition, applied by the next [`World::process`]
    pub fn signal(&self, entity: Entity, signal: Signal) -> Result<()> {
        let mut state = self.lock()?;
        state.check_alive(entity)?;
        state.lifecycle.signal(entity, signal);
        Ok(())
    }

    // Component values

    /// Add or overwrite a component
    ///
    /// With `None` the component is made present (zeroed) without writing; a
    /// derived component set this way is computed on its next read. Adding a
    /// component to an active entity is rejected, overwriting one is not. For
    /// multiple-valued components this writes the first value.
    pub fn set_component(&self, entity: Entity, component: ComponentId, data: Option<&[u8]>) -> Result<()> {
        let descriptor = self.descriptor(component)?;
        check_payload(descriptor, data)?;
        let mut state = self.lock()?;
        state.check_alive(entity)?;
        if !state.has(entity, component) {
            ensure_inactive(&state, entity, component, "add")?;
            state.attach(entity, component)?;
        }
        if let Some(data) = data {
            state.value_mut(entity, component, 0)?.copy_from_slice(data);
        }
        if descriptor.derived {
            state.set_dirty(entity, component, data.is_none());
        }
        Ok(())
    }

    /// Copy out a component's value (the first one for multiple components)
    pub fn get_component(&self, entity: Entity, component: ComponentId) -> Result<Vec<u8>> {
        self.read(entity, component, 0, <[u8]>::to_vec)
    }

    /// Drop a component and return its storage to the pool
    ///
    /// No-op when absent. Rejected on active entities.
    pub fn remove_component(&self, entity: Entity, component: ComponentId) -> Result<()> {
        self.descriptor(component)?;
        let mut state = self.lock()?;
        state.check_alive(entity)?;
        ensure_inactive(&state, entity, component, "remove")?;
        state.detach(entity, component);
        Ok(())
    }

    /// Add one more value to a multiple component
    ///
    /// Single-valued components behave as in [`World::set_component`].
    pub fn append_component(&self, entity: Entity, component: ComponentId, data: Option<&[u8]>) -> Result<()> {
        let descriptor = self.descriptor(component)?;
        if !descriptor.storage.is_multiple() {
            return self.set_component(entity, component, data);
        }
        check_payload(descriptor, data)?;
        let mut state = self.lock()?;
        state.check_alive(entity)?;
        let index = append_value(&mut state, entity, component)?;
        if let Some(data) = data {
            state.value_mut(entity, component, index)?.copy_from_slice(data);
        }
        Ok(())
    }

    /// Number of values the entity carries (0 when absent, 1 for single-valued)
    pub fn get_component_count(&self, entity: Entity, component: ComponentId) -> Result<usize> {
        self.descriptor(component)?;
        let state = self.lock()?;
        state.check_alive(entity)?;
        Ok(state.count(entity, component))
    }

    /// Drop every value of a multiple component
    pub fn remove_components(&self, entity: Entity, component: ComponentId) -> Result<()> {
        self.remove_component(entity, component)
    }

    /// Overwrite value `index`, or append when `index` equals the current count
    pub fn set_component_at(
        &self,
        entity: Entity,
        component: ComponentId,
        index: usize,
        data: Option<&[u8]>,
    ) -> Result<()> {
        let descriptor = self.descriptor(component)?;
        if !descriptor.storage.is_multiple() && index == 0 {
            return self.set_component(entity, component, data);
        }
        check_payload(descriptor, data)?;
        let mut state = self.lock()?;
        state.check_alive(entity)?;
        let count = state.count(entity, component);
        let index = match index {
            i if i < count => i,
            i if i == count && descriptor.storage.is_multiple() => append_value(&mut state, entity, component)?,
            i => return Err(out_of_range(entity, component, i, count)),
        };
        if let Some(data) = data {
            state.value_mut(entity, component, index)?.copy_from_slice(data);
        }
        Ok(())
    }

    /// Copy out value `index`
    pub fn get_component_at(&self, entity: Entity, component: ComponentId, index: usize) -> Result<Vec<u8>> {
        self.read(entity, component, index, <[u8]>::to_vec)
    }

    /// Remove value `index`, keeping the order of the remaining values
    ///
    /// Removing the last value removes the component, which is rejected on
    /// active entities.
    pub fn remove_component_at(&self, entity: Entity, component: ComponentId, index: usize) -> Result<()> {
        self.descriptor(component)?;
        let mut state = self.lock()?;
        state.check_alive(entity)?;
        let count = state.count(entity, component);
        if index >= count {
            return Err(out_of_range(entity, component, index, count));
        }
        if count == 1 {
            ensure_inactive(&state, entity, component, "remove")?;
            state.detach(entity, component);
            Ok(())
        } else {
            state.remove_at(entity, component, index)
        }
    }

    /// Invalidate `component` and everything derived from it on `entity`
    pub fn mark_dirty(&self, entity: Entity, component: ComponentId) -> Result<()> {
        self.descriptor(component)?;
        let stale = self.derivations.stale_closure(component);
        let mut state = self.lock()?;
        state.check_alive(entity)?;
        for c in stale {
            if self.components[c.index()].derived && state.has(entity, c) {
                state.set_dirty(entity, c, true);
            }
        }
        Ok(())
    }

    fn read<T>(&self, entity: Entity, component: ComponentId, index: usize, f: impl FnOnce(&[u8]) -> T) -> Result<T> {
        self.descriptor(component)?;
        self.refresh(entity, component)?;
        let state = self.lock()?;
        state.check_alive(entity)?;
        let value = state.value(entity, component, index)?;
        Ok(f(value))
    }

    /// Recompute a dirty derived component
    ///
    /// The lock is released while the derive function runs, so it can read
    /// other components through the world. The result is only kept if the
    /// value was not invalidated, overwritten or recycled in the meantime;
    /// otherwise the derive runs again on fresh inputs.
    fn refresh(&self, entity: Entity, component: ComponentId) -> Result<()> {
        let Some(derive) = self.derivations.function(component) else {
            return Ok(());
        };
        loop {
            let (mut value, epoch) = {
                let mut state = self.lock()?;
                state.check_alive(entity)?;
                if !state.has(entity, component) || !state.is_dirty(entity, component) {
                    return Ok(());
                }
                state.set_computing(entity, component);
                let current = state.value(entity, component, 0)?.to_vec();
                (current, state.epoch())
            };
            derive(self, entity, &mut value)?;
            let mut state = self.lock()?;
            if state.epoch() == epoch && state.is_computing(entity, component) {
                state.value_mut(entity, component, 0)?.copy_from_slice(&value);
                state.set_dirty(entity, component, false);
                return Ok(());
            }
        }
    }

    // Typed access

    fn check_type<T: Pod>(&self, component: ComponentId) -> Result<()> {
        let descriptor = self.descriptor(component)?;
        let size = std::mem::size_of::<T>();
        if descriptor.size != size {
            return Err(Error::InvalidValue(format!(
                "component '{}' holds {} bytes but {} is {} bytes",
                descriptor.name,
                descriptor.size,
                std::any::type_name::<T>(),
                size
            )));
        }
        Ok(())
    }

    /// Typed [`World::set_component`]
    pub fn set<T: Pod>(&self, entity: Entity, component: ComponentId, value: &T) -> Result<()> {
        self.check_type::<T>(component)?;
        self.set_component(entity, component, Some(bytemuck::bytes_of(value)))
    }

    /// Typed [`World::get_component`]
    pub fn get<T: Pod>(&self, entity: Entity, component: ComponentId) -> Result<T> {
        self.get_at(entity, component, 0)
    }

    /// Typed [`World::get_component_at`]
    pub fn get_at<T: Pod>(&self, entity: Entity, component: ComponentId, index: usize) -> Result<T> {
        self.check_type::<T>(component)?;
        self.read(entity, component, index, bytemuck::pod_read_unaligned::<T>)
    }

    /// Typed [`World::append_component`]
    pub fn append<T: Pod>(&self, entity: Entity, component: ComponentId, value: &T) -> Result<()> {
        self.check_type::<T>(component)?;
        self.append_component(entity, component, Some(bytemuck::bytes_of(value)))
    }

    /// Modify a present component in place
    ///
    /// `f` runs while the structural lock is held and must not call back into
    /// the world.
    pub fn update<T: Pod>(&self, entity: Entity, component: ComponentId, f: impl FnOnce(&mut T)) -> Result<()> {
        self.check_type::<T>(component)?;
        self.refresh(entity, component)?;
        let mut state = self.lock()?;
        state.check_alive(entity)?;
        let bytes = state.value_mut(entity, component, 0)?;
        let mut value: T = bytemuck::pod_read_unaligned(bytes);
        f(&mut value);
        bytes.copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    // Introspection

    /// Number of registered components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Number of registered managers
    pub fn manager_count(&self) -> usize {
        self.managers.len()
    }

    /// Registered name of a component
    pub fn component_name(&self, component: ComponentId) -> Option<&str> {
        self.components.get(component.index()).map(|c| c.name.as_str())
    }

    /// Registered payload size of a component
    pub fn component_size(&self, component: ComponentId) -> Option<usize> {
        self.components.get(component.index()).map(|c| c.size)
    }

    /// Registered name of a system
    pub fn system_name(&self, system: SystemId) -> Option<&str> {
        self.systems.get(system.index()).map(|s| s.name.as_str())
    }

    /// Registered name of a manager
    pub fn manager_name(&self, manager: ManagerId) -> Option<&str> {
        self.managers.get(manager.index()).map(|m| m.name.as_str())
    }

    /// Components a system requires
    pub fn system_watches(&self, system: SystemId) -> Result<Vec<ComponentId>> {
        let slot = self.system_slot(system)?;
        Ok(slot.watch.iter().map(|c| ComponentId::from_index(c as usize)).collect())
    }

    /// Components that keep an entity out of a system
    pub fn system_excludes(&self, system: SystemId) -> Result<Vec<ComponentId>> {
        let slot = self.system_slot(system)?;
        Ok(slot.exclude.iter().map(|c| ComponentId::from_index(c as usize)).collect())
    }

    /// Scheduling mode a system was registered with
    pub fn system_mode(&self, system: SystemId) -> Result<SystemMode> {
        Ok(self.system_slot(system)?.mode)
    }

    /// Number of entities subscribed to a system
    pub fn subscriber_count(&self, system: SystemId) -> Result<usize> {
        Ok(self.system_slot(system)?.subscribers.read_recursive().count())
    }

    /// Entities subscribed to a system, in ascending id order
    pub fn subscribers(&self, system: SystemId) -> Result<Vec<Entity>> {
        let slot = self.system_slot(system)?;
        let subscribers = slot.subscribers.read_recursive();
        let entities = subscribers.iter().map(Entity::new).collect();
        Ok(entities)
    }

    /// Whether the entity id is currently allocated
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.initialized && self.state.lock().is_alive(entity)
    }

    /// Whether the entity has been enabled by a processed tick
    pub fn is_active(&self, entity: Entity) -> bool {
        self.initialized && self.state.lock().active.contains(entity.raw())
    }

    /// Whether the entity currently carries the component
    pub fn has_component(&self, entity: Entity, component: ComponentId) -> bool {
        if !self.initialized || component.index() >= self.components.len() {
            return false;
        }
        let state = self.state.lock();
        state.is_alive(entity) && state.has(entity, component)
    }

    /// One past the highest entity id ever handed out
    pub fn entity_height(&self) -> usize {
        self.state.lock().table.height()
    }

    /// Rows backed by the main entity table
    pub fn entity_capacity(&self) -> usize {
        self.state.lock().table.capacity()
    }

    /// Rows parked in the processing buffer awaiting the end of a sweep
    pub fn pending_rows(&self) -> usize {
        self.state.lock().table.pending()
    }

    /// Systems currently being processed
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Slot reuse statistics of an indexed or multiple component
    pub fn pool_stats(&self, component: ComponentId) -> Option<PoolStats> {
        if !self.initialized || component.index() >= self.components.len() {
            return None;
        }
        self.state.lock().pool_stats(component)
    }

    /// Release every entity, value and pending transition
    ///
    /// Registrations and the row layout are kept. Not allowed while systems
    /// are processing.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock()?;
        if self.in_flight.load(Ordering::Acquire) > 0 {
            return Err(Error::InvalidOperation("cannot clear while systems are processing".to_string()));
        }
        state.clear();
        drop(state);
        for slot in &self.systems {
            slot.subscribers.write().clear();
        }
        Ok(())
    }
}

/// Make room for one more value of a multiple component, returning its index
fn append_value(state: &mut WorldState, entity: Entity, component: ComponentId) -> Result<usize> {
    if state.has(entity, component) {
        state.push(entity, component)
    } else {
        ensure_inactive(state, entity, component, "add")?;
        state.attach(entity, component)?;
        Ok(0)
    }
}

fn ensure_inactive(state: &WorldState, entity: Entity, component: ComponentId, action: &str) -> Result<()> {
    if state.active.contains(entity.raw()) {
        return Err(Error::InvalidOperation(format!(
            "cannot {} {} on active {}; disable it first",
            action, component, entity
        )));
    }
    Ok(())
}

fn check_payload(descriptor: &ComponentDescriptor, data: Option<&[u8]>) -> Result<()> {
    match data {
        Some(data) if data.len() != descriptor.size => Err(Error::InvalidValue(format!(
            "component '{}' expects {} bytes, got {}",
            descriptor.name,
            descriptor.size,
            data.len()
        ))),
        _ => Ok(()),
    }
}

fn out_of_range(entity: Entity, component: ComponentId, index: usize, count: usize) -> Error {
    Error::InvalidValue(format!(
        "index {} out of range for {} of {} ({} values)",
        index, component, entity, count
    ))
}
