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
//! Tick scheduling
//!
//! [`World::process`] runs one tick:
//!
//! 1. the lifecycle queue is drained under the structural lock;
//! 2. added entities are announced to managers;
//! 3. enabled entities are checked against every system filter, announced to
//!    managers and marked active;
//! 4. disabled entities are unsubscribed everywhere, announced and deactivated;
//! 5. deleted entities are unsubscribed, announced, and their storage and id
//!    released;
//! 6. every normal (non-passive) system is processed.
//!
//! Processing a system bumps the world's in-flight counter. Rows spawned while
//! the counter is non-zero are parked in the processing buffer; the last
//! processor to finish merges them into the entity table. A full tick holds
//! one in-flight count across the whole sweep, so rows spawned by any system
//! of the tick are merged once, after the last system.
//!
//! Several threads may call [`World::process_system`] concurrently on a
//! [`SharedLock`](crate::sync::SharedLock) world. Neither entry point may be
//! called from inside a system or manager callback.

use crate::ecs::system::{SystemMode, SystemSlot};
use crate::ecs::{Entity, SystemId, World};
use crate::error::{Error, Result};
use parking_lot::lock_api::RawMutex;
use std::sync::atomic::Ordering;

/// Holds one in-flight count for its lifetime
struct InFlight<'w, R: RawMutex> {
    world: &'w World<R>,
}

impl<'w, R: RawMutex> InFlight<'w, R> {
    fn enter(world: &'w World<R>) -> Self {
        world.in_flight.fetch_add(1, Ordering::AcqRel);
        InFlight { world }
    }
}

impl<R: RawMutex> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        if self.world.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.world.merge_pending();
        }
    }
}

impl<R: RawMutex> World<R> {
    /// Run one tick: apply staged lifecycle transitions, then process every
    /// normal system
    ///
    /// Transitions are always applied in full. If a callback fails during
    /// the drain the first error is returned after it and no system runs; a
    /// failing system callback stops the sweep.
    pub fn process(&self, delta: f32) -> Result<()> {
        self.drain()?;
        let _sweep = InFlight::enter(self);
        for slot in self.systems.iter().filter(|s| s.mode == SystemMode::Normal) {
            self.run(slot, delta)?;
        }
        Ok(())
    }

    /// Process a single system, passive or not, without draining the lifecycle queue
    pub fn process_system(&self, system: SystemId, delta: f32) -> Result<()> {
        self.ensure_initialized()?;
        let slot = self.system_slot(system)?;
        self.run(slot, delta)
    }

    /// Like [`World::process`], but normal systems run on the rayon pool
    ///
    /// Systems with overlapping watch sets may then touch the same entity
    /// concurrently; writes to shared components must not conflict.
    #[cfg(feature = "parallel")]
    pub fn process_parallel(&self, delta: f32) -> Result<()>
    where
        Self: Sync,
    {
        use rayon::prelude::*;

        self.drain()?;
        let _sweep = InFlight::enter(self);
        self.systems
            .par_iter()
            .filter(|s| s.mode == SystemMode::Normal)
            .try_for_each(|slot| self.run(slot, delta))
    }

    /// Run all systems (sequential fallback when parallel feature disabled)
    #[cfg(not(feature = "parallel"))]
    pub fn process_parallel(&self, delta: f32) -> Result<()> {
        self.process(delta)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::InvalidOperation("world is not initialized".to_string()))
        }
    }

    fn run(&self, slot: &SystemSlot<R>, delta: f32) -> Result<()> {
        let _processing = InFlight::enter(self);
        let mut system = slot.callbacks.lock();
        system.starting(self)?;
        {
            let subscribers = slot.subscribers.read();
            for id in subscribers.iter() {
                system.process(self, Entity::new(id), delta)?;
            }
        }
        system.ending(self)
    }

    /// Copy parked rows into the entity table once nothing is processing
    fn merge_pending(&self) {
        let mut state = self.state.lock();
        if self.in_flight.load(Ordering::Acquire) > 0 {
            return;
        }
        if let Err(err) = state.table.merge() {
            log::error!(
                "failed to merge {} buffered rows, keeping them parked: {}",
                state.table.pending(),
                err
            );
        }
    }

    fn drain(&self) -> Result<()> {
        let drained = self.lock()?.lifecycle.drain();
        if drained.is_empty() {
            return Ok(());
        }
        log::trace!(
            "draining lifecycle: {} added, {} enabled, {} disabled, {} deleted",
            drained.added.len(),
            drained.enabled.len(),
            drained.disabled.len(),
            drained.deleted.len()
        );

        let mut status = Ok(());
        for &entity in &drained.added {
            for manager in &self.managers {
                keep_first(&mut status, manager.callbacks.lock().added(self, entity));
            }
        }

        for &entity in &drained.enabled {
            let wanted: Vec<bool> = {
                let state = self.state.lock();
                if !state.is_alive(entity) {
                    continue;
                }
                let row = state.table.row(entity);
                let wanted = self.systems.iter().map(|s| s.wants(&state.layout, row)).collect();
                wanted
            };
            for (slot, wanted) in self.systems.iter().zip(wanted) {
                keep_first(&mut status, self.check(slot, entity, wanted));
            }
            for manager in &self.managers {
                keep_first(&mut status, manager.callbacks.lock().enabled(self, entity));
            }
            self.state.lock().active.insert(entity.raw());
        }

        for &entity in &drained.disabled {
            for slot in &self.systems {
                keep_first(&mut status, self.check(slot, entity, false));
            }
            for manager in &self.managers {
                keep_first(&mut status, manager.callbacks.lock().disabled(self, entity));
            }
            self.state.lock().active.remove(entity.raw());
        }

        for &entity in &drained.deleted {
            for slot in &self.systems {
                keep_first(&mut status, self.check(slot, entity, false));
            }
            for manager in &self.managers {
                keep_first(&mut status, manager.callbacks.lock().deleted(self, entity));
            }
            let mut state = self.state.lock();
            if state.is_alive(entity) {
                state.release(entity);
                log::trace!("released {}", entity);
            }
        }
        status
    }

    /// Subscribe or unsubscribe, notifying the system only on a real change
    fn check(&self, slot: &SystemSlot<R>, entity: Entity, wanted: bool) -> Result<()> {
        if wanted {
            if slot.subscribers.write().insert(entity.raw()) {
                log::trace!("{} subscribed to {}", entity, slot.name);
                slot.callbacks.lock().subscribed(self, entity)?;
            }
        } else if slot.subscribers.write().remove(entity.raw()) {
            log::trace!("{} unsubscribed from {}", entity, slot.name);
            slot.callbacks.lock().unsubscribed(self, entity)?;
        }
        Ok(())
    }
}

fn keep_first(status: &mut Result<()>, result: Result<()>) {
    if status.is_ok() {
        *status = result;
    }
}
