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
//! # ECS Runtime
//!
//! A row-table entity component system runtime.
//!
//! ## Features
//!
//! - **Row storage**: every entity is one fixed-stride record holding a
//!   presence mask and a slot per component
//! - **Storage modes**: inline, pooled (indexed), multi-valued and
//!   capacity-limited components, plus lazily derived components
//! - **Lifecycle staging**: add/enable/disable/delete signals applied once per tick
//! - **Subscriptions**: systems watch and exclude components and are told
//!   when entities start or stop matching
//! - **Concurrency**: entities spawned while systems run are buffered and
//!   merged when the last processor finishes; optional Rayon sweep
//!
//! ## Example
//!
//! ```rust
//! use ecs_runtime::ecs::{Entity, Signal, Storage, System, SystemMode, World};
//! use ecs_runtime::Result;
//!
//! struct Move { position: ecs_runtime::ecs::ComponentId, velocity: ecs_runtime::ecs::ComponentId }
//!
//! impl System for Move {
//!     fn process(&mut self, world: &World, entity: Entity, delta: f32) -> Result<()> {
//!         let v: [f32; 2] = world.get(entity, self.velocity)?;
//!         world.update(entity, self.position, |p: &mut [f32; 2]| {
//!             p[0] += v[0] * delta;
//!             p[1] += v[1] * delta;
//!         })
//!     }
//! }
//!
//! let mut world = World::new();
//! let position = world.register_component("position", 8, Storage::Inline)?;
//! let velocity = world.register_component("velocity", 8, Storage::Inline)?;
//! let system = world.register_system(Move { position, velocity }, SystemMode::Normal)?;
//! world.watch(system, position)?;
//! world.watch(system, velocity)?;
//! world.initialize()?;
//!
//! let entity = world.spawn()?;
//! world.set(entity, position, &[0.0f32, 0.0])?;
//! world.set(entity, velocity, &[1.0f32, 0.0])?;
//! world.signal(entity, Signal::Added)?;
//! world.process(1.0)?;
//!
//! assert_eq!(world.get::<[f32; 2]>(entity, position)?, [1.0, 0.0]);
//! # Ok::<(), ecs_runtime::Error>(())
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// Error types
pub mod error;

/// Memory pooling for out-of-line component storage
pub mod pool;

/// Sparse and dense integer sets
pub mod sets;

/// Structural lock strategies
pub mod sync;

pub use ecs::{Entity, World};
pub use error::{Error, Result};
