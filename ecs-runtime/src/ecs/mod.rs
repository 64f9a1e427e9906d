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
//! Entity Component System (ECS) core implementation
//!
//! This module provides the runtime itself:
//! - Entity ids backed by fixed-stride rows in one entity table
//! - Component storage (inline, indexed, multiple, limited, derived)
//! - Lifecycle staging drained once per tick
//! - Systems with watch/exclude filters and lifecycle managers
//! - A tick scheduler that tolerates concurrent single-system processing

mod component;
mod entity;
mod lifecycle;
mod scheduler;
mod state;
mod system;
mod table;
mod world;

pub use component::Storage;
pub use entity::{ComponentId, Entity, ManagerId, SystemId};
pub use lifecycle::{Drained, LifecycleQueue, Signal};
pub use system::{Manager, System, SystemMode};
pub use world::{World, WorldConfig};
