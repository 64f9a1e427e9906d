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
//! Concurrent single-system processing with buffered spawns

use ecs_runtime::ecs::{ComponentId, Entity, Signal, Storage, System, SystemId, SystemMode, World, WorldConfig};
use ecs_runtime::Result;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};

const SEEDS: u32 = 4;
const SPAWNS_PER_SUBSCRIBER: u32 = 25;

fn pattern(id: u32) -> [u8; 16] {
    let mut bytes = [0xAB; 16];
    bytes[..4].copy_from_slice(&id.to_le_bytes());
    bytes[12..].copy_from_slice(&(!id).to_le_bytes());
    bytes
}

struct Breeder {
    payload: ComponentId,
    spawned: Arc<Mutex<Vec<Entity>>>,
    barrier: Option<Arc<Barrier>>,
}

impl System for Breeder {
    fn starting(&mut self, _world: &World) -> Result<()> {
        if let Some(barrier) = &self.barrier {
            barrier.wait();
        }
        Ok(())
    }

    fn process(&mut self, world: &World, _entity: Entity, _delta: f32) -> Result<()> {
        for _ in 0..SPAWNS_PER_SUBSCRIBER {
            let child = world.spawn()?;
            world.set_component(child, self.payload, Some(&pattern(child.raw())))?;
            self.spawned.lock().push(child);
            std::thread::yield_now();
        }
        Ok(())
    }
}

struct Setup {
    world: World,
    payload: ComponentId,
    breeders: [SystemId; 2],
    spawned: Arc<Mutex<Vec<Entity>>>,
}

fn setup(barrier: Option<Arc<Barrier>>) -> Setup {
    let mut world = World::with_config(WorldConfig::new(SEEDS as usize));
    let seed = world.register_component("seed", 0, Storage::Inline).unwrap();
    let payload = world.register_component("payload", 16, Storage::Inline).unwrap();
    let spawned = Arc::new(Mutex::new(Vec::new()));
    let mut breeders = Vec::new();
    for _ in 0..2 {
        let id = world
            .register_system(
                Breeder {
                    payload,
                    spawned: spawned.clone(),
                    barrier: barrier.clone(),
                },
                SystemMode::Passive,
            )
            .unwrap();
        world.watch(id, seed).unwrap();
        breeders.push(id);
    }
    world.initialize().unwrap();

    for _ in 0..SEEDS {
        let e = world.spawn().unwrap();
        world.set_component(e, seed, None).unwrap();
        world.signal(e, Signal::Added).unwrap();
    }
    world.process(0.0).unwrap();

    Setup {
        world,
        payload,
        breeders: [breeders[0], breeders[1]],
        spawned,
    }
}

fn assert_rows_intact(setup: &Setup, expected: usize) {
    let world = &setup.world;
    assert_eq!(world.in_flight(), 0);
    assert_eq!(world.pending_rows(), 0, "buffered rows must be merged");

    let spawned = setup.spawned.lock();
    assert_eq!(spawned.len(), expected);
    let unique: HashSet<_> = spawned.iter().copied().collect();
    assert_eq!(unique.len(), expected, "no id handed out twice");

    assert!(world.entity_capacity() >= SEEDS as usize + expected);
    for &e in spawned.iter() {
        assert!(world.is_alive(e));
        assert_eq!(world.get_component(e, setup.payload).unwrap(), pattern(e.raw()).to_vec());
    }
}

#[test]
fn test_concurrent_process_system_merges_every_spawn() {
    let setup = setup(Some(Arc::new(Barrier::new(2))));
    assert_eq!(setup.world.entity_capacity(), SEEDS as usize);

    std::thread::scope(|scope| {
        for &system in &setup.breeders {
            let world = &setup.world;
            scope.spawn(move || world.process_system(system, 0.0).unwrap());
        }
    });

    assert_rows_intact(&setup, (2 * SEEDS * SPAWNS_PER_SUBSCRIBER) as usize);
}

#[test]
fn test_sequential_sweep_merges_once() {
    let setup = setup(None);
    for &system in &setup.breeders {
        setup.world.process_system(system, 0.0).unwrap();
    }
    assert_rows_intact(&setup, (2 * SEEDS * SPAWNS_PER_SUBSCRIBER) as usize);
}

#[test]
fn test_repeated_concurrent_rounds() {
    let setup = setup(Some(Arc::new(Barrier::new(2))));
    for _ in 0..3 {
        std::thread::scope(|scope| {
            for &system in &setup.breeders {
                let world = &setup.world;
                scope.spawn(move || world.process_system(system, 0.0).unwrap());
            }
        });
    }
    assert_rows_intact(&setup, (3 * 2 * SEEDS * SPAWNS_PER_SUBSCRIBER) as usize);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_sweep_with_spawning_systems() {
    let mut world = World::new();
    let seed = world.register_component("seed", 0, Storage::Inline).unwrap();
    let payload = world.register_component("payload", 16, Storage::Inline).unwrap();
    let spawned = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..4 {
        let id = world
            .register_system(
                Breeder {
                    payload,
                    spawned: spawned.clone(),
                    barrier: None,
                },
                SystemMode::Normal,
            )
            .unwrap();
        world.watch(id, seed).unwrap();
    }
    world.initialize().unwrap();
    let e = world.spawn().unwrap();
    world.set_component(e, seed, None).unwrap();
    world.signal(e, Signal::Added).unwrap();

    world.process_parallel(0.0).unwrap();

    assert_eq!(world.pending_rows(), 0);
    let spawned = spawned.lock();
    assert_eq!(spawned.len(), 4 * SPAWNS_PER_SUBSCRIBER as usize);
    for &child in spawned.iter() {
        assert_eq!(world.get_component(child, payload).unwrap(), pattern(child.raw()).to_vec());
    }
}
