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
//! Component storage modes through the public API

use ecs_runtime::ecs::{ComponentId, Entity, Storage, World, WorldConfig};
use ecs_runtime::pool::PoolConfig;
use ecs_runtime::Error;

fn payload(seed: u32, size: usize) -> Vec<u8> {
    (0..size).map(|i| (seed as usize * 31 + i) as u8).collect()
}

fn storage_world(storage: Storage) -> (World, ComponentId, ComponentId) {
    let config = WorldConfig::new(2).with_pool_config(PoolConfig::new(1));
    let mut world = World::with_config(config);
    let padding = world.register_component("padding", 3, Storage::Inline).unwrap();
    let data = world.register_component("data", 24, storage).unwrap();
    world.initialize().unwrap();
    (world, padding, data)
}

#[test]
fn test_round_trip_survives_table_and_pool_growth() {
    for storage in [
        Storage::Inline,
        Storage::indexed(),
        Storage::multiple(),
        Storage::limited(64),
        Storage::multiple_limited(64),
    ] {
        let (world, padding, data) = storage_world(storage);
        let mut entities = Vec::new();
        for seed in 0..40u32 {
            let e = world.spawn().unwrap();
            world.set_component(e, padding, Some(&[seed as u8; 3])).unwrap();
            world.set_component(e, data, Some(&payload(seed, 24))).unwrap();
            entities.push(e);
        }
        for (seed, &e) in entities.iter().enumerate() {
            assert_eq!(
                world.get_component(e, data).unwrap(),
                payload(seed as u32, 24),
                "{:?} entity {}",
                storage,
                e
            );
            assert_eq!(world.get_component(e, padding).unwrap(), vec![seed as u8; 3]);
        }
    }
}

#[test]
fn test_limited_component_rejects_then_reuses() {
    let (world, _, data) = storage_world(Storage::multiple_limited(3));
    let e = world.spawn().unwrap();
    for seed in 0..3 {
        world.append_component(e, data, Some(&payload(seed, 24))).unwrap();
    }
    assert!(matches!(
        world.append_component(e, data, Some(&payload(3, 24))),
        Err(Error::FullComponent { capacity: 3, .. })
    ));
    assert_eq!(world.get_component_count(e, data).unwrap(), 3);

    world.remove_component_at(e, data, 1).unwrap();
    world.append_component(e, data, Some(&payload(9, 24))).unwrap();
    assert_eq!(world.get_component_at(e, data, 2).unwrap(), payload(9, 24));
    assert_eq!(world.get_component_at(e, data, 1).unwrap(), payload(2, 24));

    let stats = world.pool_stats(data).unwrap();
    assert_eq!(stats.live, 3);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_limited_indexed_component_across_entities() {
    let (world, _, data) = storage_world(Storage::limited(2));
    let a = world.spawn().unwrap();
    let b = world.spawn().unwrap();
    let c = world.spawn().unwrap();
    world.set_component(a, data, None).unwrap();
    world.set_component(b, data, None).unwrap();
    assert!(matches!(
        world.set_component(c, data, None),
        Err(Error::FullComponent { .. })
    ));

    world.remove_component(a, data).unwrap();
    world.set_component(c, data, Some(&payload(5, 24))).unwrap();
    assert_eq!(world.get_component(c, data).unwrap(), payload(5, 24));
    assert!(!world.has_component(a, data));
}

#[test]
fn test_released_slots_are_zeroed_for_the_next_owner() {
    let (world, _, data) = storage_world(Storage::indexed());
    let a = world.spawn().unwrap();
    world.set_component(a, data, Some(&payload(1, 24))).unwrap();
    world.remove_component(a, data).unwrap();

    let b = world.spawn().unwrap();
    world.set_component(b, data, None).unwrap();
    assert_eq!(world.get_component(b, data).unwrap(), vec![0; 24]);
    assert_eq!(world.pool_stats(data).unwrap().hits, 1);
}

#[test]
fn test_zero_sized_components_act_as_tags() {
    let mut world = World::new();
    let tag = world.register_component("tag", 0, Storage::Inline).unwrap();
    let marks = world.register_component("marks", 0, Storage::multiple()).unwrap();
    world.initialize().unwrap();

    let e = world.spawn().unwrap();
    world.set_component(e, tag, None).unwrap();
    world.append_component(e, marks, None).unwrap();
    world.append_component(e, marks, None).unwrap();
    assert!(world.has_component(e, tag));
    assert_eq!(world.get_component(e, tag).unwrap(), Vec::<u8>::new());
    assert_eq!(world.get_component_count(e, marks).unwrap(), 2);
}

#[test]
fn test_many_components_use_a_wider_mask() {
    let mut world = World::new();
    let components: Vec<_> = (0..20)
        .map(|i| world.register_component(&format!("c{}", i), 1, Storage::Inline).unwrap())
        .collect();
    world.initialize().unwrap();

    let e = world.spawn().unwrap();
    for (i, &c) in components.iter().enumerate().filter(|(i, _)| i % 3 == 0) {
        world.set_component(e, c, Some(&[i as u8])).unwrap();
    }
    for (i, &c) in components.iter().enumerate() {
        assert_eq!(world.has_component(e, c), i % 3 == 0);
    }
    assert_eq!(world.get_component(e, components[18]).unwrap(), vec![18]);
    assert!(!world.has_component(Entity::new(5), components[0]));
}
