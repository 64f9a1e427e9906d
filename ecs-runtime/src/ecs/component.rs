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
//! Component descriptors and row layout
//!
//! A component is registered with a payload size and a [`Storage`] mode. At
//! initialization the descriptors are frozen into a [`RowLayout`]: every row
//! starts with a presence bitmask (one bit per component) followed by one slot
//! per component at a fixed offset.
//!
//! | storage    | slot contents                          |
//! |------------|----------------------------------------|
//! | inline     | the payload itself                     |
//! | indexed    | `u32` index of a block in the pool     |
//! | multiple   | `u32` index of a bag of pool blocks    |
//!
//! Derived components additionally reserve one dirty byte right before their
//! slot.

use crate::ecs::{ComponentId, Entity, World};
use crate::error::Result;
use parking_lot::lock_api::RawMutex;

/// Width of the slot used by out-of-line storage modes
pub(crate) const HANDLE_WIDTH: usize = std::mem::size_of::<u32>();

/// How a component's payloads are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Payload embedded in the entity row
    Inline,
    /// Row holds one pool slot index; `limit` caps the pool size
    Indexed {
        /// Fixed pool capacity, if limited
        limit: Option<u32>,
    },
    /// Row holds a bag of pool slot indexes (0..N values per entity)
    Multiple {
        /// Fixed pool capacity, if limited
        limit: Option<u32>,
    },
}

impl Storage {
    /// Unlimited indexed storage
    pub fn indexed() -> Self {
        Storage::Indexed { limit: None }
    }

    /// Unlimited multiple-valued storage
    pub fn multiple() -> Self {
        Storage::Multiple { limit: None }
    }

    /// Indexed storage with a fixed pool of `capacity` slots
    pub fn limited(capacity: u32) -> Self {
        Storage::Indexed {
            limit: Some(capacity),
        }
    }

    /// Multiple-valued storage with a fixed pool of `capacity` slots
    pub fn multiple_limited(capacity: u32) -> Self {
        Storage::Multiple {
            limit: Some(capacity),
        }
    }

    /// Whether the payload lives in the row
    pub fn is_inline(&self) -> bool {
        matches!(self, Storage::Inline)
    }

    /// Whether an entity may carry several values
    pub fn is_multiple(&self) -> bool {
        matches!(self, Storage::Multiple { .. })
    }

    /// Fixed pool capacity, if any
    pub fn limit(&self) -> Option<u32> {
        match self {
            Storage::Inline => None,
            Storage::Indexed { limit } | Storage::Multiple { limit } => *limit,
        }
    }

    fn slot_width(&self, payload: usize) -> usize {
        match self {
            Storage::Inline => payload,
            _ => HANDLE_WIDTH,
        }
    }
}

/// Registered component type
#[derive(Debug, Clone)]
pub(crate) struct ComponentDescriptor {
    /// Human readable name
    pub name: String,
    /// Payload size in bytes
    pub size: usize,
    /// Storage mode
    pub storage: Storage,
    /// Whether the value is computed by a derive function
    pub derived: bool,
}

/// Offsets of one component inside a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotLayout {
    pub offset: usize,
    pub width: usize,
    pub dirty: Option<usize>,
}

// States of a derived component's dirty byte
const CLEAN: u8 = 0;
const STALE: u8 = 1;
const COMPUTING: u8 = 2;

/// Checked offset table shared by every row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RowLayout {
    stride: usize,
    slots: Vec<SlotLayout>,
}

impl RowLayout {
    /// Lay out the mask followed by each component's (dirty byte and) slot
    pub fn new(components: &[ComponentDescriptor]) -> Self {
        let mask_bytes = (components.len() + 7) / 8;
        let mut offset = mask_bytes;
        let slots = components
            .iter()
            .map(|c| {
                let dirty = if c.derived {
                    offset += 1;
                    Some(offset - 1)
                } else {
                    None
                };
                let width = c.storage.slot_width(c.size);
                let slot = SlotLayout { offset, width, dirty };
                offset += width;
                slot
            })
            .collect();
        RowLayout {
            stride: offset,
            slots,
        }
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn has(&self, row: &[u8], c: ComponentId) -> bool {
        let bit = c.index();
        row[bit >> 3] & (1 << (bit & 7)) != 0
    }

    pub fn mark(&self, row: &mut [u8], c: ComponentId) {
        let bit = c.index();
        row[bit >> 3] |= 1 << (bit & 7);
    }

    pub fn unmark(&self, row: &mut [u8], c: ComponentId) {
        let bit = c.index();
        row[bit >> 3] &= !(1 << (bit & 7));
    }

    pub fn slot<'r>(&self, row: &'r [u8], c: ComponentId) -> &'r [u8] {
        let s = self.slots[c.index()];
        &row[s.offset..s.offset + s.width]
    }

    pub fn slot_mut<'r>(&self, row: &'r mut [u8], c: ComponentId) -> &'r mut [u8] {
        let s = self.slots[c.index()];
        &mut row[s.offset..s.offset + s.width]
    }

    /// Pool handle stored in an out-of-line slot
    pub fn handle(&self, row: &[u8], c: ComponentId) -> u32 {
        let mut raw = [0u8; HANDLE_WIDTH];
        raw.copy_from_slice(self.slot(row, c));
        u32::from_le_bytes(raw)
    }

    pub fn set_handle(&self, row: &mut [u8], c: ComponentId, handle: u32) {
        self.slot_mut(row, c).copy_from_slice(&handle.to_le_bytes());
    }

    /// Stale or being recomputed
    pub fn is_dirty(&self, row: &[u8], c: ComponentId) -> bool {
        self.slots[c.index()].dirty.is_some_and(|d| row[d] != CLEAN)
    }

    pub fn set_dirty(&self, row: &mut [u8], c: ComponentId, dirty: bool) {
        if let Some(d) = self.slots[c.index()].dirty {
            row[d] = if dirty { STALE } else { CLEAN };
        }
    }

    /// Claim a dirty value for recomputation
    ///
    /// Any later invalidation or write moves the byte off `COMPUTING`, which
    /// tells the recompute its result is already outdated.
    pub fn set_computing(&self, row: &mut [u8], c: ComponentId) {
        if let Some(d) = self.slots[c.index()].dirty {
            row[d] = COMPUTING;
        }
    }

    pub fn is_computing(&self, row: &[u8], c: ComponentId) -> bool {
        self.slots[c.index()].dirty.is_some_and(|d| row[d] == COMPUTING)
    }
}

/// Function computing a derived component's value
///
/// Receives the world, the entity and the slot's current bytes to overwrite.
pub(crate) type DeriveFn<R> = Box<dyn Fn(&World<R>, Entity, &mut [u8]) -> Result<()> + Send + Sync>;

/// Derive functions plus the explicit "dependency -> dependents" adjacency list
pub(crate) struct Derivations<R: RawMutex> {
    functions: Vec<Option<DeriveFn<R>>>,
    dependents: Vec<Vec<ComponentId>>,
}

impl<R: RawMutex> Derivations<R> {
    pub fn new() -> Self {
        Derivations {
            functions: Vec::new(),
            dependents: Vec::new(),
        }
    }

    /// Make room for a newly registered component
    pub fn push_component(&mut self) {
        self.functions.push(None);
        self.dependents.push(Vec::new());
    }

    pub fn set_function(&mut self, c: ComponentId, function: DeriveFn<R>) {
        self.functions[c.index()] = Some(function);
    }

    pub fn function(&self, c: ComponentId) -> Option<&DeriveFn<R>> {
        self.functions[c.index()].as_ref()
    }

    /// Record that `derived` must go stale whenever `dependency` is invalidated
    pub fn depend(&mut self, derived: ComponentId, dependency: ComponentId) {
        let edges = &mut self.dependents[dependency.index()];
        if !edges.contains(&derived) {
            edges.push(derived);
        }
    }

    pub fn dependents(&self, c: ComponentId) -> &[ComponentId] {
        &self.dependents[c.index()]
    }

    /// Every component reachable from `start` (inclusive), each listed once
    pub fn stale_closure(&self, start: ComponentId) -> Vec<ComponentId> {
        let mut seen = vec![false; self.dependents.len()];
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(c) = stack.pop() {
            if std::mem::replace(&mut seen[c.index()], true) {
                continue;
            }
            order.push(c);
            stack.extend(self.dependents(c).iter().copied());
        }
        order
    }
}
