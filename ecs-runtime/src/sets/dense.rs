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
//! Dense bitset
//!
//! A growable bit-per-id membership set built on `fixedbitset`. Insert and
//! remove report whether they changed anything, which lets callers skip
//! notifications for no-op transitions.

use super::grown_capacity;
use fixedbitset::FixedBitSet;

/// Compact membership set for read-heavy id populations
#[derive(Debug, Clone, Default)]
pub struct DenseBitset {
    bits: FixedBitSet,
}

impl DenseBitset {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set able to hold ids below `capacity` without growing
    pub fn with_capacity(capacity: usize) -> Self {
        DenseBitset {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Number of ids the set can hold before it has to grow
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Check whether `id` is a member
    pub fn contains(&self, id: u32) -> bool {
        self.bits.contains(id as usize)
    }

    /// Insert `id`, returning `true` if the bit was previously clear
    pub fn insert(&mut self, id: u32) -> bool {
        let i = id as usize;
        if i >= self.bits.len() {
            self.bits.grow(grown_capacity(i));
        }
        !self.bits.put(i)
    }

    /// Remove `id`, returning `true` if the bit was previously set
    pub fn remove(&mut self, id: u32) -> bool {
        let i = id as usize;
        if !self.bits.contains(i) {
            return false;
        }
        self.bits.set(i, false);
        true
    }

    /// Number of members (linear in capacity)
    pub fn count(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Whether no bit is set
    pub fn is_empty(&self) -> bool {
        self.bits.ones().next().is_none()
    }

    /// Clear every bit
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Iterate over members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.bits.ones().map(|i| i as u32)
    }
}
