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
//! Sparse integer set
//!
//! A dense array holds the members in insertion order (modulo swap-removal)
//! and a sparse array maps each value back to its dense position. Membership
//! is valid only when both arrays agree, so clearing is just resetting the
//! population.

use super::grown_capacity;

/// O(1) integer set with ordered iteration and pop
#[derive(Debug, Clone, Default)]
pub struct SparseSet {
    dense: Vec<u32>,
    sparse: Vec<u32>,
    population: usize,
}

impl SparseSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set able to hold values below `capacity` without growing
    pub fn with_capacity(capacity: usize) -> Self {
        SparseSet {
            dense: vec![0; capacity],
            sparse: vec![0; capacity],
            population: 0,
        }
    }

    /// Number of values the set can hold before it has to grow
    pub fn capacity(&self) -> usize {
        self.sparse.len()
    }

    /// Number of values currently in the set
    pub fn len(&self) -> usize {
        self.population
    }

    /// Whether the set holds no values
    pub fn is_empty(&self) -> bool {
        self.population == 0
    }

    /// Check whether `value` is a member
    pub fn contains(&self, value: u32) -> bool {
        let i = value as usize;
        if i >= self.sparse.len() {
            return false;
        }
        let slot = self.sparse[i] as usize;
        slot < self.population && self.dense[slot] == value
    }

    /// Insert `value`, returning `true` if it was not already present
    pub fn insert(&mut self, value: u32) -> bool {
        let i = value as usize;
        if i >= self.sparse.len() {
            let capacity = grown_capacity(i);
            self.dense.resize(capacity, 0);
            self.sparse.resize(capacity, 0);
        }
        if self.contains(value) {
            return false;
        }
        let n = self.population;
        self.sparse[i] = n as u32;
        self.dense[n] = value;
        self.population = n + 1;
        true
    }

    /// Remove `value`, returning `true` if it was present
    ///
    /// The last dense element takes the removed element's place.
    pub fn remove(&mut self, value: u32) -> bool {
        if !self.contains(value) {
            return false;
        }
        let slot = self.sparse[value as usize] as usize;
        let last = self.population - 1;
        let moved = self.dense[last];
        self.dense[slot] = moved;
        self.sparse[moved as usize] = slot as u32;
        self.population = last;
        true
    }

    /// Remove and return the most recently placed value
    pub fn pop(&mut self) -> Option<u32> {
        if self.population == 0 {
            return None;
        }
        self.population -= 1;
        Some(self.dense[self.population])
    }

    /// Remove every value without touching storage
    pub fn clear(&mut self) {
        self.population = 0;
    }

    /// Members in dense order
    pub fn as_slice(&self) -> &[u32] {
        &self.dense[..self.population]
    }

    /// Iterate over members in dense order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.as_slice().iter().copied()
    }

    /// Copy the members out and clear the set
    pub fn take(&mut self) -> Vec<u32> {
        let members = self.as_slice().to_vec();
        self.clear();
        members
    }
}
