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
//! Flat entity row storage
//!
//! All rows live in one contiguous byte buffer of `stride * capacity` bytes.
//! When a fresh id does not fit:
//! - outside processing, the buffer is reallocated (~1.5x) and existing bytes
//!   copied;
//! - while systems are processing, the row is allocated on its own and parked
//!   in the processing buffer, so readers of the main buffer never see it move.
//!
//! Parked rows are copied into the main buffer by [`EntityTable::merge`] once
//! processing has drained. While rows are parked the capacity never changes,
//! which keeps the `capacity + i` addressing of parked rows stable.

use crate::ecs::Entity;
use crate::error::{Error, Result};

pub(crate) struct EntityTable {
    stride: usize,
    rows: Vec<u8>,
    capacity: usize,
    height: usize,
    pending: Vec<Box<[u8]>>,
    growth_factor: f64,
    log_growth: bool,
}

impl EntityTable {
    pub fn new(stride: usize, initial_capacity: usize, growth_factor: f64, log_growth: bool) -> Result<Self> {
        let mut table = EntityTable {
            growth_factor,
            log_growth,
            ..EntityTable::empty(stride)
        };
        table.reserve_rows(initial_capacity)?;
        Ok(table)
    }

    /// Table with no rows reserved
    pub fn empty(stride: usize) -> Self {
        EntityTable {
            stride,
            rows: Vec::new(),
            capacity: 0,
            height: 0,
            pending: Vec::new(),
            growth_factor: 1.5,
            log_growth: false,
        }
    }

    /// One past the highest id ever handed a row
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows backed by the main buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rows parked in the processing buffer
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        entity.index() < self.height
    }

    /// Give `entity` a zeroed row
    ///
    /// Fresh ids are handed out sequentially, so a fresh id that does not fit
    /// is always the next one past the main buffer and the parked rows.
    pub fn make_room(&mut self, entity: Entity, in_flight: bool) -> Result<()> {
        let i = entity.index();
        if i < self.capacity + self.pending.len() {
            self.row_mut(entity).fill(0);
        } else if in_flight {
            debug_assert_eq!(i, self.capacity + self.pending.len());
            let mut row = Vec::new();
            row.try_reserve_exact(self.stride)?;
            row.resize(self.stride, 0);
            self.pending.push(row.into_boxed_slice());
        } else {
            self.merge()?;
            self.grow(i + 1)?;
        }
        self.height = self.height.max(i + 1);
        Ok(())
    }

    pub fn row(&self, entity: Entity) -> &[u8] {
        let i = entity.index();
        if i < self.capacity {
            &self.rows[i * self.stride..(i + 1) * self.stride]
        } else {
            &self.pending[i - self.capacity]
        }
    }

    pub fn row_mut(&mut self, entity: Entity) -> &mut [u8] {
        let i = entity.index();
        if i < self.capacity {
            &mut self.rows[i * self.stride..(i + 1) * self.stride]
        } else {
            &mut self.pending[i - self.capacity]
        }
    }

    /// Copy parked rows into the main buffer, returning how many moved
    pub fn merge(&mut self) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let base = self.capacity;
        let count = self.pending.len();
        self.grow(base + count)?;
        for (i, row) in self.pending.drain(..).enumerate() {
            let start = (base + i) * self.stride;
            self.rows[start..start + self.stride].copy_from_slice(&row);
        }
        log::debug!("merged {} buffered rows into the entity table", count);
        Ok(count)
    }

    /// Forget every row, keeping the main buffer allocated
    pub fn clear(&mut self) {
        self.rows.fill(0);
        self.pending.clear();
        self.height = 0;
    }

    fn grow(&mut self, min_rows: usize) -> Result<()> {
        if min_rows <= self.capacity {
            return Ok(());
        }
        let target = ((min_rows as f64) * self.growth_factor).ceil() as usize;
        let target = target.max(min_rows);
        self.reserve_rows(target)?;
        if self.log_growth {
            log::info!("entity table grew to {} rows ({} bytes each)", target, self.stride);
        } else {
            log::debug!("entity table grew to {} rows ({} bytes each)", target, self.stride);
        }
        Ok(())
    }

    fn reserve_rows(&mut self, rows: usize) -> Result<()> {
        if rows <= self.capacity {
            return Ok(());
        }
        let bytes = rows.checked_mul(self.stride).ok_or(Error::OutOfMemory)?;
        self.rows.try_reserve_exact(bytes - self.rows.len())?;
        self.rows.resize(bytes, 0);
        self.capacity = rows;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(capacity: usize) -> EntityTable {
        EntityTable::new(4, capacity, 1.5, false).unwrap()
    }

    #[test]
    fn test_rows_start_zeroed() {
        let mut t = table(2);
        t.make_room(Entity::new(0), false).unwrap();
        assert_eq!(t.row(Entity::new(0)), &[0, 0, 0, 0]);
        assert_eq!(t.height(), 1);
        assert!(t.contains(Entity::new(0)));
        assert!(!t.contains(Entity::new(1)));
    }

    #[test]
    fn test_growth_preserves_rows() {
        let mut t = table(1);
        for id in 0..10u32 {
            let e = Entity::new(id);
            t.make_room(e, false).unwrap();
            t.row_mut(e).copy_from_slice(&id.to_le_bytes());
        }
        assert!(t.capacity() >= 10);
        for id in 0..10u32 {
            assert_eq!(t.row(Entity::new(id)), &id.to_le_bytes());
        }
    }

    #[test]
    fn test_in_flight_rows_are_parked_then_merged() {
        let mut t = table(2);
        t.make_room(Entity::new(0), false).unwrap();
        t.make_room(Entity::new(1), false).unwrap();
        t.row_mut(Entity::new(1)).copy_from_slice(&[1, 1, 1, 1]);

        for id in 2..5u32 {
            let e = Entity::new(id);
            t.make_room(e, true).unwrap();
            t.row_mut(e).copy_from_slice(&[id as u8; 4]);
        }
        assert_eq!(t.capacity(), 2, "main buffer must not move while in flight");
        assert_eq!(t.pending(), 3);
        assert_eq!(t.row(Entity::new(3)), &[3, 3, 3, 3]);

        assert_eq!(t.merge().unwrap(), 3);
        assert_eq!(t.pending(), 0);
        assert!(t.capacity() >= 5);
        assert_eq!(t.row(Entity::new(1)), &[1, 1, 1, 1]);
        for id in 2..5u32 {
            assert_eq!(t.row(Entity::new(id)), &[id as u8; 4]);
        }
        assert_eq!(t.merge().unwrap(), 0);
    }

    #[test]
    fn test_growth_outside_processing_absorbs_parked_rows() {
        let mut t = table(1);
        t.make_room(Entity::new(0), false).unwrap();
        t.make_room(Entity::new(1), true).unwrap();
        t.row_mut(Entity::new(1)).copy_from_slice(&[7; 4]);

        t.make_room(Entity::new(2), false).unwrap();
        assert_eq!(t.pending(), 0);
        assert_eq!(t.row(Entity::new(1)), &[7; 4]);
        assert_eq!(t.row(Entity::new(2)), &[0; 4]);
    }

    #[test]
    fn test_recycled_row_is_zeroed() {
        let mut t = table(4);
        let e = Entity::new(0);
        t.make_room(e, false).unwrap();
        t.row_mut(e).copy_from_slice(&[9; 4]);
        t.make_room(e, false).unwrap();
        assert_eq!(t.row(e), &[0; 4]);
        assert_eq!(t.height(), 1);
    }

    #[test]
    fn test_clear() {
        let mut t = table(2);
        t.make_room(Entity::new(0), false).unwrap();
        t.make_room(Entity::new(1), false).unwrap();
        t.make_room(Entity::new(2), true).unwrap();
        t.clear();
        assert_eq!(t.height(), 0);
        assert_eq!(t.pending(), 0);
    }
}
