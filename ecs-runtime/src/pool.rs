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
//! Slot pools for out-of-line component storage
//!
//! Indexed and multiple components keep their payloads in a [`SlotPool`]
//! instead of the entity row. Each pool is an array of fixed-size blocks plus
//! a free-index set, so released slots are recycled before the pool grows.
//! Limited pools reserve their full capacity up front and refuse to grow.

use crate::error::{Error, Result};
use crate::sets::SparseSet;

/// Configuration for slot pool growth
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of blocks reserved when the pool first grows
    pub initial_capacity: usize,
    /// Growth factor when the pool runs out of blocks (e.g., 1.5)
    pub growth_factor: f64,
    /// Whether to log when the pool grows
    pub log_resize_events: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            initial_capacity: 16,
            growth_factor: 1.5,
            log_resize_events: false,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with a custom initial capacity
    pub fn new(initial_capacity: usize) -> Self {
        PoolConfig {
            initial_capacity,
            ..PoolConfig::default()
        }
    }

    /// Enable logging for resize events
    pub fn with_logging(mut self) -> Self {
        self.log_resize_events = true;
        self
    }

    /// Set the growth factor for block capacity expansion
    pub fn with_growth_factor(mut self, factor: f64) -> Self {
        assert!(factor >= 1.0, "Growth factor must be >= 1.0");
        self.growth_factor = factor;
        self
    }
}

/// Statistics for monitoring slot reuse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolStats {
    /// Number of acquisitions served from a recycled slot
    pub hits: usize,
    /// Number of acquisitions that needed a fresh slot
    pub misses: usize,
    /// Number of times the block array was grown
    pub resize_count: usize,
    /// Slots currently handed out
    pub live: usize,
    /// Peak number of slots handed out at once
    pub peak_live: usize,
}

impl PoolStats {
    /// Calculate the reuse rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Owning handle to one block of a [`SlotPool`]
///
/// Handles are neither `Copy` nor `Clone`: a slot has exactly one owner and
/// goes back to the pool through [`SlotPool::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct SlotHandle(u32);

impl SlotHandle {
    /// Raw block index
    pub fn index(&self) -> u32 {
        self.0
    }

    /// Rebuild a handle from an index previously produced by [`SlotHandle::into_raw`]
    pub(crate) fn from_raw(index: u32) -> Self {
        SlotHandle(index)
    }

    /// Give up ownership, leaving only the raw index
    pub(crate) fn into_raw(self) -> u32 {
        self.0
    }
}

/// Fixed-stride block arena with a free-index set
#[derive(Debug)]
pub struct SlotPool {
    name: String,
    block_size: usize,
    limit: Option<u32>,
    data: Vec<u8>,
    capacity: usize,
    slots: u32,
    free: SparseSet,
    config: PoolConfig,
    stats: PoolStats,
}

impl SlotPool {
    /// Create a pool of `block_size`-byte blocks
    ///
    /// With a `limit` the pool reserves exactly that many blocks now and
    /// never grows past it.
    pub fn new(name: &str, block_size: usize, limit: Option<u32>, config: PoolConfig) -> Result<Self> {
        let mut pool = SlotPool {
            name: name.to_string(),
            block_size,
            limit,
            data: Vec::new(),
            capacity: 0,
            slots: 0,
            free: SparseSet::new(),
            config,
            stats: PoolStats::default(),
        };
        if let Some(limit) = limit {
            pool.reserve_blocks(limit as usize)?;
        }
        Ok(pool)
    }

    /// Size in bytes of one block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Fixed slot limit, if any
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Number of blocks backed by memory
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently handed out
    pub fn live(&self) -> usize {
        self.slots as usize - self.free.len()
    }

    /// Get current pool statistics
    pub fn stats(&self) -> PoolStats {
        self.stats.clone()
    }

    /// Hand out a zeroed slot, recycling released ones first
    pub fn acquire(&mut self) -> Result<SlotHandle> {
        if let Some(index) = self.free.pop() {
            self.block_mut_raw(index).fill(0);
            self.stats.hits += 1;
            self.track_live();
            return Ok(SlotHandle(index));
        }

        if let Some(limit) = self.limit {
            if self.slots >= limit {
                log::warn!("component pool '{}' exhausted at {} slots", self.name, limit);
                return Err(Error::FullComponent {
                    component: self.name.clone(),
                    capacity: limit,
                });
            }
        }

        if self.slots as usize >= self.capacity {
            let grown = (self.capacity as f64 * self.config.growth_factor).ceil() as usize;
            let target = grown.max(self.capacity + 1).max(self.config.initial_capacity);
            self.reserve_blocks(target)?;
            self.stats.resize_count += 1;
            if self.config.log_resize_events {
                log::info!("component pool '{}' grew to {} blocks", self.name, target);
            } else {
                log::debug!("component pool '{}' grew to {} blocks", self.name, target);
            }
        }

        let index = self.slots;
        self.slots += 1;
        self.stats.misses += 1;
        self.track_live();
        Ok(SlotHandle(index))
    }

    /// Return a slot to the pool
    pub fn release(&mut self, handle: SlotHandle) {
        let index = handle.into_raw();
        debug_assert!(index < self.slots, "slot {} was never handed out", index);
        let fresh = self.free.insert(index);
        debug_assert!(fresh, "slot {} released twice", index);
        self.stats.live = self.live();
    }

    /// Payload of a live slot
    pub fn get(&self, handle: &SlotHandle) -> &[u8] {
        self.block_raw(handle.0)
    }

    /// Mutable payload of a live slot
    pub fn get_mut(&mut self, handle: &SlotHandle) -> &mut [u8] {
        self.block_mut_raw(handle.0)
    }

    /// Payload by raw index, if that slot is live
    pub(crate) fn block(&self, index: u32) -> Option<&[u8]> {
        self.is_live(index).then(|| self.block_raw(index))
    }

    /// Mutable payload by raw index, if that slot is live
    pub(crate) fn block_mut(&mut self, index: u32) -> Option<&mut [u8]> {
        if self.is_live(index) {
            Some(self.block_mut_raw(index))
        } else {
            None
        }
    }

    /// Release every slot at once, keeping the reserved blocks
    pub fn clear(&mut self) {
        self.free.clear();
        self.slots = 0;
        self.data.fill(0);
        self.stats.live = 0;
    }

    fn is_live(&self, index: u32) -> bool {
        index < self.slots && !self.free.contains(index)
    }

    fn block_raw(&self, index: u32) -> &[u8] {
        let start = index as usize * self.block_size;
        &self.data[start..start + self.block_size]
    }

    fn block_mut_raw(&mut self, index: u32) -> &mut [u8] {
        let start = index as usize * self.block_size;
        &mut self.data[start..start + self.block_size]
    }

    fn reserve_blocks(&mut self, blocks: usize) -> Result<()> {
        if blocks <= self.capacity {
            return Ok(());
        }
        let bytes = blocks.checked_mul(self.block_size).ok_or(Error::OutOfMemory)?;
        self.data.try_reserve_exact(bytes - self.data.len())?;
        self.data.resize(bytes, 0);
        self.capacity = blocks;
        Ok(())
    }

    fn track_live(&mut self) {
        self.stats.live = self.live();
        if self.stats.live > self.stats.peak_live {
            self.stats.peak_live = self.stats.live;
        }
    }
}
