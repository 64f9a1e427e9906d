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
//! Integer set primitives
//!
//! Two flavours of id set back the runtime:
//! - [`SparseSet`]: ordered, poppable, O(1) insert/remove/contains and O(1) clear.
//!   Used for transient queues (lifecycle staging, free ids, free pool slots)
//!   and for watch/exclude lists.
//! - [`DenseBitset`]: one bit per id. Used for read-heavy membership such as
//!   the active set and per-system subscribers.

mod dense;
mod sparse;

pub use dense::DenseBitset;
pub use sparse::SparseSet;

/// Capacity to grow to when index `i` does not fit yet (~1.5x)
pub(crate) fn grown_capacity(i: usize) -> usize {
    let needed = i + 1;
    (needed + needed / 2).max(needed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grown_capacity() {
        assert_eq!(grown_capacity(0), 1);
        assert_eq!(grown_capacity(1), 3);
        assert_eq!(grown_capacity(9), 15);
    }
}
