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
//! Entity and registry identifiers
//!
//! Entities are plain integer ids. No entity object exists: everything an
//! entity carries lives in its row of the entity table, and its lifecycle is
//! tracked by which staging sets and subscriber sets its id belongs to.

use std::fmt;

/// Identifier of an entity (an index into the entity table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u32);

impl Entity {
    /// Create an entity handle from a raw id
    pub fn new(id: u32) -> Self {
        Entity(id)
    }

    /// Get the raw id
    pub fn raw(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

macro_rules! registry_id {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// Get the raw registration index
            pub fn raw(&self) -> u32 {
                self.0
            }

            pub(crate) fn from_index(index: usize) -> Self {
                $name(index as u32)
            }

            pub(crate) fn index(&self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

registry_id!(
    /// Identifier returned by component registration
    ComponentId,
    "Component"
);
registry_id!(
    /// Identifier returned by system registration
    SystemId,
    "System"
);
registry_id!(
    /// Identifier returned by manager registration
    ManagerId,
    "Manager"
);
