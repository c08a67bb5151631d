// Copyright 2025 eraflo
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

//! Identity types shared across the reload pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A unique identifier for one compiled type universe.
///
/// Every successful compilation produces a fresh universe, so two universes
/// never share an id even when their type definitions happen to be identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniverseId(Uuid);

impl UniverseId {
    /// Generates a new random universe id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UniverseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UniverseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The index of an object in a universe's heap.
///
/// Heaps are append-only for a universe's lifetime: ids are never recycled,
/// so a plain index is sufficient and no generation counter is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Returns the raw heap index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The identity of a live script object as seen by the engine-side
/// collaborators (entity registry, observer subsystem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceRef {
    /// The universe the object lives in.
    pub universe: UniverseId,
    /// The object's heap id inside that universe.
    pub object: ObjectId,
}

impl InstanceRef {
    /// Builds a reference from its parts.
    pub fn new(universe: UniverseId, object: ObjectId) -> Self {
        Self { universe, object }
    }
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.object, self.universe)
    }
}
