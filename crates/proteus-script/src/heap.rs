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

//! The object heap of one type universe.

use crate::value::Value;
use proteus_core::ObjectId;
use std::collections::HashMap;

/// One live object: its concrete type and its storage slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInstance {
    /// Fully qualified name of the concrete runtime type.
    pub type_name: String,
    /// Storage slots, keyed by slot name.
    pub slots: HashMap<String, Value>,
}

impl ObjectInstance {
    /// Creates an instance with no slots yet.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            slots: HashMap::new(),
        }
    }

    /// Reads one slot.
    pub fn slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    /// Writes one slot, inserting it if it does not exist.
    pub fn set_slot(&mut self, name: impl Into<String>, value: Value) {
        self.slots.insert(name.into(), value);
    }
}

/// The append-only object store of one universe.
///
/// Objects are never freed individually: a universe's heap lives and dies
/// with the universe, so an [`ObjectId`] stays valid for the universe's
/// whole lifetime and identity comparisons are plain index comparisons.
#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<ObjectInstance>,
}

impl Heap {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one object and returns its id.
    pub fn alloc(&mut self, instance: ObjectInstance) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(instance);
        id
    }

    /// Reads one object.
    pub fn get(&self, id: ObjectId) -> Option<&ObjectInstance> {
        self.objects.get(id.index())
    }

    /// Mutably borrows one object.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ObjectInstance> {
        self.objects.get_mut(id.index())
    }

    /// Number of objects ever allocated.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when nothing was ever allocated.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates every object with its id, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ObjectInstance)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, instance)| (ObjectId(index as u32), instance))
    }
}
