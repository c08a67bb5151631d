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

//! Identity tracking across a reload session.

use std::collections::HashMap;

use proteus_core::ObjectId;

/// Maps objects in the old universe to their migrated counterparts.
///
/// Every object is migrated at most once per session. The first strategy to
/// encounter an old object allocates its replacement and records the pairing
/// here before descending into the object's members, so that cycles and
/// diamond-shaped reference graphs terminate and collapse onto a single new
/// object instead of one copy per inbound reference.
#[derive(Debug, Default)]
pub struct ReferenceMap {
    entries: HashMap<ObjectId, ObjectId>,
}

impl ReferenceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Records that `old` has been migrated to `new`.
    ///
    /// Callers must record the pairing before migrating the object's own
    /// members, otherwise a reference cycle through `old` recurses forever.
    pub fn record(&mut self, old: ObjectId, new: ObjectId) {
        if let Some(previous) = self.entries.insert(old, new) {
            log::warn!(
                target: "proteus",
                "Object {old} was migrated twice (to {previous} and {new}); keeping {new}"
            );
        }
    }

    /// The migrated counterpart of `old`, if it has been migrated.
    pub fn lookup(&self, old: ObjectId) -> Option<ObjectId> {
        self.entries.get(&old).copied()
    }

    /// Number of migrated objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no object has been migrated yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_recorded_pairings() {
        let mut map = ReferenceMap::new();
        assert!(map.is_empty());

        map.record(ObjectId(0), ObjectId(4));
        map.record(ObjectId(2), ObjectId(5));

        assert_eq!(map.lookup(ObjectId(0)), Some(ObjectId(4)));
        assert_eq!(map.lookup(ObjectId(2)), Some(ObjectId(5)));
        assert_eq!(map.lookup(ObjectId(1)), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn double_record_keeps_the_latest_pairing() {
        let mut map = ReferenceMap::new();
        map.record(ObjectId(0), ObjectId(1));
        map.record(ObjectId(0), ObjectId(2));

        assert_eq!(map.lookup(ObjectId(0)), Some(ObjectId(2)));
        assert_eq!(map.len(), 1);
    }
}
