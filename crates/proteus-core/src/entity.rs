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

//! The engine-side registry of live scripted entities.

use crate::instance::InstanceRef;

/// The engine's book of live scripted entities.
///
/// A reload session walks a snapshot of this registry, migrates each entity
/// into the new universe, and re-registers the result. The contract is
/// strict: unregistering an unknown entity or registering a duplicate means
/// engine and script state have already diverged, and implementations panic
/// rather than continue on a corrupt book.
pub trait EntityRegistry {
    /// Returns a snapshot of every registered entity, in registration order.
    fn all(&self) -> Vec<InstanceRef>;

    /// Removes one entity.
    ///
    /// # Panics
    ///
    /// If the entity is not registered.
    fn unregister(&mut self, entity: InstanceRef);

    /// Adds one entity.
    ///
    /// # Panics
    ///
    /// If the entity is already registered.
    fn register(&mut self, entity: InstanceRef);
}

/// The insertion-ordered registry used by the runtime and by tests.
#[derive(Debug, Default)]
pub struct LiveEntityRegistry {
    entities: Vec<InstanceRef>,
}

impl LiveEntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if no entity is registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// True if `entity` is currently registered.
    pub fn contains(&self, entity: InstanceRef) -> bool {
        self.entities.contains(&entity)
    }
}

impl EntityRegistry for LiveEntityRegistry {
    fn all(&self) -> Vec<InstanceRef> {
        self.entities.clone()
    }

    fn unregister(&mut self, entity: InstanceRef) {
        match self.entities.iter().position(|e| *e == entity) {
            Some(index) => {
                self.entities.remove(index);
                log::trace!("Unregistered entity {entity}.");
            }
            None => panic!("entity {entity} is not registered"),
        }
    }

    fn register(&mut self, entity: InstanceRef) {
        if self.contains(entity) {
            panic!("entity {entity} is already registered");
        }
        self.entities.push(entity);
        log::trace!("Registered entity {entity}.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{ObjectId, UniverseId};

    fn entity(universe: UniverseId, index: u32) -> InstanceRef {
        InstanceRef::new(universe, ObjectId(index))
    }

    #[test]
    fn snapshot_preserves_registration_order() {
        let universe = UniverseId::new();
        let mut registry = LiveEntityRegistry::new();

        registry.register(entity(universe, 2));
        registry.register(entity(universe, 0));
        registry.register(entity(universe, 1));

        let snapshot = registry.all();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].object, ObjectId(2));
        assert_eq!(snapshot[1].object, ObjectId(0));
        assert_eq!(snapshot[2].object, ObjectId(1));
    }

    #[test]
    fn unregister_removes_only_the_given_entity() {
        let universe = UniverseId::new();
        let mut registry = LiveEntityRegistry::new();
        registry.register(entity(universe, 0));
        registry.register(entity(universe, 1));

        registry.unregister(entity(universe, 0));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(entity(universe, 1)));
        assert!(!registry.contains(entity(universe, 0)));
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn unregister_unknown_entity_panics() {
        let mut registry = LiveEntityRegistry::new();
        registry.unregister(entity(UniverseId::new(), 0));
    }

    #[test]
    #[should_panic(expected = "is already registered")]
    fn double_register_panics() {
        let universe = UniverseId::new();
        let mut registry = LiveEntityRegistry::new();
        registry.register(entity(universe, 0));
        registry.register(entity(universe, 0));
    }
}
