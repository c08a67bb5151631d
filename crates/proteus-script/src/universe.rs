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

//! One compiled type universe: its types, its heap, and its static storage.

use crate::heap::{Heap, ObjectInstance};
use crate::types::{MemberDef, TypeDef, UniverseDefs, ValueType};
use crate::value::{MapValue, StructValue, Value};
use proteus_core::{InstanceRef, ObjectId, UniverseId};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Upper bound on inheritance and struct-nesting walks. A malformed
/// definition set with a cycle stops here instead of hanging the reload.
const MAX_TYPE_DEPTH: usize = 64;

/// An error from a universe operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniverseError {
    /// The named type does not exist in this universe.
    UnknownType(String),
    /// The named type exists but cannot be heap-allocated.
    NotInstantiable(String),
}

impl fmt::Display for UniverseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniverseError::UnknownType(name) => {
                write!(f, "Unknown type '{name}' in this universe")
            }
            UniverseError::NotInstantiable(name) => {
                write!(f, "Type '{name}' is not an instantiable class")
            }
        }
    }
}

impl std::error::Error for UniverseError {}

/// The static-storage slot a member declares, if any.
fn static_slot_of(member: &MemberDef) -> Option<(String, ValueType)> {
    match member {
        MemberDef::Field(field) if field.is_static => Some((field.name.clone(), field.ty.clone())),
        MemberDef::Property(property) if property.is_static => property
            .backing
            .as_ref()
            .map(|backing| (backing.clone(), property.ty.clone())),
        _ => None,
    }
}

/// One compiled set of script types together with all of its live state.
///
/// A universe owns three things: the [`TypeDef`]s of one compilation, the
/// append-only [`Heap`] of object instances, and the static storage of
/// every type. Universes are immutable in shape after construction; only
/// their state (heap contents, slot values) changes.
#[derive(Debug)]
pub struct TypeUniverse {
    id: UniverseId,
    types: HashMap<String, TypeDef>,
    heap: Heap,
    statics: HashMap<String, HashMap<String, Value>>,
}

impl TypeUniverse {
    /// Registers a definition set as a fresh universe.
    ///
    /// Static slots are zero-initialized here, in a second pass over the
    /// registered types so a struct-typed static zeroes correctly no matter
    /// where in `defs` its struct was defined.
    pub fn from_defs(defs: &UniverseDefs) -> Self {
        let mut universe = Self {
            id: UniverseId::new(),
            types: HashMap::new(),
            heap: Heap::new(),
            statics: HashMap::new(),
        };

        for def in &defs.types {
            if universe
                .types
                .insert(def.name.clone(), def.clone())
                .is_some()
            {
                log::warn!(
                    target: "proteus",
                    "Duplicate definition of type '{}' replaces the earlier one.",
                    def.name
                );
            }
        }

        let names: Vec<String> = universe.types.keys().cloned().collect();
        for name in names {
            let layout: Vec<(String, ValueType)> = universe
                .types
                .get(&name)
                .map(|def| def.members.iter().filter_map(static_slot_of).collect())
                .unwrap_or_default();

            let mut table = HashMap::new();
            for (slot, ty) in layout {
                let zero = universe.zero_value(&ty);
                table.insert(slot, zero);
            }
            universe.statics.insert(name, table);
        }

        log::debug!(
            target: "proteus",
            "Registered universe {} with {} types.",
            universe.id,
            universe.types.len()
        );
        universe
    }

    /// This universe's id.
    pub fn id(&self) -> UniverseId {
        self.id
    }

    /// Looks a type up by its fully qualified name.
    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// True if the named type exists here.
    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Every type name, sorted so passes over the universe are
    /// deterministic.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    /// The members of a type, own first, then inherited, with derived
    /// declarations shadowing same-named base declarations.
    pub fn members_flattened(&self, type_name: &str) -> Vec<&MemberDef> {
        let mut members = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut depth = 0;
        let mut current = self.types.get(type_name);

        while let Some(def) = current {
            depth += 1;
            if depth > MAX_TYPE_DEPTH {
                log::warn!(
                    target: "proteus",
                    "Inheritance chain of '{type_name}' exceeds {MAX_TYPE_DEPTH} levels; truncating."
                );
                break;
            }
            for member in &def.members {
                if seen.insert(member.name().to_string()) {
                    members.push(member);
                }
            }
            current = def.base().and_then(|base| self.types.get(base));
        }
        members
    }

    /// True if `concrete` is `base` or transitively derives from it.
    pub fn derives_from(&self, concrete: &str, base: &str) -> bool {
        if concrete == base {
            return true;
        }
        let mut depth = 0;
        let mut current = self.types.get(concrete).and_then(|def| def.base());
        while let Some(name) = current {
            if name == base {
                return true;
            }
            depth += 1;
            if depth > MAX_TYPE_DEPTH {
                log::warn!(
                    target: "proteus",
                    "Inheritance chain of '{concrete}' exceeds {MAX_TYPE_DEPTH} levels; truncating."
                );
                return false;
            }
            current = self.types.get(name).and_then(|def| def.base());
        }
        false
    }

    /// Allocates an instance of a class with every slot at its zero value,
    /// bypassing any script constructor.
    ///
    /// Constructors run script code against collaborators that may not
    /// exist mid-reload, so migration fills state exclusively through slot
    /// writes on top of this zeroed layout.
    pub fn alloc_zero(&mut self, type_name: &str) -> Result<ObjectId, UniverseError> {
        let def = self
            .types
            .get(type_name)
            .ok_or_else(|| UniverseError::UnknownType(type_name.to_string()))?;
        if !def.is_class() {
            return Err(UniverseError::NotInstantiable(type_name.to_string()));
        }

        let layout: Vec<(String, ValueType)> = self
            .members_flattened(type_name)
            .into_iter()
            .filter_map(|member| match member {
                MemberDef::Field(field) if !field.is_static => {
                    Some((field.name.clone(), field.ty.clone()))
                }
                MemberDef::Property(property) if !property.is_static => property
                    .backing
                    .as_ref()
                    .map(|backing| (backing.clone(), property.ty.clone())),
                _ => None,
            })
            .collect();

        let mut instance = ObjectInstance::new(type_name);
        for (slot, ty) in layout {
            let zero = self.zero_value(&ty);
            instance.slots.entry(slot).or_insert(zero);
        }

        Ok(self.heap.alloc(instance))
    }

    /// The zero value of a declared type.
    ///
    /// Containers zero to empty rather than `Null`, so container-shaped
    /// slots never need a null path.
    pub fn zero_value(&self, ty: &ValueType) -> Value {
        match ty {
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Char => Value::Char('\0'),
            ValueType::Str => Value::Str(String::new()),
            ValueType::Struct(name) => match self.zero_struct(name) {
                Some(aggregate) => Value::Struct(aggregate),
                None => Value::Null,
            },
            ValueType::Class(_) | ValueType::Delegate => Value::Null,
            ValueType::List(_) => Value::List(Vec::new()),
            ValueType::Map(_, _) => Value::Map(MapValue::new()),
            ValueType::Array(_) => Value::Array(Vec::new()),
        }
    }

    /// A zeroed aggregate of the named struct type, or `None` when the
    /// name is unknown here or names a class.
    pub fn zero_struct(&self, type_name: &str) -> Option<StructValue> {
        self.zero_struct_guarded(type_name, 0)
    }

    fn zero_struct_guarded(&self, type_name: &str, depth: usize) -> Option<StructValue> {
        if depth > MAX_TYPE_DEPTH {
            log::warn!(
                target: "proteus",
                "Struct nesting of '{type_name}' exceeds {MAX_TYPE_DEPTH} levels; zeroing to null."
            );
            return None;
        }
        let def = self.types.get(type_name)?;
        if def.is_class() {
            return None;
        }

        let mut aggregate = StructValue::new(type_name);
        for member in &def.members {
            let (slot, ty) = match member {
                MemberDef::Field(field) if !field.is_static => (&field.name, &field.ty),
                MemberDef::Property(property) if !property.is_static => {
                    match &property.backing {
                        Some(backing) => (backing, &property.ty),
                        None => continue,
                    }
                }
                _ => continue,
            };
            let zero = match ty {
                ValueType::Struct(inner) => self
                    .zero_struct_guarded(inner, depth + 1)
                    .map(Value::Struct)
                    .unwrap_or(Value::Null),
                other => self.zero_value(other),
            };
            aggregate.fields.insert(slot.clone(), zero);
        }
        Some(aggregate)
    }

    /// Whether `value` may be stored in a slot declared as `declared`.
    ///
    /// Scalars match exactly; `Null` fits references and delegates; object
    /// references must point at the declared class or a subclass of it;
    /// aggregates must name the declared struct; containers match at kind
    /// level only, element compatibility being the migration engine's job.
    pub fn is_assignable(&self, declared: &ValueType, value: &Value) -> bool {
        match (declared, value) {
            (ValueType::Bool, Value::Bool(_)) => true,
            (ValueType::Int, Value::Int(_)) => true,
            (ValueType::Float, Value::Float(_)) => true,
            (ValueType::Char, Value::Char(_)) => true,
            (ValueType::Str, Value::Str(_)) => true,
            (ValueType::Struct(name), Value::Struct(aggregate)) => aggregate.type_name == *name,
            (ValueType::Class(_), Value::Null) => true,
            (ValueType::Delegate, Value::Null) => true,
            (ValueType::Class(declared_name), Value::Object(id)) => self
                .heap
                .get(*id)
                .is_some_and(|object| self.derives_from(&object.type_name, declared_name)),
            (ValueType::List(_), Value::List(_)) => true,
            (ValueType::Map(_, _), Value::Map(_)) => true,
            (ValueType::Array(_), Value::Array(_)) => true,
            _ => false,
        }
    }

    /// Reads one static slot.
    pub fn static_value(&self, type_name: &str, slot: &str) -> Option<&Value> {
        self.statics.get(type_name).and_then(|table| table.get(slot))
    }

    /// Writes one static slot. Writing to a type unknown here is a no-op.
    pub fn set_static(&mut self, type_name: &str, slot: &str, value: Value) {
        match self.statics.get_mut(type_name) {
            Some(table) => {
                table.insert(slot.to_string(), value);
            }
            None => {
                log::trace!(
                    target: "proteus",
                    "Ignored static write to unknown type '{type_name}'."
                );
            }
        }
    }

    /// This universe's heap.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Mutable access to this universe's heap.
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Reads one heap object.
    pub fn object(&self, id: ObjectId) -> Option<&ObjectInstance> {
        self.heap.get(id)
    }

    /// Mutably borrows one heap object.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut ObjectInstance> {
        self.heap.get_mut(id)
    }

    /// The engine-facing identity of one heap object.
    pub fn instance_ref(&self, object: ObjectId) -> InstanceRef {
        InstanceRef::new(self.id, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::UniverseBuilder;

    fn sample_universe() -> TypeUniverse {
        UniverseBuilder::new()
            .struct_type("game.Stats")
            .with_field("strength", ValueType::Int)
            .with_field("agility", ValueType::Float)
            .finish()
            .class("game.Actor")
            .with_field("name", ValueType::Str)
            .with_static_field("count", ValueType::Int)
            .finish()
            .derived_class("game.Player", "game.Actor")
            .with_field("health", ValueType::Int)
            .with_field("stats", ValueType::Struct("game.Stats".into()))
            .with_field("friend", ValueType::Class("game.Actor".into()))
            .with_field("inventory", ValueType::List(Box::new(ValueType::Str)))
            .finish()
            .build()
    }

    #[test]
    fn alloc_zero_fills_every_declared_slot() {
        let mut universe = sample_universe();
        let id = universe.alloc_zero("game.Player").expect("Allocation should succeed");

        let object = universe.object(id).expect("Object should exist");
        assert_eq!(object.slot("health"), Some(&Value::Int(0)));
        assert_eq!(object.slot("friend"), Some(&Value::Null));
        assert_eq!(object.slot("inventory"), Some(&Value::List(Vec::new())));
        // Inherited from game.Actor.
        assert_eq!(object.slot("name"), Some(&Value::Str(String::new())));

        match object.slot("stats") {
            Some(Value::Struct(aggregate)) => {
                assert_eq!(aggregate.field("strength"), Some(&Value::Int(0)));
                assert_eq!(aggregate.field("agility"), Some(&Value::Float(0.0)));
            }
            other => panic!("Expected zeroed struct, got {other:?}"),
        }
    }

    #[test]
    fn alloc_zero_rejects_structs_and_unknown_types() {
        let mut universe = sample_universe();

        assert_eq!(
            universe.alloc_zero("game.Stats"),
            Err(UniverseError::NotInstantiable("game.Stats".into()))
        );
        assert_eq!(
            universe.alloc_zero("game.Ghost"),
            Err(UniverseError::UnknownType("game.Ghost".into()))
        );
    }

    #[test]
    fn statics_are_zeroed_at_registration() {
        let universe = sample_universe();
        assert_eq!(
            universe.static_value("game.Actor", "count"),
            Some(&Value::Int(0))
        );
        assert_eq!(universe.static_value("game.Actor", "missing"), None);
    }

    #[test]
    fn derives_from_is_reflexive_and_walks_chains() {
        let universe = sample_universe();
        assert!(universe.derives_from("game.Player", "game.Player"));
        assert!(universe.derives_from("game.Player", "game.Actor"));
        assert!(!universe.derives_from("game.Actor", "game.Player"));
        assert!(!universe.derives_from("game.Stats", "game.Actor"));
    }

    #[test]
    fn assignability_respects_inheritance_and_nullability() {
        let mut universe = sample_universe();
        let player = universe.alloc_zero("game.Player").expect("Allocation should succeed");

        let actor_ty = ValueType::Class("game.Actor".into());
        let player_ty = ValueType::Class("game.Player".into());

        assert!(universe.is_assignable(&actor_ty, &Value::Object(player)));
        assert!(universe.is_assignable(&player_ty, &Value::Object(player)));
        assert!(universe.is_assignable(&actor_ty, &Value::Null));
        assert!(!universe.is_assignable(&ValueType::Int, &Value::Null));
        assert!(!universe.is_assignable(&ValueType::Int, &Value::Float(1.0)));
        assert!(!universe.is_assignable(&player_ty, &Value::Int(3)));
    }

    #[test]
    fn flattened_members_shadow_by_name() {
        let universe = UniverseBuilder::new()
            .class("Base")
            .with_field("value", ValueType::Int)
            .with_field("label", ValueType::Str)
            .finish()
            .derived_class("Derived", "Base")
            .with_field("value", ValueType::Float)
            .finish()
            .build();

        let members = universe.members_flattened("Derived");
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name(), "value");
        assert_eq!(members[0].ty(), &ValueType::Float);
        assert_eq!(members[1].name(), "label");
    }

    #[test]
    fn type_names_are_sorted() {
        let universe = sample_universe();
        assert_eq!(
            universe.type_names(),
            vec!["game.Actor", "game.Player", "game.Stats"]
        );
    }
}
