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

//! Uniform access to migratable member storage.
//!
//! A [`MemberDescriptor`] hides what kind of member it fronts: field or
//! auto-property, instance or static. The migration engine only ever talks
//! to descriptors, so its pairing and dispatch logic has exactly one code
//! path for all four combinations.

use crate::types::{MemberDef, ValueType};
use crate::universe::TypeUniverse;
use crate::value::Value;
use proteus_core::ObjectId;

/// Which storage a descriptor access targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The slots of one heap object.
    Instance(ObjectId),
    /// The static storage of the owning type.
    TypeLevel,
}

/// One migratable member of a script type.
///
/// Built from a [`MemberDef`] by [`from_member`], which is also where the
/// migratability rules live: members that cannot be treated as plain
/// storage produce no descriptor at all, so the migration engine never has
/// to re-check them.
///
/// [`from_member`]: MemberDescriptor::from_member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    /// The type whose storage this descriptor fronts.
    pub owner: String,
    /// Member name, the pairing key across universes.
    pub name: String,
    /// Declared type, the write guard.
    pub declared: ValueType,
    /// True for type-level storage.
    pub is_static: bool,
    /// Storage slot name (the field itself, or a property's backing slot).
    pub slot: String,
}

impl MemberDescriptor {
    /// Builds the descriptor of one member, or `None` when the member is
    /// not migratable.
    ///
    /// Not migratable: fields marked to skip migration, compiler-
    /// synthesized fields, properties missing either accessor, indexers,
    /// and computed properties without a backing slot.
    pub fn from_member(owner: &str, member: &MemberDef) -> Option<Self> {
        match member {
            MemberDef::Field(field) => {
                if field.skip_upgrade || field.synthesized {
                    return None;
                }
                Some(Self {
                    owner: owner.to_string(),
                    name: field.name.clone(),
                    declared: field.ty.clone(),
                    is_static: field.is_static,
                    slot: field.name.clone(),
                })
            }
            MemberDef::Property(property) => {
                if !property.has_getter || !property.has_setter {
                    return None;
                }
                if property.getter_arity != 0 {
                    return None;
                }
                let backing = property.backing.as_ref()?;
                Some(Self {
                    owner: owner.to_string(),
                    name: property.name.clone(),
                    declared: property.ty.clone(),
                    is_static: property.is_static,
                    slot: backing.clone(),
                })
            }
        }
    }

    /// Reads the member's value, cloning it out of storage.
    ///
    /// Missing storage reads as `Null`: the caller cannot tell a fresh
    /// zeroed slot from an absent one, and does not need to.
    pub fn get(&self, universe: &TypeUniverse, target: Target) -> Value {
        if self.is_static {
            return universe
                .static_value(&self.owner, &self.slot)
                .cloned()
                .unwrap_or(Value::Null);
        }
        match target {
            Target::Instance(id) => universe
                .object(id)
                .and_then(|object| object.slot(&self.slot))
                .cloned()
                .unwrap_or(Value::Null),
            Target::TypeLevel => Value::Null,
        }
    }

    /// Writes the member's value, reporting whether the write landed.
    ///
    /// A value that is not assignable to the declared type leaves storage
    /// untouched and returns `false`: partially compatible schema changes
    /// are the normal case during live editing, not an error, and the
    /// caller decides whether the refusal is worth a diagnostic.
    pub fn set(&self, universe: &mut TypeUniverse, target: Target, value: Value) -> bool {
        if !universe.is_assignable(&self.declared, &value) {
            log::trace!(
                target: "proteus",
                "Refused write of {} value to {}::{} (declared {}).",
                value.kind_name(),
                self.owner,
                self.name,
                self.declared
            );
            return false;
        }

        if self.is_static {
            universe.set_static(&self.owner, &self.slot, value);
            return true;
        }
        match target {
            Target::Instance(id) => match universe.object_mut(id) {
                Some(object) => {
                    object.set_slot(self.slot.clone(), value);
                    true
                }
                None => false,
            },
            Target::TypeLevel => {
                log::trace!(
                    target: "proteus",
                    "Ignored type-level write to instance member {}::{}.",
                    self.owner,
                    self.name
                );
                false
            }
        }
    }
}
