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

//! Fluent construction of universe definitions.
//!
//! Production definitions come out of the script compiler; this builder is
//! for everything else: tests, stub compilers, and the demo. It produces
//! the same [`UniverseDefs`] payload a real compilation would.

use crate::types::{FieldDef, MemberDef, PropertyDef, TypeDef, TypeKind, UniverseDefs, ValueType};
use crate::universe::TypeUniverse;

/// Accumulates type definitions for one universe.
#[derive(Debug, Default)]
pub struct UniverseBuilder {
    types: Vec<TypeDef>,
}

impl UniverseBuilder {
    /// Starts an empty definition set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a class with no base.
    pub fn class(self, name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(self, name.into(), TypeKind::Class { base: None })
    }

    /// Opens a class deriving from `base`.
    pub fn derived_class(self, name: impl Into<String>, base: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(
            self,
            name.into(),
            TypeKind::Class {
                base: Some(base.into()),
            },
        )
    }

    /// Opens a value-aggregate struct.
    pub fn struct_type(self, name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(self, name.into(), TypeKind::Struct)
    }

    /// Finishes into the serializable definition payload.
    pub fn build_defs(self) -> UniverseDefs {
        UniverseDefs::new(self.types)
    }

    /// Finishes and registers the definitions as a fresh universe.
    pub fn build(self) -> TypeUniverse {
        TypeUniverse::from_defs(&self.build_defs())
    }
}

/// Accumulates the members of one type, then returns to its
/// [`UniverseBuilder`].
#[derive(Debug)]
pub struct TypeBuilder {
    universe: UniverseBuilder,
    def: TypeDef,
}

impl TypeBuilder {
    fn new(universe: UniverseBuilder, name: String, kind: TypeKind) -> Self {
        Self {
            universe,
            def: TypeDef {
                name,
                kind,
                members: Vec::new(),
                event_handlers: Vec::new(),
            },
        }
    }

    fn push_field(mut self, name: String, ty: ValueType, is_static: bool, skip: bool, synthesized: bool) -> Self {
        self.def.members.push(MemberDef::Field(FieldDef {
            name,
            ty,
            is_static,
            skip_upgrade: skip,
            synthesized,
        }));
        self
    }

    /// Adds an instance field.
    pub fn with_field(self, name: impl Into<String>, ty: ValueType) -> Self {
        self.push_field(name.into(), ty, false, false, false)
    }

    /// Adds a type-level field.
    pub fn with_static_field(self, name: impl Into<String>, ty: ValueType) -> Self {
        self.push_field(name.into(), ty, true, false, false)
    }

    /// Adds an instance field the script author opted out of migration.
    pub fn with_skipped_field(self, name: impl Into<String>, ty: ValueType) -> Self {
        self.push_field(name.into(), ty, false, true, false)
    }

    /// Adds a compiler-generated instance field.
    pub fn with_synthesized_field(self, name: impl Into<String>, ty: ValueType) -> Self {
        self.push_field(name.into(), ty, false, false, true)
    }

    /// Adds an auto-implemented instance property with the given backing
    /// slot.
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        ty: ValueType,
        backing: impl Into<String>,
    ) -> Self {
        self.def.members.push(MemberDef::Property(PropertyDef {
            name: name.into(),
            ty,
            is_static: false,
            has_getter: true,
            has_setter: true,
            getter_arity: 0,
            backing: Some(backing.into()),
        }));
        self
    }

    /// Adds an auto-implemented type-level property with the given backing
    /// slot.
    pub fn with_static_property(
        mut self,
        name: impl Into<String>,
        ty: ValueType,
        backing: impl Into<String>,
    ) -> Self {
        self.def.members.push(MemberDef::Property(PropertyDef {
            name: name.into(),
            ty,
            is_static: true,
            has_getter: true,
            has_setter: true,
            getter_arity: 0,
            backing: Some(backing.into()),
        }));
        self
    }

    /// Adds a computed property (getter only, no storage).
    pub fn with_computed_property(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.def.members.push(MemberDef::Property(PropertyDef {
            name: name.into(),
            ty,
            is_static: false,
            has_getter: true,
            has_setter: false,
            getter_arity: 0,
            backing: None,
        }));
        self
    }

    /// Adds an indexer (parameterized getter).
    pub fn with_indexer(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.def.members.push(MemberDef::Property(PropertyDef {
            name: name.into(),
            ty,
            is_static: false,
            has_getter: true,
            has_setter: true,
            getter_arity: 1,
            backing: None,
        }));
        self
    }

    /// Adds an arbitrary member, for shapes the shorthands do not cover.
    pub fn with_member(mut self, member: MemberDef) -> Self {
        self.def.members.push(member);
        self
    }

    /// Declares that instances of this type handle the named engine event.
    pub fn with_event_handler(mut self, event: impl Into<String>) -> Self {
        self.def.event_handlers.push(event.into());
        self
    }

    /// Closes this type and returns to the universe builder.
    pub fn finish(mut self) -> UniverseBuilder {
        self.universe.types.push(self.def);
        self.universe
    }
}
