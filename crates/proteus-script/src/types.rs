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

//! Type definitions describing one compiled script universe.
//!
//! Everything here is the compiler's output format and derives serde: the
//! compiler writes a [`UniverseDefs`] artifact, the engine reads it back
//! and registers it as a [`crate::TypeUniverse`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a script value slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// Unicode scalar.
    Char,
    /// Immutable string. Treated as a scalar: copied verbatim, never
    /// migrated structurally.
    Str,
    /// Value aggregate, identified by its fully qualified type name.
    Struct(String),
    /// Reference to a heap object of the named class (or a subclass).
    Class(String),
    /// Growable list of homogeneous elements.
    List(Box<ValueType>),
    /// Keyed collection with insertion-ordered entries.
    Map(Box<ValueType>, Box<ValueType>),
    /// Fixed-length array of homogeneous elements.
    Array(Box<ValueType>),
    /// Function reference. Not migratable: bound code belongs to the old
    /// universe and must be rebound by the scripts themselves.
    Delegate,
}

impl ValueType {
    /// True for the scalar kinds copied verbatim across universes.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ValueType::Bool | ValueType::Int | ValueType::Float | ValueType::Char | ValueType::Str
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Char => write!(f, "char"),
            ValueType::Str => write!(f, "str"),
            ValueType::Struct(name) => write!(f, "{name}"),
            ValueType::Class(name) => write!(f, "{name}"),
            ValueType::List(elem) => write!(f, "list<{elem}>"),
            ValueType::Map(key, value) => write!(f, "map<{key}, {value}>"),
            ValueType::Array(elem) => write!(f, "array<{elem}>"),
            ValueType::Delegate => write!(f, "delegate"),
        }
    }
}

/// Whether a type is a reference type or a value aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    /// Heap-allocated reference type with an optional base class.
    Class {
        /// Fully qualified name of the base class, if any.
        base: Option<String>,
    },
    /// Value aggregate with no identity and no inheritance.
    Struct,
}

/// A field declared by a script type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Member name.
    pub name: String,
    /// Declared type.
    pub ty: ValueType,
    /// True for type-level storage.
    #[serde(default)]
    pub is_static: bool,
    /// Script author opted this field out of migration.
    #[serde(default)]
    pub skip_upgrade: bool,
    /// Compiler-generated backing storage; never migrated directly.
    #[serde(default)]
    pub synthesized: bool,
}

/// A property declared by a script type.
///
/// Properties migrate only when they behave like plain storage: both
/// accessors present, a zero-argument getter, and a named backing slot.
/// Indexers and computed properties fail those checks and yield no
/// descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Member name.
    pub name: String,
    /// Declared type.
    pub ty: ValueType,
    /// True for type-level storage.
    #[serde(default)]
    pub is_static: bool,
    /// A getter accessor exists.
    pub has_getter: bool,
    /// A setter accessor exists.
    pub has_setter: bool,
    /// Number of getter parameters; non-zero marks an indexer.
    #[serde(default)]
    pub getter_arity: u8,
    /// Name of the backing slot, when the property is auto-implemented.
    pub backing: Option<String>,
}

/// One member of a script type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberDef {
    /// A field.
    Field(FieldDef),
    /// A property.
    Property(PropertyDef),
}

impl MemberDef {
    /// Member name.
    pub fn name(&self) -> &str {
        match self {
            MemberDef::Field(field) => &field.name,
            MemberDef::Property(property) => &property.name,
        }
    }

    /// Declared type.
    pub fn ty(&self) -> &ValueType {
        match self {
            MemberDef::Field(field) => &field.ty,
            MemberDef::Property(property) => &property.ty,
        }
    }

    /// True for type-level storage.
    pub fn is_static(&self) -> bool {
        match self {
            MemberDef::Field(field) => field.is_static,
            MemberDef::Property(property) => property.is_static,
        }
    }
}

/// One script type, as the compiler defined it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Fully qualified name; the pairing key across universes.
    pub name: String,
    /// Reference type or value aggregate.
    pub kind: TypeKind,
    /// Declared members, in declaration order.
    pub members: Vec<MemberDef>,
    /// Engine event names instances of this type subscribe to.
    #[serde(default)]
    pub event_handlers: Vec<String>,
}

impl TypeDef {
    /// True for reference types.
    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class { .. })
    }

    /// The base class name, if this is a derived class.
    pub fn base(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Class { base } => base.as_deref(),
            TypeKind::Struct => None,
        }
    }

    /// Looks up a declared member by name.
    pub fn member(&self, name: &str) -> Option<&MemberDef> {
        self.members.iter().find(|member| member.name() == name)
    }
}

/// The serializable payload of one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UniverseDefs {
    /// Every type the compilation produced.
    pub types: Vec<TypeDef>,
}

impl UniverseDefs {
    /// Wraps a list of type definitions.
    pub fn new(types: Vec<TypeDef>) -> Self {
        Self { types }
    }

    /// Serializes the definitions to the JSON artifact format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reads definitions back from the JSON artifact format.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
