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

//! Runtime values stored in script slots.

use proteus_core::ObjectId;
use std::collections::HashMap;

/// A dynamic script value.
///
/// `Object` is the only indirection: it names a heap object in the same
/// universe the value lives in. Everything else is owned inline, so cloning
/// a value never aliases mutable state.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent reference or delegate.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Unicode scalar.
    Char(char),
    /// Immutable string.
    Str(String),
    /// Value aggregate.
    Struct(StructValue),
    /// Reference to a heap object in the owning universe.
    Object(ObjectId),
    /// Growable list.
    List(Vec<Value>),
    /// Insertion-ordered keyed collection.
    Map(MapValue),
    /// Fixed-length array.
    Array(Vec<Value>),
}

impl Value {
    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "str",
            Value::Struct(_) => "struct",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Array(_) => "array",
        }
    }

    /// The referenced heap object, when the value is a live reference.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// True for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// A value aggregate: a struct's fields, with no identity of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    /// Fully qualified struct type name.
    pub type_name: String,
    /// Field values, keyed by field name.
    pub fields: HashMap<String, Value>,
}

impl StructValue {
    /// Creates an aggregate with no fields yet.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: HashMap::new(),
        }
    }

    /// Reads one field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Writes one field, inserting the slot if it does not exist.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }
}

/// An insertion-ordered keyed collection.
///
/// Entries keep the order they were inserted in, and [`insert`] is the one
/// native write operation: migration rebuilds maps pair by pair through it.
///
/// [`insert`]: MapValue::insert
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one pair, replacing the value of an equal existing key.
    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Looks a value up by key.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry exists.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }
}
