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

//! # Proteus Script
//!
//! The script-side type model: compiled type universes, dynamic values, the
//! instance heap, and member descriptors.
//!
//! A [`TypeUniverse`] is the unit of compilation the reload pipeline works
//! with. Each successful compile yields a fresh universe; the migration
//! engine in `proteus-upgrade` then moves live state from the old universe
//! into the new one, member by member, through [`member::MemberDescriptor`]
//! accessors.

#![warn(missing_docs)]

pub mod builder;
pub mod compiler;
pub mod heap;
pub mod member;
pub mod types;
pub mod universe;
pub mod value;

pub use builder::UniverseBuilder;
pub use types::{UniverseDefs, ValueType};
pub use universe::TypeUniverse;
pub use value::Value;
