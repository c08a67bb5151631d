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

//! # Proteus Core
//!
//! Foundational crate containing the identity types, collaborator traits,
//! and diagnostics contracts shared by the live script-reload pipeline.
//!
//! Everything the migration engine needs from the surrounding engine is
//! expressed here as a trait: the entity registry, the observer subsystem,
//! and the diagnostics sink. Concrete engine-side implementations live next
//! to their traits so the runtime and the tests use the same code.

#![warn(missing_docs)]

pub mod compiler;
pub mod diagnostics;
pub mod entity;
pub mod event;
pub mod instance;

pub use instance::{InstanceRef, ObjectId, UniverseId};
