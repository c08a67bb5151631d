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

//! # Proteus Upgrade
//!
//! The live-reload migration engine. When the script compiler produces a
//! new type universe, this crate carries the old universe's state into it:
//! statics, registered entities, the root object, and every object
//! reachable from them, preserving shared references and cycles through a
//! per-session [`ReferenceMap`].
//!
//! The pieces, outside in:
//!
//! - [`ScriptReloader`] owns the live universe and turns compilations
//!   into sessions.
//! - [`ReloadSession`] runs one migration in a fixed pass order.
//! - [`Upgrader`] pairs members across universes and dispatches each pair
//!   to the highest-priority [`strategy`](crate::strategy) handling its
//!   [`MemberShape`].

#![warn(missing_docs)]

pub mod reference_map;
pub mod reloader;
pub mod session;
pub mod shape;
pub mod strategy;
pub mod upgrader;

pub use reference_map::ReferenceMap;
pub use reloader::{ReloadError, ScriptReloader};
pub use session::{ReloadSession, SessionReport, SessionStats};
pub use shape::MemberShape;
pub use upgrader::{MigrationCtx, Upgrader};
