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

//! Event-driven communication for the reload pipeline.
//!
//! Two concerns live here. The [`EventBus`] is a generic, thread-safe MPSC
//! channel the reload coordinator publishes [`ReloadEvent`]s on, so editor
//! and tooling can observe reloads without being wired into them. The
//! [`ObserverRegistry`] trait and its [`ScriptEventHub`] implementation
//! track which live script instances listen to which engine events; the
//! migration engine brackets every instance move with unregister/register
//! calls so no handler ever fires against a half-migrated object.

mod bus;
mod hub;
mod reload;

pub use self::bus::EventBus;
pub use self::hub::{ObserverRegistry, ScriptEventHub};
pub use self::reload::ReloadEvent;
