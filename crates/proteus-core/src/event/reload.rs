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

use crate::instance::UniverseId;

/// Lifecycle notifications published on the engine bus during a reload.
///
/// These exist for the editor and tooling; nothing in the migration engine
/// consumes them, and a reload completes identically with no listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    /// A migration session started from `old` toward `new`.
    SessionStarted {
        /// Universe being retired.
        old: UniverseId,
        /// Universe being populated.
        new: UniverseId,
    },
    /// A type present in the old universe has no counterpart in the new one.
    TypeDropped {
        /// Fully qualified name of the dropped type.
        type_name: String,
    },
    /// The session finished and the new universe is live.
    SessionCompleted {
        /// The universe now live.
        universe: UniverseId,
        /// Entities carried into the new universe.
        entities_migrated: usize,
        /// Member slots left at their zero value.
        members_skipped: usize,
    },
}
