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

//! One reload session: the ordered passes that carry live state from an
//! old universe into a new one.

use std::fmt;

use proteus_core::diagnostics::DiagnosticsSink;
use proteus_core::entity::EntityRegistry;
use proteus_core::event::ObserverRegistry;
use proteus_core::{ObjectId, UniverseId};
use proteus_script::TypeUniverse;

use crate::reference_map::ReferenceMap;
use crate::upgrader::{MigrationCtx, Upgrader};

/// Counters accumulated across one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Entities re-registered in the new universe.
    pub entities_migrated: usize,
    /// Members whose value was carried over, statics and struct fields
    /// included.
    pub members_migrated: usize,
    /// Members left at their zero value.
    pub members_skipped: usize,
    /// The static subset of `members_migrated`.
    pub statics_migrated: usize,
    /// Old objects paired with a new counterpart.
    pub objects_migrated: usize,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entities, {} objects, {} members carried ({} static), {} members skipped",
            self.entities_migrated,
            self.objects_migrated,
            self.members_migrated,
            self.statics_migrated,
            self.members_skipped
        )
    }
}

/// What one completed session did.
///
/// A session never fails outright; anomalies land in the diagnostics sink
/// and the counters, and the report only says what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// The universe migrated away from.
    pub old_universe: UniverseId,
    /// The universe migrated into.
    pub new_universe: UniverseId,
    /// Counters.
    pub stats: SessionStats,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Migrated {} -> {}: {}",
            self.old_universe, self.new_universe, self.stats
        )
    }
}

/// One reload attempt over a pair of universes.
///
/// A session owns a fresh [`ReferenceMap`] and runs in a fixed order:
/// seed the root pairing, migrate statics, migrate entities, migrate the
/// root object. It borrows its collaborators for the duration and is
/// consumed by [`run`].
///
/// [`run`]: ReloadSession::run
pub struct ReloadSession<'a> {
    old: &'a TypeUniverse,
    new: &'a mut TypeUniverse,
    entities: &'a mut dyn EntityRegistry,
    observers: &'a mut dyn ObserverRegistry,
    diagnostics: &'a dyn DiagnosticsSink,
    roots: Option<(ObjectId, ObjectId)>,
}

impl<'a> ReloadSession<'a> {
    /// Sets a session up over its collaborators, with no root pair yet.
    pub fn new(
        old: &'a TypeUniverse,
        new: &'a mut TypeUniverse,
        entities: &'a mut dyn EntityRegistry,
        observers: &'a mut dyn ObserverRegistry,
        diagnostics: &'a dyn DiagnosticsSink,
    ) -> Self {
        Self {
            old,
            new,
            entities,
            observers,
            diagnostics,
            roots: None,
        }
    }

    /// Sets the root objects carried across the session.
    ///
    /// `new_root` must already be allocated in the new universe; the
    /// session fills its members during the final pass.
    pub fn with_roots(mut self, old_root: ObjectId, new_root: ObjectId) -> Self {
        self.roots = Some((old_root, new_root));
        self
    }

    /// Runs the session to completion.
    ///
    /// Structural mismatches along the way are reported to the
    /// diagnostics sink and skipped; the session itself always finishes.
    pub fn run(self, upgrader: &Upgrader) -> SessionReport {
        let ReloadSession {
            old,
            new,
            entities,
            observers,
            diagnostics,
            roots,
        } = self;
        let old_universe = old.id();
        let new_universe = new.id();
        let mut map = ReferenceMap::new();
        let mut stats = SessionStats::default();

        // The root pair is known up front. Recording it first makes every
        // reference to the root, from statics or entities, resolve to the
        // pre-allocated new root instead of splitting its identity.
        if let Some((old_root, new_root)) = roots {
            map.record(old_root, new_root);
        }

        let mut ctx = MigrationCtx {
            old,
            new,
            map: &mut map,
            observers,
            diagnostics,
            stats: &mut stats,
        };

        // Statics first, so process-wide state is in place before any
        // instance is migrated against the new universe.
        for type_name in ctx.old.type_names() {
            if ctx.new.has_type(&type_name) {
                upgrader.migrate_type(&mut ctx, &type_name);
            } else {
                ctx.diagnostics.warn(&format!(
                    "Type '{type_name}' no longer exists; its static state is dropped."
                ));
            }
        }

        // Entities next, over a snapshot so re-registrations mid-loop
        // never re-enter the set.
        let snapshot = entities.all();
        for entity in snapshot {
            if entity.universe != old_universe {
                continue;
            }
            entities.unregister(entity);
            match upgrader.migrate_object(&mut ctx, entity.object) {
                Some(new_id) => {
                    let reborn = ctx.new.instance_ref(new_id);
                    entities.register(reborn);
                    ctx.stats.entities_migrated += 1;
                }
                None => {
                    ctx.diagnostics
                        .warn(&format!("Entity {entity} did not survive the reload."));
                }
            }
        }

        // The root pair last; its members are filled exactly once here,
        // whether or not earlier passes already handed out its reference.
        if let Some((old_root, new_root)) = roots {
            upgrader.migrate_instance(&mut ctx, old_root, new_root);
        }

        stats.objects_migrated = map.len();
        SessionReport {
            old_universe,
            new_universe,
            stats,
        }
    }
}
