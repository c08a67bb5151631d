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

//! The reload driver: owns the live universe and turns successful
//! compilations into migration sessions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use proteus_core::compiler::{ChangeKind, CompileDiagnostic, CompileOptions, ProjectDescription};
use proteus_core::diagnostics::{DiagnosticsSink, LogDiagnostics};
use proteus_core::entity::{EntityRegistry, LiveEntityRegistry};
use proteus_core::event::{EventBus, ObserverRegistry, ReloadEvent, ScriptEventHub};
use proteus_core::{InstanceRef, ObjectId, UniverseId};
use proteus_script::compiler::{CompileOutput, ScriptCompiler};
use proteus_script::universe::UniverseError;
use proteus_script::{TypeUniverse, UniverseDefs};

use crate::session::{ReloadSession, SessionReport};
use crate::upgrader::Upgrader;

/// An error from loading or reloading scripts.
#[derive(Debug)]
pub enum ReloadError {
    /// Compilation failed. The running universe was left untouched.
    CompileFailed {
        /// Everything the compiler reported.
        diagnostics: Vec<CompileDiagnostic>,
    },
    /// No universe is loaded yet.
    MissingUniverse,
    /// A root or entity allocation failed.
    Allocation(UniverseError),
}

impl fmt::Display for ReloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadError::CompileFailed { diagnostics } => {
                write!(f, "Compilation failed with {} diagnostic(s)", diagnostics.len())
            }
            ReloadError::MissingUniverse => write!(f, "No universe is loaded"),
            ReloadError::Allocation(error) => write!(f, "Allocation failed: {error}"),
        }
    }
}

impl std::error::Error for ReloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReloadError::Allocation(error) => Some(error),
            _ => None,
        }
    }
}

impl From<UniverseError> for ReloadError {
    fn from(error: UniverseError) -> Self {
        ReloadError::Allocation(error)
    }
}

/// The defs of a usable compilation, or the failure to report.
///
/// Failure diagnostics are logged here, one line each, so the running
/// universe keeps going with a readable record of why it did not change.
fn accepted_defs(output: CompileOutput) -> Result<UniverseDefs, ReloadError> {
    if !output.success {
        for diagnostic in &output.diagnostics {
            log::error!(target: "proteus", "{diagnostic}");
        }
        return Err(ReloadError::CompileFailed {
            diagnostics: output.diagnostics,
        });
    }
    match output.universe {
        Some(defs) => Ok(defs),
        None => Err(ReloadError::CompileFailed {
            diagnostics: vec![CompileDiagnostic::error(
                "compiler reported success without a type universe",
            )],
        }),
    }
}

/// The type-to-event-names handler table of a universe, for the hub.
fn handler_table(universe: &TypeUniverse) -> HashMap<String, Vec<String>> {
    let mut table = HashMap::new();
    for name in universe.type_names() {
        if let Some(def) = universe.type_def(&name) {
            if !def.event_handlers.is_empty() {
                table.insert(name.clone(), def.event_handlers.clone());
            }
        }
    }
    table
}

/// Owns the live script universe and drives compile-then-migrate reloads.
///
/// The reloader is the single owner of everything a reload touches: the
/// universe, the entity registry, the event hub, and the upgrader. A
/// watcher (or anything else) triggers [`reload`] when sources change; on
/// compiler success the old universe's state is migrated into the new one
/// and the old universe is dropped, on failure nothing changes.
///
/// [`reload`]: ScriptReloader::reload
pub struct ScriptReloader {
    compiler: Box<dyn ScriptCompiler>,
    project: ProjectDescription,
    options: CompileOptions,
    upgrader: Upgrader,
    universe: Option<TypeUniverse>,
    root: Option<ObjectId>,
    entities: LiveEntityRegistry,
    observers: ScriptEventHub,
    diagnostics: Arc<dyn DiagnosticsSink>,
    events: EventBus<ReloadEvent>,
}

impl ScriptReloader {
    /// Creates a reloader for `project` with nothing loaded yet.
    ///
    /// Diagnostics go to the log by default; see [`with_diagnostics`].
    ///
    /// [`with_diagnostics`]: ScriptReloader::with_diagnostics
    pub fn new(compiler: Box<dyn ScriptCompiler>, project: ProjectDescription) -> Self {
        Self {
            compiler,
            project,
            options: CompileOptions::default(),
            upgrader: Upgrader::from_registry(),
            universe: None,
            root: None,
            entities: LiveEntityRegistry::new(),
            observers: ScriptEventHub::new(),
            diagnostics: Arc::new(LogDiagnostics),
            events: EventBus::new(),
        }
    }

    /// Sets the compile options used by every compilation.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Routes migration diagnostics to `sink` instead of the log.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Compiles the project from scratch and installs the result as the
    /// live universe.
    ///
    /// This is the startup path; it migrates nothing and replaces any
    /// current universe. Later compilations go through [`reload`] so live
    /// state is carried over.
    ///
    /// [`reload`]: ScriptReloader::reload
    pub async fn load(&mut self) -> Result<UniverseId, ReloadError> {
        let output = self.compiler.compile(&self.project, &self.options).await;
        let defs = accepted_defs(output)?;
        let universe = TypeUniverse::from_defs(&defs);
        let id = universe.id();
        if let Some(previous) = self.universe.take() {
            for entity in self.entities.all() {
                if entity.universe == previous.id() {
                    self.entities.unregister(entity);
                }
            }
            self.observers.drop_universe(previous.id());
            self.root = None;
            log::warn!(target: "proteus", "Replaced universe {} without migration.", previous.id());
        }
        self.observers.install_handlers(id, handler_table(&universe));
        self.universe = Some(universe);
        log::info!(target: "proteus", "Loaded universe {id} for '{}'.", self.project.name);
        Ok(id)
    }

    /// Allocates the root object and binds it to the event hub.
    ///
    /// The root is carried by every reload but never enters the entity
    /// registry; it models the one object the embedding engine holds on
    /// to directly.
    pub fn spawn_root(&mut self, type_name: &str) -> Result<InstanceRef, ReloadError> {
        let universe = self.universe.as_mut().ok_or(ReloadError::MissingUniverse)?;
        let id = universe.alloc_zero(type_name)?;
        let instance = universe.instance_ref(id);
        self.root = Some(id);
        self.observers.register(instance);
        self.observers.bind_instance(instance, type_name);
        log::debug!(target: "proteus", "Spawned root {instance} as '{type_name}'.");
        Ok(instance)
    }

    /// Allocates an entity, registers it, and binds it to the event hub.
    pub fn spawn_entity(&mut self, type_name: &str) -> Result<InstanceRef, ReloadError> {
        let universe = self.universe.as_mut().ok_or(ReloadError::MissingUniverse)?;
        let id = universe.alloc_zero(type_name)?;
        let instance = universe.instance_ref(id);
        self.entities.register(instance);
        self.observers.register(instance);
        self.observers.bind_instance(instance, type_name);
        log::debug!(target: "proteus", "Spawned entity {instance} as '{type_name}'.");
        Ok(instance)
    }

    /// Recompiles the whole project and migrates live state into the
    /// result.
    ///
    /// On compile failure the current universe keeps running unmodified
    /// and the failure comes back with the compiler's diagnostics.
    pub async fn reload(&mut self) -> Result<SessionReport, ReloadError> {
        if self.universe.is_none() {
            return Err(ReloadError::MissingUniverse);
        }
        let output = self.compiler.compile(&self.project, &self.options).await;
        self.apply(output)
    }

    /// Recompiles only `changed` sources against the current universe,
    /// then migrates as [`reload`] does.
    ///
    /// [`reload`]: ScriptReloader::reload
    pub async fn reload_incremental(
        &mut self,
        changed: &HashMap<PathBuf, ChangeKind>,
    ) -> Result<SessionReport, ReloadError> {
        let existing = self
            .universe
            .as_ref()
            .map(TypeUniverse::id)
            .ok_or(ReloadError::MissingUniverse)?;
        let output = self
            .compiler
            .incremental_compile(existing, changed, &self.options)
            .await;
        self.apply(output)
    }

    /// Turns one accepted compilation into a completed migration.
    fn apply(&mut self, output: CompileOutput) -> Result<SessionReport, ReloadError> {
        let defs = accepted_defs(output)?;
        let old = self.universe.take().ok_or(ReloadError::MissingUniverse)?;
        let mut new = TypeUniverse::from_defs(&defs);

        self.events.publish(ReloadEvent::SessionStarted {
            old: old.id(),
            new: new.id(),
        });
        for type_name in old.type_names() {
            if !new.has_type(&type_name) {
                self.events.publish(ReloadEvent::TypeDropped { type_name });
            }
        }
        self.observers
            .install_handlers(new.id(), handler_table(&new));

        // The root's new counterpart exists before the session starts, so
        // its identity pairing can be seeded ahead of every pass.
        let roots = match self.root {
            Some(old_root) => {
                reallocate_root(&old, &mut new, old_root, self.diagnostics.as_ref())
                    .map(|new_root| (old_root, new_root))
            }
            None => None,
        };

        let mut session = ReloadSession::new(
            &old,
            &mut new,
            &mut self.entities,
            &mut self.observers,
            self.diagnostics.as_ref(),
        );
        if let Some((old_root, new_root)) = roots {
            session = session.with_roots(old_root, new_root);
        }
        let report = session.run(&self.upgrader);

        // Instance-to-type bindings are out-of-band data for the hub; the
        // session only flips activation flags.
        for (id, object) in new.heap().iter() {
            self.observers
                .bind_instance(new.instance_ref(id), &object.type_name);
        }
        self.observers.drop_universe(old.id());

        self.events.publish(ReloadEvent::SessionCompleted {
            universe: new.id(),
            entities_migrated: report.stats.entities_migrated,
            members_skipped: report.stats.members_skipped,
        });
        log::info!(target: "proteus", "{report}");

        self.root = roots.map(|(_, new_root)| new_root);
        self.universe = Some(new);
        Ok(report)
    }

    /// The live universe, once loaded.
    pub fn universe(&self) -> Option<&TypeUniverse> {
        self.universe.as_ref()
    }

    /// Mutable access to the live universe.
    pub fn universe_mut(&mut self) -> Option<&mut TypeUniverse> {
        self.universe.as_mut()
    }

    /// The root instance, if one was spawned and survived.
    pub fn root(&self) -> Option<InstanceRef> {
        match (&self.universe, self.root) {
            (Some(universe), Some(id)) => Some(universe.instance_ref(id)),
            _ => None,
        }
    }

    /// The live entity registry.
    pub fn entities(&self) -> &LiveEntityRegistry {
        &self.entities
    }

    /// The event hub instances are bound to.
    pub fn observers(&self) -> &ScriptEventHub {
        &self.observers
    }

    /// The bus carrying reload lifecycle events.
    pub fn events(&self) -> &EventBus<ReloadEvent> {
        &self.events
    }
}

/// Allocates the new universe's root counterpart, or drops the root when
/// its type did not survive.
fn reallocate_root(
    old: &TypeUniverse,
    new: &mut TypeUniverse,
    old_root: ObjectId,
    diagnostics: &dyn DiagnosticsSink,
) -> Option<ObjectId> {
    let type_name = old.object(old_root)?.type_name.clone();
    if !new.has_type(&type_name) {
        diagnostics.warn(&format!(
            "Root type '{type_name}' no longer exists; the root is dropped."
        ));
        return None;
    }
    match new.alloc_zero(&type_name) {
        Ok(id) => Some(id),
        Err(error) => {
            diagnostics.warn(&format!("Cannot re-create the root: {error}"));
            None
        }
    }
}
