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

//! The migration orchestrator: member pairing, strategy dispatch, and
//! object-graph traversal.

use std::collections::HashMap;

use proteus_core::diagnostics::DiagnosticsSink;
use proteus_core::event::ObserverRegistry;
use proteus_core::ObjectId;
use proteus_script::member::{MemberDescriptor, Target};
use proteus_script::types::MemberDef;
use proteus_script::value::StructValue;
use proteus_script::{TypeUniverse, Value, ValueType};

use crate::reference_map::ReferenceMap;
use crate::session::SessionStats;
use crate::shape::MemberShape;
use crate::strategy::{SlotPair, StrategyRegistration, UpgradeOutcome, UpgradeStrategy};

/// Everything one migration pass reads and writes.
///
/// The old universe is read-only source state; the new universe receives
/// every allocation and slot write. The reference map, observer registry,
/// diagnostics sink and counters are shared by all strategy invocations of
/// the pass.
pub struct MigrationCtx<'a> {
    /// The universe being migrated away from.
    pub old: &'a TypeUniverse,
    /// The universe being migrated into.
    pub new: &'a mut TypeUniverse,
    /// Identity pairings recorded so far this session.
    pub map: &'a mut ReferenceMap,
    /// Bracket collaborator for per-instance event subscriptions.
    pub observers: &'a mut dyn ObserverRegistry,
    /// Sink for every recoverable skip condition.
    pub diagnostics: &'a dyn DiagnosticsSink,
    /// Counters accumulated for the session report.
    pub stats: &'a mut SessionStats,
}

/// Emits `message` at most once per containing member.
///
/// Collections warn through this so a thousand-element list with a changed
/// element type produces one diagnostic, not a thousand.
fn warn_once(ctx: &MigrationCtx<'_>, warned: &mut bool, message: &str) {
    if !*warned {
        ctx.diagnostics.warn(message);
        *warned = true;
    }
}

/// The priority-ordered strategy set plus the object-level migration
/// algorithm.
///
/// Built once at startup and reused by every session; it owns no session
/// state, which all lives in the [`MigrationCtx`] threaded through calls.
pub struct Upgrader {
    strategies: Vec<&'static dyn UpgradeStrategy>,
}

impl Upgrader {
    /// Collects every strategy submitted for discovery.
    pub fn from_registry() -> Self {
        let strategies = inventory::iter::<StrategyRegistration>
            .into_iter()
            .map(|registration| registration.strategy())
            .collect();
        Self::with_strategies(strategies)
    }

    /// Builds an upgrader over an explicit strategy set.
    pub fn with_strategies(mut strategies: Vec<&'static dyn UpgradeStrategy>) -> Self {
        strategies.sort_by(|a, b| b.priority().cmp(&a.priority()));
        Self { strategies }
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// True when no strategy is registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// The highest-priority strategy handling `shape`, if any.
    pub fn select(&self, shape: MemberShape) -> Option<&'static dyn UpgradeStrategy> {
        self.strategies
            .iter()
            .copied()
            .find(|strategy| strategy.handles(shape))
    }

    /// Migrates every instance member of one object pair.
    ///
    /// The pass is bracketed by the observer registry: the old object is
    /// unregistered before its first member moves and the new object is
    /// registered after its last, so no handler ever fires against a
    /// half-migrated instance.
    pub fn migrate_instance(
        &self,
        ctx: &mut MigrationCtx<'_>,
        old_id: ObjectId,
        new_id: ObjectId,
    ) {
        let Some(type_name) = ctx.old.object(old_id).map(|object| object.type_name.clone())
        else {
            log::trace!(target: "proteus", "Skipped migration of missing object {old_id}.");
            return;
        };
        if ctx.new.object(new_id).is_none() {
            log::trace!(target: "proteus", "Skipped migration into missing object {new_id}.");
            return;
        }

        let old_ref = ctx.old.instance_ref(old_id);
        let new_ref = ctx.new.instance_ref(new_id);
        ctx.observers.unregister(old_ref);

        let pairs = self.pair_members(
            ctx,
            &type_name,
            false,
            Target::Instance(old_id),
            Target::Instance(new_id),
        );
        self.run_pairs(ctx, &pairs);

        ctx.observers.register(new_ref);
    }

    /// Migrates the static members of the universes' same-named type.
    ///
    /// This is how process-wide state (counters, caches, singletons held
    /// in statics) survives a reload. Statics live on their declaring
    /// type, so only the type's own members are walked here, never the
    /// inherited ones.
    pub fn migrate_type(&self, ctx: &mut MigrationCtx<'_>, type_name: &str) {
        let pairs = self.pair_members(ctx, type_name, true, Target::TypeLevel, Target::TypeLevel);
        self.run_pairs(ctx, &pairs);
    }

    /// Migrates one referenced object, reusing the already-migrated
    /// counterpart when the reference map knows one.
    ///
    /// Returns the object's new identity, or `None` when its concrete type
    /// has no counterpart in the new universe. The identity pairing is
    /// recorded before any member is migrated, so a reference cycle back
    /// into `old_id` resolves through the map instead of recursing
    /// forever, and every inbound edge collapses onto one new object.
    pub fn migrate_object(&self, ctx: &mut MigrationCtx<'_>, old_id: ObjectId) -> Option<ObjectId> {
        if let Some(existing) = ctx.map.lookup(old_id) {
            return Some(existing);
        }

        let concrete = ctx.old.object(old_id)?.type_name.clone();
        if !ctx.new.has_type(&concrete) {
            ctx.diagnostics.warn(&format!(
                "Type '{concrete}' no longer exists; object {old_id} is dropped."
            ));
            return None;
        }
        let new_id = match ctx.new.alloc_zero(&concrete) {
            Ok(id) => id,
            Err(error) => {
                ctx.diagnostics
                    .warn(&format!("Cannot migrate object {old_id}: {error}"));
                return None;
            }
        };

        ctx.map.record(old_id, new_id);
        self.migrate_instance(ctx, old_id, new_id);
        Some(new_id)
    }

    /// Migrates a value aggregate field by field into a zeroed aggregate
    /// of the new universe's `new_type_name` struct.
    ///
    /// Returns `None` when that struct does not exist, in which case the
    /// caller leaves its member at the zero value.
    pub fn migrate_struct_value(
        &self,
        ctx: &mut MigrationCtx<'_>,
        old_value: &StructValue,
        new_type_name: &str,
        warned: &mut bool,
    ) -> Option<StructValue> {
        let Some(mut new_value) = ctx.new.zero_struct(new_type_name) else {
            warn_once(
                ctx,
                warned,
                &format!("Struct '{new_type_name}' no longer exists; aggregate value dropped."),
            );
            return None;
        };

        let old_members: Vec<MemberDef> = ctx
            .old
            .type_def(&old_value.type_name)
            .map(|def| def.members.clone())
            .unwrap_or_default();
        let new_members: HashMap<String, MemberDef> = ctx
            .new
            .type_def(new_type_name)
            .map(|def| {
                def.members
                    .iter()
                    .map(|member| (member.name().to_string(), member.clone()))
                    .collect()
            })
            .unwrap_or_default();

        for member in &old_members {
            if member.is_static() {
                continue;
            }
            let Some(old_field) = MemberDescriptor::from_member(&old_value.type_name, member)
            else {
                continue;
            };
            let Some(new_field) = new_members
                .get(member.name())
                .and_then(|counterpart| MemberDescriptor::from_member(new_type_name, counterpart))
            else {
                ctx.diagnostics.warn(&format!(
                    "Field {}::{} no longer exists; its value is dropped.",
                    old_value.type_name,
                    member.name()
                ));
                ctx.stats.members_skipped += 1;
                continue;
            };

            let field_value = old_value
                .field(&old_field.slot)
                .cloned()
                .unwrap_or(Value::Null);
            let migrated = self.migrate_element(
                ctx,
                &field_value,
                &old_field.declared,
                &new_field.declared,
                warned,
            );
            new_value.fields.insert(new_field.slot, migrated);
            ctx.stats.members_migrated += 1;
        }

        Some(new_value)
    }

    /// Migrates one contained value (a collection element, a map key or
    /// value, or a struct field) to its new declared type.
    ///
    /// Values that cannot be carried are zeroed, with one warning per
    /// containing member. One level of container nesting is supported;
    /// containers inside containers reset to empty.
    pub fn migrate_element(
        &self,
        ctx: &mut MigrationCtx<'_>,
        value: &Value,
        old_ty: &ValueType,
        new_ty: &ValueType,
        warned: &mut bool,
    ) -> Value {
        let candidate = match MemberShape::of(old_ty) {
            MemberShape::Primitive => value.clone(),
            MemberShape::Struct => match (value, new_ty) {
                (Value::Struct(aggregate), ValueType::Struct(name)) => self
                    .migrate_struct_value(ctx, aggregate, name, warned)
                    .map(Value::Struct)
                    .unwrap_or(Value::Null),
                _ => value.clone(),
            },
            MemberShape::Class => match value {
                Value::Null => Value::Null,
                Value::Object(old_id) => match self.migrate_object(ctx, *old_id) {
                    Some(new_id) => Value::Object(new_id),
                    None => Value::Null,
                },
                _ => value.clone(),
            },
            MemberShape::Collection | MemberShape::Array => {
                warn_once(
                    ctx,
                    warned,
                    "Containers nested inside containers are not migrated; inner value reset.",
                );
                ctx.new.zero_value(new_ty)
            }
            MemberShape::Opaque => {
                warn_once(
                    ctx,
                    warned,
                    "Delegate values inside containers are not migrated; reset to null.",
                );
                ctx.new.zero_value(new_ty)
            }
        };

        if ctx.new.is_assignable(new_ty, &candidate) {
            return candidate;
        }
        warn_once(
            ctx,
            warned,
            &format!(
                "A {} value does not fit element type {new_ty}; zeroed.",
                candidate.kind_name()
            ),
        );
        ctx.new.zero_value(new_ty)
    }

    /// Resolves the member pairs of one type across the universes.
    ///
    /// Members that vanished on the new side, or stopped being writable
    /// storage, are reported and counted here; only fully resolved pairs
    /// come back.
    fn pair_members(
        &self,
        ctx: &mut MigrationCtx<'_>,
        type_name: &str,
        statics: bool,
        old_target: Target,
        new_target: Target,
    ) -> Vec<SlotPair> {
        let old_members: Vec<MemberDef> = if statics {
            ctx.old
                .type_def(type_name)
                .map(|def| {
                    def.members
                        .iter()
                        .filter(|member| member.is_static())
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        } else {
            ctx.old
                .members_flattened(type_name)
                .into_iter()
                .filter(|member| !member.is_static())
                .cloned()
                .collect()
        };
        let new_members: HashMap<String, MemberDef> = if statics {
            ctx.new
                .type_def(type_name)
                .map(|def| {
                    def.members
                        .iter()
                        .filter(|member| member.is_static())
                        .map(|member| (member.name().to_string(), member.clone()))
                        .collect()
                })
                .unwrap_or_default()
        } else {
            ctx.new
                .members_flattened(type_name)
                .into_iter()
                .filter(|member| !member.is_static())
                .map(|member| (member.name().to_string(), member.clone()))
                .collect()
        };

        let mut pairs = Vec::new();
        for member in &old_members {
            // Skip markers and synthesized slots never were storage to carry.
            let Some(old_descriptor) = MemberDescriptor::from_member(type_name, member) else {
                continue;
            };
            let Some(counterpart) = new_members.get(member.name()) else {
                ctx.diagnostics.warn(&format!(
                    "Member {type_name}::{} no longer exists; its value is dropped.",
                    member.name()
                ));
                ctx.stats.members_skipped += 1;
                continue;
            };
            let Some(new_descriptor) = MemberDescriptor::from_member(type_name, counterpart)
            else {
                ctx.diagnostics.warn(&format!(
                    "Member {type_name}::{} is no longer writable storage; its value is dropped.",
                    member.name()
                ));
                ctx.stats.members_skipped += 1;
                continue;
            };

            let shape = MemberShape::of(&old_descriptor.declared);
            pairs.push(SlotPair {
                old: old_descriptor,
                new: new_descriptor,
                old_target,
                new_target,
                shape,
            });
        }
        pairs
    }

    /// Dispatches resolved pairs to their strategies and keeps count.
    fn run_pairs(&self, ctx: &mut MigrationCtx<'_>, pairs: &[SlotPair]) {
        for pair in pairs {
            let Some(strategy) = self.select(pair.shape) else {
                ctx.diagnostics.warn(&format!(
                    "No strategy migrates {}::{} (shape {:?}); its value is dropped.",
                    pair.old.owner, pair.old.name, pair.shape
                ));
                ctx.stats.members_skipped += 1;
                continue;
            };
            log::trace!(
                target: "proteus",
                "Strategy '{}' migrates {}::{}.",
                strategy.name(),
                pair.old.owner,
                pair.old.name
            );
            match strategy.upgrade(self, ctx, pair) {
                UpgradeOutcome::Migrated => {
                    ctx.stats.members_migrated += 1;
                    if pair.old.is_static {
                        ctx.stats.statics_migrated += 1;
                    }
                }
                UpgradeOutcome::Skipped => ctx.stats.members_skipped += 1,
            }
        }
    }
}

impl Default for Upgrader {
    fn default() -> Self {
        Self::from_registry()
    }
}
