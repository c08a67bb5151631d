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

//! Field-by-field migration of value aggregates.

use proteus_script::{Value, ValueType};

use crate::shape::MemberShape;
use crate::strategy::{SlotPair, StrategyRegistration, UpgradeOutcome, UpgradeStrategy};
use crate::upgrader::{MigrationCtx, Upgrader};

/// Rebuilds a struct member as a zeroed aggregate of the new struct type,
/// then carries each same-named field into it.
///
/// Lowest priority of the builtin set: every more specific shape must win
/// before a member falls back to aggregate treatment.
pub struct StructStrategy;

impl UpgradeStrategy for StructStrategy {
    fn priority(&self) -> u32 {
        10
    }

    fn name(&self) -> &'static str {
        "struct"
    }

    fn handles(&self, shape: MemberShape) -> bool {
        shape == MemberShape::Struct
    }

    fn upgrade(
        &self,
        upgrader: &Upgrader,
        ctx: &mut MigrationCtx<'_>,
        pair: &SlotPair,
    ) -> UpgradeOutcome {
        let ValueType::Struct(new_type_name) = pair.new.declared.clone() else {
            ctx.diagnostics.warn(&format!(
                "Member {}::{} is no longer a struct; its value is dropped.",
                pair.new.owner, pair.new.name
            ));
            return UpgradeOutcome::Skipped;
        };

        let old_value = pair.read(ctx);
        let Value::Struct(aggregate) = old_value else {
            // A zeroed slot of an unknown struct reads as null; there is
            // nothing to carry.
            return UpgradeOutcome::Skipped;
        };

        let mut warned = false;
        match upgrader.migrate_struct_value(ctx, &aggregate, &new_type_name, &mut warned) {
            Some(migrated) => pair.write(ctx, Value::Struct(migrated)),
            None => UpgradeOutcome::Skipped,
        }
    }
}

inventory::submit! {
    StrategyRegistration::new(&StructStrategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_map::ReferenceMap;
    use crate::session::SessionStats;
    use proteus_core::diagnostics::MemoryDiagnostics;
    use proteus_core::event::ScriptEventHub;
    use proteus_script::member::{MemberDescriptor, Target};
    use proteus_script::value::StructValue;
    use proteus_script::{TypeUniverse, UniverseBuilder};

    fn stats_member() -> MemberDescriptor {
        MemberDescriptor {
            owner: "game.Actor".into(),
            name: "stats".into(),
            declared: ValueType::Struct("game.Stats".into()),
            is_static: false,
            slot: "stats".into(),
        }
    }

    fn universe_with_stats(fields: &[(&str, ValueType)]) -> TypeUniverse {
        let mut builder = UniverseBuilder::new().struct_type("game.Stats");
        for (name, ty) in fields {
            builder = builder.with_field(*name, ty.clone());
        }
        builder
            .finish()
            .class("game.Actor")
            .with_field("stats", ValueType::Struct("game.Stats".into()))
            .finish()
            .build()
    }

    #[test]
    fn same_named_fields_carry_and_removed_fields_report() {
        let mut old = universe_with_stats(&[
            ("strength", ValueType::Int),
            ("luck", ValueType::Int),
        ]);
        let mut new = universe_with_stats(&[
            ("strength", ValueType::Int),
            ("agility", ValueType::Float),
        ]);
        let old_id = old.alloc_zero("game.Actor").expect("Allocation should succeed");
        let new_id = new.alloc_zero("game.Actor").expect("Allocation should succeed");

        let mut aggregate = StructValue::new("game.Stats");
        aggregate.set_field("strength", Value::Int(12));
        aggregate.set_field("luck", Value::Int(3));
        old.object_mut(old_id)
            .expect("Object should exist")
            .set_slot("stats", Value::Struct(aggregate));

        let upgrader = Upgrader::from_registry();
        let mut map = ReferenceMap::new();
        let mut hub = ScriptEventHub::new();
        let diagnostics = MemoryDiagnostics::new();
        let mut stats = SessionStats::default();
        let mut ctx = MigrationCtx {
            old: &old,
            new: &mut new,
            map: &mut map,
            observers: &mut hub,
            diagnostics: &diagnostics,
            stats: &mut stats,
        };
        let pair = SlotPair {
            old: stats_member(),
            new: stats_member(),
            old_target: Target::Instance(old_id),
            new_target: Target::Instance(new_id),
            shape: MemberShape::Struct,
        };

        let outcome = StructStrategy.upgrade(&upgrader, &mut ctx, &pair);
        assert_eq!(outcome, UpgradeOutcome::Migrated);

        match new.object(new_id).and_then(|object| object.slot("stats")) {
            Some(Value::Struct(migrated)) => {
                assert_eq!(migrated.field("strength"), Some(&Value::Int(12)));
                // The field added by the reload stays zeroed.
                assert_eq!(migrated.field("agility"), Some(&Value::Float(0.0)));
                assert_eq!(migrated.field("luck"), None);
            }
            other => panic!("Expected a struct slot, got {other:?}"),
        }
        assert!(diagnostics
            .warnings()
            .iter()
            .any(|message| message.contains("luck")));
    }
}
