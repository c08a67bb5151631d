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

//! Migration of object references through the reference map.

use proteus_script::Value;

use crate::shape::MemberShape;
use crate::strategy::{SlotPair, StrategyRegistration, UpgradeOutcome, UpgradeStrategy};
use crate::upgrader::{MigrationCtx, Upgrader};

/// Carries an object reference by migrating its referent once.
///
/// The referent is re-created under its concrete runtime type, not the
/// member's declared type, so an instance of a subclass stays an instance
/// of that subclass after the reload. Referents already migrated this
/// session are reused from the reference map, which is what collapses
/// shared references and cycles onto single objects.
pub struct ClassStrategy;

impl UpgradeStrategy for ClassStrategy {
    fn priority(&self) -> u32 {
        20
    }

    fn name(&self) -> &'static str {
        "class"
    }

    fn handles(&self, shape: MemberShape) -> bool {
        shape == MemberShape::Class
    }

    fn upgrade(
        &self,
        upgrader: &Upgrader,
        ctx: &mut MigrationCtx<'_>,
        pair: &SlotPair,
    ) -> UpgradeOutcome {
        let old_value = pair.read(ctx);
        let old_id = match old_value {
            // A reference that was never set carries nothing.
            Value::Null => return UpgradeOutcome::Skipped,
            Value::Object(id) => id,
            other => {
                ctx.diagnostics.warn(&format!(
                    "Member {}::{} held a {} value instead of a reference; dropped.",
                    pair.old.owner,
                    pair.old.name,
                    other.kind_name()
                ));
                return UpgradeOutcome::Skipped;
            }
        };

        match upgrader.migrate_object(ctx, old_id) {
            Some(new_id) => pair.write(ctx, Value::Object(new_id)),
            None => UpgradeOutcome::Skipped,
        }
    }
}

inventory::submit! {
    StrategyRegistration::new(&ClassStrategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_map::ReferenceMap;
    use crate::session::SessionStats;
    use proteus_core::diagnostics::MemoryDiagnostics;
    use proteus_core::event::ScriptEventHub;
    use proteus_script::member::{MemberDescriptor, Target};
    use proteus_script::{TypeUniverse, UniverseBuilder, ValueType};

    fn buddy_universe() -> TypeUniverse {
        UniverseBuilder::new()
            .class("game.Actor")
            .with_field("buddy", ValueType::Class("game.Actor".into()))
            .with_field("tag", ValueType::Int)
            .finish()
            .build()
    }

    fn buddy_member() -> MemberDescriptor {
        MemberDescriptor {
            owner: "game.Actor".into(),
            name: "buddy".into(),
            declared: ValueType::Class("game.Actor".into()),
            is_static: false,
            slot: "buddy".into(),
        }
    }

    #[test]
    fn null_references_skip_without_noise() {
        let mut old = buddy_universe();
        let mut new = buddy_universe();
        let old_id = old.alloc_zero("game.Actor").expect("Allocation should succeed");
        let new_id = new.alloc_zero("game.Actor").expect("Allocation should succeed");

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
            old: buddy_member(),
            new: buddy_member(),
            old_target: Target::Instance(old_id),
            new_target: Target::Instance(new_id),
            shape: MemberShape::Class,
        };

        let outcome = ClassStrategy.upgrade(&upgrader, &mut ctx, &pair);

        assert_eq!(outcome, UpgradeOutcome::Skipped);
        assert!(map.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn shared_referents_are_migrated_once() {
        let mut old = buddy_universe();
        let mut new = buddy_universe();

        // Two actors sharing the same buddy.
        let shared = old.alloc_zero("game.Actor").expect("Allocation should succeed");
        old.object_mut(shared)
            .expect("Object should exist")
            .set_slot("tag", Value::Int(9));
        let first = old.alloc_zero("game.Actor").expect("Allocation should succeed");
        let second = old.alloc_zero("game.Actor").expect("Allocation should succeed");
        old.object_mut(first)
            .expect("Object should exist")
            .set_slot("buddy", Value::Object(shared));
        old.object_mut(second)
            .expect("Object should exist")
            .set_slot("buddy", Value::Object(shared));

        let new_first = new.alloc_zero("game.Actor").expect("Allocation should succeed");
        let new_second = new.alloc_zero("game.Actor").expect("Allocation should succeed");

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

        for (old_id, new_id) in [(first, new_first), (second, new_second)] {
            let pair = SlotPair {
                old: buddy_member(),
                new: buddy_member(),
                old_target: Target::Instance(old_id),
                new_target: Target::Instance(new_id),
                shape: MemberShape::Class,
            };
            assert_eq!(
                ClassStrategy.upgrade(&upgrader, &mut ctx, &pair),
                UpgradeOutcome::Migrated
            );
        }

        let first_buddy = new
            .object(new_first)
            .and_then(|object| object.slot("buddy"))
            .cloned();
        let second_buddy = new
            .object(new_second)
            .and_then(|object| object.slot("buddy"))
            .cloned();
        assert_eq!(first_buddy, second_buddy);

        let migrated = first_buddy
            .and_then(|value| value.as_object())
            .expect("Buddy should be a reference");
        assert_eq!(
            new.object(migrated).and_then(|object| object.slot("tag")),
            Some(&Value::Int(9))
        );
    }
}
