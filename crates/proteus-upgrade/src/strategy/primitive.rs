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

//! Verbatim copy of scalar members.

use crate::shape::MemberShape;
use crate::strategy::{SlotPair, StrategyRegistration, UpgradeOutcome, UpgradeStrategy};
use crate::upgrader::{MigrationCtx, Upgrader};

/// Copies scalar values as they are, with no recursion.
pub struct PrimitiveStrategy;

impl UpgradeStrategy for PrimitiveStrategy {
    fn priority(&self) -> u32 {
        50
    }

    fn name(&self) -> &'static str {
        "primitive"
    }

    fn handles(&self, shape: MemberShape) -> bool {
        shape == MemberShape::Primitive
    }

    fn upgrade(
        &self,
        _upgrader: &Upgrader,
        ctx: &mut MigrationCtx<'_>,
        pair: &SlotPair,
    ) -> UpgradeOutcome {
        let value = pair.read(ctx);
        pair.write(ctx, value)
    }
}

inventory::submit! {
    StrategyRegistration::new(&PrimitiveStrategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_map::ReferenceMap;
    use crate::session::SessionStats;
    use proteus_core::diagnostics::MemoryDiagnostics;
    use proteus_core::event::ScriptEventHub;
    use proteus_script::member::{MemberDescriptor, Target};
    use proteus_script::{UniverseBuilder, Value, ValueType};

    fn instance_member(name: &str, ty: ValueType) -> MemberDescriptor {
        MemberDescriptor {
            owner: "game.Actor".into(),
            name: name.into(),
            declared: ty,
            is_static: false,
            slot: name.into(),
        }
    }

    #[test]
    fn scalars_copy_verbatim() {
        let mut old = UniverseBuilder::new()
            .class("game.Actor")
            .with_field("health", ValueType::Int)
            .finish()
            .build();
        let mut new = UniverseBuilder::new()
            .class("game.Actor")
            .with_field("health", ValueType::Int)
            .finish()
            .build();
        let old_id = old.alloc_zero("game.Actor").expect("Allocation should succeed");
        let new_id = new.alloc_zero("game.Actor").expect("Allocation should succeed");
        old.object_mut(old_id)
            .expect("Object should exist")
            .set_slot("health", Value::Int(88));

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
            old: instance_member("health", ValueType::Int),
            new: instance_member("health", ValueType::Int),
            old_target: Target::Instance(old_id),
            new_target: Target::Instance(new_id),
            shape: MemberShape::Primitive,
        };

        let outcome = PrimitiveStrategy.upgrade(&Upgrader::from_registry(), &mut ctx, &pair);

        assert_eq!(outcome, UpgradeOutcome::Migrated);
        assert_eq!(
            new.object(new_id).and_then(|object| object.slot("health")),
            Some(&Value::Int(88))
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn a_changed_declared_kind_skips_with_a_warning() {
        let mut old = UniverseBuilder::new()
            .class("game.Actor")
            .with_field("level", ValueType::Int)
            .finish()
            .build();
        let mut new = UniverseBuilder::new()
            .class("game.Actor")
            .with_field("level", ValueType::Str)
            .finish()
            .build();
        let old_id = old.alloc_zero("game.Actor").expect("Allocation should succeed");
        let new_id = new.alloc_zero("game.Actor").expect("Allocation should succeed");
        old.object_mut(old_id)
            .expect("Object should exist")
            .set_slot("level", Value::Int(7));

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
            old: instance_member("level", ValueType::Int),
            new: instance_member("level", ValueType::Str),
            old_target: Target::Instance(old_id),
            new_target: Target::Instance(new_id),
            shape: MemberShape::Primitive,
        };

        let outcome = PrimitiveStrategy.upgrade(&Upgrader::from_registry(), &mut ctx, &pair);

        assert_eq!(outcome, UpgradeOutcome::Skipped);
        // The new member keeps its zero value.
        assert_eq!(
            new.object(new_id).and_then(|object| object.slot("level")),
            Some(&Value::Str(String::new()))
        );
        assert_eq!(diagnostics.warnings().len(), 1);
    }
}
