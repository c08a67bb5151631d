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

//! Whole-array copies of fixed-length members.

use proteus_script::{Value, ValueType};

use crate::shape::MemberShape;
use crate::strategy::{SlotPair, StrategyRegistration, UpgradeOutcome, UpgradeStrategy};
use crate::upgrader::{MigrationCtx, Upgrader};

/// Copies a fixed-length array element by element.
///
/// Highest priority of the builtin set: an array member must never fall
/// through to the general collection path. Primitive elements of an
/// unchanged element type copy verbatim. Struct elements of an unchanged
/// type run through element migration, since their fields may hold
/// references that have to resolve through the reference map. Everything
/// else, arrays of references included, comes back zero-filled at the
/// same length.
pub struct ArrayStrategy;

impl UpgradeStrategy for ArrayStrategy {
    fn priority(&self) -> u32 {
        60
    }

    fn name(&self) -> &'static str {
        "array"
    }

    fn handles(&self, shape: MemberShape) -> bool {
        shape == MemberShape::Array
    }

    fn upgrade(
        &self,
        upgrader: &Upgrader,
        ctx: &mut MigrationCtx<'_>,
        pair: &SlotPair,
    ) -> UpgradeOutcome {
        let (ValueType::Array(old_elem), ValueType::Array(new_elem)) =
            (&pair.old.declared, &pair.new.declared)
        else {
            ctx.diagnostics.warn(&format!(
                "Member {}::{} is no longer an array; its value is dropped.",
                pair.new.owner, pair.new.name
            ));
            return UpgradeOutcome::Skipped;
        };

        let Value::Array(items) = pair.read(ctx) else {
            return UpgradeOutcome::Skipped;
        };

        if old_elem == new_elem {
            match MemberShape::of(old_elem) {
                MemberShape::Primitive => return pair.write(ctx, Value::Array(items)),
                MemberShape::Struct => {
                    let mut warned = false;
                    let migrated: Vec<Value> = items
                        .iter()
                        .map(|item| {
                            upgrader.migrate_element(ctx, item, old_elem, new_elem, &mut warned)
                        })
                        .collect();
                    return pair.write(ctx, Value::Array(migrated));
                }
                _ => {}
            }
        }

        ctx.diagnostics.warn(&format!(
            "Array {}::{} elements cannot be carried ({old_elem} into {new_elem}); contents zeroed.",
            pair.old.owner, pair.old.name
        ));
        let zeroed: Vec<Value> = (0..items.len())
            .map(|_| ctx.new.zero_value(new_elem))
            .collect();
        pair.write(ctx, Value::Array(zeroed))
    }
}

inventory::submit! {
    StrategyRegistration::new(&ArrayStrategy)
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

    fn member(ty: ValueType) -> MemberDescriptor {
        MemberDescriptor {
            owner: "game.Grid".into(),
            name: "cells".into(),
            declared: ty,
            is_static: false,
            slot: "cells".into(),
        }
    }

    fn grid_universe(cells: ValueType) -> TypeUniverse {
        UniverseBuilder::new()
            .class("game.Grid")
            .with_field("cells", cells)
            .finish()
            .build()
    }

    fn run(
        old_cells: ValueType,
        new_cells: ValueType,
        stored: Value,
    ) -> (Value, UpgradeOutcome, usize) {
        let mut old = grid_universe(old_cells.clone());
        let mut new = grid_universe(new_cells.clone());
        let old_id = old.alloc_zero("game.Grid").expect("Allocation should succeed");
        let new_id = new.alloc_zero("game.Grid").expect("Allocation should succeed");
        old.object_mut(old_id)
            .expect("Object should exist")
            .set_slot("cells", stored);

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
            old: member(old_cells),
            new: member(new_cells),
            old_target: Target::Instance(old_id),
            new_target: Target::Instance(new_id),
            shape: MemberShape::Array,
        };

        let outcome = ArrayStrategy.upgrade(&Upgrader::from_registry(), &mut ctx, &pair);
        let migrated = new
            .object(new_id)
            .and_then(|object| object.slot("cells"))
            .cloned()
            .expect("Slot should exist");
        (migrated, outcome, diagnostics.warnings().len())
    }

    #[test]
    fn unchanged_element_types_copy_in_full() {
        let ty = ValueType::Array(Box::new(ValueType::Float));
        let stored = Value::Array(vec![Value::Float(1.5), Value::Float(-2.0)]);

        let (migrated, outcome, warnings) = run(ty.clone(), ty, stored.clone());

        assert_eq!(outcome, UpgradeOutcome::Migrated);
        assert_eq!(migrated, stored);
        assert_eq!(warnings, 0);
    }

    #[test]
    fn changed_element_types_zero_fill_at_the_same_length() {
        let old_ty = ValueType::Array(Box::new(ValueType::Int));
        let new_ty = ValueType::Array(Box::new(ValueType::Str));
        let stored = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

        let (migrated, outcome, warnings) = run(old_ty, new_ty, stored);

        assert_eq!(outcome, UpgradeOutcome::Migrated);
        assert_eq!(
            migrated,
            Value::Array(vec![
                Value::Str(String::new()),
                Value::Str(String::new()),
                Value::Str(String::new())
            ])
        );
        assert_eq!(warnings, 1);
    }

    #[test]
    fn reference_elements_never_copy_verbatim() {
        let ty = ValueType::Array(Box::new(ValueType::Class("game.Grid".into())));
        let stored = Value::Array(vec![Value::Null, Value::Null]);

        let (migrated, outcome, warnings) = run(ty.clone(), ty, stored);

        assert_eq!(outcome, UpgradeOutcome::Migrated);
        assert_eq!(migrated, Value::Array(vec![Value::Null, Value::Null]));
        assert_eq!(warnings, 1);
    }

    #[test]
    fn struct_elements_with_reference_fields_resolve_through_the_map() {
        let cells_ty = ValueType::Array(Box::new(ValueType::Struct("game.Slot".into())));
        let build = || {
            UniverseBuilder::new()
                .class("game.Item")
                .with_field("charge", ValueType::Int)
                .finish()
                .struct_type("game.Slot")
                .with_field("item", ValueType::Class("game.Item".into()))
                .finish()
                .class("game.Grid")
                .with_field("cells", cells_ty.clone())
                .finish()
                .build()
        };
        let mut old = build();
        let mut new = build();

        let old_grid = old.alloc_zero("game.Grid").expect("Allocation should succeed");
        let new_grid = new.alloc_zero("game.Grid").expect("Allocation should succeed");
        let item = old.alloc_zero("game.Item").expect("Allocation should succeed");
        old.object_mut(item)
            .expect("Object should exist")
            .set_slot("charge", Value::Int(9));
        let mut slot = StructValue::new("game.Slot");
        slot.set_field("item", Value::Object(item));
        old.object_mut(old_grid)
            .expect("Object should exist")
            .set_slot(
                "cells",
                Value::Array(vec![Value::Struct(slot.clone()), Value::Struct(slot)]),
            );

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
            old: member(cells_ty.clone()),
            new: member(cells_ty),
            old_target: Target::Instance(old_grid),
            new_target: Target::Instance(new_grid),
            shape: MemberShape::Array,
        };

        let outcome = ArrayStrategy.upgrade(&Upgrader::from_registry(), &mut ctx, &pair);
        assert_eq!(outcome, UpgradeOutcome::Migrated);

        let cells = match new.object(new_grid).and_then(|object| object.slot("cells")) {
            Some(Value::Array(elements)) => elements.clone(),
            other => panic!("Expected an array slot, got {other:?}"),
        };
        let referents: Vec<_> = cells
            .iter()
            .map(|element| match element {
                Value::Struct(aggregate) => aggregate
                    .field("item")
                    .and_then(Value::as_object)
                    .expect("Field should hold a reference"),
                other => panic!("Expected a struct element, got {other:?}"),
            })
            .collect();

        // Both elements resolved through the reference map: one new item,
        // shared by both, with its state carried into the new heap.
        assert_eq!(referents[0], referents[1]);
        assert_eq!(map.lookup(item), Some(referents[0]));
        assert_eq!(
            new.object(referents[0]).and_then(|object| object.slot("charge")),
            Some(&Value::Int(9))
        );
        assert_eq!(new.heap().len(), 2);
        assert!(diagnostics.is_empty());
    }
}
