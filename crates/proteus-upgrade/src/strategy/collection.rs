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

//! Element-by-element rebuild of lists and maps.

use proteus_script::value::MapValue;
use proteus_script::{Value, ValueType};

use crate::shape::MemberShape;
use crate::strategy::{SlotPair, StrategyRegistration, UpgradeOutcome, UpgradeStrategy};
use crate::upgrader::{MigrationCtx, Upgrader};

/// Rebuilds a list or map into a fresh container, migrating every element.
///
/// Lists keep their order. Maps are rebuilt through the pair-insertion
/// operation, key and value migrated independently, so two entries whose
/// old values shared a referent still share it afterwards. One level of
/// nesting is supported; a container inside a container resets to empty.
pub struct CollectionStrategy;

impl UpgradeStrategy for CollectionStrategy {
    fn priority(&self) -> u32 {
        30
    }

    fn name(&self) -> &'static str {
        "collection"
    }

    fn handles(&self, shape: MemberShape) -> bool {
        shape == MemberShape::Collection
    }

    fn upgrade(
        &self,
        upgrader: &Upgrader,
        ctx: &mut MigrationCtx<'_>,
        pair: &SlotPair,
    ) -> UpgradeOutcome {
        let old_value = pair.read(ctx);
        let mut warned = false;

        match (&pair.old.declared, &pair.new.declared, old_value) {
            (ValueType::List(old_elem), ValueType::List(new_elem), Value::List(items)) => {
                let migrated: Vec<Value> = items
                    .iter()
                    .map(|item| {
                        upgrader.migrate_element(ctx, item, old_elem, new_elem, &mut warned)
                    })
                    .collect();
                pair.write(ctx, Value::List(migrated))
            }
            (
                ValueType::Map(old_key, old_value_ty),
                ValueType::Map(new_key, new_value_ty),
                Value::Map(entries),
            ) => {
                let mut migrated = MapValue::new();
                for (key, value) in entries.iter() {
                    let new_key_value =
                        upgrader.migrate_element(ctx, key, old_key, new_key, &mut warned);
                    let new_value_value =
                        upgrader.migrate_element(ctx, value, old_value_ty, new_value_ty, &mut warned);
                    migrated.insert(new_key_value, new_value_value);
                }
                pair.write(ctx, Value::Map(migrated))
            }
            (_, _, old_value) => {
                ctx.diagnostics.warn(&format!(
                    "Member {}::{} changed container kind ({} into {}); its value is dropped.",
                    pair.old.owner,
                    pair.old.name,
                    old_value.kind_name(),
                    pair.new.declared
                ));
                UpgradeOutcome::Skipped
            }
        }
    }
}

inventory::submit! {
    StrategyRegistration::new(&CollectionStrategy)
}
