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

//! Upgrade strategies, the leaf-level copy policies of a migration.
//!
//! Each strategy owns one family of member shapes. The [`Upgrader`] asks
//! every registered strategy which shapes it [`handles`] and dispatches
//! each member pair to the highest-priority match. Strategies read through
//! the old side of a [`SlotPair`] and write through the new side, recursing
//! into the upgrader for referenced objects and aggregates.
//!
//! [`handles`]: UpgradeStrategy::handles

mod array;
mod class;
mod collection;
mod primitive;
mod struct_value;

pub use array::ArrayStrategy;
pub use class::ClassStrategy;
pub use collection::CollectionStrategy;
pub use primitive::PrimitiveStrategy;
pub use struct_value::StructStrategy;

use proteus_script::member::{MemberDescriptor, Target};
use proteus_script::Value;

use crate::shape::MemberShape;
use crate::upgrader::{MigrationCtx, Upgrader};

/// What a strategy did with one member pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// A value was written into the new member.
    Migrated,
    /// The new member was left at its zero value.
    Skipped,
}

/// One member resolved on both sides of a reload, ready for dispatch.
#[derive(Debug, Clone)]
pub struct SlotPair {
    /// The member as the old universe declares it.
    pub old: MemberDescriptor,
    /// The same-named member as the new universe declares it.
    pub new: MemberDescriptor,
    /// Where the old value is read from.
    pub old_target: Target,
    /// Where the migrated value is written to.
    pub new_target: Target,
    /// Dispatch shape, computed once from the old declared type.
    pub shape: MemberShape,
}

impl SlotPair {
    /// Reads the old member's value.
    pub fn read(&self, ctx: &MigrationCtx<'_>) -> Value {
        self.old.get(ctx.old, self.old_target)
    }

    /// Writes `value` through the new member.
    ///
    /// A refused write (the new declared type no longer accepts values of
    /// this kind) becomes a warning and a skip; the member keeps its zero
    /// value.
    pub fn write(&self, ctx: &mut MigrationCtx<'_>, value: Value) -> UpgradeOutcome {
        let kind = value.kind_name();
        if self.new.set(ctx.new, self.new_target, value) {
            UpgradeOutcome::Migrated
        } else {
            ctx.diagnostics.warn(&format!(
                "Member {}::{} now declares {}; old {kind} value dropped.",
                self.new.owner, self.new.name, self.new.declared
            ));
            UpgradeOutcome::Skipped
        }
    }
}

/// One migration policy for one family of member shapes.
///
/// Strategies are stateless and shared by every session of the process.
/// They are discovered through [`inventory`], so adding one means
/// submitting a [`StrategyRegistration`] from any linked crate; the
/// [`Upgrader`] sorts the collected set by descending [`priority`] and the
/// first strategy whose [`handles`] accepts a member's shape migrates it.
///
/// [`priority`]: UpgradeStrategy::priority
/// [`handles`]: UpgradeStrategy::handles
pub trait UpgradeStrategy: Send + Sync {
    /// Selection rank. Higher wins where several strategies accept a shape.
    fn priority(&self) -> u32;

    /// Short name for trace logs.
    fn name(&self) -> &'static str;

    /// True when this strategy migrates members of `shape`.
    fn handles(&self, shape: MemberShape) -> bool;

    /// Migrates one member pair, reading the old universe side and writing
    /// through the new.
    fn upgrade(
        &self,
        upgrader: &Upgrader,
        ctx: &mut MigrationCtx<'_>,
        pair: &SlotPair,
    ) -> UpgradeOutcome;
}

/// An [`UpgradeStrategy`] submitted for process-wide discovery.
pub struct StrategyRegistration {
    strategy: &'static dyn UpgradeStrategy,
}

impl StrategyRegistration {
    /// Registers `strategy` for discovery.
    pub const fn new(strategy: &'static dyn UpgradeStrategy) -> Self {
        Self { strategy }
    }

    /// The registered strategy.
    pub fn strategy(&self) -> &'static dyn UpgradeStrategy {
        self.strategy
    }
}

inventory::collect!(StrategyRegistration);
