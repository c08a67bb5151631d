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

//! Member shapes, the dispatch key for strategy selection.

use proteus_script::ValueType;

/// The coarse shape of a member's declared type.
///
/// Computed once per member pair and matched against
/// [`UpgradeStrategy::handles`], instead of every strategy re-probing the
/// declared type on every member.
///
/// [`UpgradeStrategy::handles`]: crate::strategy::UpgradeStrategy::handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberShape {
    /// Scalar kinds, copied verbatim.
    Primitive,
    /// Value aggregates, migrated field by field.
    Struct,
    /// Object references, migrated through the reference map.
    Class,
    /// Lists and maps, rebuilt element by element.
    Collection,
    /// Fixed-length arrays.
    Array,
    /// Shapes no strategy handles (function references).
    Opaque,
}

impl MemberShape {
    /// The shape of a declared type.
    pub fn of(ty: &ValueType) -> Self {
        match ty {
            ValueType::Bool
            | ValueType::Int
            | ValueType::Float
            | ValueType::Char
            | ValueType::Str => MemberShape::Primitive,
            ValueType::Struct(_) => MemberShape::Struct,
            ValueType::Class(_) => MemberShape::Class,
            ValueType::List(_) | ValueType::Map(_, _) => MemberShape::Collection,
            ValueType::Array(_) => MemberShape::Array,
            ValueType::Delegate => MemberShape::Opaque,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_partition_the_type_space() {
        assert_eq!(MemberShape::of(&ValueType::Int), MemberShape::Primitive);
        assert_eq!(MemberShape::of(&ValueType::Str), MemberShape::Primitive);
        assert_eq!(
            MemberShape::of(&ValueType::Struct("game.Stats".into())),
            MemberShape::Struct
        );
        assert_eq!(
            MemberShape::of(&ValueType::Class("game.Actor".into())),
            MemberShape::Class
        );
        assert_eq!(
            MemberShape::of(&ValueType::List(Box::new(ValueType::Int))),
            MemberShape::Collection
        );
        assert_eq!(
            MemberShape::of(&ValueType::Map(
                Box::new(ValueType::Str),
                Box::new(ValueType::Int)
            )),
            MemberShape::Collection
        );
        assert_eq!(
            MemberShape::of(&ValueType::Array(Box::new(ValueType::Float))),
            MemberShape::Array
        );
        assert_eq!(MemberShape::of(&ValueType::Delegate), MemberShape::Opaque);
    }
}
