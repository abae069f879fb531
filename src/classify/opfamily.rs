use std::fmt::Debug;

use arrow_schema::DataType;
use datafusion_expr::Operator;

use crate::expr::Strategy;

/// Properties of an operator within a type's ordering family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpFamilyMember {
    pub strategy: Strategy,
    pub left_type: DataType,
    pub right_type: DataType,
}

/// Operator introspection used to turn a comparison into a [`Strategy`].
pub trait OperatorFamily: Debug + Send + Sync {
    /// Operator `op'` such that `a op b` equals `b op' a`.
    fn commutator(&self, op: Operator) -> Option<Operator> {
        op.swap()
    }

    /// True if the operator yields NULL whenever an input is NULL.
    fn is_strict(&self, op: Operator) -> bool;

    /// Ordering-family membership of `op` comparing a `column_type` column
    /// against a `value_type` operand.
    ///
    /// `None` unless both types are in the same type family.
    fn member(
        &self,
        op: Operator,
        column_type: &DataType,
        value_type: &DataType,
    ) -> Option<OpFamilyMember>;
}

/// The five ordering comparisons over every totally ordered Arrow type.
#[derive(Clone, Copy, Debug, Default)]
pub struct BtreeOperatorFamily;

impl OperatorFamily for BtreeOperatorFamily {
    fn is_strict(&self, op: Operator) -> bool {
        !matches!(
            op,
            Operator::IsDistinctFrom | Operator::IsNotDistinctFrom | Operator::And | Operator::Or
        )
    }

    fn member(
        &self,
        op: Operator,
        column_type: &DataType,
        value_type: &DataType,
    ) -> Option<OpFamilyMember> {
        let family = TypeFamily::of(column_type)?;
        if TypeFamily::of(value_type) != Some(family) {
            return None;
        }
        let strategy = match op {
            Operator::Lt => Strategy::Lt,
            Operator::LtEq => Strategy::LtEq,
            Operator::Eq => Strategy::Eq,
            Operator::GtEq => Strategy::GtEq,
            Operator::Gt => Strategy::Gt,
            _ => return None,
        };
        Some(OpFamilyMember {
            strategy,
            left_type: column_type.clone(),
            right_type: value_type.clone(),
        })
    }
}

/// Groups of types whose values convert into one another without changing
/// their order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TypeFamily {
    Boolean,
    Integer,
    Float,
    Decimal,
    String,
    Binary,
    /// Dates and timestamps: points on the same timeline.
    Timeline,
    TimeOfDay,
    Duration,
}

impl TypeFamily {
    /// Family of `data_type`, looking through dictionaries. `None` for
    /// types without a total order (intervals, nested types, NULL).
    pub(crate) fn of(data_type: &DataType) -> Option<Self> {
        let family = match data_type {
            DataType::Dictionary(_, value) => return Self::of(value),
            DataType::Boolean => Self::Boolean,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Self::String,
            DataType::Binary
            | DataType::LargeBinary
            | DataType::BinaryView
            | DataType::FixedSizeBinary(_) => Self::Binary,
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(..) => Self::Timeline,
            DataType::Time32(_) | DataType::Time64(_) => Self::TimeOfDay,
            DataType::Duration(_) => Self::Duration,
            DataType::Decimal128(..) | DataType::Decimal256(..) => Self::Decimal,
            other if other.is_integer() => Self::Integer,
            other if other.is_floating() => Self::Float,
            _ => return None,
        };
        Some(family)
    }
}
