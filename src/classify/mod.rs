//! Clause classification: decide whether a filter clause restricts a
//! partitioning column, and extract its strategy and literal values.
//!
//! Only two shapes are recognized:
//!
//! - `column <op> expr` / `expr <op> column` (operator commuted when the
//!   column is on the right)
//! - `column <op> ANY(array)` / `column <op> ALL(array)`
//!
//! Anything else is skipped. Skipping is always safe: a missing restriction
//! widens the candidate set, it never narrows it.

mod folder;
mod opfamily;

use arrow::array::{Array, GenericListArray, OffsetSizeTrait};
use arrow_schema::DataType;
use datafusion_common::ScalarValue;
use datafusion_expr::Operator;
use tracing::trace;

pub use self::{
    folder::{ConstantFolder, LiteralFolder},
    opfamily::{BtreeOperatorFamily, OpFamilyMember, OperatorFamily},
};
pub(crate) use self::opfamily::TypeFamily;
use crate::{
    dimension::HyperSpace,
    error::{PruneError, Result},
    expr::{Clause, ClauseExpr, Strategy},
};

/// Plan-time services the classifier depends on.
#[derive(Clone, Copy, Debug)]
pub struct ClassifyContext<'a> {
    folder: &'a dyn ConstantFolder,
    operators: &'a dyn OperatorFamily,
}

impl<'a> ClassifyContext<'a> {
    pub fn new(folder: &'a dyn ConstantFolder, operators: &'a dyn OperatorFamily) -> Self {
        Self { folder, operators }
    }

    pub fn folder(&self) -> &'a dyn ConstantFolder {
        self.folder
    }

    pub fn operators(&self) -> &'a dyn OperatorFamily {
        self.operators
    }
}

impl Default for ClassifyContext<'static> {
    fn default() -> Self {
        Self {
            folder: &LiteralFolder,
            operators: &BtreeOperatorFamily,
        }
    }
}

/// Literal values of a classified clause.
#[derive(Clone, Debug, PartialEq)]
pub struct DimensionValues {
    /// Non-null values; a single element for plain comparisons.
    pub values: Vec<ScalarValue>,
    /// ANY/IN semantics (values ORed) rather than ALL (values ANDed).
    pub use_or: bool,
    /// Type to interpret `values` as. For array operands this is the element type.
    pub data_type: DataType,
}

impl DimensionValues {
    pub fn single(value: ScalarValue) -> Self {
        Self {
            data_type: value.data_type(),
            values: vec![value],
            use_or: false,
        }
    }

    pub fn any(values: Vec<ScalarValue>, data_type: DataType) -> Self {
        Self {
            values,
            use_or: true,
            data_type,
        }
    }

    pub fn all(values: Vec<ScalarValue>, data_type: DataType) -> Self {
        Self {
            values,
            use_or: false,
            data_type,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A clause that restricts one dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedClause {
    /// Position of the restricted dimension in the hypertable's space.
    pub dimension: usize,
    pub strategy: Strategy,
    pub values: DimensionValues,
}

#[derive(Clone, Copy)]
enum Shape {
    Scalar,
    Array { use_or: bool },
}

/// Classify one clause against the dimensions of `space`.
///
/// Returns `Ok(None)` when the clause does not restrict any dimension.
/// Errors are reserved for clauses of a recognized shape whose operand is
/// malformed, or for failures of the injected services.
pub fn classify(
    clause: &Clause,
    space: &HyperSpace,
    ctx: &ClassifyContext<'_>,
) -> Result<Option<ClassifiedClause>> {
    if clause.contains_mutable_functions() {
        trace!(?clause, "skipping clause with mutable functions");
        return Ok(None);
    }

    match clause {
        Clause::Op { op, args } => classify_args(*op, args, Shape::Scalar, space, ctx),
        Clause::ArrayOp { op, use_or, args } => classify_args(
            *op,
            args,
            Shape::Array { use_or: *use_or },
            space,
            ctx,
        ),
        Clause::Other(kind) => {
            trace!(%kind, "skipping clause of unrecognized shape");
            Ok(None)
        }
    }
}

fn classify_args(
    op: Operator,
    args: &[ClauseExpr],
    shape: Shape,
    space: &HyperSpace,
    ctx: &ClassifyContext<'_>,
) -> Result<Option<ClassifiedClause>> {
    let [left, right] = args else {
        trace!(%op, arity = args.len(), "skipping non-binary comparison");
        return Ok(None);
    };
    let (left, right) = (left.strip_relabel(), right.strip_relabel());

    let (column, expr, op) = match (left, right) {
        (ClauseExpr::Column(column), expr) => (column, expr, op),
        (expr, ClauseExpr::Column(column)) => match ctx.operators.commutator(op) {
            Some(commuted) => (column, expr, commuted),
            None => {
                trace!(%op, %column, "skipping comparison without a commutator");
                return Ok(None);
            }
        },
        _ => {
            trace!(%op, "skipping comparison without a bare column operand");
            return Ok(None);
        }
    };

    let Some(dimension) = space.position_of(column) else {
        trace!(%column, "skipping comparison on a non-partitioning column");
        return Ok(None);
    };

    let ClauseExpr::Literal(literal) = ctx.folder.fold(expr)? else {
        trace!(%column, "skipping comparison whose operand does not fold to a literal");
        return Ok(None);
    };
    if !ctx.operators.is_strict(op) {
        trace!(%op, %column, "skipping non-strict operator");
        return Ok(None);
    }

    let (values, value_type) = match shape {
        Shape::Scalar => {
            // A strict operator against NULL matches nothing, but there is
            // no restriction to record for it either.
            if literal.is_null() {
                trace!(%column, "skipping comparison against NULL");
                return Ok(None);
            }
            let value_type = literal.data_type();
            (DimensionValues::single(literal), value_type)
        }
        Shape::Array { use_or } => {
            let (values, element_type) = array_values(&literal)?;
            // `x op ALL('{}')` is true for every row.
            if !use_or && values.is_empty() {
                trace!(%column, "skipping ALL over an empty array");
                return Ok(None);
            }
            // No element to compare, so the element type is irrelevant.
            let value_type = if values.is_empty() {
                space.dimensions()[dimension].column_type().clone()
            } else {
                element_type.clone()
            };
            let values = DimensionValues {
                values,
                use_or,
                data_type: element_type,
            };
            (values, value_type)
        }
    };

    let column_type = space.dimensions()[dimension].column_type();
    let Some(member) = ctx.operators.member(op, column_type, &value_type) else {
        trace!(
            %op,
            %column,
            ?column_type,
            ?value_type,
            "skipping operator outside the column's ordering family"
        );
        return Ok(None);
    };

    Ok(Some(ClassifiedClause {
        dimension,
        strategy: member.strategy,
        values,
    }))
}

/// Non-null elements of an array literal, with the element type.
fn array_values(literal: &ScalarValue) -> Result<(Vec<ScalarValue>, DataType)> {
    match literal {
        ScalarValue::List(list) => list_values(list.as_ref()),
        ScalarValue::LargeList(list) => list_values(list.as_ref()),
        other => Err(PruneError::NotAnArray {
            data_type: other.data_type(),
        }),
    }
}

fn list_values<O: OffsetSizeTrait>(
    list: &GenericListArray<O>,
) -> Result<(Vec<ScalarValue>, DataType)> {
    let element_type = list.value_type();
    if list.is_empty() || list.is_null(0) {
        return Ok((Vec::new(), element_type));
    }

    let elements = list.value(0);
    let mut values = Vec::with_capacity(elements.len());
    for i in 0..elements.len() {
        if !elements.is_null(i) {
            values.push(ScalarValue::try_from_array(elements.as_ref(), i)?);
        }
    }
    Ok((values, element_type))
}
