use std::fmt::Debug;

use arrow_schema::DataType;
use datafusion_common::ScalarValue;

use crate::{error::Result, expr::ClauseExpr};

/// Reduces an expression to a literal where it can be evaluated at plan time.
///
/// Implementations must not evaluate anything whose value can change within
/// a query; such clauses are rejected before folding anyway.
pub trait ConstantFolder: Debug + Send + Sync {
    fn fold(&self, expr: &ClauseExpr) -> Result<ClauseExpr>;
}

/// Folds literal casts, negation, relabels and literal array constructors.
///
/// A cast that fails is left in place, so the clause stays non-literal and
/// is skipped rather than aborting planning.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiteralFolder;

impl ConstantFolder for LiteralFolder {
    fn fold(&self, expr: &ClauseExpr) -> Result<ClauseExpr> {
        let folded = match expr {
            ClauseExpr::Relabel(inner) => self.fold(inner)?,
            ClauseExpr::Cast { expr, data_type } => match self.fold(expr)? {
                ClauseExpr::Literal(value) => match value.cast_to(data_type) {
                    Ok(cast) => ClauseExpr::Literal(cast),
                    Err(_) => ClauseExpr::cast(ClauseExpr::Literal(value), data_type.clone()),
                },
                other => ClauseExpr::cast(other, data_type.clone()),
            },
            ClauseExpr::Negative(inner) => match self.fold(inner)? {
                ClauseExpr::Literal(value) => match value.arithmetic_negate() {
                    Ok(negated) => ClauseExpr::Literal(negated),
                    Err(_) => ClauseExpr::Negative(Box::new(ClauseExpr::Literal(value))),
                },
                other => ClauseExpr::Negative(Box::new(other)),
            },
            ClauseExpr::Array(elements) => fold_array(self, elements)?,
            ClauseExpr::Function {
                name,
                volatility,
                args,
            } => ClauseExpr::Function {
                name: name.clone(),
                volatility: *volatility,
                args: args.iter().map(|a| self.fold(a)).collect::<Result<_>>()?,
            },
            ClauseExpr::Column(_) | ClauseExpr::Literal(_) | ClauseExpr::Opaque(_) => expr.clone(),
        };
        Ok(folded)
    }
}

/// Fold `ARRAY[...]` into a list literal when every element folds to a literal.
///
/// The element type is the type of the first non-null element; the others
/// are cast to it.
fn fold_array(folder: &LiteralFolder, elements: &[ClauseExpr]) -> Result<ClauseExpr> {
    let folded = elements
        .iter()
        .map(|e| folder.fold(e))
        .collect::<Result<Vec<_>>>()?;

    let mut values = Vec::with_capacity(folded.len());
    for element in &folded {
        match element {
            ClauseExpr::Literal(value) => values.push(value.clone()),
            _ => return Ok(ClauseExpr::Array(folded)),
        }
    }

    let element_type = values
        .iter()
        .find(|v| !v.is_null())
        .map(ScalarValue::data_type)
        .unwrap_or(DataType::Null);

    let mut typed = Vec::with_capacity(values.len());
    for value in values {
        if value.data_type() == element_type {
            typed.push(value);
        } else {
            match value.cast_to(&element_type) {
                Ok(cast) => typed.push(cast),
                Err(_) => return Ok(ClauseExpr::Array(folded)),
            }
        }
    }

    Ok(ClauseExpr::Literal(ScalarValue::List(
        ScalarValue::new_list_nullable(&typed, &element_type),
    )))
}
