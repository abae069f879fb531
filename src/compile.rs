//! Lowering of DataFusion filter expressions into restriction clauses.
//!
//! The lowering is purely structural: it never decides whether a clause is
//! usable for exclusion. That is the classifier's job, which sees every
//! shape, including the ones lowered to [`Clause::Other`].

use datafusion_expr::{Expr as DfExpr, Operator, utils::split_conjunction};

use crate::expr::{Clause, ClauseExpr};

/// Split `expr` into its top-level conjuncts and lower each one.
///
/// - `a <op> b` becomes [`Clause::Op`]
/// - `x IN (..)` becomes `x = ANY(ARRAY[..])`, `x NOT IN (..)` becomes
///   `x <> ALL(ARRAY[..])`
/// - `x BETWEEN lo AND hi` becomes `x >= lo` and `x <= hi`
/// - everything else becomes [`Clause::Other`]
///
/// # Example
/// ```
/// use datafusion_expr::{col, lit};
/// use hyperprune::{Clause, clauses_from_df_expr};
///
/// let expr = col("time").gt_eq(lit(100i64)).and(col("time").lt(lit(200i64)));
/// let clauses = clauses_from_df_expr(&expr);
/// assert_eq!(
///     clauses,
///     vec![Clause::gt_eq("time", 100i64), Clause::lt("time", 200i64)]
/// );
/// ```
pub fn clauses_from_df_expr(expr: &DfExpr) -> Vec<Clause> {
    let mut clauses = Vec::new();
    for conjunct in split_conjunction(expr) {
        lower_conjunct(conjunct, &mut clauses);
    }
    clauses
}

fn lower_conjunct(expr: &DfExpr, clauses: &mut Vec<Clause>) {
    match expr {
        DfExpr::Alias(alias) => lower_conjunct(&alias.expr, clauses),
        DfExpr::BinaryExpr(binary) if !matches!(binary.op, Operator::And | Operator::Or) => {
            clauses.push(Clause::op(
                lower_operand(&binary.left),
                binary.op,
                lower_operand(&binary.right),
            ));
        }
        DfExpr::InList(in_list) => {
            let (op, use_or) = if in_list.negated {
                (Operator::NotEq, false)
            } else {
                (Operator::Eq, true)
            };
            clauses.push(Clause::ArrayOp {
                op,
                use_or,
                args: vec![
                    lower_operand(&in_list.expr),
                    ClauseExpr::Array(in_list.list.iter().map(lower_operand).collect()),
                ],
            });
        }
        DfExpr::Between(between) if !between.negated => {
            let column = lower_operand(&between.expr);
            clauses.push(Clause::op(
                column.clone(),
                Operator::GtEq,
                lower_operand(&between.low),
            ));
            clauses.push(Clause::op(
                column,
                Operator::LtEq,
                lower_operand(&between.high),
            ));
        }
        other => clauses.push(Clause::Other(other.variant_name().to_string())),
    }
}

fn lower_operand(expr: &DfExpr) -> ClauseExpr {
    match expr {
        DfExpr::Alias(alias) => lower_operand(&alias.expr),
        DfExpr::Column(col) => ClauseExpr::Column(col.name.clone()),
        DfExpr::Literal(value, _) => ClauseExpr::Literal(value.clone()),
        DfExpr::Cast(cast) => ClauseExpr::cast(lower_operand(&cast.expr), cast.data_type.clone()),
        DfExpr::TryCast(cast) => {
            ClauseExpr::cast(lower_operand(&cast.expr), cast.data_type.clone())
        }
        DfExpr::Negative(inner) => ClauseExpr::Negative(Box::new(lower_operand(inner))),
        DfExpr::ScalarFunction(func) => ClauseExpr::Function {
            name: func.func.name().to_string(),
            volatility: func.func.signature().volatility,
            args: func.args.iter().map(lower_operand).collect(),
        },
        other => ClauseExpr::Opaque(other.variant_name().to_string()),
    }
}
