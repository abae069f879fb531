use std::fmt;

use arrow_schema::DataType;
use datafusion_common::ScalarValue;
use datafusion_expr::{Operator, Volatility};

/// Comparison class derived from a column type's ordering operator family.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Strategy {
    Lt,
    LtEq,
    Eq,
    GtEq,
    Gt,
}

impl Strategy {
    /// Strategy of `b op a` given `a op b`.
    pub fn commute(self) -> Self {
        match self {
            Strategy::Lt => Strategy::Gt,
            Strategy::LtEq => Strategy::GtEq,
            Strategy::Eq => Strategy::Eq,
            Strategy::GtEq => Strategy::LtEq,
            Strategy::Gt => Strategy::Lt,
        }
    }

    /// Evaluate `lhs <strategy> rhs` on internal integers.
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Strategy::Lt => lhs < rhs,
            Strategy::LtEq => lhs <= rhs,
            Strategy::Eq => lhs == rhs,
            Strategy::GtEq => lhs >= rhs,
            Strategy::Gt => lhs > rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Strategy::Lt => "<",
            Strategy::LtEq => "<=",
            Strategy::Eq => "=",
            Strategy::GtEq => ">=",
            Strategy::Gt => ">",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Operand of a filter clause.
///
/// This is deliberately smaller than a planner's expression tree: it only
/// keeps the shapes that matter for deciding whether a clause restricts a
/// partitioning column. Everything else collapses into [`ClauseExpr::Opaque`].
#[derive(Clone, Debug, PartialEq)]
pub enum ClauseExpr {
    Column(String),
    Literal(ScalarValue),
    /// Binary-compatible coercion; transparent for classification.
    Relabel(Box<ClauseExpr>),
    Cast {
        expr: Box<ClauseExpr>,
        data_type: DataType,
    },
    Negative(Box<ClauseExpr>),
    /// Array constructor, e.g. `ARRAY[1, 2, 3]` or the list of an `IN`.
    Array(Vec<ClauseExpr>),
    Function {
        name: String,
        volatility: Volatility,
        args: Vec<ClauseExpr>,
    },
    Opaque(String),
}

impl ClauseExpr {
    pub fn column(name: impl Into<String>) -> Self {
        ClauseExpr::Column(name.into())
    }

    pub fn literal(value: impl Into<ScalarValue>) -> Self {
        ClauseExpr::Literal(value.into())
    }

    pub fn relabel(expr: ClauseExpr) -> Self {
        ClauseExpr::Relabel(Box::new(expr))
    }

    pub fn cast(expr: ClauseExpr, data_type: DataType) -> Self {
        ClauseExpr::Cast {
            expr: Box::new(expr),
            data_type,
        }
    }

    pub fn function(name: impl Into<String>, volatility: Volatility, args: Vec<ClauseExpr>) -> Self {
        ClauseExpr::Function {
            name: name.into(),
            volatility,
            args,
        }
    }

    /// Array constructor from literal values.
    pub fn array<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        ClauseExpr::Array(values.into_iter().map(ClauseExpr::literal).collect())
    }

    /// Strip any number of relabel wrappers.
    pub(crate) fn strip_relabel(&self) -> &ClauseExpr {
        let mut expr = self;
        while let ClauseExpr::Relabel(inner) = expr {
            expr = inner;
        }
        expr
    }

    /// True if any function in the tree is not immutable.
    pub(crate) fn contains_mutable_functions(&self) -> bool {
        match self {
            ClauseExpr::Function {
                volatility, args, ..
            } => {
                *volatility != Volatility::Immutable
                    || args.iter().any(ClauseExpr::contains_mutable_functions)
            }
            ClauseExpr::Relabel(inner) | ClauseExpr::Negative(inner) => {
                inner.contains_mutable_functions()
            }
            ClauseExpr::Cast { expr, .. } => expr.contains_mutable_functions(),
            ClauseExpr::Array(elements) => elements.iter().any(ClauseExpr::contains_mutable_functions),
            ClauseExpr::Column(_) | ClauseExpr::Literal(_) | ClauseExpr::Opaque(_) => false,
        }
    }
}

/// One top-level conjunct of a query filter.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    /// `args[0] op args[1]`
    Op { op: Operator, args: Vec<ClauseExpr> },
    /// `args[0] op ANY(args[1])` when `use_or`, otherwise `op ALL(...)`.
    ArrayOp {
        op: Operator,
        use_or: bool,
        args: Vec<ClauseExpr>,
    },
    Other(String),
}

impl Clause {
    pub fn op(left: ClauseExpr, op: Operator, right: ClauseExpr) -> Self {
        Clause::Op {
            op,
            args: vec![left, right],
        }
    }

    /// `column op value` with a literal right side.
    pub fn cmp(column: impl Into<String>, op: Operator, value: impl Into<ScalarValue>) -> Self {
        Self::op(ClauseExpr::column(column), op, ClauseExpr::literal(value))
    }

    pub fn eq(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, Operator::Eq, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, Operator::Lt, value)
    }

    pub fn lt_eq(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, Operator::LtEq, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, Operator::Gt, value)
    }

    pub fn gt_eq(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, Operator::GtEq, value)
    }

    /// `column = ANY(ARRAY[values])`, i.e. `column IN (values)`.
    pub fn in_list<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        Clause::ArrayOp {
            op: Operator::Eq,
            use_or: true,
            args: vec![ClauseExpr::column(column), ClauseExpr::array(values)],
        }
    }

    /// `column op ALL(ARRAY[values])`
    pub fn all<I, V>(column: impl Into<String>, op: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        Clause::ArrayOp {
            op,
            use_or: false,
            args: vec![ClauseExpr::column(column), ClauseExpr::array(values)],
        }
    }

    pub(crate) fn contains_mutable_functions(&self) -> bool {
        match self {
            Clause::Op { args, .. } | Clause::ArrayOp { args, .. } => {
                args.iter().any(ClauseExpr::contains_mutable_functions)
            }
            Clause::Other(_) => false,
        }
    }
}
