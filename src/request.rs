use datafusion_expr::Expr as DfExpr;

use crate::{
    catalog::Catalog,
    classify::ClassifyContext,
    compile::clauses_from_df_expr,
    dimension::HyperSpace,
    error::Result,
    expr::Clause,
    options::{RestrictOptions, RestrictOptionsBuilder},
    restrict::HypertableRestrictInfo,
    result::ExclusionResult,
};

/// Builder for one-shot chunk exclusion.
///
/// Provides a fluent API for feeding clauses and configuring options
/// without driving a [`HypertableRestrictInfo`] by hand.
///
/// # Examples
///
/// ```
/// use arrow_schema::DataType;
/// use datafusion_expr::{col, lit};
/// use hyperprune::{
///     ChunkId, Dimension, DimensionId, ExclusionRequest, HyperSpace, MemoryCatalog, Slice,
///     SliceId,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let space = HyperSpace::new(
///     1,
///     vec![Dimension::open(DimensionId(1), "time", DataType::Int64)],
/// );
/// let catalog = MemoryCatalog::new();
/// catalog.add_slice(Slice::new(SliceId(1), DimensionId(1), 0, 10));
/// catalog.add_slice(Slice::new(SliceId(2), DimensionId(1), 10, 20));
/// catalog.add_chunk(ChunkId(1), vec![SliceId(1)]);
/// catalog.add_chunk(ChunkId(2), vec![SliceId(2)]);
///
/// let expr = col("time").gt_eq(lit(12i64));
/// let result = ExclusionRequest::new(&space, &catalog)
///     .with_predicate(&expr)
///     .exclude()?;
///
/// assert_eq!(result.chunks(), &[ChunkId(2)]);
/// assert_eq!(result.restriction_count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct ExclusionRequest<'a, C: Catalog + ?Sized> {
    space: &'a HyperSpace,
    catalog: &'a C,
    clauses: Vec<Clause>,
    ctx: Option<ClassifyContext<'a>>,
    options: RestrictOptionsBuilder,
}

impl<'a, C: Catalog + ?Sized> ExclusionRequest<'a, C> {
    /// Creates a new exclusion request for the given space and catalog.
    pub fn new(space: &'a HyperSpace, catalog: &'a C) -> Self {
        Self {
            space,
            catalog,
            clauses: Vec::new(),
            ctx: None,
            options: RestrictOptions::builder(),
        }
    }

    /// Add the conjuncts of a DataFusion filter expression.
    pub fn with_predicate(mut self, expr: &DfExpr) -> Self {
        self.clauses.extend(clauses_from_df_expr(expr));
        self
    }

    /// Add already-lowered clauses.
    pub fn with_clauses(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.clauses.extend(clauses);
        self
    }

    /// Use custom folding and operator services instead of the defaults.
    pub fn with_context(mut self, ctx: ClassifyContext<'a>) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Replace all options at once.
    pub fn with_options(mut self, options: RestrictOptions) -> Self {
        self.options = options.into();
        self
    }

    /// See [`RestrictOptionsBuilder::range_in_list_hull`].
    pub fn range_in_list_hull(mut self, value: bool) -> Self {
        self.options = self.options.range_in_list_hull(value);
        self
    }

    /// See [`RestrictOptionsBuilder::max_in_list_partitions`].
    pub fn max_in_list_partitions(mut self, value: usize) -> Self {
        self.options = self.options.max_in_list_partitions(value);
        self
    }

    /// Classify every clause and resolve the candidate chunks.
    pub fn exclude(self) -> Result<ExclusionResult> {
        let ctx = match self.ctx {
            Some(ctx) => ctx,
            None => ClassifyContext::default(),
        };
        let mut info = HypertableRestrictInfo::with_options(self.space, self.options.build());
        info.ingest(&self.clauses, &ctx)?;

        let restriction_count = info.num_restrictions();
        let chunks = info.resolve_candidate_chunks(self.catalog)?;
        Ok(ExclusionResult::new(chunks, restriction_count, self.clauses.len()))
    }
}
