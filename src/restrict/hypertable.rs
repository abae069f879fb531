use datafusion_expr::Expr as DfExpr;
use tracing::debug;

use super::DimensionRestriction;
use crate::{
    catalog::{Catalog, SliceScanner},
    classify::{ClassifyContext, classify},
    compile::clauses_from_df_expr,
    dimension::HyperSpace,
    error::Result,
    expr::Clause,
    options::RestrictOptions,
    slice::{CandidateSliceSet, ChunkId},
};

/// Restrictions on every dimension of one hypertable, built for one query.
///
/// Created empty, fed the query's top-level filter clauses, then consumed
/// once to find the chunks that may hold matching rows.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use arrow_schema::DataType;
/// use hyperprune::{
///     ChunkId, ClassifyContext, Clause, Dimension, DimensionId, HyperSpace,
///     HypertableRestrictInfo, MemoryCatalog, Slice, SliceId,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let space = HyperSpace::new(
///     1,
///     vec![Dimension::open(DimensionId(1), "time", DataType::Int64)],
/// );
///
/// let catalog = MemoryCatalog::new();
/// for i in 0..4 {
///     catalog.add_slice(Slice::new(SliceId(i), DimensionId(1), i64::from(i) * 100, i64::from(i + 1) * 100));
///     catalog.add_chunk(ChunkId(i), vec![SliceId(i)]);
/// }
///
/// let mut restrictions = HypertableRestrictInfo::new(&space);
/// restrictions.ingest(
///     &[Clause::gt_eq("time", 100i64), Clause::lt("time", 200i64)],
///     &ClassifyContext::default(),
/// )?;
/// assert!(restrictions.has_restrictions());
///
/// let chunks = restrictions.resolve_candidate_chunks(&catalog)?;
/// assert_eq!(chunks, vec![ChunkId(1)]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HypertableRestrictInfo<'a> {
    space: &'a HyperSpace,
    restrictions: Vec<DimensionRestriction>,
    num_base_restrictions: usize,
    options: RestrictOptions,
}

impl<'a> HypertableRestrictInfo<'a> {
    pub fn new(space: &'a HyperSpace) -> Self {
        Self::with_options(space, RestrictOptions::default())
    }

    /// One empty restriction per dimension, in the space's canonical order.
    pub fn with_options(space: &'a HyperSpace, options: RestrictOptions) -> Self {
        let restrictions = space
            .dimensions()
            .iter()
            .map(DimensionRestriction::for_dimension)
            .collect();
        Self {
            space,
            restrictions,
            num_base_restrictions: 0,
            options,
        }
    }

    pub fn space(&self) -> &'a HyperSpace {
        self.space
    }

    pub fn options(&self) -> &RestrictOptions {
        &self.options
    }

    /// Restriction of the dimension at `index`.
    pub fn restriction(&self, index: usize) -> Option<&DimensionRestriction> {
        self.restrictions.get(index)
    }

    /// Restriction of the dimension partitioning on `column`.
    pub fn restriction_for(&self, column: &str) -> Option<&DimensionRestriction> {
        self.space
            .position_of(column)
            .and_then(|idx| self.restrictions.get(idx))
    }

    /// Fold one clause in; returns whether it restricted a dimension.
    pub fn add_clause(&mut self, clause: &Clause, ctx: &ClassifyContext<'_>) -> Result<bool> {
        let Some(classified) = classify(clause, self.space, ctx)? else {
            return Ok(false);
        };

        let restriction = &mut self.restrictions[classified.dimension];
        let added = restriction.add(classified.strategy, &classified.values, &self.options)?;
        if added {
            self.num_base_restrictions += 1;
            debug!(
                column = self.space.dimensions()[classified.dimension].column(),
                strategy = %classified.strategy,
                values = classified.values.len(),
                "restriction added"
            );
        }
        Ok(added)
    }

    /// Fold in every top-level filter clause of a query.
    ///
    /// Clauses that do not restrict a dimension are skipped.
    pub fn ingest<'c, I>(&mut self, clauses: I, ctx: &ClassifyContext<'_>) -> Result<()>
    where
        I: IntoIterator<Item = &'c Clause>,
    {
        for clause in clauses {
            self.add_clause(clause, ctx)?;
        }
        Ok(())
    }

    /// Fold in the conjuncts of a DataFusion filter expression.
    pub fn ingest_df_expr(&mut self, expr: &DfExpr, ctx: &ClassifyContext<'_>) -> Result<()> {
        let clauses = clauses_from_df_expr(expr);
        self.ingest(&clauses, ctx)
    }

    /// True if at least one clause restricted a dimension.
    pub fn has_restrictions(&self) -> bool {
        self.num_base_restrictions > 0
    }

    pub fn num_restrictions(&self) -> usize {
        self.num_base_restrictions
    }

    /// Candidate slices of every dimension, in dimension order.
    ///
    /// Returns `None` as soon as one dimension has no candidates: a chunk
    /// needs a slice in every dimension, so nothing can match and the
    /// remaining dimensions are not scanned.
    pub fn candidate_slices<S: SliceScanner + ?Sized>(
        &self,
        scanner: &S,
    ) -> Result<Option<Vec<CandidateSliceSet>>> {
        let mut sets = Vec::with_capacity(self.restrictions.len());
        for (dimension, restriction) in self.space.dimensions().iter().zip(&self.restrictions) {
            let set = restriction.slices(dimension.id(), scanner)?;
            if set.is_empty() {
                debug!(
                    column = dimension.column(),
                    "no candidate slices, excluding all chunks"
                );
                return Ok(None);
            }
            sets.push(set);
        }
        Ok(Some(sets))
    }

    /// Chunks that may hold rows matching every ingested clause.
    pub fn resolve_candidate_chunks<C: Catalog + ?Sized>(self, catalog: &C) -> Result<Vec<ChunkId>> {
        let Some(sets) = self.candidate_slices(catalog)? else {
            return Ok(Vec::new());
        };
        let chunks = catalog.find_chunks(self.space, &sets)?;
        debug!(
            hypertable = self.space.hypertable(),
            restrictions = self.num_base_restrictions,
            chunks = chunks.len(),
            "resolved candidate chunks"
        );
        Ok(chunks)
    }
}
