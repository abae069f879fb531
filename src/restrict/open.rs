use tracing::debug;

use crate::{
    catalog::SliceScanner,
    classify::DimensionValues,
    dimension::DimensionId,
    error::Result,
    expr::Strategy,
    options::RestrictOptions,
    slice::{CandidateSliceSet, ScanBound},
    time::{time_value_to_internal, truncates},
};

/// Tightening interval of candidate values for a range-partitioned dimension.
///
/// Successive clauses are ANDed: the upper bound only ever moves down and
/// the lower bound only ever moves up. An equality tightens both sides at
/// once, so one outside the current interval leaves it empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenRestriction {
    lower: Option<ScanBound>,
    upper: Option<ScanBound>,
}

impl OpenRestriction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lower(&self) -> Option<ScanBound> {
        self.lower
    }

    pub fn upper(&self) -> Option<ScanBound> {
        self.upper
    }

    /// Fold one classified clause into the interval.
    ///
    /// Returns whether the interval changed. A disjunction of several values
    /// cannot be represented as one interval and is dropped, unless
    /// [`RestrictOptions::range_in_list_hull`] is set.
    pub fn add(
        &mut self,
        strategy: Strategy,
        values: &DimensionValues,
        options: &RestrictOptions,
    ) -> Result<bool> {
        if values.use_or && values.len() > 1 {
            if options.range_in_list_hull() {
                return self.add_hull(strategy, values);
            }
            return Ok(false);
        }

        let strategy = relax(strategy, values);
        let mut added = false;
        for value in &values.values {
            let Some(value) = time_value_to_internal(value, &values.data_type)? else {
                continue;
            };
            added |= self.apply(strategy, value);
        }
        Ok(added)
    }

    /// `col op ANY(v1, .., vn)` holds only if `col op v` holds for the
    /// loosest `v`, and `col = ANY(...)` only within `[min, max]`.
    fn add_hull(&mut self, strategy: Strategy, values: &DimensionValues) -> Result<bool> {
        let mut internal = Vec::with_capacity(values.len());
        for value in &values.values {
            if let Some(v) = time_value_to_internal(value, &values.data_type)? {
                internal.push(v);
            }
        }
        let (Some(&min), Some(&max)) = (internal.iter().min(), internal.iter().max()) else {
            return Ok(false);
        };

        let strategy = relax(strategy, values);
        let added = match strategy {
            Strategy::Lt | Strategy::LtEq => self.tighten_upper(strategy, max),
            Strategy::Gt | Strategy::GtEq => self.tighten_lower(strategy, min),
            Strategy::Eq => {
                let lower = self.tighten_lower(Strategy::GtEq, min);
                let upper = self.tighten_upper(Strategy::LtEq, max);
                lower | upper
            }
        };
        Ok(added)
    }

    fn apply(&mut self, strategy: Strategy, value: i64) -> bool {
        match strategy {
            Strategy::Lt | Strategy::LtEq => self.tighten_upper(strategy, value),
            Strategy::Gt | Strategy::GtEq => self.tighten_lower(strategy, value),
            // Intersected with the prior bounds rather than replacing them, so
            // `col < 5 AND col = 10` stays empty instead of widening to 10.
            Strategy::Eq => {
                self.tighten_lower(Strategy::GtEq, value);
                self.tighten_upper(Strategy::LtEq, value);
                true
            }
        }
    }

    fn tighten_upper(&mut self, strategy: Strategy, value: i64) -> bool {
        if self.upper.is_none_or(|upper| value < upper.value) {
            self.upper = Some(ScanBound::new(strategy, value));
            true
        } else {
            false
        }
    }

    fn tighten_lower(&mut self, strategy: Strategy, value: i64) -> bool {
        if self.lower.is_none_or(|lower| value > lower.value) {
            self.lower = Some(ScanBound::new(strategy, value));
            true
        } else {
            false
        }
    }

    /// Slices overlapping the interval; a single range scan.
    pub fn slices<S: SliceScanner + ?Sized>(
        &self,
        dimension: DimensionId,
        scanner: &S,
    ) -> Result<CandidateSliceSet> {
        let slices = scanner.scan_slices(dimension, self.upper, self.lower)?;
        debug!(
            %dimension,
            lower = ?self.lower,
            upper = ?self.upper,
            candidates = slices.len(),
            "resolved open dimension"
        );
        Ok(slices.into_iter().collect())
    }
}

/// Strict comparisons on values that lose precision internally must become
/// inclusive, or rows sharing the rounded value would be excluded.
fn relax(strategy: Strategy, values: &DimensionValues) -> Strategy {
    if !truncates(&values.data_type) {
        return strategy;
    }
    match strategy {
        Strategy::Lt => Strategy::LtEq,
        Strategy::Gt => Strategy::GtEq,
        other => other,
    }
}
