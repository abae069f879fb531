/// Options for controlling chunk exclusion
#[derive(Clone, Debug, Default)]
pub struct RestrictOptions {
    range_in_list_hull: bool,
    max_in_list_partitions: Option<usize>,
}

impl RestrictOptions {
    /// Create a new builder for RestrictOptions
    ///
    /// # Example
    /// ```
    /// use hyperprune::RestrictOptions;
    ///
    /// let options = RestrictOptions::builder()
    ///     .range_in_list_hull(true)
    ///     .max_in_list_partitions(64)
    ///     .build();
    /// ```
    pub fn builder() -> RestrictOptionsBuilder {
        RestrictOptionsBuilder::default()
    }

    /// Check if multi-value ANY/IN clauses on open dimensions fold to their hull
    pub fn range_in_list_hull(&self) -> bool {
        self.range_in_list_hull
    }

    /// Largest number of distinct partitions an IN list on a closed dimension may map to
    pub fn max_in_list_partitions(&self) -> Option<usize> {
        self.max_in_list_partitions
    }
}

impl From<RestrictOptions> for RestrictOptionsBuilder {
    fn from(options: RestrictOptions) -> Self {
        Self {
            range_in_list_hull: Some(options.range_in_list_hull),
            max_in_list_partitions: options.max_in_list_partitions,
        }
    }
}

/// Builder for RestrictOptions
#[derive(Clone, Debug, Default)]
pub struct RestrictOptionsBuilder {
    range_in_list_hull: Option<bool>,
    max_in_list_partitions: Option<usize>,
}

impl RestrictOptionsBuilder {
    /// Fold `time IN (t1, t2, ...)` on open dimensions as `time BETWEEN min AND max`
    /// (default: false).
    ///
    /// When disabled, a disjunction of several values cannot be expressed as a
    /// single interval and the clause is dropped. When enabled, the clause
    /// restricts the dimension to the smallest interval covering every value,
    /// which may still include chunks between the listed values.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperprune::RestrictOptions;
    ///
    /// let options = RestrictOptions::builder().range_in_list_hull(true).build();
    /// assert!(options.range_in_list_hull());
    /// ```
    pub fn range_in_list_hull(mut self, value: bool) -> Self {
        self.range_in_list_hull = Some(value);
        self
    }

    /// Drop IN lists on closed dimensions mapping to more than `value`
    /// partitions (default: unlimited).
    ///
    /// Each candidate partition costs one slice lookup. Past this limit the
    /// dimension is scanned in full instead.
    pub fn max_in_list_partitions(mut self, value: usize) -> Self {
        self.max_in_list_partitions = Some(value);
        self
    }

    /// Build the RestrictOptions
    pub fn build(self) -> RestrictOptions {
        RestrictOptions {
            range_in_list_hull: self.range_in_list_hull.unwrap_or(false),
            max_in_list_partitions: self.max_in_list_partitions,
        }
    }
}
