// PADDING OPTIONS
// ================================================================================================

/// Tuning knobs of the padding repair heuristic.
///
/// When a chunk overflows, the engine inserts padding symbols in front of the backtracking that
/// caused it. Shallow backtracks (`max_back_depth < chunk_size / small_backtrack_ratio`) are
/// absorbed by a block of `overflow_multiplier * overflow + overflow_slack` symbols at the start
/// of the chunk; deeper ones by padding placed right at the deepest backtrack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaddingOptions {
    small_backtrack_ratio: usize,
    overflow_multiplier: usize,
    overflow_slack: usize,
    extra_attempts: usize,
}

impl Default for PaddingOptions {
    fn default() -> Self {
        Self {
            small_backtrack_ratio: 8,
            overflow_multiplier: 4,
            overflow_slack: 2,
            extra_attempts: 1,
        }
    }
}

impl PaddingOptions {
    // CONSTRUCTOR
    // --------------------------------------------------------------------------------------------

    /// Creates a new instance of [PaddingOptions] from the specified parameters.
    ///
    /// # Errors
    /// Returns an error if `small_backtrack_ratio` or `overflow_multiplier` is zero.
    pub fn new(
        small_backtrack_ratio: usize,
        overflow_multiplier: usize,
        overflow_slack: usize,
    ) -> Result<Self, OptionsError> {
        if small_backtrack_ratio == 0 {
            return Err(OptionsError::ZeroBacktrackRatio);
        }
        if overflow_multiplier == 0 {
            return Err(OptionsError::ZeroOverflowMultiplier);
        }
        Ok(Self {
            small_backtrack_ratio,
            overflow_multiplier,
            overflow_slack,
            ..Self::default()
        })
    }

    /// Sets how many insertions beyond one per chunk the engine may attempt.
    pub fn with_extra_attempts(mut self, extra_attempts: usize) -> Self {
        self.extra_attempts = extra_attempts;
        self
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub const fn small_backtrack_ratio(&self) -> usize {
        self.small_backtrack_ratio
    }

    pub const fn overflow_multiplier(&self) -> usize {
        self.overflow_multiplier
    }

    pub const fn overflow_slack(&self) -> usize {
        self.overflow_slack
    }

    /// Returns the maximum number of padding insertions for a run split into `num_chunks`.
    pub const fn max_attempts(&self, num_chunks: usize) -> usize {
        num_chunks + self.extra_attempts
    }
}

// SIZE CLASS OPTIONS
// ================================================================================================

/// Parameters of the size classes inputs are padded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeClassOptions {
    unit: usize,
    max_bumps: u32,
    partition_limit: usize,
}

impl Default for SizeClassOptions {
    fn default() -> Self {
        Self {
            unit: Self::DEFAULT_UNIT,
            max_bumps: 3,
            partition_limit: 1 << 22,
        }
    }
}

impl SizeClassOptions {
    // CONSTANTS
    // --------------------------------------------------------------------------------------------

    /// Per-chunk sizes are multiples of this many symbols.
    pub const DEFAULT_UNIT: usize = 126;

    // CONSTRUCTOR
    // --------------------------------------------------------------------------------------------

    /// Creates a new instance of [SizeClassOptions] from the specified parameters.
    ///
    /// # Errors
    /// Returns an error if `unit` or `partition_limit` is zero.
    pub fn new(unit: usize, max_bumps: u32, partition_limit: usize) -> Result<Self, OptionsError> {
        if unit == 0 {
            return Err(OptionsError::ZeroUnit);
        }
        if partition_limit == 0 {
            return Err(OptionsError::ZeroPartitionLimit);
        }
        Ok(Self { unit, max_bumps, partition_limit })
    }

    /// Sets how many times a failing size class may be replaced by the next larger one.
    pub fn with_max_bumps(mut self, max_bumps: u32) -> Self {
        self.max_bumps = max_bumps;
        self
    }

    /// Sets the largest input encoded as a single part.
    ///
    /// # Errors
    /// Returns an error if `partition_limit` is zero.
    pub fn with_partition_limit(mut self, partition_limit: usize) -> Result<Self, OptionsError> {
        if partition_limit == 0 {
            return Err(OptionsError::ZeroPartitionLimit);
        }
        self.partition_limit = partition_limit;
        Ok(self)
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub const fn unit(&self) -> usize {
        self.unit
    }

    pub const fn max_bumps(&self) -> u32 {
        self.max_bumps
    }

    pub const fn partition_limit(&self) -> usize {
        self.partition_limit
    }
}

// OPTIONS ERROR
// ================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("small backtrack ratio must be at least 1")]
    ZeroBacktrackRatio,
    #[error("overflow multiplier must be at least 1")]
    ZeroOverflowMultiplier,
    #[error("size class unit must be at least 1")]
    ZeroUnit,
    #[error("partition limit must be at least 1")]
    ZeroPartitionLimit,
}
