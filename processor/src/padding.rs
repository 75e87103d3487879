use alloc::vec::Vec;

use zkscan_core::{StateId, Symbol};

use crate::{
    errors::{PaddingError, TraceError, UnresolvableReason},
    options::PaddingOptions,
    trace::{ChunkCheck, ChunkOverflow, ChunkPlan, ChunkedRun, ChunkedTrace, TraceRunner},
};

#[cfg(test)]
mod tests;

// PADDED INPUT
// ================================================================================================

/// Where the padding of a [`PaddedInput`] was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingLayout {
    /// All padding follows the raw input.
    End,
    /// All padding precedes the raw input.
    Start,
    /// Padding blocks were spliced in front of backtracks, the rest follows the raw input.
    Repaired,
}

/// A block of padding symbols spliced into the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    /// Position in the input as it was when the block was inserted.
    pub position: usize,
    pub count: usize,
}

/// A raw input padded to a target size such that no chunk of its run overflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedInput {
    symbols: Vec<Symbol>,
    layout: PaddingLayout,
    insertions: Vec<Insertion>,
}

impl PaddedInput {
    fn new(symbols: Vec<Symbol>, layout: PaddingLayout) -> Self {
        Self { symbols, layout, insertions: Vec::new() }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn layout(&self) -> PaddingLayout {
        self.layout
    }

    /// Returns the padding blocks spliced into the raw input, in the order they were inserted.
    pub fn insertions(&self) -> &[Insertion] {
        &self.insertions
    }
}

/// A padded input together with the chunked trace of its run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedRun {
    pub input: PaddedInput,
    pub trace: ChunkedTrace,
}

// PADDING ENGINE
// ================================================================================================

/// Pads raw inputs to a target size so that their chunked runs fit the per-chunk budget.
///
/// Plain padding at the end, then at the start, is tried first. When both overflow, the engine
/// repeatedly splices padding symbols in front of the backtracking reported by the counting run
/// of the end-padded candidate, until the candidate fits or the repair gives up.
#[derive(Debug, Clone, Copy)]
pub struct PaddingEngine<'a> {
    runner: TraceRunner<'a>,
    options: PaddingOptions,
}

impl<'a> PaddingEngine<'a> {
    pub fn new(runner: TraceRunner<'a>) -> Self {
        Self::with_options(runner, PaddingOptions::default())
    }

    pub fn with_options(runner: TraceRunner<'a>, options: PaddingOptions) -> Self {
        Self { runner, options }
    }

    pub fn runner(&self) -> &TraceRunner<'a> {
        &self.runner
    }

    pub fn options(&self) -> &PaddingOptions {
        &self.options
    }

    /// Pads `raw` to `target` symbols and runs it in `num_chunks` chunks from `initial_state`.
    ///
    /// # Errors
    /// Returns [`PaddingError::InputTooLong`] or [`PaddingError::Unresolvable`] if no fitting
    /// padding was found, and [`PaddingError::Trace`] if the input or the request is malformed.
    pub fn pad_and_run(
        &self,
        raw: &[Symbol],
        target: usize,
        initial_state: StateId,
        num_chunks: usize,
    ) -> Result<PaddedRun, PaddingError> {
        let input = self.pad(raw, target, initial_state, num_chunks)?;
        match self.runner.run_by_chunks(input.symbols(), initial_state, num_chunks)? {
            ChunkedRun::Complete(trace) => Ok(PaddedRun { input, trace }),
            ChunkedRun::Overflow(overflow) => {
                Err(TraceError::DivergentRun { chunk_index: overflow.chunk_index }.into())
            },
        }
    }

    /// Pads `raw` to `target` symbols such that its run in `num_chunks` chunks fits, without
    /// keeping the transitions.
    #[tracing::instrument(
        name = "pad_input",
        skip_all,
        fields(len = raw.len(), target = target, num_chunks = num_chunks)
    )]
    pub fn pad(
        &self,
        raw: &[Symbol],
        target: usize,
        initial_state: StateId,
        num_chunks: usize,
    ) -> Result<PaddedInput, PaddingError> {
        let plan = ChunkPlan::new(target, num_chunks)?;
        if raw.len() > target {
            return Err(PaddingError::InputTooLong { len: raw.len(), target });
        }
        let term = self.runner.automaton().alphabet().term();

        let candidate = pad_at_end(raw, target, term);
        let mut last_overflow = match self.check(&candidate, initial_state, num_chunks)? {
            ChunkCheck::Fits { .. } => return Ok(PaddedInput::new(candidate, PaddingLayout::End)),
            ChunkCheck::Overflow(overflow) => overflow,
        };

        let candidate = pad_at_start(raw, target, term);
        if self.check(&candidate, initial_state, num_chunks)?.fits() {
            return Ok(PaddedInput::new(candidate, PaddingLayout::Start));
        }

        let max_attempts = self.options.max_attempts(num_chunks);
        let mut current = raw.to_vec();
        let mut insertions = Vec::new();
        for _ in 0..max_attempts {
            let insertion = self
                .plan_repair(&last_overflow, plan.chunk_size(), current.len(), target)
                .map_err(|reason| PaddingError::Unresolvable { reason, last_overflow })?;
            tracing::warn!(
                chunk_index = last_overflow.chunk_index,
                overflow = last_overflow.overflow,
                position = insertion.position,
                count = insertion.count,
                "inserting padding"
            );
            insert_padding(&mut current, insertion, term);
            insertions.push(insertion);

            let candidate = pad_at_end(&current, target, term);
            match self.check(&candidate, initial_state, num_chunks)? {
                ChunkCheck::Fits { .. } => {
                    return Ok(PaddedInput {
                        symbols: candidate,
                        layout: PaddingLayout::Repaired,
                        insertions,
                    });
                },
                ChunkCheck::Overflow(overflow) => last_overflow = overflow,
            }
        }

        Err(PaddingError::Unresolvable {
            reason: UnresolvableReason::AttemptsExhausted { attempts: max_attempts },
            last_overflow,
        })
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    fn check(
        &self,
        candidate: &[Symbol],
        initial_state: StateId,
        num_chunks: usize,
    ) -> Result<ChunkCheck, TraceError> {
        self.runner.check_by_chunks(candidate, initial_state, num_chunks)
    }

    /// Decides where to insert padding, and how much, to absorb `overflow`.
    ///
    /// Shallow backtracks are absorbed by a block proportional to the overflow at the start of
    /// the offending chunk. Deep ones get a block at the deepest backtrack, sized to the
    /// backtrack or, if that does not fit, to push the backtrack into the next chunk.
    fn plan_repair(
        &self,
        overflow: &ChunkOverflow,
        chunk_size: usize,
        current_len: usize,
        target: usize,
    ) -> Result<Insertion, UnresolvableReason> {
        let ChunkOverflow { chunk_index, max_back_depth, max_back_start, .. } = *overflow;
        if chunk_size < max_back_depth {
            return Err(UnresolvableReason::ChunkTooSmall { chunk_size, max_back_depth });
        }

        let chunk_start = chunk_size * chunk_index;
        let (position, count) =
            if max_back_depth < chunk_size / self.options.small_backtrack_ratio() {
                let count = self.options.overflow_multiplier() * overflow.overflow
                    + self.options.overflow_slack();
                (chunk_start, count)
            } else if max_back_depth + max_back_start + 2 < chunk_size {
                (chunk_start + max_back_start, max_back_depth)
            } else {
                (chunk_start + max_back_start, chunk_size.saturating_sub(max_back_start))
            };

        let count = count.max(1);
        let space_left = target - current_len;
        if count >= space_left {
            return Err(UnresolvableReason::SlackExhausted { needed: count, space_left });
        }
        Ok(Insertion { position: position.min(current_len), count })
    }
}

// PADDING PRIMITIVES
// ================================================================================================

/// Returns `raw` followed by padding symbols up to `target` symbols.
pub fn pad_at_end(raw: &[Symbol], target: usize, term: Symbol) -> Vec<Symbol> {
    let mut padded = Vec::with_capacity(target.max(raw.len()));
    padded.extend_from_slice(raw);
    padded.resize(target.max(raw.len()), term);
    padded
}

/// Returns padding symbols up to `target` symbols followed by `raw`.
pub fn pad_at_start(raw: &[Symbol], target: usize, term: Symbol) -> Vec<Symbol> {
    let mut padded = vec![term; target.saturating_sub(raw.len())];
    padded.extend_from_slice(raw);
    padded
}

/// Splices `insertion.count` padding symbols into `input` at `insertion.position`.
///
/// # Panics
/// Panics if the position is past the end of `input`.
pub fn insert_padding(input: &mut Vec<Symbol>, insertion: Insertion, term: Symbol) {
    input.splice(
        insertion.position..insertion.position,
        core::iter::repeat_n(term, insertion.count),
    );
}
