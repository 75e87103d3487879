use alloc::vec::Vec;
use core::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zkscan_core::{Automaton, StateId, Symbol, Transition};

use crate::{
    errors::TraceError,
    tracer::{NoopTracer, TransitionTracer},
};


// CHUNK PLAN
// ================================================================================================

/// The split of an input of length `L` into `N` chunks, one per proving node.
///
/// Every chunk but the last holds `L / N` symbols; the last one also takes the `L mod N` leftover
/// symbols. A chunk of `n` symbols is given a budget of exactly `2n` transitions: one per symbol,
/// plus room for as many fail transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkPlan {
    input_len: usize,
    num_chunks: usize,
}

impl ChunkPlan {
    /// Returns the plan splitting `input_len` symbols into `num_chunks` chunks.
    ///
    /// # Errors
    /// Returns an error if `num_chunks` is zero.
    pub fn new(input_len: usize, num_chunks: usize) -> Result<Self, TraceError> {
        if num_chunks == 0 {
            return Err(TraceError::ZeroChunks);
        }
        Ok(Self { input_len, num_chunks })
    }

    pub const fn input_len(&self) -> usize {
        self.input_len
    }

    pub const fn num_chunks(&self) -> usize {
        self.num_chunks
    }

    /// Returns the nominal chunk size `L / N`.
    pub const fn chunk_size(&self) -> usize {
        self.input_len / self.num_chunks
    }

    /// Returns the number of input symbols in chunk `index`.
    pub const fn chunk_len(&self, index: usize) -> usize {
        if index + 1 == self.num_chunks {
            self.chunk_size() + self.input_len % self.num_chunks
        } else {
            self.chunk_size()
        }
    }

    /// Returns the positions of the input symbols in chunk `index`.
    pub const fn chunk_range(&self, index: usize) -> Range<usize> {
        let start = index * self.chunk_size();
        start..start + self.chunk_len(index)
    }

    /// Returns the exact number of transitions chunk `index` must produce.
    pub const fn budget(&self, index: usize) -> usize {
        2 * self.chunk_len(index)
    }

    /// Returns the number of transitions of the whole run, `2L`.
    pub const fn total_transitions(&self) -> usize {
        2 * self.input_len
    }

    /// Returns the input ranges of all chunks, in order.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = Range<usize>> + use<> {
        let plan = *self;
        (0..plan.num_chunks).map(move |index| plan.chunk_range(index))
    }
}

// RUN RESULTS
// ================================================================================================

/// Diagnostic for a chunk whose fail transitions exceeded its budget.
///
/// `max_back_depth` is the longest fail chain taken on a single symbol of the chunk and
/// `max_back_start` the offset of that symbol within the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkOverflow {
    pub chunk_index: usize,
    /// Number of transitions produced beyond the chunk's budget; always positive.
    pub overflow: usize,
    pub max_back_depth: usize,
    pub max_back_start: usize,
}

/// Outcome of a counting-only chunked run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCheck {
    Fits { final_state: StateId },
    Overflow(ChunkOverflow),
}

impl ChunkCheck {
    pub fn fits(&self) -> bool {
        matches!(self, Self::Fits { .. })
    }
}

/// Outcome of a chunked run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkedRun {
    Complete(ChunkedTrace),
    Overflow(ChunkOverflow),
}

impl ChunkedRun {
    pub fn into_trace(self) -> Result<ChunkedTrace, ChunkOverflow> {
        match self {
            Self::Complete(trace) => Ok(trace),
            Self::Overflow(overflow) => Err(overflow),
        }
    }
}

/// The transitions of a chunked run, `2 * chunk_len(i)` for each chunk `i`, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedTrace {
    plan: ChunkPlan,
    transitions: Vec<Transition>,
    initial_state: StateId,
    final_state: StateId,
}

impl ChunkedTrace {
    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn into_transitions(self) -> Vec<Transition> {
        self.transitions
    }

    pub fn initial_state(&self) -> StateId {
        self.initial_state
    }

    pub fn final_state(&self) -> StateId {
        self.final_state
    }

    /// Returns the transitions of chunk `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a chunk of this trace.
    pub fn chunk(&self, index: usize) -> &[Transition] {
        let range = self.plan.chunk_range(index);
        &self.transitions[2 * range.start..2 * range.end]
    }
}

// TRACE RUNNER
// ================================================================================================

/// Replays inputs over an [`Automaton`], emitting one transition per consumed symbol plus one
/// per fail link followed.
#[derive(Debug, Clone, Copy)]
pub struct TraceRunner<'a> {
    automaton: &'a Automaton,
}

impl<'a> TraceRunner<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        Self { automaton }
    }

    pub fn automaton(&self) -> &'a Automaton {
        self.automaton
    }

    // UNBOUNDED RUNS
    // --------------------------------------------------------------------------------------------

    /// Returns every transition of the run of `input` from the root.
    #[tracing::instrument(skip_all, fields(len = input.len()))]
    pub fn run(&self, input: &[Symbol]) -> Result<Vec<Transition>, TraceError> {
        let mut transitions = Vec::with_capacity(input.len() + input.len() / 4);
        self.run_with(input, StateId::ROOT, &mut transitions)?;
        Ok(transitions)
    }

    /// Returns the state reached after reading `input` from `initial_state`.
    pub fn final_state(
        &self,
        input: &[Symbol],
        initial_state: StateId,
    ) -> Result<StateId, TraceError> {
        self.run_with(input, initial_state, &mut NoopTracer)
    }

    /// Returns `true` if reading `input` from the root ends in an accepting state, i.e. no
    /// pattern occurs in `input`.
    pub fn accepts(&self, input: &[Symbol]) -> Result<bool, TraceError> {
        let state = self.final_state(input, StateId::ROOT)?;
        Ok(self.automaton.is_accepting(state))
    }

    fn run_with<T: TransitionTracer>(
        &self,
        input: &[Symbol],
        initial_state: StateId,
        tracer: &mut T,
    ) -> Result<StateId, TraceError> {
        self.check_state(initial_state)?;
        input.iter().enumerate().try_fold(initial_state, |state, (position, &symbol)| {
            self.step(state, symbol, position, tracer).map(|step| step.state)
        })
    }

    // CHUNKED RUNS
    // --------------------------------------------------------------------------------------------

    /// Runs `input` split into `num_chunks` chunks, each producing exactly twice its length in
    /// transitions.
    ///
    /// Chunks left with spare budget are topped up with filler transitions on the padding
    /// symbol. If the fail transitions of some chunk exceed its budget, the run stops and the
    /// overflow is reported instead.
    #[tracing::instrument(skip_all, fields(len = input.len(), num_chunks = num_chunks))]
    pub fn run_by_chunks(
        &self,
        input: &[Symbol],
        initial_state: StateId,
        num_chunks: usize,
    ) -> Result<ChunkedRun, TraceError> {
        let plan = ChunkPlan::new(input.len(), num_chunks)?;
        let mut transitions = Vec::with_capacity(plan.total_transitions());

        match self.execute_chunks(input, initial_state, &plan, &mut transitions)? {
            ChunkCheck::Overflow(overflow) => Ok(ChunkedRun::Overflow(overflow)),
            ChunkCheck::Fits { final_state } => {
                if transitions.len() != plan.total_transitions() {
                    return Err(TraceError::TransitionCountMismatch {
                        expected: plan.total_transitions(),
                        actual: transitions.len(),
                    });
                }
                Ok(ChunkedRun::Complete(ChunkedTrace {
                    plan,
                    transitions,
                    initial_state,
                    final_state,
                }))
            },
        }
    }

    /// Performs the same chunked run as [`Self::run_by_chunks`] without keeping transitions.
    pub fn check_by_chunks(
        &self,
        input: &[Symbol],
        initial_state: StateId,
        num_chunks: usize,
    ) -> Result<ChunkCheck, TraceError> {
        let plan = ChunkPlan::new(input.len(), num_chunks)?;
        self.execute_chunks(input, initial_state, &plan, &mut NoopTracer)
    }

    fn execute_chunks<T: TransitionTracer>(
        &self,
        input: &[Symbol],
        initial_state: StateId,
        plan: &ChunkPlan,
        tracer: &mut T,
    ) -> Result<ChunkCheck, TraceError> {
        self.check_state(initial_state)?;
        let term = self.automaton.alphabet().term();
        let mut state = initial_state;

        for (chunk_index, range) in plan.chunks().enumerate() {
            let budget = plan.budget(chunk_index);
            let mut produced = 0;
            let mut max_back_depth = 0;
            let mut max_back_start = 0;

            for (offset, &symbol) in input[range.clone()].iter().enumerate() {
                let step = self.step(state, symbol, range.start + offset, tracer)?;
                produced += step.back_depth + 1;
                if step.back_depth > max_back_depth {
                    max_back_depth = step.back_depth;
                    max_back_start = offset;
                }
                state = step.state;
            }

            if produced > budget {
                tracing::debug!(chunk_index, produced, budget, max_back_depth, "chunk overflow");
                return Ok(ChunkCheck::Overflow(ChunkOverflow {
                    chunk_index,
                    overflow: produced - budget,
                    max_back_depth,
                    max_back_start,
                }));
            }
            tracer.fill(state, term, budget - produced);
        }

        Ok(ChunkCheck::Fits { final_state: state })
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    /// Consumes one symbol, recording the fail transitions followed and the goto taken.
    #[inline]
    fn step<T: TransitionTracer>(
        &self,
        mut state: StateId,
        symbol: Symbol,
        position: usize,
        tracer: &mut T,
    ) -> Result<Step, TraceError> {
        let alphabet = self.automaton.alphabet();
        if !alphabet.accepts_input(symbol) {
            return Err(TraceError::SymbolOutOfRange {
                position,
                symbol,
                bits: alphabet.bits(),
                term: alphabet.term(),
            });
        }
        if symbol == alphabet.term() {
            tracer.record(Transition::forward(state, symbol, state));
            return Ok(Step { state, back_depth: 0 });
        }

        let mut back_depth = 0;
        loop {
            if let Some(next) = self.automaton.goto(state, symbol) {
                tracer.record(Transition::forward(state, symbol, next));
                return Ok(Step { state: next, back_depth });
            }
            let fail = self.automaton.fail(state);
            if fail == state {
                // only the root is its own fail link, and it has a goto on every symbol
                tracer.record(Transition::forward(state, symbol, state));
                return Ok(Step { state, back_depth });
            }
            tracer.record(Transition::fail(state, symbol, fail));
            back_depth += 1;
            state = fail;
        }
    }

    fn check_state(&self, state: StateId) -> Result<(), TraceError> {
        if self.automaton.contains_state(state) {
            Ok(())
        } else {
            Err(TraceError::UnknownState { state, num_states: self.automaton.num_states() })
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Step {
    state: StateId,
    back_depth: usize,
}
