use alloc::vec::Vec;

use zkscan_core::{StateId, Symbol, Transition};

// TRACER TRAIT
// ================================================================================================

/// A trait for recording the transitions of an automaton run.
///
/// The runner decides *which* transitions a run takes and how they are counted against chunk
/// budgets; the tracer only decides what to keep. This lets the witness-producing run and the
/// counting-only diagnostic run share a single execution routine.
pub trait TransitionTracer {
    /// Records a transition taken by the run, in order.
    fn record(&mut self, transition: Transition);

    /// Records `count` filler transitions `(state, term, state, fail)` topping a chunk up to its
    /// budget.
    fn fill(&mut self, state: StateId, term: Symbol, count: usize) {
        for _ in 0..count {
            self.record(Transition::filler(state, term));
        }
    }
}

impl TransitionTracer for Vec<Transition> {
    fn record(&mut self, transition: Transition) {
        self.push(transition);
    }

    fn fill(&mut self, state: StateId, term: Symbol, count: usize) {
        self.extend(core::iter::repeat_n(Transition::filler(state, term), count));
    }
}

/// A tracer which keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl TransitionTracer for NoopTracer {
    #[inline(always)]
    fn record(&mut self, _transition: Transition) {}

    #[inline(always)]
    fn fill(&mut self, _state: StateId, _term: Symbol, _count: usize) {}
}
