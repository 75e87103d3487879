use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use zkscan_utils_indexing::{CsrMatrix, Idx, IndexVec, newtype_id};

use crate::{
    Alphabet, Symbol,
    alphabet::parse_pattern_lines,
    errors::AutomatonError,
    transition::{DigitizedValue, Digitizer, Transition},
};

mod builder;
mod normalize;
mod subset;

pub use subset::DepthProfile;

#[cfg(test)]
mod tests;

newtype_id!(
    /// Identifier of an automaton state.
    ///
    /// The root is always state 0. After construction, accepting states occupy
    /// `[0, num_accepting_states)`.
    StateId
);

newtype_id!(
    /// Index of a pattern in the order it was given to [`Automaton::new`].
    PatternId
);

impl StateId {
    pub const ROOT: Self = Self(0);
}

/// Pattern indices reported at a state; most states report none or one.
pub type OutputSet = SmallVec<[PatternId; 2]>;

// EDGE
// ================================================================================================

/// A literal goto entry of a state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub symbol: Symbol,
    pub target: StateId,
}

// AUTOMATON
// ================================================================================================

/// A deterministic Aho-Corasick matching automaton.
///
/// A state is *accepting* when it reports no pattern: an accepting final state means the scanned
/// input is clean. Once a pattern has been seen the run is trapped, since every non-accepting
/// state loops on every symbol.
///
/// Beyond the trie edges, only the root and the trapped states have a literal goto entry for
/// every symbol; the remaining states resolve missing entries through their fail links, which
/// is what produces fail transitions in a run. [`Automaton::delta`] gives the resolved (total)
/// transition function.
///
/// The automaton is immutable once built and can be shared freely between threads.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Automaton {
    alphabet: Alphabet,
    patterns: IndexVec<PatternId, Vec<Symbol>>,
    /// Row `s` holds the goto entries of state `s`, sorted by symbol.
    goto: CsrMatrix<StateId, Edge>,
    fail: IndexVec<StateId, StateId>,
    depth: IndexVec<StateId, u32>,
    origin: IndexVec<StateId, Option<PatternId>>,
    outputs: IndexVec<StateId, OutputSet>,
    num_accepting: usize,
    digitizer: Digitizer,
}

impl Automaton {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Builds the automaton matching `patterns` over `alphabet`.
    ///
    /// # Errors
    /// Returns an error if a pattern is empty, contains a symbol outside of the alphabet, or if
    /// the resulting automaton has more states than can be digitized.
    #[tracing::instrument(name = "build_automaton", skip_all, fields(bits = alphabet.bits()))]
    pub fn new<P>(
        alphabet: Alphabet,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<Self, AutomatonError>
    where
        P: AsRef<[Symbol]>,
    {
        let patterns = IndexVec::try_from(
            patterns.into_iter().map(|p| p.as_ref().to_vec()).collect::<Vec<_>>(),
        )?;
        let tables = builder::build_tables(alphabet, &patterns)?;
        let digitizer = Digitizer::for_state_count(tables.num_states())?;
        let (tables, num_accepting) = normalize::normalize_final_states(tables)?;

        let mut goto = CsrMatrix::with_capacity(tables.goto.len(), tables.num_edges());
        for row in tables.goto {
            goto.push_row(row)?;
        }

        tracing::debug!(
            num_states = tables.fail.len(),
            num_accepting,
            state_bits = digitizer.state_bits(),
            "automaton built"
        );

        Ok(Self {
            alphabet,
            patterns,
            goto,
            fail: tables.fail,
            depth: tables.depth,
            origin: tables.origin,
            outputs: tables.outputs,
            num_accepting,
            digitizer,
        })
    }

    /// Builds a nibble automaton from a signature list with one hex pattern per line.
    pub fn from_hex_patterns(text: &str) -> Result<Self, AutomatonError> {
        let patterns = parse_pattern_lines(text)?;
        Self::new(Alphabet::Nibble, patterns)
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn num_states(&self) -> usize {
        self.fail.len()
    }

    /// Returns the number of accepting states; these are exactly the states with id below it.
    pub fn num_accepting_states(&self) -> usize {
        self.num_accepting
    }

    pub fn digitizer(&self) -> &Digitizer {
        &self.digitizer
    }

    /// Returns `k`, the bit width of a state id in digitized transitions.
    pub fn state_bits(&self) -> u32 {
        self.digitizer.state_bits()
    }

    pub fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    pub fn pattern(&self, id: PatternId) -> Option<&[Symbol]> {
        self.patterns.get(id).map(Vec::as_slice)
    }

    /// Returns an iterator over all state ids in increasing order.
    pub fn states(&self) -> impl DoubleEndedIterator<Item = StateId> + ExactSizeIterator + use<> {
        self.fail.indices()
    }

    /// Returns `true` if `state` is a valid state id of this automaton.
    pub fn contains_state(&self, state: StateId) -> bool {
        state.to_usize() < self.num_states()
    }

    /// Returns the literal goto entry of `state` on `symbol`, if any.
    ///
    /// The padding symbol never has a literal entry.
    #[inline]
    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        let row = self.goto.row(state)?;
        if row.len() == self.alphabet.size() {
            return row.get(symbol.as_usize()).map(|edge| edge.target);
        }
        row.binary_search_by_key(&symbol, |edge| edge.symbol).ok().map(|i| row[i].target)
    }

    /// Returns the literal goto entries of `state`, sorted by symbol.
    pub fn edges(&self, state: StateId) -> &[Edge] {
        self.goto.row(state).unwrap_or(&[])
    }

    #[inline]
    pub fn fail(&self, state: StateId) -> StateId {
        self.fail[state]
    }

    /// Returns the length of the shortest path from the root to `state`.
    #[inline]
    pub fn depth(&self, state: StateId) -> u32 {
        self.depth[state]
    }

    /// Returns the largest depth of any state, i.e. the length of the longest pattern.
    pub fn max_depth(&self) -> u32 {
        self.depth.iter().copied().max().unwrap_or(0)
    }

    /// Returns the pattern whose insertion created `state`; `None` for the root.
    pub fn origin_pattern(&self, state: StateId) -> Option<PatternId> {
        self.origin[state]
    }

    /// Returns the patterns reported at `state`, in increasing order.
    pub fn outputs(&self, state: StateId) -> &[PatternId] {
        &self.outputs[state]
    }

    /// Returns `true` if `state` reports no pattern.
    #[inline]
    pub fn is_accepting(&self, state: StateId) -> bool {
        state.to_usize() < self.num_accepting
    }

    /// Returns the state reached from `state` on `symbol`, following fail links as needed.
    ///
    /// This is the total transition function of the automaton. The padding symbol loops.
    pub fn delta(&self, mut state: StateId, symbol: Symbol) -> StateId {
        if symbol == self.alphabet.term() {
            return state;
        }
        loop {
            if let Some(next) = self.goto(state, symbol) {
                return next;
            }
            let fail = self.fail(state);
            if fail == state {
                return state;
            }
            state = fail;
        }
    }

    // DIGITIZATION
    // --------------------------------------------------------------------------------------------

    pub fn digitize_state(&self, state: StateId) -> DigitizedValue {
        self.digitizer.state(state)
    }

    pub fn digitize(&self, transition: &Transition) -> DigitizedValue {
        self.digitizer.transition(transition)
    }

    /// Returns the digitized ids of all accepting states.
    pub fn final_states(&self) -> Vec<DigitizedValue> {
        self.states().take(self.num_accepting).map(|s| self.digitize_state(s)).collect()
    }
}
