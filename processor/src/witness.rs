use alloc::{collections::BTreeSet, vec::Vec};
use core::ops::Range;

use zkscan_core::{Automaton, DigitizedValue, Digitizer, PatternId, StateId, Symbol};

use crate::trace::{ChunkPlan, ChunkedTrace};

// TRACE WITNESS
// ================================================================================================

/// The columns a proof of a chunked run is computed over.
///
/// For an input of `n` symbols there are `2n` transitions. `states` holds the state before the
/// first transition followed by the destination of every transition, so transition `i` goes from
/// `states[i]` to `states[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceWitness {
    plan: ChunkPlan,
    digitizer: Digitizer,
    states: Vec<StateId>,
    symbols: Vec<Symbol>,
    fail_flags: Vec<bool>,
    aligned_input: Vec<Symbol>,
    transitions: Vec<DigitizedValue>,
}

impl TraceWitness {
    /// Lays out the witness of a complete chunked run over `automaton`.
    pub fn from_trace(automaton: &Automaton, trace: &ChunkedTrace) -> Self {
        let transitions = trace.transitions();
        let mut states = Vec::with_capacity(transitions.len() + 1);
        states.push(trace.initial_state());
        states.extend(transitions.iter().map(|t| t.dest));

        Self {
            plan: *trace.plan(),
            digitizer: *automaton.digitizer(),
            states,
            symbols: transitions.iter().map(|t| t.symbol).collect(),
            fail_flags: transitions.iter().map(|t| t.is_fail).collect(),
            aligned_input: transitions.iter().filter(|t| !t.is_fail).map(|t| t.symbol).collect(),
            transitions: transitions.iter().map(|t| automaton.digitize(t)).collect(),
        }
    }

    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }

    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn digitized_states(&self) -> impl ExactSizeIterator<Item = DigitizedValue> {
        self.states.iter().map(|&state| self.digitizer.state(state))
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn fail_flags(&self) -> &[bool] {
        &self.fail_flags
    }

    /// Returns the symbols consumed by the run, i.e. the padded input.
    pub fn aligned_input(&self) -> &[Symbol] {
        &self.aligned_input
    }

    pub fn digitized_transitions(&self) -> &[DigitizedValue] {
        &self.transitions
    }

    /// Returns the slice of the witness proven by node `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a chunk of the run.
    pub fn node(&self, index: usize) -> NodeWitness<'_> {
        let range = self.plan.chunk_range(index);
        let transitions = 2 * range.start..2 * range.end;
        NodeWitness {
            index,
            input: &self.aligned_input[range.clone()],
            states: &self.states[transitions.start..transitions.end + 1],
            symbols: &self.symbols[transitions.clone()],
            fail_flags: &self.fail_flags[transitions.clone()],
            transitions: &self.transitions[transitions],
            input_range: range,
        }
    }

    /// Returns the per-node slices in chunk order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeWitness<'_>> {
        (0..self.plan.num_chunks()).map(|index| self.node(index))
    }
}

/// The part of a [`TraceWitness`] one node proves: its `2m` transitions over the `m` symbols of
/// its chunk, and the `2m + 1` states they pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeWitness<'a> {
    pub index: usize,
    pub input_range: Range<usize>,
    pub input: &'a [Symbol],
    pub states: &'a [StateId],
    pub symbols: &'a [Symbol],
    pub fail_flags: &'a [bool],
    pub transitions: &'a [DigitizedValue],
}

impl NodeWitness<'_> {
    pub fn initial_state(&self) -> StateId {
        self.states[0]
    }

    pub fn final_state(&self) -> StateId {
        self.states[self.states.len() - 1]
    }
}

// SUBSET LISTS
// ================================================================================================

/// Depth limits of the nested subset commitments.
pub const DEFAULT_DEPTH_THRESHOLDS: [u32; 7] = [10, 15, 20, 30, 40, 50, 300];

/// The digitized states and transitions selected by a depth limit and an include set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetList {
    pub depth_limit: u32,
    pub states: Vec<DigitizedValue>,
    pub transitions: Vec<DigitizedValue>,
}

/// Returns one [`SubsetList`] per entry of `thresholds`, in the same order.
#[tracing::instrument(skip_all, fields(num_thresholds = thresholds.len()))]
pub fn subset_lists(
    automaton: &Automaton,
    thresholds: &[u32],
    include: &BTreeSet<PatternId>,
) -> Vec<SubsetList> {
    thresholds
        .iter()
        .map(|&depth_limit| {
            let list = SubsetList {
                depth_limit,
                states: automaton.states_by_depth_or_set(depth_limit, include),
                transitions: automaton.transitions_by_depth_or_set(depth_limit, include),
            };
            tracing::debug!(depth_limit, num_states = list.states.len(), "subset list");
            list
        })
        .collect()
}

// OUTPUT
// ================================================================================================

/// Writes `values` as a count line followed by one value per line.
#[cfg(feature = "std")]
pub fn write_values<W, T>(writer: &mut W, values: &[T]) -> std::io::Result<()>
where
    W: std::io::Write,
    T: core::fmt::Display,
{
    writeln!(writer, "{}", values.len())?;
    for value in values {
        writeln!(writer, "{value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use pretty_assertions::assert_eq;
    use zkscan_core::Transition;
    use zkscan_test_utils::{bytes, he_she_hers};

    use super::*;
    use crate::trace::TraceRunner;

    fn witness(input: &str, num_chunks: usize) -> (Automaton, TraceWitness) {
        let ac = he_she_hers();
        let trace = TraceRunner::new(&ac)
            .run_by_chunks(&bytes(input), StateId::ROOT, num_chunks)
            .unwrap()
            .into_trace()
            .unwrap();
        let witness = TraceWitness::from_trace(&ac, &trace);
        (ac, witness)
    }

    #[test]
    fn columns_have_the_expected_lengths() {
        let (_, witness) = witness("hxsh", 2);
        assert_eq!(witness.states().len(), 2 * 4 + 1);
        assert_eq!(witness.symbols().len(), 2 * 4);
        assert_eq!(witness.fail_flags().len(), 2 * 4);
        assert_eq!(witness.digitized_transitions().len(), 2 * 4);
        assert_eq!(witness.aligned_input(), bytes("hxsh"));
    }

    #[test]
    fn transitions_are_digitized_in_order() {
        let (ac, witness) = witness("hx", 1);
        let expected = [
            Transition::forward(StateId::ROOT, Symbol::from(b'h'), StateId::from(1u32)),
            Transition::fail(StateId::from(1u32), Symbol::from(b'x'), StateId::ROOT),
            Transition::forward(StateId::ROOT, Symbol::from(b'x'), StateId::ROOT),
            Transition::filler(StateId::ROOT, ac.alphabet().term()),
        ]
        .map(|t| ac.digitize(&t));
        assert_eq!(witness.digitized_transitions(), expected);
        assert_eq!(witness.fail_flags(), [false, true, false, true]);
        assert_eq!(witness.digitized_states().map(DigitizedValue::as_u128).collect::<Vec<_>>(), [
            0, 1, 0, 0, 0
        ]);
    }

    #[test]
    fn nodes_share_their_boundary_states() {
        let (_, witness) = witness("ushersheis", 3);
        let nodes: Vec<_> = witness.nodes().collect();
        assert_eq!(nodes.len(), 3);
        for node in &nodes {
            assert_eq!(node.transitions.len(), 2 * node.input.len());
            assert_eq!(node.states.len(), node.transitions.len() + 1);
        }
        assert_eq!(nodes[2].input, bytes("heis"));
        for pair in nodes.windows(2) {
            assert_eq!(pair[0].final_state(), pair[1].initial_state());
        }
    }

    #[test]
    fn subset_lists_follow_the_thresholds() {
        let ac = he_she_hers();
        let lists = subset_lists(&ac, &[0, 1, 300], &BTreeSet::new());
        assert_eq!(lists.iter().map(|l| l.depth_limit).collect::<Vec<_>>(), [0, 1, 300]);
        assert_eq!(lists[0].states.len(), 1);
        assert_eq!(lists[0].transitions.len(), 258);
        assert_eq!(lists[1].states.len(), 3);
        assert_eq!(lists[2].states, ac.all_states());
        assert_eq!(lists[2].transitions, ac.all_transitions());

        let include = BTreeSet::from([PatternId::from(2u32)]);
        let hers = subset_lists(&ac, &[1], &include);
        // "hers" created the states "her" and "hers"
        assert_eq!(hers[0].states.len(), 5);
    }

    #[cfg(feature = "std")]
    #[test]
    fn values_are_written_one_per_line() {
        let mut out = Vec::new();
        write_values(&mut out, &[3u128, 1 << 62]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2\n3\n4611686018427387904\n");
    }
}
