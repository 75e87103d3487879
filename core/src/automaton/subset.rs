use alloc::{collections::BTreeSet, vec::Vec};

use super::{Automaton, PatternId, StateId};
use crate::transition::{DigitizedValue, Transition};

// SUBSET EXTRACTION
// ================================================================================================

impl Automaton {
    /// Returns `true` if `state` is within `depth_limit` of the root, or was created by one of
    /// the patterns in `include`.
    pub fn in_subset(
        &self,
        state: StateId,
        depth_limit: u32,
        include: &BTreeSet<PatternId>,
    ) -> bool {
        self.depth(state) <= depth_limit
            || self.origin_pattern(state).is_some_and(|pattern| include.contains(&pattern))
    }

    /// Returns the states selected by [`Self::in_subset`], in increasing order.
    pub fn subset_states(
        &self,
        depth_limit: u32,
        include: &BTreeSet<PatternId>,
    ) -> impl Iterator<Item = StateId> {
        self.states().filter(move |&state| self.in_subset(state, depth_limit, include))
    }

    /// Returns every transition a run may take out of `state`.
    ///
    /// For each regular symbol this is the goto transition when one exists and the fail
    /// transition otherwise, followed by the two padding self-loops (filler, then genuine
    /// padding input).
    pub fn state_transitions(&self, state: StateId) -> impl Iterator<Item = Transition> {
        let term = self.alphabet().term();
        let fail = self.fail(state);
        self.alphabet()
            .symbols()
            .map(move |symbol| match self.goto(state, symbol) {
                Some(dest) => Transition::forward(state, symbol, dest),
                None => Transition::fail(state, symbol, fail),
            })
            .chain([Transition::filler(state, term), Transition::forward(state, term, state)])
    }

    /// Returns the digitized states selected by `depth_limit` and `include`.
    pub fn states_by_depth_or_set(
        &self,
        depth_limit: u32,
        include: &BTreeSet<PatternId>,
    ) -> Vec<DigitizedValue> {
        self.subset_states(depth_limit, include).map(|s| self.digitize_state(s)).collect()
    }

    /// Returns the digitized transitions out of the states selected by `depth_limit` and
    /// `include`, grouped by source state.
    pub fn transitions_by_depth_or_set(
        &self,
        depth_limit: u32,
        include: &BTreeSet<PatternId>,
    ) -> Vec<DigitizedValue> {
        self.subset_states(depth_limit, include)
            .flat_map(|state| self.state_transitions(state))
            .map(|t| self.digitize(&t))
            .collect()
    }

    pub fn all_states(&self) -> Vec<DigitizedValue> {
        self.states_by_depth_or_set(u32::MAX, &BTreeSet::new())
    }

    pub fn all_transitions(&self) -> Vec<DigitizedValue> {
        self.transitions_by_depth_or_set(u32::MAX, &BTreeSet::new())
    }

    /// Returns state counts per depth up to `max_depth`, used to size nested commitments.
    ///
    /// The profile never extends past the deepest state, so `u32::MAX` profiles every depth.
    pub fn depth_profile(&self, max_depth: u32, include: &BTreeSet<PatternId>) -> DepthProfile {
        let cap = max_depth.min(self.max_depth()) as usize;
        // the extra bucket collects every state deeper than the cap
        let mut by_depth = vec![0usize; cap + 2];
        let mut included = vec![0usize; cap + 2];
        for state in self.states() {
            let bucket = (self.depth(state) as usize).min(cap + 1);
            by_depth[bucket] += 1;
            if self.origin_pattern(state).is_some_and(|p| include.contains(&p)) {
                included[bucket] += 1;
            }
        }
        let total_included: usize = included.iter().sum();

        let mut cumulative = Vec::with_capacity(cap + 1);
        let mut cumulative_with_included = Vec::with_capacity(cap + 1);
        let (mut within, mut included_within) = (0, 0);
        for depth in 0..=cap {
            within += by_depth[depth];
            included_within += included[depth];
            cumulative.push(within);
            cumulative_with_included.push(within + total_included - included_within);
        }
        by_depth.truncate(cap + 1);

        DepthProfile { by_depth, cumulative, cumulative_with_included }
    }
}

// DEPTH PROFILE
// ================================================================================================

/// Distribution of automaton states over depths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthProfile {
    by_depth: Vec<usize>,
    cumulative: Vec<usize>,
    cumulative_with_included: Vec<usize>,
}

impl DepthProfile {
    /// Returns the largest depth covered by this profile.
    pub fn max_depth(&self) -> u32 {
        (self.by_depth.len() - 1) as u32
    }

    /// Returns the number of states at exactly `depth`.
    pub fn states_at(&self, depth: u32) -> usize {
        self.by_depth.get(depth as usize).copied().unwrap_or(0)
    }

    /// Returns the number of states with depth at most `depth`.
    pub fn states_within(&self, depth: u32) -> Option<usize> {
        self.cumulative.get(depth as usize).copied()
    }

    /// Returns the number of states selected by a subset query with `depth` as depth limit.
    pub fn subset_size(&self, depth: u32) -> Option<usize> {
        self.cumulative_with_included.get(depth as usize).copied()
    }
}
