//! Statistics over automaton runs, used to pick subset depth limits and include sets.

use alloc::{collections::BTreeSet, vec::Vec};

use itertools::Itertools;
use zkscan_core::{Automaton, PatternId, Symbol, Transition};

use crate::{errors::TraceError, trace::TraceRunner};

/// Returns the number of distinct digitized states and transitions visited by the run of `input`
/// per input symbol.
///
/// Padding input is not counted as a visit. The rate may exceed `1.0`.
pub fn compression_rate(automaton: &Automaton, input: &[Symbol]) -> Result<f64, TraceError> {
    if input.is_empty() {
        return Ok(0.0);
    }
    let term = automaton.alphabet().term();
    let transitions = TraceRunner::new(automaton).run(input)?;

    let distinct: BTreeSet<_> = transitions
        .iter()
        .filter(|t| t.symbol != term)
        .flat_map(|t| {
            [automaton.digitize(t), automaton.digitize_state(t.src), automaton.digitize_state(t.dest)]
        })
        .collect();
    Ok(distinct.len() as f64 / input.len() as f64)
}

/// Returns the largest depth of a source state of `transitions`, ignoring states created by the
/// patterns in `exclude`.
pub fn max_depth(
    automaton: &Automaton,
    transitions: &[Transition],
    exclude: &BTreeSet<PatternId>,
) -> u32 {
    transitions
        .iter()
        .map(|t| t.src)
        .filter(|&src| automaton.origin_pattern(src).is_none_or(|p| !exclude.contains(&p)))
        .map(|src| automaton.depth(src))
        .max()
        .unwrap_or(0)
}

/// Returns the deepest state the run of `input` passes through, ignoring states created by the
/// patterns in `exclude`.
pub fn max_depth_by_run(
    automaton: &Automaton,
    input: &[Symbol],
    exclude: &BTreeSet<PatternId>,
) -> Result<u32, TraceError> {
    let term = automaton.alphabet().term();
    let transitions: Vec<Transition> = TraceRunner::new(automaton)
        .run(input)?
        .into_iter()
        .filter(|t| t.symbol != term)
        .collect();
    Ok(max_depth(automaton, &transitions, exclude))
}

/// Returns, for every depth up to the deepest source state of `transitions`, the patterns that
/// created the source states at that depth.
pub fn depth_stats(automaton: &Automaton, transitions: &[Transition]) -> Vec<BTreeSet<PatternId>> {
    let deepest = max_depth(automaton, transitions, &BTreeSet::new()) as usize;
    let mut stats = vec![BTreeSet::new(); deepest + 1];
    for t in transitions {
        if let Some(pattern) = automaton.origin_pattern(t.src) {
            stats[automaton.depth(t.src) as usize].insert(pattern);
        }
    }
    stats
}

/// Returns the patterns reached at `min_depth` or deeper in more than `min_runs` of `runs`.
///
/// These are the keywords whose states are committed to regardless of depth, so that typical
/// inputs stay within a shallow subset.
pub fn collect_frequent_patterns<'t>(
    automaton: &Automaton,
    runs: impl IntoIterator<Item = &'t [Transition]>,
    min_runs: usize,
    min_depth: u32,
) -> BTreeSet<PatternId> {
    runs.into_iter()
        .flat_map(|transitions| {
            depth_stats(automaton, transitions)
                .into_iter()
                .skip(min_depth as usize)
                .flatten()
                .collect::<BTreeSet<_>>()
        })
        .counts()
        .into_iter()
        .filter(|&(_, count)| count > min_runs)
        .map(|(pattern, _)| pattern)
        .collect()
}
