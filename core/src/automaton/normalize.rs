use alloc::vec::Vec;

use zkscan_utils_indexing::{DenseIdMap, Idx, IndexVec};

use super::{OutputSet, StateId, builder::RawTables};
use crate::errors::AutomatonError;

/// Renumbers states so that accepting states occupy `[0, num_accepting)`.
///
/// Accepting states keep their relative order, as do rejecting ones; in particular the root
/// stays at 0. Every table is rebuilt from the permutation, so the returned tables are
/// consistent as a whole. Returns the new tables and the number of accepting states.
pub(super) fn normalize_final_states(
    tables: RawTables,
) -> Result<(RawTables, usize), AutomatonError> {
    let _span =
        tracing::info_span!("normalize_final_states", num_states = tables.num_states()).entered();

    let (map, num_accepting) = final_state_permutation(&tables.outputs);
    let remap = |state: StateId| map.get(state).expect("permutation covers every state");

    let mut goto = tables.goto.permuted(&map)?;
    for edge in goto.iter_mut().flatten() {
        edge.target = remap(edge.target);
    }

    let mut fail = tables.fail.permuted(&map)?;
    for target in fail.iter_mut() {
        *target = remap(*target);
    }

    let normalized = RawTables {
        goto,
        fail,
        depth: tables.depth.permuted(&map)?,
        origin: tables.origin.permuted(&map)?,
        outputs: tables.outputs.permuted(&map)?,
    };
    debug_assert_eq!(normalized.fail[StateId::ROOT], StateId::ROOT);

    Ok((normalized, num_accepting))
}

fn final_state_permutation(
    outputs: &IndexVec<StateId, OutputSet>,
) -> (DenseIdMap<StateId, StateId>, usize) {
    let (accepting, rejecting): (Vec<StateId>, Vec<StateId>) =
        outputs.indices().partition(|&state| outputs[state].is_empty());

    let mut map = DenseIdMap::new(outputs.len());
    for (new, old) in accepting.iter().chain(&rejecting).enumerate() {
        map.insert(*old, StateId::from_usize(new));
    }
    (map, accepting.len())
}
