use alloc::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    vec::Vec,
};

use zkscan_utils_indexing::{Idx, IndexVec};

use super::{Edge, OutputSet, PatternId, StateId};
use crate::{Alphabet, Symbol, errors::AutomatonError};

// RAW TABLES
// ================================================================================================

/// Per-state tables of an automaton before they are frozen.
#[derive(Debug)]
pub(super) struct RawTables {
    pub goto: IndexVec<StateId, Vec<Edge>>,
    pub fail: IndexVec<StateId, StateId>,
    pub depth: IndexVec<StateId, u32>,
    pub origin: IndexVec<StateId, Option<PatternId>>,
    pub outputs: IndexVec<StateId, OutputSet>,
}

impl RawTables {
    pub fn num_states(&self) -> usize {
        self.fail.len()
    }

    pub fn num_edges(&self) -> usize {
        self.goto.iter().map(Vec::len).sum()
    }
}

/// Builds the trie, fail links and trapped states for `patterns`.
pub(super) fn build_tables(
    alphabet: Alphabet,
    patterns: &IndexVec<PatternId, Vec<Symbol>>,
) -> Result<RawTables, AutomatonError> {
    let mut builder = TrieBuilder::new(alphabet)?;

    {
        let _span = tracing::info_span!("build_trie", num_patterns = patterns.len()).entered();
        for (id, pattern) in patterns.iter_enumerated() {
            builder.insert(id, pattern)?;
        }
        builder.close_root();
    }

    {
        let _span =
            tracing::info_span!("build_fail_edges", num_states = builder.fail.len()).entered();
        builder.build_fail_edges();
    }

    builder.trap_rejecting_states();
    Ok(builder.finish())
}

// TRIE BUILDER
// ================================================================================================

struct TrieBuilder {
    alphabet: Alphabet,
    goto: IndexVec<StateId, BTreeMap<Symbol, StateId>>,
    fail: IndexVec<StateId, StateId>,
    depth: IndexVec<StateId, u32>,
    origin: IndexVec<StateId, Option<PatternId>>,
    outputs: IndexVec<StateId, BTreeSet<PatternId>>,
}

impl TrieBuilder {
    fn new(alphabet: Alphabet) -> Result<Self, AutomatonError> {
        let mut builder = Self {
            alphabet,
            goto: IndexVec::new(),
            fail: IndexVec::new(),
            depth: IndexVec::new(),
            origin: IndexVec::new(),
            outputs: IndexVec::new(),
        };
        builder.add_state(0, None)?;
        Ok(builder)
    }

    fn add_state(
        &mut self,
        depth: u32,
        origin: Option<PatternId>,
    ) -> Result<StateId, AutomatonError> {
        let id = self.goto.push(BTreeMap::new())?;
        self.fail.push(StateId::ROOT)?;
        self.depth.push(depth)?;
        self.origin.push(origin)?;
        self.outputs.push(BTreeSet::new())?;
        Ok(id)
    }

    /// Adds `pattern` to the trie, reusing its longest prefix already present.
    fn insert(&mut self, id: PatternId, pattern: &[Symbol]) -> Result<(), AutomatonError> {
        if pattern.is_empty() {
            return Err(AutomatonError::EmptyPattern { pattern: id.to_usize() });
        }
        if let Some(offset) = pattern.iter().position(|&s| !self.alphabet.contains(s)) {
            return Err(AutomatonError::SymbolOutOfRange {
                pattern: id.to_usize(),
                offset,
                symbol: pattern[offset].as_u16(),
                bits: self.alphabet.bits(),
            });
        }

        let mut state = StateId::ROOT;
        let mut matched = 0;
        while let Some(&next) = pattern.get(matched).and_then(|s| self.goto[state].get(s)) {
            state = next;
            matched += 1;
        }

        for &symbol in &pattern[matched..] {
            let next = self.add_state(self.depth[state] + 1, Some(id))?;
            self.goto[state].insert(symbol, next);
            state = next;
        }
        self.outputs[state].insert(id);
        Ok(())
    }

    /// Makes every symbol without a trie edge loop on the root.
    fn close_root(&mut self) {
        let row = &mut self.goto[StateId::ROOT];
        for symbol in self.alphabet.symbols() {
            row.entry(symbol).or_insert(StateId::ROOT);
        }
    }

    /// Computes fail links breadth-first and propagates outputs along them.
    ///
    /// For a trie edge `s --a--> t`, the fail link of `t` is the goto on `a` of the deepest
    /// state on the fail chain of `s` which has one. The root has a goto on every symbol, so
    /// the search always terminates.
    fn build_fail_edges(&mut self) {
        let mut queue: VecDeque<StateId> = self.goto[StateId::ROOT]
            .values()
            .copied()
            .filter(|&child| child != StateId::ROOT)
            .collect();

        while let Some(state) = queue.pop_front() {
            let children: Vec<(Symbol, StateId)> =
                self.goto[state].iter().map(|(&symbol, &child)| (symbol, child)).collect();

            for (symbol, child) in children {
                queue.push_back(child);

                let mut candidate = self.fail[state];
                let target = loop {
                    if let Some(&target) = self.goto[candidate].get(&symbol) {
                        break target;
                    }
                    candidate = self.fail[candidate];
                };
                debug_assert!(self.depth[target] < self.depth[child]);

                self.fail[child] = target;
                let inherited = self.outputs[target].clone();
                self.outputs[child].extend(inherited);
            }
        }
    }

    /// Replaces the goto row of every state reporting a pattern with self-loops.
    fn trap_rejecting_states(&mut self) {
        let alphabet = self.alphabet;
        for state in self.outputs.indices() {
            if !self.outputs[state].is_empty() {
                self.goto[state] = alphabet.symbols().map(|symbol| (symbol, state)).collect();
            }
        }
    }

    fn finish(self) -> RawTables {
        let goto = self
            .goto
            .into_inner()
            .into_iter()
            .map(|row| {
                row.into_iter().map(|(symbol, target)| Edge { symbol, target }).collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let outputs = self
            .outputs
            .into_inner()
            .into_iter()
            .map(|set| set.into_iter().collect::<OutputSet>())
            .collect::<Vec<_>>();

        RawTables {
            goto: IndexVec::try_from(goto).expect("same length as the state table"),
            fail: self.fail,
            depth: self.depth,
            origin: self.origin,
            outputs: IndexVec::try_from(outputs).expect("same length as the state table"),
        }
    }
}
