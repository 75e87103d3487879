use ::rand::{Rng, SeedableRng, rngs::SmallRng};
use proptest::prelude::*;
use zkscan_core::{Alphabet, Automaton, StateId, Symbol};

// SEEDED GENERATORS
// ================================================================================================

/// Returns `len` regular symbols of `alphabet`, reproducible from `seed`.
pub fn seeded_symbols(seed: u64, alphabet: Alphabet, len: usize) -> Vec<Symbol> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len).map(|_| random_symbol(&mut rng, alphabet)).collect()
}

/// Returns `count` non-empty patterns of at most `max_len` symbols, reproducible from `seed`.
///
/// # Panics
/// Panics if `max_len` is zero.
pub fn seeded_patterns(
    seed: u64,
    alphabet: Alphabet,
    count: usize,
    max_len: usize,
) -> Vec<Vec<Symbol>> {
    assert!(max_len > 0, "patterns must not be empty");
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.random_range(1..=max_len);
            (0..len).map(|_| random_symbol(&mut rng, alphabet)).collect()
        })
        .collect()
}

/// Returns a random input of `len` symbols that `automaton` accepts, i.e. one in which none of
/// its patterns occur.
///
/// Each symbol is drawn at random and, if it would complete a pattern, replaced by the next
/// symbol which does not. Returns `None` if some reachable state has no such symbol.
pub fn seeded_clean_input(seed: u64, automaton: &Automaton, len: usize) -> Option<Vec<Symbol>> {
    let alphabet = automaton.alphabet();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = StateId::ROOT;
    let mut input = Vec::with_capacity(len);

    for _ in 0..len {
        let start = rng.random_range(0..alphabet.size());
        let symbol = (0..alphabet.size())
            .map(|i| Symbol::new(((start + i) % alphabet.size()) as u16))
            .find(|&c| automaton.is_accepting(automaton.delta(state, c)))?;
        state = automaton.delta(state, symbol);
        input.push(symbol);
    }
    Some(input)
}

fn random_symbol(rng: &mut SmallRng, alphabet: Alphabet) -> Symbol {
    Symbol::new(rng.random_range(0..alphabet.size() as u16))
}

// PROPTEST STRATEGIES
// ================================================================================================

/// A regular symbol of `alphabet`.
pub fn any_symbol(alphabet: Alphabet) -> impl Strategy<Value = Symbol> {
    (0..alphabet.size() as u16).prop_map(Symbol::new)
}

/// An input of up to `max_len` regular symbols.
pub fn any_input(alphabet: Alphabet, max_len: usize) -> impl Strategy<Value = Vec<Symbol>> {
    prop::collection::vec(any_symbol(alphabet), 0..=max_len)
}

/// Between one and `max_patterns` non-empty patterns of up to `max_len` symbols each.
pub fn any_patterns(
    alphabet: Alphabet,
    max_patterns: usize,
    max_len: usize,
) -> impl Strategy<Value = Vec<Vec<Symbol>>> {
    prop::collection::vec(
        prop::collection::vec(any_symbol(alphabet), 1..=max_len),
        1..=max_patterns,
    )
}

/// An automaton over `alphabet` built from [`any_patterns`].
pub fn any_automaton(
    alphabet: Alphabet,
    max_patterns: usize,
    max_len: usize,
) -> impl Strategy<Value = Automaton> {
    any_patterns(alphabet, max_patterns, max_len).prop_map(move |patterns| {
        Automaton::new(alphabet, patterns).expect("generated patterns are valid")
    })
}
