//! Shared fixtures for zkscan tests and benchmarks.

use zkscan_core::{Alphabet, Automaton, Symbol};

pub mod rand;

// FIXTURES
// ================================================================================================

/// The textbook `{"he", "she", "hers"}` automaton over bytes.
///
/// After normalization its states are numbered: root `0`, `h` `1`, `s` `2`, `sh` `3` (accepting)
/// and `her` `4`, `he` `5`, `she` `6`, `hers` `7` (trapped).
pub fn he_she_hers() -> Automaton {
    Automaton::new(Alphabet::Byte, ["he", "she", "hers"].map(bytes))
        .expect("fixture patterns are valid")
}

/// A byte automaton for the single pattern `a^depth b`.
///
/// Reading `a^depth` followed by anything but `b` falls back through every state of the chain,
/// so it produces backtracks of arbitrary depth.
pub fn backtrack_chain(depth: usize) -> Automaton {
    let mut pattern = repeat('a', depth);
    pattern.push(Symbol::from(b'b'));
    Automaton::new(Alphabet::Byte, [pattern]).expect("fixture pattern is valid")
}

/// Encodes `text` as byte symbols.
pub fn bytes(text: &str) -> Vec<Symbol> {
    Alphabet::Byte.encode_str(text)
}

/// Returns `count` copies of the byte symbol for `c`.
///
/// # Panics
/// Panics if `c` is not an ASCII character.
pub fn repeat(c: char, count: usize) -> Vec<Symbol> {
    assert!(c.is_ascii(), "fixture symbols must be ASCII");
    vec![Symbol::from(c as u8); count]
}
