use zkscan_utils_indexing::IndexedVecError;

// AUTOMATON ERROR
// ================================================================================================

/// Fatal errors raised while constructing an [`Automaton`](crate::Automaton).
///
/// Construction is all-or-nothing: no partially built automaton is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutomatonError {
    #[error("unsupported alphabet width of {0} bits; expected 4 or 8")]
    UnsupportedAlphabet(u32),
    #[error("pattern {pattern} is empty")]
    EmptyPattern { pattern: usize },
    #[error(
        "symbol {symbol} at offset {offset} of pattern {pattern} is outside the {bits}-bit alphabet"
    )]
    SymbolOutOfRange {
        pattern: usize,
        offset: usize,
        symbol: u16,
        bits: u32,
    },
    #[error("automaton has {num_states} states, but at most 2^{max_bits} states can be digitized")]
    TooManyStates { num_states: usize, max_bits: u32 },
    #[error("failed to decode pattern list")]
    Decode(#[from] DecodeError),
    #[error("automaton table overflow")]
    Table(#[from] IndexedVecError),
}

// DECODE ERROR
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid hex digit '{digit}' at offset {offset} of line {line}")]
    InvalidHexDigit { line: usize, offset: usize, digit: char },
}
