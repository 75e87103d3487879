use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{StateId, Symbol, errors::AutomatonError};

/// Offset added to every digitized transition, placing transitions above any state value.
pub const TRANSITION_OFFSET: u128 = 1 << 62;

/// Largest supported state width `k`; automata with more than `2^30` states are rejected.
pub const MAX_STATE_BITS: u32 = 30;

// TRANSITION
// ================================================================================================

/// A single step of an automaton run.
///
/// Fail transitions consume no input: the symbol is carried along so that the step can be
/// checked against the automaton's transition set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transition {
    pub src: StateId,
    pub symbol: Symbol,
    pub dest: StateId,
    pub is_fail: bool,
}

impl Transition {
    /// Returns a goto transition which consumes `symbol`.
    pub const fn forward(src: StateId, symbol: Symbol, dest: StateId) -> Self {
        Self { src, symbol, dest, is_fail: false }
    }

    /// Returns a fail transition taken while looking for a goto on `symbol`.
    pub const fn fail(src: StateId, symbol: Symbol, dest: StateId) -> Self {
        Self { src, symbol, dest, is_fail: true }
    }

    /// Returns the filler transition used to top a chunk up to its fixed size.
    pub const fn filler(state: StateId, term: Symbol) -> Self {
        Self::fail(state, term, state)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.is_fail { "~~" } else { "--" };
        write!(f, "{} {arrow}{}{arrow}> {}", self.src, self.symbol, self.dest)
    }
}

// DIGITIZED VALUE
// ================================================================================================

/// The numeric encoding of a state or transition, as consumed by the proving circuit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct DigitizedValue(u128);

impl DigitizedValue {
    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Returns `true` if this value encodes a transition rather than a state.
    pub const fn is_transition(self) -> bool {
        self.0 >= TRANSITION_OFFSET
    }
}

impl fmt::Display for DigitizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// DIGITIZER
// ================================================================================================

/// Encodes states and transitions of an automaton with `2^k` or fewer states.
///
/// A state encodes as its own id. A transition `(src, c, dest, is_fail)` encodes as
///
/// ```text
/// (c << (2k + 1)) + (src << (k + 1)) + (dest << 1) + is_fail + 2^62
/// ```
///
/// Every field occupies its own bit range, so the encoding is injective, and the offset keeps
/// transition values disjoint from state values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Digitizer {
    state_bits: u32,
}

impl Digitizer {
    /// Returns a digitizer for an automaton with `num_states` states.
    ///
    /// # Errors
    /// Returns an error if `num_states` exceeds `2^MAX_STATE_BITS`.
    pub fn for_state_count(num_states: usize) -> Result<Self, AutomatonError> {
        let state_bits = state_bits_for(num_states);
        if state_bits > MAX_STATE_BITS {
            return Err(AutomatonError::TooManyStates { num_states, max_bits: MAX_STATE_BITS });
        }
        Ok(Self { state_bits })
    }

    /// Returns `k`, the number of bits used for a state id.
    pub const fn state_bits(&self) -> u32 {
        self.state_bits
    }

    pub fn state(&self, state: StateId) -> DigitizedValue {
        DigitizedValue(state.as_u32() as u128)
    }

    pub fn transition(&self, transition: &Transition) -> DigitizedValue {
        let k = self.state_bits;
        let raw = ((transition.symbol.as_u16() as u128) << (2 * k + 1))
            + ((transition.src.as_u32() as u128) << (k + 1))
            + ((transition.dest.as_u32() as u128) << 1)
            + transition.is_fail as u128;
        DigitizedValue(raw + TRANSITION_OFFSET)
    }

    /// Recovers the transition encoded by `value`, or `None` if `value` is not a transition
    /// encoding for this state width.
    pub fn decode_transition(&self, value: DigitizedValue) -> Option<Transition> {
        let raw = value.0.checked_sub(TRANSITION_OFFSET)?;
        let k = self.state_bits;
        let mask = (1u128 << k) - 1;
        let symbol = u16::try_from(raw >> (2 * k + 1)).ok()?;
        Some(Transition {
            src: StateId::from(((raw >> (k + 1)) & mask) as u32),
            symbol: Symbol::new(symbol),
            dest: StateId::from(((raw >> 1) & mask) as u32),
            is_fail: raw & 1 == 1,
        })
    }
}

/// Returns `ceil(log2(num_states))`, the bit width needed to address every state.
pub const fn state_bits_for(num_states: usize) -> u32 {
    if num_states <= 1 { 0 } else { (num_states - 1).ilog2() + 1 }
}
