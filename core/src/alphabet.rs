use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{AutomatonError, DecodeError};

// SYMBOL
// ================================================================================================

/// A single input symbol.
///
/// Symbols of an `n`-bit alphabet lie in `[0, 2^n)`. The value `2^n` itself is the padding
/// symbol (see [`Alphabet::term`]), which is why symbols are backed by `u16` even for byte
/// alphabets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Symbol(u16);

impl Symbol {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for Symbol {
    fn from(value: u8) -> Self {
        Self(value as u16)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ALPHABET
// ================================================================================================

/// The input alphabet of an automaton.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Alphabet {
    /// 4-bit symbols; files are read as a stream of nibbles, high nibble first.
    Nibble,
    /// 8-bit symbols; files are read byte by byte.
    Byte,
}

impl Alphabet {
    /// Returns the alphabet with the given symbol width.
    pub fn from_bits(bits: u32) -> Result<Self, AutomatonError> {
        match bits {
            4 => Ok(Self::Nibble),
            8 => Ok(Self::Byte),
            _ => Err(AutomatonError::UnsupportedAlphabet(bits)),
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            Self::Nibble => 4,
            Self::Byte => 8,
        }
    }

    /// Returns the number of regular symbols, `2^bits`.
    pub const fn size(self) -> usize {
        1 << self.bits()
    }

    /// Returns the padding symbol `2^bits`.
    ///
    /// The padding symbol is never part of a pattern. Every state loops on it.
    pub const fn term(self) -> Symbol {
        Symbol(self.size() as u16)
    }

    /// Returns `true` if `symbol` is a regular (non-padding) symbol of this alphabet.
    pub const fn contains(self, symbol: Symbol) -> bool {
        symbol.as_usize() < self.size()
    }

    /// Returns `true` if `symbol` is a regular symbol or the padding symbol.
    pub const fn accepts_input(self, symbol: Symbol) -> bool {
        symbol.as_usize() <= self.size()
    }

    /// Returns an iterator over all regular symbols in increasing order.
    pub fn symbols(self) -> impl DoubleEndedIterator<Item = Symbol> + ExactSizeIterator {
        (0..self.size() as u16).map(Symbol)
    }

    /// Converts raw file content into the symbol stream of this alphabet.
    ///
    /// Nibble alphabets emit two symbols per byte (high nibble first).
    pub fn encode_bytes(self, bytes: &[u8]) -> Vec<Symbol> {
        match self {
            Self::Byte => bytes.iter().copied().map(Symbol::from).collect(),
            Self::Nibble => {
                bytes.iter().flat_map(|b| [Symbol::from(b >> 4), Symbol::from(b & 0x0f)]).collect()
            },
        }
    }

    pub fn encode_str(self, text: &str) -> Vec<Symbol> {
        self.encode_bytes(text.as_bytes())
    }
}

// PATTERN DECODING
// ================================================================================================

/// Parses a hex signature (`"01ab"`) into nibble symbols, one symbol per hex digit.
pub fn parse_hex_pattern(line: &str) -> Result<Vec<Symbol>, DecodeError> {
    parse_hex_line(0, line)
}

/// Parses a signature list with one hex pattern per line.
///
/// Surrounding whitespace is ignored, as are blank lines.
pub fn parse_pattern_lines(text: &str) -> Result<Vec<Vec<Symbol>>, DecodeError> {
    text.lines()
        .enumerate()
        .map(|(line, content)| (line, content.trim()))
        .filter(|(_, content)| !content.is_empty())
        .map(|(line, content)| parse_hex_line(line, content))
        .collect()
}

fn parse_hex_line(line: usize, content: &str) -> Result<Vec<Symbol>, DecodeError> {
    content
        .chars()
        .enumerate()
        .map(|(offset, digit)| {
            digit
                .to_digit(16)
                .map(|v| Symbol::new(v as u16))
                .ok_or(DecodeError::InvalidHexDigit { line, offset, digit })
        })
        .collect()
}
