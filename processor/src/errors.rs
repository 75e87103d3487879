// Allow unused assignments - required by miette::Diagnostic derive macro
#![allow(unused_assignments)]

//! # Error Architecture
//!
//! Running an automaton over an input can go wrong in two very different ways:
//!
//! - **Fatal** conditions mean the request itself is malformed (zero chunks, an unknown initial
//!   state, symbols outside of the alphabet) or that an internal invariant broke. These are
//!   [`TraceError`]s and always propagate to the caller.
//!
//! - **Expected** conditions are part of normal operation. A chunk whose backtracking exceeds its
//!   transition budget is reported as a value ([`ChunkOverflow`]), not as an error. Only when the
//!   padding repair engine gives up does it become a [`PaddingError::Unresolvable`], which callers
//!   may recover from by moving to a larger size class (see [`PaddingError::is_recoverable`]).
//!
//! [`EncodeError`] is what the size-class layer reports once escalation is exhausted.

use alloc::boxed::Box;

use miette::Diagnostic;
use zkscan_core::{StateId, Symbol};

use crate::trace::ChunkOverflow;

// TRACE ERROR
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum TraceError {
    #[error("cannot split a trace into zero chunks")]
    #[diagnostic(help("use one chunk per proving node"))]
    ZeroChunks,
    #[error("initial state {state} does not exist; the automaton has {num_states} states")]
    UnknownState { state: StateId, num_states: usize },
    #[error("input symbol {symbol} at position {position} is outside the {bits}-bit alphabet")]
    #[diagnostic(help("inputs may only contain alphabet symbols and the padding symbol {term}"))]
    SymbolOutOfRange {
        position: usize,
        symbol: Symbol,
        bits: u32,
        term: Symbol,
    },
    #[error("chunked run produced {actual} transitions, expected {expected}")]
    #[diagnostic(help("every chunk must emit exactly twice its length in transitions"))]
    TransitionCountMismatch { expected: usize, actual: usize },
    #[error("chunk {chunk_index} overflowed although the counting run of the same input fit")]
    DivergentRun { chunk_index: usize },
}

// PADDING ERROR
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum PaddingError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Trace(#[from] TraceError),
    #[error("input of {len} symbols does not fit a target size of {target}")]
    #[diagnostic(help("pick a larger size class"))]
    InputTooLong { len: usize, target: usize },
    #[error("padding cannot absorb the backtracking in chunk {}", .last_overflow.chunk_index)]
    #[diagnostic(help("pick a larger size class or use more chunks"))]
    Unresolvable {
        #[source]
        reason: UnresolvableReason,
        last_overflow: ChunkOverflow,
    },
}

impl PaddingError {
    /// Returns `true` if a larger target size may succeed where this attempt failed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Trace(_))
    }

    /// Returns the overflow diagnostic of the last repair attempt, if any.
    pub fn last_overflow(&self) -> Option<&ChunkOverflow> {
        match self {
            Self::Unresolvable { last_overflow, .. } => Some(last_overflow),
            _ => None,
        }
    }
}

/// Why the padding repair engine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnresolvableReason {
    #[error("chunks of {chunk_size} symbols cannot hold a backtrack of depth {max_back_depth}")]
    ChunkTooSmall { chunk_size: usize, max_back_depth: usize },
    #[error("{needed} padding symbols are needed but only {space_left} remain")]
    SlackExhausted { needed: usize, space_left: usize },
    #[error("overflow persists after {attempts} padding insertions")]
    AttemptsExhausted { attempts: usize },
}

// ENCODE ERROR
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum EncodeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Trace(#[from] TraceError),
    #[error("input of {len} symbols cannot be encoded in {num_chunks} chunks")]
    #[diagnostic(help("the largest size class tried was {last_size}"))]
    NoSizeClass {
        len: usize,
        num_chunks: usize,
        last_size: usize,
        #[source]
        last_error: Box<PaddingError>,
    },
}

impl AsRef<dyn Diagnostic> for EncodeError {
    fn as_ref(&self) -> &(dyn Diagnostic + 'static) {
        self
    }
}
