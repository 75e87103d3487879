#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// This is an implementation of `std::assert_matches::assert_matches`
/// so it can be removed when that feature stabilizes upstream
#[macro_export]
macro_rules! assert_matches {
    ($left:expr, $(|)? $( $pattern:pat_param )|+ $( if $guard: expr )? $(,)?) => {
        match $left {
            $( $pattern )|+ $( if $guard )? => {}
            ref left_val => {
                panic!(r#"
assertion failed: `(left matches right)`
    left: `{:?}`,
    right: `{}`"#, left_val, stringify!($($pattern)|+ $(if $guard)?));
            }
        }
    };

    ($left:expr, $(|)? $( $pattern:pat_param )|+ $( if $guard: expr )?, $msg:literal $(,)?) => {
        match $left {
            $( $pattern )|+ $( if $guard )? => {}
            ref left_val => {
                panic!(concat!(r#"
assertion failed: `(left matches right)`
    left: `{:?}`,
    right: `{}`
"#, $msg), left_val, stringify!($($pattern)|+ $(if $guard)?));
            }
        }
    };
}

pub mod alphabet;
pub mod errors;

mod automaton;
pub use automaton::{Automaton, DepthProfile, Edge, OutputSet, PatternId, StateId};

pub mod transition;

pub use alphabet::{Alphabet, Symbol};
pub use errors::{AutomatonError, DecodeError};
pub use transition::{DigitizedValue, Digitizer, MAX_STATE_BITS, TRANSITION_OFFSET, Transition};
pub use zkscan_utils_indexing::{DenseIdMap, Idx, IndexVec};
