#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod errors;
mod options;

pub mod batch;
pub mod padding;
pub mod size_class;
pub mod stats;
pub mod trace;
pub mod tracer;
pub mod witness;

// RE-EXPORTS
// ================================================================================================

pub use errors::{EncodeError, PaddingError, TraceError, UnresolvableReason};
pub use options::{OptionsError, PaddingOptions, SizeClassOptions};
pub use padding::{PaddedInput, PaddedRun, PaddingEngine, PaddingLayout};
pub use size_class::{EncodedInput, Encoder, PartitionedInput, SizeClass};
pub use trace::{ChunkCheck, ChunkOverflow, ChunkPlan, ChunkedRun, ChunkedTrace, TraceRunner};
pub use witness::{DEFAULT_DEPTH_THRESHOLDS, NodeWitness, SubsetList, TraceWitness};
pub use zkscan_core::{
    Alphabet, Automaton, AutomatonError, DigitizedValue, PatternId, StateId, Symbol, Transition,
};
