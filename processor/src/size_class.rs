use alloc::{boxed::Box, vec::Vec};

use zkscan_core::{Automaton, StateId, Symbol};

use crate::{
    errors::{EncodeError, PaddingError, TraceError},
    options::{PaddingOptions, SizeClassOptions},
    padding::{PaddedInput, PaddedRun, PaddingEngine},
    trace::{ChunkedTrace, TraceRunner},
};

// SIZE CLASS
// ================================================================================================

/// A padded input length for which a proving circuit exists.
///
/// Class `id` spans roughly `2^(id + 1)` symbols, split into `num_chunks` per-node chunks whose
/// sizes are multiples of the size class unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeClass {
    id: u32,
    size: usize,
}

impl SizeClass {
    /// Returns class `id` for runs split into `num_chunks` chunks, or `None` if its size does not
    /// fit in a `usize`.
    pub fn new(id: u32, num_chunks: usize, unit: usize) -> Option<Self> {
        class_size(id, num_chunks, unit).map(|size| Self { id, size })
    }

    /// Returns the smallest class which can hold `len` symbols in `num_chunks` chunks.
    pub fn for_len(len: usize, num_chunks: usize, unit: usize) -> Option<Self> {
        let min_size = unit.checked_mul(num_chunks)?;
        if len < min_size {
            return Self::new(ceil_log2(min_size), num_chunks, unit);
        }
        (1..usize::BITS)
            .map_while(|id| Self::new(id, num_chunks, unit))
            .find(|class| class.size > len)
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Returns the target input length of this class.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the next larger class.
    pub fn next(&self, num_chunks: usize, unit: usize) -> Option<Self> {
        Self::new(self.id + 1, num_chunks, unit)
    }
}

/// Returns the padded length of size class `id` for `num_chunks` chunks.
///
/// `2^(id + 1) - unit * num_chunks` symbols are spread over the chunks, each share is rounded up
/// to a multiple of `unit`, and the result is never below one unit per chunk.
pub fn class_size(id: u32, num_chunks: usize, unit: usize) -> Option<usize> {
    if num_chunks == 0 || unit == 0 {
        return None;
    }
    let min_size = unit.checked_mul(num_chunks)?;
    let span = 2usize.checked_shl(id).filter(|&span| span >> id == 2)?;
    let per_chunk = (span.saturating_sub(min_size) / num_chunks).div_ceil(unit) * unit;
    Some(per_chunk.checked_mul(num_chunks)?.max(min_size))
}

fn ceil_log2(value: usize) -> u32 {
    if value <= 1 { 0 } else { (value - 1).ilog2() + 1 }
}

// ENCODED INPUT
// ================================================================================================

/// An input padded to a size class together with its chunked trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInput {
    pub size_class: SizeClass,
    pub input: PaddedInput,
    pub trace: ChunkedTrace,
}

impl EncodedInput {
    pub fn initial_state(&self) -> StateId {
        self.trace.initial_state()
    }

    pub fn final_state(&self) -> StateId {
        self.trace.final_state()
    }
}

/// An oversized input encoded as consecutive parts, each resuming from the state the previous
/// one ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionedInput {
    parts: Vec<EncodedInput>,
}

impl PartitionedInput {
    pub fn parts(&self) -> &[EncodedInput] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<EncodedInput> {
        self.parts
    }

    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    pub fn target_sizes(&self) -> impl Iterator<Item = usize> {
        self.parts.iter().map(|part| part.size_class.size())
    }

    /// Returns the state the last part ends in.
    pub fn final_state(&self) -> StateId {
        self.parts.last().map_or(StateId::ROOT, EncodedInput::final_state)
    }
}

// ENCODER
// ================================================================================================

/// Pads inputs to the smallest size class whose run fits, moving to larger classes when padding
/// cannot absorb the backtracking.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    engine: PaddingEngine<'a>,
    options: SizeClassOptions,
}

impl<'a> Encoder<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        Self::with_options(automaton, PaddingOptions::default(), SizeClassOptions::default())
    }

    pub fn with_options(
        automaton: &'a Automaton,
        padding: PaddingOptions,
        options: SizeClassOptions,
    ) -> Self {
        Self {
            engine: PaddingEngine::with_options(TraceRunner::new(automaton), padding),
            options,
        }
    }

    pub fn engine(&self) -> &PaddingEngine<'a> {
        &self.engine
    }

    pub fn options(&self) -> &SizeClassOptions {
        &self.options
    }

    /// Returns the size class an input of `len` symbols is tried with first.
    pub fn size_class_for(&self, len: usize, num_chunks: usize) -> Option<SizeClass> {
        SizeClass::for_len(len, num_chunks, self.options.unit())
    }

    /// Pads `raw` to the smallest workable size class and runs it in `num_chunks` chunks.
    ///
    /// The class computed from the input length is tried first; on a recoverable padding failure
    /// the next larger class is tried, up to `max_bumps` times.
    ///
    /// # Errors
    /// Returns [`EncodeError::NoSizeClass`] if every class tried failed, and
    /// [`EncodeError::Trace`] if the input or the request is malformed.
    #[tracing::instrument(
        name = "encode_input",
        skip_all,
        fields(len = raw.len(), num_chunks = num_chunks)
    )]
    pub fn encode(
        &self,
        raw: &[Symbol],
        initial_state: StateId,
        num_chunks: usize,
    ) -> Result<EncodedInput, EncodeError> {
        if num_chunks == 0 {
            return Err(TraceError::ZeroChunks.into());
        }
        let unit = self.options.unit();
        let no_class = |last_size: usize, last_error: PaddingError| EncodeError::NoSizeClass {
            len: raw.len(),
            num_chunks,
            last_size,
            last_error: Box::new(last_error),
        };

        let mut size_class = self.size_class_for(raw.len(), num_chunks).ok_or_else(|| {
            no_class(0, PaddingError::InputTooLong { len: raw.len(), target: usize::MAX })
        })?;
        let mut bumps = 0;
        loop {
            let error = match self.engine.pad_and_run(
                raw,
                size_class.size(),
                initial_state,
                num_chunks,
            ) {
                Ok(PaddedRun { input, trace }) => {
                    return Ok(EncodedInput { size_class, input, trace });
                },
                Err(PaddingError::Trace(err)) => return Err(err.into()),
                Err(err) => err,
            };

            let next = size_class.next(num_chunks, unit);
            match next {
                Some(next) if bumps < self.options.max_bumps() => {
                    tracing::warn!(
                        from = size_class.size(),
                        to = next.size(),
                        reason = %error,
                        "moving to a larger size class"
                    );
                    size_class = next;
                    bumps += 1;
                },
                _ => return Err(no_class(size_class.size(), error)),
            }
        }
    }

    /// Encodes `raw` as consecutive parts of at most `partition_limit` symbols.
    ///
    /// The first part starts from the root; every later part starts from the state the previous
    /// part ended in. Empty inputs are encoded as a single empty part.
    #[tracing::instrument(
        name = "encode_partitioned",
        skip_all,
        fields(len = raw.len(), num_chunks = num_chunks)
    )]
    pub fn encode_partitioned(
        &self,
        raw: &[Symbol],
        num_chunks: usize,
    ) -> Result<PartitionedInput, EncodeError> {
        let limit = self.options.partition_limit();
        let num_parts = raw.len().div_ceil(limit).max(1);
        tracing::debug!(num_parts, limit, "partitioning input");

        let mut parts = Vec::with_capacity(num_parts);
        let mut state = StateId::ROOT;
        for index in 0..num_parts {
            let end = raw.len().min((index + 1) * limit);
            let part = self.encode(&raw[index * limit..end], state, num_chunks)?;
            state = part.final_state();
            parts.push(part);
        }
        Ok(PartitionedInput { parts })
    }
}
