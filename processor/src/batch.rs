use alloc::vec::Vec;

#[cfg(feature = "concurrent")]
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use zkscan_core::{StateId, Symbol};

use crate::{
    errors::EncodeError,
    size_class::{EncodedInput, Encoder},
};

/// Encodes every input of `inputs` independently, from the root, with `encoder`.
///
/// Results are returned in input order. With the `concurrent` feature the inputs are encoded in
/// parallel.
#[tracing::instrument(skip_all, fields(num_inputs = inputs.len(), num_chunks = num_chunks))]
pub fn encode_batch<I>(
    encoder: &Encoder<'_>,
    inputs: &[I],
    num_chunks: usize,
) -> Vec<Result<EncodedInput, EncodeError>>
where
    I: AsRef<[Symbol]> + Sync,
{
    let encode = |input: &I| encoder.encode(input.as_ref(), StateId::ROOT, num_chunks);

    #[cfg(feature = "concurrent")]
    let results = inputs.par_iter().map(encode).collect();
    #[cfg(not(feature = "concurrent"))]
    let results = inputs.iter().map(encode).collect();

    results
}
