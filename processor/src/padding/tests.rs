use alloc::vec::Vec;

use pretty_assertions::assert_eq;
use zkscan_core::{Alphabet, StateId, Symbol, assert_matches};
use zkscan_test_utils::{backtrack_chain, bytes, he_she_hers, repeat};

use super::*;

fn padding(count: usize) -> Vec<Symbol> {
    vec![Alphabet::Byte.term(); count]
}

/// `a^before c a^after`
fn backtrack_input(before: usize, after: usize) -> Vec<Symbol> {
    [repeat('a', before), bytes("c"), repeat('a', after)].concat()
}

// PLAIN PADDING
// ================================================================================================

#[test]
fn clean_inputs_are_padded_at_the_end() {
    let ac = he_she_hers();
    let engine = PaddingEngine::new(TraceRunner::new(&ac));

    let padded = engine.pad(&bytes("hello"), 8, StateId::ROOT, 2).unwrap();
    assert_eq!(padded.layout(), PaddingLayout::End);
    assert_eq!(padded.symbols(), [bytes("hello"), padding(3)].concat());
    assert!(padded.insertions().is_empty());
}

#[test]
fn start_padding_is_tried_second() {
    // the 'c' falls back through 8 states close to the end of chunk 1 unless the input is shifted
    let ac = backtrack_chain(8);
    let raw = backtrack_input(30, 13);
    let engine = PaddingEngine::new(TraceRunner::new(&ac));

    let padded = engine.pad(&raw, 48, StateId::ROOT, 3).unwrap();
    assert_eq!(padded.layout(), PaddingLayout::Start);
    assert_eq!(padded.symbols(), [padding(4), raw].concat());
}

#[test]
fn oversized_inputs_are_recoverable() {
    let ac = he_she_hers();
    let engine = PaddingEngine::new(TraceRunner::new(&ac));

    let err = engine.pad(&bytes("hello"), 4, StateId::ROOT, 2).unwrap_err();
    assert_eq!(err, PaddingError::InputTooLong { len: 5, target: 4 });
    assert!(err.is_recoverable());
}

#[test]
fn trace_errors_are_fatal() {
    let ac = he_she_hers();
    let engine = PaddingEngine::new(TraceRunner::new(&ac));

    let err = engine.pad(&bytes("hello"), 8, StateId::ROOT, 0).unwrap_err();
    assert_eq!(err, PaddingError::Trace(TraceError::ZeroChunks));
    assert!(!err.is_recoverable());

    let err = engine.pad(&[Symbol::new(300)], 8, StateId::ROOT, 2).unwrap_err();
    assert_matches!(err, PaddingError::Trace(TraceError::SymbolOutOfRange { position: 0, .. }));
}

// REPAIR
// ================================================================================================

#[test]
fn shallow_backtracks_get_a_block_at_the_chunk_start() {
    // chunks of 80 symbols; the backtrack of depth 8 is shallow (< 80 / 8) and overflows chunk 1
    // by 4 wherever the plain padding goes
    let ac = backtrack_chain(8);
    let raw = backtrack_input(156, 3);
    let engine = PaddingEngine::new(TraceRunner::new(&ac));

    let padded = engine.pad(&raw, 240, StateId::ROOT, 3).unwrap();
    assert_eq!(padded.layout(), PaddingLayout::Repaired);
    assert_eq!(padded.insertions(), [Insertion { position: 80, count: 4 * 4 + 2 }]);
    assert_eq!(
        padded.symbols(),
        [repeat('a', 80), padding(18), backtrack_input(76, 3), padding(62)].concat()
    );
}

#[test]
fn deep_backtracks_are_pushed_into_the_next_chunk() {
    let ac = backtrack_chain(8);
    let raw = backtrack_input(76, 3);
    let engine = PaddingEngine::new(TraceRunner::new(&ac));

    let padded = engine.pad(&raw, 120, StateId::ROOT, 3).unwrap();
    assert_eq!(padded.layout(), PaddingLayout::Repaired);
    // 36 symbols of chunk 1 precede the 'c', so 4 padding symbols move it to chunk 2
    assert_eq!(padded.insertions(), [Insertion { position: 76, count: 4 }]);
    assert_eq!(
        padded.symbols(),
        [repeat('a', 76), padding(4), backtrack_input(0, 3), padding(36)].concat()
    );
}

#[test]
fn repaired_inputs_run_within_budget() {
    let ac = backtrack_chain(8);
    let raw = backtrack_input(156, 3);
    let engine = PaddingEngine::new(TraceRunner::new(&ac));

    let PaddedRun { input, trace } = engine.pad_and_run(&raw, 240, StateId::ROOT, 3).unwrap();
    assert_eq!(trace.transitions().len(), 2 * 240);
    assert_eq!(trace.initial_state(), StateId::ROOT);
    let unpadded: Vec<Symbol> =
        input.symbols().iter().copied().filter(|&s| s != Alphabet::Byte.term()).collect();
    assert_eq!(unpadded, raw);
}

#[test]
fn chunks_shorter_than_the_backtrack_are_unresolvable() {
    let ac = backtrack_chain(24);
    let raw = [repeat('a', 20), bytes("c"), repeat('x', 11)].concat();
    let engine = PaddingEngine::new(TraceRunner::new(&ac));

    let err = engine.pad(&raw, 32, StateId::ROOT, 4).unwrap_err();
    assert_eq!(
        err,
        PaddingError::Unresolvable {
            reason: UnresolvableReason::ChunkTooSmall { chunk_size: 8, max_back_depth: 20 },
            last_overflow: ChunkOverflow {
                chunk_index: 2,
                overflow: 12,
                max_back_depth: 20,
                max_back_start: 4,
            },
        }
    );
    assert!(err.is_recoverable());

    // chunks of 32 symbols absorb the backtrack
    let PaddedRun { input, trace } = engine.pad_and_run(&raw, 128, StateId::ROOT, 4).unwrap();
    assert_eq!(input.layout(), PaddingLayout::End);
    assert_eq!(trace.transitions().len(), 2 * 128);
}

#[test]
fn repair_stops_when_slack_runs_out() {
    let ac = backtrack_chain(8);
    let raw = backtrack_input(28, 0);
    let engine = PaddingEngine::new(TraceRunner::new(&ac));

    let err = engine.pad(&raw, 32, StateId::ROOT, 2).unwrap_err();
    assert_eq!(
        err,
        PaddingError::Unresolvable {
            reason: UnresolvableReason::SlackExhausted { needed: 4, space_left: 3 },
            last_overflow: ChunkOverflow {
                chunk_index: 1,
                overflow: 4,
                max_back_depth: 8,
                max_back_start: 12,
            },
        }
    );
}

#[test]
fn repair_stops_after_the_attempt_limit() {
    // single-symbol blocks at the start of chunk 1 never move the backtrack far enough
    let ac = backtrack_chain(16);
    let raw = backtrack_input(257, 14);
    let options = PaddingOptions::new(8, 1, 0).unwrap().with_extra_attempts(0);
    let engine = PaddingEngine::with_options(TraceRunner::new(&ac), options);

    let err = engine.pad(&raw, 408, StateId::ROOT, 3).unwrap_err();
    assert_eq!(
        err,
        PaddingError::Unresolvable {
            reason: UnresolvableReason::AttemptsExhausted { attempts: 3 },
            last_overflow: ChunkOverflow {
                chunk_index: 1,
                overflow: 1,
                max_back_depth: 16,
                max_back_start: 124,
            },
        }
    );
    assert_eq!(err.last_overflow().map(|o| o.chunk_index), Some(1));
}

// PRIMITIVES
// ================================================================================================

#[test]
fn padding_primitives() {
    let term = Alphabet::Nibble.term();
    let raw = Alphabet::Nibble.encode_bytes(&[0xab]);
    assert_eq!(pad_at_end(&raw, 4, term), [raw.clone(), vec![term; 2]].concat());
    assert_eq!(pad_at_start(&raw, 4, term), [vec![term; 2], raw.clone()].concat());
    assert_eq!(pad_at_end(&raw, 1, term), raw);

    let mut input = raw.clone();
    insert_padding(&mut input, Insertion { position: 1, count: 2 }, term);
    assert_eq!(input, [raw[0], term, term, raw[1]]);
}
