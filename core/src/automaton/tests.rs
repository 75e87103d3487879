use alloc::{collections::BTreeSet, vec::Vec};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::errors::DecodeError;

fn he_she_hers() -> Automaton {
    Automaton::new(Alphabet::Byte, ["he", "she", "hers"].map(|p| Alphabet::Byte.encode_str(p)))
        .unwrap()
}

fn s(id: u32) -> StateId {
    StateId::from(id)
}

fn sym(c: char) -> Symbol {
    Symbol::new(c as u16)
}

fn pattern_set() -> impl Strategy<Value = Vec<Vec<Symbol>>> {
    prop::collection::vec(
        prop::collection::vec((0u16..16).prop_map(Symbol::new), 1..7),
        0..10,
    )
}

// CONSTRUCTION
// ================================================================================================

#[test]
fn he_she_hers_tables() {
    let ac = he_she_hers();

    assert_eq!(ac.num_states(), 8);
    assert_eq!(ac.num_accepting_states(), 5);
    assert_eq!(ac.state_bits(), 3);

    // root, h, s, sh, her are accepting; he, she, hers follow in creation order
    let walk = |text: &str| {
        text.chars().try_fold(StateId::ROOT, |state, c| ac.goto(state, sym(c)))
    };
    assert_eq!(walk("h"), Some(s(1)));
    assert_eq!(walk("s"), Some(s(2)));
    assert_eq!(walk("sh"), Some(s(3)));
    assert_eq!(walk("he"), Some(s(5)));
    assert_eq!(walk("she"), Some(s(6)));
    // "he" is trapped, so "her" and "hers" are only reachable while building the trie
    assert_eq!(walk("her"), Some(s(5)));
    assert_eq!(walk("hers"), Some(s(5)));
    assert_eq!(ac.goto(s(4), sym('s')), Some(s(7)));
    assert_eq!(ac.origin_pattern(s(7)), Some(PatternId::from(2u32)));

    let fails: Vec<u32> = ac.states().map(|state| ac.fail(state).as_u32()).collect();
    assert_eq!(fails, [0, 0, 0, 1, 0, 0, 5, 2]);

    let depths: Vec<u32> = ac.states().map(|state| ac.depth(state)).collect();
    assert_eq!(depths, [0, 1, 1, 2, 3, 2, 3, 4]);

    assert_eq!(ac.outputs(s(5)), &[PatternId::from(0u32)]);
    assert_eq!(ac.outputs(s(6)), &[PatternId::from(0u32), PatternId::from(1u32)]);
    assert_eq!(ac.outputs(s(7)), &[PatternId::from(2u32)]);

    assert_eq!(ac.origin_pattern(StateId::ROOT), None);
    assert_eq!(ac.origin_pattern(s(4)), Some(PatternId::from(2u32)));
    assert_eq!(ac.max_depth(), 4);
}

#[test]
fn trapped_states_loop_and_others_fall_back() {
    let ac = he_she_hers();

    // "she" reports a pattern and loops on everything
    for symbol in ac.alphabet().symbols() {
        assert_eq!(ac.goto(s(6), symbol), Some(s(6)));
    }
    // "sh" has a single trie edge and resolves the rest through its fail link
    assert_eq!(ac.edges(s(3)).len(), 1);
    assert_eq!(ac.goto(s(3), sym('x')), None);
    assert_eq!(ac.delta(s(3), sym('e')), s(6));
    assert_eq!(ac.delta(s(3), sym('x')), StateId::ROOT);
    assert_eq!(ac.delta(s(3), ac.alphabet().term()), s(3));
}

#[test]
fn duplicate_patterns_share_states() {
    let ac = Automaton::new(Alphabet::Nibble, [[1u16, 2], [1, 2]].map(|p| p.map(Symbol::new)))
        .unwrap();
    assert_eq!(ac.num_states(), 3);
    assert_eq!(ac.outputs(s(2)), &[PatternId::from(0u32), PatternId::from(1u32)]);
}

#[test]
fn no_patterns_leave_a_single_root() {
    let ac = Automaton::new(Alphabet::Nibble, Vec::<Vec<Symbol>>::new()).unwrap();
    assert_eq!(ac.num_states(), 1);
    assert_eq!(ac.num_accepting_states(), 1);
    assert_eq!(ac.state_bits(), 0);
    assert_eq!(ac.edges(StateId::ROOT).len(), 16);
}

#[test]
fn hex_signature_lists_build_nibble_automata() {
    let ac = Automaton::from_hex_patterns("0a1b\n\n0a2c\n").unwrap();
    assert_eq!(ac.alphabet(), Alphabet::Nibble);
    assert_eq!(ac.num_patterns(), 2);
    // root, 0, 0a, then 1, 1b, 2, 2c
    assert_eq!(ac.num_states(), 7);
    assert_eq!(ac.num_accepting_states(), 5);
    assert_eq!(ac.pattern(PatternId::from(1u32)), Some(&[0x0, 0xa, 0x2, 0xc].map(Symbol::new)[..]));
}

#[rstest]
#[case::empty_pattern(vec![vec![1], vec![]], AutomatonError::EmptyPattern { pattern: 1 })]
#[case::symbol_out_of_range(
    vec![vec![1, 16, 2]],
    AutomatonError::SymbolOutOfRange { pattern: 0, offset: 1, symbol: 16, bits: 4 }
)]
fn malformed_patterns_are_rejected(
    #[case] patterns: Vec<Vec<u16>>,
    #[case] expected: AutomatonError,
) {
    let patterns = patterns.into_iter().map(|p| p.into_iter().map(Symbol::new).collect::<Vec<_>>());
    assert_eq!(Automaton::new(Alphabet::Nibble, patterns), Err(expected));
}

#[test]
fn bad_signature_lists_surface_decode_errors() {
    let err = Automaton::from_hex_patterns("0a\nxy").unwrap_err();
    crate::assert_matches!(
        err,
        AutomatonError::Decode(DecodeError::InvalidHexDigit { line: 1, .. })
    );
}

// SUBSETS
// ================================================================================================

#[test]
fn depth_zero_subset_is_the_root() {
    let ac = he_she_hers();
    let none = BTreeSet::new();

    assert_eq!(ac.states_by_depth_or_set(0, &none), [ac.digitize_state(StateId::ROOT)]);

    let transitions: Vec<Transition> =
        ac.subset_states(0, &none).flat_map(|st| ac.state_transitions(st)).collect();
    assert_eq!(transitions.len(), 256 + 2);
    assert!(transitions.iter().all(|t| t.src == StateId::ROOT));
    assert!(transitions[..256].iter().all(|t| !t.is_fail));
    assert_eq!(transitions[sym('h').as_usize()].dest, s(1));
    assert_eq!(ac.transitions_by_depth_or_set(0, &none).len(), 258);
}

#[test]
fn include_set_pulls_in_deep_states() {
    let ac = he_she_hers();
    let include = BTreeSet::from([PatternId::from(2u32)]);

    // depth <= 1 gives root, h, s; "hers" created her and hers
    let selected: Vec<StateId> = ac.subset_states(1, &include).collect();
    assert_eq!(selected, [s(0), s(1), s(2), s(4), s(7)]);

    // "sh" is missing most gotos, so its row is mostly fail transitions
    let from_sh: Vec<Transition> = ac.state_transitions(s(3)).collect();
    assert_eq!(from_sh.iter().filter(|t| t.is_fail).count(), 255 + 1);
    assert_eq!(from_sh[256], Transition::filler(s(3), ac.alphabet().term()));
    assert_eq!(from_sh[257], Transition::forward(s(3), ac.alphabet().term(), s(3)));
}

#[test]
fn final_states_are_the_low_ids() {
    let ac = he_she_hers();
    let finals: Vec<u128> = ac.final_states().iter().map(|v| v.as_u128()).collect();
    assert_eq!(finals, [0, 1, 2, 3, 4]);
    assert_eq!(ac.all_states().len(), 8);
    assert_eq!(ac.all_transitions().len(), 8 * 258);
}

#[test]
fn depth_profile_counts() {
    let ac = he_she_hers();
    let include = BTreeSet::from([PatternId::from(2u32)]);
    let profile = ac.depth_profile(3, &include);

    assert_eq!(profile.max_depth(), 3);
    assert_eq!(profile.states_at(2), 2);
    assert_eq!(profile.states_within(1), Some(3));
    assert_eq!(profile.states_within(3), Some(7));
    // within depth 1 plus her and hers
    assert_eq!(profile.subset_size(1), Some(5));
    // within depth 3 plus hers, which sits below the cap
    assert_eq!(profile.subset_size(3), Some(8));
    assert_eq!(profile.states_within(4), None);
}

#[test]
fn unbounded_depth_profile_stops_at_the_deepest_state() {
    let ac = he_she_hers();
    let profile = ac.depth_profile(u32::MAX, &BTreeSet::new());

    assert_eq!(profile.max_depth(), 4);
    assert_eq!(profile.states_at(4), 1);
    assert_eq!(profile.states_within(4), Some(8));
    assert_eq!(profile.subset_size(4), Some(8));
    assert_eq!(profile.states_within(5), None);
}

#[cfg(feature = "serde")]
#[test]
fn automaton_survives_json() {
    let ac = he_she_hers();
    let json = serde_json::to_string(&ac).unwrap();
    let restored: Automaton = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, ac);
}

// PROPERTIES
// ================================================================================================

proptest! {
    #[test]
    fn accepting_states_come_first(patterns in pattern_set()) {
        let ac = Automaton::new(Alphabet::Nibble, &patterns).unwrap();
        prop_assert_eq!(ac.depth(StateId::ROOT), 0);
        for state in ac.states() {
            let accepting = state.as_u32() < ac.num_accepting_states() as u32;
            prop_assert_eq!(ac.outputs(state).is_empty(), accepting);
            prop_assert_eq!(ac.is_accepting(state), accepting);
        }
    }

    #[test]
    fn fail_links_are_shallower(patterns in pattern_set()) {
        let ac = Automaton::new(Alphabet::Nibble, &patterns).unwrap();
        prop_assert_eq!(ac.fail(StateId::ROOT), StateId::ROOT);
        for state in ac.states().skip(1) {
            prop_assert!(ac.depth(ac.fail(state)) < ac.depth(state));
        }
    }

    #[test]
    fn transition_function_is_total(patterns in pattern_set()) {
        let ac = Automaton::new(Alphabet::Nibble, &patterns).unwrap();
        for state in ac.states() {
            let literal_total = state == StateId::ROOT || !ac.is_accepting(state);
            for symbol in ac.alphabet().symbols() {
                let next = ac.delta(state, symbol);
                prop_assert!(ac.contains_state(next));
                if literal_total {
                    prop_assert!(ac.goto(state, symbol).is_some());
                }
            }
        }
    }

    #[test]
    fn delta_finds_every_pattern(patterns in pattern_set(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!patterns.is_empty());
        let ac = Automaton::new(Alphabet::Nibble, &patterns).unwrap();
        let pattern = &patterns[pick.index(patterns.len())];
        let end = pattern.iter().fold(StateId::ROOT, |state, &symbol| ac.delta(state, symbol));
        prop_assert!(!ac.is_accepting(end));
    }
}
