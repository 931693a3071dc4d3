// Unit tests for the similarity engine and phonetic coding.
//
// Tests bounded edit distance against known pairs and its early-exit
// sentinel, similarity ratios, candidate ranking, and the Soundex codes
// used by the phonetic index.

use sentinel::lexicon::soundex;
use sentinel::similarity::{
    damerau_distance, edit_distance, find_similar, similarity, MAX_LEVENSHTEIN_DISTANCE,
    SIMILARITY_THRESHOLD,
};

// ============================================================
// edit_distance
// ============================================================

#[test]
fn kitten_to_sitting_is_three() {
    assert_eq!(edit_distance("kitten", "sitting", 5), 3);
}

#[test]
fn distance_is_symmetric() {
    for (a, b) in [("idiot", "idoit"), ("moron", "morons"), ("", "jerk"), ("abc", "xyz")] {
        assert_eq!(
            edit_distance(a, b, 10),
            edit_distance(b, a, 10),
            "asymmetric for {a:?}/{b:?}"
        );
    }
}

#[test]
fn exceeding_bound_returns_bound_plus_one() {
    assert_eq!(edit_distance("kitten", "sitting", 2), 3);
    assert_eq!(edit_distance("a", "abcdefgh", MAX_LEVENSHTEIN_DISTANCE), 3);
}

#[test]
fn zero_bound_only_accepts_equal_strings() {
    assert_eq!(edit_distance("same", "same", 0), 0);
    assert_eq!(edit_distance("same", "sane", 0), 1);
}

// ============================================================
// similarity / find_similar
// ============================================================

#[test]
fn similarity_in_unit_range() {
    for (a, b) in [("", "abc"), ("a", "b"), ("idiot", "idiot"), ("short", "muchlongerword")] {
        let s = similarity(a, b);
        assert!((0.0..=1.0).contains(&s), "similarity({a:?}, {b:?}) = {s}");
    }
}

#[test]
fn find_similar_respects_threshold() {
    let terms = vec!["idiot".to_string(), "moron".to_string(), "jerk".to_string()];
    assert_eq!(find_similar("idiots", &terms, SIMILARITY_THRESHOLD), vec!["idiot"]);
    assert!(find_similar("banana", &terms, SIMILARITY_THRESHOLD).is_empty());
}

#[test]
fn find_similar_breaks_ties_by_term() {
    let terms = ["cab", "cat", "car"];
    assert_eq!(find_similar("caz", terms, 0.6), vec!["cab", "car", "cat"]);
}

// ============================================================
// damerau_distance
// ============================================================

#[test]
fn transposition_costs_one() {
    assert_eq!(damerau_distance("jrek", "jerk"), 1);
    assert_eq!(damerau_distance("jerk", "jerk"), 0);
}

#[test]
fn damerau_never_exceeds_levenshtein() {
    for (a, b) in [("ca", "abc"), ("moron", "mroon"), ("idiot", "tiodi")] {
        assert!(damerau_distance(a, b) <= edit_distance(a, b, 100));
    }
}

// ============================================================
// soundex
// ============================================================

#[test]
fn robert_and_rupert_share_a_code() {
    assert_eq!(soundex("robert"), "R163");
    assert_eq!(soundex("rupert"), "R163");
}

#[test]
fn soundex_is_case_insensitive() {
    assert_eq!(soundex("ROBERT"), soundex("robert"));
}

#[test]
fn soundex_always_four_chars_when_letters_present() {
    for word in ["a", "jerk", "moron", "pneumonoultramicroscopic"] {
        assert_eq!(soundex(word).len(), 4, "code for {word:?}");
    }
}
