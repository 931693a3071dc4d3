// Obfuscation resolver — undoes deliberate evasion of literal matching.
//
// Handles separator insertion ("f.u.c.k"), stretched letters, leetspeak
// digits, look-alike Unicode letters, and alternating filler characters
// ("fxuxcxk"). The obfuscation score measures how heavily a token was
// disguised and is used to discount matches found only after cleanup.

use std::collections::BTreeSet;

use crate::normalizer::{collapse_repeats, strip_marks};

/// Punctuation commonly inserted between letters.
const SEPARATORS: &[char] = &[
    '.', '-', '_', '*', '~', '`', '^', '|', '\\', '/', '+', '=', '!', '@', '#', '$', '%', '&',
    '(', ')', '[', ']', '{', '}', '<', '>', '?', ':', ';', '"', '\'', ',', ' ',
];

/// Digits standing in for letters.
const LEET_DIGITS: &[(char, char)] = &[
    ('0', 'o'),
    ('1', 'i'),
    ('3', 'e'),
    ('4', 'a'),
    ('5', 's'),
    ('7', 't'),
    ('8', 'b'),
];

/// Letters rewritten when generating leetspeak variants. Digits only, so
/// every generated variant survives separator removal.
const LEET_LETTERS: &[(char, char)] = &[
    ('a', '4'),
    ('e', '3'),
    ('i', '1'),
    ('o', '0'),
    ('s', '5'),
    ('t', '7'),
];

/// Separators used when generating spaced-out variants.
const VARIANT_SEPARATORS: [char; 4] = ['.', '-', '*', '_'];

/// Runs are shortened to this length during cleanup.
const REPEAT_LIMIT: usize = 2;

/// Shortest string accepted as an interleave reconstruction.
const MIN_INTERLEAVE_LEN: usize = 3;

pub fn is_separator(c: char) -> bool {
    SEPARATORS.contains(&c)
}

/// Strip separators, shorten runs, map leetspeak digits, and drop
/// non-ASCII look-alikes.
pub fn deobfuscate(token: &str) -> String {
    let without_separators: String = token
        .to_lowercase()
        .chars()
        .filter(|c| !is_separator(*c))
        .collect();

    let collapsed = collapse_repeats(&without_separators, REPEAT_LIMIT);

    let de_leeted: String = collapsed
        .chars()
        .map(|c| {
            LEET_DIGITS
                .iter()
                .find(|(digit, _)| *digit == c)
                .map_or(c, |(_, letter)| *letter)
        })
        .collect();

    strip_marks(&de_leeted)
        .chars()
        .filter(char::is_ascii)
        .collect()
}

/// Recover a word hidden by alternating filler characters.
///
/// Takes the characters at even positions when that sequence is strictly
/// longer than the odd-position sequence, at least three characters long,
/// and the dropped odd-position characters look like filler: one repeated
/// character or no letters at all. "fxuxcxk" yields "fuck"; "twist" and
/// even-length input never qualify.
pub fn interleave_candidate(token: &str) -> Option<String> {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < MIN_INTERLEAVE_LEN {
        return None;
    }
    let odd_len = chars.len() / 2;
    let even_len = chars.len() - odd_len;
    if even_len <= odd_len || even_len < MIN_INTERLEAVE_LEN {
        return None;
    }

    let dropped: Vec<char> = chars.iter().skip(1).step_by(2).copied().collect();
    let single_filler = dropped.windows(2).all(|w| w[0] == w[1]);
    let no_letters = dropped.iter().all(|c| !c.is_alphabetic());
    if !single_filler && !no_letters {
        return None;
    }
    Some(chars.iter().step_by(2).collect())
}

/// Cleanup candidates for a token, most literal first: the deobfuscated
/// string, then its interleave reconstruction. Empty and duplicate
/// candidates are skipped.
pub fn candidates(token: &str) -> Vec<String> {
    let cleaned = deobfuscate(token);
    let mut out = Vec::with_capacity(2);
    if let Some(interleaved) = interleave_candidate(&cleaned) {
        if !cleaned.is_empty() {
            out.push(cleaned.clone());
        }
        if interleaved != cleaned {
            out.push(interleaved);
        }
    } else if !cleaned.is_empty() {
        out.push(cleaned);
    }
    out
}

/// How heavily `original` was disguised relative to `deobfuscated`.
///
/// Average of separator density, adjacent-repeat density and length
/// reduction, each bounded to [0, 1]. Identical strings score 0.
pub fn obfuscation_score(original: &str, deobfuscated: &str) -> f64 {
    if original == deobfuscated || original.is_empty() {
        return 0.0;
    }

    let chars: Vec<char> = original.chars().collect();
    let n = chars.len() as f64;

    let separators = chars.iter().filter(|c| is_separator(**c)).count() as f64;
    let separator_density = (separators / n).min(1.0);

    let repeats = chars.windows(2).filter(|w| w[0] == w[1]).count() as f64;
    let repeat_density = (repeats / n).min(1.0);

    let length_ratio = deobfuscated.chars().count() as f64 / n;
    let length_reduction = (1.0 - length_ratio).clamp(0.0, 1.0);

    ((separator_density + repeat_density + length_reduction) / 3.0).clamp(0.0, 1.0)
}

/// Generate the disguised spellings of `term` that the resolver is
/// expected to undo: separator-spaced, letter-doubled and leetspeak forms.
pub fn variants(term: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    if term.is_empty() {
        return out;
    }
    out.insert(term.to_string());

    let chars: Vec<char> = term.chars().collect();
    for sep in VARIANT_SEPARATORS {
        let spaced: String = chars
            .iter()
            .enumerate()
            .flat_map(|(i, c)| {
                let tail = (i + 1 < chars.len()).then_some(sep);
                std::iter::once(*c).chain(tail)
            })
            .collect();
        out.insert(spaced);
    }

    let doubled: String = chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            let extra = (i % 2 == 0).then_some(*c);
            std::iter::once(*c).chain(extra)
        })
        .collect();
    out.insert(doubled);

    let leet: String = chars
        .iter()
        .map(|c| {
            LEET_LETTERS
                .iter()
                .find(|(letter, _)| letter == c)
                .map_or(*c, |(_, sym)| *sym)
        })
        .collect();
    out.insert(leet);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deobfuscate_separators() {
        assert_eq!(deobfuscate("f.u.c.k"), "fuck");
        assert_eq!(deobfuscate("s-h-i-t"), "shit");
        assert_eq!(deobfuscate("b i t c h"), "bitch");
    }

    #[test]
    fn test_deobfuscate_repeats_and_leet() {
        assert_eq!(deobfuscate("stuuuupid"), "stuupid");
        assert_eq!(deobfuscate("1d10t"), "idiot");
        assert_eq!(deobfuscate("Crétin"), "cretin");
    }

    #[test]
    fn test_deobfuscate_drops_non_ascii() {
        assert_eq!(deobfuscate("idiøt"), "idit");
    }

    #[test]
    fn test_interleave_candidate() {
        assert_eq!(interleave_candidate("fxuxcxk").as_deref(), Some("fuck"));
        assert_eq!(interleave_candidate("abcd"), None);
        assert_eq!(interleave_candidate("ab"), None);
        // "ac" is longer than "b" but too short to be a word
        assert_eq!(interleave_candidate("abc"), None);
    }

    #[test]
    fn test_interleave_requires_filler() {
        assert_eq!(interleave_candidate("twist"), None);
        assert_eq!(interleave_candidate("grandest"), None);
        assert_eq!(interleave_candidate("f1u2c3k").as_deref(), Some("fuck"));
        assert_eq!(candidates("twist"), vec!["twist"]);
    }

    #[test]
    fn test_candidates_order() {
        assert_eq!(candidates("f-x-u-x-c-x-k"), vec!["fxuxcxk", "fuck"]);
        assert_eq!(candidates("s.h.i.t"), vec!["shit"]);
        assert!(candidates("...").is_empty());
    }

    #[test]
    fn test_score_zero_for_identical() {
        assert_eq!(obfuscation_score("idiot", "idiot"), 0.0);
        assert_eq!(obfuscation_score("", "x"), 0.0);
    }

    #[test]
    fn test_score_separator_heavy() {
        // 3 separators in 7 chars, no repeats, 4/7 length retained
        let score = obfuscation_score("f.u.c.k", "fuck");
        let expected = (3.0 / 7.0 + 0.0 + 3.0 / 7.0) / 3.0;
        assert!((score - expected).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_score_bounded() {
        let score = obfuscation_score("!!!!!!!!", "i");
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_variants_cover_each_family() {
        let v = variants("test");
        assert!(v.contains("test"));
        assert!(v.contains("t.e.s.t"));
        assert!(v.contains("t_e_s_t"));
        assert!(v.contains("ttesst"));
        assert!(v.contains("7357"));
    }

    #[test]
    fn test_spaced_and_leet_variants_resolve_back() {
        let all = variants("idiot");
        for variant in ["i.d.i.o.t", "i-d-i-o-t", "i*d*i*o*t", "i_d_i_o_t", "1d107"] {
            assert!(all.contains(variant), "missing variant {variant}");
            assert_eq!(deobfuscate(variant), "idiot", "{variant} did not resolve");
        }
    }
}
