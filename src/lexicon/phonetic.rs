// Phonetic coding and the code -> terms index.
//
// Codes follow Soundex: keep the first letter, map the remaining consonants
// to six digit classes, skip vowels and h/w/y, drop a digit equal to the
// previous one, and pad or cut to four characters. Vowels do not reset the
// previous digit, so "tadat" codes as T300 rather than T330.

use std::collections::BTreeSet;

use dashmap::DashMap;

const CODE_LEN: usize = 4;

fn digit_class(c: char) -> Option<char> {
    match c {
        'b' | 'f' | 'p' | 'v' => Some('1'),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
        'd' | 't' => Some('3'),
        'l' => Some('4'),
        'm' | 'n' => Some('5'),
        'r' => Some('6'),
        _ => None,
    }
}

/// Compute the Soundex-style code of `input`.
///
/// Non-letters are ignored. Input without any ASCII letter codes as "".
pub fn soundex(input: &str) -> String {
    let letters: Vec<char> = input
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let Some(&first) = letters.first() else {
        return String::new();
    };

    let mut code = String::with_capacity(CODE_LEN);
    code.push(first.to_ascii_uppercase());

    let mut prev = '0';
    for &c in &letters[1..] {
        if code.len() >= CODE_LEN {
            break;
        }
        if let Some(digit) = digit_class(c) {
            if digit != prev {
                code.push(digit);
                prev = digit;
            }
        }
    }

    while code.len() < CODE_LEN {
        code.push('0');
    }
    code
}

/// Phonetic code -> set of terms sharing that code.
#[derive(Default)]
pub struct PhoneticIndex {
    groups: DashMap<String, BTreeSet<String>>,
}

impl PhoneticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `term` under `code`. Empty codes are not indexed.
    pub fn insert(&self, code: &str, term: &str) {
        if code.is_empty() {
            return;
        }
        self.groups
            .entry(code.to_string())
            .or_default()
            .insert(term.to_string());
    }

    /// Terms sharing `code`, in lexicographic order.
    pub fn group(&self, code: &str) -> Vec<String> {
        self.groups
            .get(code)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
