// Similarity engine — bounded edit distance and candidate ranking.
//
// All distances count Unicode scalar values, not bytes.

use crate::models::clamp_unit;

/// Largest edit distance accepted as a confirmed near-match.
pub const MAX_LEVENSHTEIN_DISTANCE: usize = 2;

/// Minimum similarity for a term to be a candidate.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Distance bound used when computing similarity ratios.
pub const SIMILARITY_BOUND: usize = 3;

/// Cap on ranked candidates.
pub const MAX_SIMILAR: usize = 10;

/// Levenshtein distance between `a` and `b`, giving up past `max`.
///
/// Returns `max + 1` as soon as the distance is known to exceed `max`:
/// when the lengths differ by more than `max`, or when every cell of a
/// DP row does. Results never exceed `max + 1`.
pub fn edit_distance(a: &str, b: &str, max: usize) -> usize {
    if a == b {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let over = max.saturating_add(1);

    if a.len().abs_diff(b.len()) > max {
        return over;
    }
    if a.is_empty() {
        return b.len().min(over);
    }
    if b.is_empty() {
        return a.len().min(over);
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max {
            return over;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()].min(over)
}

/// `1 - d / max(len)`, with `d` computed at [`SIMILARITY_BOUND`].
/// Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let distance = edit_distance(a, b, SIMILARITY_BOUND);
    clamp_unit(1.0 - distance as f64 / longest as f64)
}

/// Terms at least `threshold` similar to `token`, with their scores.
/// Most similar first, ties broken by term, at most [`MAX_SIMILAR`].
pub fn rank_similar<S: AsRef<str>>(
    token: &str,
    terms: impl IntoIterator<Item = S>,
    threshold: f64,
) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = terms
        .into_iter()
        .filter_map(|term| {
            let term = term.as_ref();
            let score = similarity(token, term);
            (score >= threshold).then(|| (term.to_string(), score))
        })
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(MAX_SIMILAR);
    ranked
}

/// Terms at least `threshold` similar to `token`, most similar first.
pub fn find_similar<S: AsRef<str>>(
    token: &str,
    terms: impl IntoIterator<Item = S>,
    threshold: f64,
) -> Vec<String> {
    rank_similar(token, terms, threshold)
        .into_iter()
        .map(|(term, _)| term)
        .collect()
}

/// Optimal string alignment distance: Levenshtein plus adjacent
/// transpositions at cost 1. Unbounded.
pub fn damerau_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());
    if n == 0 {
        return m;
    }
    if m == 0 {
        return n;
    }

    let mut d = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        d[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[i - 1][j] + 1)
                .min(d[i][j - 1] + 1)
                .min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[i - 2][j - 2] + 1);
            }
            d[i][j] = best;
        }
    }
    d[n][m]
}
