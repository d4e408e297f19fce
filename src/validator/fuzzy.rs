//! Fuzzy name matching for repair suggestions

/// Minimum normalized similarity for a candidate to be considered
pub const MIN_SIMILARITY: f64 = 0.6;

/// How many candidates a match request keeps
pub const MAX_CANDIDATES: usize = 3;

/// Normalized similarity between two names: 1.0 for equal strings, 0.0
/// for entirely different ones. Case-insensitive.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - (levenshtein_distance(&a, &b) as f64) / (longest as f64)
}

/// The best candidates for a target name: similarity >= `MIN_SIMILARITY`,
/// at most `MAX_CANDIDATES`, best first
pub fn best_matches<'a, I>(target: &str, candidates: I) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(&str, f64)> = candidates
        .into_iter()
        .map(|c| (c, similarity(target, c)))
        .filter(|(_, score)| *score >= MIN_SIMILARITY)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_CANDIDATES);
    scored
}

/// Simple Levenshtein distance implementation
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut dp = vec![vec![0; n + 1]; m + 1];

    for (i, row) in dp.iter_mut().enumerate().take(m + 1) {
        row[0] = i;
    }
    for (j, val) in dp[0].iter_mut().enumerate() {
        *val = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}
