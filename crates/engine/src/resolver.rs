use std::collections::BTreeSet;

use rapidfuzz::fuzz;

use crate::model::{Addressed, Candidate, MatchOptions};

/// Reduce an address to its comparable form.
///
/// Non-ASCII characters are dropped, anything that is not alphanumeric or `_`
/// becomes a separator, tokens are lowercased and sorted so that token order
/// does not affect the score.
pub fn normalize(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(char::is_ascii)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-order-insensitive similarity of two raw strings, in [0, 100].
///
/// The score is the share of characters the two normalized forms have in
/// common, `2 * matches / (len(a) + len(b))`, so an abbreviated street type
/// costs only the characters it drops.
pub fn similarity(a: &str, b: &str) -> u8 {
    score_normalized(&normalize(a), &normalize(b))
}

fn score_normalized(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    (fuzz::ratio(a.chars(), b.chars()) * 100.0).round() as u8
}

/// Rank the distinct values of a dataset's address column against `query`.
pub fn resolve<R: Addressed>(query: &str, dataset: &[R], options: &MatchOptions) -> Vec<Candidate> {
    resolve_addresses(query, dataset.iter().map(Addressed::address), options)
}

/// Rank distinct, non-blank `addresses` against `query`.
///
/// Candidates scoring below `options.threshold` are discarded. The rest are
/// ordered by descending score; equal scores keep ascending lexicographic
/// order of the raw address. At most `options.limit` candidates are returned.
/// An empty result means "no match", not an error.
pub fn resolve_addresses<'a, I>(query: &str, addresses: I, options: &MatchOptions) -> Vec<Candidate>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = normalize(&query.to_uppercase());
    if needle.is_empty() {
        tracing::debug!(query, "query normalizes to empty string; nothing to resolve");
        return Vec::new();
    }

    let distinct: BTreeSet<&str> = addresses
        .into_iter()
        .filter(|a| !a.trim().is_empty())
        .collect();
    let scanned = distinct.len();

    let mut candidates: Vec<Candidate> = distinct
        .into_iter()
        .filter_map(|address| {
            let score = score_normalized(&needle, &normalize(address));
            (score >= options.threshold).then(|| Candidate {
                address: address.to_string(),
                score,
            })
        })
        .collect();

    // Stable: ties stay in BTreeSet (lexicographic) order
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(options.limit);

    tracing::debug!(
        query,
        scanned,
        kept = candidates.len(),
        threshold = options.threshold,
        "resolved address candidates"
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(threshold: u8) -> MatchOptions {
        MatchOptions { threshold, ..MatchOptions::default() }
    }

    #[test]
    fn normalize_sorts_tokens_and_strips_punctuation() {
        assert_eq!(normalize("  123 Main St., Unit #4 "), "123 4 main st unit");
        assert_eq!(normalize("MAIN ST 123"), normalize("123 main st"));
        assert_eq!(normalize("Café 1"), "1 caf");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn identical_addresses_score_100() {
        assert_eq!(similarity("123 MAIN STREET", "123 main street"), 100);
        assert_eq!(similarity("STREET MAIN 123", "123 main street"), 100);
    }

    #[test]
    fn abbreviation_clears_default_threshold() {
        // "123 main st" vs "123 main street": 11 shared chars over 11 + 15
        assert_eq!(similarity("123 Main St", "123 MAIN STREET"), 85);
    }

    #[test]
    fn abbreviated_street_and_direction_resolve() {
        assert_eq!(similarity("100 Queen St W", "100 QUEEN STREET WEST"), 80);

        let got = resolve_addresses("100 Queen St W", ["100 QUEEN STREET WEST"], &MatchOptions::default());
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].address, "100 QUEEN STREET WEST");
        assert_eq!(got[0].score, 80);
    }

    #[test]
    fn empty_side_scores_zero() {
        assert_eq!(similarity("", "123 MAIN STREET"), 0);
        assert_eq!(similarity("123 MAIN STREET", "--"), 0);
    }

    #[test]
    fn resolve_ranks_by_score() {
        let addrs = ["123 MAIN STREET", "123 MAIN ST", "999 QUEEN ST E"];
        let got = resolve_addresses("123 main st", addrs, &opts(70));
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].address, "123 MAIN ST");
        assert_eq!(got[0].score, 100);
        assert_eq!(got[1].address, "123 MAIN STREET");
    }

    #[test]
    fn resolve_dedups_and_skips_blank() {
        let addrs = ["1 KING ST W", "1 KING ST W", "", "   "];
        let got = resolve_addresses("1 king st w", addrs, &opts(70));
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn ties_break_lexicographically() {
        // Same tokens, different raw spelling: both normalize identically
        let addrs = ["5 ELM AVE", "5 Elm Ave", "5 elm ave"];
        let got = resolve_addresses("5 elm ave", addrs, &opts(70));
        let order: Vec<&str> = got.iter().map(|c| c.address.as_str()).collect();
        assert_eq!(order, vec!["5 ELM AVE", "5 Elm Ave", "5 elm ave"]);
    }

    #[test]
    fn limit_truncates_candidates() {
        let addrs = ["10 BAY ST", "11 BAY ST", "12 BAY ST", "13 BAY ST", "14 BAY ST", "15 BAY ST"];
        let got = resolve_addresses("10 bay st", addrs, &MatchOptions { threshold: 0, limit: 3 });
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].address, "10 BAY ST");
    }

    #[test]
    fn threshold_is_inclusive() {
        let got = resolve_addresses("123 Main St", ["123 MAIN STREET"], &opts(85));
        assert_eq!(got.len(), 1);
        let got = resolve_addresses("123 Main St", ["123 MAIN STREET"], &opts(86));
        assert!(got.is_empty());
    }

    #[test]
    fn blank_or_symbol_query_resolves_nothing() {
        assert!(resolve_addresses("   ", ["1 KING ST W"], &opts(0)).is_empty());
        assert!(resolve_addresses("#!?", ["1 KING ST W"], &opts(0)).is_empty());
    }

    #[test]
    fn unrelated_query_has_no_candidates() {
        let got = resolve_addresses("999 Nonexistent Ave", ["123 MAIN STREET", "1 KING ST W"], &opts(70));
        assert!(got.is_empty());
    }
}
