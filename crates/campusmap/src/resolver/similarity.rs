//! String similarity ratios used by fuzzy matching.
//!
//! Both scorers return a value in `[0.0, 1.0]` where 1.0 means identical.
//! Callers are expected to lowercase both strings first.

use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("static pattern compiles"));

/// Strips every non-word character and lowercases.
///
/// ```rust
/// assert_eq!(campusmap::normalize_name("O'Brien Hall"), "obrienhall");
/// ```
#[must_use]
pub fn normalize_name(s: &str) -> String {
    NON_WORD.replace_all(s, "").to_lowercase()
}

/// Which similarity measure the fuzzy stage uses.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScorerKind {
    /// Ratcliff/Obershelp matching blocks. Non-alphanumeric characters in the
    /// candidate are junk: they never anchor a block but can extend one.
    #[default]
    Block,
    /// Indel-normalized similarity (`rapidfuzz`) over [`normalize_name`]d
    /// strings.
    Indel,
}

impl ScorerKind {
    #[must_use]
    pub fn ratio(self, query: &str, candidate: &str) -> f64 {
        match self {
            Self::Block => block_ratio(query, candidate),
            Self::Indel => rapidfuzz::fuzz::ratio(
                normalize_name(query).chars(),
                normalize_name(candidate).chars(),
            ),
        }
    }
}

/// `2 * M / T`, where `M` is the total size of the matching blocks found by
/// recursive longest-common-block search and `T` the combined length.
#[must_use]
pub fn block_ratio(query: &str, candidate: &str) -> f64 {
    let a: Vec<char> = query.chars().collect();
    let b: Vec<char> = candidate.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = BlockMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

fn is_junk(c: char) -> bool {
    !c.is_alphanumeric()
}

/// Candidates at least this long get their most frequent characters
/// treated as junk too.
const AUTOJUNK_MIN_LEN: usize = 200;

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each anchoring character in `b`
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            if !is_junk(c) {
                b2j.entry(c).or_default().push(j);
            }
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let max_count = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= max_count);
        }

        Self { a, b, b2j }
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` within the given ranges,
    /// preferring the earliest start in `a`, then in `b`.
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (a, b) = (self.a, self.b);
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = length of the block ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(c) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Grow over equal non-anchoring (popular) characters, then over junk.
        while besti > alo
            && bestj > blo
            && !is_junk(b[bestj - 1])
            && a[besti - 1] == b[bestj - 1]
        {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && !is_junk(b[bestj + bestsize])
            && a[besti + bestsize] == b[bestj + bestsize]
        {
            bestsize += 1;
        }
        while besti > alo && bestj > blo && is_junk(b[bestj - 1]) && a[besti - 1] == b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && is_junk(b[bestj + bestsize])
            && a[besti + bestsize] == b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Total size of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_strings_score_one() {
        assert!(approx(block_ratio("library", "library"), 1.0));
        assert!(approx(block_ratio("", ""), 1.0));
    }

    #[test]
    fn test_disjoint_strings_score_zero() {
        assert!(approx(block_ratio("abc", "xyz"), 0.0));
        assert!(approx(block_ratio("abc", ""), 0.0));
    }

    #[test]
    fn test_prefix_ratio() {
        // 2 * 7 / (7 + 13)
        assert!(approx(block_ratio("library", "library annex"), 0.7));
    }

    #[test]
    fn test_overlapping_blocks() {
        // "bcd" is the only block
        assert!(approx(block_ratio("abcd", "bcde"), 0.75));
    }

    #[test]
    fn test_punctuation_does_not_break_blocks() {
        // "brien" anchors, the space joins it, "o" and "hall" match on either side
        let ratio = block_ratio("obrien hall", "o'brien hall");
        assert!(approx(ratio, 22.0 / 23.0), "got {ratio}");
    }

    #[test]
    fn test_junk_never_anchors() {
        // Only spaces in common, and spaces in the candidate are junk
        assert!(approx(block_ratio("a b", "x y"), 0.0));
    }

    #[test]
    fn test_long_candidates_still_match() {
        let candidate = "e".repeat(250);
        let ratio = block_ratio("eee", &candidate);
        assert!((0.0..=1.0).contains(&ratio));
    }

    #[test]
    fn test_indel_scorer_ignores_punctuation_and_spacing() {
        let ratio = ScorerKind::Indel.ratio("obrien hall", "o'brien hall");
        assert!(approx(ratio, 1.0), "got {ratio}");
        let ratio = ScorerKind::Indel.ratio("library", "library annex");
        assert!(ratio > 0.7 && ratio < 0.8, "got {ratio}");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Eng. Bldg."), "engbldg");
        assert_eq!(normalize_name("  Student  Union "), "studentunion");
        assert_eq!(normalize_name(""), "");
    }
}
