//! The match engine: Bitap (shift-or) fuzzy search, scored by a blend of
//! edit distance and distance from the expected location.

use std::collections::HashMap;

use crate::errors::Error;
use crate::util;

/// The fuzzy-match engine. Like the other engines, configuration is
/// per-instance and read-only during a call.
#[derive(Debug, Clone)]
pub struct Matcher {
    /// Score at which a match is rejected (0.0 = perfection, 1.0 = very
    /// loose).
    threshold: f32,
    /// Distance in chars at which a perfect hit scores a full 1.0 penalty.
    /// 0 accepts exact-location matches only.
    distance: usize,
    /// Longest searchable pattern. Bounded by the bit width of the rows.
    max_bits: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            distance: 1000,
            max_bits: 32,
        }
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Cut-off score for a valid match. Closer to 0 demands accuracy,
    /// closer to 1 accepts looser matches. Defaults to 0.5.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    /// How far from the expected location a match may stray. A hit this
    /// many chars away adds 1.0 to its score. Defaults to 1000.
    pub fn set_distance(&mut self, distance: usize) {
        self.distance = distance;
    }

    pub fn max_bits(&self) -> usize {
        self.max_bits
    }

    /// Upper bound on pattern length. Values above 64 are clamped to the
    /// row word width. Defaults to 32.
    pub fn set_max_bits(&mut self, max_bits: usize) {
        self.max_bits = max_bits.min(64);
    }

    /// Locate `pattern` in `text` near `loc`. Returns the best matching
    /// index, or `None` when nothing scores under the threshold.
    pub fn main(&self, text: &str, pattern: &str, loc: usize) -> Result<Option<usize>, Error> {
        let text: Vec<char> = text.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();
        self.find(&text, &pattern, loc)
    }

    pub(crate) fn find(
        &self,
        text: &[char],
        pattern: &[char],
        loc: usize,
    ) -> Result<Option<usize>, Error> {
        let loc = loc.min(text.len());

        if text == pattern {
            // Shortcut (potentially not guaranteed by the algorithm).
            return Ok(Some(0));
        }
        if text.is_empty() {
            return Ok(None);
        }
        if text[loc..(loc + pattern.len()).min(text.len())] == *pattern {
            // Perfect match at the perfect spot (includes an empty pattern).
            return Ok(Some(loc));
        }
        self.bitap_chars(text, pattern, loc)
    }

    /// Bit-parallel fuzzy search. Fails with `PatternTooLong` when the
    /// pattern exceeds `max_bits`.
    pub fn bitap(&self, text: &str, pattern: &str, loc: usize) -> Result<Option<usize>, Error> {
        let text: Vec<char> = text.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();
        self.bitap_chars(&text, &pattern, loc)
    }

    pub(crate) fn bitap_chars(
        &self,
        text: &[char],
        pattern: &[char],
        loc: usize,
    ) -> Result<Option<usize>, Error> {
        if pattern.is_empty() {
            return Ok(Some(loc.min(text.len())));
        }
        if pattern.len() > self.max_bits {
            return Err(Error::PatternTooLong {
                len: pattern.len(),
                max: self.max_bits,
            });
        }

        let alphabet = alphabet_masks(pattern);

        // Highest score below which we keep looking.
        let mut score_threshold = self.threshold;

        // Is there an exact occurrence nearby? (speedup)
        if let Some(best) = util::index_of(&text[loc..], pattern).map(|i| i + loc) {
            score_threshold = self.score(pattern.len(), 0, loc, best).min(score_threshold);
            // And looking backwards from just past the expected end.
            let window = (loc + 2 * pattern.len()).min(text.len());
            if let Some(best) = util::rindex_of(&text[..window], pattern) {
                score_threshold = self.score(pattern.len(), 0, loc, best).min(score_threshold);
            }
        }

        let match_mask: u64 = 1 << (pattern.len() - 1);
        let mut best_loc = None;

        let mut bin_max = pattern.len() + text.len();
        let mut last_rd: Vec<u64> = Vec::new();

        for d in 0..pattern.len() {
            // How far from `loc` can a match sit at this error level and
            // still beat the threshold? Binary search the boundary.
            let mut bin_min = 0;
            let mut bin_mid = bin_max;
            while bin_min < bin_mid {
                if self.score(pattern.len(), d, loc, loc + bin_mid) <= score_threshold {
                    bin_min = bin_mid;
                } else {
                    bin_max = bin_mid;
                }
                bin_mid = (bin_max - bin_min) / 2 + bin_min;
            }
            // Use the result from this iteration as the maximum for the next.
            bin_max = bin_mid;

            let mut start = if loc > bin_mid { loc - bin_mid + 1 } else { 1 };
            let finish = (loc + bin_mid).min(text.len()) + pattern.len();

            let mut rd = vec![0u64; finish + 2];
            rd[finish + 1] = low_ones(d);

            let mut j = finish;
            while j >= start {
                let char_match = if j <= text.len() {
                    alphabet.get(&text[j - 1]).copied().unwrap_or(0)
                } else {
                    // Out of range.
                    0
                };

                rd[j] = if d == 0 {
                    // First pass: exact match only.
                    ((rd[j + 1] << 1) | 1) & char_match
                } else {
                    // Subsequent passes: fuzzy match.
                    (((rd[j + 1] << 1) | 1) & char_match)
                        | (((last_rd[j + 1] | last_rd[j]) << 1) | 1)
                        | last_rd[j + 1]
                };

                if rd[j] & match_mask != 0 {
                    let score = self.score(pattern.len(), d, loc, j - 1);
                    // This match will almost certainly be better than any
                    // existing match, but check anyway.
                    if score <= score_threshold {
                        score_threshold = score;
                        best_loc = Some(j - 1);
                        if j - 1 > loc {
                            // When passing loc, don't exceed our current
                            // distance from it.
                            start = 1.max((2 * loc).saturating_sub(j - 1));
                        } else {
                            // Already past loc; downhill from here on in.
                            break;
                        }
                    }
                }
                j -= 1;
            }

            // No hope of a better match at higher error levels.
            if self.score(pattern.len(), d + 1, loc, loc) > score_threshold {
                break;
            }
            last_rd = rd;
        }

        Ok(best_loc)
    }

    /// Bitmask per pattern char: bit `1 << (len - 1 - i)` marks position `i`.
    pub fn alphabet(pattern: &str) -> HashMap<char, u64> {
        let pattern: Vec<char> = pattern.chars().collect();
        alphabet_masks(&pattern)
    }

    // Score a match with `errors` errors found at `x`, relative to the
    // expected location.
    fn score(&self, pattern_len: usize, errors: usize, loc: usize, x: usize) -> f32 {
        let accuracy = errors as f32 / pattern_len as f32;
        let proximity = loc.abs_diff(x);
        if self.distance == 0 {
            // Dodge divide by zero: only an exact location is acceptable.
            return if proximity == 0 { accuracy } else { 1.0 };
        }
        accuracy + proximity as f32 / self.distance as f32
    }
}

fn alphabet_masks(pattern: &[char]) -> HashMap<char, u64> {
    let mut masks = HashMap::with_capacity(pattern.len());
    for (i, &c) in pattern.iter().enumerate() {
        *masks.entry(c).or_insert(0) |= 1 << (pattern.len() - i - 1);
    }
    masks
}

// (1 << d) - 1 without shifting the word away at d >= 64.
fn low_ones(d: usize) -> u64 {
    if d < 64 {
        (1 << d) - 1
    } else {
        u64::MAX
    }
}
