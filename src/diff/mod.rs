//! The diff engine: Myers bisection plus the cleanup passes that turn a raw
//! edit script into something a human (or the patch engine) wants to read.

mod bisect;
mod cleanup;
mod delta;
mod html;
mod lines;

pub(crate) use delta::{decode_text, encode_text};

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::util;

/// The three kinds of edit operation.
///
/// The discriminants match the wire convention used by every port of this
/// algorithm family: -1 delete, 0 equal, 1 insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum Op {
    Delete = -1,
    Equal = 0,
    Insert = 1,
}

/// One tuple of an edit script: an operation and the text span it covers.
///
/// Offsets and lengths throughout the crate count Unicode scalar values, not
/// bytes. Serializes as an `(op, text)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Op, String)", into = "(Op, String)")]
pub struct Diff {
    pub(crate) op: Op,
    pub(crate) text: Vec<char>,
}

impl Diff {
    pub fn new(op: Op, text: &str) -> Self {
        Self {
            op,
            text: text.chars().collect(),
        }
    }

    pub fn delete(text: &str) -> Self {
        Self::new(Op::Delete, text)
    }

    pub fn insert(text: &str) -> Self {
        Self::new(Op::Insert, text)
    }

    pub fn equal(text: &str) -> Self {
        Self::new(Op::Equal, text)
    }

    pub(crate) fn raw(op: Op, text: &[char]) -> Self {
        Self {
            op,
            text: text.to_vec(),
        }
    }

    pub fn op(&self) -> Op {
        self.op
    }

    /// The covered span as scalar values.
    pub fn chars(&self) -> &[char] {
        &self.text
    }

    /// Length of the covered span in scalar values.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub(crate) fn extend(&mut self, tail: &[char]) {
        self.text.extend_from_slice(tail);
    }
}

impl From<(Op, String)> for Diff {
    fn from((op, text): (Op, String)) -> Self {
        Self::new(op, &text)
    }
}

impl From<Diff> for (Op, String) {
    fn from(diff: Diff) -> Self {
        (diff.op, diff.text())
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {})", self.op, self.text())
    }
}

/// The diff engine. Holds the knobs that shape a computed script; all state
/// is per-instance, so independent instances may be used from independent
/// threads.
#[derive(Debug, Clone)]
pub struct Differ {
    /// Run a line-level pre-pass on large inputs. Faster, slightly less
    /// optimal output.
    checklines: bool,
    /// Milliseconds before bisect gives up and returns a coarse script.
    /// `None` means unlimited time.
    timeout: Option<u32>,
    /// Cost of an empty edit operation in terms of edit characters.
    edit_cost: usize,
}

impl Default for Differ {
    fn default() -> Self {
        Self {
            checklines: true,
            timeout: Some(1000),
            edit_cost: 4,
        }
    }
}

impl Differ {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checklines(&self) -> bool {
        self.checklines
    }

    /// Enable or disable the line-level speedup for texts over 100 chars a
    /// side. Defaults to `true`.
    pub fn set_checklines(&mut self, checklines: bool) {
        self.checklines = checklines;
    }

    pub fn timeout(&self) -> Option<u32> {
        self.timeout
    }

    /// Bound the time spent computing a single diff, in milliseconds.
    /// `None` removes the bound; an unbounded diff is always minimal but may
    /// be slow on pathological inputs. Defaults to 1000.
    pub fn set_timeout(&mut self, timeout: Option<u32>) {
        self.timeout = timeout;
    }

    pub(crate) fn edit_cost(&self) -> usize {
        self.edit_cost
    }

    /// Characters an edit boundary is worth when merging small edits for
    /// machine consumption. Defaults to 4.
    pub fn set_edit_cost(&mut self, edit_cost: usize) {
        self.edit_cost = edit_cost;
    }

    /// The absolute wall-clock instant at which the current diff should bail
    /// out, derived from the configured timeout.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.timeout
            .and_then(|ms| Utc::now().checked_add_signed(TimeDelta::milliseconds(ms as i64)))
    }

    /// Compute the edit script turning `text1` into `text2`.
    ///
    /// Equal inputs yield a single equality (or nothing when both are
    /// empty). The result is merged into canonical form: no empty tuples, no
    /// adjacent tuples with the same operation, deletions before insertions.
    pub fn main(&self, text1: &str, text2: &str) -> Vec<Diff> {
        let old: Vec<char> = text1.chars().collect();
        let new: Vec<char> = text2.chars().collect();
        self.diff_chars(&old, &new, self.checklines, self.deadline())
    }

    pub(crate) fn diff_chars(
        &self,
        old: &[char],
        new: &[char],
        checklines: bool,
        deadline: Option<DateTime<Utc>>,
    ) -> Vec<Diff> {
        if old == new {
            if old.is_empty() {
                return Vec::new();
            }
            return vec![Diff::raw(Op::Equal, old)];
        }

        let prefix = common_prefix(old, new);
        let suffix = common_suffix(&old[prefix..], &new[prefix..]);

        let mut diffs = self.compute(
            &old[prefix..old.len() - suffix],
            &new[prefix..new.len() - suffix],
            checklines,
            deadline,
        );

        if prefix > 0 {
            diffs.insert(0, Diff::raw(Op::Equal, &old[..prefix]));
        }
        if suffix > 0 {
            diffs.push(Diff::raw(Op::Equal, &new[new.len() - suffix..]));
        }
        cleanup::merge(&mut diffs);

        diffs
    }

    // The prefix/suffix-stripped middle. Tries each shortcut in order of
    // cheapness before falling back to the full bisection.
    fn compute(
        &self,
        old: &[char],
        new: &[char],
        checklines: bool,
        deadline: Option<DateTime<Utc>>,
    ) -> Vec<Diff> {
        if old.is_empty() {
            return vec![Diff::raw(Op::Insert, new)];
        }
        if new.is_empty() {
            return vec![Diff::raw(Op::Delete, old)];
        }

        let (long, short, deleted) = if old.len() > new.len() {
            (old, new, true)
        } else {
            (new, old, false)
        };

        if let Some(at) = util::index_of(long, short) {
            // Shorter text sits inside the longer one.
            let op = if deleted { Op::Delete } else { Op::Insert };
            return vec![
                Diff::raw(op, &long[..at]),
                Diff::raw(Op::Equal, short),
                Diff::raw(op, &long[at + short.len()..]),
            ];
        }

        if short.len() == 1 {
            // Single char, and after the check above it matches nothing.
            return vec![Diff::raw(Op::Delete, old), Diff::raw(Op::Insert, new)];
        }

        if let Some(half) = self.half_match_chars(old, new) {
            let mut diffs = self.diff_chars(half.old_a, half.new_a, checklines, deadline);
            diffs.push(Diff::raw(Op::Equal, half.common));
            diffs.extend(self.diff_chars(half.old_b, half.new_b, checklines, deadline));
            return diffs;
        }

        if checklines && old.len() > 100 && new.len() > 100 {
            return self.line_mode(old, new, deadline);
        }

        self.bisect_chars(old, new, deadline)
    }

    // Line-level diff first, then rediff the replacement blocks char by
    // char. Fast on texts with many lines, can produce non-minimal output.
    fn line_mode(
        &self,
        old: &[char],
        new: &[char],
        deadline: Option<DateTime<Utc>>,
    ) -> Vec<Diff> {
        let encoding = lines::lines_to_chars(old, new);
        let coded = self.diff_chars(&encoding.chars1, &encoding.chars2, false, deadline);
        let mut diffs = lines::chars_to_lines(&coded, &encoding.lines);

        cleanup::semantic(&mut diffs);

        // Rediff each run of adjacent deletions and insertions.
        diffs.push(Diff::equal(""));
        let mut pointer = 0;
        let mut count_delete = 0;
        let mut count_insert = 0;
        let mut text_delete: Vec<char> = Vec::new();
        let mut text_insert: Vec<char> = Vec::new();

        while pointer < diffs.len() {
            match diffs[pointer].op {
                Op::Insert => {
                    count_insert += 1;
                    text_insert.extend_from_slice(&diffs[pointer].text);
                }
                Op::Delete => {
                    count_delete += 1;
                    text_delete.extend_from_slice(&diffs[pointer].text);
                }
                Op::Equal => {
                    if count_delete >= 1 && count_insert >= 1 {
                        let start = pointer - count_delete - count_insert;
                        let sub = self.diff_chars(&text_delete, &text_insert, false, deadline);
                        let sublen = sub.len();
                        diffs.splice(start..pointer, sub);
                        pointer = start + sublen;
                    }
                    count_delete = 0;
                    count_insert = 0;
                    text_delete.clear();
                    text_insert.clear();
                }
            }
            pointer += 1;
        }
        diffs.pop();

        diffs
    }

    /// Do the two texts share a substring at least half the length of the
    /// longer text? Returns `[prefix1, suffix1, prefix2, suffix2, common]`
    /// when they do. Skipped entirely under unlimited time, because the
    /// shortcut can yield a non-minimal diff.
    pub fn half_match(&self, text1: &str, text2: &str) -> Option<[String; 5]> {
        let old: Vec<char> = text1.chars().collect();
        let new: Vec<char> = text2.chars().collect();
        let half = self.half_match_chars(&old, &new)?;
        Some([
            half.old_a.iter().collect(),
            half.old_b.iter().collect(),
            half.new_a.iter().collect(),
            half.new_b.iter().collect(),
            half.common.iter().collect(),
        ])
    }

    fn half_match_chars<'a>(&self, old: &'a [char], new: &'a [char]) -> Option<HalfMatch<'a>> {
        // Unlimited time: take the guaranteed-minimal route instead.
        self.timeout?;

        let (long, short) = if old.len() > new.len() {
            (old, new)
        } else {
            (new, old)
        };
        if long.len() < 4 || short.len() * 2 < long.len() {
            return None;
        }

        // Seed from the second quarter, then from the third.
        let hm1 = half_match_at(long, short, long.len() / 4);
        let hm2 = half_match_at(long, short, long.len() / 2);
        let halves = match (hm1, hm2) {
            (None, None) => return None,
            (Some(h), None) | (None, Some(h)) => h,
            (Some(a), Some(b)) => {
                if a.common.len() > b.common.len() {
                    a
                } else {
                    b
                }
            }
        };

        Some(if old.len() > new.len() {
            HalfMatch {
                old_a: halves.long_a,
                old_b: halves.long_b,
                new_a: halves.short_a,
                new_b: halves.short_b,
                common: halves.common,
            }
        } else {
            HalfMatch {
                old_a: halves.short_a,
                old_b: halves.short_b,
                new_a: halves.long_a,
                new_b: halves.long_b,
                common: halves.common,
            }
        })
    }

    /// Length of the common prefix of two texts, in scalar values.
    pub fn common_prefix(text1: &str, text2: &str) -> usize {
        text1
            .chars()
            .zip(text2.chars())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Length of the common suffix of two texts, in scalar values.
    pub fn common_suffix(text1: &str, text2: &str) -> usize {
        let old: Vec<char> = text1.chars().collect();
        let new: Vec<char> = text2.chars().collect();
        common_suffix(&old, &new)
    }

    /// Length of the longest suffix of `text1` that is a prefix of `text2`.
    pub fn common_overlap(text1: &str, text2: &str) -> usize {
        let old: Vec<char> = text1.chars().collect();
        let new: Vec<char> = text2.chars().collect();
        common_overlap(&old, &new)
    }

    /// Rebuild the source text from a script.
    pub fn text1(diffs: &[Diff]) -> String {
        text1_chars(diffs).iter().collect()
    }

    /// Rebuild the destination text from a script.
    pub fn text2(diffs: &[Diff]) -> String {
        text2_chars(diffs).iter().collect()
    }

    /// Map a source offset to the corresponding destination offset. An
    /// offset inside a deletion maps to where the deletion began.
    pub fn x_index(diffs: &[Diff], loc: usize) -> usize {
        let mut chars1 = 0;
        let mut chars2 = 0;
        let mut last_chars1 = 0;
        let mut last_chars2 = 0;
        let mut hit = None;

        for diff in diffs {
            if diff.op != Op::Insert {
                chars1 += diff.len();
            }
            if diff.op != Op::Delete {
                chars2 += diff.len();
            }
            if chars1 > loc {
                hit = Some(diff);
                break;
            }
            last_chars1 = chars1;
            last_chars2 = chars2;
        }

        if let Some(diff) = hit {
            if diff.op == Op::Delete {
                // The location was deleted.
                return last_chars2;
            }
        }
        last_chars2 + (loc - last_chars1)
    }

    /// Edit distance of a script: a delete/insert pair counts as
    /// `max(|del|, |ins|)` substitutions.
    pub fn levenshtein(diffs: &[Diff]) -> usize {
        let mut levenshtein = 0;
        let mut insertions = 0;
        let mut deletions = 0;

        for diff in diffs {
            match diff.op {
                Op::Insert => insertions += diff.len(),
                Op::Delete => deletions += diff.len(),
                Op::Equal => {
                    levenshtein += insertions.max(deletions);
                    insertions = 0;
                    deletions = 0;
                }
            }
        }
        levenshtein + insertions.max(deletions)
    }

    /// Coalesce the script into canonical form: merge same-op runs, factor
    /// shared affixes of delete/insert pairs into the surrounding
    /// equalities, drop empty tuples, and slide single edits over equal
    /// neighbours. Repeats until stable.
    pub fn cleanup_merge(diffs: &mut Vec<Diff>) {
        cleanup::merge(diffs);
    }

    /// Eliminate coincidental equalities that make a script hard to read,
    /// then pull factored overlaps out of delete/insert pairs.
    pub fn cleanup_semantic(diffs: &mut Vec<Diff>) {
        cleanup::semantic(diffs);
    }

    /// Slide single edits that are flanked by equalities towards the
    /// nearest logical boundary (word, line, blank line).
    pub fn cleanup_semantic_lossless(diffs: &mut Vec<Diff>) {
        cleanup::semantic_lossless(diffs);
    }

    /// Fold equalities too small to be worth the cost of a separate edit
    /// into their neighbours, tuned by `edit_cost`.
    pub fn cleanup_efficiency(&self, diffs: &mut Vec<Diff>) {
        cleanup::efficiency(diffs, self.edit_cost());
    }
}

#[derive(Debug, PartialEq, Eq)]
struct HalfMatch<'a> {
    old_a: &'a [char],
    old_b: &'a [char],
    new_a: &'a [char],
    new_b: &'a [char],
    common: &'a [char],
}

#[derive(Debug, PartialEq, Eq)]
struct Halves<'a> {
    long_a: &'a [char],
    long_b: &'a [char],
    short_a: &'a [char],
    short_b: &'a [char],
    common: &'a [char],
}

// Seed a quarter-length substring of `long` at `idx` and grow the best
// common region found around any of its occurrences in `short`.
fn half_match_at<'a>(long: &'a [char], short: &'a [char], idx: usize) -> Option<Halves<'a>> {
    let seed = &long[idx..idx + long.len() / 4];
    let mut j = 0;
    let mut best: Option<Halves<'a>> = None;
    let mut best_common = 0;

    while let Some(found) = util::index_of(&short[j..], seed) {
        j += found;
        let prefix = common_prefix(&long[idx..], &short[j..]);
        let suffix = common_suffix(&long[..idx], &short[..j]);
        if best_common < suffix + prefix {
            best_common = suffix + prefix;
            best = Some(Halves {
                long_a: &long[..idx - suffix],
                long_b: &long[idx + prefix..],
                short_a: &short[..j - suffix],
                short_b: &short[j + prefix..],
                common: &short[j - suffix..j + prefix],
            });
        }
        j += 1;
    }

    if best_common * 2 >= long.len() {
        best
    } else {
        None
    }
}

pub(crate) fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

pub(crate) fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

// Longest suffix of `a` matching a prefix of `b`. Grows a candidate length
// one hit at a time, so runs of near-misses are skipped in one step.
pub(crate) fn common_overlap(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let min = a.len().min(b.len());
    let a = &a[a.len() - min..];
    let b = &b[..min];
    if a == b {
        return min;
    }

    let mut best = 0;
    let mut length = 1;
    loop {
        let pattern = &a[min - length..];
        let Some(found) = util::index_of(b, pattern) else {
            return best;
        };
        length += found;
        if found == 0 || a[min - length..] == b[..length] {
            best = length;
            length += 1;
        }
    }
}

pub(crate) fn text1_chars(diffs: &[Diff]) -> Vec<char> {
    let mut text = Vec::new();
    for diff in diffs {
        if diff.op != Op::Insert {
            text.extend_from_slice(&diff.text);
        }
    }
    text
}

pub(crate) fn text2_chars(diffs: &[Diff]) -> Vec<char> {
    let mut text = Vec::new();
    for diff in diffs {
        if diff.op != Op::Delete {
            text.extend_from_slice(&diff.text);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_common_prefix() {
        // Null case.
        assert_eq!(0, Differ::common_prefix("abc", "xyz"));
        // Non-null case.
        assert_eq!(4, Differ::common_prefix("1234abcdef", "1234xyz"));
        // Whole case.
        assert_eq!(4, Differ::common_prefix("1234", "1234xyz"));
        // Scalar values, not bytes: é is one unit.
        assert_eq!(1, Differ::common_prefix("éa", "éb"));
    }

    #[test]
    fn test_common_suffix() {
        assert_eq!(0, Differ::common_suffix("abc", "xyz"));
        assert_eq!(4, Differ::common_suffix("abcdef1234", "xyz1234"));
        assert_eq!(4, Differ::common_suffix("1234", "xyz1234"));
    }

    #[test]
    fn test_common_overlap() {
        // Null case.
        assert_eq!(0, Differ::common_overlap("", "abcd"));
        // Whole case.
        assert_eq!(3, Differ::common_overlap("abc", "abcd"));
        // No overlap.
        assert_eq!(0, Differ::common_overlap("123456", "abcd"));
        // Overlap.
        assert_eq!(3, Differ::common_overlap("123456xxx", "xxxabcd"));
        // Unicode: a ligature is not its decomposition.
        assert_eq!(0, Differ::common_overlap("fi", "\u{fb01}i"));
    }

    #[test]
    fn test_half_match() {
        let mut differ = Differ::new();

        // No match.
        assert_eq!(None, differ.half_match("1234567890", "abcdef"));
        assert_eq!(None, differ.half_match("12345", "23"));

        // Single match.
        assert_eq!(
            Some([
                "12".into(),
                "90".into(),
                "a".into(),
                "z".into(),
                "345678".into()
            ]),
            differ.half_match("1234567890", "a345678z")
        );
        assert_eq!(
            Some([
                "a".into(),
                "z".into(),
                "12".into(),
                "90".into(),
                "345678".into()
            ]),
            differ.half_match("a345678z", "1234567890")
        );
        assert_eq!(
            Some([
                "abc".into(),
                "z".into(),
                "1234".into(),
                "0".into(),
                "56789".into()
            ]),
            differ.half_match("abc56789z", "1234567890")
        );
        assert_eq!(
            Some([
                "a".into(),
                "xyz".into(),
                "1".into(),
                "7890".into(),
                "23456".into()
            ]),
            differ.half_match("a23456xyz", "1234567890")
        );

        // Multiple matches.
        assert_eq!(
            Some([
                "12123".into(),
                "123121".into(),
                "a".into(),
                "z".into(),
                "1234123451234".into()
            ]),
            differ.half_match("121231234123451234123121", "a1234123451234z")
        );
        assert_eq!(
            Some([
                "".into(),
                "-=-=-=-=-=".into(),
                "x".into(),
                "".into(),
                "x-=-=-=-=-=-=-=".into()
            ]),
            differ.half_match("x-=-=-=-=-=-=-=-=-=-=-=-=", "xx-=-=-=-=-=-=-=")
        );
        assert_eq!(
            Some([
                "-=-=-=-=-=".into(),
                "".into(),
                "".into(),
                "y".into(),
                "-=-=-=-=-=-=-=y".into()
            ]),
            differ.half_match("-=-=-=-=-=-=-=-=-=-=-=-=y", "-=-=-=-=-=-=-=yy")
        );

        // Non-optimal half-match: with unlimited time the shortcut is off.
        assert_eq!(
            Some([
                "qHillo".into(),
                "w".into(),
                "x".into(),
                "Hulloy".into(),
                "HelloHe".into()
            ]),
            differ.half_match("qHilloHelloHew", "xHelloHeHulloy")
        );
        differ.set_timeout(None);
        assert_eq!(None, differ.half_match("qHilloHelloHew", "xHelloHeHulloy"));
    }

    #[test]
    fn test_texts() {
        let diffs = vec![
            Diff::equal("jump"),
            Diff::delete("s"),
            Diff::insert("ed"),
            Diff::equal(" over "),
            Diff::delete("the"),
            Diff::insert("a"),
            Diff::equal(" lazy"),
        ];
        assert_eq!("jumps over the lazy", Differ::text1(&diffs));
        assert_eq!("jumped over a lazy", Differ::text2(&diffs));
    }

    #[test]
    fn test_x_index() {
        // Translation on equality.
        let diffs = vec![Diff::delete("a"), Diff::insert("1234"), Diff::equal("xyz")];
        assert_eq!(5, Differ::x_index(&diffs, 2));

        // Translation on deletion.
        let diffs = vec![Diff::equal("a"), Diff::delete("1234"), Diff::equal("xyz")];
        assert_eq!(1, Differ::x_index(&diffs, 3));
    }

    #[test]
    fn test_levenshtein() {
        // Trailing equality.
        assert_eq!(
            4,
            Differ::levenshtein(&[
                Diff::delete("abc"),
                Diff::insert("1234"),
                Diff::equal("xyz")
            ])
        );
        // Leading equality.
        assert_eq!(
            4,
            Differ::levenshtein(&[
                Diff::equal("xyz"),
                Diff::delete("abc"),
                Diff::insert("1234")
            ])
        );
        // Middle equality.
        assert_eq!(
            7,
            Differ::levenshtein(&[
                Diff::delete("abc"),
                Diff::equal("xyz"),
                Diff::insert("1234")
            ])
        );
    }

    #[test]
    fn test_main_trivial() {
        let differ = Differ::new();

        // Null case.
        assert_eq!(Vec::<Diff>::new(), differ.main("", ""));

        // Equality.
        assert_eq!(vec![Diff::equal("abc")], differ.main("abc", "abc"));

        // Simple insertion.
        assert_eq!(
            vec![Diff::equal("ab"), Diff::insert("123"), Diff::equal("c")],
            differ.main("abc", "ab123c")
        );

        // Simple deletion.
        assert_eq!(
            vec![Diff::equal("a"), Diff::delete("123"), Diff::equal("bc")],
            differ.main("a123bc", "abc")
        );

        // Two insertions.
        assert_eq!(
            vec![
                Diff::equal("a"),
                Diff::insert("123"),
                Diff::equal("b"),
                Diff::insert("456"),
                Diff::equal("c"),
            ],
            differ.main("abc", "a123b456c")
        );

        // Two deletions.
        assert_eq!(
            vec![
                Diff::equal("a"),
                Diff::delete("123"),
                Diff::equal("b"),
                Diff::delete("456"),
                Diff::equal("c"),
            ],
            differ.main("a123b456c", "abc")
        );
    }

    #[test]
    fn test_main_real() {
        let mut differ = Differ::new();
        // Perform a real diff and switch off the timeout to keep the result
        // deterministic.
        differ.set_timeout(None);

        // Simple cases.
        assert_eq!(
            vec![Diff::delete("a"), Diff::insert("b")],
            differ.main("a", "b")
        );
        assert_eq!(
            vec![
                Diff::delete("Apple"),
                Diff::insert("Banana"),
                Diff::equal("s are a"),
                Diff::insert("lso"),
                Diff::equal(" fruit."),
            ],
            differ.main("Apples are a fruit.", "Bananas are also fruit.")
        );
        assert_eq!(
            vec![
                Diff::delete("a"),
                Diff::insert("\u{0680}"),
                Diff::equal("x"),
                Diff::delete("\t"),
                Diff::insert("\0"),
            ],
            differ.main("ax\t", "\u{0680}x\0")
        );

        // Overlaps.
        assert_eq!(
            vec![
                Diff::delete("1"),
                Diff::equal("a"),
                Diff::delete("y"),
                Diff::equal("b"),
                Diff::delete("2"),
                Diff::insert("xab"),
            ],
            differ.main("1ayb2", "abxab")
        );
        assert_eq!(
            vec![
                Diff::insert("xaxcx"),
                Diff::equal("abc"),
                Diff::delete("y"),
            ],
            differ.main("abcy", "xaxcxabc")
        );
        assert_eq!(
            vec![
                Diff::delete("ABCD"),
                Diff::equal("a"),
                Diff::delete("="),
                Diff::insert("-"),
                Diff::equal("bcd"),
                Diff::delete("="),
                Diff::insert("-"),
                Diff::equal("efghijklmnopqrs"),
                Diff::delete("EFGHIJKLMNOefg"),
            ],
            differ.main("ABCDa=bcd=efghijklmnopqrsEFGHIJKLMNOefg", "a-bcd-efghijklmnopqrs")
        );

        // Large equality.
        assert_eq!(
            vec![
                Diff::insert(" "),
                Diff::equal("a"),
                Diff::insert("nd"),
                Diff::equal(" [[Pennsylvania]]"),
                Diff::delete(" and [[New"),
            ],
            differ.main("a [[Pennsylvania]] and [[New", " and [[Pennsylvania]]")
        );
    }

    #[test]
    fn test_main_linemode() {
        let mut differ = Differ::new();
        differ.set_timeout(None);

        // Line-mode and char-mode must agree on the result text.
        let a = "1234567890\n".repeat(13);
        let b = "abcdefghij\n".repeat(13);
        differ.set_checklines(false);
        let no_lines = differ.main(&a, &b);
        differ.set_checklines(true);
        let with_lines = differ.main(&a, &b);
        assert_eq!(Differ::text2(&no_lines), Differ::text2(&with_lines));
        assert_eq!(Differ::text1(&no_lines), Differ::text1(&with_lines));
    }

    #[test]
    fn test_script_fidelity() {
        let differ = Differ::new();
        let cases = [
            ("The quick brown fox.", "The quick red fox jumped."),
            ("", "whole insertion"),
            ("whole deletion", ""),
            ("unicode ✏️ text", "unicode 🔧 text"),
        ];
        for (a, b) in cases {
            let diffs = differ.main(a, b);
            assert_eq!(a, Differ::text1(&diffs));
            assert_eq!(b, Differ::text2(&diffs));
        }
    }

    #[test]
    fn test_internal_overlap_slices() {
        assert_eq!(3, common_overlap(&chars("123456xxx"), &chars("xxxabcd")));
        assert_eq!(0, common_prefix(&chars("abc"), &chars("xyz")));
    }
}
