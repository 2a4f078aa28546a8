//! The patch engine: build hunks from a script, serialize them, and apply
//! them to text that may have drifted since the diff was computed.

mod text;

use crate::diff::{text1_chars, text2_chars, Diff, Differ, Op};
use crate::errors::Error;
use crate::fuzzy::Matcher;
use crate::util;

/// One hunk: a localized run of edits with absolute coordinates and rolling
/// context equalities on both ends.
///
/// `start1`/`start2` stay `None` until the hunk is anchored to its source
/// and destination offsets; serializing or growing an unanchored hunk is an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub(crate) diffs: Vec<Diff>,
    pub(crate) start1: Option<usize>,
    pub(crate) start2: Option<usize>,
    pub(crate) length1: usize,
    pub(crate) length2: usize,
}

impl Patch {
    pub fn diffs(&self) -> &[Diff] {
        &self.diffs
    }

    /// Offset of the hunk in the pre-text, once anchored.
    pub fn start1(&self) -> Option<usize> {
        self.start1
    }

    /// Offset of the hunk in the post-text, once anchored.
    pub fn start2(&self) -> Option<usize> {
        self.start2
    }

    /// Chars the hunk consumes from the pre-text.
    pub fn length1(&self) -> usize {
        self.length1
    }

    /// Chars the hunk produces into the post-text.
    pub fn length2(&self) -> usize {
        self.length2
    }

    pub(crate) fn anchor(&self) -> Result<(usize, usize), Error> {
        match (self.start1, self.start2) {
            (Some(start1), Some(start2)) => Ok((start1, start2)),
            _ => Err(Error::PatchNotInitialized),
        }
    }

    pub(crate) fn shift(&mut self, by: usize) -> Result<(), Error> {
        let (start1, start2) = self.anchor()?;
        self.start1 = Some(start1 + by);
        self.start2 = Some(start2 + by);
        Ok(())
    }
}

/// The patch engine. Owns a [`Differ`] and a [`Matcher`], which it uses to
/// build hunks and to anchor them during application.
#[derive(Debug, Clone)]
pub struct Patcher {
    differ: Differ,
    matcher: Matcher,
    /// How closely the contents of a large deletion must match the text
    /// found at its location (0.0 = perfection, 1.0 = very loose).
    delete_threshold: f32,
    /// Chunk size for context growth around each hunk.
    margin: u8,
}

impl Default for Patcher {
    fn default() -> Self {
        Self {
            differ: Differ::default(),
            matcher: Matcher::default(),
            delete_threshold: 0.5,
            margin: 4,
        }
    }
}

impl Patcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn differ(&self) -> &Differ {
        &self.differ
    }

    pub fn differ_mut(&mut self) -> &mut Differ {
        &mut self.differ
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn matcher_mut(&mut self) -> &mut Matcher {
        &mut self.matcher
    }

    pub fn delete_threshold(&self) -> f32 {
        self.delete_threshold
    }

    /// Tolerated edit-distance fraction for a large-deletion hunk to still
    /// apply. Defaults to 0.5; usually kept equal to the match threshold.
    pub fn set_delete_threshold(&mut self, threshold: f32) {
        self.delete_threshold = threshold;
    }

    pub fn margin(&self) -> u8 {
        self.margin
    }

    /// Context chunk size around each hunk. Defaults to 4.
    pub fn set_margin(&mut self, margin: u8) {
        self.margin = margin;
    }

    /// Build a hunk list from two texts. The script is computed internally
    /// and given the semantic and efficiency cleanups.
    pub fn make_from_texts(&self, text1: &str, text2: &str) -> Result<Vec<Patch>, Error> {
        let mut diffs = self.differ.main(text1, text2);
        if diffs.len() > 2 {
            Differ::cleanup_semantic(&mut diffs);
            self.differ.cleanup_efficiency(&mut diffs);
        }
        let chars: Vec<char> = text1.chars().collect();
        self.build(&chars, &diffs)
    }

    /// Build a hunk list from a script alone; the pre-text is reconstructed
    /// from the script's equalities and deletions.
    pub fn make_from_diffs(&self, diffs: &[Diff]) -> Result<Vec<Patch>, Error> {
        let chars = text1_chars(diffs);
        self.build(&chars, diffs)
    }

    /// Build a hunk list from the pre-text and a script. The preferred
    /// shape when both are already at hand.
    pub fn make_from_text_diffs(&self, text1: &str, diffs: &[Diff]) -> Result<Vec<Patch>, Error> {
        let chars: Vec<char> = text1.chars().collect();
        self.build(&chars, diffs)
    }

    /// Build a hunk list from both texts and a script. Kept for parity with
    /// older APIs; `text2` is redundant and ignored.
    pub fn make_from_texts_diffs(
        &self,
        text1: &str,
        _text2: &str,
        diffs: &[Diff],
    ) -> Result<Vec<Patch>, Error> {
        self.make_from_text_diffs(text1, diffs)
    }

    // Walk the script, opening a hunk at the first edit and closing it at
    // any equality big enough to be context for both sides.
    fn build(&self, text: &[char], diffs: &[Diff]) -> Result<Vec<Patch>, Error> {
        if diffs.is_empty() {
            return Ok(Vec::new());
        }

        let margin = self.margin as usize;
        let mut patches = Vec::new();
        let mut patch = Patch::default();
        let mut char1 = 0;
        let mut char2 = 0;

        // Unlike unidiff, these hunks carry rolling context, so the text
        // each hunk anchors against is the text as already patched by its
        // predecessors.
        let mut prepatch: Vec<char> = text.to_vec();
        let mut postpatch: Vec<char> = prepatch.clone();

        for (idx, diff) in diffs.iter().enumerate() {
            if patch.diffs.is_empty() && diff.op() != Op::Equal {
                // A new hunk starts here.
                patch.start1 = Some(char1);
                patch.start2 = Some(char2);
            }

            match diff.op() {
                Op::Insert => {
                    patch.length2 += diff.len();
                    postpatch.splice(char2..char2, diff.chars().iter().copied());
                    patch.diffs.push(diff.clone());
                }
                Op::Delete => {
                    patch.length1 += diff.len();
                    postpatch.drain(char2..char2 + diff.len());
                    patch.diffs.push(diff.clone());
                }
                Op::Equal => {
                    if diff.len() <= 2 * margin && !patch.diffs.is_empty() && idx + 1 != diffs.len()
                    {
                        // Small equality inside a hunk.
                        patch.length1 += diff.len();
                        patch.length2 += diff.len();
                        patch.diffs.push(diff.clone());
                    }
                    if diff.len() >= 2 * margin && !patch.diffs.is_empty() {
                        // Time for a new hunk.
                        self.add_context_chars(&mut patch, &prepatch)?;
                        patches.push(std::mem::take(&mut patch));
                        prepatch.clone_from(&postpatch);
                        char1 = char2;
                    }
                }
            }

            if diff.op() != Op::Insert {
                char1 += diff.len();
            }
            if diff.op() != Op::Delete {
                char2 += diff.len();
            }
        }

        // Pick up the leftover hunk if not empty.
        if !patch.diffs.is_empty() {
            self.add_context_chars(&mut patch, &prepatch)?;
            patches.push(patch);
        }

        Ok(patches)
    }

    /// Grow a hunk's context until its pattern is locally unique in `text`,
    /// capped so the grown pattern still fits the match window.
    pub fn add_context(&self, patch: &mut Patch, text: &str) -> Result<(), Error> {
        let chars: Vec<char> = text.chars().collect();
        self.add_context_chars(patch, &chars)
    }

    fn add_context_chars(&self, patch: &mut Patch, text: &[char]) -> Result<(), Error> {
        let (start1, start2) = patch.anchor()?;
        if text.is_empty() {
            return Ok(());
        }

        let margin = self.margin as usize;
        let max_bits = self.matcher.max_bits();
        let mut padding = 0;
        let mut pattern = &text[start2.min(text.len())..(start2 + patch.length1).min(text.len())];

        // Grow until the pattern is unique, keeping room for the context
        // chunks within the match window.
        while util::index_of(text, pattern) != util::rindex_of(text, pattern)
            && pattern.len() < max_bits.saturating_sub(2 * margin)
        {
            padding += margin;
            let begin = start2.saturating_sub(padding);
            let end = (start2 + patch.length1 + padding).min(text.len());
            pattern = &text[begin..end];
        }
        // Add one chunk for good luck.
        padding += margin;

        let prefix = &text[start2.saturating_sub(padding)..start2.min(text.len())];
        if !prefix.is_empty() {
            patch.diffs.insert(0, Diff::raw(Op::Equal, prefix));
        }
        let suffix_from = (start2 + patch.length1).min(text.len());
        let suffix = &text[suffix_from..(start2 + patch.length1 + padding).min(text.len())];
        if !suffix.is_empty() {
            patch.diffs.push(Diff::raw(Op::Equal, suffix));
        }

        // Roll back the start points and extend the lengths.
        patch.start1 = Some(start1 - prefix.len());
        patch.start2 = Some(start2 - prefix.len());
        patch.length1 += prefix.len() + suffix.len();
        patch.length2 += prefix.len() + suffix.len();

        Ok(())
    }

    /// Apply a hunk list to `text`, tolerating local drift. Returns the
    /// patched text and one boolean per applied hunk (after splitting).
    /// The hunks passed in are never modified.
    pub fn apply(&self, patches: &[Patch], text: &str) -> Result<(String, Vec<bool>), Error> {
        if patches.is_empty() {
            return Ok((text.to_string(), Vec::new()));
        }

        // Work on a private copy.
        let mut patches = patches.to_vec();
        let null_pad = self.add_padding(&mut patches)?;
        let mut source: Vec<char> = null_pad
            .iter()
            .copied()
            .chain(text.chars())
            .chain(null_pad.iter().copied())
            .collect();
        self.split_max(&mut patches)?;

        let deadline = self.differ.deadline();
        let max_bits = self.matcher.max_bits();

        // Drift between the expected and actual location of the previous
        // hunk: hunks expected at 10 and 20 with the first found at 12 give
        // the second an effective expectation of 22.
        let mut drift = 0_isize;
        let mut results = vec![false; patches.len()];

        for (x, patch) in patches.iter().enumerate() {
            let start2 = patch.start2.ok_or(Error::PatchNotInitialized)?;
            let expected = (start2 as isize + drift).max(0) as usize;
            let text1 = text1_chars(&patch.diffs);

            let (start_loc, end_loc) = if text1.len() > max_bits {
                // split_max only leaves an oversized pattern behind for a
                // monster delete; anchor its two endpoints separately.
                match self.matcher.find(&source, &text1[..max_bits], expected)? {
                    Some(head) => {
                        let tail = self.matcher.find(
                            &source,
                            &text1[text1.len() - max_bits..],
                            expected + text1.len() - max_bits,
                        )?;
                        match tail {
                            // The tail must land after the head.
                            Some(tail) if head < tail => (Some(head), Some(tail)),
                            _ => (None, None),
                        }
                    }
                    None => (None, None),
                }
            } else {
                (self.matcher.find(&source, &text1, expected)?, None)
            };

            let Some(start_loc) = start_loc else {
                // No match found. Subtract the delta for this failed hunk
                // from subsequent expectations.
                results[x] = false;
                drift -= patch.length2 as isize - patch.length1 as isize;
                continue;
            };

            results[x] = true;
            drift = start_loc as isize - expected as isize;

            let found: Vec<char> = match end_loc {
                Some(end_loc) => source[start_loc..(end_loc + max_bits).min(source.len())].to_vec(),
                None => source[start_loc..(start_loc + text1.len()).min(source.len())].to_vec(),
            };

            if text1 == found {
                // Perfect match: shove the replacement text in.
                let replacement = text2_chars(&patch.diffs);
                source.splice(start_loc..start_loc + text1.len(), replacement);
                continue;
            }

            // Imperfect match: diff what was expected against what is
            // there, and translate each edit through the equivalence map.
            let mut map = self.differ.diff_chars(&text1, &found, false, deadline);
            if text1.len() > max_bits
                && Differ::levenshtein(&map) as f32 / text1.len() as f32 > self.delete_threshold
            {
                // The end points match but the content is unacceptably bad.
                results[x] = false;
                continue;
            }

            Differ::cleanup_semantic_lossless(&mut map);
            let mut index1 = 0;
            for diff in &patch.diffs {
                if diff.op() != Op::Equal {
                    let index2 = Differ::x_index(&map, index1);
                    match diff.op() {
                        Op::Insert => {
                            source.splice(
                                start_loc + index2..start_loc + index2,
                                diff.chars().iter().copied(),
                            );
                        }
                        Op::Delete => {
                            let del_end = Differ::x_index(&map, index1 + diff.len());
                            source.drain(start_loc + index2..start_loc + del_end);
                        }
                        Op::Equal => {}
                    }
                }
                if diff.op() != Op::Delete {
                    index1 += diff.len();
                }
            }
        }

        // Strip the padding off.
        let body = &source[null_pad.len()..source.len() - null_pad.len()];
        Ok((body.iter().collect(), results))
    }

    /// Bookend the hunk list with null padding so edits at the very edges
    /// of the text have context to anchor against. Code points 1..=margin;
    /// zero is avoided deliberately. Returns the padding string.
    pub fn add_padding(&self, patches: &mut [Patch]) -> Result<Vec<char>, Error> {
        let pad_len = self.margin as usize;
        let null_pad: Vec<char> = (1..=self.margin).map(char::from).collect();

        // Bump all the hunks forward.
        for patch in patches.iter_mut() {
            patch.shift(pad_len)?;
        }

        // Add some padding on the start of the first hunk.
        if let Some(first) = patches.first_mut() {
            let needs_equality = first.diffs.first().map_or(true, |d| d.op() != Op::Equal);
            if needs_equality {
                first.diffs.insert(0, Diff::raw(Op::Equal, &null_pad));
                let (start1, start2) = first.anchor()?;
                first.start1 = Some(start1 - pad_len); // Should be 0.
                first.start2 = Some(start2 - pad_len);
                first.length1 += pad_len;
                first.length2 += pad_len;
            } else if pad_len > first.diffs[0].len() {
                // Grow the first equality.
                let head = first.diffs[0].clone();
                let extra = pad_len - head.len();
                let mut grown: Vec<char> = null_pad[head.len()..].to_vec();
                grown.extend_from_slice(head.chars());
                first.diffs[0] = Diff::raw(Op::Equal, &grown);
                let (start1, start2) = first.anchor()?;
                first.start1 = Some(start1 - extra);
                first.start2 = Some(start2 - extra);
                first.length1 += extra;
                first.length2 += extra;
            }
        }

        // And on the end of the last hunk.
        if let Some(last) = patches.last_mut() {
            let needs_equality = last.diffs.last().map_or(true, |d| d.op() != Op::Equal);
            if needs_equality {
                last.diffs.push(Diff::raw(Op::Equal, &null_pad));
                last.length1 += pad_len;
                last.length2 += pad_len;
            } else if let Some(tail) = last.diffs.last_mut() {
                if pad_len > tail.len() {
                    // Grow the last equality.
                    let extra = pad_len - tail.len();
                    tail.extend(&null_pad[..extra]);
                    last.length1 += extra;
                    last.length2 += extra;
                }
            }
        }

        Ok(null_pad)
    }

    /// Break up any hunk whose pre-text span exceeds the match window into
    /// a run of smaller hunks linked by rolling context.
    pub fn split_max(&self, patches: &mut Vec<Patch>) -> Result<(), Error> {
        let patch_size = self.matcher.max_bits();
        let margin = self.margin as usize;

        let mut idx = 0;
        while idx < patches.len() {
            if patches[idx].length1 <= patch_size {
                idx += 1;
                continue;
            }

            let mut big = patches.remove(idx);
            let (mut start1, mut start2) = big.anchor()?;
            let mut precontext: Vec<char> = Vec::new();
            let mut replacements: Vec<Patch> = Vec::new();

            while !big.diffs.is_empty() {
                let mut patch = Patch {
                    start1: Some(start1 - precontext.len()),
                    start2: Some(start2 - precontext.len()),
                    ..Default::default()
                };
                let mut empty = true;
                if !precontext.is_empty() {
                    patch.length1 = precontext.len();
                    patch.length2 = precontext.len();
                    patch.diffs.push(Diff::raw(Op::Equal, &precontext));
                }

                while !big.diffs.is_empty() && patch.length1 < patch_size.saturating_sub(margin) {
                    let op = big.diffs[0].op();
                    if op == Op::Insert {
                        // Insertions are harmless.
                        patch.length2 += big.diffs[0].len();
                        start2 += big.diffs[0].len();
                        patch.diffs.push(big.diffs.remove(0));
                        empty = false;
                    } else if op == Op::Delete
                        && patch.diffs.len() == 1
                        && patch.diffs[0].op() == Op::Equal
                        && big.diffs[0].len() > 2 * patch_size
                    {
                        // This is a large deletion. Let it pass in one chunk.
                        patch.length1 += big.diffs[0].len();
                        start1 += big.diffs[0].len();
                        patch.diffs.push(big.diffs.remove(0));
                        empty = false;
                    } else {
                        // Deletion or equality. Only take as much as fits.
                        let take = big.diffs[0]
                            .len()
                            .min(patch_size - patch.length1 - margin);
                        let chunk: Vec<char> = big.diffs[0].chars()[..take].to_vec();
                        patch.length1 += take;
                        start1 += take;
                        if op == Op::Equal {
                            patch.length2 += take;
                            start2 += take;
                        } else {
                            empty = false;
                        }
                        patch.diffs.push(Diff::raw(op, &chunk));

                        if take == big.diffs[0].len() {
                            big.diffs.remove(0);
                        } else {
                            let rest = big.diffs[0].chars()[take..].to_vec();
                            big.diffs[0] = Diff::raw(op, &rest);
                        }
                    }
                }

                // Compute the head context for the next sub-hunk.
                precontext = text2_chars(&patch.diffs);
                if precontext.len() > margin {
                    precontext.drain(..precontext.len() - margin);
                }

                // Append the tail context from what remains of the big hunk.
                let remaining = text1_chars(&big.diffs);
                let postcontext = &remaining[..margin.min(remaining.len())];
                if !postcontext.is_empty() {
                    patch.length1 += postcontext.len();
                    patch.length2 += postcontext.len();
                    match patch.diffs.last_mut() {
                        Some(last) if last.op() == Op::Equal => last.extend(postcontext),
                        _ => patch.diffs.push(Diff::raw(Op::Equal, postcontext)),
                    }
                }

                if !empty {
                    replacements.push(patch);
                }
            }

            let inserted = replacements.len();
            patches.splice(idx..idx, replacements);
            idx += inserted;
        }

        Ok(())
    }
}
