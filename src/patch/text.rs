//! The hunk text format: a GNU-diff-lookalike header per hunk followed by
//! percent-encoded body lines. Hunks serialize back to back, each with its
//! own trailing newline, so an empty list is the empty string.

use crate::diff::{decode_text, encode_text, Diff, Op};
use crate::errors::Error;

use super::{Patch, Patcher};

impl Patch {
    // Header coordinates are 1-based; a length of 1 is implicit, a length
    // of 0 leaves the start un-offset.
    fn write_text(&self, out: &mut String) -> Result<(), Error> {
        let (start1, start2) = self.anchor()?;

        let coords1 = match self.length1 {
            0 => format!("{start1},0"),
            1 => format!("{}", start1 + 1),
            n => format!("{},{}", start1 + 1, n),
        };
        let coords2 = match self.length2 {
            0 => format!("{start2},0"),
            1 => format!("{}", start2 + 1),
            n => format!("{},{}", start2 + 1, n),
        };
        out.push_str("@@ -");
        out.push_str(&coords1);
        out.push_str(" +");
        out.push_str(&coords2);
        out.push_str(" @@\n");

        for diff in &self.diffs {
            out.push(match diff.op() {
                Op::Insert => '+',
                Op::Delete => '-',
                Op::Equal => ' ',
            });
            out.push_str(&encode_text(&diff.text()));
            out.push('\n');
        }

        Ok(())
    }
}

fn parse_coords(section: &str) -> Option<(usize, Option<usize>)> {
    match section.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, Some(len.parse().ok()?))),
        None => Some((section.parse().ok()?, None)),
    }
}

// `@@ -start1[,len1] +start2[,len2] @@`
fn parse_header(line: &str) -> Option<(usize, Option<usize>, usize, Option<usize>)> {
    let body = line.strip_prefix("@@ -")?.strip_suffix(" @@")?;
    let (old, new) = body.split_once(" +")?;
    let (start1, len1) = parse_coords(old)?;
    let (start2, len2) = parse_coords(new)?;
    Some((start1, len1, start2, len2))
}

// Reverse of the header emission: a missing length means length 1 with the
// start shifted back to 0-based; length 0 keeps the start as written.
fn start_of(start: usize, len: Option<usize>, line: &str) -> Result<(usize, usize), Error> {
    match len {
        None => Ok((rebase(start, line)?, 1)),
        Some(0) => Ok((start, 0)),
        Some(n) => Ok((rebase(start, line)?, n)),
    }
}

fn rebase(start: usize, line: &str) -> Result<usize, Error> {
    start
        .checked_sub(1)
        .ok_or_else(|| Error::InvalidPatchText(line.to_string()))
}

impl Patcher {
    /// Serialize a hunk list. Every hunk must be anchored.
    pub fn to_text(patches: &[Patch]) -> Result<String, Error> {
        let mut out = String::new();
        for patch in patches {
            patch.write_text(&mut out)?;
        }
        Ok(out)
    }

    /// Parse a hunk list serialized by [`Patcher::to_text`]. Blank lines
    /// are tolerated; anything else malformed is `InvalidPatchText`.
    pub fn from_text(&self, text: &str) -> Result<Vec<Patch>, Error> {
        let mut patches = Vec::new();
        if text.is_empty() {
            return Ok(patches);
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let mut cursor = 0;

        while cursor < lines.len() {
            let line = lines[cursor];
            if line.is_empty() {
                cursor += 1;
                continue;
            }

            let (start1, len1, start2, len2) =
                parse_header(line).ok_or_else(|| Error::InvalidPatchText(line.to_string()))?;
            let mut patch = Patch::default();
            let (start1, length1) = start_of(start1, len1, line)?;
            let (start2, length2) = start_of(start2, len2, line)?;
            patch.start1 = Some(start1);
            patch.start2 = Some(start2);
            patch.length1 = length1;
            patch.length2 = length2;
            cursor += 1;

            while cursor < lines.len() {
                let body = lines[cursor];
                let Some(sign) = body.chars().next() else {
                    // Blank line? Whatever.
                    cursor += 1;
                    continue;
                };
                let content = &body[sign.len_utf8()..];
                match sign {
                    '@' => break, // start of the next hunk
                    '-' => patch.diffs.push(Diff::new(Op::Delete, &decode_text(content)?)),
                    '+' => patch.diffs.push(Diff::new(Op::Insert, &decode_text(content)?)),
                    ' ' => patch.diffs.push(Diff::new(Op::Equal, &decode_text(content)?)),
                    _ => return Err(Error::InvalidPatchText(body.to_string())),
                }
                cursor += 1;
            }

            patches.push(patch);
        }

        Ok(patches)
    }
}
