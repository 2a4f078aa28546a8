//! Line-level encoding for the line-mode speedup. Each distinct line is
//! assigned one scalar value so the char-based machinery can diff whole
//! lines at a time.

use std::collections::HashMap;

use super::{Diff, Differ};

// Slot 0 of the dictionary is reserved blank so that no line ever encodes
// to the zero code unit.
pub(crate) struct LineEncoding<'a> {
    pub(crate) chars1: Vec<char>,
    pub(crate) chars2: Vec<char>,
    pub(crate) lines: Vec<&'a [char]>,
}

// Dictionary indices map to scalar values skipping the surrogate block, so
// the table can grow past 65,535 entries without producing an invalid char.
fn code_char(index: usize) -> char {
    let cp = if index < 0xD800 {
        index as u32
    } else {
        index as u32 + 0x800
    };
    char::from_u32(cp).expect("codes skip the surrogate range")
}

fn code_index(code: char) -> usize {
    let cp = code as u32;
    if cp < 0xD800 {
        cp as usize
    } else {
        (cp - 0x800) as usize
    }
}

pub(crate) fn lines_to_chars<'a>(old: &'a [char], new: &'a [char]) -> LineEncoding<'a> {
    let mut lines: Vec<&'a [char]> = vec![&[]];
    let mut table: HashMap<&'a [char], usize> = HashMap::new();

    // Keep the first dictionary well under the second one's cap so the
    // second text can still register new lines.
    let chars1 = encode(old, &mut lines, &mut table, 40_000);
    let chars2 = encode(new, &mut lines, &mut table, 65_535);

    LineEncoding {
        chars1,
        chars2,
        lines,
    }
}

fn encode<'a>(
    text: &'a [char],
    lines: &mut Vec<&'a [char]>,
    table: &mut HashMap<&'a [char], usize>,
    max_lines: usize,
) -> Vec<char> {
    let mut encoded = Vec::new();
    let mut cursor = 0;

    while cursor < text.len() {
        let mut end = match text[cursor..].iter().position(|&c| c == '\n') {
            Some(nl) => cursor + nl + 1,
            None => text.len(),
        };
        let mut line = &text[cursor..end];
        if !table.contains_key(line) && lines.len() >= max_lines {
            // Dictionary full: the remainder becomes one oversize line.
            end = text.len();
            line = &text[cursor..end];
        }
        let id = *table.entry(line).or_insert_with(|| {
            lines.push(line);
            lines.len() - 1
        });
        encoded.push(code_char(id));
        cursor = end;
    }

    encoded
}

pub(crate) fn chars_to_lines(diffs: &[Diff], lines: &[&[char]]) -> Vec<Diff> {
    diffs
        .iter()
        .map(|diff| {
            let mut text: Vec<char> = Vec::new();
            for &code in diff.chars() {
                text.extend_from_slice(lines[code_index(code)]);
            }
            Diff::raw(diff.op(), &text)
        })
        .collect()
}

impl Differ {
    /// Encode two texts as strings of line codes plus the shared line table.
    /// The table's first entry is reserved blank; codes are never zero.
    pub fn lines_to_chars(text1: &str, text2: &str) -> (String, String, Vec<String>) {
        let old: Vec<char> = text1.chars().collect();
        let new: Vec<char> = text2.chars().collect();
        let encoding = lines_to_chars(&old, &new);
        (
            encoding.chars1.iter().collect(),
            encoding.chars2.iter().collect(),
            encoding
                .lines
                .iter()
                .map(|line| line.iter().collect())
                .collect(),
        )
    }

    /// Rehydrate a script computed over line codes back into line text.
    pub fn chars_to_lines(diffs: &[Diff], lines: &[String]) -> Vec<Diff> {
        let tables: Vec<Vec<char>> = lines.iter().map(|l| l.chars().collect()).collect();
        let borrowed: Vec<&[char]> = tables.iter().map(|l| &l[..]).collect();
        chars_to_lines(diffs, &borrowed)
    }
}
