//! Post-diff reshaping passes. `merge` is the canonicalizer run after every
//! top-level diff; the semantic and efficiency passes are opt-in and trade
//! minimality for readability or downstream processing cost.

use super::{common_overlap, common_prefix, common_suffix, Diff, Op};

/// Canonicalize a script: coalesce same-op runs, factor shared affixes out
/// of delete/insert pairs, drop empty tuples and slide lone edits over their
/// equal neighbours. Runs to a fixed point.
pub(crate) fn merge(diffs: &mut Vec<Diff>) {
    loop {
        merge_pass(diffs);
        if !slide_pass(diffs) {
            break;
        }
    }
}

// One rebuild sweep. Pending deletions and insertions accumulate until an
// equality flushes them; a trailing sentinel equality flushes the tail.
fn merge_pass(diffs: &mut Vec<Diff>) {
    let mut merged: Vec<Diff> = Vec::with_capacity(diffs.len());
    let mut del: Vec<char> = Vec::new();
    let mut ins: Vec<char> = Vec::new();

    for diff in diffs.drain(..).chain(std::iter::once(Diff::equal(""))) {
        match diff.op {
            Op::Delete => del.extend_from_slice(&diff.text),
            Op::Insert => ins.extend_from_slice(&diff.text),
            Op::Equal => {
                let mut eq = diff.text;
                flush_edits(&mut merged, &mut del, &mut ins, &mut eq);
                if eq.is_empty() {
                    continue;
                }
                match merged.last_mut() {
                    Some(prev) if prev.op == Op::Equal => prev.extend(&eq),
                    _ => merged.push(Diff::raw(Op::Equal, &eq)),
                }
            }
        }
    }

    *diffs = merged;
}

fn flush_edits(out: &mut Vec<Diff>, del: &mut Vec<char>, ins: &mut Vec<char>, next_eq: &mut Vec<char>) {
    if !del.is_empty() && !ins.is_empty() {
        // A shared prefix belongs to the preceding equality.
        let prefix = common_prefix(ins, del);
        if prefix > 0 {
            match out.last_mut() {
                Some(prev) if prev.op == Op::Equal => prev.extend(&ins[..prefix]),
                _ => out.insert(0, Diff::raw(Op::Equal, &ins[..prefix])),
            }
            del.drain(..prefix);
            ins.drain(..prefix);
        }
        // A shared suffix belongs to the following one.
        let suffix = common_suffix(ins, del);
        if suffix > 0 {
            let mut joined: Vec<char> = ins[ins.len() - suffix..].to_vec();
            joined.append(next_eq);
            *next_eq = joined;
            ins.truncate(ins.len() - suffix);
            del.truncate(del.len() - suffix);
        }
    }
    if !del.is_empty() {
        out.push(Diff::raw(Op::Delete, del));
        del.clear();
    }
    if !ins.is_empty() {
        out.push(Diff::raw(Op::Insert, ins));
        ins.clear();
    }
}

// Single edits surrounded by equalities can sometimes be shifted sideways
// to eliminate one of the equalities, e.g. A<ins>BA</ins>C -> <ins>AB</ins>AC.
fn slide_pass(diffs: &mut Vec<Diff>) -> bool {
    let mut changed = false;
    let mut pointer = 1;

    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == Op::Equal && diffs[pointer + 1].op == Op::Equal {
            let prev = diffs[pointer - 1].text.clone();
            let edit = diffs[pointer].text.clone();
            let next = diffs[pointer + 1].text.clone();

            if edit.ends_with(&prev) {
                // Shift the edit over the previous equality.
                let mut slid = prev.clone();
                slid.extend_from_slice(&edit[..edit.len() - prev.len()]);
                let mut grown = prev;
                grown.extend_from_slice(&next);
                diffs[pointer].text = slid;
                diffs[pointer + 1].text = grown;
                diffs.remove(pointer - 1);
                changed = true;
            } else if edit.starts_with(&next) {
                // Shift the edit over the next equality.
                diffs[pointer - 1].extend(&next);
                let mut slid = edit[next.len()..].to_vec();
                slid.extend_from_slice(&next);
                diffs[pointer].text = slid;
                diffs.remove(pointer + 1);
                changed = true;
            }
        }
        pointer += 1;
    }

    changed
}

/// Reduce the number of edits by eliminating semantically trivial
/// equalities, then extract overlaps between adjacent delete/insert pairs.
pub(crate) fn semantic(diffs: &mut Vec<Diff>) {
    let mut changes = false;
    // Indices of equalities still eligible for elimination.
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_eq: Option<Vec<char>> = None;
    // Chars edited on either side of the most recent equality.
    let mut ins_before = 0;
    let mut del_before = 0;
    let mut ins_after = 0;
    let mut del_after = 0;

    let mut pointer = 0;
    while pointer < diffs.len() {
        if diffs[pointer].op == Op::Equal {
            equalities.push(pointer);
            ins_before = ins_after;
            del_before = del_after;
            ins_after = 0;
            del_after = 0;
            last_eq = Some(diffs[pointer].text.clone());
            pointer += 1;
            continue;
        }

        if diffs[pointer].op == Op::Insert {
            ins_after += diffs[pointer].len();
        } else {
            del_after += diffs[pointer].len();
        }

        // An equality dominated by the edits on both sides of it is noise.
        let doomed = last_eq.as_ref().is_some_and(|eq| {
            eq.len() <= ins_before.max(del_before) && eq.len() <= ins_after.max(del_after)
        });
        if doomed {
            if let (Some(eq), Some(&site)) = (last_eq.take(), equalities.last()) {
                // Rewrite the equality as a delete + insert pair.
                diffs[site].op = Op::Insert;
                diffs.insert(site, Diff::raw(Op::Delete, &eq));

                equalities.pop(); // the one just rewritten
                equalities.pop(); // the previous one needs another look
                pointer = equalities.last().map_or(0, |&e| e + 1);
                ins_before = 0;
                del_before = 0;
                ins_after = 0;
                del_after = 0;
                changes = true;
                continue;
            }
        }
        pointer += 1;
    }

    if changes {
        merge(diffs);
    }
    semantic_lossless(diffs);

    // Extract overlaps between adjacent delete/insert pairs:
    // <del>abcxxx</del><ins>xxxdef</ins> -> <del>abc</del>xxx<ins>def</ins>
    // <del>xxxabc</del><ins>defxxx</ins> -> <ins>def</ins>xxx<del>abc</del>
    // Only when the overlap is as big as the edit ahead or behind it.
    let mut pointer = 1;
    while pointer < diffs.len() {
        if diffs[pointer - 1].op == Op::Delete && diffs[pointer].op == Op::Insert {
            let deletion = diffs[pointer - 1].text.clone();
            let insertion = diffs[pointer].text.clone();
            let overlap1 = common_overlap(&deletion, &insertion);
            let overlap2 = common_overlap(&insertion, &deletion);
            let del_half = deletion.len() / 2 + deletion.len() % 2;
            let ins_half = insertion.len() / 2 + insertion.len() % 2;

            if overlap1 >= overlap2 {
                if overlap1 >= del_half || overlap1 >= ins_half {
                    diffs.insert(pointer, Diff::raw(Op::Equal, &insertion[..overlap1]));
                    diffs[pointer - 1] =
                        Diff::raw(Op::Delete, &deletion[..deletion.len() - overlap1]);
                    diffs[pointer + 1] = Diff::raw(Op::Insert, &insertion[overlap1..]);
                    pointer += 1;
                }
            } else if overlap2 >= del_half || overlap2 >= ins_half {
                // Reversed overlap: swap the edit order around the equality.
                diffs.insert(pointer, Diff::raw(Op::Equal, &deletion[..overlap2]));
                diffs[pointer - 1] =
                    Diff::raw(Op::Insert, &insertion[..insertion.len() - overlap2]);
                diffs[pointer + 1] = Diff::raw(Op::Delete, &deletion[overlap2..]);
                pointer += 1;
            }
            pointer += 1;
        }
        pointer += 1;
    }
}

/// Slide single edits flanked by equalities towards the best logical
/// boundary. Purely cosmetic, loses no information.
pub(crate) fn semantic_lossless(diffs: &mut Vec<Diff>) {
    let mut pointer = 1;

    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == Op::Equal && diffs[pointer + 1].op == Op::Equal {
            let mut prev = diffs[pointer - 1].text.clone();
            let mut edit = diffs[pointer].text.clone();
            let mut next = diffs[pointer + 1].text.clone();

            // First, shift the edit as far left as it will go.
            let shift = common_suffix(&prev, &edit);
            if shift > 0 {
                let moved: Vec<char> = edit[edit.len() - shift..].to_vec();
                prev.truncate(prev.len() - shift);
                edit.truncate(edit.len() - shift);
                edit.splice(0..0, moved.iter().copied());
                next.splice(0..0, moved.into_iter());
            }

            // Then step right one char at a time, keeping the best scoring
            // position. `>=` favors trailing over leading whitespace.
            let mut best_prev = prev.clone();
            let mut best_edit = edit.clone();
            let mut best_next = next.clone();
            let mut best_score = boundary_score(&prev, &edit) + boundary_score(&edit, &next);

            while !edit.is_empty() && !next.is_empty() && edit[0] == next[0] {
                prev.push(edit[0]);
                edit.remove(0);
                edit.push(next[0]);
                next.remove(0);

                let score = boundary_score(&prev, &edit) + boundary_score(&edit, &next);
                if score >= best_score {
                    best_score = score;
                    best_prev.clone_from(&prev);
                    best_edit.clone_from(&edit);
                    best_next.clone_from(&next);
                }
            }

            if diffs[pointer - 1].text != best_prev {
                // An improvement was found.
                if best_prev.is_empty() {
                    diffs.remove(pointer - 1);
                    pointer -= 1;
                } else {
                    diffs[pointer - 1].text = best_prev;
                }
                diffs[pointer].text = best_edit;
                if best_next.is_empty() {
                    diffs.remove(pointer + 1);
                    pointer = pointer.saturating_sub(1);
                } else {
                    diffs[pointer + 1].text = best_next;
                }
            }
        }
        pointer += 1;
    }
}

// Score how nicely the boundary between `one` and `two` falls on logical
// edges: 6 edge, 5 blank line, 4 line break, 3 end of sentence,
// 2 whitespace, 1 non-alphanumeric, 0 none of these.
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&char1), Some(&char2)) = (one.last(), two.first()) else {
        return 6;
    };

    let whitespace1 = char1.is_whitespace();
    let whitespace2 = char2.is_whitespace();
    let linebreak1 = whitespace1 && (char1 == '\n' || char1 == '\r');
    let linebreak2 = whitespace2 && (char2 == '\n' || char2 == '\r');
    let blankline1 = linebreak1 && (one.ends_with(&['\n', '\n']) || one.ends_with(&['\n', '\r', '\n']));
    let blankline2 = linebreak2
        && (two.starts_with(&['\n', '\n'])
            || two.starts_with(&['\r', '\n', '\n'])
            || two.starts_with(&['\n', '\r', '\n'])
            || two.starts_with(&['\r', '\n', '\r', '\n']));

    if blankline1 || blankline2 {
        5
    } else if linebreak1 || linebreak2 {
        4
    } else if !char1.is_alphanumeric() && !whitespace1 && whitespace2 {
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if !char1.is_alphanumeric() || !char2.is_alphanumeric() {
        1
    } else {
        0
    }
}

/// Fold equalities cheaper than an edit boundary into their neighbours.
/// An equality shorter than `edit_cost` flanked by edits of both kinds, or
/// shorter than `edit_cost / 2` with three of the four surrounding edit
/// flags set, costs more to keep than to split.
pub(crate) fn efficiency(diffs: &mut Vec<Diff>, edit_cost: usize) {
    if diffs.is_empty() {
        return;
    }

    let mut changes = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_eq: Option<Vec<char>> = None;
    // Edit kinds seen before and after the candidate equality.
    let mut pre_ins = false;
    let mut pre_del = false;
    let mut post_ins = false;
    let mut post_del = false;

    let mut pointer = 0;
    while pointer < diffs.len() {
        if diffs[pointer].op == Op::Equal {
            if diffs[pointer].len() < edit_cost && (post_ins || post_del) {
                // Candidate found.
                equalities.push(pointer);
                pre_ins = post_ins;
                pre_del = post_del;
                last_eq = Some(diffs[pointer].text.clone());
            } else {
                // Not a candidate, and can never become one.
                equalities.clear();
                last_eq = None;
            }
            post_ins = false;
            post_del = false;
            pointer += 1;
            continue;
        }

        if diffs[pointer].op == Op::Delete {
            post_del = true;
        } else {
            post_ins = true;
        }

        let doomed = last_eq.as_ref().is_some_and(|eq| {
            (pre_ins && pre_del && post_ins && post_del)
                || (eq.len() < edit_cost / 2
                    && usize::from(pre_ins)
                        + usize::from(pre_del)
                        + usize::from(post_ins)
                        + usize::from(post_del)
                        == 3)
        });
        if doomed {
            if let (Some(eq), Some(site)) = (last_eq.take(), equalities.pop()) {
                diffs[site].op = Op::Insert;
                diffs.insert(site, Diff::raw(Op::Delete, &eq));
                changes = true;

                if pre_ins && pre_del {
                    // No changes made that could affect previous entries.
                    post_ins = true;
                    post_del = true;
                    equalities.clear();
                } else {
                    equalities.pop(); // the previous equality needs another look
                    pointer = equalities.last().map_or(0, |&e| e + 1);
                    post_ins = false;
                    post_del = false;
                    continue;
                }
            }
        }
        pointer += 1;
    }

    if changes {
        merge(diffs);
    }
}
