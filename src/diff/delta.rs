//! The compact delta serialization: `=N` keep, `-N` delete, `+TEXT` insert,
//! tab-separated, with inserted text percent-encoded.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::errors::Error;

use super::{Diff, Differ, Op};

// The set left intact matches what `encodeURI` leaves intact, plus the
// space character, which the wire format carries literally.
const ESCAPED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b' ')
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@')
    .remove(b'_')
    .remove(b'~');

pub(crate) fn encode_text(text: &str) -> String {
    utf8_percent_encode(text, ESCAPED).to_string()
}

// The percent-encoding crate passes malformed escapes through untouched;
// the wire format treats them as fatal, so hex pairs are checked by hand.
pub(crate) fn decode_text(token: &str) -> Result<String, Error> {
    let bytes = token.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16));
            let lo = bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16));
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    decoded.push((hi * 16 + lo) as u8);
                    i += 3;
                }
                _ => return Err(Error::InvalidEscape(token.to_string())),
            }
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(decoded).map_err(|_| Error::InvalidEscape(token.to_string()))
}

impl Differ {
    /// Crush a script into a delta string. The source text plus the delta
    /// are enough to rebuild the full script with [`Differ::from_delta`].
    pub fn to_delta(diffs: &[Diff]) -> String {
        let tokens: Vec<String> = diffs
            .iter()
            .map(|diff| match diff.op() {
                Op::Insert => format!("+{}", encode_text(&diff.text())),
                Op::Delete => format!("-{}", diff.len()),
                Op::Equal => format!("={}", diff.len()),
            })
            .collect();
        tokens.join("\t")
    }

    /// Rebuild a script from the source text and a delta produced by
    /// [`Differ::to_delta`].
    ///
    /// The `=`/`-` counts must consume `text1` exactly, otherwise the delta
    /// describes some other text and `InvalidDelta` is raised.
    pub fn from_delta(text1: &str, delta: &str) -> Result<Vec<Diff>, Error> {
        let chars: Vec<char> = text1.chars().collect();
        let mut pointer = 0;
        let mut diffs = Vec::new();

        for token in delta.split('\t') {
            let Some(opcode) = token.chars().next() else {
                // Blank tokens are ok (from a trailing \t).
                continue;
            };
            let param = &token[opcode.len_utf8()..];

            match opcode {
                '+' => diffs.push(Diff::new(Op::Insert, &decode_text(param)?)),
                '-' | '=' => {
                    let n: usize = param
                        .parse()
                        .map_err(|_| Error::InvalidDelta(format!("bad count in {token:?}")))?;
                    let end = pointer + n;
                    if end > chars.len() {
                        return Err(Error::InvalidDelta(format!(
                            "delta spans {end} chars, text has {}",
                            chars.len()
                        )));
                    }
                    let span = &chars[pointer..end];
                    pointer = end;
                    let op = if opcode == '=' { Op::Equal } else { Op::Delete };
                    diffs.push(Diff::raw(op, span));
                }
                _ => {
                    return Err(Error::InvalidDelta(format!(
                        "unknown operation in {token:?}"
                    )))
                }
            }
        }

        if pointer != chars.len() {
            return Err(Error::InvalidDelta(format!(
                "delta consumed {pointer} of {} chars",
                chars.len()
            )));
        }

        Ok(diffs)
    }
}
