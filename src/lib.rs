//! Text differencing, fuzzy matching and drift-tolerant patching.
//!
//! Three engines compose into a layered toolkit:
//!
//! - [`Differ`] computes a minimal edit script between two strings (Myers
//!   bisection) and reshapes it with semantic and efficiency cleanups.
//! - [`Matcher`] locates a pattern in a haystack near an expected offset,
//!   tolerating errors (Bitap), scored by edit distance and drift.
//! - [`Patcher`] builds hunks from a script, serializes them, and applies
//!   them to text that has diverged since the diff was computed. It uses
//!   the other two engines to do so.
//!
//! All offsets and lengths count Unicode scalar values. Implementations
//! keyed to UTF-16 code units will disagree about coordinates on text with
//! supplementary-plane characters; deltas and patches exchanged with such
//! implementations are only compatible for text where the two units
//! coincide.
//!
//! ```
//! use fuzzpatch::{Differ, Patcher};
//!
//! # fn main() -> Result<(), fuzzpatch::Error> {
//! let patcher = Patcher::new();
//! let patches = patcher.make_from_texts(
//!     "The quick brown fox jumps over the lazy dog.",
//!     "That quick brown fox jumped over a lazy dog.",
//! )?;
//!
//! // The text has drifted, but the patch still lands.
//! let (patched, applied) =
//!     patcher.apply(&patches, "The quick red rabbit jumps over the tired tiger.")?;
//! assert_eq!("That quick red rabbit jumped over a tired tiger.", patched);
//! assert!(applied.iter().all(|&ok| ok));
//! # Ok(())
//! # }
//! ```

pub mod diff;
pub mod errors;
pub mod fuzzy;
pub mod patch;
mod util;

pub use diff::{Diff, Differ, Op};
pub use errors::Error;
pub use fuzzy::Matcher;
pub use patch::{Patch, Patcher};
