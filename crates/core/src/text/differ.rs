//! Word sequence diff.
//!
//! Words are compared by their NFC-normalized text so that two revisions which
//! encode the same glyphs differently (precomposed vs. combining accents) do
//! not produce spurious changes.

use similar::{Algorithm, DiffTag, capture_diff_slices};
use unicode_normalization::UnicodeNormalization;

use super::{TextDiffer, Word, WordDiff};

/// Myers diff over the page's word sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordDiffer;

impl WordDiffer {
    fn keys(words: &[Word]) -> Vec<String> {
        words.iter().map(|w| w.text.nfc().collect()).collect()
    }
}

impl TextDiffer for WordDiffer {
    fn diff(&self, old: &[Word], new: &[Word]) -> Vec<WordDiff> {
        let old_keys = Self::keys(old);
        let new_keys = Self::keys(new);

        let mut diffs = Vec::new();
        let ops = capture_diff_slices(Algorithm::Myers, old_keys.as_slice(), new_keys.as_slice());
        for op in ops {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            if tag == DiffTag::Equal {
                continue;
            }
            // Replacements report the removed words before the added ones.
            diffs.extend(
                old[old_range]
                    .iter()
                    .map(|w| WordDiff::removed(w.text.clone(), w.bbox)),
            );
            diffs.extend(
                new[new_range]
                    .iter()
                    .map(|w| WordDiff::added(w.text.clone(), w.bbox)),
            );
        }
        diffs
    }
}
