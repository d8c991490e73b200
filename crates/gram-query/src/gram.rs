// Copyright 2025 HyperZoekt Project
// Derived from sourcegraph/zoekt (https://github.com/sourcegraph/zoekt)
// Copyright 2016 Google Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Gram extraction utilities.
//! Literals are cut into overlapping fixed-length windows which become the
//! terms of the boolean prefilter query. Lengths count Unicode scalar values,
//! not bytes.

use std::num::NonZeroUsize;

/// Trigrams unless configured otherwise.
pub const DEFAULT_GRAM_LENGTH: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => unreachable!(),
};

/// Iterate the overlapping grams of `literal` from left to right. Yields
/// nothing when the literal is shorter than `gram_length`.
pub fn grams(literal: &str, gram_length: NonZeroUsize) -> impl Iterator<Item = &str> + '_ {
    let mut bounds: Vec<usize> = literal.char_indices().map(|(i, _)| i).collect();
    bounds.push(literal.len());
    GramIter {
        literal,
        bounds,
        n: gram_length.get(),
        i: 0,
    }
}

/// Owned form of [`grams`]: `max(0, len - n + 1)` contiguous substrings.
pub fn extract_grams(literal: &str, gram_length: NonZeroUsize) -> Vec<String> {
    grams(literal, gram_length).map(str::to_owned).collect()
}

struct GramIter<'a> {
    literal: &'a str,
    // byte offset of every char start, plus the end of the string
    bounds: Vec<usize>,
    n: usize,
    i: usize,
}

impl<'a> Iterator for GramIter<'a> {
    type Item = &'a str;
    fn next(&mut self) -> Option<Self::Item> {
        let end = *self.bounds.get(self.i + self.n)?;
        let start = self.bounds[self.i];
        self.i += 1;
        Some(&self.literal[start..end])
    }
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First `k` chars of `s` (all of `s` when shorter).
pub(crate) fn char_prefix(s: &str, k: usize) -> &str {
    match s.char_indices().nth(k) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Last `k` chars of `s` (all of `s` when shorter).
pub(crate) fn char_suffix(s: &str, k: usize) -> &str {
    let len = char_len(s);
    if k >= len {
        return s;
    }
    match s.char_indices().nth(len - k) {
        Some((i, _)) => &s[i..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: usize) -> NonZeroUsize {
        NonZeroUsize::new(v).unwrap()
    }

    #[test]
    fn basic_grams() {
        let v = extract_grams("textdb", DEFAULT_GRAM_LENGTH);
        assert_eq!(v, vec!["tex", "ext", "xtd", "tdb"]);
    }

    #[test]
    fn short_literal_has_no_grams() {
        assert!(extract_grams("ab", DEFAULT_GRAM_LENGTH).is_empty());
        assert!(extract_grams("", n(1)).is_empty());
        assert_eq!(extract_grams("abc", DEFAULT_GRAM_LENGTH), vec!["abc"]);
    }

    #[test]
    fn length_law_holds() {
        for lit in ["", "a", "ab", "abc", "abcdefgh", "日本語のテキスト", "aaaa"] {
            for g in 1..6 {
                let got = extract_grams(lit, n(g));
                let len = char_len(lit);
                assert_eq!(got.len(), (len + 1).saturating_sub(g), "{lit} / {g}");
                for gram in &got {
                    assert_eq!(char_len(gram), g);
                    assert!(lit.contains(gram.as_str()));
                }
            }
        }
    }

    #[test]
    fn multibyte_windows() {
        let v: Vec<&str> = grams("häßlich", n(3)).collect();
        assert_eq!(v[0], "häß");
        assert_eq!(v.last().copied(), Some("ich"));
        assert_eq!(v.len(), 5);
    }

    #[test]
    fn char_slicing() {
        assert_eq!(char_prefix("äbc", 2), "äb");
        assert_eq!(char_prefix("ab", 5), "ab");
        assert_eq!(char_suffix("abcä", 2), "cä");
        assert_eq!(char_suffix("ab", 5), "ab");
        assert_eq!(char_suffix("ab", 0), "");
        assert_eq!(char_prefix("ab", 0), "");
    }
}
