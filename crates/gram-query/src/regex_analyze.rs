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

//! Regex analysis deriving a gram query for index prefiltering.
//!
//! Every HIR node is summarized by what the strings it matches look like:
//! whether the empty string is possible, the exact set of matched strings
//! while that set stays small, and otherwise sets of possible prefixes and
//! suffixes. Before any of that information is thrown away it is ANDed into
//! the accumulated [`GramQuery`], so the final query holds for every string
//! the regex can match.

use regex_syntax::hir::{Class, Hir, HirKind};
use regex_syntax::ParserBuilder;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::GramConfig;
use crate::error::GramQueryError;
use crate::gram::{char_len, char_prefix, char_suffix};
use crate::query::{GramBuilder, GramQuery};

type StringSet = BTreeSet<String>;

/// Exact sets larger than this are turned into prefix/suffix sets.
const MAX_EXACT: usize = 7;
/// Prefix/suffix sets larger than this are trimmed to shorter strings.
const MAX_SET: usize = 20;
/// Character classes with more members than this match "any char".
const MAX_CLASS: usize = 100;

#[derive(Debug, Clone)]
struct RegexInfo {
    can_empty: bool,
    exact: Option<StringSet>,
    prefix: StringSet,
    suffix: StringSet,
    query: GramQuery,
}

impl RegexInfo {
    fn unknown() -> Self {
        Self {
            can_empty: false,
            exact: None,
            prefix: StringSet::new(),
            suffix: StringSet::new(),
            query: GramQuery::Any,
        }
    }

    fn any_match() -> Self {
        Self {
            can_empty: true,
            prefix: StringSet::from([String::new()]),
            suffix: StringSet::from([String::new()]),
            ..Self::unknown()
        }
    }

    fn any_char() -> Self {
        Self {
            can_empty: false,
            ..Self::any_match()
        }
    }

    fn no_match() -> Self {
        Self {
            query: GramQuery::None,
            ..Self::unknown()
        }
    }

    fn empty_string() -> Self {
        Self {
            can_empty: true,
            exact: Some(StringSet::from([String::new()])),
            ..Self::unknown()
        }
    }

    fn exact(strings: StringSet) -> Self {
        Self {
            can_empty: strings.contains(""),
            exact: Some(strings),
            ..Self::unknown()
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Prefix,
    Suffix,
}

/// Turns regex patterns into normalized gram queries.
///
/// All settings live on the instance, so independent translators can run on
/// different threads with different gram lengths.
#[derive(Debug, Clone)]
pub struct RegexTranslator {
    config: GramConfig,
    builder: GramBuilder,
}

impl RegexTranslator {
    pub fn new(config: GramConfig) -> Result<Self, GramQueryError> {
        config.validate()?;
        let builder = GramBuilder::new(config.gram_length)?;
        Ok(Self { config, builder })
    }

    pub fn config(&self) -> &GramConfig {
        &self.config
    }

    pub fn builder(&self) -> &GramBuilder {
        &self.builder
    }

    /// Parse `pattern` and return its normalized gram query. `Any` means no
    /// gram constraint could be derived.
    pub fn translate(&self, pattern: &str) -> Result<GramQuery, GramQueryError> {
        let hir = ParserBuilder::new()
            .nest_limit(self.config.nest_limit)
            .build()
            .parse(pattern)?;
        let raw = self.analyze_root(&hir);
        debug!(pattern, raw = %raw, "derived gram query");
        self.normalize(&raw)
    }

    /// [`translate`](Self::translate) followed by emission with the
    /// configured match-all token.
    pub fn translate_to_query_string(&self, pattern: &str) -> Result<String, GramQueryError> {
        Ok(self
            .translate(pattern)?
            .to_query_string_with(&self.config.match_all_token))
    }

    /// DNF-normalize and simplify an arbitrary tree. `Any`/`None` pass
    /// through untouched. When expansion exceeds `max_disjuncts` the input
    /// tree is kept as is; it is still a sound filter, just not canonical.
    pub fn normalize(&self, query: &GramQuery) -> Result<GramQuery, GramQueryError> {
        if matches!(query, GramQuery::Any | GramQuery::None) {
            return Ok(query.clone());
        }
        let normalized = match query.to_dnf_bounded(self.config.max_disjuncts) {
            Ok(dnf) => dnf.simplify_dnf(),
            Err(GramQueryError::DisjunctLimitExceeded { limit }) => {
                warn!(limit, "dnf expansion over disjunct limit; keeping unnormalized query");
                query.clone()
            }
            Err(e) => return Err(e),
        };
        normalized.validate()?;
        Ok(normalized)
    }

    fn analyze_root(&self, hir: &Hir) -> GramQuery {
        let mut info = self.analyze(hir);
        self.simplify(&mut info, true);
        self.add_exact(&mut info);
        info.query
    }

    fn analyze(&self, hir: &Hir) -> RegexInfo {
        let mut info = match hir.kind() {
            HirKind::Empty | HirKind::Look(_) => RegexInfo::empty_string(),
            HirKind::Literal(lit) => match std::str::from_utf8(&lit.0) {
                Ok(text) => RegexInfo::exact(StringSet::from([self.fold(text)])),
                Err(_) => RegexInfo::any_char(),
            },
            HirKind::Class(class) => self.class_info(class),
            HirKind::Capture(cap) => self.analyze(&cap.sub),
            HirKind::Repetition(rep) => {
                if rep.min == 0 {
                    RegexInfo::any_match()
                } else {
                    let mut sub = self.analyze(&rep.sub);
                    if rep.max == Some(rep.min) && rep.min as usize <= MAX_EXACT {
                        // x{n}: n copies back to back
                        let once = sub.clone();
                        for _ in 1..rep.min {
                            sub = self.concat(sub, once.clone());
                        }
                    } else if let Some(exact) = sub.exact.take() {
                        // x+ and friends: at least one copy, unknown count
                        sub.prefix = exact.clone();
                        sub.suffix = exact;
                    }
                    sub
                }
            }
            HirKind::Concat(subs) => self.fold_subs(subs, RegexInfo::empty_string(), Self::concat),
            HirKind::Alternation(subs) => {
                self.fold_subs(subs, RegexInfo::no_match(), Self::alternate)
            }
        };
        self.simplify(&mut info, false);
        info
    }

    fn fold_subs(
        &self,
        subs: &[Hir],
        zero: RegexInfo,
        f: fn(&Self, RegexInfo, RegexInfo) -> RegexInfo,
    ) -> RegexInfo {
        let mut iter = subs.iter();
        let first = match iter.next() {
            Some(h) => self.analyze(h),
            None => return zero,
        };
        iter.fold(first, |acc, h| f(self, acc, self.analyze(h)))
    }

    fn class_info(&self, class: &Class) -> RegexInfo {
        let mut members = StringSet::new();
        match class {
            Class::Unicode(cls) => {
                for range in cls.ranges() {
                    let span = (range.end() as usize) - (range.start() as usize) + 1;
                    if members.len() + span > MAX_CLASS {
                        return RegexInfo::any_char();
                    }
                    for c in range.start()..=range.end() {
                        members.insert(self.fold(c.encode_utf8(&mut [0u8; 4])));
                    }
                }
            }
            Class::Bytes(cls) => {
                for range in cls.ranges() {
                    if !range.end().is_ascii() {
                        return RegexInfo::any_char();
                    }
                    let span = (range.end() - range.start()) as usize + 1;
                    if members.len() + span > MAX_CLASS {
                        return RegexInfo::any_char();
                    }
                    for b in range.start()..=range.end() {
                        members.insert(self.fold(&char::from(b).to_string()));
                    }
                }
            }
        }
        if members.is_empty() {
            return RegexInfo::no_match();
        }
        RegexInfo::exact(members)
    }

    fn concat(&self, x: RegexInfo, y: RegexInfo) -> RegexInfo {
        let n = self.builder.gram_length().get();
        let mut xy = RegexInfo::unknown();
        xy.query = x.query.and(&y.query);

        if let (Some(xe), Some(ye)) = (&x.exact, &y.exact) {
            xy.exact = Some(cross(xe, ye));
        } else {
            match &x.exact {
                Some(xe) => xy.prefix = cross(xe, &y.prefix),
                None => {
                    xy.prefix = x.prefix.clone();
                    if x.can_empty {
                        xy.prefix.extend(y.prefix.iter().cloned());
                    }
                }
            }
            match &y.exact {
                Some(ye) => xy.suffix = cross(&x.suffix, ye),
                None => {
                    xy.suffix = y.suffix.clone();
                    if y.can_empty {
                        xy.suffix.extend(x.suffix.iter().cloned());
                    }
                }
            }
        }
        xy.can_empty = x.can_empty && y.can_empty;

        // Grams spanning the boundary between x and y are not covered by
        // either side's prefix or suffix sets yet.
        if x.exact.is_none()
            && y.exact.is_none()
            && x.suffix.len() <= MAX_SET
            && y.prefix.len() <= MAX_SET
            && min_len(&x.suffix) + min_len(&y.prefix) >= n
        {
            xy.query = self
                .builder
                .combine(&xy.query, &cross(&x.suffix, &y.prefix));
        }

        self.simplify(&mut xy, false);
        xy
    }

    fn alternate(&self, mut x: RegexInfo, mut y: RegexInfo) -> RegexInfo {
        let mut xy = RegexInfo::unknown();
        match (x.exact.take(), y.exact.take()) {
            (Some(xe), Some(ye)) => {
                xy.exact = Some(&xe | &ye);
            }
            (Some(xe), None) => {
                xy.prefix = &xe | &y.prefix;
                xy.suffix = &xe | &y.suffix;
                x.query = self.builder.combine(&x.query, &xe);
            }
            (None, Some(ye)) => {
                xy.prefix = &x.prefix | &ye;
                xy.suffix = &x.suffix | &ye;
                y.query = self.builder.combine(&y.query, &ye);
            }
            (None, None) => {
                xy.prefix = &x.prefix | &y.prefix;
                xy.suffix = &x.suffix | &y.suffix;
            }
        }
        xy.can_empty = x.can_empty || y.can_empty;
        xy.query = x.query.or(&y.query);
        self.simplify(&mut xy, false);
        xy
    }

    fn simplify(&self, info: &mut RegexInfo, force: bool) {
        let n = self.builder.gram_length().get();
        if let Some(exact) = info.exact.take() {
            let shortest = min_len(&exact);
            if exact.len() > MAX_EXACT || (force && shortest >= n) || shortest > n {
                info.query = self.builder.combine(&info.query, &exact);
                for s in &exact {
                    if char_len(s) < n {
                        info.prefix.insert(s.clone());
                        info.suffix.insert(s.clone());
                    } else {
                        info.prefix.insert(char_prefix(s, n - 1).to_string());
                        info.suffix.insert(char_suffix(s, n - 1).to_string());
                    }
                }
            } else {
                info.exact = Some(exact);
            }
        }
        if info.exact.is_none() {
            let prefix = std::mem::take(&mut info.prefix);
            info.prefix = self.simplify_set(&mut info.query, prefix, Side::Prefix);
            let suffix = std::mem::take(&mut info.suffix);
            info.suffix = self.simplify_set(&mut info.query, suffix, Side::Suffix);
        }
    }

    // Record the set in the query, then shorten its strings until it is small
    // enough, and drop members made redundant by a shorter one.
    fn simplify_set(&self, query: &mut GramQuery, set: StringSet, side: Side) -> StringSet {
        let n = self.builder.gram_length().get();
        *query = self.builder.combine(query, &set);

        let mut current = set;
        let mut k = n;
        while k >= 1 && (k == n || current.len() > MAX_SET) {
            current = current
                .into_iter()
                .map(|s| {
                    if char_len(&s) >= k {
                        match side {
                            Side::Prefix => char_prefix(&s, k - 1).to_string(),
                            Side::Suffix => char_suffix(&s, k - 1).to_string(),
                        }
                    } else {
                        s
                    }
                })
                .collect();
            k -= 1;
        }
        prune_redundant(current, side)
    }

    fn add_exact(&self, info: &mut RegexInfo) {
        if let Some(exact) = &info.exact {
            info.query = self.builder.combine(&info.query, exact);
        }
    }

    fn fold(&self, text: &str) -> String {
        if self.config.fold_case {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }
}

fn cross(xs: &StringSet, ys: &StringSet) -> StringSet {
    let mut out = StringSet::new();
    for x in xs {
        for y in ys {
            out.insert(format!("{}{}", x, y));
        }
    }
    out
}

fn min_len(set: &StringSet) -> usize {
    set.iter().map(|s| char_len(s)).min().unwrap_or(0)
}

// Knowing "ab" is a possible prefix makes "abc" useless; same for suffixes.
fn prune_redundant(set: StringSet, side: Side) -> StringSet {
    let mut ordered: Vec<String> = set.into_iter().collect();
    if let Side::Suffix = side {
        ordered.sort_by_key(|s| s.chars().rev().collect::<String>());
    }
    let mut kept: Vec<String> = Vec::with_capacity(ordered.len());
    for s in ordered {
        let redundant = kept.last().is_some_and(|prev| match side {
            Side::Prefix => s.starts_with(prev.as_str()),
            Side::Suffix => s.ends_with(prev.as_str()),
        });
        if !redundant {
            kept.push(s);
        }
    }
    kept.into_iter().collect()
}
