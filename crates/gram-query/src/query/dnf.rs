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

//! Disjunctive Normal Form.
//!
//! Trees coming out of the translator are messy: nested ORs, ANDs over
//! alternations, the same gram reachable along several paths. Converting to
//! DNF (an OR of ANDs of leaves) and then applying absorption gives a
//! canonical shape so equivalent trees compare equal.
//!
//! Distribution is worst-case exponential: `(a1|b1) & (a2|b2) & ... & (ak|bk)`
//! expands to `2^k` disjuncts. [`GramQuery::to_dnf_bounded`] stops as soon as
//! the disjunct count passes a cap; bounding regex nesting depth is left to
//! the caller (the translator uses the parser's nest limit).

use std::collections::BTreeSet;

use super::ast::GramQuery;
use crate::error::GramQueryError;

type Disjuncts = BTreeSet<GramQuery>;

impl GramQuery {
    /// Convert to DNF. Always returns an `Or` whose children are leaves or
    /// ANDs of leaves. `Any` and `None` give an empty `Or`; callers must
    /// special-case them first.
    ///
    /// The result is not simplified; see [`GramQuery::simplify_dnf`].
    pub fn to_dnf(&self) -> GramQuery {
        match dnf_disjuncts(self, None) {
            Ok(disjuncts) => GramQuery::Or(disjuncts),
            Err(_) => unreachable!("unbounded expansion has no limit to exceed"),
        }
    }

    /// [`to_dnf`](Self::to_dnf) that fails once the disjunction would grow
    /// past `max_disjuncts` terms.
    pub fn to_dnf_bounded(&self, max_disjuncts: usize) -> Result<GramQuery, GramQueryError> {
        dnf_disjuncts(self, Some(max_disjuncts)).map(GramQuery::Or)
    }

    /// Simplify a DNF tree: drop disjuncts implied by another one
    /// (`a OR (a AND b) -> a`), then replace every single-child node by its
    /// child. The result is not necessarily DNF any more (a lone product
    /// comes back as a bare AND or leaf).
    pub fn simplify_dnf(&self) -> GramQuery {
        collapse_single_children(apply_absorption(self))
    }
}

fn dnf_disjuncts(query: &GramQuery, limit: Option<usize>) -> Result<Disjuncts, GramQueryError> {
    match query {
        GramQuery::None | GramQuery::Any => Ok(Disjuncts::new()),
        GramQuery::Leaf(_) => Ok(Disjuncts::from([query.clone()])),
        GramQuery::And(children) => {
            let mut acc = Disjuncts::new();
            for child in children {
                let right = dnf_disjuncts(child, limit)?;
                acc = dnf_conjunction(acc, right, limit)?;
            }
            Ok(acc)
        }
        GramQuery::Or(children) => {
            let mut acc = Disjuncts::new();
            for child in children {
                acc.extend(dnf_disjuncts(child, limit)?);
                check_limit(acc.len(), limit)?;
            }
            Ok(acc)
        }
    }
}

// (a OR b) AND (c OR d) = ac OR ad OR bc OR bd. An empty side is the identity.
fn dnf_conjunction(
    left: Disjuncts,
    right: Disjuncts,
    limit: Option<usize>,
) -> Result<Disjuncts, GramQueryError> {
    if left.is_empty() {
        return Ok(right);
    }
    if right.is_empty() {
        return Ok(left);
    }
    let mut out = Disjuncts::new();
    for l in &left {
        for r in &right {
            out.insert(l.and(r));
            check_limit(out.len(), limit)?;
        }
    }
    Ok(out)
}

fn check_limit(len: usize, limit: Option<usize>) -> Result<(), GramQueryError> {
    match limit {
        Some(limit) if len > limit => Err(GramQueryError::DisjunctLimitExceeded { limit }),
        _ => Ok(()),
    }
}

fn apply_absorption(query: &GramQuery) -> GramQuery {
    let disjuncts = match query {
        GramQuery::Or(d) => d,
        // a lone product has nothing to absorb
        other => return other.clone(),
    };
    let kept = disjuncts
        .iter()
        .filter(|d| !is_absorbed(d, disjuncts))
        .cloned()
        .collect();
    GramQuery::Or(kept)
}

fn is_absorbed(candidate: &GramQuery, disjuncts: &Disjuncts) -> bool {
    let own = match candidate {
        GramQuery::And(c) => c,
        _ => return false,
    };
    disjuncts
        .iter()
        .filter(|other| *other != candidate)
        .any(|other| match other {
            GramQuery::Leaf(_) => own.contains(other),
            GramQuery::And(theirs) => theirs.is_subset(own),
            _ => false,
        })
}

fn collapse_single_children(query: GramQuery) -> GramQuery {
    match query {
        GramQuery::And(children) => collapse_junction(children, GramQuery::And),
        GramQuery::Or(children) => collapse_junction(children, GramQuery::Or),
        other => other,
    }
}

fn collapse_junction(
    mut children: Disjuncts,
    wrap: fn(Disjuncts) -> GramQuery,
) -> GramQuery {
    if children.len() == 1 {
        if let Some(only) = children.pop_first() {
            return collapse_single_children(only);
        }
    }
    let mut collapsed: Disjuncts = children.into_iter().map(collapse_single_children).collect();
    // collapsing can make two children equal
    if collapsed.len() == 1 {
        if let Some(only) = collapsed.pop_first() {
            return only;
        }
    }
    wrap(collapsed)
}
