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

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;

use crate::error::GramQueryError;
use crate::gram::{char_len, grams, DEFAULT_GRAM_LENGTH};

/// Boolean filter over gram terms.
///
/// Children of `And`/`Or` form a set: order is irrelevant and duplicates
/// collapse, so two trees built along different paths compare (and hash)
/// equal whenever they have the same operator and the same child sets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GramQuery {
    /// Matches no string.
    None,
    /// Matches every string; no filtering benefit.
    Any,
    /// A single gram term.
    Leaf(String),
    And(BTreeSet<GramQuery>),
    Or(BTreeSet<GramQuery>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOp {
    None,
    Any,
    Leaf,
    And,
    Or,
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryOp::None => "NONE",
            QueryOp::Any => "ANY",
            QueryOp::Leaf => "LEAF",
            QueryOp::And => "AND",
            QueryOp::Or => "OR",
        };
        f.write_str(s)
    }
}

impl GramQuery {
    pub fn leaf(gram: impl Into<String>) -> Self {
        GramQuery::Leaf(gram.into())
    }

    pub fn op(&self) -> QueryOp {
        match self {
            GramQuery::None => QueryOp::None,
            GramQuery::Any => QueryOp::Any,
            GramQuery::Leaf(_) => QueryOp::Leaf,
            GramQuery::And(_) => QueryOp::And,
            GramQuery::Or(_) => QueryOp::Or,
        }
    }

    /// Child set of an `And`/`Or` node.
    pub fn children(&self) -> Option<&BTreeSet<GramQuery>> {
        match self {
            GramQuery::And(c) | GramQuery::Or(c) => Some(c),
            _ => None,
        }
    }

    /// True when the tree carries no gram term at all: an empty leaf, or a
    /// node whose children are all empty. `Any` and `None` are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            GramQuery::Leaf(gram) => gram.is_empty(),
            GramQuery::And(c) | GramQuery::Or(c) => c.iter().all(GramQuery::is_empty),
            GramQuery::None | GramQuery::Any => true,
        }
    }

    /// Fail-fast structural check. `Any`/`None` are only legal at the root,
    /// leaves need a literal and `And`/`Or` need children.
    pub fn validate(&self) -> Result<(), GramQueryError> {
        match self {
            GramQuery::None | GramQuery::Any => Ok(()),
            GramQuery::Leaf(gram) if gram.is_empty() => Err(GramQueryError::StructuralViolation(
                "leaf with empty literal".to_string(),
            )),
            GramQuery::Leaf(_) => Ok(()),
            GramQuery::And(children) | GramQuery::Or(children) => {
                if children.is_empty() {
                    return Err(GramQueryError::StructuralViolation(format!(
                        "{} node without children",
                        self.op()
                    )));
                }
                for child in children {
                    if matches!(child, GramQuery::Any | GramQuery::None) {
                        return Err(GramQueryError::StructuralViolation(format!(
                            "{} nested inside {}",
                            child.op(),
                            self.op()
                        )));
                    }
                    child.validate()?;
                }
                Ok(())
            }
        }
    }
}

/// Builds query trees from literals for a fixed gram length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GramBuilder {
    gram_length: NonZeroUsize,
}

impl Default for GramBuilder {
    fn default() -> Self {
        Self::with_length(DEFAULT_GRAM_LENGTH)
    }
}

impl GramBuilder {
    /// Rejects a gram length of zero.
    pub fn new(gram_length: usize) -> Result<Self, GramQueryError> {
        NonZeroUsize::new(gram_length)
            .map(Self::with_length)
            .ok_or_else(|| {
                GramQueryError::InvalidConfiguration("gram length must be at least 1".to_string())
            })
    }

    pub fn with_length(gram_length: NonZeroUsize) -> Self {
        Self { gram_length }
    }

    pub fn gram_length(&self) -> NonZeroUsize {
        self.gram_length
    }

    pub fn leaf(&self, gram: impl Into<String>) -> GramQuery {
        GramQuery::leaf(gram)
    }

    /// AND of the literal's grams, or `Any` when the literal is too short to
    /// yield one: an unconstrained literal must not turn into "match nothing".
    pub fn literal_node(&self, literal: &str) -> GramQuery {
        let children: BTreeSet<GramQuery> = grams(literal, self.gram_length)
            .map(GramQuery::leaf)
            .collect();
        if children.is_empty() {
            GramQuery::Any
        } else {
            GramQuery::And(children)
        }
    }

    /// OR of [`literal_node`](Self::literal_node) over the alternatives.
    /// A single alternative shorter than the gram length bypasses every gram
    /// test, so the whole disjunction becomes `Any` (as does an empty list).
    pub fn alternation_node<I, S>(&self, literals: I) -> GramQuery
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let literals: Vec<S> = literals.into_iter().collect();
        let shortest = literals.iter().map(|l| char_len(l.as_ref())).min();
        match shortest {
            Some(len) if len >= self.gram_length.get() => GramQuery::Or(
                literals
                    .iter()
                    .map(|l| self.literal_node(l.as_ref()))
                    .collect(),
            ),
            _ => GramQuery::Any,
        }
    }

    /// `query AND alternation_node(literals)`.
    pub fn combine<I, S>(&self, query: &GramQuery, literals: I) -> GramQuery
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        query.and(&self.alternation_node(literals))
    }
}
