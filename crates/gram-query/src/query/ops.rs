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

use std::collections::BTreeSet;

use super::ast::GramQuery;

#[derive(Clone, Copy)]
enum Junction {
    And,
    Or,
}

impl Junction {
    fn wrap(self, children: BTreeSet<GramQuery>) -> GramQuery {
        match self {
            Junction::And => GramQuery::And(children),
            Junction::Or => GramQuery::Or(children),
        }
    }

    fn is_same(self, q: &GramQuery) -> bool {
        matches!(
            (self, q),
            (Junction::And, GramQuery::And(_)) | (Junction::Or, GramQuery::Or(_))
        )
    }

    /// Element that swallows the other operand (NONE for AND, ANY for OR).
    fn is_absorbing(self, q: &GramQuery) -> bool {
        matches!(
            (self, q),
            (Junction::And, GramQuery::None) | (Junction::Or, GramQuery::Any)
        )
    }

    /// Element that leaves the other operand unchanged.
    fn is_identity(self, q: &GramQuery) -> bool {
        matches!(
            (self, q),
            (Junction::And, GramQuery::Any) | (Junction::Or, GramQuery::None)
        )
    }
}

impl GramQuery {
    /// Conjunction of two trees. Inputs are borrowed and copied, never
    /// mutated, so a sub-tree can be reused across several combinations.
    pub fn and(&self, other: &GramQuery) -> GramQuery {
        junction(self, other, Junction::And)
    }

    /// Disjunction of two trees; see [`GramQuery::and`].
    pub fn or(&self, other: &GramQuery) -> GramQuery {
        junction(self, other, Junction::Or)
    }
}

fn junction(left: &GramQuery, right: &GramQuery, kind: Junction) -> GramQuery {
    if kind.is_absorbing(left) {
        return left.clone();
    }
    if kind.is_absorbing(right) {
        return right.clone();
    }
    if kind.is_identity(left) {
        return right.clone();
    }
    if kind.is_identity(right) {
        return left.clone();
    }

    let flat = |q: &GramQuery| kind.is_same(q) || matches!(q, GramQuery::Leaf(_));
    let mut children = BTreeSet::new();
    if (kind.is_same(left) || kind.is_same(right)) && flat(left) && flat(right) {
        merge_into(&mut children, left);
        merge_into(&mut children, right);
    } else {
        children.insert(left.clone());
        children.insert(right.clone());
    }
    kind.wrap(children)
}

// A leaf joins as one child; a same-operator node contributes its children.
fn merge_into(children: &mut BTreeSet<GramQuery>, q: &GramQuery) {
    match q {
        GramQuery::And(c) | GramQuery::Or(c) => children.extend(c.iter().cloned()),
        other => {
            children.insert(other.clone());
        }
    }
}
