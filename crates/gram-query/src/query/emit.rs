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

use std::fmt;

use super::ast::GramQuery;

/// Lucene's match-all-documents query. Emitted when no gram constraint could
/// be derived, which makes the index fall back to a full scan.
pub const MATCH_ALL_TOKEN: &str = "*:*";

impl GramQuery {
    /// Boolean query string for the index: `TERM`, `(A AND B ...)`,
    /// `(A OR B ...)` or [`MATCH_ALL_TOKEN`].
    pub fn to_query_string(&self) -> String {
        self.to_query_string_with(MATCH_ALL_TOKEN)
    }

    /// Same as [`to_query_string`](Self::to_query_string) with a custom
    /// match-all token.
    pub fn to_query_string_with(&self, match_all: &str) -> String {
        let s = render(self);
        if s.is_empty() {
            match_all.to_string()
        } else {
            s
        }
    }

    /// Indented one-node-per-line view of the tree.
    pub fn pretty_tree(&self) -> String {
        let mut out = String::new();
        write_tree(self, 0, &mut out);
        out
    }
}

impl fmt::Display for GramQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn render(query: &GramQuery) -> String {
    match query {
        GramQuery::Any | GramQuery::None => String::new(),
        GramQuery::Leaf(gram) => gram.clone(),
        GramQuery::And(children) => render_junction(children.iter(), " AND "),
        GramQuery::Or(children) => render_junction(children.iter(), " OR "),
    }
}

fn render_junction<'a>(children: impl Iterator<Item = &'a GramQuery>, sep: &str) -> String {
    let parts: Vec<String> = children.map(render).filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        return String::new();
    }
    format!("({})", parts.join(sep))
}

fn write_tree(query: &GramQuery, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match query {
        GramQuery::Leaf(gram) => out.push_str(gram),
        other => out.push_str(&other.op().to_string()),
    }
    out.push('\n');
    if let Some(children) = query.children() {
        for child in children {
            write_tree(child, depth + 1, out);
        }
    }
}
