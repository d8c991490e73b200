#![allow(dead_code)]

use std::collections::HashSet;

use gram_query::{GramBuilder, GramQuery};

/// Every run of `n` consecutive chars in `doc`, the way an n-gram index
/// would record the document.
pub fn doc_grams(doc: &str, n: usize) -> HashSet<String> {
    let chars: Vec<char> = doc.chars().collect();
    if n == 0 || chars.len() < n {
        return HashSet::new();
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Evaluate a query against the gram set of one document.
pub fn admits(query: &GramQuery, grams: &HashSet<String>) -> bool {
    match query {
        GramQuery::Any => true,
        GramQuery::None => false,
        GramQuery::Leaf(g) => grams.contains(g),
        GramQuery::And(children) => children.iter().all(|c| admits(c, grams)),
        GramQuery::Or(children) => children.iter().any(|c| admits(c, grams)),
    }
}

/// A spread of tree shapes for algebraic property checks.
pub fn sample_trees() -> Vec<GramQuery> {
    let b = GramBuilder::default();
    let leaf = GramQuery::leaf;
    vec![
        GramQuery::Any,
        GramQuery::None,
        leaf("abc"),
        b.literal_node("abcdef"),
        b.literal_node("aaaa"),
        b.alternation_node(["abcd", "wxyz"]),
        b.alternation_node(["abc", "bcd", "cde"]),
        leaf("qrs").or(&b.literal_node("tuvw")),
        leaf("foo").and(&b.alternation_node(["barx", "bazy"])),
        b.alternation_node(["abcd", "efgh"])
            .and(&b.alternation_node(["ijkl", "mnop"]))
            .or(&leaf("zzz")),
    ]
}
