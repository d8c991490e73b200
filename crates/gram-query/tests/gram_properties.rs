use std::num::NonZeroUsize;

use gram_query::{extract_grams, GramBuilder, GramQuery};

fn len(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn extraction_length_law() {
    let literals = ["", "a", "ab", "abc", "textdb", "mississippi", "naïve café", "日本語テキスト"];
    for literal in literals {
        let chars: Vec<char> = literal.chars().collect();
        for g in 1..=5 {
            let grams = extract_grams(literal, len(g));
            assert_eq!(
                grams.len(),
                (chars.len() + 1).saturating_sub(g),
                "{:?} with g={}",
                literal,
                g
            );
            for (i, gram) in grams.iter().enumerate() {
                let expect: String = chars[i..i + g].iter().collect();
                assert_eq!(gram, &expect);
                assert!(literal.contains(gram.as_str()));
            }
        }
    }
}

#[test]
fn short_literal_is_any() {
    let b = GramBuilder::new(3).unwrap();
    let q = b.literal_node("ab");
    assert_eq!(q, GramQuery::Any);
    assert_ne!(q, GramQuery::None);
    assert_ne!(q, GramQuery::And(Default::default()));
}

#[test]
fn custom_gram_length() {
    let b = GramBuilder::new(2).unwrap();
    let q = b.literal_node("abc");
    let expect: std::collections::BTreeSet<GramQuery> =
        ["ab", "bc"].into_iter().map(GramQuery::leaf).collect();
    assert_eq!(q, GramQuery::And(expect));
    assert!(GramBuilder::new(0).is_err());
}
