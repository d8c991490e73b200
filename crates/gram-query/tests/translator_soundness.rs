mod common;

use gram_query::{GramConfig, GramQuery, GramQueryError, RegexTranslator};
use regex::Regex;

const DOCS: &[&str] = &[
    "",
    "xyz",
    "aaaa",
    "ababab",
    "abcabcabc",
    "abcdwxyz",
    "hello world",
    "Hello World",
    "HELLO",
    "helllllo there",
    "foobarbaz",
    "fooquxbar",
    "int main(void) { return 0; }",
    "int  main",
    "mississippi",
    "misiss",
    "data: abc-123-def",
    "datum: abc",
    "the textdb engine stores grams",
    "straße Kelvin",
    "strasse Kellvin",
];

const PATTERNS: &[&str] = &[
    "textdb",
    "abcd|wxyz",
    "hel+o",
    "(?i)hello",
    r"int\s+main",
    "foo(bar|qux)",
    "(abc)+",
    "(ab){3}",
    "a[bc]c",
    "[a-c]{3}",
    "miss?iss",
    r"\d+-\d+",
    "x*yz",
    "^hello",
    "world$",
    r"\bmain\b",
    "s{2}i",
    "(foo|bar)baz",
    ".*db",
    "a.c",
    "Kel+vin",
    "(?i)k",
    "dat(a|um): abc",
    "stra(ß|ss)e",
    "(hello|HELLO) (world|there)?",
    "(a|b)(c|d)(e|f)(g|h)",
];

fn translator(gram_length: usize, fold_case: bool) -> RegexTranslator {
    RegexTranslator::new(GramConfig {
        gram_length,
        fold_case,
        ..GramConfig::default()
    })
    .unwrap()
}

// A document the regex matches must never be filtered out.
fn assert_sound(t: &RegexTranslator, fold: bool) {
    let n = t.config().gram_length;
    for pattern in PATTERNS {
        let re = Regex::new(pattern).unwrap();
        let query = t.translate(pattern).unwrap();
        for doc in DOCS {
            if !re.is_match(doc) {
                continue;
            }
            let text = if fold { doc.to_lowercase() } else { doc.to_string() };
            let grams = common::doc_grams(&text, n);
            assert!(
                common::admits(&query, &grams),
                "n={} pattern {:?} matches {:?} but query {} rejects it",
                n,
                pattern,
                doc,
                query
            );
        }
    }
}

#[test]
fn matching_documents_are_never_filtered() {
    for n in 2..=4 {
        assert_sound(&translator(n, false), false);
    }
}

#[test]
fn folded_grams_stay_sound() {
    assert_sound(&translator(3, true), true);
}

#[test]
fn literal_queries_filter_unrelated_documents() {
    let t = translator(3, false);
    let query = t.translate("textdb").unwrap();
    let rejected = DOCS
        .iter()
        .filter(|d| !common::admits(&query, &common::doc_grams(d, 3)))
        .count();
    assert_eq!(rejected, DOCS.len() - 1);
}

#[test]
fn translation_is_deterministic() {
    let a = translator(3, false);
    let b = translator(3, false);
    for pattern in PATTERNS {
        let qa = a.translate_to_query_string(pattern).unwrap();
        let qb = b.translate_to_query_string(pattern).unwrap();
        assert_eq!(qa, qb, "{}", pattern);
        assert!(!qa.is_empty());
    }
}

#[test]
fn translators_with_different_lengths_run_side_by_side() {
    std::thread::scope(|s| {
        let handles: Vec<_> = (2..=5)
            .map(|n| {
                s.spawn(move || {
                    let t = translator(n, false);
                    (n, t.translate("abcdef").unwrap())
                })
            })
            .collect();
        for h in handles {
            let (n, q) = h.join().unwrap();
            let leaves = match q {
                GramQuery::And(c) => c.len(),
                other => panic!("expected AND for n={}, got {:?}", n, other),
            };
            assert_eq!(leaves, 7 - n);
        }
    });
}

#[test]
fn malformed_patterns_are_reported() {
    let t = translator(3, false);
    for bad in ["(abc", "a{2,1}", "[z-a]"] {
        assert!(matches!(t.translate(bad), Err(GramQueryError::RegexParse(_))), "{}", bad);
    }
}

#[test]
fn library_default_entry_point() {
    assert_eq!(gram_query::regex_to_query_string("abcd").unwrap(), "(abc AND bcd)");
    assert_eq!(gram_query::regex_to_query_string("a|b").unwrap(), "*:*");
}

#[test]
fn shared_types_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GramQuery>();
    assert_send_sync::<gram_query::GramBuilder>();
    assert_send_sync::<RegexTranslator>();
}
