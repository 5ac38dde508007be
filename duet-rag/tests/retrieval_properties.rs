use duet_rag::{KeywordRetriever, Tip, TipStore, render_tips};
use proptest::prelude::*;
use std::io::Write;
use std::sync::Arc;

fn retriever() -> KeywordRetriever {
    KeywordRetriever::new(Arc::new(TipStore::default()))
}

proptest! {
    #[test]
    fn output_is_never_empty(query in ".{0,64}") {
        let r = retriever();
        prop_assert!(!r.search(&query).is_empty());
        prop_assert!(!r.render(&query).is_empty());
    }

    #[test]
    fn digit_only_queries_fall_back_to_full_store(query in "[0-9]{3,8}( [0-9]{3,8}){0,3}") {
        // The default tips contain no three-digit runs.
        let r = retriever();
        prop_assert_eq!(r.render(&query), render_tips(r.store().tips()));
    }

    #[test]
    fn every_match_shares_a_query_word(query in "[a-z]{2,6}( [a-z]{2,6}){0,2}") {
        let r = retriever();
        let tips = r.search(&query);
        if tips.len() < r.store().len() {
            for tip in tips {
                let content = tip.content.to_lowercase();
                prop_assert!(query.split_whitespace().any(|w| content.contains(w)));
            }
        }
    }
}

#[test]
fn hiit_workout_includes_fitness_guru() {
    let rendered = retriever().render("HIIT workout");
    assert!(rendered.lines().any(|line| {
        line.starts_with("Source: Fitness Guru =>") && line.contains("HIIT workout")
    }));
}

#[test]
fn custom_store_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[tips]]
id = "r1"
content = "Replace running shoes every 500 miles."
source = "Running Coach"

[[tips]]
id = "r2"
content = "Add one rest day per week."
source = "Recovery Lab"
"#
    )
    .unwrap();

    let store = TipStore::load(file.path()).unwrap();
    let r = KeywordRetriever::new(Arc::new(store));
    assert_eq!(
        r.render("shoes"),
        "Source: Running Coach => Replace running shoes every 500 miles."
    );
    assert_eq!(r.search("yoga").len(), 2);
}

#[test]
fn missing_file_is_io_error() {
    let err = TipStore::load("/definitely/not/here/tips.toml").unwrap_err();
    assert!(matches!(err, duet_core::DuetError::Io(_)));
}

#[test]
fn constructed_store_preserves_order() {
    let store =
        TipStore::new(vec![Tip::new("b", "Second.", "B"), Tip::new("a", "First.", "A")]).unwrap();
    assert_eq!(render_tips(store.tips()), "Source: B => Second.\nSource: A => First.");
}
