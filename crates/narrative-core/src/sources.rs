//! Source Deduplication
//!
//! Collapses citation lists to one entry per uri. Order follows the first
//! time a uri is seen; the title comes from the last occurrence.

use std::collections::HashMap;

use crate::model::GroundingSource;

/// Deduplicate sources by uri (first-seen order, last-write title).
pub fn dedupe(sources: Vec<GroundingSource>) -> Vec<GroundingSource> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(sources.len());
    let mut unique: Vec<GroundingSource> = Vec::with_capacity(sources.len());

    for source in sources {
        match index.get(&source.uri) {
            Some(&pos) => unique[pos].title = source.title,
            None => {
                index.insert(source.uri.clone(), unique.len());
                unique.push(source);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use proptest::prelude::*;

    use super::*;

    fn src(uri: &str, title: &str) -> GroundingSource {
        GroundingSource::new(uri, title)
    }

    fn sample() -> Vec<GroundingSource> {
        vec![
            src("https://x.com/a", "A"),
            src("https://dexscreener.com/pepe", "Dex"),
            src("https://x.com/a", "A2"),
            src("https://news.example/pepe", "News"),
            src("https://dexscreener.com/pepe", "Dex 2"),
        ]
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }

    #[test]
    fn test_first_seen_order_last_title() {
        let out = dedupe(sample());
        assert_eq!(
            out,
            vec![
                src("https://x.com/a", "A2"),
                src("https://dexscreener.com/pepe", "Dex 2"),
                src("https://news.example/pepe", "News"),
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let once = dedupe(sample());
        assert_eq!(dedupe(once.clone()), once);
    }

    #[test]
    fn test_unique_and_membership_preserved() {
        let input = sample();
        let input_uris: HashSet<_> = input.iter().map(|s| s.uri.clone()).collect();
        let out = dedupe(input);

        let out_uris: HashSet<_> = out.iter().map(|s| s.uri.clone()).collect();
        assert_eq!(out_uris.len(), out.len());
        assert_eq!(out_uris, input_uris);
    }

    /// Citation lists drawn from a small uri pool so duplicates are common
    fn citations() -> impl Strategy<Value = Vec<GroundingSource>> {
        prop::collection::vec((0usize..5, "[A-Za-z ]{1,8}"), 0..32).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(i, title)| src(&format!("https://x.com/status/{i}"), &title))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn dedupe_is_idempotent(input in citations()) {
            let once = dedupe(input);
            prop_assert_eq!(dedupe(once.clone()), once);
        }

        #[test]
        fn dedupe_keeps_each_uri_once(input in citations()) {
            let input_uris: HashSet<String> = input.iter().map(|s| s.uri.clone()).collect();
            let out = dedupe(input);

            let out_uris: HashSet<String> = out.iter().map(|s| s.uri.clone()).collect();
            prop_assert_eq!(out_uris.len(), out.len());
            prop_assert_eq!(out_uris, input_uris);
        }

        #[test]
        fn dedupe_orders_by_first_sighting_with_last_title(input in citations()) {
            let mut first_seen: Vec<String> = Vec::new();
            let mut last_title: HashMap<String, String> = HashMap::new();
            for source in &input {
                if !first_seen.contains(&source.uri) {
                    first_seen.push(source.uri.clone());
                }
                last_title.insert(source.uri.clone(), source.title.clone());
            }

            let out = dedupe(input);

            let out_order: Vec<String> = out.iter().map(|s| s.uri.clone()).collect();
            prop_assert_eq!(out_order, first_seen);
            for source in &out {
                prop_assert_eq!(Some(&source.title), last_title.get(&source.uri));
            }
        }
    }
}
