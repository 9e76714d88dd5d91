//! End-to-end behaviour of search and suggestions over a seeded store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use docsearch::{
    Constraint, Document, FieldMappings, FieldType, FieldValue, IndexStore, Query, QueryConfig,
    QueryEngine, SortOrder, SortSpec, SuggestRequest,
};
use serde_json::json;

fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.to_string())
}

fn released(y: i32, m: u32, d: u32) -> FieldValue {
    FieldValue::Date(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
}

/// Albums with release dates; "d" has none.
fn releases() -> (QueryEngine, String) {
    let store = Arc::new(IndexStore::new());
    let id = store
        .create_index(
            "releases",
            FieldMappings::new()
                .with_field("title", FieldType::Text)
                .with_field("released", FieldType::Date),
        )
        .unwrap();
    store
        .add_documents(
            &id,
            vec![
                Document::new("a")
                    .with_field("title", text("winter album"))
                    .with_field("released", released(2023, 11, 30)),
                Document::new("b")
                    .with_field("title", text("spring album"))
                    .with_field("released", released(2024, 3, 1)),
                Document::new("c")
                    .with_field("title", text("autumn album"))
                    .with_field("released", released(2024, 9, 15)),
                Document::new("d").with_field("title", text("lost album")),
            ],
        )
        .unwrap();
    let engine = QueryEngine::new(store, QueryConfig::default()).unwrap();
    (engine, id)
}

fn catalogue() -> (Arc<IndexStore>, QueryEngine, String) {
    let store = Arc::new(IndexStore::new());
    let id = store
        .create_index(
            "catalogue",
            FieldMappings::new().with_field("title", FieldType::Text),
        )
        .unwrap();
    store
        .add_documents(
            &id,
            vec![
                Document::new("1").with_field("title", text("red shoes")),
                Document::new("2").with_field("title", text("blue shoes")),
                Document::new("3").with_field("title", text("red hat")),
            ],
        )
        .unwrap();
    let engine = QueryEngine::new(store.clone(), QueryConfig::default()).unwrap();
    (store, engine, id)
}

/// Forty documents with a mix of terms, categories and prices.
fn larger() -> (QueryEngine, String) {
    let store = Arc::new(IndexStore::new());
    let id = store
        .create_index(
            "larger",
            FieldMappings::new()
                .with_field("body", FieldType::Text)
                .with_field("category", FieldType::Keyword)
                .with_field("price", FieldType::Number),
        )
        .unwrap();
    let words = ["alpha", "beta", "gamma", "delta"];
    let docs = (0..40)
        .map(|i| {
            let body = format!(
                "{} {} {}",
                words[i % 4],
                words[(i / 4) % 4],
                if i % 3 == 0 { "alpha" } else { "omega" }
            );
            Document::new(format!("doc-{i:02}"))
                .with_field("body", text(&body))
                .with_field(
                    "category",
                    FieldValue::Keyword(if i % 2 == 0 { "even" } else { "odd" }.into()),
                )
                .with_field("price", FieldValue::Number((i % 7) as f64))
        })
        .collect();
    store.add_documents(&id, docs).unwrap();
    (QueryEngine::new(store, QueryConfig::default()).unwrap(), id)
}

#[test]
fn catalogue_example() {
    let (_store, engine, id) = catalogue();
    let results = engine
        .execute(&Query::new(id.clone()).with_term("shoes").with_page(1, 10))
        .unwrap();
    assert_eq!(results.ids(), vec!["1", "2"]);
    assert_eq!(results.total, 2);

    let suggestions = engine
        .suggest(&SuggestRequest::new(id, "title", "red", 5))
        .unwrap();
    assert_eq!(suggestions, vec!["red hat", "red shoes"]);
}

#[test]
fn far_page_is_empty_but_total_is_kept() {
    let (_store, engine, id) = catalogue();
    let results = engine
        .execute(&Query::new(id).with_term("shoes").with_page(100, 10))
        .unwrap();
    assert!(results.hits.is_empty());
    assert_eq!(results.total, 2);
}

#[test]
fn first_page_length_is_min_of_limit_and_total() {
    let (engine, id) = larger();
    for limit in [1, 3, 10, 25, 100] {
        let results = engine
            .execute(&Query::new(id.clone()).with_term("alpha").with_page(1, limit))
            .unwrap();
        assert_eq!(results.hits.len(), limit.min(results.total), "limit {limit}");
    }
}

#[test]
fn total_is_independent_of_pagination() {
    let (engine, id) = larger();
    let base = Query::new(id)
        .with_term("alpha omega")
        .with_filter("category", Constraint::equals("even"));
    let totals: Vec<usize> = [(1, 1), (2, 5), (3, 7), (50, 100)]
        .into_iter()
        .map(|(page, size)| {
            engine
                .execute(&base.clone().with_page(page, size))
                .unwrap()
                .total
        })
        .collect();
    assert!(totals.windows(2).all(|w| w[0] == w[1]), "{totals:?}");
    assert_eq!(totals[0], 20);
}

#[test]
fn pages_concatenate_to_the_full_sequence() {
    let (engine, id) = larger();
    let base = Query::new(id).with_term("beta gamma");
    let full = engine.execute(&base.clone().with_page(1, 100)).unwrap();
    let mut stitched = Vec::new();
    for page in 1.. {
        let results = engine.execute(&base.clone().with_page(page, 7)).unwrap();
        if results.hits.is_empty() {
            break;
        }
        stitched.extend(results.hits.into_iter().map(|h| h.id));
    }
    let expected: Vec<String> = full.hits.into_iter().map(|h| h.id).collect();
    assert_eq!(stitched, expected);
}

#[test]
fn repeated_execution_is_identical() {
    let (engine, id) = larger();
    let query = Query::new(id)
        .with_term("delta alpha")
        .with_filter("price", Constraint::range(Some(json!(1)), Some(json!(5))))
        .with_page(1, 50);
    let first = engine.execute(&query).unwrap();
    for _ in 0..5 {
        let again = engine.execute(&query).unwrap();
        assert_eq!(again.hits, first.hits);
        assert_eq!(again.total, first.total);
    }
}

#[test]
fn equal_sort_keys_fall_back_to_id() {
    let (engine, id) = larger();
    let results = engine
        .execute(
            &Query::new(id)
                .sorted_by(SortSpec::by_field("category", SortOrder::Asc))
                .with_page(1, 100),
        )
        .unwrap();
    let evens: Vec<&str> = results.hits[..20].iter().map(|h| h.id.as_str()).collect();
    let mut sorted = evens.clone();
    sorted.sort();
    assert_eq!(evens, sorted);
    assert!(results.hits[..20]
        .iter()
        .all(|h| h.fields["category"] == FieldValue::Keyword("even".into())));
}

#[test]
fn scores_are_non_increasing_under_default_sort() {
    let (engine, id) = larger();
    let results = engine
        .execute(&Query::new(id).with_term("gamma omega").with_page(1, 100))
        .unwrap();
    assert!(results.hits.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(results.hits.iter().all(|h| h.score >= 0.0));
}

#[test]
fn term_and_filters_both_required() {
    let (engine, id) = larger();
    let results = engine
        .execute(
            &Query::new(id)
                .with_term("alpha")
                .with_filter("category", Constraint::one_of(["odd"]))
                .with_filter("price", Constraint::range(None, Some(json!(3))))
                .with_page(1, 100),
        )
        .unwrap();
    assert!(results.total > 0);
    for hit in &results.hits {
        assert_eq!(hit.fields["category"], FieldValue::Keyword("odd".into()));
        let price = hit.fields["price"].as_number().unwrap();
        assert!(price <= 3.0);
        let body = hit.fields["body"].as_str().unwrap();
        assert!(body.split(' ').any(|w| w == "alpha"));
    }
}

#[test]
fn date_range_accepts_rfc3339_and_epoch_millis_bounds() {
    let (engine, id) = releases();
    let end_of_2024 = Utc
        .with_ymd_and_hms(2024, 12, 31, 23, 59, 59)
        .unwrap()
        .timestamp_millis();
    let results = engine
        .execute(
            &Query::new(id).with_filter(
                "released",
                Constraint::range(Some(json!("2024-01-01T00:00:00Z")), Some(json!(end_of_2024))),
            ),
        )
        .unwrap();
    assert_eq!(results.ids(), vec!["b", "c"]);
    assert_eq!(results.hits[0].fields["released"], released(2024, 3, 1));
}

#[test]
fn date_sort_puts_undated_documents_last() {
    let (engine, id) = releases();
    let newest_first = engine
        .execute(
            &Query::new(id.clone())
                .with_term("album")
                .sorted_by(SortSpec::by_field("released", SortOrder::Desc)),
        )
        .unwrap();
    assert_eq!(newest_first.ids(), vec!["c", "b", "a", "d"]);

    let oldest_first = engine
        .execute(&Query::new(id).sorted_by(SortSpec::by_field("released", SortOrder::Asc)))
        .unwrap();
    assert_eq!(oldest_first.ids(), vec!["a", "b", "c", "d"]);
}
