mod common;

use std::sync::Arc;

use common::store;
use pawmatch_application::SearchStateEngine;
use pawmatch_core::search::{Filter, FilterUpdate, PageCursor, SortDirection, SortField, SortOrder};
use pawmatch_core::storage::{KeyValueStore, KeyValueStoreExt, PersistedKey};
use pawmatch_core::validation::ZIP_ERROR;
use pawmatch_infrastructure::InMemoryKeyValueStore;

#[test]
fn test_fresh_engine_has_defaults() {
    let engine = SearchStateEngine::restore(store());

    assert_eq!(engine.filter(), &Filter::default());
    assert_eq!(engine.cursor(), PageCursor::FIRST);
    assert!(engine.favorites().is_empty());
    assert_eq!(engine.zip_input(), "");
    assert!(engine.zip_error().is_none());
}

#[test]
fn test_filter_change_resets_page_and_persists() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());
    engine.change_page(5).unwrap();

    engine.update_filter(FilterUpdate::breeds(["Beagle"])).unwrap();

    assert_eq!(engine.cursor().page(), 1);
    assert_eq!(store.get("currentPage").unwrap().as_deref(), Some("1"));
    let persisted: Filter = store.read_json(PersistedKey::SearchFilters).unwrap().unwrap();
    assert_eq!(&persisted, engine.filter());
}

#[test]
fn test_page_size_change_resets_page() {
    let mut engine = SearchStateEngine::restore(store());
    engine.change_page(3).unwrap();

    engine.update_filter(FilterUpdate::page_size(50)).unwrap();

    assert_eq!(engine.cursor().page(), 1);
    assert_eq!(engine.query().size, 50);
    assert_eq!(engine.query().from, 0);
}

#[test]
fn test_page_change_leaves_filter_alone() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());
    engine.update_filter(FilterUpdate::sort(SortOrder::new(SortField::Name, SortDirection::Desc))).unwrap();
    let filter = engine.filter().clone();

    engine.change_page(3).unwrap();

    assert_eq!(engine.filter(), &filter);
    assert_eq!(engine.query().from, 40);
    assert_eq!(store.get("currentPage").unwrap().as_deref(), Some("3"));
}

#[test]
fn test_page_zero_rejected() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());

    let err = engine.change_page(0).unwrap_err();

    assert_eq!(err.field(), Some("page"));
    assert_eq!(engine.cursor().page(), 1);
    assert!(store.is_empty());
}

#[test]
fn test_age_range_always_ordered() {
    let mut engine = SearchStateEngine::restore(store());

    engine.update_filter(FilterUpdate::age_range(14, 2)).unwrap();
    assert_eq!((engine.filter().age_min, engine.filter().age_max), (2, 14));

    engine
        .update_filter(FilterUpdate {
            age_max: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert!(engine.filter().age_min <= engine.filter().age_max);
}

#[test]
fn test_invalid_zip_records_error_and_writes_nothing() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());
    engine.set_zip_code("10001").unwrap();
    let filter = engine.filter().clone();

    let err = engine.set_zip_code("1234a").unwrap_err();

    assert_eq!(err.field(), Some("zipCode"));
    assert_eq!(engine.zip_error(), Some(ZIP_ERROR));
    assert_eq!(engine.filter(), &filter);
    assert_eq!(store.get("zipCode").unwrap().as_deref(), Some("10001"));
}

#[test]
fn test_valid_zip_sets_filter_and_clears_error() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());
    engine.set_zip_code("abc").unwrap_err();
    engine.change_page(2).unwrap();

    engine.set_zip_code(" 02139 ").unwrap();

    assert!(engine.zip_error().is_none());
    assert_eq!(engine.filter().zip_codes, Some(vec!["02139".to_string()]));
    assert_eq!(engine.cursor().page(), 1);
    assert_eq!(engine.query().zip_codes, vec!["02139".to_string()]);
    assert_eq!(store.get("zipCode").unwrap().as_deref(), Some("02139"));
}

#[test]
fn test_empty_zip_removes_criterion() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());
    engine.set_zip_code("02139").unwrap();

    engine.set_zip_code("").unwrap();

    assert!(engine.filter().zip_codes.is_none());
    assert_eq!(store.get("zipCode").unwrap(), None);
}

#[test]
fn test_zip_filter_update_keeps_zip_input_in_step() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());
    engine.set_zip_code("bad").unwrap_err();

    engine
        .update_filter(FilterUpdate::zip_codes(Some(vec!["10001".into(), "02139".into()])))
        .unwrap();

    assert_eq!(engine.zip_input(), "10001");
    assert!(engine.zip_error().is_none());
    assert_eq!(store.get("zipCode").unwrap().as_deref(), Some("10001"));

    let restored = SearchStateEngine::restore(store.clone());
    assert_eq!(restored.zip_input(), "10001");
    assert_eq!(
        restored.filter().zip_codes,
        Some(vec!["10001".to_string(), "02139".to_string()])
    );

    engine.update_filter(FilterUpdate::zip_codes(None)).unwrap();
    assert_eq!(engine.zip_input(), "");
    assert_eq!(store.get("zipCode").unwrap(), None);
}

#[test]
fn test_clear_all_keeps_favorites() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());
    engine.update_filter(FilterUpdate::breeds(["Pug"])).unwrap();
    engine.set_zip_code("02139").unwrap();
    engine.change_page(4).unwrap();
    engine.toggle_favorite("dog-1").unwrap();

    engine.clear_all().unwrap();

    assert_eq!(engine.filter(), &Filter::default());
    assert_eq!(engine.cursor(), PageCursor::FIRST);
    assert_eq!(engine.zip_input(), "");
    for key in PersistedKey::SEARCH {
        assert_eq!(store.read_raw(key).unwrap(), None);
    }
    assert!(engine.favorites().contains("dog-1"));
    assert_eq!(store.get("favorites").unwrap().as_deref(), Some(r#"["dog-1"]"#));
}

#[test]
fn test_favorite_toggle_collapses() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());

    engine.toggle_favorite("A").unwrap();
    assert_eq!(engine.favorites().ids(), vec!["A"]);

    engine.toggle_favorite("B").unwrap();
    assert!(engine.favorites().is_empty());
    assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[]"));

    engine.toggle_favorite("B").unwrap();
    engine.clear_favorite().unwrap();
    assert!(engine.favorites().is_empty());
}

#[test]
fn test_state_survives_restore() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());
    engine.update_filter(FilterUpdate::breeds(["Akita", "Pug"])).unwrap();
    engine.update_filter(FilterUpdate::age_range(3, 8)).unwrap();
    engine.set_zip_code("94103").unwrap();
    engine.change_page(6).unwrap();
    engine.toggle_favorite("dog-42").unwrap();

    let restored = SearchStateEngine::restore(store);

    assert_eq!(restored.filter(), engine.filter());
    assert_eq!(restored.cursor().page(), 6);
    assert_eq!(restored.zip_input(), "94103");
    assert!(restored.favorites().contains("dog-42"));
    assert_eq!(restored.page_key(), engine.page_key());
}

#[test]
fn test_unparsable_values_fall_back_to_defaults() {
    let store = Arc::new(InMemoryKeyValueStore::with_entries([
        ("searchFilters", "{broken"),
        ("currentPage", "zero"),
        ("favorites", "42"),
        ("zipCode", "not-a-zip"),
    ]));

    let engine = SearchStateEngine::restore(store);

    assert_eq!(engine.filter(), &Filter::default());
    assert_eq!(engine.cursor(), PageCursor::FIRST);
    assert!(engine.favorites().is_empty());
    assert_eq!(engine.zip_input(), "");
}

#[test]
fn test_invariant_violating_values_are_repaired() {
    let store = Arc::new(InMemoryKeyValueStore::with_entries([
        ("searchFilters", r#"{"ageMin":12,"ageMax":4,"size":0,"zipCodes":["1"]}"#),
        ("currentPage", "0"),
        ("favorites", r#"["a","b"]"#),
    ]));

    let engine = SearchStateEngine::restore(store);

    assert_eq!((engine.filter().age_min, engine.filter().age_max), (4, 12));
    assert_eq!(engine.filter().page_size, 20);
    assert!(engine.filter().zip_codes.is_none());
    assert_eq!(engine.cursor(), PageCursor::FIRST);
    assert_eq!(engine.favorites().len(), 1);
}

#[test]
fn test_query_and_total_pages() {
    let mut engine = SearchStateEngine::restore(store());
    engine.update_filter(FilterUpdate::page_size(25)).unwrap();
    engine.change_page(2).unwrap();

    let query = engine.query();
    assert!(query.breeds.is_empty());
    assert_eq!(query.from, 25);
    assert_eq!(query.sort.to_string(), "breed:asc");
    assert!(!query.to_pairs().iter().any(|(k, _)| *k == "breeds"));

    assert_eq!(engine.total_pages(0), 0);
    assert_eq!(engine.total_pages(26), 2);
}

#[test]
fn test_storage_failure_is_reported() {
    let store = store();
    let mut engine = SearchStateEngine::restore(store.clone());
    store.fail_writes(true);

    let err = engine.toggle_favorite("dog-1").unwrap_err();
    assert!(matches!(err, pawmatch_core::PawError::Storage(_)));
}
