mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockCatalog, store};
use pawmatch_application::SessionManager;
use pawmatch_core::session::{Access, Credentials, Route};
use pawmatch_core::storage::{KeyValueStore, KeyValueStoreExt, PersistedKey};
use pawmatch_infrastructure::InMemoryKeyValueStore;

fn ada() -> Credentials {
    Credentials::new("Ada Lovelace", "ada@example.com")
}

fn seeded_store() -> Arc<InMemoryKeyValueStore> {
    Arc::new(InMemoryKeyValueStore::with_entries([
        ("user", r#"{"name":"Ada Lovelace","email":"ada@example.com"}"#),
        ("searchFilters", r#"{"breeds":["Pug"],"ageMin":1,"ageMax":9,"sort":"age:desc","size":10}"#),
        ("currentPage", "4"),
        ("favorites", r#"["dog-9"]"#),
        ("zipCode", "02139"),
    ]))
}

#[tokio::test]
async fn test_initialize_with_valid_session_restores_user() {
    let api = Arc::new(MockCatalog::with_valid_session());
    let store = seeded_store();
    let manager = SessionManager::new(api, store.clone());

    assert_eq!(manager.access(), Access::Loading);
    manager.initialize().await;

    let snapshot = manager.snapshot();
    assert!(snapshot.authenticated);
    assert!(!snapshot.is_loading_initial_check);
    assert_eq!(snapshot.credentials, Some(ada()));
    assert_eq!(snapshot.route, Route::Search);
    assert_eq!(manager.access(), Access::Granted);
}

#[tokio::test]
async fn test_initialize_with_valid_session_drops_unparsable_user() {
    let api = Arc::new(MockCatalog::with_valid_session());
    let store = Arc::new(InMemoryKeyValueStore::with_entries([("user", "{not json")]));
    let manager = SessionManager::new(api, store.clone());

    manager.initialize().await;

    let snapshot = manager.snapshot();
    assert!(snapshot.authenticated);
    assert!(snapshot.credentials.is_none());
    assert_eq!(store.get("user").unwrap(), None);
}

#[tokio::test]
async fn test_initialize_with_invalid_session_forgets_user() {
    let api = Arc::new(MockCatalog::new());
    let store = seeded_store();
    let manager = SessionManager::new(api, store.clone());

    manager.initialize().await;

    let snapshot = manager.snapshot();
    assert!(!snapshot.authenticated);
    assert!(snapshot.credentials.is_none());
    assert_eq!(snapshot.route, Route::Entry);
    assert_eq!(manager.access(), Access::Redirect);
    assert_eq!(store.get("user").unwrap(), None);
    // Search state is not touched by the initial check
    assert_eq!(store.get("currentPage").unwrap().as_deref(), Some("4"));
}

#[tokio::test]
async fn test_login_validates_before_network() {
    let api = Arc::new(MockCatalog::new());
    let manager = SessionManager::new(api.clone(), store());

    let err = manager
        .login(Credentials::new("Ada", "not-an-email"))
        .await
        .unwrap_err();

    assert_eq!(err.field(), Some("email"));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_login_success_persists_user() {
    let api = Arc::new(MockCatalog::new());
    let store = store();
    let manager = SessionManager::new(api.clone(), store.clone());
    manager.initialize().await;

    manager.login(ada()).await.unwrap();

    let snapshot = manager.snapshot();
    assert!(snapshot.authenticated);
    assert_eq!(snapshot.credentials, Some(ada()));
    assert_eq!(snapshot.route, Route::Search);
    assert!(snapshot.last_validated_at.is_some());

    let persisted: Option<Credentials> = store.read_json(PersistedKey::User).unwrap();
    assert_eq!(persisted, Some(ada()));
}

#[tokio::test]
async fn test_login_failure_leaves_state_untouched() {
    let api = Arc::new(MockCatalog::new());
    api.fail_login.store(true, std::sync::atomic::Ordering::SeqCst);
    let store = store();
    let manager = SessionManager::new(api, store.clone());
    manager.initialize().await;
    let before = manager.snapshot();

    let err = manager.login(ada()).await.unwrap_err();

    assert!(err.is_authentication());
    assert_eq!(err.user_message(), "Login failed. Please try again.");
    assert_eq!(manager.snapshot(), before);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_logout_clears_everything_even_when_remote_fails() {
    let api = Arc::new(MockCatalog::with_valid_session());
    api.fail_logout.store(true, std::sync::atomic::Ordering::SeqCst);
    let store = seeded_store();
    let manager = SessionManager::new(api.clone(), store.clone());
    manager.initialize().await;
    assert!(manager.snapshot().authenticated);

    manager.logout().await;

    assert_eq!(api.calls_to("logout"), 1);
    let snapshot = manager.snapshot();
    assert!(!snapshot.authenticated);
    assert!(snapshot.credentials.is_none());
    assert_eq!(snapshot.route, Route::Entry);
    for key in PersistedKey::ALL {
        assert_eq!(store.read_raw(key).unwrap(), None, "{} survived logout", key.as_str());
    }
}

#[tokio::test]
async fn test_subscribers_see_transitions() {
    let api = Arc::new(MockCatalog::new());
    let manager = SessionManager::new(api, store());
    let mut rx = manager.subscribe();

    manager.initialize().await;
    manager.login(ada()).await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().authenticated);
}

#[tokio::test(start_paused = true)]
async fn test_revalidation_expiry_logs_out_without_user_action() {
    let api = Arc::new(MockCatalog::with_valid_session());
    let store = seeded_store();
    let manager = Arc::new(
        SessionManager::new(api.clone(), store.clone())
            .with_revalidate_interval(Duration::from_secs(300)),
    );
    manager.initialize().await;
    manager.start_revalidation();
    assert!(manager.is_revalidating());

    // The cookie expires server-side
    api.set_session_valid(false);

    let mut rx = manager.subscribe();
    tokio::time::sleep(Duration::from_secs(301)).await;
    rx.wait_for(|s| !s.authenticated).await.unwrap();

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.route, Route::Entry);
    assert!(snapshot.credentials.is_none());
    assert!(store.is_empty());
    assert_eq!(api.calls_to("logout"), 0);

    manager.stop_revalidation();
    assert!(!manager.is_revalidating());
}

#[tokio::test(start_paused = true)]
async fn test_revalidation_adopts_session_that_became_valid() {
    let api = Arc::new(MockCatalog::new());
    let store = Arc::new(InMemoryKeyValueStore::new());
    let manager = Arc::new(
        SessionManager::new(api.clone(), store.clone())
            .with_revalidate_interval(Duration::from_secs(60)),
    );
    manager.initialize().await;
    assert!(!manager.snapshot().authenticated);

    // Another client logged in and left the user behind
    store.write_json(PersistedKey::User, &ada()).unwrap();
    api.set_session_valid(true);

    manager.start_revalidation();
    let mut rx = manager.subscribe();
    rx.wait_for(|s| s.authenticated).await.unwrap();

    assert_eq!(manager.snapshot().credentials, Some(ada()));
    assert_eq!(manager.snapshot().route, Route::Search);
}

#[tokio::test(start_paused = true)]
async fn test_revalidation_ticks_on_interval() {
    let api = Arc::new(MockCatalog::with_valid_session());
    let manager = Arc::new(
        SessionManager::new(api.clone(), store()).with_revalidate_interval(Duration::from_secs(60)),
    );
    manager.initialize().await;
    assert_eq!(api.calls_to("breeds"), 1);

    manager.start_revalidation();
    // A second start is ignored
    manager.start_revalidation();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.calls_to("breeds"), 1);

    tokio::time::sleep(Duration::from_secs(100)).await;
    assert_eq!(api.calls_to("breeds"), 3);

    manager.stop_revalidation();
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(api.calls_to("breeds"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_manager_stops_revalidation() {
    let api = Arc::new(MockCatalog::with_valid_session());
    let manager = Arc::new(
        SessionManager::new(api.clone(), store()).with_revalidate_interval(Duration::from_secs(60)),
    );
    manager.start_revalidation();

    drop(manager);
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert_eq!(api.calls_to("breeds"), 0);
}
