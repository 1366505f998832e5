//! Concurrency and fan-out ordering tests
//!
//! Tests cover:
//! - No lost updates between concurrent writers on the same document
//! - Broadcasts only after the triggering write is durable
//! - Failed mutations leave state untouched and never broadcast
//! - A caller that goes away mid-write does not cancel the write or broadcast
//! - New subscribers see the same view as a concurrent read

mod helpers;

use catalog_common::events::ClientMessage;
use catalog_server::ApiError;
use helpers::{
    file_service, service_with_product_backend, GatedBackend, ReadOnlyBackend, PRODUCTS_FILE,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_concurrent_inserts_both_survive() {
    let (_dir, service) = file_service();

    let (a, b) = tokio::join!(
        service.create_product(json!({"title": "A", "price": 1})),
        service.create_product(json!({"title": "B", "price": 2})),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.id, b.id);

    let titles: HashSet<String> = service
        .list_products()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, HashSet::from(["A".to_string(), "B".to_string()]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_writers_on_both_stores() {
    let (_dir, service) = file_service();

    let mut tasks = Vec::new();
    for i in 0..20 {
        let svc = service.clone();
        tasks.push(tokio::spawn(async move {
            svc
                .create_product(json!({"title": format!("p{i}"), "price": i}))
                .await
                .map(|p| p.id)
        }));
        let svc = service.clone();
        tasks.push(tokio::spawn(async move {
            svc
                .create_live(json!({"title": format!("l{i}")}))
                .await
                .map(|l| l.id)
        }));
    }

    let mut ids = HashSet::new();
    for task in tasks {
        assert!(ids.insert(task.await.unwrap().unwrap()));
    }

    let view = service.merged_view().await.unwrap();
    assert_eq!(view.products().count(), 20);
    assert_eq!(view.live_submissions().count(), 20);
    assert_eq!(view.len(), 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_to_different_fields_both_apply() {
    let (_dir, service) = file_service();
    let product = service
        .create_product(json!({"title": "Desk", "price": 100}))
        .await
        .unwrap();

    let (r1, r2) = tokio::join!(
        service.update_product(product.id, json!({"price": 80})),
        service.update_product(product.id, json!({"color": "oak"})),
    );
    r1.unwrap();
    r2.unwrap();

    let stored = service.get_product(product.id).await.unwrap();
    assert_eq!(stored.price, 80.0);
    assert_eq!(stored.extra.get("color"), Some(&json!("oak")));
    assert_eq!(stored.title, "Desk");
}

#[tokio::test]
async fn test_broadcast_waits_for_durable_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(PRODUCTS_FILE);
    let backend = Arc::new(GatedBackend::new(path.clone()));
    let started = Arc::clone(&backend.write_started);
    let release = Arc::clone(&backend.release);
    let service = service_with_product_backend(&dir, backend);

    let mut subscription = service.subscribe().await.unwrap();
    assert!(subscription.current().is_empty());

    let writer = service.clone();
    let create = tokio::spawn(async move {
        writer
            .create_product(json!({"title": "Chair", "price": 20}))
            .await
    });

    started.notified().await;
    // Write is in flight: nothing on disk, nothing pushed
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!path.exists());
    assert!(!subscription.has_pending());
    assert!(!create.is_finished());

    release.add_permits(1);
    let product = create.await.unwrap().unwrap();

    // Pushed before the caller got its response
    assert!(subscription.has_pending());
    let view = subscription.next().await.unwrap();
    let pushed: Vec<_> = view.products().cloned().collect();
    assert_eq!(pushed, vec![product]);
}

#[tokio::test]
async fn test_dropped_caller_does_not_cancel_write_or_broadcast() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(PRODUCTS_FILE);
    let backend = Arc::new(GatedBackend::new(path.clone()));
    let started = Arc::clone(&backend.write_started);
    let release = Arc::clone(&backend.release);
    let service = service_with_product_backend(&dir, backend);

    let mut subscription = service.subscribe().await.unwrap();

    let writer = service.clone();
    let caller = tokio::spawn(async move {
        writer
            .create_product(json!({"title": "Chair", "price": 20}))
            .await
    });

    // Caller disconnects while its write is in flight
    started.notified().await;
    caller.abort();
    assert!(caller.await.unwrap_err().is_cancelled());

    release.add_permits(1);

    let view = tokio::time::timeout(Duration::from_secs(5), subscription.next())
        .await
        .expect("Should broadcast after the caller went away")
        .unwrap();
    let titles: Vec<_> = view.products().map(|p| p.title.clone()).collect();
    assert_eq!(titles, vec!["Chair".to_string()]);

    assert!(path.exists());
    let stored = service.list_products().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Chair");
}

#[tokio::test]
async fn test_failed_write_is_not_applied_or_broadcast() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(ReadOnlyBackend::new(dir.path().join(PRODUCTS_FILE)));
    let service = service_with_product_backend(&dir, backend);
    let mut subscription = service.subscribe().await.unwrap();

    let err = service
        .create_product(json!({"title": "Chair", "price": 20}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Persistence(_)));

    assert!(!subscription.has_pending());
    assert!(service.list_products().await.unwrap().is_empty());
    assert!(subscription.current().is_empty());
}

#[tokio::test]
async fn test_rejected_input_never_reaches_store() {
    let (dir, service) = file_service();
    let mut subscription = service.subscribe().await.unwrap();

    let err = service
        .create_product(json!({"title": "Chair", "price": -5}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    assert!(!dir.path().join(PRODUCTS_FILE).exists());
    assert!(!subscription.has_pending());
    assert!(subscription.current().is_empty());
}

#[tokio::test]
async fn test_update_of_missing_product_does_not_broadcast() {
    let (_dir, service) = file_service();
    let subscription = service.subscribe().await.unwrap();

    let err = service
        .update_product(uuid::Uuid::new_v4(), json!({"price": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert!(!subscription.has_pending());
}

#[tokio::test]
async fn test_delete_of_absent_id_is_silent_noop() {
    let (_dir, service) = file_service();
    service
        .create_product(json!({"title": "Lamp", "price": 3}))
        .await
        .unwrap();
    let before = service.list_products().await.unwrap();
    let subscription = service.subscribe().await.unwrap();

    let remaining = service.delete_product(uuid::Uuid::new_v4()).await.unwrap();
    assert_eq!(remaining, before);
    assert_eq!(service.list_products().await.unwrap(), before);
    assert!(!subscription.has_pending());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_new_subscriber_matches_concurrent_list() {
    let (_dir, service) = file_service();
    for i in 0..3 {
        service
            .create_product(json!({"title": format!("p{i}"), "price": i}))
            .await
            .unwrap();
    }

    let (subscription, listed) = tokio::join!(service.subscribe(), service.list_products());
    let mut subscription = subscription.unwrap();
    let view = subscription.current();
    let seen: Vec<_> = view.products().cloned().collect();
    assert_eq!(seen, listed.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_subscribers_converge_on_final_state() {
    let (_dir, service) = file_service();
    let mut first = service.subscribe().await.unwrap();
    let mut second = service.subscribe().await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..10 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            service
                .create_product(json!({"title": format!("p{i}"), "price": i}))
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let expected = service.merged_view().await.unwrap();
    assert_eq!(*first.current(), expected);
    assert_eq!(*second.current(), expected);
}

#[tokio::test]
async fn test_socket_events_drive_live_buffer() {
    let (_dir, service) = file_service();
    let mut subscription = service.subscribe().await.unwrap();

    service
        .handle_client_message(ClientMessage::NewProduct(json!({"title": "Kayak"})))
        .await
        .unwrap();
    let view = subscription.next().await.unwrap();
    let live: Vec<_> = view.live_submissions().cloned().collect();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].title, "Kayak");
    assert_eq!(live[0].submitter_name, "anonymous");

    service
        .handle_client_message(ClientMessage::DeleteProduct(live[0].id))
        .await
        .unwrap();
    assert!(subscription.next().await.unwrap().is_empty());
    assert!(service.list_live().await.unwrap().is_empty());
}
