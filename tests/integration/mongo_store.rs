//! MongoDB store tests; need a reachable deployment in MONGODB_URI

use library_inventory::{
    config::DatabaseConfig,
    models::book::{BookInput, BookQuery, NewBook},
    repository::{BookStore, DeletePredicate, MongoBookStore, StockOutcome, StoreError},
};

async fn store(collection: &str) -> MongoBookStore {
    let config = DatabaseConfig {
        url: std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string()),
        name: "library_inventory_test".to_string(),
        collection: collection.to_string(),
        ..Default::default()
    };
    let store = MongoBookStore::connect(&config).await.expect("Failed to connect to MongoDB");
    store.ensure_schema().await.expect("Failed to install validator");
    store.delete_many(DeletePredicate::All).await.expect("Failed to clear collection");
    store
}

fn book(title: &str, copies: Option<i32>) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: None,
        category: Some("Fiction".to_string()),
        published_year: Some(2016),
        available_copies: copies,
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_filters_and_cleanup() {
    let store = store("books_filters").await;
    store
        .insert_many(vec![book("zero", Some(0)), book("unset", None), book("some", Some(2))])
        .await
        .unwrap();

    let query = BookQuery {
        category: Some("Fiction".to_string()),
        min_year: Some(2015),
    };
    assert_eq!(store.find(&query).await.unwrap().len(), 3);
    let query = BookQuery {
        min_year: Some(2016),
        ..Default::default()
    };
    assert!(store.find(&query).await.unwrap().is_empty());

    assert_eq!(store.delete_many(DeletePredicate::OutOfStock).await.unwrap(), 1);
    assert_eq!(store.find(&BookQuery::default()).await.unwrap().len(), 2);
}

#[tokio::test]
#[ignore]
async fn test_update_and_stock_guards() {
    let store = store("books_guards").await;
    let created = store.insert(book("guarded", Some(1))).await.unwrap();

    let patch = BookInput {
        author: Some("Someone".to_string()),
        ..Default::default()
    };
    let updated = store.update_by_id(&created.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.author.as_deref(), Some("Someone"));
    assert_eq!(updated.available_copies, Some(1));

    assert!(matches!(
        store.adjust_stock(&created.id, -2).await.unwrap(),
        StockOutcome::Insufficient
    ));
    assert!(matches!(
        store.adjust_stock(&created.id, -1).await.unwrap(),
        StockOutcome::Adjusted(_)
    ));

    // The collection validator rejects writes that skip the service checks.
    let patch = BookInput {
        available_copies: Some(-4),
        ..Default::default()
    };
    assert!(matches!(
        store.update_by_id(&created.id, &patch).await,
        Err(StoreError::Constraint(_))
    ));

    assert!(store
        .update_by_id("000000000000000000000000", &BookInput::default())
        .await
        .unwrap()
        .is_none());

    store.close().await;
}

#[tokio::test]
#[ignore]
async fn test_stock_bounds_and_blank_title() {
    let store = store("books_bounds").await;
    let full = store.insert(book("full", Some(i32::MAX))).await.unwrap();
    let unset = store.insert(book("unset", None)).await.unwrap();

    assert_eq!(
        store.adjust_stock(&full.id, 1).await.unwrap(),
        StockOutcome::OutOfRange
    );
    // Still decodes as a 32-bit count
    let stored = store.find_by_id(&full.id).await.unwrap().unwrap();
    assert_eq!(stored.available_copies, Some(i32::MAX));

    match store.adjust_stock(&unset.id, 0).await.unwrap() {
        StockOutcome::Adjusted(b) => assert_eq!(b.available_copies, None),
        other => panic!("unexpected outcome: {:?}", other),
    }
    match store.adjust_stock(&unset.id, 3).await.unwrap() {
        StockOutcome::Adjusted(b) => assert_eq!(b.available_copies, Some(3)),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(store.delete_many(DeletePredicate::OutOfStock).await.unwrap(), 0);

    let patch = BookInput {
        title: Some(String::new()),
        ..Default::default()
    };
    match store.update_by_id(&full.id, &patch).await {
        Err(StoreError::Constraint(msg)) => assert!(!msg.contains("Stock")),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(store.find(&BookQuery::default()).await.unwrap().len(), 2);

    store.close().await;
}
