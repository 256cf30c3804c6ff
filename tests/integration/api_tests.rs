//! API integration tests against a running server

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:5000";

/// Helper to reset the collection to the reference set
async fn seed(client: &Client) {
    let response = client
        .post(format!("{}/books/seed", BASE_URL))
        .send()
        .await
        .expect("Failed to send seed request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_liveness() {
    let client = Client::new();

    let response = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_seed_and_list() {
    let client = Client::new();
    seed(&client).await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().map(|a| a.len()), Some(7));
}

#[tokio::test]
#[ignore]
async fn test_create_update_and_delete_book() {
    let client = Client::new();

    // Create book
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Test Book",
            "category": "Testing",
            "availableCopies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["_id"].as_str().expect("No book ID").to_string();

    // Negative stock is refused
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({ "availableCopies": -1 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    // Delete book
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["deletedCount"], 1);
}

#[tokio::test]
#[ignore]
async fn test_cleanup_after_seed() {
    let client = Client::new();
    seed(&client).await;

    let response = client
        .delete(format!("{}/books/cleanup/empty", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["deletedCount"], 2);
}

#[tokio::test]
#[ignore]
async fn test_update_unknown_book() {
    let client = Client::new();

    let response = client
        .put(format!("{}/books/000000000000000000000000", BASE_URL))
        .json(&json!({ "availableCopies": 3 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
