//! In-process book store, used for local runs and tests

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{BookStore, DeletePredicate, StockOutcome, StoreError, StoreResult};
use crate::models::book::{Book, BookInput, BookQuery, NewBook};

fn negative_stock() -> StoreError {
    StoreError::Constraint("Stock cannot be negative".to_string())
}

/// Insertion-ordered map of books keyed by hex ObjectId
#[derive(Clone, Default)]
pub struct MemoryBookStore {
    books: Arc<RwLock<IndexMap<String, Book>>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find(&self, query: &BookQuery) -> StoreResult<Vec<Book>> {
        let books = self.books.read().await;
        Ok(books.values().filter(|b| b.matches(query)).cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        Ok(self.books.read().await.get(id).cloned())
    }

    async fn insert(&self, book: NewBook) -> StoreResult<Book> {
        if book.available_copies.is_some_and(|c| c < 0) {
            return Err(negative_stock());
        }
        let book = book.with_id(ObjectId::new().to_hex());
        self.books.write().await.insert(book.id.clone(), book.clone());
        Ok(book)
    }

    async fn insert_many(&self, books: Vec<NewBook>) -> StoreResult<Vec<Book>> {
        if books.iter().any(|b| b.available_copies.is_some_and(|c| c < 0)) {
            return Err(negative_stock());
        }
        let created: Vec<Book> = books
            .into_iter()
            .map(|b| b.with_id(ObjectId::new().to_hex()))
            .collect();

        let mut stored = self.books.write().await;
        for book in &created {
            stored.insert(book.id.clone(), book.clone());
        }
        Ok(created)
    }

    async fn update_by_id(&self, id: &str, patch: &BookInput) -> StoreResult<Option<Book>> {
        let mut books = self.books.write().await;
        let Some(current) = books.get_mut(id) else {
            return Ok(None);
        };

        let updated = current.merged(patch);
        if updated.available_copies.is_some_and(|c| c < 0) {
            return Err(negative_stock());
        }
        if updated.title.trim().is_empty() {
            return Err(StoreError::Constraint("Title is required".to_string()));
        }
        *current = updated.clone();
        Ok(Some(updated))
    }

    async fn adjust_stock(&self, id: &str, delta: i32) -> StoreResult<StockOutcome> {
        let mut books = self.books.write().await;
        let Some(current) = books.get_mut(id) else {
            return Ok(StockOutcome::NotFound);
        };

        if delta == 0 {
            return Ok(StockOutcome::Adjusted(current.clone()));
        }

        let stock = current.available_copies.unwrap_or(0);
        match stock.checked_add(delta) {
            Some(next) if next >= 0 => {
                current.available_copies = Some(next);
                Ok(StockOutcome::Adjusted(current.clone()))
            }
            Some(_) => Ok(StockOutcome::Insufficient),
            None => Ok(StockOutcome::OutOfRange),
        }
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<u64> {
        let removed = self.books.write().await.shift_remove(id);
        Ok(u64::from(removed.is_some()))
    }

    async fn delete_many(&self, predicate: DeletePredicate) -> StoreResult<u64> {
        let mut books = self.books.write().await;
        let before = books.len();
        match predicate {
            DeletePredicate::All => books.clear(),
            DeletePredicate::OutOfStock => books.retain(|_, b| !b.is_out_of_stock()),
        }
        Ok((before - books.len()) as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {
        tracing::debug!("In-memory book store released");
    }
}
