//! Book inventory service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookInput, BookQuery, NewBook},
    repository::{BookStore, DeletePredicate, StockOutcome},
};

/// Fixed reference set written by [`BooksService::seed`]:
/// (title, author, category, year, copies)
const REFERENCE_BOOKS: [(&str, &str, &str, i32, i32); 7] = [
    ("The Great Gatsby", "F. Scott Fitzgerald", "Fiction", 1925, 5),
    ("Atomic Habits", "James Clear", "Self-Help", 2018, 10),
    ("Sapiens", "Yuval Noah Harari", "History", 2011, 3),
    ("1984", "George Orwell", "Fiction", 1949, 0),
    ("The Alchemist", "Paulo Coelho", "Fiction", 1988, 8),
    ("Deep Work", "Cal Newport", "Productivity", 2016, 4),
    ("Rich Dad Poor Dad", "Robert Kiyosaki", "Finance", 1997, 0),
];

pub fn reference_books() -> Vec<NewBook> {
    REFERENCE_BOOKS
        .iter()
        .map(|&(title, author, category, year, copies)| NewBook {
            title: title.to_string(),
            author: Some(author.to_string()),
            category: Some(category.to_string()),
            published_year: Some(year),
            available_copies: Some(copies),
        })
        .collect()
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Book with id {} not found", id))
}

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// List books matching the filter
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        Ok(self.store.find(query).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Book> {
        self.store.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Replace the whole collection with the reference set.
    ///
    /// Readers may briefly see an empty collection between the two steps.
    pub async fn seed(&self) -> AppResult<usize> {
        let removed = self.store.delete_many(DeletePredicate::All).await?;
        let inserted = self.store.insert_many(reference_books()).await?;
        tracing::info!(removed, inserted = inserted.len(), "Book collection seeded");
        Ok(inserted.len())
    }

    pub async fn create(&self, input: BookInput) -> AppResult<Book> {
        let book = input.into_new_book()?;
        let created = self.store.insert(book).await?;
        tracing::info!(id = %created.id, title = %created.title, "Book created");
        Ok(created)
    }

    /// Apply the supplied fields to an existing book.
    ///
    /// The delta is checked first, then the merged record, so an update that
    /// would leave the book invalid never reaches the store.
    pub async fn update(&self, id: &str, patch: BookInput) -> AppResult<Book> {
        patch.validate()?;

        let current = self.get(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }
        current.merged(&patch).check()?;

        let updated = self
            .store
            .update_by_id(id, &patch)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(id = %updated.id, "Book updated");
        Ok(updated)
    }

    /// Add `delta` copies (negative to remove); the store refuses to go below zero.
    ///
    /// A zero delta returns the book untouched, so an absent count stays absent.
    pub async fn adjust_stock(&self, id: &str, delta: i32) -> AppResult<Book> {
        if delta == 0 {
            return self.get(id).await;
        }
        match self.store.adjust_stock(id, delta).await? {
            StockOutcome::Adjusted(book) => {
                tracing::info!(id = %book.id, delta, copies = ?book.available_copies, "Stock adjusted");
                Ok(book)
            }
            StockOutcome::Insufficient => {
                Err(AppError::Validation("Stock cannot be negative".to_string()))
            }
            StockOutcome::OutOfRange => Err(AppError::Validation("Stock out of range".to_string())),
            StockOutcome::NotFound => Err(not_found(id)),
        }
    }

    /// Delete a book; an absent id is reported as zero deletions.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let deleted = self.store.delete_by_id(id).await?;
        tracing::info!(id = %id, deleted, "Book delete processed");
        Ok(deleted)
    }

    /// Remove every book whose stock is exactly zero
    pub async fn delete_out_of_stock(&self) -> AppResult<u64> {
        let deleted = self.store.delete_many(DeletePredicate::OutOfStock).await?;
        tracing::info!(deleted, "Out-of-stock books removed");
        Ok(deleted)
    }

    pub async fn ready(&self) -> AppResult<()> {
        Ok(self.store.ping().await?)
    }
}
