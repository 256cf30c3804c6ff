//! MongoDB-backed book store.
//!
//! Documents live in a single collection. Identifiers are ObjectIds on the
//! wire to the database and their hex form everywhere else. The collection
//! carries a `$jsonSchema` validator so the non-negative stock rule holds
//! for any client that writes to it.

use async_trait::async_trait;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Client, Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::{BookStore, DeletePredicate, StockOutcome, StoreError, StoreResult};
use crate::{
    config::DatabaseConfig,
    models::book::{Book, BookInput, BookQuery, NewBook},
};

const DOCUMENT_VALIDATION_FAILURE: i32 = 121;
const DUPLICATE_KEY: i32 = 11000;
const NAMESPACE_NOT_FOUND: i32 = 26;
const UNAUTHORIZED: i32 = 13;

/// Stored shape of a book
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    available_copies: Option<i32>,
}

impl From<BookDocument> for Book {
    fn from(d: BookDocument) -> Self {
        Book {
            id: d.id.to_hex(),
            title: d.title,
            author: d.author,
            category: d.category,
            published_year: d.published_year,
            available_copies: d.available_copies,
        }
    }
}

impl BookDocument {
    fn new(book: NewBook) -> Self {
        Self {
            id: ObjectId::new(),
            title: book.title,
            author: book.author,
            category: book.category,
            published_year: book.published_year,
            available_copies: book.available_copies,
        }
    }
}

/// Query document for a list filter
pub(crate) fn filter_document(query: &BookQuery) -> Document {
    let mut filter = Document::new();
    if let Some(ref category) = query.category {
        filter.insert("category", category.as_str());
    }
    if let Some(min_year) = query.min_year {
        filter.insert("publishedYear", doc! { "$gt": min_year });
    }
    filter
}

pub(crate) fn predicate_document(predicate: DeletePredicate) -> Document {
    match predicate {
        DeletePredicate::All => Document::new(),
        DeletePredicate::OutOfStock => doc! { "availableCopies": 0 },
    }
}

/// `$set` body holding only the supplied fields
pub(crate) fn set_document(patch: &BookInput) -> StoreResult<Document> {
    bson::to_document(patch).map_err(|e| StoreError::Backend(format!("Failed to encode update: {}", e)))
}

/// Filter for a guarded stock change on `id`.
///
/// `$inc` promotes an overflowing int32 to int64, so increments are bounded
/// as well as decrements. `$not` keeps documents without the field matching.
pub(crate) fn stock_filter(id: ObjectId, delta: i32) -> Document {
    let mut filter = doc! { "_id": id };
    if delta < 0 {
        filter.insert("availableCopies", doc! { "$gte": -(delta as i64) });
    } else if delta > 0 {
        filter.insert(
            "availableCopies",
            doc! { "$not": { "$gt": i32::MAX - delta } },
        );
    }
    filter
}

/// Collection validator mirroring the `Book` invariants
pub(crate) fn schema_validator() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["title"],
            "properties": {
                "title": { "bsonType": "string", "minLength": 1 },
                "author": { "bsonType": "string" },
                "category": { "bsonType": "string" },
                "publishedYear": { "bsonType": "int" },
                "availableCopies": {
                    "bsonType": "int",
                    "minimum": 0,
                    "maximum": i32::MAX,
                    "description": "Stock cannot be negative"
                }
            }
        }
    }
}

fn error_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => Some(e.code),
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map(|e| e.code),
        ErrorKind::Command(e) => Some(e.code),
        _ => None,
    }
}

/// Classifies a driver error into the store taxonomy.
fn classify(context: &str, err: MongoError) -> StoreError {
    match error_code(&err) {
        Some(DOCUMENT_VALIDATION_FAILURE) => {
            StoreError::Constraint("Document failed collection validation".to_string())
        }
        Some(DUPLICATE_KEY) => StoreError::Duplicate(format!("{}: {}", context, err)),
        _ => match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
                StoreError::Unavailable(format!("{}: {}", context, err))
            }
            _ => StoreError::Backend(format!("{}: {}", context, err)),
        },
    }
}

/// What to do after `collMod` on the books collection failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchemaStep {
    /// The collection does not exist yet
    Create,
    /// The user lacks the privilege; keep serving without the validator
    Skip,
    Fail,
}

pub(crate) fn schema_step(code: Option<i32>) -> SchemaStep {
    match code {
        Some(NAMESPACE_NOT_FOUND) => SchemaStep::Create,
        Some(UNAUTHORIZED) => SchemaStep::Skip,
        _ => SchemaStep::Fail,
    }
}

/// Unparseable ids cannot name a stored document.
fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

#[derive(Clone)]
pub struct MongoBookStore {
    client: Client,
    database: Database,
    books: Collection<BookDocument>,
}

impl MongoBookStore {
    /// Connect to the configured deployment and verify it answers
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let client = Client::with_uri_str(&config.url)
            .await
            .map_err(|e| classify("Failed to create MongoDB client", e))?;
        let database = client.database(&config.name);
        let books = database.collection::<BookDocument>(&config.collection);

        let store = Self {
            client,
            database,
            books,
        };
        store.ping().await?;

        tracing::info!(database = %config.name, collection = %config.collection, "Connected to MongoDB");
        Ok(store)
    }

    /// Install (or refresh) the collection validator.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let name = self.books.name();
        let collmod = doc! {
            "collMod": name,
            "validator": schema_validator(),
            "validationLevel": "strict",
            "validationAction": "error",
        };

        let err = match self.database.run_command(collmod, None).await {
            Ok(_) => {
                tracing::debug!(collection = %name, "Books collection validator installed");
                return Ok(());
            }
            Err(e) => e,
        };

        match schema_step(error_code(&err)) {
            SchemaStep::Create => {
                let create = doc! {
                    "create": name,
                    "validator": schema_validator(),
                    "validationLevel": "strict",
                    "validationAction": "error",
                };
                self.database
                    .run_command(create, None)
                    .await
                    .map_err(|e| classify("Failed to create books collection", e))?;
                tracing::debug!(collection = %name, "Books collection created with validator");
                Ok(())
            }
            SchemaStep::Skip => {
                tracing::warn!(
                    collection = %name,
                    error = %err,
                    "Not allowed to install the books validator (collMod needs dbAdmin); \
                     relying on application-side checks"
                );
                Ok(())
            }
            SchemaStep::Fail => Err(classify("Failed to install books validator", err)),
        }
    }
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn find(&self, query: &BookQuery) -> StoreResult<Vec<Book>> {
        let mut cursor = self
            .books
            .find(filter_document(query), None)
            .await
            .map_err(|e| classify("Failed to query books", e))?;

        let mut books = Vec::new();
        while cursor.advance().await.map_err(|e| classify("Failed to read books", e))? {
            let document = cursor
                .deserialize_current()
                .map_err(|e| classify("Failed to decode book", e))?;
            books.push(document.into());
        }
        Ok(books)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let document = self
            .books
            .find_one(doc! { "_id": oid }, None)
            .await
            .map_err(|e| classify("Failed to get book", e))?;
        Ok(document.map(Book::from))
    }

    async fn insert(&self, book: NewBook) -> StoreResult<Book> {
        if book.available_copies.is_some_and(|c| c < 0) {
            return Err(StoreError::Constraint("Stock cannot be negative".to_string()));
        }
        let document = BookDocument::new(book);
        self.books
            .insert_one(&document, None)
            .await
            .map_err(|e| classify("Failed to insert book", e))?;
        Ok(document.into())
    }

    async fn insert_many(&self, books: Vec<NewBook>) -> StoreResult<Vec<Book>> {
        if books.iter().any(|b| b.available_copies.is_some_and(|c| c < 0)) {
            return Err(StoreError::Constraint("Stock cannot be negative".to_string()));
        }
        if books.is_empty() {
            return Ok(Vec::new());
        }
        let documents: Vec<BookDocument> = books.into_iter().map(BookDocument::new).collect();
        self.books
            .insert_many(&documents, None)
            .await
            .map_err(|e| classify("Failed to insert books", e))?;
        Ok(documents.into_iter().map(Book::from).collect())
    }

    async fn update_by_id(&self, id: &str, patch: &BookInput) -> StoreResult<Option<Book>> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let set = set_document(patch)?;
        if set.is_empty() {
            return self.find_by_id(id).await;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let document = self
            .books
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set }, options)
            .await
            .map_err(|e| classify("Failed to update book", e))?;
        Ok(document.map(Book::from))
    }

    async fn adjust_stock(&self, id: &str, delta: i32) -> StoreResult<StockOutcome> {
        let Some(oid) = parse_id(id) else {
            return Ok(StockOutcome::NotFound);
        };
        if delta == 0 {
            return Ok(match self.find_by_id(id).await? {
                Some(book) => StockOutcome::Adjusted(book),
                None => StockOutcome::NotFound,
            });
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let document = self
            .books
            .find_one_and_update(
                stock_filter(oid, delta),
                doc! { "$inc": { "availableCopies": delta } },
                options,
            )
            .await
            .map_err(|e| classify("Failed to adjust stock", e))?;

        match document {
            Some(d) => Ok(StockOutcome::Adjusted(d.into())),
            // The guard or the id did not match; tell them apart.
            None => match self.find_by_id(id).await? {
                Some(_) if delta > 0 => Ok(StockOutcome::OutOfRange),
                Some(_) => Ok(StockOutcome::Insufficient),
                None => Ok(StockOutcome::NotFound),
            },
        }
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<u64> {
        let Some(oid) = parse_id(id) else {
            return Ok(0);
        };
        let result = self
            .books
            .delete_one(doc! { "_id": oid }, None)
            .await
            .map_err(|e| classify("Failed to delete book", e))?;
        Ok(result.deleted_count)
    }

    async fn delete_many(&self, predicate: DeletePredicate) -> StoreResult<u64> {
        let result = self
            .books
            .delete_many(predicate_document(predicate), None)
            .await
            .map_err(|e| classify("Failed to delete books", e))?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| classify("MongoDB ping failed", e))?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB connection closed");
    }
}
