//! Book endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookInput, BookQuery, StockAdjustment},
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub message: String,
    pub inserted_count: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// List books, optionally filtered
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 400, description = "Malformed filter", body = crate::error::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list(&query).await?;
    Ok(Json(books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(&id).await?;
    Ok(Json(book))
}

/// Replace the collection with the 7-book reference set
#[utoipa::path(
    post,
    path = "/books/seed",
    tag = "books",
    responses(
        (status = 200, description = "Collection seeded", body = SeedResponse),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn seed_books(State(state): State<AppState>) -> AppResult<Json<SeedResponse>> {
    let inserted = state.services.books.seed().await?;
    Ok(Json(SeedResponse {
        message: format!("{} books inserted", inserted),
        inserted_count: inserted,
    }))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<BookInput>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update the supplied fields of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<BookInput>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update(&id, patch).await?;
    Ok(Json(updated))
}

/// Add or remove copies
#[utoipa::path(
    patch,
    path = "/books/{id}/stock",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = StockAdjustment,
    responses(
        (status = 200, description = "Stock adjusted", body = Book),
        (status = 400, description = "Stock would become negative", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(adjustment): ApiJson<StockAdjustment>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .adjust_stock(&id, adjustment.delta)
        .await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Delete processed; deletedCount is 0 for unknown ids", body = DeleteResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.services.books.delete(&id).await?;
    Ok(Json(DeleteResponse {
        message: "Book deleted".to_string(),
        deleted_count: deleted,
    }))
}

/// Remove every book with zero copies left
#[utoipa::path(
    delete,
    path = "/books/cleanup/empty",
    tag = "books",
    responses(
        (status = 200, description = "Out-of-stock books removed", body = DeleteResponse)
    )
)]
pub async fn delete_out_of_stock(State(state): State<AppState>) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.services.books.delete_out_of_stock().await?;
    Ok(Json(DeleteResponse {
        message: format!("Deleted {} out-of-stock books.", deleted),
        deleted_count: deleted,
    }))
}
