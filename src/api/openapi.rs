//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Inventory API",
        version = "1.0.0",
        description = "Book stock management REST API"
    ),
    paths(
        // Health
        health::liveness,
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::seed_books,
        books::create_book,
        books::update_book,
        books::adjust_stock,
        books::delete_book,
        books::delete_out_of_stock,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::models::book::BookInput,
            crate::models::book::BookQuery,
            crate::models::book::StockAdjustment,
            books::SeedResponse,
            books::DeleteResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book inventory management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_book_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/books",
            "/books/{id}",
            "/books/seed",
            "/books/{id}/stock",
            "/books/cleanup/empty",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
