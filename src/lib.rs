//! Library Inventory
//!
//! REST backend for a small library's book stock: list with filters, seed a
//! reference collection, create, update, adjust stock and delete books held
//! in a MongoDB collection.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
