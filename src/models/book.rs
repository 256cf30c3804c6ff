//! Book (inventory record) model and related types

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

const NEGATIVE_STOCK: &str = "Stock cannot be negative";

/// A stored book, as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier (24 hex digits)
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    /// Copies on the shelf; never negative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<i32>,
}

/// A validated book that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_year: Option<i32>,
    pub available_copies: Option<i32>,
}

/// Partial book, used as request body for both create and update.
///
/// Keys the type does not know (including `id` and `_id`) are dropped, so an
/// update can never rewrite the identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[validate(custom(function = "not_blank"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<i32>,
}

/// List filter. Empty values (`?category=`) mean no filter.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact category match
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub category: Option<String>,
    /// Only books published strictly after this year
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub min_year: Option<i32>,
}

/// Relative stock change
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct StockAdjustment {
    /// Copies to add (negative to remove)
    pub delta: i32,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Title is required".into());
        return Err(err);
    }
    Ok(())
}

impl BookInput {
    /// Checks a create request and turns it into a storable book.
    pub fn into_new_book(self) -> Result<NewBook, crate::error::AppError> {
        if self.title.is_none() {
            return Err(crate::error::AppError::Validation("Title is required".to_string()));
        }
        self.validate()?;

        Ok(NewBook {
            title: self.title.unwrap_or_default(),
            author: self.author,
            category: self.category,
            published_year: self.published_year,
            available_copies: self.available_copies,
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &BookInput::default()
    }
}

impl Book {
    /// Returns the record as it would look with `patch` applied.
    pub fn merged(&self, patch: &BookInput) -> Book {
        Book {
            id: self.id.clone(),
            title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
            author: patch.author.clone().or_else(|| self.author.clone()),
            category: patch.category.clone().or_else(|| self.category.clone()),
            published_year: patch.published_year.or(self.published_year),
            available_copies: patch.available_copies.or(self.available_copies),
        }
    }

    /// Checks the full-record invariants.
    pub fn check(&self) -> Result<(), crate::error::AppError> {
        if self.title.trim().is_empty() {
            return Err(crate::error::AppError::Validation("Title is required".to_string()));
        }
        if self.available_copies.is_some_and(|c| c < 0) {
            return Err(crate::error::AppError::Validation(NEGATIVE_STOCK.to_string()));
        }
        Ok(())
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.available_copies == Some(0)
    }

    pub fn matches(&self, query: &BookQuery) -> bool {
        if let Some(ref category) = query.category {
            if self.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(min_year) = query.min_year {
            if !self.published_year.is_some_and(|y| y > min_year) {
                return false;
            }
        }
        true
    }
}

impl NewBook {
    pub fn with_id(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            category: self.category,
            published_year: self.published_year,
            available_copies: self.available_copies,
        }
    }
}
