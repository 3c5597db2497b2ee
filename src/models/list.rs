//! List and Item models
//!
//! Database rows plus the JSON shapes the API exposes for them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::constants::messages::EMPTY_ITEM_ERROR;

/// Identifier of a to-do list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub i64);

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A list row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct List {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

impl List {
    pub fn list_id(&self) -> ListId {
        ListId(self.id)
    }
}

/// An item row; `(list_id, text)` is unique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub list_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// JSON representation of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Buy peacock feathers")]
    pub text: String,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            text: item.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListCreatedResponse {
    pub id: i64,
}

/// Item submission, accepted as a form field or JSON body.
///
/// A missing or null `text` field is treated the same as an empty one.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct NewItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Buy peacock feathers")]
    pub text: String,
}

impl NewItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Validate and return the text with surrounding whitespace stripped.
    pub fn cleaned_text(&self) -> Result<String, String> {
        self.validate().map_err(|errors| first_message(&errors))?;
        Ok(self.text.trim().to_string())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| EMPTY_ITEM_ERROR.to_string())
}
