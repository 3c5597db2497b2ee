//! Common extractors for API handlers.
//!
//! Both extractors reject with `ApiError`, so malformed input produces the
//! same `{"error": ...}` body as every other failure.

use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request},
    http::{header, request::Parts},
    Form, Json,
};

use crate::error::ApiError;
use crate::models::{ListId, NewItem};

/// List id taken from the `{list_id}` path segment.
///
/// Anything other than a positive integer is answered with 404, the same
/// as an id that does not exist.
#[derive(Debug, Clone, Copy)]
pub struct ListPath(pub ListId);

impl ListPath {
    pub fn parse(raw: &str) -> Result<ListId, ApiError> {
        match raw.parse::<i64>() {
            Ok(id) if id > 0 && raw.bytes().all(|b| b.is_ascii_digit()) => Ok(ListId(id)),
            _ => Err(ApiError::list_not_found()),
        }
    }
}

impl<S> FromRequestParts<S> for ListPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        Ok(ListPath(Self::parse(&raw)?))
    }
}

/// Item submission from a urlencoded form, a multipart form or a JSON body,
/// chosen by content type
#[derive(Debug, Clone)]
pub struct ItemSubmission(pub NewItem);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Multipart,
    UrlEncoded,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        BodyKind::Json
    } else if content_type.starts_with("multipart/form-data") {
        BodyKind::Multipart
    } else {
        BodyKind::UrlEncoded
    }
}

/// First `text` part of a multipart body; a form without one is an empty item
async fn multipart_item(mut multipart: Multipart) -> Result<NewItem, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("text") {
            return Ok(NewItem::new(field.text().await?));
        }
    }
    Ok(NewItem::default())
}

impl<S> FromRequest<S> for ItemSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let item = match body_kind(&req) {
            BodyKind::Json => {
                let Json(item) = Json::<NewItem>::from_request(req, state).await?;
                item
            }
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state).await?;
                multipart_item(multipart).await?
            }
            BodyKind::UrlEncoded => {
                let Form(item) = Form::<NewItem>::from_request(req, state).await?;
                item
            }
        };
        Ok(ItemSubmission(item))
    }
}
