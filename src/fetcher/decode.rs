//! Body decoding for single resources and collection pages.

use super::BookError;
use crate::model::{is_not_found_sentinel, BookResource, Page};
use serde::Deserialize;
use serde_json::Value;

/// Decodes a successful response, mapping the "not found" sentinel to `None`.
pub(crate) fn decode_resource(body: &str) -> Result<Option<BookResource>, BookError> {
    let payload = parse_payload(body)?;
    if is_not_found_sentinel(&payload) {
        return Ok(None);
    }
    resource_from_value(payload).map(Some)
}

/// Decodes a response that must contain a book. No sentinel handling.
pub(crate) fn decode_authoritative(body: &str) -> Result<BookResource, BookError> {
    resource_from_value(parse_payload(body)?)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageBody {
    Envelope {
        #[serde(alias = "books", alias = "content")]
        items: Vec<Value>,
        #[serde(default, rename = "hasMore")]
        has_more: Option<bool>,
    },
    Bare(Vec<Value>),
}

/// Decodes one page of a collection.
///
/// Entries that are `null` or carry no id are dropped. Without an explicit
/// `hasMore`, a full page means there may be more.
pub(crate) fn decode_page(body: &str, page_size: usize) -> Result<Page<BookResource>, BookError> {
    let payload = parse_payload(body)?;
    if is_not_found_sentinel(&payload) {
        return Ok(Page::empty());
    }

    let (raw_items, has_more) = match serde_json::from_value(payload) {
        Ok(PageBody::Envelope { items, has_more }) => (items, has_more),
        Ok(PageBody::Bare(items)) => (items, None),
        Err(e) => return Err(BookError::Decode(format!("unexpected page shape: {}", e))),
    };
    let has_more = has_more.unwrap_or(raw_items.len() >= page_size);

    let mut items = Vec::with_capacity(raw_items.len());
    for value in raw_items {
        if !has_id(&value) {
            continue;
        }
        items.push(resource_from_value(value)?);
    }
    Ok(Page::new(items, has_more))
}

fn parse_payload(body: &str) -> Result<Value, BookError> {
    if body.trim().is_empty() {
        return Err(BookError::Decode("empty response body".to_string()));
    }
    match serde_json::from_str(body) {
        Ok(Value::Null) => Err(BookError::Decode("null payload".to_string())),
        Ok(value) => Ok(value),
        Err(e) => Err(BookError::Decode(e.to_string())),
    }
}

fn has_id(value: &Value) -> bool {
    match value.get("id") {
        Some(Value::String(id)) => !id.is_empty(),
        _ => false,
    }
}

fn resource_from_value(value: Value) -> Result<BookResource, BookError> {
    let book: BookResource = serde_json::from_value(value).map_err(|e| BookError::Decode(e.to_string()))?;
    if book.id.is_empty() {
        return Err(BookError::Decode("payload has no id".to_string()));
    }
    Ok(book)
}
