//! Chain reference parsing and response navigation.
//!
//! A chain reference has the form `<name>.response.<field>[.<subpath>]`,
//! where `field` is one of `body`, `headers`, `status` or `statusText`.
//! For `body` the subpath walks the JSON document (`data.items[0].id`); for
//! `headers` it names a single header.

use crate::models::response::HttpResponse;
use log::debug;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

const RESPONSE_SEGMENT: &str = ".response.";

/// Field of a stored response addressed by a chain reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseField {
    /// Raw body, or a JSON path into it.
    Body(Option<String>),
    /// All headers, or one header by case-insensitive name.
    Headers(Option<String>),
    /// Numeric status code.
    Status,
    /// Status reason phrase.
    StatusText,
}

/// A parsed `<name>.response.<field>[.<subpath>]` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReference {
    /// Declared name of the request whose response is referenced.
    pub request_name: String,
    /// Addressed field.
    pub field: ResponseField,
}

impl ChainReference {
    /// Parses a chain reference.
    ///
    /// Returns `None` when the text does not have the `<name>.response.` shape,
    /// the name is not made of word characters, or the field is unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use rest_chain::store::path::{ChainReference, ResponseField};
    ///
    /// let reference = ChainReference::parse("login.response.body.data.token").unwrap();
    /// assert_eq!(reference.request_name, "login");
    /// assert_eq!(reference.field, ResponseField::Body(Some("data.token".to_string())));
    ///
    /// assert!(ChainReference::parse("login.request.body").is_none());
    /// ```
    pub fn parse(path: &str) -> Option<Self> {
        let (name, rest) = path.split_once(RESPONSE_SEGMENT)?;
        if !is_word(name) {
            return None;
        }

        // `body[0].id` is accepted as well as `body.items[0]`
        let field_end = rest.find(['.', '[']).unwrap_or(rest.len());
        let (field_name, remainder) = rest.split_at(field_end);
        let subpath = match remainder.strip_prefix('.') {
            Some(sub) => Some(sub.to_string()),
            None if remainder.is_empty() => None,
            None => Some(remainder.to_string()),
        };

        let field = match (field_name, subpath) {
            ("body", subpath) => ResponseField::Body(subpath),
            ("headers", Some(sub)) if sub.starts_with('[') => return None,
            ("headers", subpath) => ResponseField::Headers(subpath),
            ("status", None) => ResponseField::Status,
            ("statusText", None) => ResponseField::StatusText,
            _ => return None,
        };

        Some(Self {
            request_name: name.to_string(),
            field,
        })
    }

    /// Reads the referenced field from a response.
    ///
    /// `None` means the value could not be navigated to: unknown header,
    /// missing property, index out of range, scalar intermediate, JSON
    /// `null`, or a body that is not valid JSON.
    pub fn extract(&self, response: &HttpResponse) -> Option<String> {
        match &self.field {
            ResponseField::Status => Some(response.status.to_string()),
            ResponseField::StatusText => Some(response.status_text.clone()),
            ResponseField::Headers(None) => {
                let sorted: BTreeMap<&String, &String> = response.headers.iter().collect();
                serde_json::to_string(&sorted).ok()
            }
            ResponseField::Headers(Some(name)) => response.header(name).map(str::to_string),
            ResponseField::Body(None) => Some(response.body.clone()),
            ResponseField::Body(Some(subpath)) => extract_json_path(&response.body, subpath),
        }
    }
}

/// One step of a body path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object property name.
    Property(String),
    /// Array index written as `[n]`.
    Index(usize),
}

/// Splits a body path such as `data.items[0].id` into segments.
///
/// Returns `None` for empty components, unclosed brackets, or bracket
/// contents that are not non-negative integers.
pub fn parse_json_path(path: &str) -> Option<Vec<PathSegment>> {
    let mut segments = Vec::new();

    for component in path.split('.') {
        let (property, mut indices) = match component.find('[') {
            Some(pos) => component.split_at(pos),
            None => (component, ""),
        };

        if !property.is_empty() {
            segments.push(PathSegment::Property(property.to_string()));
        } else if indices.is_empty() {
            return None;
        }

        while !indices.is_empty() {
            let inner = indices.strip_prefix('[')?;
            let close = inner.find(']')?;
            let index = &inner[..close];
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segments.push(PathSegment::Index(index.parse().ok()?));
            indices = &inner[close + 1..];
        }
    }

    Some(segments)
}

/// Walks `path` through the JSON document in `body`.
pub fn extract_json_path(body: &str, path: &str) -> Option<String> {
    let document: JsonValue = match serde_json::from_str(body) {
        Ok(document) => document,
        Err(e) => {
            debug!("response body is not valid JSON, path '{}' unresolved: {}", path, e);
            return None;
        }
    };

    let segments = parse_json_path(path)?;
    let mut current = &document;
    for segment in &segments {
        current = match (segment, current) {
            (PathSegment::Property(name), JsonValue::Object(map)) => map.get(name)?,
            (PathSegment::Property(name), JsonValue::Array(items)) => {
                items.get(name.parse::<usize>().ok()?)?
            }
            (PathSegment::Index(index), JsonValue::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }

    json_value_to_string(current)
}

/// Converts a terminal JSON value to text; `null` has no text form.
fn json_value_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Array(_) | JsonValue::Object(_) => serde_json::to_string(value).ok(),
    }
}

fn is_word(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
