use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde_json::{Map, Value};

use crate::error::AppError;

/// A submitted request body as an untyped tree, ready for validation.
///
/// Accepts `application/json` bodies as they are, and
/// `application/x-www-form-urlencoded` bodies with bracketed keys, so that
/// `listing[title]=Loft&listing[image][url]=...` becomes
/// `{"listing": {"title": "Loft", "image": {"url": "..."}}}`.
/// Form values always stay strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingBody(pub Value);

impl<S> FromRequest<S> for ListingBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            return Ok(Self(value));
        }

        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(nest_form_fields(pairs)))
    }
}

/// Deepest bracket nesting honoured below the root key.
const MAX_DEPTH: usize = 5;

/// Builds a nested object from bracketed form keys. Later keys win.
pub fn nest_form_fields(pairs: impl IntoIterator<Item = (String, String)>) -> Value {
    let mut root = Value::Object(Map::new());
    for (key, value) in pairs {
        insert_path(&mut root, &key_segments(&key), value);
    }
    root
}

/// Splits `a[b][c]` into `["a", "b", "c"]`. Past [`MAX_DEPTH`] brackets the
/// rest of the key is kept as one literal segment.
fn key_segments(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return vec![key];
    };

    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        if segments.len() > MAX_DEPTH {
            segments.push(rest);
            return segments;
        }
        let Some(close) = inner.find(']') else {
            break;
        };
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    segments
}

fn insert_path(root: &mut Value, segments: &[&str], value: String) {
    let mut target = root;
    for segment in segments {
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        let Some(fields) = target.as_object_mut() else {
            return;
        };
        target = fields.entry(segment.to_string()).or_insert(Value::Null);
    }
    *target = Value::String(value);
}
