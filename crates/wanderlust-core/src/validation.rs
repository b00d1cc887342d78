//! Write-path validation for submitted listings.
//!
//! Request bodies are checked as an untyped [`Value`] tree so that a wrong
//! type is reported as a violation instead of a deserialization failure.
//! Every rule is evaluated; a rejected body carries all of its violations.

use crate::listing::{Image, ListingDraft};
use serde_json::{Map, Value};
use std::fmt::Display;

type Fields = Map<String, Value>;

/// A single failed field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `listing.price`.
    pub path: String,
    /// What the rule requires, e.g. `is required`.
    pub message: String,
}

impl Violation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" {}", self.path, self.message)
    }
}

/// The violations collected while validating one request body.
///
/// Displays as every violation joined by `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(Violation::new(path, message));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any violation was raised for `path`.
    pub fn contains_path(&self, path: &str) -> bool {
        self.0.iter().any(|v| v.path == path)
    }
}

impl Display for Violations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

/// Validates a request body shaped as `{ "listing": { ... } }`.
///
/// Rules:
/// - `listing` is required and must be an object.
/// - `title`, `description` and `location` are required non-empty strings.
/// - `price` is required and must be a number (or numeric string) `>= 0`.
/// - `image` is optional. It is either a URL string or an object with
///   optional `url` and `filename` strings. A non-empty URL must be an
///   absolute URI.
/// - `country` is optional and may be empty.
///
/// Unknown keys are ignored. On success the image is normalized into
/// `{ url, filename: "listingimage" }`, or dropped when its URL is empty.
pub fn validate_listing(body: &Value) -> Result<ListingDraft, Violations> {
    let mut violations = Violations::default();

    let listing = match body.get("listing") {
        None | Some(Value::Null) => {
            violations.push("listing", "is required");
            return Err(violations);
        }
        Some(Value::Object(fields)) => fields,
        Some(_) => {
            violations.push("listing", "must be of type object");
            return Err(violations);
        }
    };

    let title = required_text(listing, "title", &mut violations);
    let price = required_price(listing, &mut violations);
    let description = required_text(listing, "description", &mut violations);
    let location = required_text(listing, "location", &mut violations);
    let image = optional_image(listing, &mut violations);
    let country = optional_text(listing, "country", &mut violations);

    match (title, price, description, location) {
        (Some(title), Some(price), Some(description), Some(location)) if violations.is_empty() => {
            Ok(ListingDraft {
                title,
                price,
                description,
                location,
                country,
                image,
            })
        }
        _ => Err(violations),
    }
}

fn path(field: &str) -> String {
    format!("listing.{field}")
}

fn required_text(fields: &Fields, field: &str, violations: &mut Violations) -> Option<String> {
    match fields.get(field) {
        None => {
            violations.push(path(field), "is required");
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            violations.push(path(field), "is not allowed to be empty");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            violations.push(path(field), "must be a string");
            None
        }
    }
}

fn optional_text(fields: &Fields, field: &str, violations: &mut Violations) -> Option<String> {
    match fields.get(field) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            violations.push(path(field), "must be a string");
            None
        }
    }
}

fn required_price(fields: &Fields, violations: &mut Violations) -> Option<f64> {
    let Some(value) = fields.get("price") else {
        violations.push(path("price"), "is required");
        return None;
    };

    // Form posts deliver every field as text, so numeric strings are converted.
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|price| price.is_finite());

    match price {
        None => {
            violations.push(path("price"), "must be a number");
            None
        }
        Some(price) if price < 0.0 => {
            violations.push(path("price"), "must be greater than or equal to 0");
            None
        }
        Some(price) => Some(price),
    }
}

fn optional_image(fields: &Fields, violations: &mut Violations) -> Option<Image> {
    match fields.get("image") {
        None => None,
        Some(Value::String(url)) => {
            check_uri(&path("image"), url, violations);
            Image::from_url(url.as_str())
        }
        Some(Value::Object(image)) => {
            let url = match image.get("url") {
                None => None,
                Some(Value::String(url)) => {
                    check_uri(&path("image.url"), url, violations);
                    Some(url.as_str())
                }
                Some(_) => {
                    violations.push(path("image.url"), "must be a string");
                    None
                }
            };
            if !matches!(image.get("filename"), None | Some(Value::String(_))) {
                violations.push(path("image.filename"), "must be a string");
            }
            url.and_then(Image::from_url)
        }
        Some(_) => {
            violations.push(path("image"), "must be one of [string, object]");
            None
        }
    }
}

fn check_uri(path: &str, value: &str, violations: &mut Violations) {
    if value.is_empty() {
        return;
    }
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(_) => violations.push(
            path,
            "must be a valid uri with a scheme matching the http|https pattern",
        ),
        Err(_) => violations.push(path, "must be a valid uri"),
    }
}
