//! HTML views.
//!
//! Templates live under `templates/` and only see plain, pre-formatted
//! strings built from [`Listing`]s.

use askama::Template;
use axum::response::Html;
use wanderlust_core::Listing;

use crate::error::Result;

/// Renders a template into an HTML response body.
pub fn render<T: Template>(template: T) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}

/// A listing as the templates see it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingView {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Price formatted for display, e.g. `1,200`.
    pub price: String,
    /// Price as it is entered in the edit form, e.g. `1200`.
    pub price_input: String,
    pub location: String,
    pub country: String,
    /// Empty when the listing has no image.
    pub image_url: String,
}

impl From<&Listing> for ListingView {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.to_string(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: format_price(listing.price),
            price_input: listing.price.to_string(),
            location: listing.location.clone(),
            country: listing.country.clone().unwrap_or_default(),
            image_url: listing
                .image
                .as_ref()
                .map(|image| image.url.clone())
                .unwrap_or_default(),
        }
    }
}

/// Formats a price with thousands separators and at most two decimals.
pub fn format_price(price: f64) -> String {
    let fixed = format!("{price:.2}");
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction == "00" {
        grouped
    } else {
        format!("{grouped}.{fraction}")
    }
}

#[derive(Template)]
#[template(path = "listings/index.html")]
pub struct IndexTemplate {
    pub listings: Vec<ListingView>,
}

impl IndexTemplate {
    pub fn new(listings: &[Listing]) -> Self {
        Self {
            listings: listings.iter().map(ListingView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "listings/new.html")]
pub struct NewTemplate;

#[derive(Template)]
#[template(path = "listings/show.html")]
pub struct ShowTemplate {
    pub listing: ListingView,
}

impl ShowTemplate {
    pub fn new(listing: &Listing) -> Self {
        Self {
            listing: listing.into(),
        }
    }
}

#[derive(Template)]
#[template(path = "listings/edit.html")]
pub struct EditTemplate {
    pub listing: ListingView,
}

impl EditTemplate {
    pub fn new(listing: &Listing) -> Self {
        Self {
            listing: listing.into(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status_code: u16,
    pub message: String,
}
