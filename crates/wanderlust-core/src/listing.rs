use crate::error::CoreError;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Filename stored alongside every image URL submitted through a listing form.
pub const PLACEHOLDER_IMAGE_FILENAME: &str = "listingimage";

/// A system-assigned listing identifier.
///
/// Identifiers are 12-byte document object ids, rendered as 24 lowercase
/// hex characters in URLs and views. They are assigned once, when the
/// listing is first persisted, and never change afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingId(ObjectId);

impl ListingId {
    /// Generates a fresh identifier that no other call will return.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parses an identifier from its hex representation.
    pub fn parse(value: &str) -> std::result::Result<Self, CoreError> {
        ObjectId::parse_str(value)
            .map(Self)
            .map_err(|_| CoreError::InvalidListingId(value.to_owned()))
    }

    /// Returns the underlying object id.
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for ListingId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl FromStr for ListingId {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Debug for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ListingId").field(&self.0.to_hex()).finish()
    }
}

impl Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for ListingId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// An image attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub filename: String,
}

impl Image {
    /// Builds the stored image for a submitted URL.
    ///
    /// Returns `None` for an empty URL, so that an empty form field never
    /// produces an image.
    pub fn from_url(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        if url.is_empty() {
            return None;
        }
        Some(Self {
            url,
            filename: PLACEHOLDER_IMAGE_FILENAME.to_owned(),
        })
    }
}

/// A persisted listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

/// A validated listing payload, ready to be written.
///
/// Drafts are only produced by [`validate_listing`](crate::validate_listing),
/// so the required text fields are non-empty and the price is a finite,
/// non-negative number.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub price: f64,
    pub description: String,
    pub location: String,
    pub country: Option<String>,
    pub image: Option<Image>,
}

impl ListingDraft {
    /// Turns the draft into a new listing with the given identifier.
    pub fn into_listing(self, id: ListingId) -> Listing {
        Listing {
            id,
            title: self.title,
            price: self.price,
            description: self.description,
            location: self.location,
            country: self.country,
            image: self.image,
        }
    }

    /// Merges the draft into an existing listing.
    ///
    /// Required fields are always overwritten. `country` and `image` are
    /// only overwritten when the draft carries them, so an update that does
    /// not resubmit an image keeps the stored one.
    pub fn apply_to(self, listing: &mut Listing) {
        listing.title = self.title;
        listing.price = self.price;
        listing.description = self.description;
        listing.location = self.location;
        if let Some(country) = self.country {
            listing.country = Some(country);
        }
        if let Some(image) = self.image {
            listing.image = Some(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ListingDraft {
        ListingDraft {
            title: "Cozy cabin".to_string(),
            price: 1200.0,
            description: "Log cabin by the lake".to_string(),
            location: "Lake Tahoe".to_string(),
            country: Some("United States".to_string()),
            image: Image::from_url("http://x/y.png"),
        }
    }

    #[test]
    fn parse_round_trips_display() {
        let id = ListingId::generate();
        let parsed = ListingId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.to_string().len(), 24);
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        assert!(ListingId::parse("").is_err());
        assert!(ListingId::parse("not-an-id").is_err());
        assert!(ListingId::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ListingId::generate();
        let b = ListingId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn image_from_url_uses_placeholder_filename() {
        let image = Image::from_url("http://x/y.png").unwrap();
        assert_eq!(image.url, "http://x/y.png");
        assert_eq!(image.filename, "listingimage");
        assert!(Image::from_url("").is_none());
    }

    #[test]
    fn apply_to_keeps_image_when_not_resubmitted() {
        let mut listing = draft().into_listing(ListingId::generate());
        let update = ListingDraft {
            title: "Renamed".to_string(),
            country: None,
            image: None,
            ..draft()
        };

        update.apply_to(&mut listing);

        assert_eq!(listing.title, "Renamed");
        assert_eq!(listing.country.as_deref(), Some("United States"));
        assert_eq!(listing.image.unwrap().url, "http://x/y.png");
    }

    #[test]
    fn apply_to_replaces_supplied_optional_fields() {
        let mut listing = draft().into_listing(ListingId::generate());
        let update = ListingDraft {
            country: Some(String::new()),
            image: Image::from_url("https://cdn.example/new.jpg"),
            ..draft()
        };

        update.apply_to(&mut listing);

        assert_eq!(listing.country.as_deref(), Some(""));
        assert_eq!(listing.image.unwrap().url, "https://cdn.example/new.jpg");
    }

    #[test]
    fn listing_without_image_serializes_without_image_field() {
        let listing = ListingDraft {
            image: None,
            ..draft()
        }
        .into_listing(ListingId::generate());

        let value = serde_json::to_value(&listing).unwrap();
        assert!(value.get("image").is_none());
        assert_eq!(value["id"], listing.id.to_string());
    }
}
