//! Core types and traits for the Wanderlust listings service.
//!
//! This crate provides the listing entity model, the write-path validation
//! schema and the repository contract shared by the storage backends and
//! the web frontend.

pub mod error;
pub mod listing;
pub mod repository;
pub mod validation;

pub use error::{CoreError, StorageError};
pub use listing::{Image, Listing, ListingDraft, ListingId, PLACEHOLDER_IMAGE_FILENAME};
pub use repository::{ReadRepository, Repository};
pub use validation::{validate_listing, Violation, Violations};
