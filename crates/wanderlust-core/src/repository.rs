use crate::error::Result;
use crate::listing::{Listing, ListingDraft, ListingId};
use async_trait::async_trait;

/// A read-only view of a listing repository.
///
/// The index, show and edit-form pages only need these operations.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Returns every stored listing.
    async fn list(&self) -> Result<Vec<Listing>>;

    /// Retrieves the listing with the given id.
    /// Returns `None` if the id does not exist.
    async fn get(&self, id: &ListingId) -> Result<Option<Listing>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Persists a new listing and returns it with its assigned id.
    async fn insert(&self, draft: ListingDraft) -> Result<Listing>;

    /// Merges the draft into the listing with the given id, following
    /// [`ListingDraft::apply_to`]. Returns the updated listing, or `None`
    /// if the id does not exist.
    async fn update(&self, id: &ListingId, draft: ListingDraft) -> Result<Option<Listing>>;

    /// Deletes the listing with the given id.
    /// Returns `true` if the listing existed and was removed.
    async fn delete(&self, id: &ListingId) -> Result<bool>;
}
