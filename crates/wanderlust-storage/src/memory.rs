use async_trait::async_trait;
use dashmap::DashMap;
use wanderlust_core::error::Result;
use wanderlust_core::{Listing, ListingDraft, ListingId, ReadRepository, Repository};

/// In-memory implementation of the repository traits using DashMap.
///
/// DashMap uses sharded locks, so concurrent requests touching different
/// listings never block each other. Writes to the same listing are
/// last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<ListingId, Listing>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn list(&self) -> Result<Vec<Listing>> {
        let mut listings: Vec<Listing> = self
            .storage
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        // Object ids embed their creation time, so id order is creation order.
        listings.sort_by_key(|listing| listing.id);
        Ok(listings)
    }

    async fn get(&self, id: &ListingId) -> Result<Option<Listing>> {
        Ok(self.storage.get(id).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, draft: ListingDraft) -> Result<Listing> {
        let listing = draft.into_listing(ListingId::generate());
        self.storage.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn update(&self, id: &ListingId, draft: ListingDraft) -> Result<Option<Listing>> {
        let Some(mut entry) = self.storage.get_mut(id) else {
            return Ok(None);
        };
        draft.apply_to(entry.value_mut());
        Ok(Some(entry.value().clone()))
    }

    async fn delete(&self, id: &ListingId) -> Result<bool> {
        Ok(self.storage.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wanderlust_core::Image;

    fn draft(title: &str) -> ListingDraft {
        ListingDraft {
            title: title.to_string(),
            price: 100.0,
            description: "A quiet place".to_string(),
            location: "Lisbon".to_string(),
            country: Some("Portugal".to_string()),
            image: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_get_returns_listing() {
        let repo = InMemoryRepository::new();

        let created = repo.insert(draft("Loft")).await.unwrap();
        let fetched = repo.get(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Loft");
    }

    #[tokio::test]
    async fn insert_never_reuses_ids() {
        let repo = InMemoryRepository::new();

        let a = repo.insert(draft("A")).await.unwrap();
        let b = repo.insert(draft("A")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn list_returns_listings_in_creation_order() {
        let repo = InMemoryRepository::with_capacity(4);
        for title in ["first", "second", "third"] {
            repo.insert(draft(title)).await.unwrap();
        }

        let titles: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|listing| listing.title)
            .collect();

        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.get(&ListingId::generate()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_merges_into_existing_listing() {
        let repo = InMemoryRepository::new();
        let created = repo
            .insert(ListingDraft {
                image: Image::from_url("http://x/y.png"),
                ..draft("Loft")
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                &created.id,
                ListingDraft {
                    price: 250.0,
                    country: None,
                    ..draft("Penthouse")
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Penthouse");
        assert_eq!(updated.price, 250.0);
        assert_eq!(updated.country.as_deref(), Some("Portugal"));
        assert_eq!(updated.image, created.image);
        assert_eq!(repo.get(&created.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let repo = InMemoryRepository::new();
        let updated = repo
            .update(&ListingId::generate(), draft("Ghost"))
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn delete_is_reported_once() {
        let repo = InMemoryRepository::new();
        let created = repo.insert(draft("Loft")).await.unwrap();

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(repo.get(&created.id).await.unwrap().is_none());
        assert!(!repo.delete(&created.id).await.unwrap());
    }
}
