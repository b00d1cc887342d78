use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wanderlust_core::error::{Result, StorageError};
use wanderlust_core::{Image, Listing, ListingDraft, ListingId, ReadRepository, Repository};

/// Name of the collection holding listing documents.
pub const COLLECTION: &str = "listings";

/// Server error code for a duplicate key on a unique index.
const DUPLICATE_KEY: i32 = 11000;

/// MongoDB implementation of the repository contract.
///
/// Ids are generated client-side so the inserted listing can be returned
/// without a second round trip. Updates use `$set`, so fields missing from
/// a draft (`country`, `image`) keep their stored value.
#[derive(Debug, Clone)]
pub struct MongoRepository {
    client: Client,
    listings: Collection<ListingDocument>,
}

/// Stored shape of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ListingDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    price: f64,
    description: String,
    location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<Image>,
}

impl ListingDocument {
    fn into_listing(self) -> Listing {
        Listing {
            id: ListingId::from(self.id),
            title: self.title,
            price: self.price,
            description: self.description,
            location: self.location,
            country: self.country,
            image: self.image,
        }
    }
}

impl From<&Listing> for ListingDocument {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.object_id(),
            title: listing.title.clone(),
            price: listing.price,
            description: listing.description.clone(),
            location: listing.location.clone(),
            country: listing.country.clone(),
            image: listing.image.clone(),
        }
    }
}

impl MongoRepository {
    /// Creates a repository on top of an existing client.
    pub fn new(client: Client, database: &str) -> Self {
        let listings = client.database(database).collection(COLLECTION);
        Self { client, listings }
    }

    /// Connects to the server at `uri` and checks it is reachable.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await.map_err(map_mongo_error)?;
        client
            .database(database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(map_mongo_error)?;
        debug!(database, "connected to mongodb");
        Ok(Self::new(client, database))
    }

    /// Returns a reference to the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Closes the client, waiting for in-flight operations to finish.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

fn by_id(id: &ListingId) -> Document {
    doc! { "_id": id.object_id() }
}

fn set_fields(draft: &ListingDraft) -> Document {
    let mut fields = doc! {
        "title": draft.title.as_str(),
        "price": draft.price,
        "description": draft.description.as_str(),
        "location": draft.location.as_str(),
    };
    if let Some(country) = &draft.country {
        fields.insert("country", country.as_str());
    }
    if let Some(image) = &draft.image {
        fields.insert(
            "image",
            doc! { "url": image.url.as_str(), "filename": image.filename.as_str() },
        );
    }
    doc! { "$set": fields }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

fn map_mongo_error(err: mongodb::error::Error) -> StorageError {
    let message = err.to_string();

    match err.kind.as_ref() {
        ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            StorageError::Timeout(message)
        }
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Shutdown => StorageError::Unavailable(message),
        ErrorKind::BsonDeserialization(_) | ErrorKind::InvalidResponse { .. } => {
            StorageError::InvalidData(message)
        }
        ErrorKind::InvalidArgument { .. } => StorageError::Operation(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MongoRepository {
    async fn list(&self) -> Result<Vec<Listing>> {
        let mut cursor = self
            .listings
            .find(doc! {})
            .await
            .map_err(map_mongo_error)?;

        let mut listings = Vec::new();
        while cursor.advance().await.map_err(map_mongo_error)? {
            let document = cursor.deserialize_current().map_err(map_mongo_error)?;
            listings.push(document.into_listing());
        }
        Ok(listings)
    }

    async fn get(&self, id: &ListingId) -> Result<Option<Listing>> {
        let document = self
            .listings
            .find_one(by_id(id))
            .await
            .map_err(map_mongo_error)?;
        Ok(document.map(ListingDocument::into_listing))
    }
}

#[async_trait]
impl Repository for MongoRepository {
    async fn insert(&self, draft: ListingDraft) -> Result<Listing> {
        let listing = draft.into_listing(ListingId::generate());

        match self.listings.insert_one(ListingDocument::from(&listing)).await {
            Ok(_) => Ok(listing),
            Err(err) if is_duplicate_key(&err) => Err(StorageError::Conflict(listing.id.to_string())),
            Err(err) => Err(map_mongo_error(err)),
        }
    }

    async fn update(&self, id: &ListingId, draft: ListingDraft) -> Result<Option<Listing>> {
        let document = self
            .listings
            .find_one_and_update(by_id(id), set_fields(&draft))
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?;
        Ok(document.map(ListingDocument::into_listing))
    }

    async fn delete(&self, id: &ListingId) -> Result<bool> {
        let result = self
            .listings
            .delete_one(by_id(id))
            .await
            .map_err(map_mongo_error)?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    fn draft() -> ListingDraft {
        ListingDraft {
            title: "Loft".to_string(),
            price: 99.5,
            description: "Open plan".to_string(),
            location: "Berlin".to_string(),
            country: None,
            image: None,
        }
    }

    #[test]
    fn set_fields_omits_absent_optional_fields() {
        let update = set_fields(&draft());
        let fields = update.get_document("$set").unwrap();

        assert_eq!(fields.get_str("title").unwrap(), "Loft");
        assert_eq!(fields.get_f64("price").unwrap(), 99.5);
        assert!(!fields.contains_key("country"));
        assert!(!fields.contains_key("image"));
    }

    #[test]
    fn set_fields_includes_supplied_image() {
        let update = set_fields(&ListingDraft {
            country: Some(String::new()),
            image: Image::from_url("http://x/y.png"),
            ..draft()
        });
        let fields = update.get_document("$set").unwrap();
        let image = fields.get_document("image").unwrap();

        assert_eq!(fields.get_str("country").unwrap(), "");
        assert_eq!(image.get_str("url").unwrap(), "http://x/y.png");
        assert_eq!(image.get_str("filename").unwrap(), "listingimage");
    }

    #[test]
    fn document_without_image_has_no_image_field() {
        let listing = draft().into_listing(ListingId::generate());
        let document = bson::to_document(&ListingDocument::from(&listing)).unwrap();

        assert_eq!(document.get_object_id("_id").unwrap(), listing.id.object_id());
        assert!(!document.contains_key("image"));
        assert!(!document.contains_key("country"));
    }

    #[test]
    fn document_round_trips_into_listing() {
        let listing = ListingDraft {
            image: Image::from_url("http://x/y.png"),
            ..draft()
        }
        .into_listing(ListingId::generate());
        let document = bson::to_document(&ListingDocument::from(&listing)).unwrap();
        let decoded: ListingDocument = bson::from_document(document).unwrap();

        assert_eq!(decoded.into_listing(), listing);
    }

    #[test]
    fn null_image_is_read_as_absent() {
        let id = ObjectId::new();
        let document = doc! {
            "_id": id,
            "title": "Old",
            "price": 10,
            "description": "Imported before images were optional",
            "location": "Goa",
            "image": null,
        };
        let decoded: ListingDocument = bson::from_document(document).unwrap();
        let listing = decoded.into_listing();

        assert_eq!(listing.price, 10.0);
        assert!(listing.image.is_none());
    }
}
