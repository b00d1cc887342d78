pub mod memory;
pub mod mongo;

pub use memory::InMemoryRepository;
pub use mongo::MongoRepository;
pub use wanderlust_core::{ReadRepository, Repository, StorageError};
