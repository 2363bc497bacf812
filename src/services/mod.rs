// Service exports
pub mod cache;
pub mod catalog;
pub mod directory;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager, CachedDirectory};
pub use catalog::{CatalogClient, CatalogError};
pub use directory::{ActorDirectory, ReputationSink, ResolvedActor, ResolvedTarget, StaticDirectory, TargetDirectory};
pub use memory::MemoryStore;
pub use postgres::PostgresClient;
pub use store::{EngineStore, StoreError};
