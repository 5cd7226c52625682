pub mod models;
pub mod pg_repository;
pub mod repositories;

pub use models::{IdentityMapping, LocalEntityType, SyncStatus};
pub use pg_repository::PgIdentityMapRepository;
pub use repositories::IdentityMapRepository;
