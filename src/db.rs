pub mod error;
pub mod models;
pub mod pool;
pub mod seeing_repository;
pub mod store;

pub use error::DbError;
pub use models::*;
pub use pool::DbPool;
pub use seeing_repository::SeeingRepository;
pub use store::ForecastStore;
