/// Database layer: sqlx/Postgres repositories
pub mod collection_repo;
pub mod image_repo;
pub mod schema;
pub mod tag_repo;

pub use schema::ensure_gallery_tables;
