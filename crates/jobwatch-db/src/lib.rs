pub mod config;
pub mod database;
pub mod filter_repository;
pub mod watermark_repository;

pub use config::DatabaseConfig;
pub use database::Database;
pub use filter_repository::FilterRepository;
pub use watermark_repository::WatermarkRepository;
