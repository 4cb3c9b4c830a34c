pub mod ask;
pub mod config;
pub mod index;
pub mod ingest;
pub mod readme;
pub mod repos;
pub mod wiki;
