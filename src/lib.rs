pub mod actors;
pub mod api;
pub mod config;
pub mod models;
pub mod reports;
pub mod storage;
pub mod stores;
pub mod types;
