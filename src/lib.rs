// Export all necessary modules
pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod query;
pub mod service;
pub mod summary;
pub mod utils;
