// src/database/mod.rs
pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;
