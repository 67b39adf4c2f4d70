// src/utils/mod.rs
pub mod utils;
