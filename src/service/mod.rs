// src/service/mod.rs
pub mod dto;
pub mod signal_service;

pub use signal_service::SignalService;
