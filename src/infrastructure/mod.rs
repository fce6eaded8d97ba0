// src/infrastructure/mod.rs
pub mod analytics;
pub mod storage;
