// src/handlers/mod.rs
pub mod bands;
pub mod error;
pub mod quote;
pub mod scan;
