// src/services/mod.rs
pub mod bands;
pub mod provider;
pub mod report;
pub mod scan;
pub mod screener;
pub mod yahoo;
