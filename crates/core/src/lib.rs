pub mod analyzer;
pub mod config;
pub mod manifest;
pub mod probe;
pub mod report;
pub mod repository;
pub mod result;
pub mod static_analysis;
