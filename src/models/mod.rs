// src/models/mod.rs

pub mod organization;

// Re-exports

pub use organization::{derive_slug, OrganizationRecord, ScrapedReading, SeedEntry};
