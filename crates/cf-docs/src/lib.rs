//! # cf-docs
//!
//! Reference documentation for the tools cmdforge drives: a fixed catalog
//! of pages grouped by category, fetched on demand and reduced to plain
//! text for reading or searching.

pub mod catalog;
pub mod client;
pub mod text;

pub use catalog::{DocCatalog, DocCategory, DocSource, ALL_CATEGORIES};
pub use client::{DocsClient, SearchHit};
