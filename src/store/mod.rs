//! Durable cache of per-repository documentation state
//!
//! # Modules
//!
//! - [`types`]: `DocumentEntry` and the `DocumentSet` answer map
//! - [`json_store`]: `DocumentStore` trait and its JSON file implementation

pub mod json_store;
pub mod types;

pub use json_store::{DocumentStore, JsonStore};
pub use types::{DocumentEntry, DocumentSet};
