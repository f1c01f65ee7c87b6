//! Domain module - card records, product groupings and collaborator seams
//!
//! This module contains the catalog entities and value types shared by the
//! extraction pipeline, plus the traits the crawl uses to reach the outside
//! world (catalog pages and image storage).
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod card;
pub mod collaborators;
pub mod product;

// Re-export commonly used items for convenience
pub use card::{CardRecord, Category, Color, Field, UNKNOWN_MARKER};
pub use collaborators::{CatalogFilter, CatalogSource, ImageStore};
pub use product::{ProductGrouping, ProductId};
