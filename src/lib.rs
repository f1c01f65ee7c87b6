//! ws-cardlist - Weiss Schwarz card list crawler
//!
//! Extracts card records from the official card list, groups them per
//! product, links cards that mention each other and writes one JSON document
//! per product along with the card artwork.

pub mod application;
pub mod domain;
pub mod infrastructure;
