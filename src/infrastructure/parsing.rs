//! HTML parsing infrastructure for the card list
//!
//! Trait-based parsing: the list parser splits result pages into rows, the
//! row parser turns each row into a card record through the field normalizer.

pub mod card_list_parser;
pub mod card_row_parser;
pub mod config;
pub mod context;
pub mod error;
pub mod normalizer;

// Re-export public types
pub use card_list_parser::{CardListParser, CatalogPage};
pub use card_row_parser::{CardRowParser, UnitField};
pub use config::{CardListSelectors, FieldLabels, NormalizerTables, ParsingConfig, RarityRule};
pub use context::ParseContext;
pub use error::{ParsingError, ParsingResult};
pub use normalizer::FieldNormalizer;

use scraper::Html;

/// Parser trait with context support
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}
