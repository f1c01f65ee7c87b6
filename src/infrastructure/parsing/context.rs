//! Parsing context for catalog pages
//!
//! Provides context objects for maintaining state during parsing operations.

/// Context information for parsing one result page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Current page being parsed, starting at 1
    pub page_number: u32,

    /// Base URL for resolving relative links
    pub base_url: String,
}

impl ParseContext {
    /// Create new parse context
    pub fn new(page_number: u32, base_url: impl Into<String>) -> Self {
        Self {
            page_number,
            base_url: base_url.into(),
        }
    }
}
