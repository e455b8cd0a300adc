//! Recipe extraction from fetched HTML documents.

use html_escape::decode_html_entities;
use scraper::{ElementRef, Html};

use crate::error::RecipeError;
use crate::model::ParsedRecipe;

mod dom_fallback;
mod json_ld;

pub use dom_fallback::DomFallbackExtractor;
pub use json_ld::{InstructionNode, JsonLdExtractor};

pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }
}

pub trait Extractor {
    fn parse(&self, context: &ParsingContext) -> Result<ParsedRecipe, RecipeError>;
}

/// Text content of an element with whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn decode_html_symbols(text: &str) -> String {
    // for some reason need to decode twice to get the correct string
    decode_html_entities(&decode_html_entities(text)).into_owned()
}
