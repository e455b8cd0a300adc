pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod html;
pub mod model;
pub mod ocr;
pub mod text;

use log::{debug, info};

pub use config::{load_settings, ClassifierConfig, LimitsConfig, Settings};
pub use error::RecipeError;
pub use html::{Extractor, ParsingContext};
pub use model::{ParsedRecipe, RecipeResponse};
pub use ocr::{parse_images, GoogleVisionEngine, ImageSource, OcrBatch, OcrEngine, OcrPage};
pub use text::{normalize_text, parse_text, parse_text_with_config};

use crate::fetch::RequestFetcher;
use crate::html::{DomFallbackExtractor, JsonLdExtractor};
use crate::text::finalize::{collapse_whitespace, finalize_items};

/// Fetch `url` and extract its recipe with default settings.
///
/// # Errors
/// Returns an error if the URL is not http(s), the request fails, or the
/// server answers with a non-success status.
pub async fn fetch_recipe(url: &str) -> Result<ParsedRecipe, RecipeError> {
    fetch_recipe_with_settings(url, &Settings::default()).await
}

/// Fetch `url` and extract its recipe.
pub async fn fetch_recipe_with_settings(
    url: &str,
    settings: &Settings,
) -> Result<ParsedRecipe, RecipeError> {
    let url = api::validate_url(Some(url))?;
    let fetcher = RequestFetcher::new(&settings.fetch)?;
    let body = fetcher.fetch(url).await?;

    let context = ParsingContext::new(url, &body);
    Ok(parse_document(&context, &settings.limits))
}

/// The structured-markup recipe in `context`, if there is one.
pub fn extract_recipe(context: &ParsingContext) -> Option<ParsedRecipe> {
    JsonLdExtractor.parse(context).ok()
}

/// Best-effort recipe from a parsed page: structured markup, else DOM heuristics.
pub fn parse_document(context: &ParsingContext, limits: &LimitsConfig) -> ParsedRecipe {
    let recipe = match extract_recipe(context) {
        Some(recipe) => {
            info!("Extracted recipe from JSON-LD");
            recipe
        }
        None => {
            debug!("No JSON-LD recipe, falling back to DOM selectors");
            // The fallback extractor never fails
            DomFallbackExtractor::new(limits)
                .parse(context)
                .unwrap_or_default()
        }
    };

    ParsedRecipe {
        title: collapse_whitespace(&recipe.title),
        servings: collapse_whitespace(&recipe.servings),
        ingredients: finalize_items(recipe.ingredients, limits.max_items),
        steps: finalize_items(recipe.steps, limits.max_items),
        notes: recipe.notes,
        source_url: Some(context.url.clone()).filter(|u| !u.is_empty()),
    }
}

/// [`parse_document`] over raw HTML with default limits.
pub fn parse_html(html: &str, url: &str) -> ParsedRecipe {
    parse_document(&ParsingContext::new(url, html), &LimitsConfig::default())
}
