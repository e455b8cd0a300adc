use super::{element_text, Extractor, ParsingContext};
use crate::config::LimitsConfig;
use crate::error::RecipeError;
use crate::model::ParsedRecipe;
use log::debug;
use scraper::{ElementRef, Html, Selector};

/// Selector-driven extraction for pages without recipe markup.
///
/// Never fails: anything it cannot find is left empty.
pub struct DomFallbackExtractor {
    max_fallback_steps: usize,
}

const TITLE_SELECTORS: &[&str] = &[
    "meta[property='og:title']",
    "meta[name='twitter:title']",
    "meta[property='twitter:title']",
];

const INGREDIENT_SELECTORS: &[&str] = &[
    "[itemprop='recipeIngredient']",
    ".ingredients li",
    "ul.ingredients li",
    "ol.ingredients li",
    "li.ingredient",
    ".recipe-ingredients li",
    ".ingredients__list li",
];

const STEP_CONTAINERS: &str = "[class*='instruction'], [id*='instruction'], \
    [class*='direction'], [id*='direction'], [class*='method'], [id*='method'], \
    [class*='step'], [id*='step']";

const SERVINGS_SELECTORS: &[&str] = &[
    "[itemprop='recipeYield']",
    ".wprm-recipe-servings",
    ".recipe-yield",
    ".recipe-servings",
    ".tasty-recipes-yield",
    ".mv-create-yield",
    ".recipe-card-servings",
    ".wpzoom-recipe-servings",
];

/// Containers searched for instruction items.
const MAX_STEP_CONTAINERS: usize = 3;
/// Fewer candidates than this counts as "not found".
const MIN_ITEMS: usize = 2;

impl Default for DomFallbackExtractor {
    fn default() -> Self {
        Self::new(&LimitsConfig::default())
    }
}

impl DomFallbackExtractor {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_fallback_steps: limits.max_fallback_steps,
        }
    }

    fn title(&self, document: &Html) -> String {
        let meta_title = TITLE_SELECTORS
            .iter()
            .filter_map(|s| Selector::parse(s).ok())
            .filter_map(|selector| {
                document
                    .select(&selector)
                    .filter_map(|el| el.value().attr("content"))
                    .map(|content| content.split_whitespace().collect::<Vec<_>>().join(" "))
                    .find(|content| !content.is_empty())
            })
            .next();

        meta_title
            .or_else(|| {
                let selector = Selector::parse("h1").ok()?;
                document.select(&selector).next().map(element_text)
            })
            .unwrap_or_default()
    }

    fn ingredients(&self, document: &Html) -> Vec<String> {
        for selector_str in INGREDIENT_SELECTORS {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            let items = texts(document.select(&selector));
            if items.len() >= MIN_ITEMS {
                debug!("Found {} ingredients using selector: {}", items.len(), selector_str);
                return items;
            }
        }
        Vec::new()
    }

    fn steps(&self, document: &Html) -> Vec<String> {
        let mut items = Vec::new();
        if let (Ok(containers), Ok(li), Ok(p)) = (
            Selector::parse(STEP_CONTAINERS),
            Selector::parse("li"),
            Selector::parse("p"),
        ) {
            for container in document.select(&containers).take(MAX_STEP_CONTAINERS) {
                items.extend(texts(container.select(&li)));
                if items.len() < MIN_ITEMS {
                    items.extend(texts(container.select(&p)));
                }
            }
        }

        if items.len() >= MIN_ITEMS {
            debug!("Found {} steps in instruction containers", items.len());
            return items;
        }

        match Selector::parse("ol li") {
            Ok(selector) => {
                let items: Vec<String> = texts(document.select(&selector))
                    .into_iter()
                    .take(self.max_fallback_steps)
                    .collect();
                debug!("Falling back to {} ordered-list items as steps", items.len());
                items
            }
            Err(_) => items,
        }
    }

    fn servings(&self, document: &Html) -> String {
        SERVINGS_SELECTORS
            .iter()
            .filter_map(|s| Selector::parse(s).ok())
            .find_map(|selector| {
                document.select(&selector).find_map(|el| {
                    let text = el
                        .value()
                        .attr("content")
                        .map(|c| c.split_whitespace().collect::<Vec<_>>().join(" "))
                        .unwrap_or_else(|| element_text(el));
                    (!text.is_empty()).then_some(text)
                })
            })
            .unwrap_or_default()
    }
}

fn texts<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    elements
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

impl Extractor for DomFallbackExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<ParsedRecipe, RecipeError> {
        debug!("Attempting to extract recipe using DOM selectors");
        let document = &context.document;

        Ok(ParsedRecipe {
            title: self.title(document),
            servings: self.servings(document),
            ingredients: self.ingredients(document),
            steps: self.steps(document),
            notes: None,
            source_url: Some(context.url.clone()).filter(|u| !u.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> ParsedRecipe {
        DomFallbackExtractor::default()
            .parse(&ParsingContext::new("https://example.com", html))
            .unwrap()
    }

    #[test]
    fn test_title_precedence() {
        let recipe = parse(
            r#"<html><head>
                <meta name="twitter:title" content="Twitter Title">
                <meta property="og:title" content="  OG   Title ">
            </head><body><h1>Heading</h1></body></html>"#,
        );
        assert_eq!(recipe.title, "OG Title");

        let recipe = parse(r#"<html><head><meta property="og:title" content=""></head><body><h1> Big  <em>Heading</em></h1></body></html>"#);
        assert_eq!(recipe.title, "Big Heading");
    }

    #[test]
    fn test_first_selector_with_two_results_wins() {
        let recipe = parse(
            r#"<html><body>
                <span itemprop="recipeIngredient">only one</span>
                <ul class="ingredients"><li>2 eggs</li><li> 1 cup   milk </li><li></li></ul>
            </body></html>"#,
        );
        assert_eq!(recipe.ingredients, vec!["2 eggs", "1 cup milk"]);
    }

    #[test]
    fn test_instruction_container_list_then_paragraphs() {
        let recipe = parse(
            r#"<html><body>
                <div class="recipe-directions">
                    <p>Whisk the eggs.</p>
                    <p>Fry gently.</p>
                </div>
            </body></html>"#,
        );
        assert_eq!(recipe.steps, vec!["Whisk the eggs.", "Fry gently."]);
    }

    #[test]
    fn test_ordered_list_fallback_capped() {
        let items: String = (1..=60).map(|i| format!("<li>Do thing {i}</li>")).collect();
        let recipe = parse(&format!("<html><body><ol>{items}</ol></body></html>"));
        assert_eq!(recipe.steps.len(), 50);
        assert_eq!(recipe.steps[0], "Do thing 1");
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn test_servings_from_yield_markup() {
        let recipe = parse(
            r#"<html><body><span class="recipe-yield">Makes <b>12</b></span></body></html>"#,
        );
        assert_eq!(recipe.servings, "Makes 12");
    }

    #[test]
    fn test_empty_page() {
        let recipe = parse("<html><body><p>Nothing to see</p></body></html>");
        assert!(recipe.is_empty());
        assert_eq!(recipe.title, "");
    }
}
