use super::{decode_html_symbols, Extractor, ParsingContext};
use crate::error::RecipeError;
use crate::model::ParsedRecipe;
use log::debug;
use regex::Regex;
use scraper::Selector;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::LazyLock;

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*([\]}])").unwrap());

/// Reads schema.org `Recipe` objects from `application/ld+json` blocks.
pub struct JsonLdExtractor;

#[derive(Debug, Deserialize)]
struct JsonLdRecipe {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<TextValue>,
    #[serde(
        rename = "recipeIngredient",
        alias = "ingredients",
        default,
        deserialize_with = "lenient"
    )]
    recipe_ingredient: Option<RecipeIngredients>,
    #[serde(rename = "recipeInstructions")]
    recipe_instructions: Option<Value>,
    #[serde(rename = "recipeYield", default, deserialize_with = "lenient")]
    recipe_yield: Option<TextValue>,
}

/// Deserialize an optional field, treating an unexpected shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    List(Vec<IngredientEntry>),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngredientEntry {
    Text(String),
    Object(IngredientObject),
    /// Anything else is skipped
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    name: String,
    amount: Option<String>,
}

/// A text-ish field: a string, a number, or a list of either.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextValue {
    String(String),
    Number(serde_json::Number),
    Array(Vec<TextValue>),
}

impl TextValue {
    /// Flattened entries in document order.
    fn entries(&self) -> Vec<String> {
        match self {
            Self::String(s) => vec![s.clone()],
            Self::Number(n) => vec![n.to_string()],
            Self::Array(items) => items.iter().flat_map(Self::entries).collect(),
        }
    }

    fn first(&self) -> String {
        self.entries().into_iter().next().unwrap_or_default()
    }

    /// For yields, prefer the descriptive entry ("12 cookies") over a bare number.
    fn descriptive(&self) -> String {
        let entries = self.entries();
        entries
            .iter()
            .find(|s| s.contains(char::is_alphabetic))
            .or_else(|| entries.first())
            .cloned()
            .unwrap_or_default()
    }
}

/// Recursive shape of `recipeInstructions`.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionNode {
    /// A bare string
    Text(String),
    /// A `HowToStep`-like object with text
    Step(String),
    /// A `HowToSection` or nested array
    Section(Vec<InstructionNode>),
}

impl InstructionNode {
    /// Build the tree from JSON. Nodes without extractable text yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.trim().is_empty() => Some(Self::Text(text.clone())),
            Value::Array(items) => Some(Self::Section(
                items.iter().filter_map(Self::from_value).collect(),
            )),
            Value::Object(map) => {
                if let Some(children) = map.get("itemListElement") {
                    return match children {
                        Value::Array(_) => Self::from_value(children),
                        child => Self::from_value(child).map(|node| Self::Section(vec![node])),
                    };
                }
                // Prefer text over name
                ["text", "name"]
                    .iter()
                    .filter_map(|key| map.get(*key).and_then(Value::as_str))
                    .find(|text| !text.trim().is_empty())
                    .map(|text| Self::Step(text.to_string()))
            }
            _ => None,
        }
    }

    /// Leaf texts in depth-first, left-to-right order.
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<String>) {
        match self {
            Self::Text(text) | Self::Step(text) => out.push(text.clone()),
            Self::Section(children) => children.iter().for_each(|c| c.collect_leaves(out)),
        }
    }
}

/// Split a single instruction string after sentence punctuation.
fn split_instruction_text(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BREAK.find_iter(text) {
        out.push(text[start..m.start() + 1].to_string());
        start = m.end();
    }
    out.push(text[start..].to_string());
    out
}

fn instruction_texts(value: &Value) -> Vec<String> {
    let leaves = match value {
        Value::String(text) => split_instruction_text(&decode_html_symbols(text)),
        other => InstructionNode::from_value(other)
            .map(|node| node.flatten())
            .unwrap_or_default(),
    };
    leaves
        .iter()
        .map(|leaf| collapse(&decode_html_symbols(leaf)))
        .filter(|leaf| !leaf.is_empty())
        .collect()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_recipe_token(token: &str) -> bool {
    let token = token.trim();
    let local = token
        .strip_prefix("schema:")
        .or_else(|| token.strip_prefix("http://schema.org/"))
        .or_else(|| token.strip_prefix("https://schema.org/"))
        .unwrap_or(token);
    local.eq_ignore_ascii_case("recipe")
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => is_recipe_token(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(is_recipe_token),
        _ => false,
    }
}

/// Objects a JSON-LD block offers as recipe candidates.
fn candidates(json_ld: &Value) -> Vec<&Value> {
    match json_ld {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("@graph") {
            Some(Value::Array(graph)) => graph.iter().collect(),
            _ => vec![json_ld],
        },
        _ => Vec::new(),
    }
}

fn parse_block(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw.trim()).or_else(|strict_err| {
        debug!("JsonLdExtractor: strict parse failed ({strict_err}), retrying leniently");
        serde_json::from_str(&sanitize_json(raw))
    })
}

fn sanitize_json(json_str: &str) -> String {
    let mut cleaned = json_str.trim().to_string();

    // Remove any HTML comments that might be present
    cleaned = cleaned.replace("<!--", "").replace("-->", "");

    if !cleaned.starts_with('{') && !cleaned.starts_with('[') {
        if let Some(start) = cleaned.find(['{', '[']) {
            cleaned = cleaned[start..].to_string();
        }
    }

    TRAILING_COMMA.replace_all(&cleaned, "$1").into_owned()
}

impl JsonLdExtractor {
    fn convert_to_recipe(&self, recipe: JsonLdRecipe, url: &str) -> ParsedRecipe {
        let ingredients: Vec<String> = match recipe.recipe_ingredient {
            Some(RecipeIngredients::List(entries)) => entries
                .into_iter()
                .filter_map(|entry| match entry {
                    IngredientEntry::Text(text) => Some(text),
                    IngredientEntry::Object(ing) => {
                        let amount = ing.amount.as_deref().unwrap_or("").trim();
                        if amount.is_empty() {
                            Some(ing.name)
                        } else {
                            Some(format!("{amount} {}", ing.name))
                        }
                    }
                    IngredientEntry::Other(_) => None,
                })
                .collect(),
            Some(RecipeIngredients::Text(text)) => text.lines().map(str::to_string).collect(),
            None => Vec::new(),
        }
        .iter()
        .map(|ing| collapse(&decode_html_symbols(ing)))
        .filter(|ing| !ing.is_empty())
        .collect();

        let steps = recipe
            .recipe_instructions
            .as_ref()
            .map(instruction_texts)
            .unwrap_or_default();

        let servings = recipe
            .recipe_yield
            .as_ref()
            .map(TextValue::descriptive)
            .unwrap_or_default();
        let title = recipe.name.as_ref().map(TextValue::first).unwrap_or_default();

        ParsedRecipe {
            title: collapse(&decode_html_symbols(&title)),
            servings: collapse(&servings),
            ingredients,
            steps,
            notes: None,
            source_url: Some(url.to_string()).filter(|u| !u.is_empty()),
        }
    }
}

impl Extractor for JsonLdExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<ParsedRecipe, RecipeError> {
        let selector = Selector::parse("script[type='application/ld+json']").unwrap();
        let scripts: Vec<_> = context.document.select(&selector).collect();
        debug!("JsonLdExtractor: Found {} JSON-LD script tags", scripts.len());

        for (index, script) in scripts.iter().enumerate() {
            let raw_json = script.inner_html();
            let json_ld = match parse_block(&raw_json) {
                Ok(json_ld) => json_ld,
                Err(e) => {
                    debug!("JsonLdExtractor: Failed to parse JSON-LD {index}: {e}");
                    continue;
                }
            };

            let Some(candidate) = candidates(&json_ld).into_iter().find(|c| is_recipe_type(c))
            else {
                debug!("JsonLdExtractor: No recipe found in JSON-LD {index}");
                continue;
            };

            match JsonLdRecipe::deserialize(candidate) {
                Ok(recipe) => {
                    let recipe = self.convert_to_recipe(recipe, &context.url);
                    if recipe.is_empty() {
                        debug!("JsonLdExtractor: Recipe in JSON-LD {index} has no ingredients or steps");
                        return Err(RecipeError::NoRecipeFound);
                    }
                    return Ok(recipe);
                }
                Err(e) => {
                    debug!("JsonLdExtractor: Failed to read recipe in JSON-LD {index}: {e}");
                }
            }
        }

        Err(RecipeError::NoRecipeFound)
    }
}
