use serde::{Deserialize, Serialize};

/// A recipe in normalized form, produced by every ingestion path.
///
/// `ingredients` and `steps` never hold blank entries, contain no
/// case-insensitive duplicates and keep first-seen document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecipe {
    pub title: String,
    pub servings: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl ParsedRecipe {
    /// True when neither ingredients nor steps were found.
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.steps.is_empty()
    }
}

/// JSON body returned for a URL parse request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub source_url: String,
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

impl From<ParsedRecipe> for RecipeResponse {
    fn from(recipe: ParsedRecipe) -> Self {
        RecipeResponse {
            source_url: recipe.source_url.unwrap_or_default(),
            title: recipe.title.trim().to_string(),
            ingredients: recipe.ingredients,
            steps: recipe.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_and_skips_missing_optionals() {
        let recipe = ParsedRecipe {
            title: "Toast".to_string(),
            ingredients: vec!["1 slice bread".to_string()],
            steps: vec!["Toast the bread".to_string()],
            ..Default::default()
        };

        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["title"], "Toast");
        assert!(json.get("notes").is_none());
        assert!(json.get("sourceUrl").is_none());

        let response = RecipeResponse::from(ParsedRecipe {
            source_url: Some("https://example.com/toast".to_string()),
            ..recipe
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["sourceUrl"], "https://example.com/toast");
        assert_eq!(json["steps"][0], "Toast the bread");
    }
}
