//! Heuristic parser for pasted or OCR'd recipe text.
//!
//! normalize -> title/servings -> section-state classifier -> step assembly
//! and chunking -> dedup. Nothing here fails: the worst case is a recipe
//! with empty collections.

pub mod classify;
pub mod finalize;
pub mod normalize;
pub mod steps;
pub mod title;
pub mod vocab;

use log::debug;

use crate::config::ClassifierConfig;
use crate::model::ParsedRecipe;
use classify::{step_score, Classification, LineKind, RawLine};
use vocab::{MARKER, SENTENCE_END};

pub use normalize::normalize_text;

/// Paragraphs with at least this much step evidence are kept by the prose fallback.
const PROSE_STEP_SCORE: f32 = 1.0;

/// Parse raw recipe text with the default classifier settings.
pub fn parse_text(text: &str) -> ParsedRecipe {
    parse_text_with_config(text, &ClassifierConfig::default())
}

/// Parse raw recipe text.
pub fn parse_text_with_config(text: &str, config: &ClassifierConfig) -> ParsedRecipe {
    let normalized = normalize_text(text);
    let plain: Vec<&str> = normalized.split('\n').collect();

    let title = title::guess_title(&plain, config.title_scan_lines);
    let servings = title::detect_servings(&plain, config.servings_scan_lines);

    let lines = classify::tokenize(&normalized);
    // The title line still counts as an ingredient when it reads like one
    let title_index = title
        .as_ref()
        .map(|t| t.line_index)
        .filter(|&i| lines.get(i).is_some_and(|l| l.score.ingredient < config.ingredient_threshold));
    let classification = classify::classify_lines(&lines, title_index, config);

    let mut step_texts = steps::assemble_steps(&classification.steps);
    if classification.steps.len() < 2 {
        let prose = prose_steps(&lines, title_index, &classification);
        if prose.len() > step_texts.len() {
            debug!("using {} prose paragraphs as steps", prose.len());
            step_texts = prose;
        }
    }

    let step_texts = step_texts
        .iter()
        .flat_map(|step| steps::chunk_step(step, config.max_step_len))
        .map(|step| MARKER.replace(&step, "").to_string());

    let notes = finalize::dedup_items(&classification.notes);

    debug!(
        "text parse: {} ingredient lines, {} step lines, {} headings",
        classification.ingredients.len(),
        classification.steps.len(),
        classification.headings.len()
    );

    ParsedRecipe {
        title: title.map(|t| t.title).unwrap_or_default(),
        servings,
        ingredients: finalize::dedup_items(&classification.ingredients),
        steps: finalize::dedup_items(step_texts),
        notes: (!notes.is_empty()).then(|| notes.join("\n")),
        source_url: None,
    }
}

/// Blank-line separated paragraphs that read as instructions.
///
/// Paragraphs touching an ingredient line, a heading, a note or an ignored
/// section are left out.
fn prose_steps(
    lines: &[RawLine<'_>],
    title_index: Option<usize>,
    classification: &Classification,
) -> Vec<String> {
    let excluded = |line: &RawLine<'_>| {
        Some(line.index) == title_index
            || classification.ingredient_lines.contains(&line.index)
            || classification.set_aside.contains(&line.index)
    };

    lines
        .split(|line| line.score.kind == LineKind::Blank)
        .filter(|para| !para.is_empty())
        .filter(|para| para.iter().all(|line| line.score.kind == LineKind::Content))
        .filter(|para| !para.iter().any(|line| excluded(line)))
        .map(|para| {
            para.iter()
                .map(|line| line.stripped.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| {
            step_score(text, false) >= PROSE_STEP_SCORE || SENTENCE_END.is_match(text)
        })
        .filter(|text| text.chars().count() > 2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headed_recipe() {
        let text = "Chocolate Cake\nIngredients\n2 cups flour\n1 cup sugar\nInstructions\n1. Preheat oven to 350F.\n2. Mix flour and sugar.";
        let recipe = parse_text(text);
        assert_eq!(recipe.title, "Chocolate Cake");
        assert_eq!(recipe.ingredients, vec!["2 cups flour", "1 cup sugar"]);
        assert_eq!(recipe.steps, vec!["Preheat oven to 350F", "Mix flour and sugar"]);
        assert_eq!(recipe.notes, None);
    }

    #[test]
    fn test_empty_input() {
        let recipe = parse_text("   \n\n ");
        assert!(recipe.is_empty());
        assert_eq!(recipe.title, "");
        assert_eq!(recipe.servings, "");
    }

    #[test]
    fn test_servings_and_time_lines_not_emitted() {
        let text = "Lemon Bars\nServes 8\nPrep Time: 15 minutes\nIngredients\n- 1 cup butter, softened\n- 2 cups flour\nDirections\n1. Preheat the oven to 350F.\n2. Press the crust into the pan.";
        let recipe = parse_text(text);
        assert_eq!(recipe.servings, "8");
        assert_eq!(recipe.ingredients, vec!["1 cup butter, softened", "2 cups flour"]);
        assert_eq!(recipe.steps.len(), 2);
        assert!(recipe
            .steps
            .iter()
            .chain(&recipe.ingredients)
            .all(|s| !s.contains("Serves") && !s.contains("Prep Time")));
    }

    #[test]
    fn test_ocr_marker_repaired_before_classification() {
        let text = "Pancakes for Two\nIngredients\n1 cup flour\n1 egg\nMethod\nl. Whisk everything together.\n2. Fry in a hot pan.";
        let recipe = parse_text(text);
        assert_eq!(recipe.steps, vec!["Whisk everything together", "Fry in a hot pan"]);
    }

    #[test]
    fn test_prose_fallback_paragraphs() {
        // Neither paragraph has enough verb evidence to classify line by line
        let text = "Simple Rice\n\n1 cup rice\n2 cups water\n\nWash the rice twice in cold water.\n\nLeave it covered on low for 18 minutes.";
        let recipe = parse_text(text);
        assert_eq!(recipe.ingredients, vec!["1 cup rice", "2 cups water"]);
        assert_eq!(
            recipe.steps,
            vec!["Wash the rice twice in cold water", "Leave it covered on low for 18 minutes"]
        );
    }

    #[test]
    fn test_title_line_that_reads_as_ingredient_is_kept() {
        let config = ClassifierConfig {
            ingredient_threshold: 1.0,
            ..ClassifierConfig::default()
        };
        let text = "Garlic Butter, melted\n2 tbsp butter\n1 clove garlic";
        let recipe = parse_text_with_config(text, &config);
        assert_eq!(recipe.title, "Garlic Butter, melted");
        assert_eq!(
            recipe.ingredients,
            vec!["Garlic Butter, melted", "2 tbsp butter", "1 clove garlic"]
        );
    }

    #[test]
    fn test_notes_kept_and_equipment_dropped() {
        let text = "Banana Bread Loaf\nIngredients\n3 ripe bananas\n2 cups flour\nInstructions\n1. Mash the bananas.\n2. Bake for 60 minutes.\nEquipment\nA loaf pan\nNotes\nFreezes well for a month.";
        let recipe = parse_text(text);
        assert_eq!(recipe.notes.as_deref(), Some("Freezes well for a month."));
        assert!(!recipe.ingredients.iter().any(|i| i.contains("loaf pan")));
        assert_eq!(recipe.steps, vec!["Mash the bananas", "Bake for 60 minutes"]);
    }
}
