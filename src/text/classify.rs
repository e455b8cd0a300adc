//! Per-line scoring and the section-mode state machine.
//!
//! Every line gets an independent [`LineScore`]; a [`SectionState`] threaded
//! through a fold over the lines biases those scores towards the section the
//! last heading opened, and the decision rule in [`classify_line`] turns the
//! biased scores into a [`LineClass`].

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

use super::vocab::{
    COOKING_VERB, DURATION_OR_TEMP, FOOD, HEADING_INGREDIENTS, HEADING_NOTES, HEADING_OTHER,
    HEADING_STEPS, INLINE_NOTE, LEADING_QUANTITY, LEADING_VERB, MARKER, MEASURE, MULTIPLIER,
    NOISE_PATTERNS, PARENTHETICAL, PREP_QUALIFIER, QUANTITY, SENTENCE_END, SERVINGS_LINE,
    SERVING_QUALIFIER, STEP_MARKER, TIME_LABEL, UNIT,
};
use crate::config::ClassifierConfig;

/// Ingredient evidence a line needs to be taken as an ingredient.
pub const INGREDIENT_THRESHOLD: f32 = 1.8;
/// Step evidence a line needs to be taken as a step.
pub const STEP_THRESHOLD: f32 = 1.6;
/// Added to the score matching the current section.
pub const SECTION_BONUS: f32 = 0.8;
pub const TITLE_SCAN_LINES: usize = 40;
pub const SERVINGS_SCAN_LINES: usize = 50;

// Ingredient evidence
const LEADING_QUANTITY_WEIGHT: f32 = 2.0;
const EMBEDDED_QUANTITY_WEIGHT: f32 = 0.5;
const UNIT_WEIGHT: f32 = 1.0;
const MEASURE_WEIGHT: f32 = 1.0;
const PREP_QUALIFIER_WEIGHT: f32 = 0.7;
const MULTIPLIER_WEIGHT: f32 = 0.5;
const FOOD_WEIGHT: f32 = 0.6;
const INGREDIENT_MARKER_WEIGHT: f32 = 0.6;

// Step evidence
const VERB_WEIGHT: f32 = 1.6;
const LEADING_VERB_WEIGHT: f32 = 1.5;
const STEP_MARKER_WEIGHT: f32 = 0.8;
const SENTENCE_END_WEIGHT: f32 = 0.4;
const DURATION_WEIGHT: f32 = 0.5;
const STEP_NUMBER_WEIGHT: f32 = 0.8;
const TIME_LABEL_WEIGHT: f32 = -0.5;

static HEADING_DECORATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[#*\s]+|[\s:.*#]+$").unwrap());
static COMMA_SPACING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());
static TRAILING_PERIOD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\.\s*$").unwrap());
static ABBREVIATION_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(tsp|tbsp|oz|lbs?|pkg)\.").unwrap());

/// The classifier's belief about which section the current line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionMode {
    #[default]
    Unknown,
    Ingredients,
    Steps,
    Ignore,
}

/// Which section a heading opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    Ingredients,
    Steps,
    /// Notes and tips: an ignored section whose lines are kept as notes
    Notes,
    /// Equipment, nutrition, variations and the like
    Other,
}

impl HeadingKind {
    pub fn mode(self) -> SectionMode {
        match self {
            HeadingKind::Ingredients => SectionMode::Ingredients,
            HeadingKind::Steps => SectionMode::Steps,
            HeadingKind::Notes | HeadingKind::Other => SectionMode::Ignore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Heading(HeadingKind),
    /// Advertising, captions, servings/time metadata and inline notes
    Note,
    Content,
}

/// Independent evidence gathered for a single line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineScore {
    pub ingredient: f32,
    pub step: f32,
    pub heading: f32,
    pub kind: LineKind,
}

impl LineScore {
    fn of_kind(kind: LineKind) -> Self {
        let heading = match kind {
            LineKind::Heading(HeadingKind::Ingredients | HeadingKind::Steps) => 2.0,
            LineKind::Heading(_) => 1.0,
            _ => 0.0,
        };
        LineScore {
            ingredient: 0.0,
            step: 0.0,
            heading,
            kind,
        }
    }
}

/// One line of normalized input with its derived attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine<'a> {
    pub index: usize,
    pub raw: &'a str,
    /// Trimmed text with any bullet or number marker removed
    pub stripped: String,
    pub has_marker: bool,
    pub score: LineScore,
}

impl<'a> RawLine<'a> {
    pub fn new(index: usize, raw: &'a str) -> Self {
        let trimmed = raw.trim();
        let has_marker = MARKER.is_match(trimmed);
        let stripped = MARKER.replace(trimmed, "").trim().to_string();
        let score = score_line(trimmed, &stripped, has_marker);
        RawLine {
            index,
            raw,
            stripped,
            has_marker,
            score,
        }
    }
}

/// Split normalized text into scored lines.
pub fn tokenize(text: &str) -> Vec<RawLine<'_>> {
    text.split('\n')
        .enumerate()
        .map(|(index, raw)| RawLine::new(index, raw))
        .collect()
}

/// Which section heading `line` is, if any.
pub fn detect_heading(line: &str) -> Option<HeadingKind> {
    let cleaned = PARENTHETICAL.replace_all(line, " ");
    let cleaned = HEADING_DECORATION.replace_all(cleaned.trim(), "");
    if cleaned.is_empty() {
        return None;
    }
    if HEADING_INGREDIENTS.is_match(&cleaned) {
        Some(HeadingKind::Ingredients)
    } else if HEADING_STEPS.is_match(&cleaned) {
        Some(HeadingKind::Steps)
    } else if HEADING_NOTES.is_match(&cleaned) {
        Some(HeadingKind::Notes)
    } else if HEADING_OTHER.is_match(&cleaned) {
        Some(HeadingKind::Other)
    } else {
        None
    }
}

fn is_note_line(trimmed: &str, stripped: &str) -> bool {
    NOISE_PATTERNS.iter().any(|rx| rx.is_match(trimmed))
        || INLINE_NOTE.is_match(stripped)
        || SERVINGS_LINE.is_match(stripped)
        || TIME_LABEL.find(stripped).is_some_and(|m| m.start() == 0)
}

/// Score a line. `stripped` is `trimmed` without its bullet or number marker.
pub fn score_line(trimmed: &str, stripped: &str, has_marker: bool) -> LineScore {
    if trimmed.is_empty() {
        return LineScore::of_kind(LineKind::Blank);
    }
    if let Some(kind) = detect_heading(trimmed) {
        return LineScore::of_kind(LineKind::Heading(kind));
    }
    if is_note_line(trimmed, stripped) {
        return LineScore::of_kind(LineKind::Note);
    }

    LineScore {
        ingredient: ingredient_score(stripped, has_marker),
        step: step_score(stripped, has_marker),
        heading: 0.0,
        kind: LineKind::Content,
    }
}

/// Evidence that `text` is an ingredient line.
pub fn ingredient_score(text: &str, has_marker: bool) -> f32 {
    let mut score = 0.0;
    if LEADING_QUANTITY.is_match(text) {
        score += LEADING_QUANTITY_WEIGHT;
    } else if QUANTITY.is_match(text) {
        score += EMBEDDED_QUANTITY_WEIGHT;
    }
    if UNIT.is_match(text) {
        score += UNIT_WEIGHT;
    }
    if MEASURE.is_match(text) {
        score += MEASURE_WEIGHT;
    }
    if PREP_QUALIFIER.is_match(text) || SERVING_QUALIFIER.is_match(text) {
        score += PREP_QUALIFIER_WEIGHT;
    }
    if MULTIPLIER.is_match(text) {
        score += MULTIPLIER_WEIGHT;
    }
    if FOOD.is_match(text) {
        score += FOOD_WEIGHT;
    }
    if has_marker {
        score += INGREDIENT_MARKER_WEIGHT;
    }
    score
}

/// Evidence that `text` is an instruction.
pub fn step_score(text: &str, has_marker: bool) -> f32 {
    let mut score = 0.0;
    if COOKING_VERB.is_match(text) {
        score += VERB_WEIGHT;
    }
    if LEADING_VERB.is_match(text) {
        score += LEADING_VERB_WEIGHT;
    }
    if has_marker {
        score += STEP_MARKER_WEIGHT;
    }
    if SENTENCE_END.is_match(text) {
        score += SENTENCE_END_WEIGHT;
    }
    if DURATION_OR_TEMP.is_match(text) {
        score += DURATION_WEIGHT;
    }
    if STEP_MARKER.is_match(text) {
        score += STEP_NUMBER_WEIGHT;
    }
    if TIME_LABEL.is_match(text) {
        score += TIME_LABEL_WEIGHT;
    }
    score
}

/// State threaded through the fold over lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionState {
    pub mode: SectionMode,
    /// Inside a notes/tips section
    collecting_notes: bool,
    /// The last step line ended mid-sentence
    open_step: bool,
}

impl SectionState {
    /// Transition on a heading line.
    pub fn enter(self, heading: HeadingKind) -> Self {
        SectionState {
            mode: heading.mode(),
            collecting_notes: heading == HeadingKind::Notes,
            open_step: false,
        }
    }

    fn with_open_step(self, open_step: bool) -> Self {
        SectionState { open_step, ..self }
    }

    /// Scores with the section bonus applied.
    pub fn biased(&self, score: &LineScore, config: &ClassifierConfig) -> (f32, f32) {
        match self.mode {
            SectionMode::Ingredients => (score.ingredient + config.section_bonus, score.step),
            SectionMode::Steps => (score.ingredient, score.step + config.section_bonus),
            SectionMode::Unknown | SectionMode::Ignore => (score.ingredient, score.step),
        }
    }
}

/// Outcome for a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    Heading(HeadingKind),
    Ingredient,
    Step,
    /// Kept in the recipe notes
    Note,
    /// Dropped
    Noise,
}

/// Classify one line and advance the section state.
pub fn classify_line(
    state: SectionState,
    line: &RawLine<'_>,
    config: &ClassifierConfig,
) -> (SectionState, LineClass) {
    match line.score.kind {
        LineKind::Blank => (state.with_open_step(false), LineClass::Blank),
        LineKind::Heading(kind) => (state.enter(kind), LineClass::Heading(kind)),
        LineKind::Note => {
            let class = if INLINE_NOTE.is_match(&line.stripped) || state.collecting_notes {
                LineClass::Note
            } else {
                LineClass::Noise
            };
            (state.with_open_step(false), class)
        }
        LineKind::Content if state.mode == SectionMode::Ignore => {
            let class = if state.collecting_notes {
                LineClass::Note
            } else {
                LineClass::Noise
            };
            (state, class)
        }
        LineKind::Content => {
            let ends_sentence = SENTENCE_END.is_match(&line.stripped);

            // Soft-wrapped tail of an unfinished step
            if state.mode == SectionMode::Steps
                && state.open_step
                && !line.has_marker
                && line.stripped.starts_with(|c: char| c.is_lowercase())
            {
                return (state.with_open_step(!ends_sentence), LineClass::Step);
            }

            let (ingredient, step) = state.biased(&line.score, config);
            if ingredient >= config.ingredient_threshold && ingredient >= step {
                (state.with_open_step(false), LineClass::Ingredient)
            } else if step >= config.step_threshold {
                (state.with_open_step(!ends_sentence), LineClass::Step)
            } else if line.has_marker {
                (state.with_open_step(false), LineClass::Ingredient)
            } else {
                (state.with_open_step(false), LineClass::Noise)
            }
        }
    }
}

/// A line classified as part of an instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct StepLine {
    pub index: usize,
    /// Trimmed line, marker still attached
    pub text: String,
}

/// Everything the classifier pass produced, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub headings: Vec<String>,
    pub ingredients: Vec<String>,
    pub ingredient_lines: Vec<usize>,
    pub steps: Vec<StepLine>,
    pub notes: Vec<String>,
    /// Notes and lines from ignored sections, by index
    pub set_aside: Vec<usize>,
}

/// Run the section-state classifier over all lines.
///
/// `skip` is the index of a line already consumed elsewhere (the title).
/// When fewer than two ingredients come out, the whole document is rescanned
/// with the ingredient test alone, leaving lines already taken as steps alone.
pub fn classify_lines(
    lines: &[RawLine<'_>],
    skip: Option<usize>,
    config: &ClassifierConfig,
) -> Classification {
    let (_, mut out) = lines
        .iter()
        .filter(|line| Some(line.index) != skip)
        .fold(
            (SectionState::default(), Classification::default()),
            |(state, mut out), line| {
                let ignoring = state.mode == SectionMode::Ignore;
                let (state, class) = classify_line(state, line, config);
                match class {
                    LineClass::Heading(_) => out.headings.push(line.raw.trim().to_string()),
                    LineClass::Ingredient => {
                        out.ingredients.push(clean_ingredient(&line.stripped));
                        out.ingredient_lines.push(line.index);
                    }
                    LineClass::Step => out.steps.push(StepLine {
                        index: line.index,
                        text: line.raw.trim().to_string(),
                    }),
                    LineClass::Note => {
                        out.notes.push(note_text(&line.stripped));
                        out.set_aside.push(line.index);
                    }
                    LineClass::Noise if ignoring => out.set_aside.push(line.index),
                    LineClass::Blank | LineClass::Noise => {}
                }
                (state, out)
            },
        );

    if out.ingredients.len() < 2 {
        let (ingredients, ingredient_lines) =
            rescan_ingredients(lines, skip, &out.steps, config);
        if ingredients.len() > out.ingredients.len() {
            debug!(
                "ingredient rescan recovered {} lines (first pass had {})",
                ingredients.len(),
                out.ingredients.len()
            );
            out.ingredients = ingredients;
            out.ingredient_lines = ingredient_lines;
        }
    }

    out
}

fn rescan_ingredients(
    lines: &[RawLine<'_>],
    skip: Option<usize>,
    steps: &[StepLine],
    config: &ClassifierConfig,
) -> (Vec<String>, Vec<usize>) {
    lines
        .iter()
        .filter(|line| Some(line.index) != skip)
        .filter(|line| line.score.kind == LineKind::Content)
        .filter(|line| !steps.iter().any(|s| s.index == line.index))
        .filter(|line| line.score.ingredient >= config.ingredient_threshold)
        .map(|line| (clean_ingredient(&line.stripped), line.index))
        .unzip()
}

/// Tidy an ingredient line whose marker is already removed.
pub fn clean_ingredient(text: &str) -> String {
    let text = COMMA_SPACING.replace_all(text, ", ");
    let text = TRAILING_PERIOD.replace(&text, "");
    let text = ABBREVIATION_DOT.replace_all(&text, "$1");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn note_text(stripped: &str) -> String {
    INLINE_NOTE
        .captures(stripped)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| stripped.to_string())
}
