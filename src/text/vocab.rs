//! Static word lists and patterns shared by the plain-text heuristics.
//!
//! Everything here is read-only data compiled once per process. New
//! heuristics should add entries to these tables instead of inlining literals
//! at call sites.

use regex::Regex;
use std::sync::LazyLock;

/// Unit words that mark a line as a measured ingredient.
pub const UNITS: &[&str] = &[
    "teaspoons", "teaspoon", "tsp", "tablespoons", "tablespoon", "tbsp", "tbs", "cups", "cup",
    "pints", "pint", "quarts", "quart", "qt", "gallons", "gallon", "liters", "liter", "litres",
    "litre", "milliliters", "milliliter", "ml", "grams", "gram", "g", "kilograms", "kilogram",
    "kg", "ounces", "ounce", "oz", "pounds", "pound", "lbs", "lb", "sticks", "stick", "cloves",
    "clove", "pinch", "dash", "slices", "cans", "packages", "package", "packet", "pkt", "bunch",
    "sprigs", "sprig", "handful",
];

/// Imperative cooking verbs that mark a line as an instruction.
pub const COOKING_VERBS: &[&str] = &[
    "add", "bake", "beat", "blend", "boil", "braise", "bring", "broil", "brown", "brush",
    "chill", "chop", "combine", "cook", "cool", "cover", "cream", "cut", "deglaze", "dice",
    "drain", "drizzle", "fold", "fry", "garnish", "grate", "grill", "heat", "increase",
    "knead", "let", "marinate", "melt", "microwave", "mix", "peel", "place", "pour",
    "preheat", "reduce", "remove", "rest", "roast", "saute", "sauté", "season", "sear",
    "serve", "sift", "simmer", "slice", "spread", "sprinkle", "stir", "strain", "toast",
    "transfer", "uncover", "whisk",
];

/// Verbs that, leading a line, tip "Add 2 cups milk" towards a step.
pub const LEADING_VERBS: &[&str] = &[
    "add", "stir", "mix", "whisk", "beat", "combine", "fold", "pour", "place", "preheat",
    "cook", "bake", "simmer", "boil", "bring", "heat", "remove", "transfer", "let", "serve",
    "season", "roast", "fry", "drain", "cover", "melt", "spread", "sprinkle",
];

/// Common pantry foods.
pub const COMMON_FOODS: &[&str] = &[
    "salt", "pepper", "oil", "olive", "butter", "flour", "sugar", "garlic", "onion", "onions",
    "egg", "eggs", "milk", "cream", "buttermilk", "yeast", "vanilla", "tomato", "tomatoes",
    "lemon", "lime", "water", "honey", "cheese", "rice", "chicken", "beef", "pork", "bacon",
    "shrimp", "pasta", "bread", "broth", "stock", "vinegar", "mustard", "chocolate", "cocoa",
    "oats", "almonds", "walnuts", "pecans", "beans", "spinach", "mushrooms", "celery", "carrot",
    "carrots", "potato", "potatoes", "apple", "apples", "banana", "bananas", "berries",
    "yogurt", "parmesan", "mozzarella", "cheddar", "scallions", "shallot", "shallots", "ginger",
    "parsley", "basil", "cilantro", "thyme", "rosemary", "oregano", "cinnamon", "nutmeg",
    "paprika", "cumin", "chili", "baking powder", "baking soda", "soy sauce", "sour cream",
];

/// Trailing preparation qualifiers such as ", diced".
pub const PREP_QUALIFIERS: &[&str] = &[
    "divided", "softened", "melted", "minced", "chopped", "diced", "sliced", "grated",
    "beaten", "sifted", "peeled", "crushed", "drained", "to taste", "room temperature",
    "at room temperature",
];

/// Serving qualifiers that can appear anywhere in an ingredient line.
pub const SERVING_QUALIFIERS: &[&str] = &[
    "to taste", "for garnish", "for serving", "for dusting", "optional", "as needed",
];

/// Capitalised words that open a new instruction after a period.
pub const CONNECTIVES: &[&str] = &[
    "Then", "Next", "Meanwhile", "After", "Before", "Once", "When", "Return", "Stir", "Add",
    "Bake", "Cook", "Transfer", "Let", "Serve", "Season", "Reduce", "Increase", "Whisk",
    "Simmer", "Boil", "Drain",
];

/// Tokens after which a period does not end a sentence.
pub const ABBREVIATIONS: &[&str] = &[
    "min", "mins", "sec", "secs", "hr", "hrs", "tsp", "tbsp", "oz", "lb", "lbs", "approx",
    "pkg", "pt", "qt", "vs", "mr", "mrs", "dr", "no", "st", "eg", "ie", "etc",
];

/// Unicode vulgar fractions and their ASCII spelling.
pub const FRACTIONS: &[(char, &str)] = &[
    ('¼', "1/4"),
    ('½', "1/2"),
    ('¾', "3/4"),
    ('⅐', "1/7"),
    ('⅑', "1/9"),
    ('⅒', "1/10"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

/// Canonical bullet every bullet glyph is mapped to.
pub const BULLET: char = '•';

/// Glyphs unified into [`BULLET`].
pub const BULLET_GLYPHS: &[char] = &[
    '•', '●', '▪', '◦', '◆', '▶', '■', '□', '∙', '‣', '⁃', '➢', '➤', '►', '○', '♦',
];

/// Marker placed between OCR'd pages.
pub const PAGE_BREAK_MARKER: &str = "--- PAGE ---";

fn word_alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

fn compile(pattern: &str) -> Regex {
    // Patterns are fixed at build time; a failure here is a programming error
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

/// Leading bullet or "1." / "2)" number marker.
pub static MARKER: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s*(?:[-*•]|\d{1,3}[.)])\s+"));

/// Explicit "Step 3" marker anywhere in the line.
pub static STEP_MARKER: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bstep\s*\d+\b"));

/// "Step 3:" prefix to strip from an assembled step.
pub static STEP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^\s*step\s*\d+\s*[:.)-]?\s*"));

/// Integer, decimal, range, mixed number or fraction standing as its own token.
pub static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:^|\s)(?:\d+(?:[.,]\d+)?(?:\s*-\s*\d+)?(?:\s+\d+/\d+)?|\d+/\d+)(?:\s|$)")
});

pub static UNIT: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i)\b(?:{})\b", word_alternation(UNITS))));

/// Quantity directly followed by a unit: "2 cups", "1/2 tsp", "500g".
pub static MEASURE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)(?:^|\s)(?:\d+(?:[.,]\d+)?(?:\s+\d+/\d+)?|\d+/\d+)\s*(?:{})\b",
        word_alternation(UNITS)
    ))
});

/// Quantity opening the line.
pub static LEADING_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:\d+(?:[.,]\d+)?(?:\s*-\s*\d+)?(?:\s+\d+/\d+)?|\d+/\d+)(?:\s|$)")
});

pub static COOKING_VERB: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i)\b(?:{})\b", word_alternation(COOKING_VERBS))));

pub static LEADING_VERB: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i)^(?:{})\b", word_alternation(LEADING_VERBS))));

pub static FOOD: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i)\b(?:{})\b", word_alternation(COMMON_FOODS))));

pub static PREP_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i),\s*(?:{})\b", word_alternation(PREP_QUALIFIERS))));

pub static SERVING_QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?i)\b(?:{})\b", word_alternation(SERVING_QUALIFIERS)))
});

/// "2x 14oz cans" style multiplier.
pub static MULTIPLIER: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^\d{1,2}\s*x\s*"));

/// Durations and oven temperatures.
pub static DURATION_OR_TEMP: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(?:minutes?|mins?|hours?|hrs?|seconds?|degrees)\b|°|\b\d{2,3}\s*[fc]\b",
    )
});

/// "Prep time", "Cook time", "Total time" labels.
pub static TIME_LABEL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\b(?:prep|cook|total|active|inactive)\s*time\b"));

pub static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| compile(r"[.!?]$"));

pub static SERVINGS_LINE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^\s*(?:servings?|serves|yields?|makes)\b[:\-\s]*(.+)$"));

pub static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| compile(r"\s*\([^)]*\)\s*"));

pub static HEADING_INGREDIENTS: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)^(?:ingredients?(?:\s*(?:&|and)\s*substitutions?)?|ingredient\s+list|what\s+you(?:'ll|\s+will)\s+need|you\s+will\s+need|for\s+the\s+(?:dough|sauce|filling|topping|salad|cake|glaze|crust|frosting|icing|marinade|dressing|batter|base))$",
    )
});

pub static HEADING_STEPS: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)^(?:instructions?|directions?|method|preparation|steps?|procedure|how\s+to\s+(?:make|cook|prepare)(?:\s+[\w\s'-]{1,40})?)$",
    )
});

pub static HEADING_NOTES: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)^(?:notes?|tips?|recipe\s+notes?|cook'?s\s+notes?|chef'?s\s+tips?)$")
});

pub static HEADING_OTHER: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)^(?:equipment(?:\s+needed)?|tools?|nutrition(?:\s+(?:facts|information|info))?|variations?|substitutions?|storage|make[-\s]?ahead|serving\s+suggestions?)$",
    )
});

/// Lines that stop the title scan: anything that opens recipe body or metadata.
pub static TITLE_STOP: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)^(?:ingredients?|directions?|instructions?|method|preparation|steps?|notes?|nutrition|servings?|serves|yield|prep\s+time|cook\s+time|total\s+time|course|cuisine)\b",
    )
});

/// " - Site Name" or " | Site Name" suffix on a title.
pub static TITLE_SITE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+[-|]\s+.*$"));

pub static TITLE_RECIPE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\s*\brecipe\s*$"));

/// Inline "Note: ..." / "Tip: ..." lines.
pub static INLINE_NOTE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^(?:notes?|tips?|hint)\s*[:\-]\s*(\S.*)$"));

/// Advertising, caption and decoration lines that carry no recipe content.
pub static NOISE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^ad(?:vertisement)?$",
        r"(?i)https?://",
        r"(?i)^(?:see\s+the\s+recipe\s+card|see\s+(?:above|below)|jump\s+to\s+recipe|print\s+recipe|pin\s+(?:it|recipe))\b",
        r"^[\s\-*•=_~.]+$",
        r"^\(.*\)$",
        r"(?i)\b(?:flat\s+lay|photo(?:graph)?\s+(?:by|of|credit)|image\s+(?:by|of|credit)|shown\s+(?:here|above|below)|laid\s+out)\b",
        r"(?i)^-+\s*page\s*-+$",
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_tokens() {
        for line in ["2 cups flour", "1.5 kg potatoes", "1 1/2 cups milk", "1/2 tsp salt", "2-3 cloves"] {
            assert!(QUANTITY.is_match(line), "{line}");
        }
        for line in ["Preheat oven to 350F", "Chapter2 starts", "a 10x10 pan"] {
            assert!(!QUANTITY.is_match(line), "{line}");
        }
    }

    #[test]
    fn test_units_match_whole_words_only() {
        assert!(UNIT.is_match("2 Tbsp butter"));
        assert!(UNIT.is_match("a pinch of salt"));
        assert!(!UNIT.is_match("Cupcakes with frosting"));
    }

    #[test]
    fn test_measure_and_leading_quantity() {
        assert!(MEASURE.is_match("2 cups flour"));
        assert!(MEASURE.is_match("add 500g butter"));
        assert!(MEASURE.is_match("1 1/2 tsp salt"));
        assert!(!MEASURE.is_match("Bake at 350 F (180 C)"));
        assert!(LEADING_QUANTITY.is_match("2 eggs"));
        assert!(!LEADING_QUANTITY.is_match("Add 2 eggs"));
    }

    #[test]
    fn test_marker() {
        assert!(MARKER.is_match("1. Preheat"));
        assert!(MARKER.is_match("12) Stir"));
        assert!(MARKER.is_match("• 2 eggs"));
        assert!(MARKER.is_match("- salt"));
        assert!(!MARKER.is_match("2 cups flour"));
        assert!(!MARKER.is_match("-5 degrees"));
    }

    #[test]
    fn test_heading_patterns() {
        assert!(HEADING_INGREDIENTS.is_match("Ingredients"));
        assert!(HEADING_INGREDIENTS.is_match("For the glaze"));
        assert!(HEADING_STEPS.is_match("Directions"));
        assert!(HEADING_STEPS.is_match("How to make the sauce"));
        assert!(HEADING_NOTES.is_match("Recipe Notes"));
        assert!(HEADING_OTHER.is_match("Equipment Needed"));
        assert!(!HEADING_STEPS.is_match("Method to the madness is love"));
    }

    #[test]
    fn test_noise_patterns() {
        let noisy = |s: &str| NOISE_PATTERNS.iter().any(|rx| rx.is_match(s));
        assert!(noisy("AD"));
        assert!(noisy("https://example.com/pin"));
        assert!(noisy("-----"));
        assert!(noisy("(photo credit: Jane)"));
        assert!(noisy("--- PAGE ---"));
        assert!(!noisy("Add the eggs."));
    }
}
