//! Title and servings guesses for plain recipe text.

use super::vocab::{
    LEADING_QUANTITY, MARKER, MEASURE, NOISE_PATTERNS, PARENTHETICAL, SENTENCE_END,
    SERVINGS_LINE, TITLE_RECIPE_SUFFIX, TITLE_SITE_SUFFIX, TITLE_STOP,
};

const MIN_TITLE_WORDS: usize = 2;
const MAX_TITLE_WORDS: usize = 12;
const MAX_TITLE_DIGITS: usize = 3;

/// Words kept lower-case when a title is re-cased.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "in", "of", "on", "or", "the", "to",
    "with",
];

/// A guessed title and the index of the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleGuess {
    pub line_index: usize,
    pub title: String,
}

/// Guess the dish name from the first `scan_lines` non-blank lines.
///
/// The scan stops at the first section heading or measured ingredient line
/// and skips bulleted, advertising and sentence lines. When no line of 2 to 12
/// words qualifies, a lone word seen before the stop is used.
pub fn guess_title(lines: &[&str], scan_lines: usize) -> Option<TitleGuess> {
    let mut single_word: Option<usize> = None;

    for (line_index, line) in lines
        .iter()
        .enumerate()
        .map(|(i, l)| (i, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .take(scan_lines)
    {
        if TITLE_STOP.is_match(line) {
            break;
        }
        if MARKER.is_match(line) {
            continue;
        }
        if LEADING_QUANTITY.is_match(line) || MEASURE.is_match(line) {
            break;
        }
        if SENTENCE_END.is_match(line) || NOISE_PATTERNS.iter().any(|rx| rx.is_match(line)) {
            continue;
        }
        let words = line.split_whitespace().count();
        let digits = line.chars().filter(|c| c.is_ascii_digit()).count();
        if digits > MAX_TITLE_DIGITS {
            continue;
        }
        if (MIN_TITLE_WORDS..=MAX_TITLE_WORDS).contains(&words) {
            let title = clean_title(line);
            if !title.is_empty() {
                return Some(TitleGuess { line_index, title });
            }
        } else if words == 1 && digits == 0 && single_word.is_none() {
            single_word = Some(line_index);
        }
    }

    single_word.and_then(|line_index| {
        let title = clean_title(lines[line_index].trim());
        (!title.is_empty()).then_some(TitleGuess { line_index, title })
    })
}

fn clean_title(line: &str) -> String {
    let is_quote = |c: char| c == '"' || c == '\'';
    let title = TITLE_SITE_SUFFIX.replace(line, "");
    let title = title.trim().trim_matches(is_quote);
    let title = TITLE_RECIPE_SUFFIX.replace(title, "");
    recase_title(title.trim().trim_matches(is_quote).trim())
}

/// Title-case a title that arrived in all-caps or all-lowercase.
///
/// Mixed-case titles are left as written.
fn recase_title(title: &str) -> String {
    let has_upper = title.chars().any(char::is_uppercase);
    let has_lower = title.chars().any(char::is_lowercase);
    if has_upper && has_lower {
        return title.to_string();
    }

    title
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && STOP_WORDS.contains(&lower.as_str()) {
                return lower;
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Find a "Serves 4" / "Yield: 12 cookies" declaration.
///
/// Scans the first `scan_lines` candidate lines, then the last `scan_lines`;
/// the first match wins. Parenthetical asides are dropped from the result.
pub fn detect_servings(lines: &[&str], scan_lines: usize) -> String {
    let candidates: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !MARKER.is_match(l))
        .collect();

    let head = candidates.iter().take(scan_lines);
    let tail = candidates
        .iter()
        .skip(candidates.len().saturating_sub(scan_lines));

    head.chain(tail)
        .filter_map(|line| servings_value(line))
        .next()
        .unwrap_or_default()
}

/// The servings value declared on `line`, if it is a servings line.
pub fn servings_value(line: &str) -> Option<String> {
    let caps = SERVINGS_LINE.captures(line)?;
    let value = PARENTHETICAL.replace_all(&caps[1], " ");
    let value = value
        .trim_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_title_first_plausible_line() {
        let text = "\n\nChocolate Cake\nIngredients\n2 cups flour";
        let guess = guess_title(&lines(text), 40).unwrap();
        assert_eq!(guess.title, "Chocolate Cake");
        assert_eq!(guess.line_index, 2);
    }

    #[test]
    fn test_title_strips_site_suffix_recipe_word_and_quotes() {
        let guess = guess_title(&lines("\"Easy Banana Bread Recipe\" | Baking Blog"), 40).unwrap();
        assert_eq!(guess.title, "Easy Banana Bread");

        let guess = guess_title(&lines("Gluten-Free Brownies - My Kitchen"), 40).unwrap();
        assert_eq!(guess.title, "Gluten-Free Brownies");
    }

    #[test]
    fn test_title_skips_bullets_and_stops_at_headings() {
        let text = "• 2 cups flour\nBest Ever Pancakes\nIngredients";
        assert_eq!(guess_title(&lines(text), 40).unwrap().title, "Best Ever Pancakes");

        assert!(guess_title(&lines("Ingredients\nChocolate Cake"), 40).is_none());
    }

    #[test]
    fn test_title_single_word_fallback() {
        let text = "Pancakes\n2 cups flour\n1 cup milk\n\nWhisk everything together.";
        let guess = guess_title(&lines(text), 40).unwrap();
        assert_eq!(guess.title, "Pancakes");
        assert_eq!(guess.line_index, 0);

        // A longer candidate still wins over an earlier lone word
        let guess = guess_title(&lines("Pancakes\nFluffy Buttermilk Pancakes"), 40).unwrap();
        assert_eq!(guess.title, "Fluffy Buttermilk Pancakes");
    }

    #[test]
    fn test_title_never_taken_from_ingredients_or_sentences() {
        assert!(guess_title(&lines("2 cups flour\n1 cup sugar\nMix well."), 40).is_none());
        assert!(guess_title(&lines("1 1/2 cups milk\nBanana Bread"), 40).is_none());
        assert!(guess_title(&lines("Melt the butter in a pan.\nStir in the flour."), 40).is_none());
        assert!(guess_title(&lines("12345 67890 servings"), 40).is_none());
    }

    #[test]
    fn test_title_recases_shouting_ocr() {
        let guess = guess_title(&lines("CHICKEN WITH LEMON AND THYME"), 40).unwrap();
        assert_eq!(guess.title, "Chicken with Lemon and Thyme");
    }

    #[test]
    fn test_servings_head_then_tail() {
        let text = "Soup\nServes: 4 (generously)\nIngredients";
        assert_eq!(detect_servings(&lines(text), 50), "4");

        let mut long: Vec<&str> = vec!["filler line"; 120];
        long.push("Makes 24 cookies");
        assert_eq!(detect_servings(&long, 50), "24 cookies");

        assert_eq!(detect_servings(&lines("no servings here"), 50), "");
    }

    #[test]
    fn test_servings_ignores_empty_declaration() {
        assert_eq!(servings_value("Yield:"), None);
        assert_eq!(servings_value("Yield: 1 loaf (about 12 slices)").as_deref(), Some("1 loaf"));
    }
}
