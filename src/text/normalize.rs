//! Canonicalisation applied to pasted or OCR'd text before any classification.

use regex::Regex;
use std::sync::LazyLock;

use super::vocab::{BULLET, BULLET_GLYPHS, FRACTIONS};

static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static TRAILING_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
/// A lone "I" or "l" used as the step number "1".
static OCR_ONE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)[Il][.)][ \t]+(\S)").unwrap());

/// Normalise recipe text.
///
/// Unifies line endings, whitespace, quotes, dashes, ligatures, bullets and
/// fraction glyphs, removes trademark signs and soft hyphens, re-joins words
/// hyphenated across a line wrap, squeezes blank-line runs to one blank line
/// and repairs the OCR misread of a leading "1." as "l." or "I.".
///
/// The transform is idempotent.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = map_glyphs(&text);
    let text = SPACE_RUNS.replace_all(&text, " ");
    let text = TRAILING_SPACE.replace_all(&text, "");
    let text = join_hyphenated_wraps(&text);
    let text = OCR_ONE_MARKER.replace_all(&text, "${1}1. ${2}");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

fn is_gap(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{A0}' | '\u{2007}' | '\u{2009}' | '\u{202F}')
}

fn map_glyphs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        match c {
            // "salt · pepper": a spaced middle dot is a bullet
            '·' if i > 0
                && is_gap(chars[i - 1])
                && chars.get(i + 1).is_some_and(|&n| is_gap(n)) =>
            {
                out.push(BULLET)
            }
            c if is_gap(c) => out.push(if c == '\t' { '\t' } else { ' ' }),
            '\u{AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => {}
            '™' | '®' | '©' | '℠' => {}
            '‘' | '’' | '‚' | '‛' | '′' => out.push('\''),
            '“' | '”' | '„' | '‟' | '″' | '«' | '»' => out.push('"'),
            '‐' | '‑' | '‒' | '–' | '—' | '―' | '−' => out.push('-'),
            'ﬀ' => out.push_str("ff"),
            'ﬁ' => out.push_str("fi"),
            'ﬂ' => out.push_str("fl"),
            'ﬃ' => out.push_str("ffi"),
            'ﬄ' => out.push_str("ffl"),
            'ﬅ' | 'ﬆ' => out.push_str("st"),
            c if BULLET_GLYPHS.contains(&c) => out.push(BULLET),
            c => match FRACTIONS.iter().find(|(glyph, _)| *glyph == c) {
                Some((_, ascii)) => {
                    // "1½" reads as "1 1/2"
                    if out.chars().next_back().is_some_and(|p| p.is_ascii_digit()) {
                        out.push(' ');
                    }
                    out.push_str(ascii);
                }
                None => out.push(c),
            },
        }
    }
    out
}

/// Drop "-\n" between a letter and a lower-case letter: "choc-\nolate".
fn join_hyphenated_wraps(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '-'
            && chars.get(i + 1) == Some(&'\n')
            && chars.get(i + 2).is_some_and(|n| n.is_lowercase())
            && out.chars().next_back().is_some_and(|p| p.is_alphabetic())
        {
            i += 2;
            continue;
        }
        out.push(c);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings_and_blank_runs() {
        let text = "Title\r\n\r\n\r\n\r\nIngredients\r2 eggs\n\n\n\nDone";
        assert_eq!(normalize_text(text), "Title\n\nIngredients\n2 eggs\n\nDone");
    }

    #[test]
    fn test_whitespace_only_lines_count_as_blank() {
        assert_eq!(normalize_text("a\n  \n\t\n \nb"), "a\n\nb");
        assert_eq!(normalize_text("2  cups\t\tflour   "), "2 cups flour");
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(normalize_text("Grandma’s “best” pie — easy"), "Grandma's \"best\" pie - easy");
        assert_eq!(normalize_text("Nutella® and Oreo™ ﬁlling"), "Nutella and Oreo filling");
        assert_eq!(normalize_text("souf\u{AD}flé"), "soufflé");
        assert_eq!(normalize_text("● salt\n▪ pepper"), "• salt\n• pepper");
        assert_eq!(normalize_text("salt · pepper"), "salt • pepper");
        assert_eq!(normalize_text("salt · · pepper"), "salt • • pepper");
        assert_eq!(normalize_text("2·3 tsp"), "2·3 tsp");
    }

    #[test]
    fn test_fractions() {
        assert_eq!(normalize_text("½ cup milk"), "1/2 cup milk");
        assert_eq!(normalize_text("1½ cups flour"), "1 1/2 cups flour");
        assert_eq!(normalize_text("⅞ tsp"), "7/8 tsp");
    }

    #[test]
    fn test_hyphenated_wraps() {
        assert_eq!(normalize_text("Stir the choc-\nolate chips"), "Stir the chocolate chips");
        assert_eq!(normalize_text("a-\nb-\nc"), "abc");
        // Not a wrap: next line starts a new item
        assert_eq!(normalize_text("Add salt -\nPepper"), "Add salt -\nPepper");
    }

    #[test]
    fn test_ocr_leading_one() {
        assert_eq!(normalize_text("l. Preheat oven"), "1. Preheat oven");
        assert_eq!(normalize_text("Mix\nI) Stir well"), "Mix\n1. Stir well");
        assert_eq!(normalize_text("I love pie."), "I love pie.");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "   ",
            "l. Preheat oven\r\n2. Mix  \n\n\n\n\nI) Bake",
            "Choc-\nolate-\nchip cookies — the best™\n\n\n•  ½ cup butter",
            "1½ cups ﬂour\u{A0}\u{A0}sifted\n\t\n   l.   Whisk\n--- PAGE ---\n",
            "salt · pepper ·  oil\n \n \n \n“quoted” ‘text’",
            "ends with hyphen-\n",
            "salt · · pepper",
            "a\u{A0}·\u{A0}·\t·  b\n· lead",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once, "not idempotent for {sample:?}");
        }
    }
}
