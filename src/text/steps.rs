//! Step reassembly and chunking of over-long instructions.

use regex::Regex;
use std::sync::LazyLock;

use super::classify::StepLine;
use super::vocab::{ABBREVIATIONS, CONNECTIVES, MARKER, STEP_PREFIX};

/// Steps longer than this many characters are chunked.
pub const MAX_STEP_LEN: usize = 220;

/// A semicolon, or a period followed by a capitalised connective.
static CLAUSE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r";|\.\s+({})\b", CONNECTIVES.join("|"))).unwrap()
});
static THEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:and\s+then|then|after\s+that)\s+").unwrap());
static TRAILING_PERIODS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s.,]+$").unwrap());

/// Merge classified step lines into whole steps.
///
/// A line opens a new step when it carries a bullet, number or "Step N"
/// marker, when it is not directly below the previous step line, or when the
/// step so far ends a sentence and the line starts with a capital or digit.
/// Anything else is a soft-wrapped continuation and is space-joined.
pub fn assemble_steps(lines: &[StepLine]) -> Vec<String> {
    let mut steps: Vec<String> = Vec::new();
    let mut last_index: Option<usize> = None;

    for line in lines {
        let text = line.text.trim();
        let body = clean_step(text);
        if body.is_empty() {
            continue;
        }

        let continues = match (steps.last(), last_index) {
            (Some(current), Some(prev)) => {
                !MARKER.is_match(text)
                    && !STEP_PREFIX.is_match(text)
                    && line.index == prev + 1
                    && !(ends_sentence(current) && starts_sentence(&body))
            }
            _ => false,
        };

        match steps.last_mut() {
            Some(current) if continues => {
                current.push(' ');
                current.push_str(&body);
            }
            _ => steps.push(body),
        }
        last_index = Some(line.index);
    }

    steps
}

/// Strip the bullet, number or "Step N:" marker from a step line.
pub fn clean_step(text: &str) -> String {
    let text = MARKER.replace(text.trim(), "");
    let text = STEP_PREFIX.replace(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ends_sentence(text: &str) -> bool {
    text.ends_with(['.', '!', '?', ':'])
}

fn starts_sentence(text: &str) -> bool {
    text.starts_with(|c: char| c.is_uppercase() || c.is_ascii_digit())
}

/// Split a step longer than `max_len` characters into smaller instructions.
///
/// Boundaries are tried in order: clause breaks, "then" phrases, sentence
/// ends. A fragment that still has no usable boundary is kept whole. Every
/// fragment loses its trailing period.
pub fn chunk_step(step: &str, max_len: usize) -> Vec<String> {
    chunk_at_level(step.trim(), 0, max_len)
        .into_iter()
        .map(|fragment| trim_fragment(&fragment))
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn chunk_at_level(text: &str, level: usize, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }
    let pieces = match level {
        0 => split_clauses(text),
        1 => THEN_BREAK.split(text).map(str::to_string).collect(),
        2 => split_sentences(text),
        _ => return vec![text.to_string()],
    };
    let pieces: Vec<String> = pieces
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if pieces.len() <= 1 {
        return chunk_at_level(text, level + 1, max_len);
    }
    pieces
        .iter()
        .flat_map(|piece| chunk_at_level(piece, level + 1, max_len))
        .collect()
}

fn split_clauses(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for caps in CLAUSE_BREAK.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        pieces.push(text[start..whole.start()].to_string());
        // Keep the connective, drop the period or semicolon
        start = caps.get(1).map_or(whole.end(), |c| c.start());
    }
    pieces.push(text[start..].to_string());
    pieces
}

/// Split at sentence punctuation followed by whitespace and a capital or digit.
///
/// No split after a known abbreviation ("approx. 5") or between digits ("1.5").
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        buf.push(c);
        if matches!(c, '.' | '!' | '?') {
            let mut next = i + 1;
            while next < chars.len() && chars[next].is_whitespace() {
                next += 1;
            }
            if next > i + 1 && next < chars.len() && is_boundary(&chars, i, next) {
                out.push(buf.trim().to_string());
                buf.clear();
                i = next;
                continue;
            }
        }
        i += 1;
    }
    if !buf.trim().is_empty() {
        out.push(buf.trim().to_string());
    }
    out
}

fn is_boundary(chars: &[char], punct: usize, next: usize) -> bool {
    let following = chars[next];
    if !(following.is_uppercase() || following.is_ascii_digit()) {
        return false;
    }
    let preceding = punct.checked_sub(1).map(|p| chars[p]);
    if preceding.is_some_and(|p| p.is_ascii_digit()) && following.is_ascii_digit() {
        return false;
    }

    let word: String = chars[..punct]
        .iter()
        .rev()
        .take_while(|c| c.is_alphabetic())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    !ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

fn trim_fragment(fragment: &str) -> String {
    TRAILING_PERIODS.replace(fragment.trim(), "").to_string()
}
