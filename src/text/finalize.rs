use std::collections::HashSet;

/// Collapse whitespace, drop blank entries and case-insensitive duplicates.
///
/// First-seen order is kept; nothing is re-sorted.
pub fn dedup_items<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| collapse_whitespace(item.as_ref()))
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

/// [`dedup_items`] capped at `max` entries.
pub fn finalize_items<I, S>(items: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut items = dedup_items(items);
    items.truncate(max);
    items
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_case_insensitive_first_wins() {
        assert_eq!(dedup_items(["Salt", "salt", "Pepper"]), vec!["Salt", "Pepper"]);
    }

    #[test]
    fn test_blank_entries_dropped_and_whitespace_collapsed() {
        assert_eq!(
            dedup_items(["  ", "2  cups\n flour", "", "2 cups flour"]),
            vec!["2 cups flour"]
        );
    }

    #[test]
    fn test_cap() {
        let items: Vec<String> = (0..300).map(|i| format!("step {i}")).collect();
        assert_eq!(finalize_items(&items, 200).len(), 200);
        assert_eq!(finalize_items(&items, 200)[199], "step 199");
    }
}
