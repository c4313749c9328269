use std::collections::HashSet;

/// Remembers which texts were already seen, comparing trimmed text case-insensitively.
#[derive(Debug, Default)]
pub struct TextDedupSet {
    seen: HashSet<String>,
}

impl TextDedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed text if it is non-empty and not seen before.
    pub fn insert(&mut self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.seen.insert(trimmed.to_lowercase()) {
            Some(trimmed.to_string())
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// First occurrence wins; blank entries are dropped.
pub fn dedup_text<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = TextDedupSet::new();
    items
        .into_iter()
        .filter_map(|item| set.insert(item.as_ref()))
        .collect()
}

/// Same as [`dedup_text`], carrying the tag of the first occurrence along.
pub fn dedup_tagged<I, S, T>(items: I) -> Vec<(String, T)>
where
    I: IntoIterator<Item = (S, T)>,
    S: AsRef<str>,
{
    let mut set = TextDedupSet::new();
    items
        .into_iter()
        .filter_map(|(text, tag)| set.insert(text.as_ref()).map(|kept| (kept, tag)))
        .collect()
}
