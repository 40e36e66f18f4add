//! Recurring words across journal content, and the short entry summary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use sahaay_contracts::journal::JournalEntry;

/// Common filler words that would otherwise dominate every theme list.
const STOP_WORDS: [&str; 4] = ["feeling", "really", "today", "about"];

const MIN_THEME_LEN: usize = 5;

pub const SUMMARY_MAX_CHARS: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub word: String,
    pub count: usize,
}

fn theme_words(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .split_whitespace()
        .map(|raw| {
            raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| w.chars().count() >= MIN_THEME_LEN && !STOP_WORDS.contains(&w.as_str()))
}

/// The `n` most frequent theme words, highest count first, ties alphabetical.
pub fn top_themes(entries: &[JournalEntry], n: usize) -> Vec<Theme> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        for word in theme_words(&entry.content) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut themes: Vec<Theme> = counts.into_iter().map(|(word, count)| Theme { word, count }).collect();
    themes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    themes.truncate(n);
    themes
}

/// Extractive placeholder summary: the first sentence, cut to
/// [`SUMMARY_MAX_CHARS`] characters with a trailing ellipsis when cut.
pub fn summarize_entry(entry: &JournalEntry) -> String {
    let content = entry.content.trim();
    let first = content
        .find(['.', '!', '?'])
        .map(|end| &content[..=end])
        .unwrap_or(content);

    if first.chars().count() <= SUMMARY_MAX_CHARS {
        return first.to_string();
    }
    let mut cut: String = first.chars().take(SUMMARY_MAX_CHARS - 1).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}
