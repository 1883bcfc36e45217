// Text utils

use once_cell::sync::Lazy;
use std::collections::HashSet;

// English stop words dropped from word clouds
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "com", "could", "couldn't", "did", "didn't",
    "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "else", "ever", "few",
    "for", "from", "further", "get", "had", "hadn't", "has", "hasn't", "have", "haven't",
    "having", "he", "he'd", "he'll", "he's", "hence", "her", "here", "here's", "hers", "herself",
    "him", "himself", "his", "how", "how's", "however", "http", "i", "i'd", "i'll", "i'm",
    "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just", "k",
    "let's", "like", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of",
    "off", "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours", "ourselves",
    "out", "over", "own", "r", "same", "shall", "shan't", "she", "she'd", "she'll", "she's",
    "should", "shouldn't", "since", "so", "some", "such", "than", "that", "that's", "the",
    "their", "theirs", "them", "themselves", "then", "there", "there's", "therefore", "these",
    "they", "they'd", "they'll", "they're", "they've", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've",
    "were", "weren't", "what", "what's", "when", "when's", "where", "where's", "which", "while",
    "who", "who's", "whom", "why", "why's", "with", "won't", "would", "wouldn't", "www", "you",
    "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

/// Literal punctuation characters trimmed from the edges of words.
/// The apostrophe is left out so contractions survive.
const PUNCTUATION_LIT: &str =
    "!/—”:&(、，；+^]~“《„;’{|´[=-`*．（–？！：$～«〉,><》)?）。…@_.\"}►»#%\u{2018}";

/// A lazily-initialized, global set of all punctuation chars
pub static PUNCTUATION: Lazy<HashSet<char>> = Lazy::new(|| PUNCTUATION_LIT.chars().collect());

pub static DEFAULT_STOP_WORDS: Lazy<HashSet<String>> =
    Lazy::new(|| ENGLISH_STOP_WORDS.iter().map(|s| s.to_string()).collect());

/// Lower-cases a token and strips surrounding punctuation and a possessive `'s`.
/// Returns `None` when nothing word-like is left.
pub fn normalize_word(token: &str) -> Option<String> {
    let trimmed = token.trim_matches(|c: char| PUNCTUATION.contains(&c) || c == '\'');
    let lowered = trimmed.to_lowercase();
    let word = lowered
        .strip_suffix("'s")
        .or_else(|| lowered.strip_suffix("’s"))
        .unwrap_or(&lowered);
    if word.chars().any(|c| c.is_alphanumeric()) {
        Some(word.to_string())
    } else {
        None
    }
}

/// Builds a stop-word set from an optional replacement list plus extra words.
pub fn build_stop_words(replacement: Option<&[String]>, extra: &[String]) -> HashSet<String> {
    let mut set: HashSet<String> = match replacement {
        Some(words) => words.iter().map(|w| w.to_lowercase()).collect(),
        None => DEFAULT_STOP_WORDS.clone(),
    };
    set.extend(extra.iter().map(|w| w.to_lowercase()));
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("Thanks!"), Some("thanks".to_string()));
        assert_eq!(normalize_word("\"Flight\","), Some("flight".to_string()));
        assert_eq!(normalize_word("United's"), Some("united".to_string()));
        assert_eq!(normalize_word("can't"), Some("can't".to_string()));
        assert_eq!(normalize_word("#fail"), Some("fail".to_string()));
        assert_eq!(normalize_word("..."), None);
        assert_eq!(normalize_word("&amp;"), Some("amp".to_string()));
    }

    #[test]
    fn test_build_stop_words() {
        let defaults = build_stop_words(None, &["Flight".to_string()]);
        assert!(defaults.contains("the"));
        assert!(defaults.contains("flight"));

        let replaced = build_stop_words(Some(&["Delay".to_string()]), &[]);
        assert!(replaced.contains("delay"));
        assert!(!replaced.contains("the"));
    }
}
