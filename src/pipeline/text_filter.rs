use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data_model::{Counts, Record, Sentiment, Subset, WordFrequencySet};
use crate::utils::text::{normalize_word, DEFAULT_STOP_WORDS};

pub fn filter_by_sentiment<'a, I>(records: I, sentiment: Sentiment) -> Subset<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| r.sentiment == sentiment)
        .collect()
}

/// False for links, mentions and retweet markers.
pub fn is_clean_token(token: &str) -> bool {
    !token.contains("http") && !token.starts_with('@') && token != "RT"
}

/// Whitespace-split tokens of every text, in order, minus links, mentions and "RT".
///
/// Lazy and not deduplicated, so frequencies survive for word-cloud weighting.
pub fn clean_tokens<'a, I>(records: I) -> impl Iterator<Item = &'a str>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .flat_map(|r| r.text.split_whitespace())
        .filter(|token| is_clean_token(token))
}

#[derive(Debug, Clone)]
pub struct WordFrequencyOptions {
    pub max_words: usize,
    pub min_word_length: usize,
    pub stop_words: HashSet<String>, // lower-case
}

impl Default for WordFrequencyOptions {
    fn default() -> Self {
        WordFrequencyOptions {
            max_words: 200,
            min_word_length: 2,
            stop_words: DEFAULT_STOP_WORDS.clone(),
        }
    }
}

/// Counts normalized words for the word cloud, most frequent first.
pub fn word_frequencies<'a, T>(
    sentiment: Sentiment,
    tokens: T,
    options: &WordFrequencyOptions,
) -> WordFrequencySet
where
    T: IntoIterator<Item = &'a str>,
{
    let mut total_tokens = 0usize;
    let words = tokens
        .into_iter()
        .inspect(|_| total_tokens += 1)
        .filter_map(normalize_word)
        .filter(|w| w.chars().count() >= options.min_word_length)
        .filter(|w| !options.stop_words.contains(w));
    let counts = Counts::tally(words);

    WordFrequencySet {
        sentiment,
        total_tokens,
        frequencies: counts
            .iter()
            .take(options.max_words)
            .map(|(word, count)| (word.clone(), count))
            .collect(),
    }
}

/// Picks one record at random; `None` for an empty subset.
pub fn sample_one<'a, R: Rng + ?Sized>(subset: &Subset<'a>, rng: &mut R) -> Option<&'a Record> {
    subset.as_slice().choose(rng).copied()
}
