use async_trait::async_trait;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::llm::ChatClient;
use crate::text::{
    capitalize_first, collapse_whitespace, ends_with_terminator, sentence_spans, split_sentences,
    truncate_words, word_count, SENTENCE_TERMINATORS,
};

/// Longest input, in words, handed to a summarization backend.
pub const MAX_SUMMARY_INPUT_WORDS: usize = 1024;

const MAX_EXTRACTED_SENTENCES: usize = 3;

const NEWS_KEYWORDS: [&str; 11] = [
    "સમાચાર", "ખબર", "મહત્વપૂર્ણ", "મુખ્ય", "પ્રમુખ", "સરકાર", "આજે",
    "news", "important", "main", "today",
];

/// Summary length bounds, in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
    pub max_length: usize,
    pub min_length: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self { max_length: 150, min_length: 50 }
    }
}

impl SummaryBounds {
    pub fn new(max_length: usize, min_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(AppError::ValidationError("max_length must be at least 1".to_string()));
        }
        if min_length > max_length {
            return Err(AppError::ValidationError(format!(
                "min_length ({}) cannot exceed max_length ({})",
                min_length, max_length
            )));
        }
        Ok(Self { max_length, min_length })
    }
}

/// Input after cleaning, with bounds scaled to its length.
enum Prepared {
    /// Too short to summarize; returned unchanged.
    TooShort(String),
    Ready { text: String, max_words: usize, min_words: usize },
}

fn prepare(text: &str, bounds: SummaryBounds) -> Result<Prepared> {
    let cleaned = collapse_whitespace(text);
    if cleaned.is_empty() {
        return Err(AppError::ValidationError("Text cannot be empty".to_string()));
    }
    let cleaned = truncate_words(&cleaned, MAX_SUMMARY_INPUT_WORDS);
    let words = word_count(&cleaned);
    if words < bounds.min_length {
        return Ok(Prepared::TooShort(cleaned));
    }

    let max_words = bounds.max_length.min(words / 2).max(1);
    let min_words = bounds.min_length.min(max_words / 2);
    Ok(Prepared::Ready { text: cleaned, max_words, min_words })
}

fn finish_output(summary: &str) -> Result<String> {
    let cleaned = collapse_whitespace(summary);
    if cleaned.is_empty() {
        return Err(AppError::SummarizationError("Model returned an empty summary".to_string()));
    }
    let mut summary = capitalize_first(&cleaned);
    if !ends_with_terminator(&summary) {
        summary.push('.');
    }
    Ok(summary)
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String>;

    fn name(&self) -> &'static str;
}

/// Summarizes through the chat model.
pub struct ChatSummarizer {
    client: ChatClient,
}

impl ChatSummarizer {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

fn build_summary_prompt(text: &str, max_words: usize, min_words: usize) -> String {
    let mut prompt = String::with_capacity(text.len() + 200);
    prompt.push_str(&format!(
        "Summarize the following news text in {} to {} words. Keep the facts, names and numbers. Reply with the summary only:\n\n",
        min_words, max_words
    ));
    prompt.push_str(text);
    prompt
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
        let (text, max_words, min_words) = match prepare(text, bounds)? {
            Prepared::TooShort(text) => return Ok(text),
            Prepared::Ready { text, max_words, min_words } => (text, max_words, min_words),
        };
        debug!(model = self.client.model(), max_words, min_words, "Requesting summary");

        let reply = self
            .client
            .complete(&build_summary_prompt(&text, max_words, min_words))
            .await
            .map_err(|e| AppError::SummarizationError(e.to_string()))?;
        finish_output(&reply)
    }

    fn name(&self) -> &'static str {
        "chat"
    }
}

fn sentence_body(sentence: &str) -> &str {
    sentence.trim_end_matches(SENTENCE_TERMINATORS.as_slice()).trim_end()
}

/// Offline sentence-scoring summarizer.
#[derive(Default)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }

    fn score(index: usize, total: usize, sentence: &str) -> u32 {
        let mut score = 0;

        if index == 0 {
            score += 3;
        } else if index == total - 1 {
            score += 2;
        } else if index < total / 3 {
            score += 1;
        }

        let length = sentence.chars().count();
        if (50..=200).contains(&length) {
            score += 2;
        } else if (20..50).contains(&length) {
            score += 1;
        }

        let lowered = sentence.to_lowercase();
        score += NEWS_KEYWORDS.iter().filter(|k| lowered.contains(*k)).count() as u32;
        score
    }

    fn truncated(text: &str, max_words: usize) -> String {
        if word_count(text) <= max_words {
            text.to_string()
        } else {
            format!("{}...", truncate_words(text, max_words))
        }
    }

    fn extract(text: &str, max_words: usize) -> String {
        // Each sentence keeps its own terminator so danda-ended text stays Gujarati.
        let sentences: Vec<&str> = sentence_spans(text)
            .into_iter()
            .filter(|s| sentence_body(s).chars().count() > 10)
            .collect();

        if sentences.len() <= 2 {
            return Self::truncated(text, max_words);
        }

        let mut scored: Vec<(u32, usize, &str)> = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| (Self::score(i, sentences.len(), sentence_body(s)), i, *s))
            .collect();
        // Highest score first, earlier sentence wins ties.
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut selected: Vec<(usize, &str)> = Vec::new();
        let mut total_words = 0;
        for (_, index, sentence) in scored {
            let words = word_count(sentence);
            if total_words + words <= max_words {
                selected.push((index, sentence));
                total_words += words;
            }
            if selected.len() >= MAX_EXTRACTED_SENTENCES {
                break;
            }
        }

        if selected.is_empty() {
            return Self::truncated(text, max_words);
        }
        selected.sort_by_key(|(index, _)| *index);
        selected.iter().map(|(_, s)| *s).collect::<Vec<_>>().join(" ")
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
        match prepare(text, bounds)? {
            Prepared::TooShort(text) => Ok(text),
            Prepared::Ready { text, max_words, .. } => finish_output(&Self::extract(&text, max_words)),
        }
    }

    fn name(&self) -> &'static str {
        "offline-extractive"
    }
}

/// Key points returned when the caller does not ask for a count.
pub const DEFAULT_KEY_POINTS: usize = 5;

const MIN_KEY_POINT_WORDS: usize = 6;

/// Picks up to `count` sentences, favouring long ones and, among equals, early ones.
pub fn extract_key_points(text: &str, count: usize) -> Vec<String> {
    let cleaned = collapse_whitespace(text);
    let mut scored: Vec<(f64, &str)> = split_sentences(&cleaned)
        .into_iter()
        .enumerate()
        .filter(|(_, sentence)| word_count(sentence) >= MIN_KEY_POINT_WORDS)
        .map(|(i, sentence)| (word_count(sentence) as f64 + 1.0 / (i + 1) as f64, sentence))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(count)
        .map(|(_, sentence)| sentence.to_string())
        .collect()
}
