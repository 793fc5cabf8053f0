//! Small text utilities shared by the extractor, the model backends and the store.

use serde::Serialize;

const GUJARATI_BLOCK: std::ops::RangeInclusive<char> = '\u{0A80}'..='\u{0AFF}';
const DEVANAGARI_BLOCK: std::ops::RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Sentence terminators, including the Devanagari danda used in Gujarati text.
pub const SENTENCE_TERMINATORS: [char; 4] = ['.', '!', '?', '।'];

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Keeps at most `max_words` whitespace-separated words.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace().take(max_words).collect::<Vec<_>>().join(" ")
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn ends_with_terminator(text: &str) -> bool {
    text.chars().last().is_some_and(|c| SENTENCE_TERMINATORS.contains(&c))
}

/// Splits on sentence terminators, dropping empty fragments.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(|c: char| SENTENCE_TERMINATORS.contains(&c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Splits after each sentence terminator, keeping it on its sentence.
/// A trailing fragment without a terminator is returned as is.
pub fn sentence_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        if SENTENCE_TERMINATORS.contains(&c) {
            let end = idx + c.len_utf8();
            spans.push(text[start..end].trim());
            start = end;
        }
    }
    spans.push(text[start..].trim());
    spans.retain(|s| !s.trim_matches(SENTENCE_TERMINATORS.as_slice()).trim().is_empty());
    spans
}

/// Share of non-whitespace characters that fall in `block`.
fn script_ratio(text: &str, block: &std::ops::RangeInclusive<char>) -> f64 {
    let mut total = 0usize;
    let mut matching = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if block.contains(&c) {
            matching += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        matching as f64 / total as f64
    }
}

pub fn is_gujarati_heavy(text: &str, threshold: f64) -> bool {
    script_ratio(text, &GUJARATI_BLOCK) >= threshold
}

/// Best-effort language guess used when a caller asks for `auto` detection.
pub fn detect_language(text: &str) -> &'static str {
    if is_gujarati_heavy(text, 0.3) {
        "gu"
    } else if script_ratio(text, &DEVANAGARI_BLOCK) >= 0.3 {
        "hi"
    } else {
        "en"
    }
}

/// Reading speed assumed by `estimate_reading_time`, in words per minute.
pub const READING_WORDS_PER_MINUTE: usize = 200;

/// Whole minutes needed to read `text`, never less than one.
pub fn estimate_reading_time(text: &str, words_per_minute: usize) -> usize {
    (word_count(text) / words_per_minute.max(1)).max(1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStatistics {
    pub character_count: usize,
    pub character_count_no_spaces: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub average_word_length: f64,
    pub average_sentence_length: f64,
    pub estimated_reading_time: usize,
}

/// Character, word and sentence counts. Lengths are in Unicode scalar values.
pub fn text_statistics(text: &str) -> TextStatistics {
    let words: Vec<&str> = text.split_whitespace().collect();
    let sentence_count = split_sentences(text).len();

    let average_word_length = if words.is_empty() {
        0.0
    } else {
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
    };
    let average_sentence_length = if sentence_count == 0 {
        0.0
    } else {
        words.len() as f64 / sentence_count as f64
    };

    TextStatistics {
        character_count: text.chars().count(),
        character_count_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        word_count: words.len(),
        sentence_count,
        average_word_length: round_to(average_word_length, 2),
        average_sentence_length: round_to(average_sentence_length, 2),
        estimated_reading_time: estimate_reading_time(text, READING_WORDS_PER_MINUTE),
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_multibyte_characters() {
        let text = "આજે વરસાદ છે.";
        assert_eq!(truncate_chars(text, 3), "આજે");
        assert_eq!(truncate_chars(text, 100), text);
        assert_eq!(truncate_words("one two  three four", 2), "one two");
    }

    #[test]
    fn sentences_split_on_danda_too() {
        let sentences = split_sentences("પહેલું વાક્ય। Second one! Third?  ");
        assert_eq!(sentences, vec!["પહેલું વાક્ય", "Second one", "Third"]);
    }

    #[test]
    fn spans_keep_their_terminators() {
        let spans = sentence_spans("પહેલું વાક્ય। Second one!! Third");
        assert_eq!(spans, vec!["પહેલું વાક્ય।", "Second one!", "Third"]);
    }

    #[test]
    fn detects_gujarati_and_english() {
        assert_eq!(detect_language("આજે વરસાદ છે."), "gu");
        assert_eq!(detect_language("आज बारिश है"), "hi");
        assert_eq!(detect_language("It is raining today."), "en");
        assert!(!is_gujarati_heavy("", 0.3));
    }

    #[test]
    fn statistics_count_words_and_sentences() {
        let stats = text_statistics("આજે વરસાદ છે. Roads are flooded!");
        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.sentence_count, 2);
        assert_eq!(stats.character_count, 32);
        assert_eq!(stats.character_count_no_spaces, 27);
        assert_eq!(stats.average_sentence_length, 3.0);
        assert_eq!(stats.estimated_reading_time, 1);

        assert_eq!(estimate_reading_time(&"word ".repeat(650), 200), 3);
        assert_eq!(text_statistics("").average_word_length, 0.0);
    }

    #[test]
    fn capitalize_and_terminators() {
        assert_eq!(capitalize_first("rain today"), "Rain today");
        assert_eq!(capitalize_first(""), "");
        assert!(ends_with_terminator("Done।"));
        assert!(!ends_with_terminator("Not done"));
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(round_to(1.23456, 2), 1.23);
    }
}
