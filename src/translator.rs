use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::llm::ChatClient;
use crate::text::{capitalize_first, collapse_whitespace, truncate_chars};

/// Longest input handed to a translation backend.
pub const MAX_TRANSLATION_CHARS: usize = 5000;

/// Language codes a backend accepts; `auto` means the source is detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageSupport {
    pub source_languages: Vec<&'static str>,
    pub target_languages: Vec<&'static str>,
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` from `source_lang` into `target_lang` (ISO 639-1 codes).
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;

    fn name(&self) -> &'static str;

    fn languages(&self) -> LanguageSupport {
        LanguageSupport {
            source_languages: vec!["gu", "hi", "auto"],
            target_languages: vec!["en"],
        }
    }
}

fn prepare_input(text: &str) -> Result<String> {
    let cleaned = collapse_whitespace(text);
    if cleaned.is_empty() {
        return Err(AppError::ValidationError("Text cannot be empty".to_string()));
    }
    Ok(truncate_chars(&cleaned, MAX_TRANSLATION_CHARS).to_string())
}

fn finish_output(text: &str) -> Result<String> {
    let cleaned = collapse_whitespace(text);
    if cleaned.is_empty() {
        return Err(AppError::TranslationError("Model returned an empty translation".to_string()));
    }
    Ok(capitalize_first(&cleaned))
}

fn language_name(code: &str) -> &str {
    match code {
        "gu" => "Gujarati",
        "hi" => "Hindi",
        "en" => "English",
        "mr" => "Marathi",
        other => other,
    }
}

/// Translates through the chat model.
pub struct ChatTranslator {
    client: ChatClient,
}

impl ChatTranslator {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

fn build_translation_prompt(text: &str, source_lang: &str, target_lang: &str) -> String {
    let mut prompt = String::with_capacity(text.len() + 200);
    prompt.push_str(&format!(
        "Translate the following {} news text into {}. Reply with the translation only, without notes or quotation marks:\n\n",
        language_name(source_lang),
        language_name(target_lang),
    ));
    prompt.push_str(text);
    prompt
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let input = prepare_input(text)?;
        let prompt = build_translation_prompt(&input, source_lang, target_lang);
        debug!(model = self.client.model(), chars = input.len(), "Requesting translation");

        let reply = self
            .client
            .complete(&prompt)
            .await
            .map_err(|e| AppError::TranslationError(e.to_string()))?;
        finish_output(&reply)
    }

    fn name(&self) -> &'static str {
        "chat"
    }

    fn languages(&self) -> LanguageSupport {
        LanguageSupport {
            source_languages: vec!["gu", "hi", "mr", "en", "auto"],
            target_languages: vec!["en", "gu", "hi"],
        }
    }
}

static WORD_TRANSLATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("સમાચાર", "news"), ("ખબર", "news"), ("આજ", "today"), ("આજે", "today"),
        ("ગુજરાત", "Gujarat"), ("ભારત", "India"), ("અહીં", "here"), ("ત્યાં", "there"),
        ("લોકો", "people"), ("જનતા", "public"), ("સરકાર", "government"),
        ("મુખ્યમંત્રી", "Chief Minister"), ("પ્રધાનમંત્રી", "Prime Minister"),
        ("વર્ષ", "year"), ("મહિનો", "month"), ("દિવસ", "day"), ("સમય", "time"),
        ("પૈસા", "money"), ("રૂપિયા", "rupees"), ("હજાર", "thousand"),
        ("લાખ", "lakh"), ("કરોડ", "crore"), ("અબજ", "billion"),
        ("શહેર", "city"), ("ગામ", "village"), ("રાજ્ય", "state"),
        ("કોર્ટ", "court"), ("ન્યાય", "justice"), ("કાયદો", "law"),
        ("પોલીસ", "police"), ("ચૂંટણી", "election"), ("પાર્ટી", "party"),
        ("વરસાદ", "rain"), ("છે", "is"),
    ])
});

static CHAR_TRANSLITERATIONS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('અ', "a"), ('આ', "aa"), ('ઇ', "i"), ('ઈ', "ii"), ('ઉ', "u"), ('ઊ', "uu"),
        ('એ', "e"), ('ઐ', "ai"), ('ઓ', "o"), ('ઔ', "au"),
        ('ક', "ka"), ('ખ', "kha"), ('ગ', "ga"), ('ઘ', "gha"), ('ઙ', "nga"),
        ('ચ', "cha"), ('છ', "chha"), ('જ', "ja"), ('ઝ', "jha"), ('ઞ', "nja"),
        ('ટ', "ta"), ('ઠ', "tha"), ('ડ', "da"), ('ઢ', "dha"), ('ણ', "na"),
        ('ત', "ta"), ('થ', "tha"), ('દ', "da"), ('ધ', "dha"), ('ન', "na"),
        ('પ', "pa"), ('ફ', "pha"), ('બ', "ba"), ('ભ', "bha"), ('મ', "ma"),
        ('ય', "ya"), ('ર', "ra"), ('લ', "la"), ('વ', "va"),
        ('શ', "sha"), ('ષ', "sha"), ('સ', "sa"), ('હ', "ha"),
        ('।', "."),
    ])
});

/// Offline fallback: dictionary lookup plus character transliteration, Gujarati to English only.
#[derive(Default)]
pub struct TransliterationTranslator;

impl TransliterationTranslator {
    pub fn new() -> Self {
        Self
    }

    fn translate_word(word: &str) -> String {
        // Keep trailing punctuation separate so "છે." still hits the dictionary.
        let core = word.trim_end_matches(|c: char| c.is_ascii_punctuation() || c == '।');
        let tail = &word[core.len()..];

        if let Some(translated) = WORD_TRANSLATIONS.get(core) {
            return format!("{}{}", translated, Self::transliterate(tail));
        }
        Self::transliterate(word)
    }

    fn transliterate(word: &str) -> String {
        word.chars()
            .map(|c| match CHAR_TRANSLITERATIONS.get(&c) {
                Some(latin) => (*latin).to_string(),
                None => c.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl Translator for TransliterationTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        if source_lang != "gu" || target_lang != "en" {
            return Err(AppError::TranslationError(format!(
                "Offline translation only supports gu -> en, not {} -> {}",
                source_lang, target_lang
            )));
        }
        let input = prepare_input(text)?;
        let words: Vec<String> = input.split_whitespace().map(Self::translate_word).collect();
        finish_output(&format!("[Transliterated] {}", words.join(" ")))
    }

    fn name(&self) -> &'static str {
        "offline-transliteration"
    }

    fn languages(&self) -> LanguageSupport {
        LanguageSupport {
            source_languages: vec!["gu", "auto"],
            target_languages: vec!["en"],
        }
    }
}
