use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::api::models::{InputType, ProcessingRequest, ProcessingResult};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extractor::{parse_article_url, Article, Extractor, HttpExtractor};
use crate::llm::ChatClient;
use crate::store::{ActivityStore, NewActivity};
use crate::summarizer::{ChatSummarizer, ExtractiveSummarizer, Summarizer, SummaryBounds};
use crate::text::{detect_language, round_to, word_count};
use crate::translator::{ChatTranslator, LanguageSupport, TransliterationTranslator, Translator};

/// Knobs the orchestrator reads on every request.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub source_lang: String,
    pub target_lang: String,
    pub min_text_length: usize,
    pub summary_bounds: SummaryBounds,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
            min_text_length: config.min_text_length,
            summary_bounds: SummaryBounds::default(),
        }
    }
}

/// Sequences extraction, translation and summarization, then records the outcome.
pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    translator: Arc<dyn Translator>,
    summarizer: Arc<dyn Summarizer>,
    store: Arc<ActivityStore>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        translator: Arc<dyn Translator>,
        summarizer: Arc<dyn Summarizer>,
        store: Arc<ActivityStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            translator,
            summarizer,
            store,
            settings,
        }
    }

    /// Wires the HTTP extractor and the model backends selected by `config`.
    pub fn from_config(config: &Config, store: Arc<ActivityStore>) -> Result<Self> {
        let extractor: Arc<dyn Extractor> = Arc::new(HttpExtractor::new(config)?);

        let chat = if config.uses_chat_backend() {
            ChatClient::from_config(config)
                .map_err(|e| AppError::ConfigError(format!("Failed to build model client: {}", e)))?
        } else {
            None
        };

        let (translator, summarizer): (Arc<dyn Translator>, Arc<dyn Summarizer>) = match chat {
            Some(client) => (
                Arc::new(ChatTranslator::new(client.clone())),
                Arc::new(ChatSummarizer::new(client)),
            ),
            None => {
                warn!("Chat model backend disabled, using offline translation and summarization");
                (
                    Arc::new(TransliterationTranslator::new()),
                    Arc::new(ExtractiveSummarizer::new()),
                )
            }
        };
        info!(translator = translator.name(), summarizer = summarizer.name(), "Model backends ready");

        Ok(Self::new(
            extractor,
            translator,
            summarizer,
            store,
            PipelineSettings::from_config(config),
        ))
    }

    pub fn store(&self) -> &Arc<ActivityStore> {
        &self.store
    }

    pub fn translator_name(&self) -> &'static str {
        self.translator.name()
    }

    pub fn summarizer_name(&self) -> &'static str {
        self.summarizer.name()
    }

    /// Runs every requested stage in order. Any stage failure fails the whole
    /// request and nothing is recorded. The activity append is the last step and
    /// is not followed by an await point.
    pub async fn process(&self, request: ProcessingRequest) -> Result<ProcessingResult> {
        let start = Instant::now();

        let (original_text, article) = match request.input_type {
            InputType::Url => {
                let url = parse_article_url(&request.content)?;
                info!(url = %url, "Extracting article");
                let article = self.extractor.extract(&url).await?;
                (article.text.clone(), Some(article))
            }
            InputType::Text => {
                self.validate_text(&request.content)?;
                (request.content.clone(), None)
            }
        };
        debug!(chars = original_text.chars().count(), "Original text ready");

        let translated_text = if request.translate {
            info!(
                source = %self.settings.source_lang,
                target = %self.settings.target_lang,
                "Translating content"
            );
            Some(
                self.translator
                    .translate(&original_text, &self.settings.source_lang, &self.settings.target_lang)
                    .await?,
            )
        } else {
            None
        };

        // Summaries always work from the translation when one exists.
        let summary_input = translated_text.as_deref().unwrap_or(&original_text);
        let summary = if request.summarize {
            info!(from_translation = translated_text.is_some(), "Summarizing content");
            Some(
                self.summarizer
                    .summarize(summary_input, self.settings.summary_bounds)
                    .await?,
            )
        } else {
            None
        };

        let compression_ratio = summary
            .as_deref()
            .map(|summary| compression_ratio(summary, summary_input));
        let processing_time = start.elapsed().as_secs_f64();

        let result = ProcessingResult {
            original_text,
            translated_text,
            summary,
            title: article.as_ref().and_then(|a| a.title.clone()),
            source_url: article.as_ref().map(|a| a.url.clone()),
            url_extracted: article.is_some(),
            compression_ratio,
            processing_time_seconds: processing_time,
            timestamp: Utc::now(),
        };

        let record = self.store.append(activity_from(&result, request.input_type, article.as_ref()));
        info!(
            activity_id = record.id,
            processing_time,
            "Request processed"
        );
        Ok(result)
    }

    /// Single translation outside the pipeline; `auto` detects the source language.
    pub async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(AppError::ValidationError("Text cannot be empty".to_string()));
        }
        let source_lang = if source_lang.eq_ignore_ascii_case("auto") {
            let detected = detect_language(text);
            debug!(detected, "Detected source language");
            detected
        } else {
            source_lang
        };
        self.translator.translate(text, source_lang, target_lang).await
    }

    /// Single summarization outside the pipeline.
    pub async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
        if text.trim().is_empty() {
            return Err(AppError::ValidationError("Text cannot be empty".to_string()));
        }
        self.summarizer.summarize(text, bounds).await
    }

    /// Translates each text in order; the first failure fails the batch.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<String>> {
        validate_batch(texts)?;
        let mut translations = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            let translated = self
                .translate(text, source_lang, target_lang)
                .await
                .inspect_err(|e| warn!(index, error = %e, "Batch translation item failed"))?;
            translations.push(translated);
        }
        info!(items = texts.len(), "Batch translated");
        Ok(translations)
    }

    /// Summarizes each text in order; the first failure fails the batch.
    pub async fn summarize_batch(&self, texts: &[String], bounds: SummaryBounds) -> Result<Vec<String>> {
        validate_batch(texts)?;
        let mut summaries = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            let summary = self
                .summarize(text, bounds)
                .await
                .inspect_err(|e| warn!(index, error = %e, "Batch summarization item failed"))?;
            summaries.push(summary);
        }
        info!(items = texts.len(), "Batch summarized");
        Ok(summaries)
    }

    pub fn languages(&self) -> LanguageSupport {
        self.translator.languages()
    }

    fn validate_text(&self, content: &str) -> Result<()> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(AppError::ValidationError("No content to process".to_string()));
        }
        if trimmed.chars().count() < self.settings.min_text_length {
            return Err(AppError::ValidationError(format!(
                "Text must be at least {} characters",
                self.settings.min_text_length
            )));
        }
        Ok(())
    }
}

/// Most texts accepted by one batch call.
pub const MAX_BATCH_ITEMS: usize = 20;

fn validate_batch(texts: &[String]) -> Result<()> {
    if texts.is_empty() {
        return Err(AppError::ValidationError("Batch cannot be empty".to_string()));
    }
    if texts.len() > MAX_BATCH_ITEMS {
        return Err(AppError::ValidationError(format!(
            "Batch has {} texts, at most {} are allowed",
            texts.len(),
            MAX_BATCH_ITEMS
        )));
    }
    Ok(())
}

/// Summary words over source words, rounded to three places.
pub fn compression_ratio(summary: &str, source: &str) -> f64 {
    let source_words = word_count(source);
    if source_words == 0 {
        return 0.0;
    }
    round_to(word_count(summary) as f64 / source_words as f64, 3)
}

fn activity_from(result: &ProcessingResult, input_type: InputType, article: Option<&Article>) -> NewActivity {
    NewActivity {
        input_type,
        source_url: article.map(|a| a.url.clone()),
        source_domain: article.map(|a| a.source_domain.clone()),
        original_text: result.original_text.clone(),
        translated_text: result.translated_text.clone(),
        summary: result.summary.clone(),
        original_word_count: word_count(&result.original_text),
        translated_word_count: result.translated_text.as_deref().map(word_count),
        summary_word_count: result.summary.as_deref().map(word_count),
        compression_ratio: result.compression_ratio,
        processing_time: result.processing_time_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_ratio_of_empty_source_is_zero() {
        assert_eq!(compression_ratio("anything", ""), 0.0);
        assert_eq!(compression_ratio("one two", "one two three four"), 0.5);
        assert_eq!(compression_ratio("a", "a b c"), 0.333);
    }

    #[test]
    fn batch_size_is_bounded() {
        assert!(matches!(validate_batch(&[]), Err(AppError::ValidationError(_))));
        let too_many = vec!["text".to_string(); MAX_BATCH_ITEMS + 1];
        assert!(matches!(validate_batch(&too_many), Err(AppError::ValidationError(_))));
        assert!(validate_batch(&too_many[..MAX_BATCH_ITEMS]).is_ok());
    }

    #[test]
    fn default_settings_follow_default_config() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.source_lang, "gu");
        assert_eq!(settings.target_lang, "en");
        assert_eq!(settings.min_text_length, 5);
        assert_eq!(settings.summary_bounds, SummaryBounds::default());
    }
}
