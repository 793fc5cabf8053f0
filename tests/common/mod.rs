// Fake pipeline stages for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use news_translator::error::{AppError, Result};
use news_translator::extractor::{source_domain, Article, Extractor};
use news_translator::pipeline::{Pipeline, PipelineSettings};
use news_translator::store::ActivityStore;
use news_translator::summarizer::{Summarizer, SummaryBounds};
use news_translator::translator::Translator;

pub const ARTICLE_TEXT: &str = "અમદાવાદમાં આજે ભારે વરસાદ પડ્યો અને ઘણા રસ્તાઓ પર પાણી ભરાયા.";

/// Returns a canned article, or a canned failure, and remembers every URL it was asked for.
pub struct FakeExtractor {
    failure: Option<fn(String) -> AppError>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self { failure: None, calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(failure: fn(String) -> AppError) -> Self {
        Self { failure: Some(failure), calls: Mutex::new(Vec::new()) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(&self, url: &Url) -> Result<Article> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(failure) = self.failure {
            return Err(failure(format!("cannot read {}", url)));
        }
        Ok(Article {
            url: url.to_string(),
            title: Some("Rain in Ahmedabad".to_string()),
            text: ARTICLE_TEXT.to_string(),
            source_domain: source_domain(url),
        })
    }
}

/// Wraps its input as `EN(<input>)` and records what it saw.
pub struct RecordingTranslator {
    fail: bool,
    delay: Option<Duration>,
    pub inputs: Mutex<Vec<String>>,
}

impl RecordingTranslator {
    pub fn new() -> Self {
        Self { fail: false, delay: None, inputs: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::new() }
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    async fn translate(&self, text: &str, _source_lang: &str, _target_lang: &str) -> Result<String> {
        self.inputs.lock().unwrap().push(text.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AppError::TranslationError("model unavailable".to_string()));
        }
        Ok(format!("EN({})", text))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Wraps its input as `SUMMARY(<input>)` and records what it saw.
pub struct RecordingSummarizer {
    fail: bool,
    pub inputs: Mutex<Vec<String>>,
}

impl RecordingSummarizer {
    pub fn new() -> Self {
        Self { fail: false, inputs: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { fail: true, inputs: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl Summarizer for RecordingSummarizer {
    async fn summarize(&self, text: &str, _bounds: SummaryBounds) -> Result<String> {
        self.inputs.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(AppError::SummarizationError("model unavailable".to_string()));
        }
        Ok(format!("SUMMARY({})", text))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct Harness {
    pub extractor: Arc<FakeExtractor>,
    pub translator: Arc<RecordingTranslator>,
    pub summarizer: Arc<RecordingSummarizer>,
    pub store: Arc<ActivityStore>,
    pub pipeline: Arc<Pipeline>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(FakeExtractor::new(), RecordingTranslator::new(), RecordingSummarizer::new())
    }

    pub fn with(
        extractor: FakeExtractor,
        translator: RecordingTranslator,
        summarizer: RecordingSummarizer,
    ) -> Self {
        let extractor = Arc::new(extractor);
        let translator = Arc::new(translator);
        let summarizer = Arc::new(summarizer);
        let store = Arc::new(ActivityStore::new());
        let pipeline = Arc::new(Pipeline::new(
            extractor.clone(),
            translator.clone(),
            summarizer.clone(),
            store.clone(),
            PipelineSettings::default(),
        ));
        Self { extractor, translator, summarizer, store, pipeline }
    }
}
