use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::store::ActivityRecord;
use crate::translator::LanguageSupport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Url,
    #[default]
    Text,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingRequest {
    #[serde(rename = "inputType", default)]
    pub input_type: InputType,
    pub content: String,
    #[serde(default = "default_true")]
    pub translate: bool,
    #[serde(default)]
    pub summarize: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub url_extracted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
    #[serde(rename = "processing_time")]
    pub processing_time_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

fn default_source_lang() -> String {
    "gu".to_string()
}

fn default_target_lang() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

fn default_max_length() -> usize {
    150
}

fn default_min_length() -> usize {
    50
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub original_text: String,
    pub summary: String,
    pub compression_ratio: f64,
}

#[derive(Debug, Deserialize)]
pub struct RecentActivityQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecentActivityResponse {
    pub recent_activity: Vec<ActivityRecord>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub translator: &'static str,
    pub summarizer: &'static str,
    pub activity_records: usize,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct BatchTranslateRequest {
    pub texts: Vec<String>,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchSummarizeRequest {
    pub texts: Vec<String>,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse<T> {
    pub results: Vec<T>,
}

fn default_num_points() -> usize {
    crate::summarizer::DEFAULT_KEY_POINTS
}

#[derive(Debug, Deserialize)]
pub struct KeyPointsRequest {
    pub text: String,
    #[serde(default = "default_num_points")]
    pub num_points: usize,
}

#[derive(Debug, Serialize)]
pub struct KeyPointsResponse {
    pub original_text: String,
    pub key_points: Vec<String>,
    pub num_points: usize,
}

#[derive(Debug, Deserialize)]
pub struct TextStatsRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub translator: &'static str,
    #[serde(flatten)]
    pub languages: LanguageSupport,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub supported_languages: Vec<&'static str>,
    pub common_gujarati_sources: Vec<&'static str>,
}
