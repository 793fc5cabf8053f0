use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::api::models::InputType;
use crate::text::round_to;

const TOP_SOURCES: usize = 5;

/// Fields of a completed request; the store assigns `id` and `timestamp`.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub input_type: InputType,
    pub source_url: Option<String>,
    pub source_domain: Option<String>,
    pub original_text: String,
    pub translated_text: Option<String>,
    pub summary: Option<String>,
    pub original_word_count: usize,
    pub translated_word_count: Option<usize>,
    pub summary_word_count: Option<usize>,
    pub compression_ratio: Option<f64>,
    pub processing_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub input_type: InputType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_domain: Option<String>,
    pub original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub original_word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
    pub processing_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub total_articles_processed: usize,
    pub total_translations: usize,
    pub total_summaries: usize,
    pub total_url_extractions: usize,
    pub average_summary_length: f64,
    pub average_processing_time: f64,
    pub most_common_sources: Vec<String>,
}

/// Append-only, in-process log of completed processing requests.
#[derive(Default)]
pub struct ActivityStore {
    records: RwLock<Vec<ActivityRecord>>,
}

impl ActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record, assigning the next id and the current time.
    pub fn append(&self, activity: NewActivity) -> ActivityRecord {
        let mut records = self.records.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let record = ActivityRecord {
            id: records.len() as u64 + 1,
            timestamp: Utc::now(),
            input_type: activity.input_type,
            source_url: activity.source_url,
            source_domain: activity.source_domain,
            original_text: activity.original_text,
            translated_text: activity.translated_text,
            summary: activity.summary,
            original_word_count: activity.original_word_count,
            translated_word_count: activity.translated_word_count,
            summary_word_count: activity.summary_word_count,
            compression_ratio: activity.compression_ratio,
            processing_time: activity.processing_time,
        };
        records.push(record.clone());
        record
    }

    /// Newest records first, at most `limit` of them.
    pub fn recent(&self, limit: usize) -> Vec<ActivityRecord> {
        let records = self.records.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        records.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn statistics(&self) -> StatisticsSnapshot {
        let records = self.records.read().unwrap_or_else(|poisoned| poisoned.into_inner());

        let total = records.len();
        let total_translations = records.iter().filter(|r| r.translated_text.is_some()).count();
        let total_url_extractions = records.iter().filter(|r| r.input_type == InputType::Url).count();

        let summary_lengths: Vec<usize> = records.iter().filter_map(|r| r.summary_word_count).collect();
        let average_summary_length = if summary_lengths.is_empty() {
            0.0
        } else {
            summary_lengths.iter().sum::<usize>() as f64 / summary_lengths.len() as f64
        };

        let average_processing_time = if total == 0 {
            0.0
        } else {
            records.iter().map(|r| r.processing_time).sum::<f64>() / total as f64
        };

        let mut domain_counts: HashMap<&str, usize> = HashMap::new();
        for domain in records
            .iter()
            .filter(|r| r.input_type == InputType::Url)
            .filter_map(|r| r.source_domain.as_deref())
        {
            *domain_counts.entry(domain).or_default() += 1;
        }
        let mut sources: Vec<(&str, usize)> = domain_counts.into_iter().collect();
        sources.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        StatisticsSnapshot {
            total_articles_processed: total,
            total_translations,
            total_summaries: summary_lengths.len(),
            total_url_extractions,
            average_summary_length: round_to(average_summary_length, 2),
            average_processing_time: round_to(average_processing_time, 3),
            most_common_sources: sources
                .into_iter()
                .take(TOP_SOURCES)
                .map(|(domain, _)| domain.to_string())
                .collect(),
        }
    }
}
