use axum::{
    routing::{get, post},
    Router,
    extract::State,
    response::IntoResponse,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{Result, AppError};
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::models::{
    BatchResponse, BatchSummarizeRequest, BatchTranslateRequest, HealthResponse, KeyPointsRequest,
    KeyPointsResponse, LanguagesResponse, ProcessingRequest, RecentActivityQuery,
    RecentActivityResponse, RootResponse, SourcesResponse, SummarizeRequest, SummarizeResponse,
    TextStatsRequest, TranslateRequest, TranslateResponse,
};
use crate::api::response;
use crate::extractor::{COMMON_GUJARATI_SOURCES, SUPPORTED_ARTICLE_LANGUAGES};
use crate::pipeline::compression_ratio;
use crate::summarizer::{extract_key_points, SummaryBounds};
use crate::text::text_statistics;
use crate::AppState;

const DEFAULT_RECENT_LIMIT: usize = 10;
const MAX_RECENT_LIMIT: usize = 100;
const MAX_KEY_POINTS: usize = 20;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/translate", post(translate_handler))
        .route("/translate/batch", post(batch_translate_handler))
        .route("/summarize", post(summarize_handler))
        .route("/summarize/batch", post(batch_summarize_handler))
        .route("/key-points", post(key_points_handler))
        .route("/text-stats", post(text_stats_handler))
        .route("/process", post(process_handler))
        .route("/stats", get(stats_handler))
        .route("/recent-activity", get(recent_activity_handler))
        .route("/languages", get(languages_handler))
        .route("/sources", get(sources_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn root_handler() -> impl IntoResponse {
    response::success(RootResponse {
        message: "Gujarati News Translator API",
        status: "active",
    })
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    response::success(HealthResponse {
        status: "healthy",
        translator: state.pipeline.translator_name(),
        summarizer: state.pipeline.summarizer_name(),
        activity_records: state.pipeline.store().len(),
    })
}

async fn translate_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TranslateRequest>,
) -> Result<impl IntoResponse> {
    let translated_text = state
        .pipeline
        .translate(&req.text, &req.source_lang, &req.target_lang)
        .await
        .inspect_err(|e| warn!(error = %e, "Translation request failed"))?;

    Ok(response::success(TranslateResponse {
        original_text: req.text,
        translated_text,
        source_lang: req.source_lang,
        target_lang: req.target_lang,
    }))
}

async fn summarize_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SummarizeRequest>,
) -> Result<impl IntoResponse> {
    let bounds = SummaryBounds::new(req.max_length, req.min_length)?;
    let summary = state
        .pipeline
        .summarize(&req.text, bounds)
        .await
        .inspect_err(|e| warn!(error = %e, "Summarization request failed"))?;

    let ratio = compression_ratio(&summary, &req.text);
    Ok(response::success(SummarizeResponse {
        original_text: req.text,
        summary,
        compression_ratio: ratio,
    }))
}

async fn batch_translate_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchTranslateRequest>,
) -> Result<impl IntoResponse> {
    let translations = state
        .pipeline
        .translate_batch(&req.texts, &req.source_lang, &req.target_lang)
        .await?;

    let results = req
        .texts
        .into_iter()
        .zip(translations)
        .map(|(original_text, translated_text)| TranslateResponse {
            original_text,
            translated_text,
            source_lang: req.source_lang.clone(),
            target_lang: req.target_lang.clone(),
        })
        .collect();
    Ok(response::success(BatchResponse { results }))
}

async fn batch_summarize_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchSummarizeRequest>,
) -> Result<impl IntoResponse> {
    let bounds = SummaryBounds::new(req.max_length, req.min_length)?;
    let summaries = state.pipeline.summarize_batch(&req.texts, bounds).await?;

    let results = req
        .texts
        .into_iter()
        .zip(summaries)
        .map(|(original_text, summary)| SummarizeResponse {
            compression_ratio: compression_ratio(&summary, &original_text),
            original_text,
            summary,
        })
        .collect();
    Ok(response::success(BatchResponse { results }))
}

async fn key_points_handler(ApiJson(req): ApiJson<KeyPointsRequest>) -> Result<impl IntoResponse> {
    if req.text.trim().is_empty() {
        return Err(AppError::ValidationError("Text cannot be empty".to_string()));
    }
    if req.num_points == 0 || req.num_points > MAX_KEY_POINTS {
        return Err(AppError::ValidationError(format!(
            "num_points must be between 1 and {}",
            MAX_KEY_POINTS
        )));
    }

    let key_points = extract_key_points(&req.text, req.num_points);
    Ok(response::success(KeyPointsResponse {
        num_points: key_points.len(),
        original_text: req.text,
        key_points,
    }))
}

async fn text_stats_handler(ApiJson(req): ApiJson<TextStatsRequest>) -> Result<impl IntoResponse> {
    if req.text.trim().is_empty() {
        return Err(AppError::ValidationError("Text cannot be empty".to_string()));
    }
    Ok(response::success(text_statistics(&req.text)))
}

async fn process_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ProcessingRequest>,
) -> Result<impl IntoResponse> {
    info!(input_type = ?req.input_type, translate = req.translate, summarize = req.summarize, "Processing request");
    let start_time = std::time::Instant::now();
    let deadline = state.config.request_timeout;

    // Overall deadline for every stage of the request
    let result = tokio::time::timeout(deadline, state.pipeline.process(req)).await;

    let elapsed = start_time.elapsed();
    match result {
        Ok(Ok(processed)) => Ok(response::success(processed)),
        Ok(Err(err)) => {
            warn!(stage = ?err.stage(), error = %err, ?elapsed, "Processing failed");
            Err(err)
        }
        Err(_) => {
            warn!(?elapsed, "Request timed out");
            Err(AppError::TimeoutError(deadline))
        }
    }
}

async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    response::success(state.pipeline.store().statistics())
}

async fn recent_activity_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecentActivityQuery>,
) -> impl IntoResponse {
    // A limit of zero asks for nothing and gets nothing.
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .min(MAX_RECENT_LIMIT);

    response::success(RecentActivityResponse {
        recent_activity: state.pipeline.store().recent(limit),
    })
}

async fn languages_handler(State(state): State<AppState>) -> impl IntoResponse {
    response::success(LanguagesResponse {
        translator: state.pipeline.translator_name(),
        languages: state.pipeline.languages(),
    })
}

async fn sources_handler() -> impl IntoResponse {
    response::success(SourcesResponse {
        supported_languages: SUPPORTED_ARTICLE_LANGUAGES.to_vec(),
        common_gujarati_sources: COMMON_GUJARATI_SOURCES.to_vec(),
    })
}
