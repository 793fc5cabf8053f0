pub mod api;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod pipeline;
pub mod store;
pub mod summarizer;
pub mod text;
pub mod translator;

use std::sync::Arc;
use config::Config;
use pipeline::Pipeline;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<Pipeline>,
}
