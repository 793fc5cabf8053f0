use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

/// Which model backends translate and summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    /// Chat backend when an API key is configured, offline otherwise.
    Auto,
    Chat,
    Offline,
}

impl FromStr for ModelBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ModelBackend::Auto),
            "chat" => Ok(ModelBackend::Chat),
            "offline" => Ok(ModelBackend::Offline),
            other => Err(AppError::ConfigError(format!("Invalid MODEL_BACKEND: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub llm_model: String,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
    pub model_backend: ModelBackend,
    pub source_lang: String,
    pub target_lang: String,
    pub request_timeout: Duration,
    pub fetch_timeout: Duration,
    pub min_text_length: usize,
    pub max_extracted_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            openrouter_api_key: None,
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            llm_model: "deepseek/deepseek-chat-v3-0324".to_string(),
            site_url: None,
            site_name: None,
            model_backend: ModelBackend::Auto,
            source_lang: "gu".to_string(),
            target_lang: "en".to_string(),
            request_timeout: Duration::from_secs(90),
            fetch_timeout: Duration::from_secs(15),
            min_text_length: 5,
            max_extracted_chars: 5000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = non_empty("PORT").unwrap_or_else(|| "8000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let openrouter_api_key = non_empty("OPENROUTER_API_KEY");
        let model_backend = match non_empty("MODEL_BACKEND") {
            Some(raw) => raw.parse::<ModelBackend>()?,
            None => defaults.model_backend,
        };
        if model_backend == ModelBackend::Chat && openrouter_api_key.is_none() {
            return Err(AppError::ConfigError(
                "MODEL_BACKEND=chat requires OPENROUTER_API_KEY".to_string(),
            ));
        }

        let request_timeout = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("REQUEST_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };
        let fetch_timeout = match non_empty("FETCH_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("FETCH_TIMEOUT_SECS", &raw)?),
            None => defaults.fetch_timeout,
        };
        let min_text_length = match non_empty("MIN_TEXT_LENGTH") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| AppError::ConfigError(format!("Invalid MIN_TEXT_LENGTH: {}", e)))?,
            None => defaults.min_text_length,
        };
        let max_extracted_chars = match non_empty("MAX_EXTRACTED_CHARS") {
            Some(raw) => parse_positive("MAX_EXTRACTED_CHARS", &raw)? as usize,
            None => defaults.max_extracted_chars,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openrouter_api_key,
            openrouter_base_url: non_empty("OPENROUTER_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openrouter_base_url),
            llm_model: non_empty("LLM_MODEL").unwrap_or(defaults.llm_model),
            site_url: non_empty("SITE_URL"),
            site_name: non_empty("SITE_NAME"),
            model_backend,
            source_lang: non_empty("SOURCE_LANG").unwrap_or(defaults.source_lang),
            target_lang: non_empty("TARGET_LANG").unwrap_or(defaults.target_lang),
            request_timeout,
            fetch_timeout,
            min_text_length,
            max_extracted_chars,
        })
    }

    /// True when translation and summarization go through the chat model.
    pub fn uses_chat_backend(&self) -> bool {
        match self.model_backend {
            ModelBackend::Chat => true,
            ModelBackend::Offline => false,
            ModelBackend::Auto => self.openrouter_api_key.is_some(),
        }
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(format!("{} must be greater than zero", key))),
        Ok(value) => Ok(value),
        Err(e) => Err(AppError::ConfigError(format!("Invalid {}: {}", key, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_addr, SocketAddr::from(([127, 0, 0, 1], 8000)));
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.source_lang, "gu");
        assert_eq!(config.target_lang, "en");
        assert!(!config.uses_chat_backend());
    }

    #[test]
    fn api_key_switches_auto_backend_to_chat() {
        let config = config_from(&[("OPENROUTER_API_KEY", "sk-test")]).unwrap();
        assert!(config.uses_chat_backend());

        let forced = config_from(&[("OPENROUTER_API_KEY", "sk-test"), ("MODEL_BACKEND", "offline")]).unwrap();
        assert!(!forced.uses_chat_backend());
    }

    #[test]
    fn chat_backend_without_key_is_rejected() {
        let err = config_from(&[("MODEL_BACKEND", "chat")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        assert!(matches!(config_from(&[("PORT", "eighty")]), Err(AppError::ConfigError(_))));
        assert!(matches!(config_from(&[("HOST", "localhost:1")]), Err(AppError::ConfigError(_))));
        assert!(matches!(
            config_from(&[("REQUEST_TIMEOUT_SECS", "0")]),
            Err(AppError::ConfigError(_))
        ));
        assert!(matches!(config_from(&[("MODEL_BACKEND", "gpu")]), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = config_from(&[("OPENROUTER_BASE_URL", "http://localhost:9000/v1/")]).unwrap();
        assert_eq!(config.openrouter_base_url, "http://localhost:9000/v1");
    }
}
