//! Runtime configuration.
//!
//! All settings come from environment variables. A `.env` file in the working
//! directory is loaded first (missing file is fine), so local development can
//! keep credentials out of the shell history. Malformed numbers fall back to
//! their default with a warning instead of aborting startup.

use log::{info, warn};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Which completion API answers queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: ProviderKind,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound on the characters of document text sent with a query; 0 disables it.
    pub context_chars: usize,
    pub auto_enrich: bool,
}

impl AiConfig {
    /// The credential of the selected provider, if any.
    pub fn api_key(&self) -> Option<&str> {
        match self.provider {
            ProviderKind::Gemini => self.gemini_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub allowed_extensions: Vec<String>,
    /// Key required in `X-API-Key` for endpoints that modify state.
    pub api_key: Option<String>,
    pub open_browser: bool,
    pub ai: AiConfig,
}

/// Load `.env` if present. Returns the file that was read.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_path = get("DATABASE_PATH")
            .or_else(|| {
                get("DATABASE_URL").map(|url| {
                    url.trim_start_matches("sqlite:///")
                        .trim_start_matches("sqlite://")
                        .to_string()
                })
            })
            .unwrap_or_else(|| "pdfquery.sqlite".to_string());

        let allowed_extensions = get("ALLOWED_EXTENSIONS")
            .map(|raw| {
                raw.split(',')
                    .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| vec!["pdf".to_string()]);

        let provider = match get("AI_PROVIDER") {
            Some(raw) => ProviderKind::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown AI_PROVIDER '{}', using gemini", raw);
                ProviderKind::Gemini
            }),
            None => ProviderKind::Gemini,
        };

        let ai = AiConfig {
            provider,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash-latest".to_string()),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            timeout: Duration::from_secs(parse_or(&get, "AI_TIMEOUT_SECS", 30u64)),
            max_retries: parse_or(&get, "AI_MAX_RETRIES", 2u32),
            max_tokens: parse_or(&get, "AI_MAX_TOKENS", 500u32),
            temperature: parse_or(&get, "AI_TEMPERATURE", 0.7f32),
            context_chars: parse_or(&get, "QUERY_CONTEXT_CHARS", 4000usize),
            auto_enrich: parse_bool(&get, "AUTO_ENRICH", true),
        };

        Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&get, "PORT", 8080u16),
            database_path: PathBuf::from(database_path),
            upload_dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            allowed_extensions,
            api_key: get("API_KEY").or_else(|| get("SECRET_KEY")),
            open_browser: parse_bool(&get, "OPEN_BROWSER", false),
            ai,
        }
    }

    pub fn bind_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Print a redacted summary for the startup log.
    pub fn log_summary(&self) {
        info!("Configuration:");
        info!("  server:   {}", self.bind_url());
        info!("  database: {}", self.database_path.display());
        info!(
            "  uploads:  {} (max {} bytes, extensions: {})",
            self.upload_dir.display(),
            self.max_upload_bytes,
            self.allowed_extensions.join(",")
        );
        info!(
            "  ai:       provider={:?} key={} context_chars={} auto_enrich={}",
            self.ai.provider,
            configured(self.ai.api_key()),
            self.ai.context_chars,
            self.ai.auto_enrich
        );
        info!("  api key:  {}", configured(self.api_key.as_deref()));
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn configured(value: Option<&str>) -> &'static str {
    if value.is_some() {
        "configured"
    } else {
        "not configured"
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for {}, using default", raw, key);
            default
        }),
        None => default,
    }
}

fn parse_bool<G>(get: &G, key: &str, default: bool) -> bool
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        Some(v) => {
            warn!("Invalid boolean '{}' for {}, using default", v, key);
            default
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.allowed_extensions, vec!["pdf"]);
        assert_eq!(config.ai.provider, ProviderKind::Gemini);
        assert!(config.ai.api_key().is_none());
        assert_eq!(config.ai.context_chars, 4000);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn database_url_prefix_is_stripped() {
        let config = config_from(&[("DATABASE_URL", "sqlite:///data/docs.db")]);
        assert_eq!(config.database_path, PathBuf::from("data/docs.db"));
    }

    #[test]
    fn extensions_are_normalized() {
        let config = config_from(&[("ALLOWED_EXTENSIONS", " .PDF, pdfa ,")]);
        assert_eq!(config.allowed_extensions, vec!["pdf", "pdfa"]);
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "eighty"), ("MAX_UPLOAD_BYTES", "1024")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn selected_provider_key_is_used() {
        let config = config_from(&[
            ("AI_PROVIDER", "openai"),
            ("GEMINI_API_KEY", "g-key"),
            ("OPENAI_API_KEY", "o-key"),
        ]);
        assert_eq!(config.ai.provider, ProviderKind::OpenAi);
        assert_eq!(config.ai.api_key(), Some("o-key"));
    }

    #[test]
    fn secret_key_is_accepted_as_api_key() {
        let config = config_from(&[("SECRET_KEY", "s3cret"), ("AUTO_ENRICH", "off")]);
        assert_eq!(config.api_key.as_deref(), Some("s3cret"));
        assert!(!config.ai.auto_enrich);
    }
}
