use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Result};

/// Full application configuration.
/// Values come from the process environment first, then `.env`.
#[derive(Debug, Clone)]
pub struct Config {
    /// "openai" (default) or "ollama".
    pub backend: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub ollama_url: String,
    pub model: String,
    pub temperature: f32,
    pub agent_timeout_s: u64,

    // Retrieval
    /// Base URL of the document search service. Empty = no index.
    pub document_index_url: String,
    pub search_top_k: usize,

    // Web
    pub web_bind: String,
    pub web_port: u16,
    pub static_dir: String,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "openai".into(),
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".into(),
            ollama_url: "http://localhost:11434".into(),
            model: "gpt-4".into(),
            temperature: 0.1,
            agent_timeout_s: 300,
            document_index_url: String::new(),
            search_top_k: 5,
            web_bind: "0.0.0.0".into(),
            web_port: 8000,
            static_dir: "static".into(),
            log_json: false,
        }
    }
}

pub fn parse_dotenv(path: impl AsRef<Path>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(path) else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim();
            let v = v
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(v);
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_bool(key: &str, dotenv: &HashMap<String, String>, default: bool) -> bool {
    match get(key, dotenv).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        Some(_) => default,
        None => default,
    }
}

fn get_parsed<T: std::str::FromStr>(key: &str, dotenv: &HashMap<String, String>, default: T) -> T {
    get(key, dotenv)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from the environment and `./.env`. Fails when the selected
    /// backend needs a credential that is not set.
    pub fn from_env() -> Result<Self> {
        Self::from_sources(&parse_dotenv(".env"))
    }

    pub fn from_sources(dotenv: &HashMap<String, String>) -> Result<Self> {
        let d = Config::default();
        let config = Config {
            backend: get_str("BACKEND", dotenv, &d.backend).to_lowercase(),
            openai_api_key: get_str("OPENAI_API_KEY", dotenv, "").trim().to_string(),
            openai_base_url: get_str("OPENAI_BASE_URL", dotenv, &d.openai_base_url),
            ollama_url: get_str("OLLAMA_URL", dotenv, &d.ollama_url),
            model: get_str("MODEL", dotenv, &d.model),
            temperature: get_parsed("TEMPERATURE", dotenv, d.temperature),
            agent_timeout_s: get_parsed("AGENT_TIMEOUT_S", dotenv, d.agent_timeout_s),
            document_index_url: get_str("DOCUMENT_INDEX_URL", dotenv, ""),
            search_top_k: get_parsed("SEARCH_TOP_K", dotenv, d.search_top_k),
            web_bind: get_str("WEB_BIND", dotenv, &d.web_bind),
            web_port: get_parsed("PORT", dotenv, d.web_port),
            static_dir: get_str("STATIC_DIR", dotenv, &d.static_dir),
            log_json: get_bool("LOG_JSON", dotenv, d.log_json),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend.as_str() {
            "openai" => {
                if self.openai_api_key.is_empty() {
                    bail!("OPENAI_API_KEY environment variable is required");
                }
            },
            "ollama" => {},
            other => bail!("unknown BACKEND '{other}' (expected 'openai' or 'ollama')"),
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!("TEMPERATURE must be between 0.0 and 2.0, got {}", self.temperature);
        }
        Ok(())
    }

    pub fn has_credential(&self) -> bool {
        !self.openai_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_dotenv_skips_comments_and_quotes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "# comment\n\nexport MODEL=\"gpt-4o\"\nPORT = 9000\nnot a pair").unwrap();
        let map = parse_dotenv(tmp.path());
        assert_eq!(map.get("MODEL").map(String::as_str), Some("gpt-4o"));
        assert_eq!(map.get("PORT").map(String::as_str), Some("9000"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn parse_dotenv_missing_file_is_empty() {
        assert!(parse_dotenv("/nonexistent/.env").is_empty());
    }

    #[test]
    fn get_parsed_falls_back_on_garbage() {
        let mut map = HashMap::new();
        map.insert("BAURAT_TEST_TOP_K".to_string(), "many".to_string());
        assert_eq!(get_parsed("BAURAT_TEST_TOP_K", &map, 5usize), 5);
        map.insert("BAURAT_TEST_TOP_K".to_string(), " 7 ".to_string());
        assert_eq!(get_parsed("BAURAT_TEST_TOP_K", &map, 5usize), 7);
    }

    #[test]
    fn get_bool_accepts_numeric_flags() {
        let mut map = HashMap::new();
        map.insert("BAURAT_TEST_FLAG".to_string(), "1".to_string());
        assert!(get_bool("BAURAT_TEST_FLAG", &map, false));
        map.insert("BAURAT_TEST_FLAG".to_string(), "maybe".to_string());
        assert!(!get_bool("BAURAT_TEST_FLAG", &map, false));
    }

    #[test]
    fn openai_backend_requires_key() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn ollama_backend_needs_no_key() {
        let config = Config {
            backend: "ollama".into(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.has_credential());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let config = Config {
            backend: "carrier-pigeon".into(),
            openai_api_key: "sk-test".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let config = Config {
            openai_api_key: "sk-test".into(),
            temperature: 3.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
