use std::{
    env, fs,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::errors::ExpenseError;
use crate::utils::{config_file, ensure_dir};

const TMP_SUFFIX: &str = "tmp";

const DEFAULT_QUOTE_BASE_URL: &str = "https://finnhub.io/api/v1";
const DEFAULT_ADVICE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// User preferences persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub currency_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_user: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".into(),
            theme: None,
            last_user: None,
        }
    }
}

/// Loads and saves the preferences file with atomic replace semantics.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ExpenseError> {
        Self::at_path(config_file())
    }

    pub fn at_path(path: PathBuf) -> Result<Self, ExpenseError> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        Ok(Self { path })
    }

    pub fn load(&self) -> Result<Config, ExpenseError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ExpenseError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Settings for the API proxy binary, read from the environment.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub quote_api_key: Option<String>,
    pub advice_api_key: Option<String>,
    pub quote_base_url: String,
    pub advice_base_url: String,
    pub bind_addr: String,
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self {
            quote_api_key: env::var("FINNHUB_API_KEY").ok(),
            advice_api_key: env::var("GEMINI_API_KEY").ok(),
            quote_base_url: env::var("QUOTE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_QUOTE_BASE_URL.into()),
            advice_base_url: env::var("ADVICE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ADVICE_BASE_URL.into()),
            bind_addr: env::var("PROXY_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            quote_api_key: None,
            advice_api_key: None,
            quote_base_url: DEFAULT_QUOTE_BASE_URL.into(),
            advice_base_url: DEFAULT_ADVICE_BASE_URL.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_in_temp_dir() -> (ConfigManager, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let manager =
            ConfigManager::at_path(temp.path().join("config.json")).expect("config manager");
        (manager, temp)
    }

    #[test]
    fn missing_file_loads_defaults() {
        let (manager, _guard) = manager_in_temp_dir();
        let config = manager.load().expect("load defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (manager, _guard) = manager_in_temp_dir();
        let config = Config {
            currency_symbol: "$".into(),
            theme: Some("dark".into()),
            last_user: Some("alice".into()),
        };
        manager.save(&config).expect("save config");
        let loaded = manager.load().expect("load config");
        assert_eq!(loaded, config);
    }
}
