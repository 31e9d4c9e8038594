use crate::error::{InterviewError, Result};
use interview_notes_common::Template;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// APIキーを上書きする環境変数
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    pub default_template: Template,
    /// 履歴の保存先（省略時はデータディレクトリ）
    pub history_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".into(),
            timeout_seconds: 120,
            default_template: Template::Professional,
            history_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| InterviewError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("interview-notes").join("config.json"))
    }

    /// 履歴の保存先ディレクトリ
    pub fn history_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.history_dir {
            return Ok(dir.clone());
        }
        let data = dirs::data_local_dir()
            .ok_or_else(|| InterviewError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("interview-notes"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(InterviewError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key.trim().to_string());
        self.save()
    }
}
