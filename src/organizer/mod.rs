mod gemini;

pub use gemini::{classify_error, extract_text, GeminiOrganizer};

use crate::config::Config;
use std::time::Duration;

/// 設定からGeminiクライアントを作成
///
/// APIキーが未設定でも作成できる。その場合は変換時に認証エラーとなる。
pub fn from_config(config: &Config) -> GeminiOrganizer {
    GeminiOrganizer::new(
        config.get_api_key().ok(),
        config.model.clone(),
        Duration::from_secs(config.timeout_seconds),
    )
}
