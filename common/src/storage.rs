//! キー・バリュー形式の永続化ストレージ
//!
//! 履歴は固定キー1つにJSON文字列として丸ごと保存する。
//! 実装はメモリ上（テスト・一時セッション用）とファイル（CLI側）の2種類。

use crate::error::Result;
use std::collections::HashMap;

/// 文字列を固定キーで読み書きするストレージ
pub trait Storage {
    /// キーの値を読み込む。未保存なら `Ok(None)`
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// キーの値を丸ごと書き換える
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// メモリ上のストレージ
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期値を持つストレージを作成
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
