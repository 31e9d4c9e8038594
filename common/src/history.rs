//! 変換履歴モジュール
//!
//! 新しい順に最大20件の変換記録を保持し、変更のたびに
//! ストレージの固定キーへ全件を書き戻す。

use crate::storage::Storage;
use crate::types::InterviewLog;
use tracing::{debug, warn};

/// 履歴を保存するストレージキー
pub const HISTORY_KEY: &str = "interview_logs";

/// 保持する最大件数
pub const MAX_HISTORY: usize = 20;

/// 変換履歴
///
/// メモリ上の一覧がセッション中の正とし、保存失敗はログに残して続行する。
#[derive(Debug)]
pub struct HistoryStore<S: Storage> {
    storage: S,
    logs: Vec<InterviewLog>,
}

impl<S: Storage> HistoryStore<S> {
    /// ストレージを開いて履歴を読み込む
    pub fn open(storage: S) -> Self {
        let mut store = Self {
            storage,
            logs: Vec::new(),
        };
        store.load();
        store
    }

    /// ストレージから履歴を読み込み直す
    ///
    /// 未保存・読込失敗・JSON破損はいずれも空の履歴として扱う。
    pub fn load(&mut self) -> &[InterviewLog] {
        self.logs = match self.storage.read(HISTORY_KEY) {
            Ok(Some(content)) => match serde_json::from_str::<Vec<InterviewLog>>(&content) {
                Ok(mut logs) => {
                    logs.truncate(MAX_HISTORY);
                    debug!(count = logs.len(), "履歴を読み込みました");
                    logs
                }
                Err(e) => {
                    warn!(error = %e, "履歴データが破損しています。空の履歴で開始します");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "履歴の読み込みに失敗しました。空の履歴で開始します");
                Vec::new()
            }
        };
        &self.logs
    }

    /// 先頭に追加して上限を超えた古い記録を捨てる
    pub fn append(&mut self, log: InterviewLog) -> &[InterviewLog] {
        self.logs.insert(0, log);
        self.logs.truncate(MAX_HISTORY);
        self.persist();
        &self.logs
    }

    /// IDが一致する記録を削除（存在しなければ何もしない）
    pub fn remove(&mut self, id: &str) -> &[InterviewLog] {
        let before = self.logs.len();
        self.logs.retain(|log| log.id != id);
        if self.logs.len() == before {
            debug!(id, "削除対象の履歴がありません");
        }
        self.persist();
        &self.logs
    }

    pub fn logs(&self) -> &[InterviewLog] {
        &self.logs
    }

    pub fn find(&self, id: &str) -> Option<&InterviewLog> {
        self.logs.iter().find(|log| log.id == id)
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        let content = match serde_json::to_string(&self.logs) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "履歴のシリアライズに失敗しました");
                return;
            }
        };
        if let Err(e) = self.storage.write(HISTORY_KEY, &content) {
            warn!(error = %e, "履歴の保存に失敗しました");
        }
    }
}
