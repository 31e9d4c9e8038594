//! テキスト整理サービスのインターフェース
//!
//! 面談メモとテンプレートを受け取り、整理済みの報告書テキストを返す外部サービス。
//! 失敗は認証エラーとそれ以外に構造的に分類して返す。

use crate::types::Template;
use async_trait::async_trait;
use thiserror::Error;

/// 整理サービスの失敗
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrganizeError {
    /// APIキーが未設定または無効
    #[error("APIキーが無効です。設定し直してください")]
    InvalidCredential,

    /// 通信エラー・サービス側のエラー
    #[error("{}", .0.as_deref().unwrap_or("サービスを利用できません"))]
    Unavailable(Option<String>),
}

impl OrganizeError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        OrganizeError::Unavailable(Some(message.into()))
    }

    pub fn is_credential(&self) -> bool {
        matches!(self, OrganizeError::InvalidCredential)
    }
}

/// テキスト整理サービス
#[async_trait]
pub trait TextOrganizer: Send + Sync {
    async fn organize(&self, text: &str, template: Template) -> Result<String, OrganizeError>;
}
