//! 面談記録の型定義
//!
//! CLIと対話セッションで共有される型:
//! - Template: 整形スタイル（AIへ渡す指示セットの選択）
//! - InterviewLog: 履歴に保存される変換記録

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// タイトルに使う入力の先頭文字数
pub const TITLE_MAX_CHARS: usize = 25;

/// タイトル省略時の末尾マーカー
pub const TITLE_ELLIPSIS: &str = "...";

/// 記録日時の表示形式
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M";

/// 整形スタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// ビジネス報告書
    #[default]
    Professional,
    /// 人事面談
    Hr,
    /// カウンセリング記録
    Counseling,
    /// カジュアルなメモ
    Casual,
}

impl Template {
    pub const ALL: [Template; 4] = [
        Template::Professional,
        Template::Hr,
        Template::Counseling,
        Template::Casual,
    ];

    /// 保存・CLI引数で使う識別子
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Professional => "professional",
            Template::Hr => "hr",
            Template::Counseling => "counseling",
            Template::Casual => "casual",
        }
    }

    /// 表示名
    pub fn label(&self) -> &'static str {
        match self {
            Template::Professional => "ビジネス報告",
            Template::Hr => "人事面談",
            Template::Counseling => "カウンセリング",
            Template::Casual => "カジュアル",
        }
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Template::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| {
                let names = Template::ALL.map(|t| t.as_str()).join(", ");
                format!("Unknown template: {}. Use {}", s, names)
            })
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 変換記録（履歴の1件）
///
/// 作成後は変更しない。削除は1件単位で丸ごと行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewLog {
    pub id: String,
    pub title: String,
    pub date: String,
    pub original_text: String,
    pub organized_text: String,
    #[serde(default)]
    pub template: Template,
}

impl InterviewLog {
    /// 変換結果から新しい記録を作成
    ///
    /// タイトルと日付は `original_text` と `now` から導出する。
    pub fn new(
        id: impl Into<String>,
        original_text: impl Into<String>,
        organized_text: impl Into<String>,
        template: Template,
        now: DateTime<Local>,
    ) -> Self {
        let original_text = original_text.into();
        Self {
            id: id.into(),
            title: derive_title(&original_text),
            date: now.format(DATE_FORMAT).to_string(),
            original_text,
            organized_text: organized_text.into(),
            template,
        }
    }
}

/// 入力テキストからタイトルを生成
///
/// 入力が25文字を超える場合は先頭25文字をトリムして `...` を付ける。
pub fn derive_title(input: &str) -> String {
    if input.chars().count() > TITLE_MAX_CHARS {
        let head: String = input.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}{}", head.trim(), TITLE_ELLIPSIS)
    } else {
        input.trim().to_string()
    }
}
