use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterviewError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`interview-notes config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] interview_notes_common::Error),

    #[error("入力が空です。面談メモを入力してください")]
    EmptyInput,

    #[error("履歴が見つかりません: {0}")]
    HistoryNotFound(String),

    #[error("クリップボードエラー: {0}")]
    Clipboard(String),

    #[error("入力ダイアログエラー: {0}")]
    Dialog(String),
}

impl From<dialoguer::Error> for InterviewError {
    fn from(err: dialoguer::Error) -> Self {
        InterviewError::Dialog(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InterviewError>;
