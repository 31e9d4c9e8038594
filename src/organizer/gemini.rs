//! Gemini API連携
//!
//! 面談メモをテンプレート別のシステム指示と一緒に送信し、整理済みテキストを受け取る。
//! エラーレスポンスは本文の `error.details[].reason` / `error.status` から
//! 認証エラーとそれ以外に分類する。

use async_trait::async_trait;
use interview_notes_common::{
    build_system_instruction, build_user_prompt, strip_emphasis, OrganizeError, Template,
    TextOrganizer,
};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 認証エラーとして扱う `ErrorInfo.reason`
const CREDENTIAL_REASONS: &[&str] = &["API_KEY_INVALID", "API_KEY_EXPIRED", "API_KEY_MISSING"];

/// 認証エラーとして扱う `error.status`
const CREDENTIAL_STATUSES: &[&str] = &["UNAUTHENTICATED", "PERMISSION_DENIED"];

/// Gemini APIリクエスト
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// エラーレスポンス `{"error": {...}}`
#[derive(Deserialize, Default)]
#[serde(default)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ApiErrorBody {
    message: String,
    status: String,
    details: Vec<ApiErrorDetail>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ApiErrorDetail {
    reason: Option<String>,
}

/// Gemini APIによるテキスト整理
pub struct GeminiOrganizer {
    client: reqwest::Client,
    api_key: RwLock<Option<String>>,
    model: String,
}

impl GeminiOrganizer {
    pub fn new(api_key: Option<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "HTTPクライアントの設定に失敗したため既定値を使います");
                reqwest::Client::new()
            });
        Self {
            client,
            api_key: RwLock::new(api_key.filter(|k| !k.trim().is_empty())),
            model: model.into(),
        }
    }

    /// APIキーを差し替える（認証エラー後の再入力用）
    pub fn set_api_key(&self, api_key: Option<String>) {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        match self.api_key.write() {
            Ok(mut guard) => *guard = api_key,
            Err(poisoned) => *poisoned.into_inner() = api_key,
        }
    }

    fn current_api_key(&self) -> Option<String> {
        match self.api_key.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.model)
    }
}

fn build_request(text: &str, template: Template) -> GeminiRequest {
    GeminiRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: build_system_instruction(template),
            }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: build_user_prompt(text),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: 0.3,
            response_mime_type: "text/plain".to_string(),
        },
    }
}

/// エラーレスポンスを分類
pub fn classify_error(status: u16, body: &str) -> OrganizeError {
    let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let error = envelope.error;

    let credential_reason = error
        .details
        .iter()
        .filter_map(|d| d.reason.as_deref())
        .any(|reason| CREDENTIAL_REASONS.contains(&reason));
    let credential_status = CREDENTIAL_STATUSES.contains(&error.status.as_str());

    if status == 401 || status == 403 || credential_reason || credential_status {
        return OrganizeError::InvalidCredential;
    }

    let message = error.message.trim();
    if message.is_empty() {
        OrganizeError::unavailable(format!("API error: {}", status))
    } else {
        OrganizeError::unavailable(format!("API error {}: {}", status, message))
    }
}

/// 成功レスポンスから本文を取り出す
pub fn extract_text(body: &str) -> Result<String, OrganizeError> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| OrganizeError::unavailable(format!("APIレスポンスのパースに失敗: {}", e)))?;

    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(strip_emphasis(&text));
    }

    match response.prompt_feedback.and_then(|f| f.block_reason) {
        Some(reason) => Err(OrganizeError::unavailable(format!(
            "AIが応答を拒否しました（理由: {}）",
            reason
        ))),
        None => Err(OrganizeError::unavailable("AIから空の応答が返されました")),
    }
}

#[async_trait]
impl TextOrganizer for GeminiOrganizer {
    async fn organize(&self, text: &str, template: Template) -> Result<String, OrganizeError> {
        let Some(api_key) = self.current_api_key() else {
            return Err(OrganizeError::InvalidCredential);
        };

        let request = build_request(text, template);
        debug!(model = %self.model, template = %template, chars = text.chars().count(), "Gemini APIを呼び出します");

        // キーはURLに載せずヘッダーで渡す
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| OrganizeError::unavailable(format!("通信エラー: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OrganizeError::unavailable(format!("レスポンス受信エラー: {}", e.without_url())))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Gemini APIがエラーを返しました");
            return Err(classify_error(status.as_u16(), &body));
        }

        debug!(bytes = body.len(), "Gemini APIの応答を受信しました");
        extract_text(&body)
    }
}
