//! CLIとセッションで共通の組み立て・表示処理

use crate::config::Config;
use crate::error::{InterviewError, Result};
use crate::organizer::{self, GeminiOrganizer};
use crate::storage::FileStorage;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use interview_notes_common::{
    Confirm, ConversionController, ConversionFailure, ConversionOutcome, ConversionStatus,
    InterviewLog, SkipReason, Storage, TextOrganizer,
};
use std::cell::RefCell;
use std::io::{IsTerminal, Read};
use std::path::Path;
use std::time::Duration;

pub type Controller = ConversionController<GeminiOrganizer, FileStorage>;

/// 設定からコントローラーを組み立てる（履歴はここで読み込まれる）
pub fn build_controller(config: &Config) -> Result<Controller> {
    let storage = FileStorage::new(config.history_dir()?);
    tracing::debug!(dir = %storage.dir().display(), "履歴ディレクトリ");
    let controller = ConversionController::new(organizer::from_config(config), storage);
    controller.set_template(config.default_template);
    Ok(controller)
}

/// 面談メモを読み込む。パス省略時または "-" は標準入力
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => Ok(std::fs::read_to_string(p)?),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// dialoguerで確認する
pub struct DialogConfirm;

impl Confirm for DialogConfirm {
    fn confirm(&self, message: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// 確認なしで常に承認する（`--yes`）
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// 変換中はスピナーを表示する
pub fn attach_spinner(controller: &Controller) {
    let spinner: RefCell<Option<ProgressBar>> = RefCell::new(None);
    controller.set_status_observer(move |status| match status {
        ConversionStatus::Processing => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("AIで整理中...");
            pb.enable_steady_tick(Duration::from_millis(100));
            *spinner.borrow_mut() = Some(pb);
        }
        ConversionStatus::Idle => {
            if let Some(pb) = spinner.borrow_mut().take() {
                pb.finish_and_clear();
            }
        }
    });
}

/// 現在の入力を変換する
///
/// 認証エラーで `reenter_key` が新しいキーを設定した場合は一度だけ再変換する。
pub async fn convert_with_retry<O: TextOrganizer, S: Storage>(
    controller: &ConversionController<O, S>,
    reenter_key: impl FnOnce() -> Result<bool>,
) -> Result<ConversionOutcome> {
    let outcome = controller.convert_current().await;
    if let ConversionOutcome::Failed(failure) = &outcome {
        if failure.is_credential() && reenter_key()? {
            tracing::info!("新しいAPIキーで再変換します");
            return Ok(controller.convert_current().await);
        }
    }
    Ok(outcome)
}

/// 変換結果を表示し、失敗なら対応するエラーを返す
pub fn report_outcome(outcome: &ConversionOutcome) -> Result<()> {
    match outcome {
        ConversionOutcome::Completed(log) => {
            println!("✔ 整理完了（履歴ID: {}）\n", log.id);
            println!("{}", log.organized_text);
            Ok(())
        }
        ConversionOutcome::Skipped(SkipReason::EmptyInput) => Err(InterviewError::EmptyInput),
        ConversionOutcome::Skipped(SkipReason::Busy) => {
            println!("変換中です。完了までお待ちください");
            Ok(())
        }
        ConversionOutcome::Failed(ConversionFailure::InvalidCredential { .. }) => {
            Err(InterviewError::MissingApiKey)
        }
        ConversionOutcome::Failed(ConversionFailure::Service { message }) => {
            Err(InterviewError::ApiCall(message.clone()))
        }
    }
}

/// 認証エラー後にAPIキーを再入力してもらう
///
/// 端末でない場合は何もしない。入力されたキーは設定に保存し、クライアントにも反映する。
pub fn prompt_api_key(config: &mut Config, controller: &Controller) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }
    println!("⚠ APIキーが無効または未設定です。");
    let key = Password::new()
        .with_prompt("Gemini APIキー（空欄でスキップ）")
        .allow_empty_password(true)
        .interact()?;
    if key.trim().is_empty() {
        return Ok(false);
    }
    config.set_api_key(key)?;
    controller.organizer().set_api_key(config.api_key.clone());
    println!("✔ APIキーを保存しました");
    Ok(true)
}

/// 履歴一覧の1行
pub fn history_line(log: &InterviewLog) -> String {
    format!("{}  {}  [{}]  {}", log.id, log.date, log.template.label(), log.title)
}

/// 履歴の内容を表示
pub fn print_log(log: &InterviewLog) {
    println!("ID: {}", log.id);
    println!("日時: {}", log.date);
    println!("スタイル: {} ({})", log.template.label(), log.template);
    println!("タイトル: {}", log.title);
    println!("\n--- 元のメモ ---\n{}", log.original_text);
    println!("\n--- 整理結果 ---\n{}", log.organized_text);
}
