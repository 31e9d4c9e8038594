//! 対話セッション
//!
//! メモ入力・スタイル選択・変換・コピー・書き出し・履歴操作をメニューから行う。
//! 画面表示はコントローラーの状態を読むだけで、変更は必ずコントローラーの操作を通す。

use crate::app::{self, Controller, DialogConfirm};
use crate::clipboard::SystemClipboard;
use crate::config::Config;
use crate::error::Result;
use crate::export::write_export;
use dialoguer::{Editor, Select};
use interview_notes_common::{ConversionOutcome, Session, Template};
use std::path::PathBuf;

const PREVIEW_CHARS: usize = 200;

/// メニュー項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    EditInput,
    ChooseTemplate,
    Convert,
    Copy,
    Export,
    OpenHistory,
    DeleteHistory,
    NewEntry,
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 9] = [
        MenuAction::EditInput,
        MenuAction::ChooseTemplate,
        MenuAction::Convert,
        MenuAction::Copy,
        MenuAction::Export,
        MenuAction::OpenHistory,
        MenuAction::DeleteHistory,
        MenuAction::NewEntry,
        MenuAction::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::EditInput => "メモを入力・編集",
            MenuAction::ChooseTemplate => "整理スタイルを選択",
            MenuAction::Convert => "AIで整理する",
            MenuAction::Copy => "結果をコピー",
            MenuAction::Export => "結果をテキストで保存",
            MenuAction::OpenHistory => "履歴から開く",
            MenuAction::DeleteHistory => "履歴を削除",
            MenuAction::NewEntry => "新規作成",
            MenuAction::Quit => "終了",
        }
    }
}

/// 先頭だけを表示用に切り出す
pub fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > max_chars {
        let head: String = trimmed.chars().take(max_chars).collect();
        format!("{}…", head)
    } else {
        trimmed.to_string()
    }
}

fn render(controller: &Controller, session: &Session) {
    println!("\n==============================");
    println!("スタイル: {}", session.template.label());
    match &session.selected_id {
        Some(id) => println!("表示中の履歴: {}", id),
        None => println!("表示中の履歴: なし"),
    }
    println!("履歴: {}件", controller.history().len());

    println!("\n[メモ]");
    if session.input_text.trim().is_empty() {
        println!("（未入力）");
    } else {
        println!("{}", preview(&session.input_text, PREVIEW_CHARS));
    }

    if !session.result.is_empty() {
        println!("\n[整理結果]\n{}", session.result);
    }
    if let Some(failure) = controller.last_failure() {
        println!("\n⚠ {}", failure.message());
    }
    if controller.copy_notice_visible() {
        println!("\n✔ コピーしました");
    }
    println!("==============================");
}

/// 対話セッションを実行
pub async fn run_session(mut config: Config) -> Result<()> {
    let controller = app::build_controller(&config)?;
    app::attach_spinner(&controller);
    let mut clipboard = SystemClipboard::new();

    println!("📝 interview-notes - 対話モード");

    loop {
        let session = controller.session();
        render(&controller, &session);

        let labels: Vec<&str> = MenuAction::ALL.iter().map(|a| a.label()).collect();
        let choice = Select::new()
            .with_prompt("操作を選択")
            .items(&labels)
            .default(0)
            .interact()?;

        match MenuAction::ALL[choice] {
            MenuAction::EditInput => {
                if let Some(text) = Editor::new().extension(".txt").edit(&session.input_text)? {
                    controller.set_input_text(text);
                }
            }
            MenuAction::ChooseTemplate => {
                let names: Vec<String> = Template::ALL
                    .iter()
                    .map(|t| format!("{} ({})", t.label(), t))
                    .collect();
                let current = Template::ALL
                    .iter()
                    .position(|t| *t == session.template)
                    .unwrap_or(0);
                let index = Select::new()
                    .with_prompt("整理スタイル")
                    .items(&names)
                    .default(current)
                    .interact()?;
                controller.set_template(Template::ALL[index]);
            }
            MenuAction::Convert => match app::convert_with_retry(&controller, || {
                app::prompt_api_key(&mut config, &controller)
            })
            .await?
            {
                ConversionOutcome::Completed(log) => println!("✔ 整理完了（履歴ID: {}）", log.id),
                // 失敗メッセージは次の画面表示で出す
                ConversionOutcome::Failed(_) => {}
                ConversionOutcome::Skipped(_) => println!("メモを入力してください"),
            },
            MenuAction::Copy => match controller.copy_result(&mut clipboard) {
                Ok(true) => {}
                Ok(false) => println!("コピーする結果がありません"),
                Err(e) => println!("⚠ {}", e),
            },
            MenuAction::Export => match controller.export_result() {
                Some(file) => {
                    let path = write_export(&file, &PathBuf::from("."))?;
                    println!("✔ 保存しました: {}", path.display());
                }
                None => println!("保存する結果がありません"),
            },
            MenuAction::OpenHistory => {
                if let Some(log) = pick_history(&controller, "開く履歴")? {
                    if !controller.select_history_entry(&log) {
                        println!("変換中は履歴を開けません");
                    }
                }
            }
            MenuAction::DeleteHistory => {
                if let Some(log) = pick_history(&controller, "削除する履歴")? {
                    if controller.delete_history_entry(&log.id, &DialogConfirm) {
                        println!("✔ 削除しました");
                    }
                }
            }
            MenuAction::NewEntry => {
                controller.reset_session(&DialogConfirm);
            }
            MenuAction::Quit => break,
        }
    }

    Ok(())
}

fn pick_history(
    controller: &Controller,
    prompt: &str,
) -> Result<Option<interview_notes_common::InterviewLog>> {
    let history = controller.history();
    if history.is_empty() {
        println!("履歴がありません");
        return Ok(None);
    }
    let lines: Vec<String> = history.iter().map(app::history_line).collect();
    let index = Select::new()
        .with_prompt(prompt)
        .items(&lines)
        .default(0)
        .interact_opt()?;
    Ok(index.map(|i| history[i].clone()))
}
