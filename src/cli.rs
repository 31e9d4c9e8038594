use clap::{Parser, Subcommand};
use interview_notes_common::Template;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "interview-notes")]
#[command(about = "面談メモAI整理・報告書作成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力（-v: info, -vv: debug, -vvv: trace）
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 面談メモを整理して報告書を出力
    Convert {
        /// 面談メモのテキストファイル（省略時または "-" で標準入力）
        input: Option<PathBuf>,

        /// 整理スタイル (professional/hr/counseling/casual)
        #[arg(short, long)]
        template: Option<Template>,

        /// 結果をクリップボードにコピー
        #[arg(short, long)]
        copy: bool,

        /// 結果をテキストファイルに書き出す（ディレクトリまたはファイルパス）
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// 変換履歴を管理
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// 対話モードで入力・変換・履歴操作を行う
    Session,

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 使用するGeminiモデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// 既定の整理スタイルを設定
        #[arg(long)]
        set_template: Option<Template>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// 履歴を一覧表示（新しい順）
    List,

    /// 履歴の内容を表示
    Show {
        /// 履歴ID
        id: String,
    },

    /// 履歴を削除
    Delete {
        /// 履歴ID
        id: String,

        /// 確認せずに削除
        #[arg(short, long)]
        yes: bool,
    },

    /// 履歴の整理結果をテキストファイルに書き出す
    Export {
        /// 履歴ID
        id: String,

        /// 出力先（省略時はカレントディレクトリ）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
