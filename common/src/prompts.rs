//! プロンプト生成モジュール
//!
//! テンプレートごとのシステム指示と、AI出力の書式補正:
//! - build_system_instruction: テンプレート別の指示文
//! - build_user_prompt: 面談メモ本文を包むユーザープロンプト
//! - strip_emphasis: 出力に残った強調記法の除去

use crate::types::Template;
use regex::Regex;

/// 全テンプレート共通の出力ルール
const OUTPUT_RULES: &str = r#"## 出力ルール
- 日本語で出力する
- 太字（**）や下線（__）などの強調記法は使わない
- 見出しに # を使わない
- 構造化は「-」の箇条書きと「1.」などの番号のみで行う
- メモに書かれていない事実を補わない
- 前置きや締めの挨拶は不要。報告書本文のみ出力"#;

/// テンプレート別の役割と構成
fn template_guidance(template: Template) -> &'static str {
    match template {
        Template::Professional => {
            r#"あなたは経験豊富なビジネス文書の編集者です。面談・会議のメモを、社内で共有できる簡潔な報告書に整理してください。

## 構成
1. 概要（2〜3行）
2. 主な議題と内容
3. 決定事項
4. 今後のアクション（担当・期限が分かれば併記）"#
        }
        Template::Hr => {
            r#"あなたは人事担当者です。人事面談のメモを、人事記録として保管できる形式に整理してください。

## 構成
1. 面談の目的
2. 本人の発言・要望
3. 面談者の所見
4. フォローアップ事項
本人の評価に関わる推測は書かず、発言と事実を分けて記載すること。"#
        }
        Template::Counseling => {
            r#"あなたは臨床経験のあるカウンセラーです。カウンセリングのメモを、継続支援のための記録に整理してください。

## 構成
1. 主訴
2. 相談内容の経過
3. クライアントの様子（表情・語り口など記載がある場合のみ）
4. 次回に向けた方針
断定的な診断表現は避け、共感的で中立な言葉を選ぶこと。"#
        }
        Template::Casual => {
            r#"あなたは気配りのできるアシスタントです。雑談やラフなミーティングのメモを、後で読み返しやすい簡単なまとめにしてください。

## 構成
- 話したこと
- 気になったこと
- やること
堅すぎない自然な文体で書くこと。"#
        }
    }
}

/// システム指示を生成
///
/// # Arguments
/// * `template` - 整形スタイル
///
/// # Returns
/// テンプレート別の役割・構成と共通出力ルールを連結した指示文
pub fn build_system_instruction(template: Template) -> String {
    format!("{}\n\n{}", template_guidance(template), OUTPUT_RULES)
}

/// ユーザープロンプトを生成
pub fn build_user_prompt(notes: &str) -> String {
    format!("以下の面談メモを整理してください。\n\n---\n{}\n---", notes.trim())
}

/// 強調記法を除去
///
/// AIが出力ルールを守らなかった場合の補正。`**太字**` の記号と
/// 行頭の `#` 見出し記号を取り除き、本文はそのまま残す。
/// `__` は除去しない（`__init__` などの識別子）。
pub fn strip_emphasis(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref BOLD_RE: Regex = Regex::new(r"\*\*(.+?)\*\*").unwrap();
        static ref HEADING_RE: Regex = Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").unwrap();
    }

    let text = BOLD_RE.replace_all(text, "$1");
    let text = HEADING_RE.replace_all(&text, "");
    text.replace("**", "").trim().to_string()
}
