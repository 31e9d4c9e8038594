//! 変換コントローラー
//!
//! 入力・テンプレート選択・処理状態・表示中の結果を保持し、
//! テキスト整理サービスの呼び出しと履歴への書き込みを仲介する。
//!
//! 状態遷移: `Idle` → `Processing` → `Idle`（成功・失敗どちらでも戻る）
//!
//! 単一スレッドの協調的な実行を前提に、操作はすべて `&self` で受ける。
//! 変換中に別の変換を開始しようとしても何もしない（キューには積まない）。

use crate::error::Result;
use crate::history::HistoryStore;
use crate::organizer::{OrganizeError, TextOrganizer};
use crate::storage::Storage;
use crate::types::{InterviewLog, Template};
use chrono::{Local, NaiveDate};
use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// コピー完了通知の表示時間
pub const COPY_NOTICE_DURATION: Duration = Duration::from_secs(2);

/// エクスポートファイル名の接頭辞
pub const EXPORT_FILE_PREFIX: &str = "面談記録";

/// 失敗にメッセージがない場合の表示文言
pub const FALLBACK_ERROR_MESSAGE: &str = "変換中にエラーが発生しました。";

const DELETE_CONFIRM_MESSAGE: &str = "この記録を削除しますか？";
const RESET_CONFIRM_MESSAGE: &str = "入力内容と結果をクリアして新規作成しますか？";

/// 処理状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionStatus {
    #[default]
    Idle,
    Processing,
}

/// セッション状態（永続化しない）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub input_text: String,
    pub template: Template,
    pub result: String,
    pub selected_id: Option<String>,
}

impl Session {
    /// 入力または結果が表示されているか
    pub fn has_content(&self) -> bool {
        !self.input_text.trim().is_empty() || !self.result.trim().is_empty()
    }
}

/// 変換を開始しなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 入力が空または空白のみ
    EmptyInput,
    /// 別の変換が処理中
    Busy,
}

/// 変換失敗（ユーザーに表示するメッセージ付き）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionFailure {
    /// 認証エラー。ホスト側でAPIキーの再入力を促す
    InvalidCredential { message: String },
    /// それ以外のサービスエラー
    Service { message: String },
}

impl ConversionFailure {
    fn from_error(err: &OrganizeError) -> Self {
        match err {
            OrganizeError::InvalidCredential => ConversionFailure::InvalidCredential {
                message: err.to_string(),
            },
            OrganizeError::Unavailable(message) => {
                let message = message
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(FALLBACK_ERROR_MESSAGE)
                    .to_string();
                ConversionFailure::Service { message }
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ConversionFailure::InvalidCredential { message }
            | ConversionFailure::Service { message } => message,
        }
    }

    pub fn is_credential(&self) -> bool {
        matches!(self, ConversionFailure::InvalidCredential { .. })
    }
}

/// `start_conversion` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Skipped(SkipReason),
    Completed(InterviewLog),
    Failed(ConversionFailure),
}

/// 破壊的操作の確認
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// クリップボード（書き込みのみ）
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// ダウンロード用のテキストファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// 日付からエクスポートファイル名を生成
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}_{}.txt", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

type StatusObserver = Box<dyn Fn(ConversionStatus)>;

/// 処理中フラグを保持し、スコープを抜けたら `Idle` に戻す
struct ProcessingGuard<'a> {
    status: &'a Cell<ConversionStatus>,
    observer: &'a RefCell<Option<StatusObserver>>,
}

impl<'a> ProcessingGuard<'a> {
    fn enter(
        status: &'a Cell<ConversionStatus>,
        observer: &'a RefCell<Option<StatusObserver>>,
    ) -> Self {
        let guard = Self { status, observer };
        guard.set(ConversionStatus::Processing);
        guard
    }

    fn set(&self, status: ConversionStatus) {
        self.status.set(status);
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(status);
        }
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.set(ConversionStatus::Idle);
    }
}

/// 変換コントローラー
pub struct ConversionController<O: TextOrganizer, S: Storage> {
    organizer: O,
    history: RefCell<HistoryStore<S>>,
    session: RefCell<Session>,
    status: Cell<ConversionStatus>,
    last_failure: RefCell<Option<ConversionFailure>>,
    copied_at: Cell<Option<Instant>>,
    last_id: Cell<i64>,
    status_observer: RefCell<Option<StatusObserver>>,
}

impl<O: TextOrganizer, S: Storage> ConversionController<O, S> {
    /// 履歴をストレージから読み込んでコントローラーを作成
    pub fn new(organizer: O, storage: S) -> Self {
        let history = HistoryStore::open(storage);
        let last_id = history
            .logs()
            .iter()
            .filter_map(|log| log.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            organizer,
            history: RefCell::new(history),
            session: RefCell::new(Session::default()),
            status: Cell::new(ConversionStatus::Idle),
            last_failure: RefCell::new(None),
            copied_at: Cell::new(None),
            last_id: Cell::new(last_id),
            status_observer: RefCell::new(None),
        }
    }

    /// 処理状態の変化を受け取るオブザーバーを登録
    pub fn set_status_observer(&self, observer: impl Fn(ConversionStatus) + 'static) {
        *self.status_observer.borrow_mut() = Some(Box::new(observer));
    }

    pub fn organizer(&self) -> &O {
        &self.organizer
    }

    pub fn status(&self) -> ConversionStatus {
        self.status.get()
    }

    pub fn is_processing(&self) -> bool {
        self.status.get() == ConversionStatus::Processing
    }

    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn history(&self) -> Vec<InterviewLog> {
        self.history.borrow().logs().to_vec()
    }

    pub fn find_history_entry(&self, id: &str) -> Option<InterviewLog> {
        self.history.borrow().find(id).cloned()
    }

    /// 直前の変換失敗（成功すると消える）
    pub fn last_failure(&self) -> Option<ConversionFailure> {
        self.last_failure.borrow().clone()
    }

    /// 入力を更新（変換中でも編集できる）
    pub fn set_input_text(&self, text: impl Into<String>) {
        self.session.borrow_mut().input_text = text.into();
    }

    pub fn set_template(&self, template: Template) {
        self.session.borrow_mut().template = template;
    }

    /// 現在の入力とテンプレートで変換を開始
    pub async fn convert_current(&self) -> ConversionOutcome {
        let (input, template) = {
            let session = self.session.borrow();
            (session.input_text.clone(), session.template)
        };
        self.start_conversion(&input, template).await
    }

    /// 変換を開始
    ///
    /// 空入力・変換中は何もしない。成功時は結果を表示して履歴の先頭に追加し、
    /// 失敗時は表示中の結果と選択を変えずにメッセージを返す。
    pub async fn start_conversion(&self, input_text: &str, template: Template) -> ConversionOutcome {
        if input_text.trim().is_empty() {
            debug!("入力が空のため変換しません");
            return ConversionOutcome::Skipped(SkipReason::EmptyInput);
        }
        if self.is_processing() {
            debug!("変換中のため新しい変換は開始しません");
            return ConversionOutcome::Skipped(SkipReason::Busy);
        }

        let _guard = ProcessingGuard::enter(&self.status, &self.status_observer);
        info!(template = %template, chars = input_text.chars().count(), "変換を開始します");

        match self.organizer.organize(input_text, template).await {
            Ok(organized) => {
                let now = Local::now();
                let log = InterviewLog::new(
                    self.next_id(now.timestamp_millis()),
                    input_text,
                    organized.clone(),
                    template,
                    now,
                );
                self.history.borrow_mut().append(log.clone());
                {
                    let mut session = self.session.borrow_mut();
                    session.result = organized;
                    session.selected_id = Some(log.id.clone());
                }
                *self.last_failure.borrow_mut() = None;
                info!(id = %log.id, "変換が完了しました");
                ConversionOutcome::Completed(log)
            }
            Err(err) => {
                let failure = ConversionFailure::from_error(&err);
                warn!(credential = failure.is_credential(), error = %err, "変換に失敗しました");
                *self.last_failure.borrow_mut() = Some(failure.clone());
                ConversionOutcome::Failed(failure)
            }
        }
    }

    /// 履歴の記録をセッションに読み込む（変換中は不可）
    pub fn select_history_entry(&self, log: &InterviewLog) -> bool {
        if self.is_processing() {
            debug!(id = %log.id, "変換中のため履歴を選択できません");
            return false;
        }
        let mut session = self.session.borrow_mut();
        session.input_text = log.original_text.clone();
        session.result = log.organized_text.clone();
        session.template = log.template;
        session.selected_id = Some(log.id.clone());
        *self.last_failure.borrow_mut() = None;
        true
    }

    /// 確認のうえ履歴の記録を削除
    ///
    /// 選択中の記録を削除した場合はセッションを新規状態に戻す。
    pub fn delete_history_entry(&self, id: &str, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm(DELETE_CONFIRM_MESSAGE) {
            return false;
        }
        self.history.borrow_mut().remove(id);

        let was_selected = self.session.borrow().selected_id.as_deref() == Some(id);
        if was_selected {
            self.clear_session();
        }
        info!(id, "履歴を削除しました");
        true
    }

    /// 新規作成（入力・結果・選択をクリアしテンプレートを既定に戻す）
    ///
    /// 内容が表示されている場合は確認し、拒否されたら何もしない。
    pub fn reset_session(&self, confirm: &dyn Confirm) -> bool {
        if self.session.borrow().has_content() && !confirm.confirm(RESET_CONFIRM_MESSAGE) {
            return false;
        }
        self.clear_session();
        true
    }

    /// 結果をクリップボードにコピー。結果が空なら何もしない
    pub fn copy_result(&self, clipboard: &mut dyn Clipboard) -> Result<bool> {
        let result = self.session.borrow().result.clone();
        if result.is_empty() {
            return Ok(false);
        }
        clipboard.write_text(&result)?;
        self.copied_at.set(Some(Instant::now()));
        Ok(true)
    }

    /// コピー完了通知を表示中か
    pub fn copy_notice_visible(&self) -> bool {
        self.copy_notice_visible_at(Instant::now())
    }

    pub fn copy_notice_visible_at(&self, now: Instant) -> bool {
        self.copied_at
            .get()
            .is_some_and(|at| now.saturating_duration_since(at) < COPY_NOTICE_DURATION)
    }

    /// 結果をテキストファイルとして書き出す内容を作成
    pub fn export_result(&self) -> Option<ExportFile> {
        let result = self.session.borrow().result.clone();
        if result.is_empty() {
            return None;
        }
        Some(ExportFile {
            file_name: export_file_name(Local::now().date_naive()),
            contents: result,
        })
    }

    fn clear_session(&self) {
        *self.session.borrow_mut() = Session::default();
        self.copied_at.set(None);
        *self.last_failure.borrow_mut() = None;
    }

    /// 時刻由来のID。同じミリ秒が続いた場合は前回の次の値を使う
    fn next_id(&self, now_millis: i64) -> String {
        let id = now_millis.max(self.last_id.get().saturating_add(1));
        self.last_id.set(id);
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HISTORY_KEY, MAX_HISTORY};
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 用意した応答を順に返す整理サービス
    #[derive(Default)]
    struct ScriptedOrganizer {
        responses: Mutex<VecDeque<std::result::Result<String, OrganizeError>>>,
        calls: AtomicUsize,
        received: Mutex<Vec<(String, Template)>>,
    }

    impl ScriptedOrganizer {
        fn new(responses: Vec<std::result::Result<String, OrganizeError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextOrganizer for ScriptedOrganizer {
        async fn organize(
            &self,
            text: &str,
            template: Template,
        ) -> std::result::Result<String, OrganizeError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.received.lock().unwrap().push((text.to_string(), template));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(format!("REPORT {}", n)))
        }
    }

    /// 送信側が値を送るまで完了しない整理サービス
    struct GatedOrganizer {
        gate: Mutex<Option<oneshot::Receiver<String>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextOrganizer for GatedOrganizer {
        async fn organize(
            &self,
            _text: &str,
            _template: Template,
        ) -> std::result::Result<String, OrganizeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gate.lock().unwrap().take();
            match gate {
                Some(rx) => rx.await.map_err(|_| OrganizeError::Unavailable(None)),
                None => Err(OrganizeError::unavailable("gate already used")),
            }
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        written: Vec<String>,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> Result<()> {
            self.written.push(text.to_string());
            Ok(())
        }
    }

    fn controller(
        responses: Vec<std::result::Result<String, OrganizeError>>,
    ) -> ConversionController<ScriptedOrganizer, MemoryStorage> {
        ConversionController::new(ScriptedOrganizer::new(responses), MemoryStorage::new())
    }

    fn yes() -> impl Fn(&str) -> bool {
        |_: &str| true
    }

    fn no() -> impl Fn(&str) -> bool {
        |_: &str| false
    }

    #[test]
    fn test_professional_scenario() {
        let c = controller(vec![Ok("REPORT...".to_string())]);
        let input = "Met with Kim today, discussed project wrap-up";

        let outcome = block_on(c.start_conversion(input, Template::Professional));

        let ConversionOutcome::Completed(log) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(log.original_text, input);
        assert_eq!(log.organized_text, "REPORT...");
        assert_eq!(log.template, Template::Professional);
        assert_eq!(log.title, "Met with Kim today, discu...");
        assert_eq!(c.history()[0], log);
        assert_eq!(c.session().result, "REPORT...");
        assert_eq!(c.session().selected_id, Some(log.id.clone()));
        assert_eq!(c.status(), ConversionStatus::Idle);
    }

    #[test]
    fn test_organizer_receives_text_and_template() {
        let c = controller(vec![]);
        block_on(c.start_conversion("人事面談メモ", Template::Hr));
        let received = c.organizer().received.lock().unwrap().clone();
        assert_eq!(received, vec![("人事面談メモ".to_string(), Template::Hr)]);
    }

    #[test]
    fn test_empty_input_is_noop() {
        let c = controller(vec![]);
        c.set_input_text("   \n\t ");
        let before = c.session();

        assert_eq!(
            block_on(c.convert_current()),
            ConversionOutcome::Skipped(SkipReason::EmptyInput)
        );
        assert_eq!(
            block_on(c.start_conversion("", Template::Casual)),
            ConversionOutcome::Skipped(SkipReason::EmptyInput)
        );
        assert_eq!(c.organizer().calls(), 0);
        assert_eq!(c.session(), before);
        assert!(c.history().is_empty());
        assert_eq!(c.status(), ConversionStatus::Idle);
    }

    #[test]
    fn test_convert_current_uses_session_state() {
        let c = controller(vec![Ok("整理結果".to_string())]);
        c.set_input_text("カウンセリングのメモ");
        c.set_template(Template::Counseling);

        let outcome = block_on(c.convert_current());
        let ConversionOutcome::Completed(log) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(log.template, Template::Counseling);
        assert_eq!(log.original_text, "カウンセリングのメモ");
    }

    #[test]
    fn test_status_transitions_once_per_invocation() {
        let c = controller(vec![Ok("A".into()), Err(OrganizeError::unavailable("down"))]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        c.set_status_observer(move |status| sink.borrow_mut().push(status));

        block_on(c.start_conversion("one", Template::Professional));
        block_on(c.start_conversion("two", Template::Professional));
        block_on(c.start_conversion(" ", Template::Professional));

        assert_eq!(
            *seen.borrow(),
            vec![
                ConversionStatus::Processing,
                ConversionStatus::Idle,
                ConversionStatus::Processing,
                ConversionStatus::Idle,
            ]
        );
    }

    #[test]
    fn test_second_conversion_while_processing_is_noop() {
        let (tx, rx) = oneshot::channel();
        let c = ConversionController::new(
            GatedOrganizer {
                gate: Mutex::new(Some(rx)),
                calls: AtomicUsize::new(0),
            },
            MemoryStorage::new(),
        );
        let c = &c;

        let first = c.start_conversion("最初のメモ", Template::Professional);
        let second = async move {
            assert!(c.is_processing());
            c.set_input_text("変換中も編集できる");
            let outcome = c.start_conversion("二つ目のメモ", Template::Hr).await;
            tx.send("FIRST REPORT".to_string()).unwrap();
            outcome
        };
        let (first, second) = block_on(async { futures::join!(first, second) });

        assert_eq!(second, ConversionOutcome::Skipped(SkipReason::Busy));
        assert!(matches!(first, ConversionOutcome::Completed(_)));
        assert_eq!(c.organizer().calls.load(Ordering::SeqCst), 1);
        assert_eq!(c.history().len(), 1);
        assert_eq!(c.session().input_text, "変換中も編集できる");
        assert_eq!(c.session().result, "FIRST REPORT");
        assert_eq!(c.status(), ConversionStatus::Idle);
    }

    #[test]
    fn test_dropped_conversion_returns_to_idle() {
        let (_tx, rx) = oneshot::channel::<String>();
        let c = ConversionController::new(
            GatedOrganizer {
                gate: Mutex::new(Some(rx)),
                calls: AtomicUsize::new(0),
            },
            MemoryStorage::new(),
        );

        {
            let mut pending = Box::pin(c.start_conversion("メモ", Template::Casual));
            let waker = futures::task::noop_waker();
            let mut cx = std::task::Context::from_waker(&waker);
            assert!(pending.as_mut().poll(&mut cx).is_pending());
            assert!(c.is_processing());
        }
        assert_eq!(c.status(), ConversionStatus::Idle);
    }

    #[test]
    fn test_twenty_one_conversions_keep_latest_twenty() {
        let c = controller(vec![]);
        for i in 1..=21 {
            let outcome = block_on(c.start_conversion(&format!("面談メモ {}", i), Template::Casual));
            assert!(matches!(outcome, ConversionOutcome::Completed(_)));
        }

        let history = c.history();
        assert_eq!(history.len(), MAX_HISTORY);
        for (index, log) in history.iter().enumerate() {
            assert_eq!(log.original_text, format!("面談メモ {}", 21 - index));
        }

        let mut ids: Vec<&str> = history.iter().map(|l| l.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), MAX_HISTORY, "IDが重複しています");
    }

    #[test]
    fn test_credential_failure_keeps_result() {
        let c = controller(vec![Ok("REPORT".into()), Err(OrganizeError::InvalidCredential)]);
        block_on(c.start_conversion("最初", Template::Professional));
        let before = c.session();

        let outcome = block_on(c.start_conversion("二回目", Template::Professional));

        let ConversionOutcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert!(failure.is_credential());
        assert!(matches!(failure, ConversionFailure::InvalidCredential { .. }));
        assert_eq!(c.session(), before);
        assert_eq!(c.history().len(), 1);
        assert_eq!(c.status(), ConversionStatus::Idle);
        assert_eq!(c.last_failure(), Some(failure));
    }

    #[test]
    fn test_service_failure_message() {
        let c = controller(vec![
            Err(OrganizeError::unavailable("ネットワークエラー")),
            Err(OrganizeError::Unavailable(None)),
            Err(OrganizeError::unavailable("  ")),
        ]);

        let messages: Vec<String> = (0..3)
            .map(|_| match block_on(c.start_conversion("メモ", Template::Hr)) {
                ConversionOutcome::Failed(f) => {
                    assert!(!f.is_credential());
                    f.message().to_string()
                }
                other => panic!("expected failure, got {:?}", other),
            })
            .collect();

        assert_eq!(messages[0], "ネットワークエラー");
        assert_eq!(messages[1], FALLBACK_ERROR_MESSAGE);
        assert_eq!(messages[2], FALLBACK_ERROR_MESSAGE);
        assert!(c.session().result.is_empty());
    }

    #[test]
    fn test_success_clears_last_failure() {
        let c = controller(vec![Err(OrganizeError::Unavailable(None)), Ok("OK".into())]);
        block_on(c.start_conversion("メモ", Template::Hr));
        assert!(c.last_failure().is_some());
        block_on(c.start_conversion("メモ", Template::Hr));
        assert!(c.last_failure().is_none());
    }

    #[test]
    fn test_reset_clears_last_failure() {
        let c = controller(vec![Err(OrganizeError::unavailable("down"))]);
        c.set_input_text("メモ");
        block_on(c.convert_current());
        assert!(c.last_failure().is_some());

        assert!(c.reset_session(&yes()));

        assert_eq!(c.session(), Session::default());
        assert!(c.last_failure().is_none());
    }

    #[test]
    fn test_delete_and_select_clear_last_failure() {
        let c = controller(vec![
            Ok("一件目".into()),
            Err(OrganizeError::unavailable("down")),
            Err(OrganizeError::unavailable("down")),
        ]);
        block_on(c.start_conversion("メモ1", Template::Hr));
        let log = c.history()[0].clone();

        block_on(c.start_conversion("メモ2", Template::Hr));
        assert!(c.select_history_entry(&log));
        assert!(c.last_failure().is_none());

        block_on(c.start_conversion("メモ3", Template::Hr));
        assert!(c.last_failure().is_some());
        assert!(c.delete_history_entry(&log.id, &yes()));
        assert!(c.last_failure().is_none());
    }

    #[test]
    fn test_select_history_entry() {
        let c = controller(vec![Ok("一件目".into()), Ok("二件目".into())]);
        block_on(c.start_conversion("メモ1", Template::Hr));
        block_on(c.start_conversion("メモ2", Template::Casual));
        let older = c.history()[1].clone();

        assert!(c.select_history_entry(&older));

        let session = c.session();
        assert_eq!(session.input_text, "メモ1");
        assert_eq!(session.result, "一件目");
        assert_eq!(session.template, Template::Hr);
        assert_eq!(session.selected_id, Some(older.id));
    }

    #[test]
    fn test_delete_selected_entry_resets_session() {
        let c = controller(vec![]);
        c.set_template(Template::Counseling);
        let ConversionOutcome::Completed(log) = block_on(c.convert_current_with("相談メモ")) else {
            panic!("expected completion");
        };

        assert!(c.delete_history_entry(&log.id, &yes()));

        assert_eq!(c.session(), Session::default());
        assert!(c.history().is_empty());
        assert!(c.find_history_entry(&log.id).is_none());
    }

    #[test]
    fn test_delete_other_entry_keeps_session() {
        let c = controller(vec![]);
        block_on(c.start_conversion("古いメモ", Template::Hr));
        block_on(c.start_conversion("新しいメモ", Template::Hr));
        let old_id = c.history()[1].id.clone();
        let before = c.session();

        assert!(c.delete_history_entry(&old_id, &yes()));

        assert_eq!(c.session(), before);
        assert_eq!(c.history().len(), 1);
    }

    #[test]
    fn test_delete_declined_is_noop() {
        let c = controller(vec![]);
        block_on(c.start_conversion("メモ", Template::Hr));
        let id = c.history()[0].id.clone();
        let before = c.session();

        assert!(!c.delete_history_entry(&id, &no()));

        assert_eq!(c.history().len(), 1);
        assert_eq!(c.session(), before);
    }

    #[test]
    fn test_reset_session_requires_confirmation_with_content() {
        let c = controller(vec![]);
        c.set_input_text("書きかけのメモ");
        c.set_template(Template::Casual);

        assert!(!c.reset_session(&no()));
        assert_eq!(c.session().input_text, "書きかけのメモ");

        assert!(c.reset_session(&yes()));
        assert_eq!(c.session(), Session::default());
        assert_eq!(c.session().template, Template::Professional);
    }

    #[test]
    fn test_reset_empty_session_skips_confirmation() {
        let c = controller(vec![]);
        c.set_template(Template::Hr);
        let asked = Cell::new(false);
        let confirm = |_: &str| {
            asked.set(true);
            false
        };

        assert!(c.reset_session(&confirm));
        assert!(!asked.get());
        assert_eq!(c.session().template, Template::Professional);
    }

    #[test]
    fn test_copy_result() {
        let c = controller(vec![Ok("コピー対象".into())]);
        let mut clipboard = RecordingClipboard::default();

        assert!(!c.copy_result(&mut clipboard).unwrap());
        assert!(!c.copy_notice_visible());

        block_on(c.start_conversion("メモ", Template::Hr));
        let copied_at = Instant::now();
        assert!(c.copy_result(&mut clipboard).unwrap());

        assert_eq!(clipboard.written, vec!["コピー対象".to_string()]);
        assert!(c.copy_notice_visible());
        assert!(!c.copy_notice_visible_at(copied_at + COPY_NOTICE_DURATION + Duration::from_millis(10)));
    }

    #[test]
    fn test_copy_failure_is_reported() {
        struct BrokenClipboard;
        impl Clipboard for BrokenClipboard {
            fn write_text(&mut self, _text: &str) -> Result<()> {
                Err(crate::error::Error::Clipboard("no display".into()))
            }
        }

        let c = controller(vec![]);
        block_on(c.start_conversion("メモ", Template::Hr));
        assert!(c.copy_result(&mut BrokenClipboard).is_err());
        assert!(!c.copy_notice_visible());
    }

    #[test]
    fn test_export_result() {
        let c = controller(vec![Ok("報告書本文\n- 項目".into())]);
        assert!(c.export_result().is_none());

        block_on(c.start_conversion("メモ", Template::Professional));
        let file = c.export_result().unwrap();

        assert_eq!(file.contents, "報告書本文\n- 項目");
        assert!(file.file_name.starts_with("面談記録_"));
        assert!(file.file_name.ends_with(".txt"));
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(export_file_name(date), "面談記録_2026-10-18.txt");
    }

    #[test]
    fn test_history_persisted_after_conversion() {
        let c = controller(vec![]);
        block_on(c.start_conversion("保存されるメモ", Template::Hr));

        let storage = c.history.borrow().storage().clone();
        let restored = ConversionController::new(ScriptedOrganizer::default(), storage);
        assert_eq!(restored.history(), c.history());
        assert!(restored.history.borrow().storage().get(HISTORY_KEY).is_some());
    }

    #[test]
    fn test_ids_continue_after_restored_history() {
        let future_id = (Local::now().timestamp_millis() + 60_000).to_string();
        let stored = vec![InterviewLog {
            id: future_id.clone(),
            title: "t".into(),
            date: "d".into(),
            original_text: "o".into(),
            organized_text: "r".into(),
            template: Template::Hr,
        }];
        let storage = MemoryStorage::with_entry(HISTORY_KEY, serde_json::to_string(&stored).unwrap());
        let c = ConversionController::new(ScriptedOrganizer::default(), storage);

        let ConversionOutcome::Completed(log) = block_on(c.start_conversion("メモ", Template::Hr)) else {
            panic!("expected completion");
        };
        assert!(log.id.parse::<i64>().unwrap() > future_id.parse::<i64>().unwrap());
    }

    #[test]
    fn test_max_stored_id_does_not_overflow() {
        let stored = vec![InterviewLog {
            id: i64::MAX.to_string(),
            title: "t".into(),
            date: "d".into(),
            original_text: "o".into(),
            organized_text: "r".into(),
            template: Template::Hr,
        }];
        let storage = MemoryStorage::with_entry(HISTORY_KEY, serde_json::to_string(&stored).unwrap());
        let c = ConversionController::new(ScriptedOrganizer::default(), storage);

        let outcome = block_on(c.start_conversion("メモ", Template::Hr));

        assert!(matches!(outcome, ConversionOutcome::Completed(_)));
        assert_eq!(c.history().len(), 2);
        assert_eq!(c.status(), ConversionStatus::Idle);
    }

    impl<O: TextOrganizer, S: Storage> ConversionController<O, S> {
        async fn convert_current_with(&self, input: &str) -> ConversionOutcome {
            self.set_input_text(input);
            self.convert_current().await
        }
    }
}
