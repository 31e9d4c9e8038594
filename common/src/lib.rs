//! Interview Notes Common Library
//!
//! CLIと対話セッションで共有される型と変換ロジック

pub mod controller;
pub mod error;
pub mod history;
pub mod organizer;
pub mod prompts;
pub mod storage;
pub mod types;

pub use controller::{
    export_file_name, Clipboard, Confirm, ConversionController, ConversionFailure,
    ConversionOutcome, ConversionStatus, ExportFile, Session, SkipReason,
};
pub use error::{Error, Result};
pub use history::{HistoryStore, HISTORY_KEY, MAX_HISTORY};
pub use organizer::{OrganizeError, TextOrganizer};
pub use prompts::{build_system_instruction, build_user_prompt, strip_emphasis};
pub use storage::{MemoryStorage, Storage};
pub use types::{derive_title, InterviewLog, Template};
