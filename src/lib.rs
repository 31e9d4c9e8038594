//! 面談メモAI整理・報告書作成ツール

pub mod app;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod interactive;
pub mod organizer;
pub mod storage;
