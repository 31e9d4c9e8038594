use crate::error::Result;
use interview_notes_common::ExportFile;
use std::path::{Path, PathBuf};

/// 出力先がディレクトリならファイル名を付け、ファイルパスならそのまま使う
fn output_path(output: &Path, file_name: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(file_name)
    } else {
        output.to_path_buf()
    }
}

/// 整理結果をテキストファイルに書き出す
pub fn write_export(file: &ExportFile, output: &Path) -> Result<PathBuf> {
    let path = output_path(output, &file.file_name);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, &file.contents)?;
    tracing::info!(path = %path.display(), "結果を書き出しました");
    Ok(path)
}
