//! システムクリップボード（arboard）

use interview_notes_common::{Clipboard, Error, Result};

/// OSのクリップボード
///
/// 初回書き込み時に接続する。ディスプレイのない環境では書き込みがエラーになる。
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| Error::Clipboard(e.to_string())),
            None => Err(Error::Clipboard("クリップボードを開けません".into())),
        }
    }
}
