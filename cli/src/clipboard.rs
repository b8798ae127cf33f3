//! Terminal clipboard through the OSC 52 escape sequence.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Write;
use unsheet::present::Clipboard;

/// Writes copied text as an OSC 52 sequence the terminal picks up.
pub struct OscClipboard<W: Write> {
    out: W,
}

impl<W: Write> OscClipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Clipboard for OscClipboard<W> {
    fn set_text(&mut self, text: &str) -> unsheet::Result<()> {
        write!(self.out, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
        self.out.flush()?;
        log::debug!("sent {} bytes to the terminal clipboard", text.len());
        Ok(())
    }
}
