//! Clipboard capability with a console-echo fallback.
//!
//! Clipboard access is best-effort: where the OS clipboard is unreachable
//! (headless session, unsupported platform), the text is echoed to the
//! console instead so the user can copy it by hand.

use crate::Qr2KeyError;

/// Something that can receive a piece of text for later pasting.
pub trait Clipboard {
    /// Place `text` on the clipboard (or its stand-in).
    fn set_text(&mut self, text: &str) -> Result<(), Qr2KeyError>;

    /// Short label for user-facing messages.
    fn name(&self) -> &'static str;
}

/// The real OS clipboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    /// Connect to the OS clipboard.
    pub fn new() -> Result<Self, Qr2KeyError> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| Qr2KeyError::Clipboard(format!("Clipboard unavailable: {e}")))?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), Qr2KeyError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| Qr2KeyError::Clipboard(format!("Copy failed: {e}")))
    }

    fn name(&self) -> &'static str {
        "system clipboard"
    }
}

/// Fallback that prints the text to the console.
pub struct EchoClipboard;

impl Clipboard for EchoClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), Qr2KeyError> {
        println!("Clipboard not available. Text to copy:\n{text}");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console echo"
    }
}

/// Pick the best available clipboard implementation.
pub fn clipboard() -> Box<dyn Clipboard> {
    match SystemClipboard::new() {
        Ok(clip) => Box::new(clip),
        Err(e) => {
            log::debug!("{e}, falling back to console echo");
            Box::new(EchoClipboard)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_fallback_accepts_text() {
        let mut clip = EchoClipboard;
        clip.set_text("abc").unwrap();
        assert_eq!(clip.name(), "console echo");
    }

    #[test]
    fn factory_always_returns_an_implementation() {
        // On a headless machine this is the echo fallback; either way the
        // returned capability must accept text.
        let mut clip = clipboard();
        clip.set_text("factory test").unwrap();
    }
}
