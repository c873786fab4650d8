//! Synthetic keystroke emission.
//!
//! Replays decoded text as key events into whatever application holds
//! input focus, after a warm-up countdown that gives the user time to
//! place the cursor.

use std::thread;
use std::time::Duration;

use enigo::{Enigo, Keyboard, Settings};

use crate::Qr2KeyError;

/// Warm-up delay before typing starts, in seconds.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;

/// Types a string as synthetic keyboard input after a countdown.
#[derive(Debug, Clone, Copy)]
pub struct KeystrokeEmitter {
    countdown_secs: u32,
}

impl Default for KeystrokeEmitter {
    fn default() -> Self {
        Self::with_countdown(DEFAULT_COUNTDOWN_SECS)
    }
}

impl KeystrokeEmitter {
    /// Build an emitter with an explicit countdown (0 disables it).
    pub fn with_countdown(countdown_secs: u32) -> Self {
        Self { countdown_secs }
    }

    /// Type `text` into the focused application after the countdown.
    ///
    /// Empty text is a no-op: no delay, no injection. Injection failures
    /// are reported once; characters already emitted before the failure
    /// are not rolled back.
    pub fn type_text(&self, text: &str) -> Result<(), Qr2KeyError> {
        self.type_text_with_progress(text, |remaining| log::info!("Typing in {remaining}..."))
    }

    /// Like [`type_text`](Self::type_text), with a callback invoked once
    /// per countdown second so callers can render the ticks.
    pub fn type_text_with_progress(
        &self,
        text: &str,
        mut on_tick: impl FnMut(u32),
    ) -> Result<(), Qr2KeyError> {
        if text.is_empty() {
            log::warn!("No text to type");
            return Ok(());
        }

        self.countdown(&mut on_tick);

        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| Qr2KeyError::Inject(format!("Keyboard init failed: {e}")))?;
        enigo
            .text(text)
            .map_err(|e| Qr2KeyError::Inject(format!("Typing failed: {e}")))?;
        log::debug!("Typed {} characters", text.chars().count());
        Ok(())
    }

    fn countdown(&self, on_tick: &mut impl FnMut(u32)) {
        for remaining in (1..=self.countdown_secs).rev() {
            on_tick(remaining);
            thread::sleep(Duration::from_secs(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn empty_text_is_noop_without_delay() {
        let emitter = KeystrokeEmitter::default();
        let start = Instant::now();
        let mut ticks = 0;
        emitter
            .type_text_with_progress("", |_| ticks += 1)
            .unwrap();
        assert_eq!(ticks, 0, "empty input must not count down");
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn countdown_ticks_run_high_to_low() {
        let emitter = KeystrokeEmitter::with_countdown(2);
        let mut seen = Vec::new();
        emitter.countdown(&mut |remaining| seen.push(remaining));
        assert_eq!(seen, vec![2, 1]);
    }

    #[test]
    fn zero_countdown_skips_ticks() {
        let emitter = KeystrokeEmitter::with_countdown(0);
        let mut ticks = 0;
        emitter.countdown(&mut |_| ticks += 1);
        assert_eq!(ticks, 0);
    }
}
