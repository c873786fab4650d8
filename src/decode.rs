//! Text decoding for raw serial frames.
//!
//! Scanner firmware may emit either Shift_JIS or UTF-8 depending on its
//! configuration, and the bytes alone cannot tell the two apart. Decoding
//! is therefore best-effort: candidate encodings are tried in a configured
//! order, and malformed byte sequences are replaced rather than aborting.

use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};

use crate::Qr2KeyError;

/// Ordered list of candidate encodings for interpreting a raw frame.
///
/// The order is policy, not protocol: the default puts Shift_JIS first
/// because that is what the supported scanners ship configured with.
#[derive(Debug, Clone)]
pub struct DecodePolicy {
    encodings: Vec<&'static Encoding>,
}

impl Default for DecodePolicy {
    fn default() -> Self {
        Self::new(vec![SHIFT_JIS, UTF_8])
    }
}

impl DecodePolicy {
    /// Build a policy with an explicit candidate order.
    pub fn new(encodings: Vec<&'static Encoding>) -> Self {
        Self { encodings }
    }

    /// Candidate encodings in trial order.
    pub fn encodings(&self) -> &[&'static Encoding] {
        &self.encodings
    }

    /// Decode a raw frame into text.
    ///
    /// The first candidate that decodes without malformed sequences wins.
    /// If every candidate has malformed sequences, the primary candidate's
    /// lossy rendition (U+FFFD replacements) is returned; malformed bytes
    /// never abort an attempt. Trailing line terminators are stripped.
    ///
    /// An empty frame (read timeout with no data) is an error, distinct
    /// from a frame that decodes to an empty string.
    pub fn decode(&self, frame: &[u8]) -> Result<String, Qr2KeyError> {
        if frame.is_empty() {
            return Err(Qr2KeyError::Decode("empty frame: no data received".into()));
        }

        let mut lossy: Option<(String, &'static str)> = None;
        for enc in &self.encodings {
            let (text, _, had_errors) = enc.decode(frame);
            if !had_errors {
                return Ok(strip_line_ending(&text).to_string());
            }
            if lossy.is_none() {
                lossy = Some((text.into_owned(), enc.name()));
            }
        }

        let (text, name) = lossy.ok_or_else(|| {
            Qr2KeyError::Decode("no candidate encodings configured".into())
        })?;
        log::warn!("No clean decoding found, keeping lossy {name} rendition");
        Ok(strip_line_ending(&text).to_string())
    }

    /// Decode a raw frame with full diagnostics: the hex dump and the
    /// candidate text under every configured encoding.
    pub fn inspect(&self, frame: &[u8]) -> DecodeReport {
        let candidates = self
            .encodings
            .iter()
            .map(|enc| {
                let (text, _, had_errors) = enc.decode(frame);
                DecodeCandidate {
                    encoding: enc.name(),
                    text: strip_line_ending(&text).to_string(),
                    clean: !had_errors,
                }
            })
            .collect();
        DecodeReport {
            hex: hex::encode(frame),
            candidates,
        }
    }
}

/// One encoding's view of a frame, produced by [`DecodePolicy::inspect`].
#[derive(Debug, Clone)]
pub struct DecodeCandidate {
    /// Canonical encoding name (e.g. `Shift_JIS`, `UTF-8`).
    pub encoding: &'static str,
    /// Decoded text, trailing terminators stripped.
    pub text: String,
    /// True when the frame decoded without any malformed sequence.
    pub clean: bool,
}

/// Diagnostic view of a raw frame under every candidate encoding.
#[derive(Debug, Clone)]
pub struct DecodeReport {
    /// Hex dump of the raw frame.
    pub hex: String,
    /// Candidate decodings in policy order.
    pub candidates: Vec<DecodeCandidate>,
}

fn strip_line_ending(text: &str) -> &str {
    text.trim_end_matches(['\r', '\n'])
}
