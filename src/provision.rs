//! Provisioning: generate a symmetric key and render it as a QR image.
//!
//! Independent of the scan path. The key is opaque to this crate: it is
//! generated, rendered, and handed to the user, never parsed or validated.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use qrcode::{EcLevel, QrCode};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::Qr2KeyError;

/// Default output path for the rendered key QR.
pub const DEFAULT_QR_PATH: &str = "key_qr.png";

/// Raw key length before encoding.
const KEY_LEN: usize = 32;

/// Pixels per QR module in the rendered image.
const MODULE_PIXELS: u32 = 10;

/// Generate a fresh symmetric key in its textual form: 32 bytes from the
/// OS random source, URL-safe base64 with padding.
pub fn generate_key() -> String {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    URL_SAFE.encode(key)
}

/// Render the textual form of a key into a QR image at `path`.
///
/// Error-correction level H, black modules on white, 4-module quiet zone.
/// The output format follows the path extension; the default is PNG.
pub fn key_to_qr(key: &str, path: &Path) -> Result<PathBuf, Qr2KeyError> {
    let code = QrCode::with_error_correction_level(key.as_bytes(), EcLevel::H)
        .map_err(|e| Qr2KeyError::Provision(format!("QR encoding failed: {e}")))?;

    let image = code
        .render::<image::Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    image
        .save(path)
        .map_err(|e| Qr2KeyError::Provision(format!("Saving {} failed: {e}", path.display())))?;
    log::debug!("Wrote key QR to {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn keys_are_distinct_across_calls() {
        let a = generate_key();
        let b = generate_key();
        assert_ne!(a, b);
    }

    #[test]
    fn key_is_padded_urlsafe_base64_of_32_bytes() {
        let key = generate_key();
        assert_eq!(key.len(), 44);
        assert!(key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')));
        let raw = URL_SAFE.decode(&key).unwrap();
        assert_eq!(raw.len(), KEY_LEN);
    }

    #[test]
    fn qr_image_is_written() {
        let key = generate_key();
        let path = std::env::temp_dir().join("qr2key_test_key.png");
        let written = key_to_qr(&key, &path).unwrap();
        let meta = fs::metadata(&written).unwrap();
        assert!(meta.len() > 0);
        fs::remove_file(&written).unwrap();
    }

    #[test]
    fn qr_encodes_the_key_text() {
        // Level H must accept a 44-char token; the payload is the exact
        // textual form of the key.
        let key = generate_key();
        let code = QrCode::with_error_correction_level(key.as_bytes(), EcLevel::H).unwrap();
        assert!(code.width() > 0);
    }

    #[test]
    fn unwritable_path_is_reported() {
        let key = generate_key();
        let path = Path::new("/nonexistent_dir_xyz/key.png");
        let result = key_to_qr(&key, path);
        assert!(matches!(result, Err(Qr2KeyError::Provision(_))));
    }
}
