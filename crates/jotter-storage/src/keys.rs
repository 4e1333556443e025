//! Key generation for the local backend.
//!
//! Key format: `{uuid}_{sanitized original name}`, keeping the original extension.

use uuid::Uuid;

const FALLBACK_NAME: &str = "file";
const MAX_NAME_LEN: usize = 200;

/// Reduce a client-supplied file name to a single safe path component.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_control() || c == ':' { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    if cleaned.len() <= MAX_NAME_LEN {
        return cleaned.to_string();
    }

    // Keep the extension when truncating
    let (stem, ext) = match cleaned.rfind('.') {
        Some(idx) if cleaned.len() - idx <= 16 => cleaned.split_at(idx),
        _ => (cleaned, ""),
    };
    let mut cut = MAX_NAME_LEN - ext.len();
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &stem[..cut], ext)
}

/// Generate a collision-resistant storage key for an uploaded file.
pub fn generate_storage_key(original: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_filename(original))
}
