//! Generated object names.
//!
//! Names are `{unix_millis}-{random_hex}.{ext}`: the timestamp gives coarse
//! ordering, the random suffix separates uploads landing in the same millisecond.
//! The caller's original file name never reaches a storage key.

use chrono::Utc;
use std::path::Path;

const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LENGTH: usize = 10;

pub fn generate_file_name(extension: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let suffix: u32 = rand::random();
    format!("{}-{:08x}.{}", timestamp, suffix, extension)
}

/// Extension for a stored-as-is upload.
///
/// The original name's extension is kept only when it is short, alphanumeric and
/// registered for the declared MIME type. Otherwise the MIME type's first registered
/// extension is used, then `bin`.
pub fn extension_for(original_name: &str, mime_type: &str) -> String {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let registered = mime_guess::get_mime_extensions_str(&essence).unwrap_or_default();

    sanitized_extension(original_name)
        .filter(|ext| registered.contains(&ext.as_str()))
        .or_else(|| registered.first().map(|ext| ext.to_string()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LENGTH
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
