//! Identifier and file-name handling.

use alloc::string::String;

/// Trim trailing space padding from an identifier field.
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        end -= 1;
    }
    &bytes[..end]
}

/// Decode a fixed-width identifier field (space-padded ASCII).
pub fn decode_identifier(bytes: &[u8]) -> String {
    String::from_utf8_lossy(trim_trailing_spaces(bytes)).into_owned()
}

/// Strip the version suffix from a file identifier
/// (e.g. "FILE.TXT;1" -> "FILE.TXT"), and a trailing dot if one is left
/// (e.g. "FILE.;1" -> "FILE").
pub fn strip_version(name: &str) -> &str {
    let base = name.split(';').next().unwrap_or(name);
    base.strip_suffix('.').unwrap_or(base)
}
