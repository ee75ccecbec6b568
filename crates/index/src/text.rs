//! Byte-level decoding of index documents

use filever_errors::IndexError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decode raw document bytes into text.
///
/// Export-Clixml writes UTF-16 with a BOM by default on Windows PowerShell and
/// UTF-8 on newer versions, so both are accepted. Input without a BOM is
/// treated as UTF-8.
pub(crate) fn decode_document(bytes: &[u8]) -> Result<String, IndexError> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return utf8(rest);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        return utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        return utf16(rest, u16::from_be_bytes);
    }
    utf8(bytes)
}

fn utf8(bytes: &[u8]) -> Result<String, IndexError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| IndexError::InvalidEncoding {
        message: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })
}

fn utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> Result<String, IndexError> {
    if bytes.len() % 2 != 0 {
        return Err(IndexError::InvalidEncoding {
            message: "odd number of bytes in UTF-16 input".to_string(),
        });
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| from_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| IndexError::InvalidEncoding {
        message: "unpaired surrogate in UTF-16 input".to_string(),
    })
}

/// Decode CLIXML `_xHHHH_` escapes.
///
/// Each escape is one UTF-16 code unit; consecutive escapes may form a
/// surrogate pair. Unpaired surrogates become U+FFFD.
pub(crate) fn unescape(input: &str) -> String {
    if !input.contains("_x") {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut pending: Vec<u16> = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(unit) = escape_at(rest) {
            pending.push(unit);
            rest = &rest[7..];
            continue;
        }
        flush_units(&mut pending, &mut out);
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    flush_units(&mut pending, &mut out);
    out
}

fn escape_at(s: &str) -> Option<u16> {
    let bytes = s.as_bytes();
    if bytes.len() < 7 || !s.starts_with("_x") || bytes[6] != b'_' {
        return None;
    }
    let hex = s.get(2..6)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

fn flush_units(pending: &mut Vec<u16>, out: &mut String) {
    if pending.is_empty() {
        return;
    }
    out.extend(
        char::decode_utf16(pending.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}
