//! Query normalization.
//!
//! The same [`normalize_key`] function produces index keys at load time and
//! query keys at search time, so both sides of a comparison are always in the
//! same canonical form:
//!
//! 1. HTML entities are decoded (`&amp;` -> `&`, `&#160;` -> NBSP)
//! 2. text is lowercased
//! 3. alphanumerics and `_` are kept
//! 4. any other run of characters becomes a single space, trimmed at both ends
//!
//! The function is idempotent: `normalize_key(normalize_key(s)) == normalize_key(s)`.

use std::borrow::Cow;

/// Normalize display text or raw user input into a search key.
///
/// Returns an empty string for input with no searchable characters, which
/// callers treat as "no query".
pub fn normalize_key(raw: &str) -> String {
    let decoded = decode_html_entities(raw);
    let mut key = String::with_capacity(decoded.len());
    let mut pending_break = false;

    for ch in decoded.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_break && !key.is_empty() {
                key.push(' ');
            }
            pending_break = false;
            key.extend(ch.to_lowercase());
        } else {
            pending_break = true;
        }
    }

    key
}

/// Decode a Doxygen search identifier such as `hse_5fvalue_16` into the text
/// it was generated from (`hse_value`).
///
/// The producer appends `_<n>` as a per-shard ordinal and escapes every
/// character outside `[A-Za-z0-9]` as `_XX` (one escape per UTF-8 byte).
pub fn decode_search_id(id: &str) -> String {
    let stem = match id.rsplit_once('_') {
        Some((stem, ordinal))
            if !stem.is_empty()
                && !ordinal.is_empty()
                && ordinal.bytes().all(|b| b.is_ascii_digit()) =>
        {
            stem
        }
        _ => id,
    };

    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode the HTML entities the documentation producer emits in labels.
///
/// Unknown named entities are left untouched.
pub fn decode_html_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|ch| (ch, end)));

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
