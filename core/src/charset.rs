/*
 * charset.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Tagliacarte, a cross-platform email client.
 *
 * Tagliacarte is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Tagliacarte is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Tagliacarte.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Charset conversion for header text, over encoding_rs labels.

use encoding_rs::Encoding;

fn is_latin1_label(charset: &str) -> bool {
    charset.eq_ignore_ascii_case("iso-8859-1")
        || charset.eq_ignore_ascii_case("latin1")
        || charset.eq_ignore_ascii_case("latin-1")
}

/// Reinterpret raw bytes as text, one code point per byte. Lossless for
/// any input.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Decode `bytes` from the named charset. None when the charset is unknown
/// or the bytes are not valid in it.
pub fn convert_to_utf8(bytes: &[u8], charset: &str) -> Option<String> {
    if charset.eq_ignore_ascii_case("us-ascii") {
        if bytes.is_ascii() {
            return Some(latin1_to_string(bytes));
        }
        return None;
    }
    if is_latin1_label(charset) {
        return Some(latin1_to_string(bytes));
    }
    let encoding = Encoding::for_label(charset.as_bytes())?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

/// Encode `text` into the named charset. None when the charset is unknown
/// or some character has no representation in it.
pub fn convert_from_utf8(text: &str, charset: &str) -> Option<Vec<u8>> {
    if charset.eq_ignore_ascii_case("us-ascii") {
        if text.is_ascii() {
            return Some(text.as_bytes().to_vec());
        }
        return None;
    }
    if is_latin1_label(charset) {
        let mut out = Vec::with_capacity(text.len());
        for c in text.chars() {
            if (c as u32) > 0xff {
                return None;
            }
            out.push(c as u8);
        }
        return Some(out);
    }
    let encoding = Encoding::for_label(charset.as_bytes())?;
    let (bytes, _, had_unmappable) = encoding.encode(text);
    if had_unmappable {
        None
    } else {
        Some(bytes.into_owned())
    }
}

/// Smallest of the charsets this crate advertises in encoded words that can
/// represent every character of `text`.
pub fn best_charset(text: &str) -> &'static str {
    if text.is_ascii() {
        "us-ascii"
    } else if text.chars().all(|c| (c as u32) <= 0xff) {
        "iso-8859-1"
    } else {
        "utf-8"
    }
}
