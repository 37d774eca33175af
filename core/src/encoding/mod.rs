/*
 * mod.rs
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

//! Incremental MIME transfer encodings (RFC 2045) plus uuencode.
//!
//! Each codec is a small state struct fed arbitrary input chunks through
//! `step` and flushed with `close`; output bytes are appended to a caller
//! supplied buffer. Splitting the input at any byte boundary produces the
//! same output as a single call.

mod base64;
mod quoted_printable;
mod uuencode;

pub use base64::{Base64Decoder, Base64Encoder};
pub use quoted_printable::{QuotedPrintableDecoder, QuotedPrintableEncoder};
pub use uuencode::{UuDecoder, UuEncoder};

/// Content transfer encodings this crate can pick between for arbitrary
/// data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    QuotedPrintable,
    Base64,
}

/// True if `text` contains any byte above 127.
pub fn text_is_8bit(text: &[u8]) -> bool {
    text.iter().any(|&c| c > 127)
}

/// Pick the denser transfer encoding for `text`: quoted-printable while
/// 8-bit bytes stay at or below 17% of the input, base64 beyond that.
pub fn best_encoding(text: &[u8]) -> Encoding {
    let count = text.iter().filter(|&&c| c > 127).count();
    if count as f32 <= text.len() as f32 * 0.17 {
        Encoding::QuotedPrintable
    } else {
        Encoding::Base64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mostly_ascii_prefers_quoted_printable() {
        assert_eq!(best_encoding(b"hello world"), Encoding::QuotedPrintable);
        assert!(!text_is_8bit(b"hello world"));
    }

    #[test]
    fn dense_8bit_prefers_base64() {
        let text = [0xc3u8, 0xa9, 0xc3, 0xa9, b'a', b'b'];
        assert_eq!(best_encoding(&text), Encoding::Base64);
        assert!(text_is_8bit(&text));
    }

    #[test]
    fn threshold_is_17_percent() {
        // 17 of 100 bytes 8-bit stays quoted-printable, 18 tips over
        let mut text = vec![b'a'; 100];
        for b in text.iter_mut().take(17) {
            *b = 0xe9;
        }
        assert_eq!(best_encoding(&text), Encoding::QuotedPrintable);
        text[17] = 0xe9;
        assert_eq!(best_encoding(&text), Encoding::Base64);
    }
}
