/*
 * rfc2047.rs
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

//! RFC 2047 encoded words for message headers.
//!
//! Decoding is deliberately forgiving: anything that fails the
//! encoded-word grammar, its transfer decoding, or its charset conversion
//! is carried through as the literal text rather than reported as an
//! error.

use crate::charset;
use crate::encoding::{best_encoding, Base64Decoder, Base64Encoder, Encoding};
use crate::headers::FOLD_LEN;
use crate::unicode_interfaces;

/// Longest span worth packing into a single encoded word when merging.
const FOLD_PREENCODED: usize = FOLD_LEN / 2;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// RFC 822 atom character: anything above 127, or a printable ASCII char
/// that is not a special.
fn is_atom(c: char) -> bool {
    if (c as u32) > 127 {
        return true;
    }
    let b = c as u8;
    if !(33..=126).contains(&b) {
        return false;
    }
    !matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'.' | b'[' | b']'
    )
}

fn is_lwsp(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Characters that may appear literally in Q-encoded words (RFC 2047
/// section 5).
fn is_qsafe(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'!' | b'*' | b'+' | b'-' | b'/')
}

fn is_encoded_word(atom: &str) -> bool {
    atom.len() >= 7 && atom.starts_with("=?") && atom.ends_with("?=")
}

/// Decode the text portion of a Q-encoded word. None on a malformed or
/// truncated escape.
fn quoted_decode(input: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut iter = input.iter();
    while let Some(&c) = iter.next() {
        if c == b'=' {
            let hi = hex_value(*iter.next()?)?;
            let lo = hex_value(*iter.next()?)?;
            out.push((hi << 4) | lo);
        } else if c == b'_' {
            out.push(b' ');
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Q-encode `input`, escaping everything outside the safe set.
fn quoted_encode(input: &[u8], out: &mut String) {
    for &c in input {
        if c == b' ' {
            out.push('_');
        } else if is_qsafe(c) {
            out.push(c as char);
        } else {
            out.push('=');
            out.push(HEX[(c >> 4) as usize] as char);
            out.push(HEX[(c & 0xf) as usize] as char);
        }
    }
}

/// Decode a single encoded word. None when the grammar or the transfer
/// decoding is broken; charset problems fall back to a lossless byte
/// reinterpretation instead.
fn decode_word(word: &str) -> Option<String> {
    let inner = &word.as_bytes()[2..word.len() - 2];
    let q1 = inner.iter().position(|&c| c == b'?')?;
    if q1 + 2 >= inner.len() || inner[q1 + 2] != b'?' {
        return None;
    }
    let text = &inner[q1 + 3..];

    let decoded = match inner[q1 + 1] {
        b'B' | b'b' => {
            let mut dec = Base64Decoder::new();
            let mut out = Vec::new();
            dec.step(text, &mut out);
            out
        }
        b'Q' | b'q' => quoted_decode(text)?,
        _ => return None,
    };

    if !unicode_interfaces() {
        return Some(charset::latin1_to_string(&decoded));
    }

    // rfc2231 allows "=?charset*language?..."; the language part is noise
    let charset_label = std::str::from_utf8(&inner[..q1]).ok()?;
    let charset_label = charset_label.split('*').next().unwrap_or(charset_label);

    match charset::convert_to_utf8(&decoded, charset_label) {
        Some(text) => Some(text),
        None => Some(charset::latin1_to_string(&decoded)),
    }
}

/// Decode all encoded words in a header value. Whitespace between two
/// adjacent encoded words is dropped per RFC 2047; everything that fails
/// to decode is preserved verbatim.
pub fn header_decode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut atom = String::new();
    let mut lwsp = String::new();
    let mut last_was_encoded = false;
    let mut last_was_space = false;

    let flush = |out: &mut String, atom: &mut String, lwsp: &mut String,
                 last_was_encoded: &mut bool| {
        let decoded = if is_encoded_word(atom) {
            decode_word(atom)
        } else {
            None
        };
        match decoded {
            Some(word) => {
                if !*last_was_encoded {
                    out.push_str(lwsp);
                }
                out.push_str(&word);
                *last_was_encoded = true;
            }
            None => {
                out.push_str(lwsp);
                out.push_str(atom);
                *last_was_encoded = false;
            }
        }
        atom.clear();
        lwsp.clear();
    };

    for c in input.chars() {
        if !is_atom(c) && !last_was_space {
            flush(&mut out, &mut atom, &mut lwsp, &mut last_was_encoded);
            if is_lwsp(c) {
                lwsp.push(c);
                last_was_space = true;
            } else {
                // broken mailers stick specials right after encoded words
                out.push(c);
                last_was_encoded = false;
                last_was_space = false;
            }
            continue;
        }
        if is_atom(c) {
            atom.push(c);
            last_was_space = false;
        } else {
            lwsp.push(c);
            last_was_space = true;
        }
    }

    if !atom.is_empty() || !lwsp.is_empty() {
        flush(&mut out, &mut atom, &mut lwsp, &mut last_was_encoded);
    }

    out
}

/// Emit one "=?charset?x?text?=" word for `text`, picking B or Q per the
/// 8-bit density of the converted bytes. Falls back to UTF-8 when `text`
/// has no representation in the requested charset.
fn encode_word(out: &mut String, text: &str, charset_label: &str) {
    let (bytes, charset_label) = match charset::convert_from_utf8(text, charset_label) {
        Some(bytes) => (bytes, charset_label),
        None => (text.as_bytes().to_vec(), "utf-8"),
    };

    out.push_str("=?");
    out.push_str(charset_label);
    match best_encoding(&bytes) {
        Encoding::Base64 => {
            let mut enc = Base64Encoder::new();
            let mut encoded = Vec::new();
            enc.step(&bytes, &mut encoded);
            enc.close(&mut encoded);
            out.push_str("?b?");
            // headers are wrapped by folding, not by the codec
            for &b in encoded.iter().filter(|&&b| b != b'\n') {
                out.push(b as char);
            }
        }
        Encoding::QuotedPrintable => {
            out.push_str("?q?");
            quoted_encode(&bytes, out);
        }
    }
    out.push_str("?=");
}

/// Encode a whole phrase (such as a display name) as at most one encoded
/// word. Pure ASCII input is returned unchanged.
pub fn header_encode_phrase(input: &str) -> String {
    if input.is_ascii() {
        return input.to_string();
    }
    let charset_label = if unicode_interfaces() {
        charset::best_charset(input)
    } else {
        "iso-8859-1"
    };
    let mut out = String::new();
    encode_word(&mut out, input, charset_label);
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum WordKind {
    Atom,
    Encoded,
}

#[derive(Clone, Copy)]
struct Word {
    start: usize,
    end: usize,
    kind: WordKind,
    // 1 fits latin-1, 2 needs a bigger charset
    level: u8,
}

fn split_words(input: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut kind = WordKind::Atom;
    let mut level = 0u8;
    let mut count = 0;
    let mut last = 0;

    for (pos, c) in input.char_indices() {
        if c.is_whitespace() {
            if count > 0 {
                words.push(Word { start, end: last, kind, level });
                count = 0;
            }
            start = pos + c.len_utf8();
            kind = WordKind::Atom;
            level = 0;
        } else {
            count += 1;
            if (c as u32) > 127 {
                kind = WordKind::Encoded;
                level = level.max(if (c as u32) < 256 { 1 } else { 2 });
            }
        }
        last = pos + c.len_utf8();
    }
    if count > 0 {
        words.push(Word { start, end: last, kind, level });
    }

    words
}

fn merge_words(words: &mut Vec<Word>) {
    loop {
        let mut merged = false;
        let mut i = 0;
        while i < words.len() {
            while i + 1 < words.len() {
                let word = words[i];
                let next = words[i + 1];
                if word.kind != WordKind::Encoded || next.kind != WordKind::Encoded {
                    break;
                }
                if next.end - word.start < FOLD_PREENCODED {
                    words[i].end = next.end;
                    words[i].level = word.level.max(next.level);
                    words.remove(i + 1);
                    merged = true;
                } else {
                    // too long to merge; claim the separating whitespace so
                    // it survives inside the encoded run
                    words[i].end = next.start;
                    break;
                }
            }
            i += 1;
        }
        if !merged {
            break;
        }
    }
}

/// Encode a header value, turning each run of 8-bit words into encoded
/// words and leaving ASCII words untouched.
pub fn header_encode(input: &str) -> String {
    let mut words = split_words(input);
    if words.is_empty() {
        return input.to_string();
    }
    merge_words(&mut words);

    let mut out = String::new();
    let mut prev: Option<Word> = None;
    out.push_str(&input[..words[0].start]);

    for word in words {
        if let Some(p) = prev {
            if !(p.kind == WordKind::Encoded && word.kind == WordKind::Encoded) {
                out.push_str(&input[p.end..word.start]);
            }
        }

        match word.kind {
            WordKind::Atom => out.push_str(&input[word.start..word.end]),
            WordKind::Encoded => {
                let span = match prev {
                    Some(p) if p.kind == WordKind::Encoded => {
                        // adjacent encoded words must be separated by lwsp,
                        // and the original whitespace moves into this word
                        out.push(' ');
                        &input[p.end..word.end]
                    }
                    _ => &input[word.start..word.end],
                };
                let charset_label = if word.level == 1 || !unicode_interfaces() {
                    "iso-8859-1"
                } else {
                    charset::best_charset(span)
                };
                encode_word(&mut out, span, charset_label);
            }
        }

        prev = Some(word);
    }
    if let Some(p) = prev {
        out.push_str(&input[p.end..]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_unicode() {
        crate::init(true);
    }

    #[test]
    fn ascii_passes_through() {
        init_unicode();
        assert_eq!(header_decode("Hello there"), "Hello there");
        assert_eq!(header_encode("Hello there"), "Hello there");
        assert_eq!(header_encode_phrase("Fred Bloggs"), "Fred Bloggs");
    }

    #[test]
    fn decode_q_word() {
        init_unicode();
        assert_eq!(
            header_decode("=?iso-8859-1?q?caf=E9?="),
            "caf\u{e9}"
        );
        assert_eq!(
            header_decode("=?iso-8859-1?Q?a_b?="),
            "a b"
        );
    }

    #[test]
    fn decode_b_word() {
        init_unicode();
        assert_eq!(header_decode("=?utf-8?b?Y2Fmw6k=?="), "caf\u{e9}");
    }

    #[test]
    fn whitespace_between_encoded_words_is_dropped() {
        init_unicode();
        assert_eq!(
            header_decode("=?iso-8859-1?q?one?= \t =?iso-8859-1?q?two?="),
            "onetwo"
        );
        assert_eq!(
            header_decode("=?iso-8859-1?q?one?= plain =?iso-8859-1?q?two?="),
            "one plain two"
        );
    }

    #[test]
    fn broken_word_is_literal() {
        init_unicode();
        assert_eq!(header_decode("=?iso-8859-1?x?zzzz?="), "=?iso-8859-1?x?zzzz?=");
        assert_eq!(header_decode("=?iso-8859-1?q?=Z9?="), "=?iso-8859-1?q?=Z9?=");
    }

    #[test]
    fn rfc2231_language_tag_is_ignored() {
        init_unicode();
        assert_eq!(header_decode("=?iso-8859-1*en?q?caf=E9?="), "caf\u{e9}");
    }

    #[test]
    fn unknown_charset_falls_back_to_bytes() {
        init_unicode();
        assert_eq!(header_decode("=?x-bogus?q?caf=E9?="), "caf\u{e9}");
    }

    #[test]
    fn phrase_round_trip() {
        init_unicode();
        for phrase in ["Patrik F\u{e4}ltstr\u{f6}m", "caf\u{e9} society", "\u{4e2d}\u{6587}"] {
            let encoded = header_encode_phrase(phrase);
            assert!(encoded.is_ascii());
            assert_eq!(header_decode(&encoded), phrase);
        }
    }

    #[test]
    fn encode_round_trip() {
        init_unicode();
        for value in [
            "subject caf\u{e9} line",
            "tv\u{e5} sm\u{e5} \u{e5}ar",
            "mixed \u{4e2d}\u{6587} and ascii",
        ] {
            let encoded = header_encode(value);
            assert!(encoded.is_ascii());
            assert_eq!(header_decode(&encoded), value);
        }
    }

    #[test]
    fn encode_leaves_ascii_words_alone() {
        init_unicode();
        let encoded = header_encode("plain caf\u{e9} plain");
        assert!(encoded.starts_with("plain "));
        assert!(encoded.ends_with(" plain"));
    }
}
