/*
 * quoted_printable.rs
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

//! Incremental quoted-printable codec (RFC 2045 section 6.7).

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes that may appear literally in quoted-printable output.
pub(crate) fn is_qpsafe(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | 33..=60 | 62..=126)
}

fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

fn push_escaped(out: &mut Vec<u8>, c: u8) {
    out.push(b'=');
    out.push(HEX[(c >> 4) as usize]);
    out.push(HEX[(c & 0xf) as usize]);
}

/// Streaming quoted-printable encoder. Soft-breaks lines before 76
/// columns; a trailing space or tab is held back one byte so it can be
/// escaped when it turns out to end a line.
pub struct QuotedPrintableEncoder {
    column: usize,
    last: Option<u8>,
}

impl Default for QuotedPrintableEncoder {
    fn default() -> Self {
        QuotedPrintableEncoder { column: 0, last: None }
    }
}

impl QuotedPrintableEncoder {
    pub fn new() -> QuotedPrintableEncoder {
        QuotedPrintableEncoder::default()
    }

    /// Encode a chunk, appending output to `out`.
    pub fn step(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &c in input {
            if c == b'\r' {
                if let Some(last) = self.last.take() {
                    push_escaped(out, last);
                    self.column += 3;
                }
                self.last = Some(b'\r');
            } else if c == b'\n' {
                if let Some(last) = self.last.take() {
                    // a bare CR is swallowed by the line break
                    if last != b'\r' {
                        push_escaped(out, last);
                    }
                }
                out.push(b'\n');
                self.column = 0;
            } else {
                if let Some(last) = self.last.take() {
                    if is_qpsafe(last) {
                        out.push(last);
                        self.column += 1;
                    } else {
                        push_escaped(out, last);
                        self.column += 3;
                    }
                }
                if is_qpsafe(c) {
                    if self.column > 74 {
                        out.extend_from_slice(b"=\n");
                        self.column = 0;
                    }
                    if is_blank(c) {
                        self.last = Some(c);
                    } else {
                        out.push(c);
                        self.column += 1;
                    }
                } else {
                    if self.column > 72 {
                        out.extend_from_slice(b"=\n");
                        self.column = 3;
                    } else {
                        self.column += 3;
                    }
                    push_escaped(out, c);
                }
            }
        }
    }

    /// Flush the held-back byte (escaped, since it now ends the line),
    /// terminate the final line, and reset to a fresh encoder.
    pub fn close(&mut self, out: &mut Vec<u8>) {
        if let Some(last) = self.last.take() {
            if is_qpsafe(last) && !is_blank(last) {
                out.push(last);
            } else {
                push_escaped(out, last);
            }
        }
        out.push(b'\n');
        self.column = 0;
    }
}

/// Streaming quoted-printable decoder. Malformed escape sequences are
/// reproduced literally; an escape left incomplete at the end of the
/// whole input is dropped.
#[derive(Default)]
pub struct QuotedPrintableDecoder {
    // 0 literal, 1 just saw '=', 2 saw '=' plus one byte
    state: u8,
    saved: u8,
}

impl QuotedPrintableDecoder {
    pub fn new() -> QuotedPrintableDecoder {
        QuotedPrintableDecoder::default()
    }

    /// Decode a chunk, appending output to `out`.
    pub fn step(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &c in input {
            match self.state {
                0 => {
                    if c == b'=' {
                        self.state = 1;
                    } else {
                        out.push(c);
                    }
                }
                1 => {
                    if c == b'\n' {
                        // soft break, unix line end
                        self.state = 0;
                    } else {
                        self.saved = c;
                        self.state = 2;
                    }
                }
                _ => {
                    match (hex_value(self.saved), hex_value(c)) {
                        (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                        _ => {
                            if c == b'\n' && self.saved == b'\r' {
                                // soft break, canonical line end
                            } else {
                                out.push(b'=');
                                out.push(self.saved);
                                out.push(c);
                            }
                        }
                    }
                    self.state = 0;
                }
            }
        }
    }
}
