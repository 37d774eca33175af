/*
 * base64.rs
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

//! Incremental base64 codec (RFC 2045 section 6.8).

const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Rank of each input byte, 0xff for bytes outside the alphabet.
const RANK: [u8; 256] = {
    let mut table = [0xffu8; 256];
    let mut i = 0;
    while i < 64 {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Streaming base64 encoder. Emits a line break after every 19 quads
/// (76 columns); carries up to two unencoded bytes between steps.
#[derive(Default)]
pub struct Base64Encoder {
    saved: u32,
    nsaved: u32,
    quads: usize,
}

impl Base64Encoder {
    pub fn new() -> Base64Encoder {
        Base64Encoder::default()
    }

    /// Encode a chunk, appending output to `out`.
    pub fn step(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &b in input {
            self.saved = (self.saved << 8) | b as u32;
            self.nsaved += 1;
            if self.nsaved == 3 {
                out.push(ALPHABET[((self.saved >> 18) & 0x3f) as usize]);
                out.push(ALPHABET[((self.saved >> 12) & 0x3f) as usize]);
                out.push(ALPHABET[((self.saved >> 6) & 0x3f) as usize]);
                out.push(ALPHABET[(self.saved & 0x3f) as usize]);
                self.saved = 0;
                self.nsaved = 0;
                self.quads += 1;
                if self.quads >= 19 {
                    out.push(b'\n');
                    self.quads = 0;
                }
            }
        }
    }

    /// Flush any partial group with '=' padding, terminate the final line,
    /// and reset to a fresh encoder.
    pub fn close(&mut self, out: &mut Vec<u8>) {
        if self.nsaved > 0 {
            let bits = self.saved << (8 * (3 - self.nsaved));
            out.push(ALPHABET[((bits >> 18) & 0x3f) as usize]);
            out.push(ALPHABET[((bits >> 12) & 0x3f) as usize]);
            if self.nsaved == 2 {
                out.push(ALPHABET[((bits >> 6) & 0x3f) as usize]);
            } else {
                out.push(b'=');
            }
            out.push(b'=');
        }
        out.push(b'\n');
        self.saved = 0;
        self.nsaved = 0;
        self.quads = 0;
    }
}

/// Streaming base64 decoder. Bytes outside the alphabet (including line
/// breaks and other whitespace) are silently skipped; trailing '=' pads
/// each drop one output byte.
#[derive(Default)]
pub struct Base64Decoder {
    saved: u32,
    count: usize,
    npad: usize,
}

impl Base64Decoder {
    pub fn new() -> Base64Decoder {
        Base64Decoder::default()
    }

    /// Decode a chunk, appending output to `out`.
    pub fn step(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &b in input {
            let rank = if b == b'=' {
                // a pad only counts in the last two slots of a quad
                if self.count < 2 || self.npad == 2 {
                    continue;
                }
                self.npad += 1;
                0
            } else {
                let rank = RANK[b as usize];
                if rank == 0xff {
                    continue;
                }
                rank
            };
            self.saved = (self.saved << 6) | rank as u32;
            self.count += 1;
            if self.count == 4 {
                out.push((self.saved >> 16) as u8);
                if self.npad < 2 {
                    out.push((self.saved >> 8) as u8);
                }
                if self.npad < 1 {
                    out.push(self.saved as u8);
                }
                self.saved = 0;
                self.count = 0;
                self.npad = 0;
            }
        }
    }

    /// Number of alphabet bytes buffered toward an incomplete final quad.
    /// Non-zero after the last step means the input was truncated.
    pub fn pending(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(input: &[u8]) -> Vec<u8> {
        let mut enc = Base64Encoder::new();
        let mut out = Vec::new();
        enc.step(input, &mut out);
        enc.close(&mut out);
        out
    }

    fn decode_all(input: &[u8]) -> Vec<u8> {
        let mut dec = Base64Decoder::new();
        let mut out = Vec::new();
        dec.step(input, &mut out);
        out
    }

    #[test]
    fn encode_known_vectors() {
        assert_eq!(encode_all(b""), b"\n");
        assert_eq!(encode_all(b"f"), b"Zg==\n");
        assert_eq!(encode_all(b"fo"), b"Zm8=\n");
        assert_eq!(encode_all(b"foo"), b"Zm9v\n");
        assert_eq!(encode_all(b"hello"), b"aGVsbG8=\n");
    }

    #[test]
    fn encode_wraps_at_76_columns() {
        let input = vec![0u8; 57];
        let out = encode_all(&input);
        assert_eq!(out[76], b'\n');
        assert_eq!(out.len(), 78);
    }

    #[test]
    fn decode_skips_whitespace_and_pads() {
        assert_eq!(decode_all(b"Zm9v\n"), b"foo");
        assert_eq!(decode_all(b"Zm8=\n"), b"fo");
        assert_eq!(decode_all(b"Zg==\n"), b"f");
        assert_eq!(decode_all(b"Z g\t=\r\n="), b"f");
    }

    #[test]
    fn chunking_is_transparent() {
        let input: Vec<u8> = (0u8..=255).collect();
        let whole = encode_all(&input);
        for split in 0..input.len() {
            let mut enc = Base64Encoder::new();
            let mut out = Vec::new();
            enc.step(&input[..split], &mut out);
            enc.step(&input[split..], &mut out);
            enc.close(&mut out);
            assert_eq!(out, whole);
        }
        for split in 0..whole.len() {
            let mut dec = Base64Decoder::new();
            let mut out = Vec::new();
            dec.step(&whole[..split], &mut out);
            dec.step(&whole[split..], &mut out);
            assert_eq!(out, input);
            assert_eq!(dec.pending(), 0);
        }
    }

    #[test]
    fn truncated_quad_is_pending() {
        let mut dec = Base64Decoder::new();
        let mut out = Vec::new();
        dec.step(b"Zm9", &mut out);
        assert!(out.is_empty());
        assert_eq!(dec.pending(), 3);
    }

    #[test]
    fn empty_step_is_noop() {
        let mut enc = Base64Encoder::new();
        let mut out = Vec::new();
        enc.step(b"", &mut out);
        assert!(out.is_empty());
        let mut dec = Base64Decoder::new();
        dec.step(b"", &mut out);
        assert!(out.is_empty());
    }
}
