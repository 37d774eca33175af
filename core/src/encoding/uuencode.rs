/*
 * uuencode.rs
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

//! Incremental uuencode codec. Lines carry up to 45 decoded bytes behind a
//! length prefix; the `begin`/`end` envelope lines are the caller's
//! business.

/// Encode a 6-bit value; 0 maps to '`' rather than space.
fn uu_char(c: u8) -> u8 {
    if c == 0 {
        b'`'
    } else {
        c + 0x20
    }
}

/// Rank of an encoded byte. Maps both '`' and ' ' to 0.
fn uu_rank(c: u8) -> u8 {
    c.wrapping_sub(0x20) & 0x3f
}

/// Streaming uuencoder. Buffers encoded quads until a full 45-byte line is
/// ready; carries up to two raw bytes between steps.
pub struct UuEncoder {
    saved: u32,
    nsaved: usize,
    line: [u8; 60],
    linelen: usize,
}

impl Default for UuEncoder {
    fn default() -> UuEncoder {
        UuEncoder {
            saved: 0,
            nsaved: 0,
            line: [0; 60],
            linelen: 0,
        }
    }
}

impl UuEncoder {
    pub fn new() -> UuEncoder {
        UuEncoder::default()
    }

    fn encode_group(&mut self) {
        let idx = (self.linelen / 3) * 4;
        let b0 = (self.saved >> 16) as u8;
        let b1 = (self.saved >> 8) as u8;
        let b2 = self.saved as u8;
        self.line[idx] = uu_char((b0 >> 2) & 0x3f);
        self.line[idx + 1] = uu_char(((b0 << 4) | ((b1 >> 4) & 0xf)) & 0x3f);
        self.line[idx + 2] = uu_char(((b1 << 2) | ((b2 >> 6) & 0x3)) & 0x3f);
        self.line[idx + 3] = uu_char(b2 & 0x3f);
        self.saved = 0;
        self.nsaved = 0;
        self.linelen += 3;
    }

    /// Encode a chunk, appending any completed lines to `out`.
    pub fn step(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &b in input {
            self.saved = (self.saved << 8) | b as u32;
            self.nsaved += 1;
            if self.nsaved == 3 {
                self.encode_group();
                if self.linelen >= 45 {
                    out.push(uu_char(45));
                    out.extend_from_slice(&self.line);
                    out.push(b'\n');
                    self.linelen = 0;
                }
            }
        }
    }

    /// Flush the partial line (zero padded) and emit the zero-length
    /// terminator line. Resets to a fresh encoder.
    pub fn close(&mut self, out: &mut Vec<u8>) {
        let mut fill = 0;
        if self.nsaved > 0 {
            while self.nsaved < 3 {
                self.saved <<= 8;
                self.nsaved += 1;
                fill += 1;
            }
            self.encode_group();
        }
        if self.linelen > 0 {
            let nchars = (self.linelen / 3) * 4;
            out.push(uu_char((self.linelen - fill) as u8));
            out.extend_from_slice(&self.line[..nchars]);
            out.push(b'\n');
            self.linelen = 0;
        }
        out.push(uu_char(0));
        out.push(b'\n');
        self.saved = 0;
        self.nsaved = 0;
    }
}

/// Streaming uudecoder. The first byte of each line declares how many
/// decoded bytes the line carries; a zero-length line ends the data, after
/// which further input is ignored.
#[derive(Default)]
pub struct UuDecoder {
    saved: u32,
    count: usize,
    line_remaining: i32,
    at_line_start: bool,
    done: bool,
}

impl UuDecoder {
    pub fn new() -> UuDecoder {
        UuDecoder::default()
    }

    /// Decode a chunk, appending output to `out`. Input after the
    /// terminator line is ignored.
    pub fn step(&mut self, input: &[u8], out: &mut Vec<u8>) {
        if self.done {
            return;
        }
        for &b in input {
            if b == b'\n' {
                self.at_line_start = true;
                continue;
            }
            if self.line_remaining == 0 || self.at_line_start {
                self.line_remaining = uu_rank(b) as i32;
                self.at_line_start = false;
                if self.line_remaining == 0 {
                    self.done = true;
                    break;
                }
                continue;
            }
            if self.line_remaining < 0 {
                // garbage past the declared line length
                break;
            }
            self.saved = (self.saved << 8) | b as u32;
            self.count += 1;
            if self.count == 4 {
                let b0 = uu_rank((self.saved >> 24) as u8);
                let b1 = uu_rank((self.saved >> 16) as u8);
                let b2 = uu_rank((self.saved >> 8) as u8);
                let b3 = uu_rank(self.saved as u8);
                if self.line_remaining >= 3 {
                    out.push((b0 << 2) | (b1 >> 4));
                    out.push((b1 << 4) | (b2 >> 2));
                    out.push((b2 << 6) | b3);
                } else {
                    if self.line_remaining >= 1 {
                        out.push((b0 << 2) | (b1 >> 4));
                    }
                    if self.line_remaining >= 2 {
                        out.push((b1 << 4) | (b2 >> 2));
                    }
                }
                self.saved = 0;
                self.count = 0;
                self.line_remaining -= 3;
            }
        }
    }

    /// True once the zero-length terminator line has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(input: &[u8]) -> Vec<u8> {
        let mut enc = UuEncoder::new();
        let mut out = Vec::new();
        enc.step(input, &mut out);
        enc.close(&mut out);
        out
    }

    fn decode_all(input: &[u8]) -> Vec<u8> {
        let mut dec = UuDecoder::new();
        let mut out = Vec::new();
        dec.step(input, &mut out);
        out
    }

    #[test]
    fn known_vector() {
        assert_eq!(encode_all(b"Cat"), b"#0V%T\n`\n");
        assert_eq!(decode_all(b"#0V%T\n`\n"), b"Cat");
    }

    #[test]
    fn empty_input_is_terminator_only() {
        assert_eq!(encode_all(b""), b"`\n");
        assert_eq!(decode_all(b"`\n"), b"");
    }

    #[test]
    fn boundary_lengths_round_trip() {
        for len in [0usize, 1, 2, 3, 44, 45, 46, 90, 91] {
            let input: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            let encoded = encode_all(&input);
            assert_eq!(decode_all(&encoded), input, "len {}", len);
        }
    }

    #[test]
    fn full_lines_carry_45_bytes() {
        let input = vec![0xaau8; 90];
        let encoded = encode_all(&input);
        let lines: Vec<&[u8]> = encoded.split(|&c| c == b'\n').collect();
        assert_eq!(lines[0][0], uu_char(45));
        assert_eq!(lines[0].len(), 61);
        assert_eq!(lines[1][0], uu_char(45));
        assert_eq!(lines[2], b"`");
    }

    #[test]
    fn terminator_is_sticky() {
        let mut dec = UuDecoder::new();
        let mut out = Vec::new();
        dec.step(b"`\n#0V%T\n", &mut out);
        assert!(out.is_empty());
        assert!(dec.is_done());
        dec.step(b"#0V%T\n", &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn chunking_is_transparent() {
        let input: Vec<u8> = (0..100u8).collect();
        let whole = encode_all(&input);
        for split in 0..input.len() {
            let mut enc = UuEncoder::new();
            let mut out = Vec::new();
            enc.step(&input[..split], &mut out);
            enc.step(&input[split..], &mut out);
            enc.close(&mut out);
            assert_eq!(out, whole);
        }
        for split in 0..whole.len() {
            let mut dec = UuDecoder::new();
            let mut out = Vec::new();
            dec.step(&whole[..split], &mut out);
            dec.step(&whole[split..], &mut out);
            assert_eq!(out, input);
        }
    }

    #[test]
    fn empty_step_is_noop() {
        let mut enc = UuEncoder::new();
        let mut out = Vec::new();
        enc.step(b"", &mut out);
        assert!(out.is_empty());
    }
}
