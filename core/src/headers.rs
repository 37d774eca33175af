/*
 * headers.rs
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

//! RFC 822 header folding and an ordered header collection.

use std::fmt;

use crate::rfc2047;
use crate::stream::{write_string, MemStream, Stream, StreamError};

/// Maximum line length before a header is folded.
pub const FOLD_LEN: usize = 78;

/// Fold a header line onto continuation lines (RFC 822 section 3.1.1).
///
/// Words are packed greedily; a continuation starts with `\n\t`, the one
/// whitespace byte before each fold point is dropped, and a tab in the
/// input is taken as the spot where some earlier mailer folded the line.
/// Words longer than the whole line are cut at the limit.
pub fn fold(input: &str) -> String {
    if input.len() <= FOLD_LEN {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len() + 8);
    let mut rest = input;
    let mut outlen = 0usize;
    let mut last_was_lwsp = false;

    while !rest.is_empty() {
        let len = rest.find([' ', '\t']).unwrap_or(rest.len());

        if outlen + len > FOLD_LEN {
            if last_was_lwsp {
                out.pop();
            }
            out.push_str("\n\t");
            outlen = 1;

            // cut up words too long for any line
            let mut wordlen = len;
            while outlen + wordlen > FOLD_LEN {
                let mut take = FOLD_LEN - outlen;
                while !rest.is_char_boundary(take) {
                    take -= 1;
                }
                out.push_str(&rest[..take]);
                rest = &rest[take..];
                wordlen -= take;
                out.push_str("\n\t");
                outlen = 1;
            }
            last_was_lwsp = false;
        } else if len > 0 {
            out.push_str(&rest[..len]);
            rest = &rest[len..];
            outlen += len;
            last_was_lwsp = false;
        } else if rest.as_bytes()[0] == b'\t' {
            // tabs are a good place to fold, odds are that this is where
            // the previous mailer folded it
            out.push_str("\n\t");
            outlen = 1;
            rest = &rest[1..];
            last_was_lwsp = false;
        } else {
            out.push(' ');
            outlen += 1;
            rest = &rest[1..];
            last_was_lwsp = true;
        }
    }

    out
}

/// Serializer for one header; writes the whole "name: value" line(s) and
/// returns the number of bytes written.
pub type HeaderWriter = fn(&mut dyn Stream, &str, &str) -> Result<usize, StreamError>;

/// Fold-and-write serializer used for any header without an override.
pub fn default_writer(stream: &mut dyn Stream, name: &str, value: &str) -> Result<usize, StreamError> {
    let folded = fold(&format!("{}: {}", name, value));
    let mut written = write_string(stream, &folded)?;
    written += write_string(stream, "\n")?;
    Ok(written)
}

/// Per-header-name serializer overrides, consulted by name
/// case-insensitively when writing a header collection out.
#[derive(Default)]
pub struct HeaderWriters {
    writers: Vec<(String, HeaderWriter)>,
}

impl HeaderWriters {
    pub fn new() -> HeaderWriters {
        HeaderWriters::default()
    }

    /// Register `writer` for headers named `name`, replacing any previous
    /// override for that name.
    pub fn register(&mut self, name: &str, writer: HeaderWriter) {
        for entry in self.writers.iter_mut() {
            if entry.0.eq_ignore_ascii_case(name) {
                entry.1 = writer;
                return;
            }
        }
        self.writers.push((name.to_string(), writer));
    }

    fn lookup(&self, name: &str) -> HeaderWriter {
        for (n, writer) in &self.writers {
            if n.eq_ignore_ascii_case(name) {
                return *writer;
            }
        }
        default_writer
    }
}

struct Header {
    name: String,
    value: Option<String>,
}

/// Ordered collection of message headers with case-insensitive lookup.
///
/// Values are RFC 2047 encoded as they are stored, so `get` returns wire
/// form. A header may be given a `None` value to reserve its position
/// before the value is known; such headers are skipped when writing.
#[derive(Default)]
pub struct HeaderMap {
    headers: Vec<Header>,
}

impl HeaderMap {
    pub fn new() -> HeaderMap {
        HeaderMap::default()
    }

    /// Set the value of the first header named `name`, appending the
    /// header if it does not exist yet.
    pub fn set(&mut self, name: &str, value: Option<&str>) {
        let value = value.map(rfc2047::header_encode);
        for header in self.headers.iter_mut() {
            if header.name.eq_ignore_ascii_case(name) {
                header.value = value;
                return;
            }
        }
        self.headers.push(Header { name: name.to_string(), value });
    }

    /// Append a header, keeping any existing headers of the same name.
    pub fn add(&mut self, name: &str, value: Option<&str>) {
        self.headers.push(Header {
            name: name.to_string(),
            value: value.map(rfc2047::header_encode),
        });
    }

    /// Value of the first header named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .and_then(|h| h.value.as_deref())
    }

    /// Remove the first header named `name`.
    pub fn remove(&mut self, name: &str) {
        if let Some(pos) = self
            .headers
            .iter()
            .position(|h| h.name.eq_ignore_ascii_case(name))
        {
            self.headers.remove(pos);
        }
    }

    /// Headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.headers
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Write all headers with values to `stream`, folding each line,
    /// consulting `writers` for per-name overrides. Returns the number of
    /// bytes written.
    pub fn write_to_stream(
        &self,
        stream: &mut dyn Stream,
        writers: &HeaderWriters,
    ) -> Result<usize, StreamError> {
        let mut written = 0;
        for header in &self.headers {
            if let Some(value) = &header.value {
                let writer = writers.lookup(&header.name);
                written += writer(stream, &header.name, value)?;
            }
        }
        Ok(written)
    }
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stream = MemStream::new();
        let writers = HeaderWriters::new();
        self.write_to_stream(&mut stream, &writers)
            .map_err(|_| fmt::Error)?;
        stream.reset().map_err(|_| fmt::Error)?;
        let mut bytes = Vec::new();
        let mut buf = [0u8; 512];
        loop {
            let n = stream.read(&mut buf).map_err(|_| fmt::Error)?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&buf[..n]);
        }
        f.write_str(&String::from_utf8_lossy(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_header_is_unchanged() {
        let line = "Subject: hello world";
        assert_eq!(fold(line), line);
    }

    #[test]
    fn folded_lines_stay_under_limit() {
        let value = "word ".repeat(40);
        let folded = fold(&format!("Subject: {}", value.trim_end()));
        for line in folded.split('\n') {
            assert!(line.len() <= FOLD_LEN, "line too long: {:?}", line);
        }
    }

    #[test]
    fn folded_header_rejoins_to_original() {
        let line = format!("Subject: {}", "word ".repeat(40).trim_end());
        let folded = fold(&line);
        assert_ne!(folded, line);
        assert_eq!(folded.replace("\n\t", " "), line);
    }

    #[test]
    fn overlong_word_is_hard_split() {
        let line = format!("X-Blob: {}", "a".repeat(200));
        let folded = fold(&line);
        for part in folded.split('\n') {
            assert!(part.len() <= FOLD_LEN);
        }
        // the space before the fold point is dropped
        assert_eq!(folded.replace("\n\t", ""), line.replacen(' ', "", 1));
    }

    #[test]
    fn tab_is_a_preferred_fold_point() {
        let line = format!("X-Long: {}\tmore text at the end of a line {}", "a".repeat(60), "b".repeat(10));
        let folded = fold(&line);
        assert!(folded.contains("\n\tmore"));
    }

    #[test]
    fn map_set_get_remove() {
        crate::init(true);
        let mut headers = HeaderMap::new();
        headers.set("Subject", Some("hello"));
        headers.set("From", Some("fred@example.com"));
        assert_eq!(headers.get("subject"), Some("hello"));
        headers.set("SUBJECT", Some("replaced"));
        assert_eq!(headers.get("Subject"), Some("replaced"));
        assert_eq!(headers.len(), 2);
        headers.remove("subject");
        assert_eq!(headers.get("Subject"), None);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn add_keeps_duplicates_in_order() {
        crate::init(true);
        let mut headers = HeaderMap::new();
        headers.add("Received", Some("first"));
        headers.add("Received", Some("second"));
        assert_eq!(headers.get("Received"), Some("first"));
        assert_eq!(headers.len(), 2);
        let names: Vec<_> = headers.iter().map(|(_, v)| v.unwrap()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn values_are_encoded_on_insertion() {
        crate::init(true);
        let mut headers = HeaderMap::new();
        headers.set("Subject", Some("caf\u{e9}"));
        let stored = headers.get("Subject").unwrap();
        assert!(stored.is_ascii());
        assert_eq!(rfc2047::header_decode(stored), "caf\u{e9}");
    }

    #[test]
    fn placeholder_headers_are_not_written() {
        crate::init(true);
        let mut headers = HeaderMap::new();
        headers.set("Subject", None);
        headers.set("From", Some("fred@example.com"));
        assert_eq!(headers.to_string(), "From: fred@example.com\n");
    }

    #[test]
    fn writer_override_is_used() {
        crate::init(true);
        fn shout(stream: &mut dyn Stream, name: &str, value: &str) -> Result<usize, StreamError> {
            write_string(stream, &format!("{}: {}!\n", name, value.to_uppercase()))
        }
        let mut writers = HeaderWriters::new();
        writers.register("X-Loud", shout);

        let mut headers = HeaderMap::new();
        headers.set("X-Loud", Some("hello"));
        headers.set("X-Quiet", Some("hello"));

        let mut stream = MemStream::new();
        headers.write_to_stream(&mut stream, &writers).unwrap();
        stream.reset().unwrap();
        let mut buf = [0u8; 256];
        let n = stream.read(&mut buf).unwrap();
        assert_eq!(
            std::str::from_utf8(&buf[..n]).unwrap(),
            "X-Loud: HELLO!\nX-Quiet: hello\n"
        );
    }
}
