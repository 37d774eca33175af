/*
 * utils.rs
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

//! Quoted-string handling for structured header values (RFC 2045).

/// RFC 2045 tspecials.
fn is_tspecial(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?' | '='
    )
}

/// A string needs quoting when it contains a tspecial (or a dot) outside
/// any quoted section it already carries.
fn need_quotes(s: &str) -> bool {
    let mut quoted = false;
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == '"' {
            quoted = !quoted;
        } else if !quoted && (is_tspecial(c) || c == '.') {
            return true;
        }
    }
    false
}

/// Quote `s` if it contains characters that would break a structured
/// header value, escaping embedded quotes and backslashes.
pub fn quote_string(s: &str) -> String {
    let quote = need_quotes(s);
    let mut out = String::with_capacity(s.len() + 2);
    if quote {
        out.push('"');
    }
    for c in s.chars() {
        if (c == '"' && quote) || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    if quote {
        out.push('"');
    }
    out
}

/// Strip wrapping quotes and unescape backslash sequences.
pub fn unquote_string(s: &str) -> String {
    let inner = if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_word_is_unchanged() {
        assert_eq!(quote_string("token"), "token");
        assert_eq!(quote_string("two words"), "two words");
    }

    #[test]
    fn tspecials_force_quotes() {
        assert_eq!(quote_string("fred@example"), "\"fred@example\"");
        assert_eq!(quote_string("a.b"), "\"a.b\"");
        assert_eq!(quote_string("say \"hi\""), "say \"hi\"");
    }

    #[test]
    fn embedded_backslash_is_escaped() {
        assert_eq!(quote_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn quote_unquote_round_trip() {
        for s in ["token", "fred@example", "a.b.c", "back\\slash", "mixed @ \"q\""] {
            assert_eq!(unquote_string(&quote_string(s)), s);
        }
    }

    #[test]
    fn unquote_strips_wrapping_quotes() {
        assert_eq!(unquote_string("\"hello world\""), "hello world");
        assert_eq!(unquote_string("\\\"literal\\\""), "\"literal\"");
    }
}
