/*
 * date.rs
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

//! RFC 822 date parsing and formatting.
//!
//! Parsing is two-pass: a strict positional parse for well-formed dates,
//! then a forgiving single-pass scan that assigns each token to the first
//! field it could plausibly fill. Dates are advisory metadata, so an
//! unparseable string yields `(0, 0)` rather than an error.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};

const NON_NUMERIC: u8 = 1 << 0;
const NON_WEEKDAY: u8 = 1 << 1;
const NON_MONTH: u8 = 1 << 2;
const NON_TIME: u8 = 1 << 3;
const HAS_COLON: u8 = 1 << 4;
const NON_TIMEZONE_ALPHA: u8 = 1 << 5;
const NON_TIMEZONE_NUMERIC: u8 = 1 << 6;
const HAS_SIGN: u8 = 1 << 7;

const NUMERIC_CHARS: &[u8] = b"1234567890";
const WEEKDAY_CHARS: &[u8] = b"SundayMondayTuesdayWednesdayThursdayFridaySaturday";
const MONTH_CHARS: &[u8] =
    b"JanuaryFebruaryMarchAprilMayJuneJulyAugustSeptemberOctoberNovemberDecember";
const TIMEZONE_ALPHA_CHARS: &[u8] = b"UTCGMTESTEDTCSTCDTMSTPSTPDTZAMNY()";
const TIMEZONE_NUMERIC_CHARS: &[u8] = b"-+1234567890";
const TIME_CHARS: &[u8] = b"1234567890:";

const fn in_set(set: &[u8], c: u8) -> bool {
    let mut i = 0;
    while i < set.len() {
        if set[i] == c {
            return true;
        }
        i += 1;
    }
    false
}

/// Per-byte classification used to give each token a mask of the date
/// fields it could not possibly be.
const DATETOK_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let c = i as u8;
        if !in_set(NUMERIC_CHARS, c) {
            table[i] |= NON_NUMERIC;
        }
        if !in_set(WEEKDAY_CHARS, c) {
            table[i] |= NON_WEEKDAY;
        }
        if !in_set(MONTH_CHARS, c) {
            table[i] |= NON_MONTH;
        }
        if !in_set(TIME_CHARS, c) {
            table[i] |= NON_TIME;
        }
        if !in_set(TIMEZONE_ALPHA_CHARS, c) {
            table[i] |= NON_TIMEZONE_ALPHA;
        }
        if !in_set(TIMEZONE_NUMERIC_CHARS, c) {
            table[i] |= NON_TIMEZONE_NUMERIC;
        }
        if c == b':' {
            table[i] |= HAS_COLON;
        }
        if c == b'+' || c == b'-' {
            table[i] |= HAS_SIGN;
        }
        i += 1;
    }
    table
};

/* legacy RFC 822 zone names; comparisons are case sensitive */
const TZ_OFFSETS: [(&str, i32); 15] = [
    ("UT", 0),
    ("GMT", 0),
    ("EST", -500),
    ("EDT", -400),
    ("CST", -600),
    ("CDT", -500),
    ("MST", -700),
    ("MDT", -600),
    ("PST", -800),
    ("PDT", -700),
    ("Z", 0),
    ("A", -100),
    ("M", -1200),
    ("N", 100),
    ("Y", 1200),
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    mask: u8,
}

fn is_separator(c: u8) -> bool {
    matches!(c, b'-' | b'/' | b',' | b'\t' | b'\r' | b'\n' | b' ')
}

fn datetok(input: &str) -> Vec<Token<'_>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let start = pos;
        let mut mask = 0u8;
        while pos < bytes.len() && !is_separator(bytes[pos]) {
            mask |= DATETOK_TABLE[bytes[pos] as usize];
            pos += 1;
        }
        if pos > start {
            tokens.push(Token { text: &input[start..pos], mask });
        }
        if pos < bytes.len() {
            pos += 1;
        }
    }

    tokens
}

fn is_numeric(t: &Token<'_>) -> bool {
    t.mask & NON_NUMERIC == 0
}

fn is_weekday(t: &Token<'_>) -> bool {
    t.mask & NON_WEEKDAY == 0
}

fn is_month(t: &Token<'_>) -> bool {
    t.mask & NON_MONTH == 0
}

fn is_time(t: &Token<'_>) -> bool {
    t.mask & NON_TIME == 0 && t.mask & HAS_COLON != 0
}

fn is_tzone(t: &Token<'_>) -> bool {
    t.mask & NON_TIMEZONE_ALPHA == 0
        || (t.mask & NON_TIMEZONE_NUMERIC == 0 && t.mask & HAS_SIGN != 0)
}

fn decode_int(text: &str) -> Option<i32> {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let mut val = 0i32;
    for c in digits.bytes() {
        if !c.is_ascii_digit() {
            return None;
        }
        val = val.wrapping_mul(10).wrapping_add((c - b'0') as i32);
    }
    Some(val * sign)
}

fn get_wday(text: &str) -> Option<usize> {
    if text.len() < 3 {
        return None;
    }
    let head = &text.as_bytes()[..3];
    DAYS.iter()
        .position(|d| head.eq_ignore_ascii_case(d.as_bytes()))
}

fn get_mday(text: &str) -> Option<i32> {
    match decode_int(text) {
        Some(n) if (0..=31).contains(&n) => Some(n),
        _ => None,
    }
}

fn get_month(text: &str) -> Option<i32> {
    if text.len() < 3 {
        return None;
    }
    let head = &text.as_bytes()[..3];
    MONTHS
        .iter()
        .position(|m| head.eq_ignore_ascii_case(m.as_bytes()))
        .map(|n| n as i32)
}

fn get_year(text: &str) -> Option<i32> {
    let mut year = decode_int(text)?;
    if year < 100 {
        year += if year < 70 { 2000 } else { 1900 };
    }
    if year < 1969 {
        return None;
    }
    Some(year)
}

fn get_time(text: &str) -> Option<(i32, i32, i32)> {
    let mut fields = [0i32; 3];
    let mut colons = 0;
    for c in text.bytes() {
        if c == b':' {
            colons += 1;
            if colons > 2 {
                return None;
            }
        } else if !c.is_ascii_digit() {
            return None;
        } else {
            fields[colons] = fields[colons] * 10 + (c - b'0') as i32;
        }
    }
    Some((fields[0], fields[1], fields[2]))
}

/// Scan up to two tokens for a timezone: a signed numeric offset or a
/// legacy zone name, possibly wrapped in comment parens.
fn get_tzone(tokens: &[Token<'_>]) -> Option<i32> {
    for token in tokens.iter().take(2) {
        let text = token.text;
        if text.starts_with('+') || text.starts_with('-') {
            return decode_int(text);
        }
        let mut name = text;
        if let Some(rest) = name.strip_prefix('(') {
            name = rest.strip_suffix(')').unwrap_or(rest);
        }
        for (zone, offset) in &TZ_OFFSETS {
            if *zone == name {
                return Some(*offset);
            }
        }
    }
    None
}

/// Calendar fields to a UTC timestamp, normalizing out-of-range values
/// the way mktime does. `year` is relative to 1900, `mon` zero-based.
fn to_timestamp(year: i32, mon: i32, mday: i32, hour: i32, min: i32, sec: i32) -> Option<i64> {
    let year = year + 1900 + mon.div_euclid(12);
    let month = mon.rem_euclid(12) as u32 + 1;
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    let dt = date
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(mday as i64 - 1))?
        .checked_add_signed(Duration::seconds(
            hour as i64 * 3600 + min as i64 * 60 + sec as i64,
        ))?;
    Some(dt.and_utc().timestamp())
}

fn apply_offset(time: i64, offset: i32) -> i64 {
    time - ((offset / 100) as i64 * 3600 + (offset % 100) as i64 * 60)
}

/// Strict positional parse: `[weekday,] mday month year time [tzone]`.
fn parse_rfc822(tokens: &[Token<'_>]) -> Option<(i64, i32)> {
    let mut i = 0;

    // not all dates carry the weekday
    if get_wday(tokens.first()?.text).is_some() {
        i += 1;
    }

    let mday = get_mday(tokens.get(i)?.text)?;
    i += 1;
    let mon = get_month(tokens.get(i)?.text)?;
    i += 1;
    let year = get_year(tokens.get(i)?.text)?;
    i += 1;
    let (hour, min, sec) = get_time(tokens.get(i)?.text)?;
    i += 1;

    let offset = get_tzone(&tokens[i.min(tokens.len())..]).unwrap_or(0);

    let time = to_timestamp(year - 1900, mon, mday, hour, min, sec)?;
    Some((apply_offset(time, offset), offset))
}

/// Forgiving parse for the dates strict parsing rejects: every token is
/// assigned to the first still-empty field it could fill. Bare numbers
/// fall to the month when one has not been seen, the day, then a
/// two-digit year, in that order.
fn parse_broken(tokens: &[Token<'_>]) -> Option<(i64, i32)> {
    let mut got_wday = false;
    let mut got_month = false;
    let mut got_tzone = false;
    let mut matched = false;

    let mut year = 0i32; // relative to 1900
    let mut mon = 0i32;
    let mut mday = 0i32;
    let (mut hour, mut min, mut sec) = (0i32, 0i32, 0i32);
    let mut offset = 0i32;

    let mut i = 0;
    'scan: while i < tokens.len() {
        let token = &tokens[i];

        'claim: {
            if is_weekday(token) && !got_wday && get_wday(token.text).is_some() {
                got_wday = true;
                break 'claim;
            }

            if is_month(token) && !got_month {
                if let Some(n) = get_month(token.text) {
                    got_month = true;
                    mon = n;
                    break 'claim;
                }
            }

            if is_time(token) && hour == 0 && min == 0 && sec == 0 {
                if let Some((h, m, s)) = get_time(token.text) {
                    hour = h;
                    min = m;
                    sec = s;
                    break 'claim;
                }
            }

            if is_tzone(token) && !got_tzone {
                if let Some(n) = get_tzone(&tokens[i..]) {
                    got_tzone = true;
                    offset = n;
                    break 'claim;
                }
            }

            if is_numeric(token) {
                if token.text.len() == 4 && year == 0 {
                    if let Some(n) = get_year(token.text) {
                        year = n - 1900;
                        break 'claim;
                    }
                } else if !got_month
                    && !got_wday
                    && tokens.get(i + 1).is_some_and(is_numeric)
                {
                    if let Some(n) = decode_int(token.text) {
                        got_month = true;
                        mon = n - 1;
                        break 'claim;
                    }
                } else if mday == 0 {
                    if let Some(n) = get_mday(token.text) {
                        mday = n;
                        break 'claim;
                    }
                } else if year == 0 {
                    year = get_year(token.text).unwrap_or(-1) - 1900;
                    break 'claim;
                }
            }

            i += 1;
            continue 'scan;
        }

        matched = true;
        i += 1;
    }

    if !matched {
        return None;
    }

    let time = to_timestamp(year, mon, mday, hour, min, sec)?;
    Some((apply_offset(time, offset), offset))
}

/// Parse an RFC 822 date header value into a unix timestamp and the
/// timezone offset it declared (as +-HHMM, e.g. -500 for -0500). Returns
/// `(0, 0)` when nothing date-like can be extracted.
pub fn decode_date(input: &str) -> (i64, i32) {
    let tokens = datetok(input);
    if tokens.is_empty() {
        return (0, 0);
    }
    if let Some(parsed) = parse_rfc822(&tokens) {
        return parsed;
    }
    parse_broken(&tokens).unwrap_or((0, 0))
}

/// Format a timestamp and timezone offset as an RFC 822 date string.
pub fn format_date(time: i64, offset: i32) -> String {
    let local = time + (offset / 100) as i64 * 3600 + (offset % 100) as i64 * 60;
    let dt = DateTime::<Utc>::from_timestamp(local, 0).unwrap_or(DateTime::UNIX_EPOCH);
    format!(
        "{}, {:02} {} {:04} {:02}:{:02}:{:02} {}{:04}",
        DAYS[dt.weekday().num_days_from_sunday() as usize],
        dt.day(),
        MONTHS[dt.month0() as usize],
        dt.year(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        if offset < 0 { '-' } else { '+' },
        offset.abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2001-01-01T00:00:00Z
    const Y2001: i64 = 978307200;

    #[test]
    fn strict_rfc822_date() {
        assert_eq!(decode_date("Mon, 01 Jan 2001 00:00:00 +0000"), (Y2001, 0));
    }

    #[test]
    fn two_digit_year_and_zone_name() {
        assert_eq!(decode_date("1 Jan 01 00:00:00 GMT"), (Y2001, 0));
    }

    #[test]
    fn broken_date_year_first() {
        assert_eq!(decode_date("2001 Jan 1 00:00:00"), (Y2001, 0));
    }

    #[test]
    fn numeric_offsets_shift_the_timestamp() {
        let (east, east_off) = decode_date("Mon, 01 Jan 2001 05:30:00 +0530");
        assert_eq!(east, Y2001);
        assert_eq!(east_off, 530);
        let (west, west_off) = decode_date("Sun, 31 Dec 2000 19:00:00 -0500");
        assert_eq!(west, Y2001);
        assert_eq!(west_off, -500);
    }

    #[test]
    fn legacy_zone_names() {
        let (t, off) = decode_date("Sun, 31 Dec 2000 16:00:00 PST");
        assert_eq!(off, -800);
        assert_eq!(t, Y2001);
    }

    #[test]
    fn missing_zone_means_utc() {
        assert_eq!(decode_date("Mon, 01 Jan 2001 00:00:00"), (Y2001, 0));
    }

    #[test]
    fn unparseable_is_zero() {
        assert_eq!(decode_date("not a date"), (0, 0));
        assert_eq!(decode_date(""), (0, 0));
    }

    #[test]
    fn numeric_month_heuristic() {
        // month/day/year with numeric month only works when the month
        // comes before the other numbers
        let (t, _) = decode_date("01 02 2001 00:00:00");
        let (expect, _) = decode_date("Tue, 02 Jan 2001 00:00:00 +0000");
        assert_eq!(t, expect);
    }

    #[test]
    fn format_round_trip() {
        // 2025-01-01T00:00:00Z
        let time = 1735689600;
        for offset in [0, 530, -500, 1200] {
            let formatted = format_date(time, offset);
            assert_eq!(decode_date(&formatted), (time, offset));
        }
    }

    #[test]
    fn format_known_value() {
        assert_eq!(
            format_date(Y2001, -500),
            "Sun, 31 Dec 2000 19:00:00 -0500"
        );
    }
}
