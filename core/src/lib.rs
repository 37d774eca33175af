/*
 * lib.rs
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

//! Streaming MIME primitives: bounded byte streams, incremental transfer
//! encodings (RFC 2045), RFC 2047 header text, and RFC 822 dates.

pub mod charset;
pub mod date;
pub mod encoding;
pub mod headers;
pub mod rfc2047;
pub mod stream;
pub mod utils;

use std::sync::OnceLock;

static UNICODE_INTERFACES: OnceLock<bool> = OnceLock::new();

/// One-time library initialization. When `unicode` is true, header text
/// processing converts decoded bytes to UTF-8 through the charset layer;
/// when false, bytes are carried through losslessly as single code points.
/// Must be called before any header text operation; subsequent calls are
/// ignored.
pub fn init(unicode: bool) {
    let _ = UNICODE_INTERFACES.set(unicode);
}

/// Whether init() selected Unicode-aware header text processing.
/// Defaults to false when init() was never called.
pub(crate) fn unicode_interfaces() -> bool {
    UNICODE_INTERFACES.get().copied().unwrap_or(false)
}
