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

//! Seekable, bounded byte-stream abstraction shared by every MIME component.
//! Substreams address the same backend bytes as their source stream through
//! a shared handle; they never copy.

use std::fmt;

mod file;
mod mem;

pub use file::FileStream;
pub use mem::MemStream;

/// Origin for a seek operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Whence {
    /// From the start of the stream (absolute offset).
    Set,
    /// Relative to the current position.
    Cur,
    /// Relative to the end bound (or the backend extent when unbounded).
    End,
}

/// Errors from stream operations.
#[derive(Debug)]
pub enum StreamError {
    /// The stream or its backend resource has already been closed.
    Closed,
    /// An access outside the configured bounds.
    OutOfBounds,
    /// An error from the underlying OS resource.
    Io(std::io::Error),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Closed => write!(f, "stream is closed"),
            StreamError::OutOfBounds => write!(f, "access outside stream bounds"),
            StreamError::Io(e) => write!(f, "stream i/o error: {}", e),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(e: std::io::Error) -> Self {
        StreamError::Io(e)
    }
}

/// Bounded, seekable byte stream over some backend resource.
///
/// Every stream carries a position and a byte window `[bound_start,
/// bound_end)`; `bound_end` of `None` means unbounded (the window grows with
/// the backend). Reads and writes are clipped to the window and never touch
/// bytes outside it. A substream shares the backend with its source stream,
/// so mutations through either are visible to both.
pub trait Stream {
    /// Read up to `buf.len()` bytes at the current position, clipped to the
    /// end bound. `Ok(0)` means end of stream; a position past the bound is
    /// an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;

    /// Write up to `buf.len()` bytes at the current position. Unbounded
    /// streams may grow the backend; bounded streams clip to the bound, and
    /// writing with no room left is an error.
    fn write(&mut self, buf: &[u8]) -> Result<usize, StreamError>;

    /// Flush buffered writes to the backend.
    fn flush(&mut self) -> Result<(), StreamError>;

    /// Close this stream. Only the stream that created the backend releases
    /// the resource; a substream only drops its handle. Closing twice is an
    /// error.
    fn close(&mut self) -> Result<(), StreamError>;

    /// True when the position has reached the end bound (or the backend
    /// reports no more data, for unbounded streams).
    fn eos(&self) -> bool;

    /// Rewind the position to the start bound.
    fn reset(&mut self) -> Result<(), StreamError>;

    /// Reposition the stream; the result is clamped to the bounds. Returns
    /// the new position relative to the start bound.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError>;

    /// Current position, relative to the start bound.
    fn tell(&self) -> u64;

    /// Length of the addressable window (`bound_end - bound_start`, or the
    /// backend extent minus `bound_start` when unbounded).
    fn length(&self) -> Result<u64, StreamError>;

    /// Derive a new stream over `[start, end)` of the same backend. The
    /// substream has its own position and bounds but addresses the same
    /// bytes; it holds a shared handle that keeps the backend alive.
    fn substream(&self, start: u64, end: Option<u64>) -> Result<Box<dyn Stream>, StreamError>;

    /// Replace the bounds; the position is clamped into the new window.
    fn set_bounds(&mut self, start: u64, end: Option<u64>);
}

/// Copy everything from `src`'s current position to its end bound into
/// `dst`. Returns the number of bytes copied.
pub fn copy(src: &mut dyn Stream, dst: &mut dyn Stream) -> Result<u64, StreamError> {
    let mut buf = [0u8; 4096];
    let mut total = 0u64;

    while !src.eos() {
        let nread = src.read(&mut buf)?;
        if nread == 0 {
            break;
        }
        let mut nwritten = 0;
        while nwritten < nread {
            let n = dst.write(&buf[nwritten..nread])?;
            if n == 0 {
                return Err(StreamError::OutOfBounds);
            }
            nwritten += n;
        }
        total += nwritten as u64;
    }

    Ok(total)
}

/// Write the whole of `s` to the stream.
pub fn write_string(stream: &mut dyn Stream, s: &str) -> Result<usize, StreamError> {
    let bytes = s.as_bytes();
    let mut nwritten = 0;
    while nwritten < bytes.len() {
        let n = stream.write(&bytes[nwritten..])?;
        if n == 0 {
            return Err(StreamError::OutOfBounds);
        }
        nwritten += n;
    }
    Ok(nwritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_bounded_source() {
        let mut src = MemStream::with_buffer(b"0123456789");
        src.set_bounds(2, Some(7));
        src.reset().unwrap();
        let mut dst = MemStream::new();
        let n = copy(&mut src, &mut dst).unwrap();
        assert_eq!(n, 5);
        dst.reset().unwrap();
        let mut buf = [0u8; 16];
        let nread = dst.read(&mut buf).unwrap();
        assert_eq!(&buf[..nread], b"23456");
    }

    #[test]
    fn write_string_grows_mem_stream() {
        let mut s = MemStream::new();
        write_string(&mut s, "hello world").unwrap();
        assert_eq!(s.tell(), 11);
        assert_eq!(s.length().unwrap(), 11);
    }
}
