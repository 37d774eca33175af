/*
 * mem.rs
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

//! In-memory stream over a shared growable buffer.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::BytesMut;

use super::{Stream, StreamError, Whence};

/// Stream over a heap buffer. Substreams hold a handle to the same buffer,
/// so writes through one stream are visible through the others. Closing the
/// owning stream releases the buffer for every handle.
pub struct MemStream {
    buffer: Rc<RefCell<Option<BytesMut>>>,
    owner: bool,
    closed: bool,
    position: u64,
    bound_start: u64,
    bound_end: Option<u64>,
}

impl MemStream {
    /// New empty, unbounded stream.
    pub fn new() -> MemStream {
        MemStream {
            buffer: Rc::new(RefCell::new(Some(BytesMut::new()))),
            owner: true,
            closed: false,
            position: 0,
            bound_start: 0,
            bound_end: None,
        }
    }

    /// New unbounded stream initialized with a copy of `data`, positioned at
    /// the start.
    pub fn with_buffer(data: &[u8]) -> MemStream {
        let mut buf = BytesMut::with_capacity(data.len());
        buf.extend_from_slice(data);
        MemStream {
            buffer: Rc::new(RefCell::new(Some(buf))),
            owner: true,
            closed: false,
            position: 0,
            bound_start: 0,
            bound_end: None,
        }
    }

    /// The buffer end used to clip reads when the stream is unbounded.
    fn effective_end(&self, buf_len: u64) -> u64 {
        match self.bound_end {
            Some(end) => end,
            None => buf_len,
        }
    }
}

impl Default for MemStream {
    fn default() -> Self {
        MemStream::new()
    }
}

impl Stream for MemStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let backend = self.buffer.borrow();
        let data = backend.as_ref().ok_or(StreamError::Closed)?;
        let end = self.effective_end(data.len() as u64).min(data.len() as u64);
        if self.position > end {
            return Err(StreamError::OutOfBounds);
        }
        let avail = (end - self.position) as usize;
        let len = buf.len().min(avail);
        let start = self.position as usize;
        buf[..len].copy_from_slice(&data[start..start + len]);
        self.position += len as u64;
        Ok(len)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let mut backend = self.buffer.borrow_mut();
        let data = backend.as_mut().ok_or(StreamError::Closed)?;
        let len = match self.bound_end {
            Some(end) => {
                if self.position >= end {
                    if buf.is_empty() {
                        return Ok(0);
                    }
                    return Err(StreamError::OutOfBounds);
                }
                buf.len().min((end - self.position) as usize)
            }
            None => buf.len(),
        };
        let write_end = self.position as usize + len;
        if write_end > data.len() {
            // zero-fill any gap between the old end and the write position
            data.resize(write_end, 0);
        }
        let start = self.position as usize;
        data[start..write_end].copy_from_slice(&buf[..len]);
        self.position += len as u64;
        Ok(len)
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        if self.closed || self.buffer.borrow().is_none() {
            return Err(StreamError::Closed);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.closed = true;
        if self.owner {
            self.buffer.borrow_mut().take();
        }
        Ok(())
    }

    fn eos(&self) -> bool {
        if self.closed {
            return true;
        }
        let backend = self.buffer.borrow();
        match backend.as_ref() {
            Some(data) => {
                let end = self.effective_end(data.len() as u64).min(data.len() as u64);
                self.position >= end
            }
            None => true,
        }
    }

    fn reset(&mut self) -> Result<(), StreamError> {
        if self.closed || self.buffer.borrow().is_none() {
            return Err(StreamError::Closed);
        }
        self.position = self.bound_start;
        Ok(())
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let backend = self.buffer.borrow();
        let data = backend.as_ref().ok_or(StreamError::Closed)?;
        let end = self.effective_end(data.len() as u64);
        let target = match whence {
            Whence::Set => self.bound_start as i64 + offset,
            Whence::Cur => self.position as i64 + offset,
            Whence::End => end as i64 + offset,
        };
        let clamped = target.max(self.bound_start as i64).min(end as i64) as u64;
        self.position = clamped;
        Ok(self.position - self.bound_start)
    }

    fn tell(&self) -> u64 {
        self.position.saturating_sub(self.bound_start)
    }

    fn length(&self) -> Result<u64, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let backend = self.buffer.borrow();
        let data = backend.as_ref().ok_or(StreamError::Closed)?;
        match self.bound_end {
            Some(end) => Ok(end - self.bound_start),
            None => Ok((data.len() as u64).saturating_sub(self.bound_start)),
        }
    }

    fn substream(&self, start: u64, end: Option<u64>) -> Result<Box<dyn Stream>, StreamError> {
        if self.closed || self.buffer.borrow().is_none() {
            return Err(StreamError::Closed);
        }
        Ok(Box::new(MemStream {
            buffer: Rc::clone(&self.buffer),
            owner: false,
            closed: false,
            position: start,
            bound_start: start,
            bound_end: end,
        }))
    }

    fn set_bounds(&mut self, start: u64, end: Option<u64>) {
        self.bound_start = start;
        self.bound_end = end;
        if self.position < start {
            self.position = start;
        }
        if let Some(end) = end {
            if self.position > end {
                self.position = end;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_respects_end_bound() {
        let mut s = MemStream::with_buffer(b"abcdefgh");
        s.set_bounds(0, Some(4));
        let mut buf = [0u8; 8];
        let n = s.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"abcd");
        assert!(s.eos());
        assert_eq!(s.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn write_past_bound_is_error() {
        let mut s = MemStream::new();
        s.set_bounds(0, Some(3));
        assert_eq!(s.write(b"abcdef").unwrap(), 3);
        assert!(matches!(s.write(b"x"), Err(StreamError::OutOfBounds)));
    }

    #[test]
    fn write_zero_fills_gap_before_position() {
        let mut s = MemStream::new();
        s.set_bounds(4, None);
        s.reset().unwrap();
        s.write(b"xy").unwrap();
        s.set_bounds(0, None);
        s.reset().unwrap();
        let mut buf = [0u8; 8];
        let n = s.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"\0\0\0\0xy");
    }

    #[test]
    fn seek_clamps_to_bounds() {
        let mut s = MemStream::with_buffer(b"0123456789");
        s.set_bounds(2, Some(7));
        assert_eq!(s.seek(100, Whence::Set).unwrap(), 5);
        assert_eq!(s.seek(-100, Whence::Cur).unwrap(), 0);
        assert_eq!(s.seek(0, Whence::End).unwrap(), 5);
        assert_eq!(s.length().unwrap(), 5);
    }

    #[test]
    fn substream_shares_backend_writes() {
        let mut s = MemStream::with_buffer(b"0123456789");
        let mut sub = s.substream(2, Some(7)).unwrap();
        sub.write(b"XY").unwrap();
        let mut buf = [0u8; 10];
        s.reset().unwrap();
        let n = s.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"01XY456789");
    }

    #[test]
    fn owner_close_invalidates_substreams() {
        let mut s = MemStream::with_buffer(b"hello");
        let mut sub = s.substream(0, Some(5)).unwrap();
        s.close().unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(sub.read(&mut buf), Err(StreamError::Closed)));
        assert!(matches!(s.close(), Err(StreamError::Closed)));
    }

    #[test]
    fn substream_close_keeps_backend() {
        let mut s = MemStream::with_buffer(b"hello");
        let mut sub = s.substream(0, Some(5)).unwrap();
        sub.close().unwrap();
        let mut buf = [0u8; 8];
        let n = s.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
    }
}
