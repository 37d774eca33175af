/*
 * file.rs
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

//! Stream over an OS file.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::rc::Rc;

use super::{Stream, StreamError, Whence};

/// Stream over a file handle. Substreams share the handle, so the OS file
/// position is not trusted between calls; every read and write re-seeks to
/// this stream's own position first.
pub struct FileStream {
    file: Rc<RefCell<Option<File>>>,
    owner: bool,
    closed: bool,
    position: u64,
    bound_start: u64,
    bound_end: Option<u64>,
}

impl FileStream {
    /// New unbounded stream over an already open file, positioned at the
    /// start of the file.
    pub fn new(file: File) -> FileStream {
        FileStream {
            file: Rc::new(RefCell::new(Some(file))),
            owner: true,
            closed: false,
            position: 0,
            bound_start: 0,
            bound_end: None,
        }
    }

    /// Open `path` read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FileStream, StreamError> {
        Ok(FileStream::new(File::open(path)?))
    }

    /// Open `path` for reading and writing, creating it if absent.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<FileStream, StreamError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(FileStream::new(file))
    }
}

impl Stream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let mut backend = self.file.borrow_mut();
        let file = backend.as_mut().ok_or(StreamError::Closed)?;
        let len = match self.bound_end {
            Some(end) => {
                if self.position > end {
                    return Err(StreamError::OutOfBounds);
                }
                buf.len().min((end - self.position) as usize)
            }
            None => buf.len(),
        };
        file.seek(SeekFrom::Start(self.position))?;
        let n = file.read(&mut buf[..len])?;
        self.position += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let mut backend = self.file.borrow_mut();
        let file = backend.as_mut().ok_or(StreamError::Closed)?;
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
        file.seek(SeekFrom::Start(self.position))?;
        let n = file.write(&buf[..len])?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let mut backend = self.file.borrow_mut();
        let file = backend.as_mut().ok_or(StreamError::Closed)?;
        file.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.closed = true;
        if self.owner {
            self.file.borrow_mut().take();
        }
        Ok(())
    }

    fn eos(&self) -> bool {
        if self.closed {
            return true;
        }
        let backend = self.file.borrow();
        match backend.as_ref() {
            Some(file) => match self.bound_end {
                Some(end) => self.position >= end,
                None => match file.metadata() {
                    Ok(meta) => self.position >= meta.len(),
                    Err(_) => true,
                },
            },
            None => true,
        }
    }

    fn reset(&mut self) -> Result<(), StreamError> {
        if self.closed || self.file.borrow().is_none() {
            return Err(StreamError::Closed);
        }
        self.position = self.bound_start;
        Ok(())
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let backend = self.file.borrow();
        let file = backend.as_ref().ok_or(StreamError::Closed)?;
        let end = match self.bound_end {
            Some(end) => end,
            None => file.metadata()?.len(),
        };
        let target = match whence {
            Whence::Set => self.bound_start as i64 + offset,
            Whence::Cur => self.position as i64 + offset,
            Whence::End => end as i64 + offset,
        };
        self.position = target.max(self.bound_start as i64).min(end as i64) as u64;
        Ok(self.position - self.bound_start)
    }

    fn tell(&self) -> u64 {
        self.position.saturating_sub(self.bound_start)
    }

    fn length(&self) -> Result<u64, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let backend = self.file.borrow();
        let file = backend.as_ref().ok_or(StreamError::Closed)?;
        match self.bound_end {
            Some(end) => Ok(end - self.bound_start),
            None => Ok(file.metadata()?.len().saturating_sub(self.bound_start)),
        }
    }

    fn substream(&self, start: u64, end: Option<u64>) -> Result<Box<dyn Stream>, StreamError> {
        if self.closed || self.file.borrow().is_none() {
            return Err(StreamError::Closed);
        }
        Ok(Box::new(FileStream {
            file: Rc::clone(&self.file),
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
