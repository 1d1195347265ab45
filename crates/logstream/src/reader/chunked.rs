use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use bytes::BytesMut;
use tracing::debug;

use crate::error::LogError;

/// Default window read from disk per I/O call.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// File order, starting at offset 0.
    Forward,
    /// Reverse file order, starting at end-of-file.
    Backward,
}

/// Lazy line iterator over a log file that never holds more than one chunk
/// plus the current partial line in memory.
///
/// Lines are reassembled as raw bytes and only decoded (lossy UTF-8) once a
/// full line is known, so multi-byte characters split across chunks survive.
/// Blank lines are dropped here and nowhere else.
///
/// The file handle is released as soon as the source is exhausted, an error
/// is yielded, or the reader is dropped.
pub struct LineReader {
    path: PathBuf,
    file: Option<File>,
    direction: Direction,
    scratch: Vec<u8>,
    /// Bytes read but not yet terminated by a newline. In backward mode this
    /// is the leftmost fragment, which may continue into the unread region.
    partial: BytesMut,
    /// Backward mode: offset where the next read must end.
    cursor: u64,
    /// File length when opened.
    len: u64,
    ready: VecDeque<String>,
    bytes_read: u64,
}

impl LineReader {
    /// Open `path` for iteration in `direction`.
    ///
    /// A missing path, or one that is not a regular file, fails with
    /// [`LogError::NotFound`] before anything is read.
    pub fn open(
        path: impl AsRef<Path>,
        direction: Direction,
        chunk_size: usize,
    ) -> Result<Self, LogError> {
        let path = path.as_ref();

        let metadata = fs::metadata(path).map_err(|e| classify_open_error(path, e))?;
        if !metadata.is_file() {
            return Err(LogError::not_found(path));
        }

        let file = File::open(path).map_err(|e| classify_open_error(path, e))?;
        let len = file.metadata().map_err(|e| LogError::read(path, e))?.len();

        let chunk_size = chunk_size.max(1);
        let cursor = match direction {
            Direction::Forward => 0,
            Direction::Backward => len,
        };

        debug!(
            path = %path.display(),
            ?direction,
            chunk_size,
            file_len = len,
            "opened log file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            direction,
            scratch: vec![0u8; chunk_size],
            partial: BytesMut::new(),
            cursor,
            len,
            ready: VecDeque::new(),
            bytes_read: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Total bytes pulled from disk so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Whether the file handle is still held.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn fill_forward(&mut self) -> Result<(), LogError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        let n = loop {
            match file.read(&mut self.scratch) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(LogError::read(&self.path, e)),
            }
        };

        if n == 0 {
            if self.bytes_read < self.len {
                return Err(LogError::read(
                    &self.path,
                    io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("file truncated to {} of {} bytes", self.bytes_read, self.len),
                    ),
                ));
            }
            // Unterminated trailing fragment is still a line.
            let rest = self.partial.split();
            self.emit(&rest);
            self.file = None;
            return Ok(());
        }

        self.bytes_read += n as u64;
        let mut search_from = self.partial.len();
        self.partial.extend_from_slice(&self.scratch[..n]);

        while let Some(offset) = self.partial[search_from..].iter().position(|&b| b == b'\n') {
            let pos = search_from + offset;
            let line = self.partial.split_to(pos + 1);
            self.emit(&line[..pos]);
            search_from = 0;
        }

        Ok(())
    }

    fn fill_backward(&mut self) -> Result<(), LogError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        let len = (self.scratch.len() as u64).min(self.cursor) as usize;
        if len > 0 {
            let start = self.cursor - len as u64;
            file.seek(SeekFrom::Start(start))
                .map_err(|e| LogError::read(&self.path, e))?;
            // Short reads here mean the file shrank under us.
            file.read_exact(&mut self.scratch[..len])
                .map_err(|e| LogError::read(&self.path, e))?;

            self.cursor = start;
            self.bytes_read += len as u64;

            let mut joined = BytesMut::with_capacity(len + self.partial.len());
            joined.extend_from_slice(&self.scratch[..len]);
            joined.extend_from_slice(&self.partial);

            // Every segment right of the first newline is complete; emit them
            // last-first and keep the leftmost fragment.
            let mut end = joined.len();
            while let Some(pos) = joined[..end].iter().rposition(|&b| b == b'\n') {
                self.emit(&joined[pos + 1..end]);
                end = pos;
            }
            joined.truncate(end);
            self.partial = joined;
        }

        if self.cursor == 0 {
            let rest = self.partial.split();
            self.emit(&rest);
            self.file = None;
        }

        Ok(())
    }

    fn emit(&mut self, raw: &[u8]) {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);
        if line.trim().is_empty() {
            return;
        }
        self.ready.push_back(line.into_owned());
    }

    fn fail(&mut self, err: LogError) -> Option<Result<String, LogError>> {
        self.file = None;
        self.ready.clear();
        self.partial.clear();
        Some(Err(err))
    }
}

impl Iterator for LineReader {
    type Item = Result<String, LogError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.file.is_none() {
                return None;
            }

            let step = match self.direction {
                Direction::Forward => self.fill_forward(),
                Direction::Backward => self.fill_backward(),
            };
            if let Err(e) = step {
                return self.fail(e);
            }
        }
    }
}

impl FusedIterator for LineReader {}

fn classify_open_error(path: &Path, err: io::Error) -> LogError {
    if err.kind() == io::ErrorKind::NotFound {
        LogError::not_found(path)
    } else {
        LogError::read(path, err)
    }
}
