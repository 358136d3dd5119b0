//! Raw terminal input and output.
//!
//! The Reader role pulls chunks through [`ChunkReader`]; the Printer pushes
//! bytes through [`ChunkWriter`].  [`ChunkedInput`] and [`ChunkedOutput`]
//! adapt any `Read` / `Write` (stdin and stdout in the binary, in-memory
//! buffers in tests).

use std::io::{self, Read, Write};

use crate::message::MAX_CHUNK;

/// Blocking source of raw input chunks.
pub trait ChunkReader: Send + 'static {
    /// Read the next chunk of at most [`MAX_CHUNK`] bytes.
    ///
    /// `Ok(None)` means the input is closed.
    fn read_chunk(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// Sink for raw output bytes.
pub trait ChunkWriter: Send + 'static {
    fn write_chunk(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Reads whatever one `read` call returns, capped at [`MAX_CHUNK`] bytes.
///
/// On a line-buffered terminal that is one typed line.
#[derive(Debug)]
pub struct ChunkedInput<R> {
    inner: R,
}

impl<R> ChunkedInput<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl ChunkedInput<io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: Read + Send + 'static> ChunkReader for ChunkedInput<R> {
    fn read_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = [0u8; MAX_CHUNK];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => return Ok(Some(buf[..n].to_vec())),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Writes every chunk in full and flushes it immediately.
#[derive(Debug)]
pub struct ChunkedOutput<W> {
    inner: W,
}

impl<W> ChunkedOutput<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl ChunkedOutput<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + 'static> ChunkWriter for ChunkedOutput<W> {
    fn write_chunk(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.inner.flush()
    }
}
