//! Bounded streaming copy with a reusable buffer.
//!
//! Entry bodies are moved between files in fixed-size chunks so a single
//! entry never has to fit in memory. The same buffer is reused for every
//! entry of one operation.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use crate::config::CHUNK_SIZE;

/// Heap buffer reused across copy operations.
///
/// # Examples
///
/// ```
/// use pakfile_core::copy::CopyBuffer;
/// use pakfile_core::copy::copy_exact;
///
/// let mut buffer = CopyBuffer::with_size(4);
/// let mut input: &[u8] = b"0123456789";
/// let mut output = Vec::new();
///
/// let copied = copy_exact(&mut input, &mut output, 6, &mut buffer)?;
/// assert_eq!(copied, 6);
/// assert_eq!(output, b"012345");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Vec<u8>,
}

impl CopyBuffer {
    /// Creates a buffer of [`CHUNK_SIZE`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(CHUNK_SIZE)
    }

    /// Creates a buffer of `size` bytes (at least one).
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            buf: vec![0u8; size.max(1)],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies at most `len` bytes from `reader` to `writer`.
///
/// Never reads past `len`. Returns the number of bytes copied, which is
/// smaller than `len` only if the reader hit end of input first; callers
/// decide whether that is an error.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn copy_exact<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    len: u64,
    buffer: &mut CopyBuffer,
) -> io::Result<u64> {
    let mut copied: u64 = 0;

    while copied < len {
        let cap = buffer.buf.len();
        let want = usize::try_from(len - copied).map_or(cap, |r| r.min(cap));
        let n = match reader.read(&mut buffer.buf[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..n])?;
        copied += n as u64;
    }

    Ok(copied)
}
