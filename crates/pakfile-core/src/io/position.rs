//! Writer that tracks the absolute archive offset of the next byte.
//!
//! The archive writer never seeks while streaming the body, so the offset of
//! each new entry is simply the number of bytes written so far plus the
//! header that precedes them.

use std::io::Write;

use crate::PakError;
use crate::Result;

/// Wraps a writer and counts bytes from a starting offset.
///
/// The counter only advances on successful writes.
///
/// # Examples
///
/// ```
/// use pakfile_core::io::PositionWriter;
/// use std::io::Write;
///
/// let mut writer = PositionWriter::new(Vec::new(), 12);
/// writer.write_all(b"abcd")?;
/// assert_eq!(writer.position(), 16);
/// assert_eq!(writer.offset()?, 16);
/// # Ok::<(), pakfile_core::PakError>(())
/// ```
#[derive(Debug)]
pub struct PositionWriter<W> {
    inner: W,
    position: u64,
}

impl<W> PositionWriter<W> {
    /// Creates a writer whose first byte lands at `start`.
    #[must_use]
    pub fn new(inner: W, start: u64) -> Self {
        Self {
            inner,
            position: start,
        }
    }

    /// Absolute offset of the next byte.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Absolute offset of the next byte as a format offset.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveTooLarge` once the position no longer fits in `u32`.
    pub fn offset(&self) -> Result<u32> {
        u32::try_from(self.position).map_err(|_| PakError::ArchiveTooLarge {
            size: self.position,
        })
    }

    /// Consumes the wrapper and returns the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for PositionWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.inner.write_all(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }
}
