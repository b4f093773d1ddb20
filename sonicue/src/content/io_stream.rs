use crate::error::{Result, SonicueError};
use std::io::{Read, Seek, SeekFrom};

/// Anything a streaming wave bank can read from.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Owned read/seek/close stream backing a streaming wave bank.
pub struct IoStream {
    inner: Option<Box<dyn ReadSeek>>,
}

impl IoStream {
    pub fn new(inner: Box<dyn ReadSeek>) -> Self {
        Self { inner: Some(inner) }
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        Ok(self.open()?.read(dst)?)
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.open()?.seek(pos)?)
    }

    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.open()?.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Drops the underlying reader. Returns false if it was already closed.
    pub fn close(&mut self) -> bool {
        self.inner.take().is_some()
    }

    fn open(&mut self) -> Result<&mut Box<dyn ReadSeek>> {
        self.inner
            .as_mut()
            .ok_or_else(|| SonicueError::lifecycle("stream is closed"))
    }
}

impl std::fmt::Debug for IoStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoStream").field("open", &self.is_open()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_seek_close() {
        let mut stream = IoStream::new(Box::new(Cursor::new(vec![1u8, 2, 3, 4, 5])));
        assert_eq!(stream.seek(SeekFrom::Start(2)).unwrap(), 2);
        assert_eq!(stream.read_to_end().unwrap(), vec![3, 4, 5]);

        assert!(stream.close());
        assert!(!stream.close());
        assert!(matches!(
            stream.read(&mut [0u8; 4]),
            Err(SonicueError::LifecycleViolation(_))
        ));
    }
}
