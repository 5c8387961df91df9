use std::fs::File;
use std::io::{BufReader, Cursor, Read};

use crate::error::Result;

/// A readable byte stream the frame reader can resynchronise on.
///
/// Reads are expected to block for at most the source's read timeout. A
/// timeout surfaces as an `std::io::Error` of kind `TimedOut` or
/// `WouldBlock`; `Ok(0)` means the source is exhausted.
pub trait ByteSource: Read {
    /// Discard any input the transport has buffered but not yet delivered.
    fn flush_input(&mut self) -> Result<()>;
}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    fn flush_input(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ByteSource for &[u8] {
    fn flush_input(&mut self) -> Result<()> {
        Ok(())
    }
}

// Captured files have no pending device input to discard.
impl ByteSource for File {
    fn flush_input(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ByteSource for BufReader<File> {
    fn flush_input(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn flush_input(&mut self) -> Result<()> {
        (**self).flush_input()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_flush_keeps_unread_bytes() {
        let mut source = Cursor::new(vec![1u8, 2, 3]);
        let mut first = [0u8; 1];
        source.read_exact(&mut first).unwrap();

        source.flush_input().unwrap();

        let mut rest = Vec::new();
        source.read_to_end(&mut rest).unwrap();
        assert_eq!(first, [1]);
        assert_eq!(rest, vec![2, 3]);
    }

    #[test]
    fn boxed_source_delegates() {
        let mut source: Box<dyn ByteSource> = Box::new(Cursor::new(vec![9u8]));
        source.flush_input().unwrap();

        let mut byte = [0u8; 1];
        assert_eq!(source.read(&mut byte).unwrap(), 1);
        assert_eq!(byte, [9]);
    }
}
