use std::io::Write;

use crate::error::SortError;

/// Append only writer with a fixed size cache.
///
/// The cache is flushed to the output whenever it fills up. [BinaryWriter::close] flushes what
/// is left but leaves the output open, pass `&mut File` to keep using the file afterwards.
pub struct BinaryWriter<W: Write> {
    output: W,
    cache: Vec<u8>,
    cache_size: usize,
    written: u64,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(output: W, cache_size: usize) -> Result<BinaryWriter<W>, SortError> {
        if cache_size == 0 {
            return Err(SortError::Configuration("write cache size must be positive".to_string()));
        }
        Ok(
            BinaryWriter {
                output,
                cache: Vec::with_capacity(cache_size),
                cache_size,
                written: 0,
            }
        )
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), SortError> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let n = rest.len().min(self.cache_size - self.cache.len());
            self.cache.extend_from_slice(&rest[..n]);
            rest = &rest[n..];
            if self.cache.len() == self.cache_size {
                self.flush_cache()?;
            }
        }
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Number of bytes accepted so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush the cache and the output, returns the number of bytes written.
    pub fn close(mut self) -> Result<u64, SortError> {
        self.flush_cache()?;
        self.output.flush()?;
        Ok(self.written)
    }

    fn flush_cache(&mut self) -> Result<(), SortError> {
        if !self.cache.is_empty() {
            self.output.write_all(&self.cache)?;
            self.cache.clear();
        }
        Ok(())
    }
}
