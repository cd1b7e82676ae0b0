use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::binary_writer::BinaryWriter;
use crate::error::SortError;
use crate::region_reader::read_fully;

const ENTRY_LEN: usize = std::mem::size_of::<u64>();

/// Result of [extract_offsets]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Offsets {
    header_end: Option<u64>,
    rows: u64,
}

impl Offsets {
    /// Position of the header's `\n`, when the input has a header
    pub fn header_end(&self) -> Option<u64> {
        self.header_end
    }

    /// Number of data rows
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

/// Write the position of every data row's `\n` in `input` to `output` as a big endian u64.
///
/// With `has_header` the first line is the header and its end is returned instead of being
/// written. Every line, the last one included, must end with `\n`.
pub fn extract_offsets<R: Read, W: Write>(
    input: &mut R,
    output: W,
    read_buffer: usize,
    write_buffer: usize,
    has_header: bool,
) -> Result<Offsets, SortError> {
    if read_buffer == 0 {
        return Err(SortError::Configuration("read buffer size must be positive".to_string()));
    }
    let mut writer = BinaryWriter::new(output, write_buffer)?;
    let mut buf = vec![0u8; read_buffer];
    let mut position: u64 = 0;
    let mut last = None;
    let mut header_end = None;
    let mut rows = 0;
    loop {
        let n = read_fully(input, &mut buf)?;
        if n == 0 {
            break;
        }
        for (i, b) in buf[..n].iter().enumerate() {
            if *b == b'\n' {
                let end = position + i as u64;
                if has_header && header_end.is_none() {
                    header_end = Some(end);
                } else {
                    writer.write(&end.to_be_bytes())?;
                    rows += 1;
                }
            }
        }
        last = Some(buf[n - 1]);
        position += n as u64;
    }
    if let Some(b) = last {
        if b != b'\n' {
            return Err(
                SortError::MalformedInput(format!("the last line of {} bytes does not end with a new line", position))
            );
        }
    }
    writer.close()?;
    log::debug!("Extracted {} row offsets from {} bytes, header end: {:?}", rows, position, header_end);
    Ok(
        Offsets {
            header_end,
            rows,
        }
    )
}

/// Read only view of a file written by [extract_offsets].
pub struct OffsetTable<R: Read + Seek> {
    input: R,
    header_end: Option<u64>,
    rows: u64,
}

impl OffsetTable<BufReader<File>> {
    pub fn open(path: &Path, header_end: Option<u64>) -> Result<OffsetTable<BufReader<File>>, SortError> {
        let file = File::open(path)?;
        OffsetTable::new(BufReader::with_capacity(4 * ENTRY_LEN, file), header_end)
    }
}

impl<R: Read + Seek> OffsetTable<R> {
    pub fn new(mut input: R, header_end: Option<u64>) -> Result<OffsetTable<R>, SortError> {
        let len = input.seek(SeekFrom::End(0))?;
        if len % ENTRY_LEN as u64 != 0 {
            return Err(
                SortError::InternalInvariant(format!("offset table of {} bytes is not made of u64 entries", len))
            );
        }
        Ok(
            OffsetTable {
                input,
                header_end,
                rows: len / ENTRY_LEN as u64,
            }
        )
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Byte range of row `ordinal`, the end is the position of its `\n`
    pub fn row_span(&mut self, ordinal: u64) -> Result<(u64, u64), SortError> {
        if ordinal >= self.rows {
            return Err(
                SortError::InternalInvariant(format!("row {} is beyond the {} rows of the offset table", ordinal, self.rows))
            );
        }
        if ordinal == 0 {
            let end = self.entry(0)?;
            let start = self.header_end.map(|h| h + 1).unwrap_or(0);
            Ok((start, end))
        } else {
            let mut pair = [0u8; 2 * ENTRY_LEN];
            self.input.seek(SeekFrom::Start((ordinal - 1) * ENTRY_LEN as u64))?;
            self.read_entries(&mut pair)?;
            let previous = u64::from_be_bytes(entry_bytes(&pair[..ENTRY_LEN]));
            let end = u64::from_be_bytes(entry_bytes(&pair[ENTRY_LEN..]));
            Ok((previous + 1, end))
        }
    }

    fn entry(&mut self, ordinal: u64) -> Result<u64, SortError> {
        let mut entry = [0u8; ENTRY_LEN];
        self.input.seek(SeekFrom::Start(ordinal * ENTRY_LEN as u64))?;
        self.read_entries(&mut entry)?;
        Ok(u64::from_be_bytes(entry))
    }

    fn read_entries(&mut self, buf: &mut [u8]) -> Result<(), SortError> {
        let n = read_fully(&mut self.input, buf)?;
        if n < buf.len() {
            Err(SortError::InternalInvariant(format!("short read of the offset table: {} of {} bytes", n, buf.len())))
        } else {
            Ok(())
        }
    }
}

fn entry_bytes(bytes: &[u8]) -> [u8; ENTRY_LEN] {
    let mut entry = [0u8; ENTRY_LEN];
    entry.copy_from_slice(bytes);
    entry
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::error::SortError;
    use crate::offsets::{extract_offsets, OffsetTable};

    fn entries(offsets: &[u64]) -> Vec<u8> {
        offsets.iter().flat_map(|o| o.to_be_bytes()).collect()
    }

    #[test]
    fn test_without_header() -> Result<(), anyhow::Error> {
        let input = b"ab\nc\n\ndef\n";
        let mut output = Vec::new();
        let offsets = extract_offsets(&mut Cursor::new(&input[..]), &mut output, 3, 8, false)?;
        assert_eq!(offsets.header_end(), None);
        assert_eq!(offsets.rows(), 4);
        assert_eq!(output, entries(&[2, 4, 5, 9]));

        let mut table = OffsetTable::new(Cursor::new(output), None)?;
        assert_eq!(table.rows(), 4);
        assert_eq!(table.row_span(0)?, (0, 2));
        assert_eq!(table.row_span(3)?, (6, 9));
        assert_eq!(table.row_span(2)?, (5, 5));
        assert_eq!(&input[6..9], b"def");
        assert!(matches!(table.row_span(4), Err(SortError::InternalInvariant(_))));
        Ok(())
    }

    #[test]
    fn test_with_header() -> Result<(), anyhow::Error> {
        let input = b"id,v\n1,a\n2,b\n";
        let mut output = Vec::new();
        let offsets = extract_offsets(&mut Cursor::new(&input[..]), &mut output, 64, 64, true)?;
        assert_eq!(offsets.header_end(), Some(4));
        assert_eq!(offsets.rows(), 2);
        let mut table = OffsetTable::new(Cursor::new(output), offsets.header_end())?;
        assert_eq!(table.row_span(0)?, (5, 8));
        assert_eq!(table.row_span(1)?, (9, 12));
        Ok(())
    }

    #[test]
    fn test_missing_final_new_line() {
        let result = extract_offsets(&mut Cursor::new(b"a\nb".to_vec()), Vec::new(), 2, 8, false);
        assert!(matches!(result, Err(SortError::MalformedInput(_))));
    }

    #[test]
    fn test_empty() -> Result<(), anyhow::Error> {
        let offsets = extract_offsets(&mut Cursor::new(Vec::new()), Vec::new(), 2, 8, true)?;
        assert_eq!(offsets.header_end(), None);
        assert_eq!(offsets.rows(), 0);
        Ok(())
    }

    #[test]
    fn test_truncated_table() -> Result<(), anyhow::Error> {
        assert!(OffsetTable::new(Cursor::new(vec![0u8; 12]), None).is_err());
        Ok(())
    }
}
