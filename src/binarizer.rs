use std::io::{Read, Write};

use crate::binary_writer::BinaryWriter;
use crate::error::SortError;
use crate::record_layout::RecordLayout;
use crate::region_reader::read_fully;
use crate::row::{RowSink, RowSource};

/// Encode every row of `source` as a record of `layout`, returns the number of rows.
pub fn binarize<S, W>(source: &mut S, layout: &RecordLayout, writer: &mut BinaryWriter<W>) -> Result<u64, SortError>
    where S: RowSource + ?Sized, W: Write {
    let mut record = vec![0u8; layout.record_length()];
    let mut rows = 0;
    while let Some(row) = source.next_row()? {
        layout.encode_row(&row, &mut record)
            .map_err(|e| with_row(e, rows))?;
        writer.write(&record)?;
        rows += 1;
    }
    Ok(rows)
}

/// Decode every record of `input` into `sink`, returns the number of rows.
pub fn debinarize<R, S>(input: &mut R, layout: &RecordLayout, sink: &mut S) -> Result<u64, SortError>
    where R: Read, S: RowSink + ?Sized {
    let mut record = vec![0u8; layout.record_length()];
    let mut rows = 0;
    if record.is_empty() {
        return Ok(0);
    }
    loop {
        let n = read_fully(input, &mut record)?;
        if n == 0 {
            break;
        } else if n < record.len() {
            return Err(
                SortError::InternalInvariant(
                    format!("record {} is cut short: {} of {} bytes", rows, n, record.len())
                )
            );
        }
        sink.write(&layout.decode_row(&record)?)?;
        rows += 1;
    }
    Ok(rows)
}

fn with_row(error: SortError, row: u64) -> SortError {
    match error {
        SortError::Encoding(message) => SortError::Encoding(format!("row {}: {}", row, message)),
        SortError::MalformedInput(message) => SortError::MalformedInput(format!("row {}: {}", row, message)),
        other => other,
    }
}
