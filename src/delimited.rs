//! Line based reader and writer of delimited text.
//!
//! Every line is one row and fields are split on a single separator character. There are no
//! quoting rules, a separator inside a value always splits it.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::SortError;
use crate::row::{Meta, RowSink, RowSource};

pub struct DelimitedReader<R: BufRead> {
    input: R,
    separator: char,
    meta: Meta,
    pending: Option<Vec<String>>,
    line: String,
    line_number: usize,
}

impl DelimitedReader<BufReader<File>> {
    pub fn open(path: &Path, separator: char, has_header: bool) -> Result<DelimitedReader<BufReader<File>>, SortError> {
        let file = File::open(path)?;
        DelimitedReader::new(BufReader::new(file), separator, has_header)
    }
}

impl<R: BufRead> DelimitedReader<R> {
    /// Create a reader, consuming the header line when `has_header` is set.
    pub fn new(input: R, separator: char, has_header: bool) -> Result<DelimitedReader<R>, SortError> {
        let mut reader = DelimitedReader {
            input,
            separator,
            meta: Meta::new(0),
            pending: None,
            line: String::new(),
            line_number: 0,
        };
        let first = reader.read_fields()?;
        if has_header {
            reader.meta = Meta::with_header(first.unwrap_or_default());
        } else {
            reader.meta = Meta::new(first.as_ref().map(|f| f.len()).unwrap_or(0));
            reader.pending = first;
        }
        Ok(reader)
    }

    fn read_fields(&mut self) -> Result<Option<Vec<String>>, SortError> {
        self.line.clear();
        let bytes = self.input.read_line(&mut self.line)?;
        if bytes == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        let mut line = self.line.as_str();
        line = line.strip_suffix('\n').unwrap_or(line);
        line = line.strip_suffix('\r').unwrap_or(line);
        Ok(Some(line.split(self.separator).map(|f| f.to_string()).collect()))
    }
}

impl<R: BufRead> RowSource for DelimitedReader<R> {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>, SortError> {
        let fields = match self.pending.take() {
            Some(fields) => Some(fields),
            None => self.read_fields()?,
        };
        match fields {
            Some(fields) if fields.len() != self.meta.columns() => {
                Err(
                    SortError::MalformedInput(
                        format!("line {}: expected {} fields, found {}", self.line_number, self.meta.columns(), fields.len())
                    )
                )
            }
            fields => Ok(fields),
        }
    }
}

pub struct DelimitedWriter<W: Write> {
    output: W,
    separator: char,
    columns: Option<usize>,
    line: String,
}

impl DelimitedWriter<BufWriter<File>> {
    pub fn create(path: &Path, separator: char) -> Result<DelimitedWriter<BufWriter<File>>, SortError> {
        let file = File::create(path)?;
        Ok(DelimitedWriter::new(BufWriter::new(file), separator))
    }
}

impl<W: Write> DelimitedWriter<W> {
    pub fn new(output: W, separator: char) -> DelimitedWriter<W> {
        DelimitedWriter {
            output,
            separator,
            columns: None,
            line: String::new(),
        }
    }

    /// Flush and hand back the output
    pub fn finish(mut self) -> Result<W, SortError> {
        self.output.flush()?;
        Ok(self.output)
    }
}

impl<W: Write> RowSink for DelimitedWriter<W> {
    fn write(&mut self, row: &[String]) -> Result<(), SortError> {
        let columns = *self.columns.get_or_insert(row.len());
        if columns != row.len() {
            return Err(
                SortError::MalformedInput(format!("expected {} fields, got {}", columns, row.len()))
            );
        }
        self.line.clear();
        for (i, field) in row.iter().enumerate() {
            if i > 0 {
                self.line.push(self.separator);
            }
            self.line.push_str(field);
        }
        self.line.push('\n');
        self.output.write_all(self.line.as_bytes())?;
        Ok(())
    }
}
