use std::collections::VecDeque;

use crate::error::SortError;
use crate::row::{Meta, RowSource};

/// Rows kept in memory.
pub struct VecSource {
    meta: Meta,
    rows: VecDeque<Vec<String>>,
}

impl VecSource {
    pub fn new(meta: Meta, rows: Vec<Vec<String>>) -> VecSource {
        VecSource {
            meta,
            rows: rows.into(),
        }
    }

    /// Rows without a header, the column count is taken from the first row
    pub fn from_rows(rows: Vec<Vec<String>>) -> VecSource {
        let columns = rows.first().map(|r| r.len()).unwrap_or(0);
        VecSource::new(Meta::new(columns), rows)
    }
}

impl RowSource for VecSource {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>, SortError> {
        Ok(self.rows.pop_front())
    }
}

/// Keeps the given columns of every row, in the given order.
pub struct CuttingSource<S: RowSource> {
    source: S,
    indices: Vec<usize>,
    meta: Meta,
}

impl<S: RowSource> CuttingSource<S> {
    pub fn new(source: S, indices: Vec<usize>) -> CuttingSource<S> {
        let meta = match source.meta().column_names() {
            Some(names) if source.meta().has_header() => {
                Meta::with_header(
                    indices.iter()
                        .map(|i| names.get(*i).cloned().unwrap_or_default())
                        .collect()
                )
            }
            _ => Meta::new(indices.len()),
        };
        CuttingSource {
            source,
            indices,
            meta,
        }
    }
}

impl<S: RowSource> RowSource for CuttingSource<S> {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>, SortError> {
        match self.source.next_row()? {
            None => Ok(None),
            Some(row) => {
                let mut cut = Vec::with_capacity(self.indices.len());
                for i in &self.indices {
                    let value = row.get(*i).ok_or_else(||
                        SortError::MalformedInput(
                            format!("cannot cut column {} from a row of {} fields", i, row.len())
                        )
                    )?;
                    cut.push(value.clone());
                }
                Ok(Some(cut))
            }
        }
    }
}

/// Appends the ordinal of every row, starting at 0, as an extra column.
pub struct EnumeratingSource<S: RowSource> {
    source: S,
    ordinal: u64,
    meta: Meta,
}

impl<S: RowSource> EnumeratingSource<S> {
    pub fn new(source: S) -> EnumeratingSource<S> {
        let meta = match source.meta().column_names() {
            Some(names) if source.meta().has_header() => {
                let mut names = names.clone();
                names.push("ordinal".to_string());
                Meta::with_header(names)
            }
            _ => Meta::new(source.meta().columns() + 1),
        };
        EnumeratingSource {
            source,
            ordinal: 0,
            meta,
        }
    }
}

impl<S: RowSource> RowSource for EnumeratingSource<S> {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>, SortError> {
        match self.source.next_row()? {
            None => Ok(None),
            Some(mut row) => {
                row.push(self.ordinal.to_string());
                self.ordinal += 1;
                Ok(Some(row))
            }
        }
    }
}

/// Read every remaining row of a source
pub fn collect_rows<S: RowSource + ?Sized>(source: &mut S) -> Result<Vec<Vec<String>>, SortError> {
    let mut rows = Vec::new();
    while let Some(row) = source.next_row()? {
        rows.push(row);
    }
    Ok(rows)
}
