use crate::error::SortError;

/// Description of a row stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Meta {
    has_header: bool,
    column_names: Option<Vec<String>>,
    columns: usize,
}

impl Meta {
    pub fn new(columns: usize) -> Meta {
        Meta {
            has_header: false,
            column_names: None,
            columns,
        }
    }

    /// Meta of a stream with a header naming its columns
    pub fn with_header(column_names: Vec<String>) -> Meta {
        Meta {
            has_header: true,
            columns: column_names.len(),
            column_names: Some(column_names),
        }
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn column_names(&self) -> &Option<Vec<String>> {
        &self.column_names
    }

    pub fn columns(&self) -> usize {
        self.columns
    }
}

/// A stream of text rows.
pub trait RowSource {
    fn meta(&self) -> &Meta;

    /// Next row, `None` at the end of the stream
    fn next_row(&mut self) -> Result<Option<Vec<String>>, SortError>;
}

/// Receives text rows.
pub trait RowSink {
    fn write(&mut self, row: &[String]) -> Result<(), SortError>;
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn meta(&self) -> &Meta {
        (**self).meta()
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>, SortError> {
        (**self).next_row()
    }
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn write(&mut self, row: &[String]) -> Result<(), SortError> {
        (**self).write(row)
    }
}

impl RowSink for Vec<Vec<String>> {
    fn write(&mut self, row: &[String]) -> Result<(), SortError> {
        self.push(row.to_vec());
        Ok(())
    }
}
