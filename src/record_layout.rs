use crate::codec;
use crate::column_type::ColumnType;
use crate::error::SortError;

/// Column types of a binary record together with their byte offsets.
///
/// # Examples
/// ```
/// use table_file_sort::column_type::{Charset, ColumnType};
/// use table_file_sort::record_layout::RecordLayout;
/// let layout = RecordLayout::new(vec![
///     ColumnType::FixedInt32,
///     ColumnType::fixed_string(2, Charset::UsAscii).unwrap(),
/// ]);
/// assert_eq!(layout.record_length(), 6);
/// assert_eq!(layout.column_offset(1), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    columns: Vec<ColumnType>,
    offsets: Vec<usize>,
}

impl RecordLayout {
    pub fn new(columns: Vec<ColumnType>) -> RecordLayout {
        let mut offsets = Vec::with_capacity(columns.len() + 1);
        let mut offset = 0;
        for column in &columns {
            offsets.push(offset);
            offset += column.width();
        }
        offsets.push(offset);
        RecordLayout {
            columns,
            offsets,
        }
    }

    pub fn columns(&self) -> &Vec<ColumnType> {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Sum of all column widths
    pub fn record_length(&self) -> usize {
        self.offsets[self.columns.len()]
    }

    /// Sum of the widths of the columns before `index`
    pub fn column_offset(&self, index: usize) -> usize {
        self.offsets[index]
    }

    pub(crate) fn column_bytes<'a>(&self, record: &'a [u8], index: usize) -> &'a [u8] {
        &record[self.offsets[index]..self.offsets[index + 1]]
    }

    /// Layout made of the given columns of this one, in the given order
    pub fn project(&self, indices: &[usize]) -> Result<RecordLayout, SortError> {
        let columns = indices.iter()
            .map(|i| self.columns.get(*i).cloned().ok_or_else(||
                SortError::Configuration(format!("column {} is out of range for {} columns", i, self.columns.len()))
            ))
            .collect::<Result<Vec<ColumnType>, SortError>>()?;
        Ok(RecordLayout::new(columns))
    }

    /// This layout followed by one more column
    pub fn with_column(&self, column: ColumnType) -> RecordLayout {
        let mut columns = self.columns.clone();
        columns.push(column);
        RecordLayout::new(columns)
    }

    /// Encode a text row into `out`, which must be [record_length](Self::record_length) long
    pub fn encode_row(&self, row: &[String], out: &mut [u8]) -> Result<(), SortError> {
        if row.len() != self.columns.len() {
            return Err(
                SortError::MalformedInput(
                    format!("wrong number of columns: {} != {}", row.len(), self.columns.len())
                )
            );
        }
        if out.len() != self.record_length() {
            return Err(
                SortError::InternalInvariant(
                    format!("record buffer of {} bytes for records of {}", out.len(), self.record_length())
                )
            );
        }
        for (i, (value, column)) in row.iter().zip(self.columns.iter()).enumerate() {
            codec::encode(value, column, &mut out[self.offsets[i]..self.offsets[i + 1]])?;
        }
        Ok(())
    }

    /// Decode a binary record into its text fields
    pub fn decode_row(&self, record: &[u8]) -> Result<Vec<String>, SortError> {
        if record.len() != self.record_length() {
            return Err(
                SortError::InternalInvariant(
                    format!("record of {} bytes for records of {}", record.len(), self.record_length())
                )
            );
        }
        self.columns.iter()
            .enumerate()
            .map(|(i, column)| codec::decode(self.column_bytes(record, i), column))
            .collect()
    }
}
