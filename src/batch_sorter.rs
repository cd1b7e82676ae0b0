use std::collections::VecDeque;

use crate::comparator::RecordComparator;
use crate::error::SortError;
use crate::keyed_row::KeyedRow;
use crate::row::{Meta, RowSource};

/// Reads batches of up to `batch_rows` rows from a source, sorts every batch by the order the
/// comparator gives their encoded records and yields the rows batch after batch.
///
/// Every run of `batch_rows` consecutive rows of the output is sorted, the last run may be
/// shorter.
pub struct BatchSorter<S: RowSource> {
    source: S,
    comparator: RecordComparator,
    batch_rows: usize,
    batch: VecDeque<Vec<String>>,
    batches: usize,
    exhausted: bool,
}

impl<S: RowSource> BatchSorter<S> {
    pub fn new(source: S, comparator: RecordComparator, batch_rows: usize) -> Result<BatchSorter<S>, SortError> {
        if batch_rows == 0 {
            return Err(SortError::Configuration("batch rows must be positive".to_string()));
        }
        Ok(
            BatchSorter {
                source,
                comparator,
                batch_rows,
                batch: VecDeque::new(),
                batches: 0,
                exhausted: false,
            }
        )
    }

    /// Number of batches read so far
    pub fn batches(&self) -> usize {
        self.batches
    }

    fn read_batch(&mut self) -> Result<(), SortError> {
        let mut keyed_rows = Vec::with_capacity(self.batch_rows.min(1 << 16));
        while keyed_rows.len() < self.batch_rows {
            match self.source.next_row()? {
                Some(row) => keyed_rows.push(KeyedRow::new(row, &self.comparator)?),
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }
        if !keyed_rows.is_empty() {
            keyed_rows.sort_by(|a, b| a.compare(b, &self.comparator));
            self.batches += 1;
            log::debug!("Sorted batch {} of {} rows", self.batches, keyed_rows.len());
        }
        self.batch = keyed_rows.into_iter().map(|r| r.into_row()).collect();
        Ok(())
    }
}

impl<S: RowSource> RowSource for BatchSorter<S> {
    fn meta(&self) -> &Meta {
        self.source.meta()
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>, SortError> {
        if self.batch.is_empty() && !self.exhausted {
            self.read_batch()?;
        }
        Ok(self.batch.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use crate::batch_sorter::BatchSorter;
    use crate::column_type::{Charset, ColumnType};
    use crate::comparator::RecordComparator;
    use crate::error::SortError;
    use crate::field::Field;
    use crate::field_type::FieldType;
    use crate::record_layout::RecordLayout;
    use crate::row::RowSource;
    use crate::row_source::{collect_rows, VecSource};
    use crate::sort_key::SortKey;

    fn rows(values: &[i64]) -> Vec<Vec<String>> {
        values.iter().map(|v| vec![v.to_string(), format!("r{}", v)]).collect()
    }

    fn comparator(field: Field) -> Result<RecordComparator, SortError> {
        let layout = RecordLayout::new(vec![
            ColumnType::FixedInt64,
            ColumnType::fixed_string(4, Charset::UsAscii)?,
            ColumnType::FixedInt64,
        ]);
        RecordComparator::new(layout, &SortKey::of(field))
    }

    #[test]
    fn test_batches() -> Result<(), anyhow::Error> {
        let source = VecSource::from_rows(rows(&[5, 3, 9, 1, 8, 2, 7]));
        let mut sorter = BatchSorter::new(source, comparator(Field::new(0, FieldType::Integer))?, 3)?;
        let sorted = collect_rows(&mut sorter)?;
        assert_eq!(sorted, rows(&[3, 5, 9, 1, 2, 8, 7]));
        assert_eq!(sorter.batches(), 3);
        Ok(())
    }

    #[test]
    fn test_exact_multiple() -> Result<(), anyhow::Error> {
        let source = VecSource::from_rows(rows(&[4, 3, 2, 1]));
        let mut sorter = BatchSorter::new(source, comparator(Field::new(0, FieldType::Integer))?, 2)?;
        assert_eq!(collect_rows(&mut sorter)?, rows(&[3, 4, 1, 2]));
        assert_eq!(sorter.batches(), 2);
        Ok(())
    }

    #[test]
    fn test_sorts_stored_values() -> Result<(), anyhow::Error> {
        let input = vec![
            vec!["9".to_string(), "b".to_string()],
            vec!["10".to_string(), "c".to_string()],
            vec!["+8".to_string(), "a".to_string()],
        ];
        let source = VecSource::from_rows(input);
        // compared as text the stored values are "9", "10" and "8"
        let mut sorter = BatchSorter::new(source, comparator(Field::new(0, FieldType::String))?, 10)?;
        let sorted: Vec<String> = collect_rows(&mut sorter)?.into_iter().map(|r| r[1].clone()).collect();
        assert_eq!(sorted, vec!["c", "a", "b"]);
        Ok(())
    }

    #[test]
    fn test_short_row() -> Result<(), anyhow::Error> {
        let source = VecSource::from_rows(rows(&[1]));
        let mut sorter = BatchSorter::new(source, comparator(Field::new(2, FieldType::Integer))?, 2)?;
        assert!(matches!(sorter.next_row(), Err(SortError::MalformedInput(_))));
        Ok(())
    }

    #[test]
    fn test_not_a_number() -> Result<(), anyhow::Error> {
        let source = VecSource::from_rows(vec![vec!["x".to_string()]]);
        let mut sorter = BatchSorter::new(source, comparator(Field::new(0, FieldType::Integer))?, 2)?;
        assert!(matches!(sorter.next_row(), Err(SortError::Encoding(_))));
        Ok(())
    }
}
