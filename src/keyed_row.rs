use std::cmp::Ordering;

use crate::comparator::RecordComparator;
use crate::error::SortError;
use crate::key::Key;

/// A text row together with the sort key values of its encoded form.
#[derive(Debug)]
pub(crate) struct KeyedRow {
    row: Vec<String>,
    keys: Vec<Key>,
}

impl KeyedRow {
    pub(crate) fn new(row: Vec<String>, comparator: &RecordComparator) -> Result<KeyedRow, SortError> {
        let keys = comparator.row_keys(&row)?;
        Ok(
            KeyedRow {
                row,
                keys,
            }
        )
    }

    pub(crate) fn compare(&self, other: &KeyedRow, comparator: &RecordComparator) -> Ordering {
        comparator.compare_keys(&self.keys, &other.keys)
    }

    pub(crate) fn into_row(self) -> Vec<String> {
        self.row
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use crate::column_type::{Charset, ColumnType};
    use crate::comparator::RecordComparator;
    use crate::error::SortError;
    use crate::field::Field;
    use crate::field_type::FieldType;
    use crate::keyed_row::KeyedRow;
    use crate::order::Order;
    use crate::record_layout::RecordLayout;
    use crate::sort_key::SortKey;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn layout() -> Result<RecordLayout, SortError> {
        Ok(RecordLayout::new(vec![ColumnType::FixedInt32, ColumnType::fixed_string(1, Charset::UsAscii)?]))
    }

    #[test]
    fn test_numeric_not_lexicographic() -> Result<(), anyhow::Error> {
        let comparator = RecordComparator::new(layout()?, &SortKey::of(Field::new(0, FieldType::Integer)))?;
        let a = KeyedRow::new(row(&["9", "x"]), &comparator)?;
        let b = KeyedRow::new(row(&["10", "y"]), &comparator)?;
        assert_eq!(a.compare(&b, &comparator), Ordering::Less);
        Ok(())
    }

    #[test]
    fn test_tie_break_desc() -> Result<(), anyhow::Error> {
        let sort_key = SortKey::new(vec![
            Field::new(0, FieldType::Integer),
            Field::new(1, FieldType::String).with_order(Order::Desc),
        ]);
        let comparator = RecordComparator::new(layout()?, &sort_key)?;
        let a = KeyedRow::new(row(&["5", "a"]), &comparator)?;
        let b = KeyedRow::new(row(&["5", "c"]), &comparator)?;
        assert_eq!(a.compare(&b, &comparator), Ordering::Greater);
        assert_eq!(b.into_row(), row(&["5", "c"]));
        Ok(())
    }

    #[test]
    fn test_compares_stored_form() -> Result<(), anyhow::Error> {
        let sort_key = SortKey::new(vec![Field::new(0, FieldType::String), Field::new(1, FieldType::String)]);
        let comparator = RecordComparator::new(layout()?, &sort_key)?;
        // "+8" is stored as 8, which sorts after "10" as text
        let a = KeyedRow::new(row(&["+8", "a"]), &comparator)?;
        let b = KeyedRow::new(row(&["10", "a"]), &comparator)?;
        assert_eq!(a.compare(&b, &comparator), Ordering::Greater);
        // 'é' is stored as '?', which sorts before 'a'
        let c = KeyedRow::new(row(&["1", "é"]), &comparator)?;
        let d = KeyedRow::new(row(&["1", "a"]), &comparator)?;
        assert_eq!(c.compare(&d, &comparator), Ordering::Less);
        Ok(())
    }
}
