use std::cmp::Ordering;

use crate::codec;
use crate::column_type::ColumnType;
use crate::error::SortError;
use crate::field::Field;
use crate::field_type::FieldType;
use crate::key::{compare_keys, Key};
use crate::order::Order;
use crate::record_layout::RecordLayout;
use crate::sort_key::SortKey;

/// Compare two encoded values of the same column type.
///
/// Values are decoded first, two's complement integers do not sort as unsigned bytes.
pub fn compare(
    column_type: &ColumnType,
    bytes1: &[u8],
    offset1: usize,
    bytes2: &[u8],
    offset2: usize,
) -> Result<Ordering, SortError> {
    let width = column_type.width();
    let a = codec::decode_key(slice(bytes1, offset1, width)?, column_type)?;
    let b = codec::decode_key(slice(bytes2, offset2, width)?, column_type)?;
    Ok(a.cmp(&b))
}

fn slice(bytes: &[u8], offset: usize, width: usize) -> Result<&[u8], SortError> {
    bytes.get(offset..offset + width).ok_or_else(||
        SortError::InternalInvariant(
            format!("value at offset {} with width {} is beyond {} bytes", offset, width, bytes.len())
        )
    )
}

/// Orders binary records of a layout by a sort key.
///
/// Key values are compared as the [FieldType] of their field says, the same way text rows are
/// compared, so records order like the rows they were encoded from.
#[derive(Clone, Debug)]
pub struct RecordComparator {
    layout: RecordLayout,
    fields: Vec<Field>,
    orders: Vec<Order>,
}

impl RecordComparator {
    pub fn new(layout: RecordLayout, sort_key: &SortKey) -> Result<RecordComparator, SortError> {
        sort_key.validate(layout.len())?;
        Ok(
            RecordComparator {
                layout,
                fields: sort_key.fields().clone(),
                orders: sort_key.orders().to_vec(),
            }
        )
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Decode the sort key columns of a record
    pub fn keys(&self, record: &[u8]) -> Result<Vec<Key>, SortError> {
        self.fields.iter()
            .map(|field| {
                let column_type = &self.layout.columns()[field.index()];
                field_key(self.layout.column_bytes(record, field.index()), column_type, field)
            })
            .collect()
    }

    /// Keys of a text row as they will read back once the row is encoded.
    ///
    /// Values are passed through their column encoding first, so truncated strings, unmappable
    /// chars and integers such as `+8` compare like their stored form.
    pub fn row_keys(&self, row: &[String]) -> Result<Vec<Key>, SortError> {
        self.fields.iter()
            .map(|field| {
                let value = row.get(field.index()).ok_or_else(||
                    SortError::MalformedInput(
                        format!("requested field {} but the row has {} fields", field.index(), row.len())
                    )
                )?;
                let column_type = &self.layout.columns()[field.index()];
                let mut bytes = vec![0u8; column_type.width()];
                codec::encode(value, column_type, &mut bytes)?;
                field_key(&bytes, column_type, field)
            })
            .collect()
    }

    pub fn compare_keys(&self, a: &[Key], b: &[Key]) -> Ordering {
        compare_keys(a, b, &self.orders)
    }

    pub fn compare(&self, a: &[u8], b: &[u8]) -> Result<Ordering, SortError> {
        Ok(self.compare_keys(&self.keys(a)?, &self.keys(b)?))
    }
}

fn field_key(bytes: &[u8], column_type: &ColumnType, field: &Field) -> Result<Key, SortError> {
    match (column_type, field.field_type()) {
        (ColumnType::FixedString { .. }, FieldType::String) |
        (ColumnType::FixedInt32 | ColumnType::FixedInt64 | ColumnType::FixedBigInt { .. },
            FieldType::Integer | FieldType::BigInteger) => {
            codec::decode_key(bytes, column_type)
        }
        _ => {
            Key::new(&codec::decode(bytes, column_type)?, field)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use crate::column_type::{Charset, ColumnType};
    use crate::comparator::{compare, RecordComparator};
    use crate::error::SortError;
    use crate::field::Field;
    use crate::field_type::FieldType;
    use crate::order::Order;
    use crate::record_layout::RecordLayout;
    use crate::sort_key::SortKey;

    #[test]
    fn test_negative_integers() -> Result<(), anyhow::Error> {
        // raw bytes of -1 are greater than those of 1
        let a = (-1i32).to_be_bytes();
        let b = 1i32.to_be_bytes();
        assert!(a > b);
        assert_eq!(compare(&ColumnType::FixedInt32, &a, 0, &b, 0)?, Ordering::Less);
        assert_eq!(compare(&ColumnType::FixedInt32, &[9, 0, 0, 0, 7], 1, &b, 0)?, Ordering::Greater);
        Ok(())
    }

    #[test]
    fn test_big_int_by_value() -> Result<(), anyhow::Error> {
        let column_type = ColumnType::fixed_big_int(2)?;
        let mut a = [0u8; 3];
        let mut b = [0u8; 3];
        crate::codec::encode("-32", &column_type, &mut a)?;
        crate::codec::encode("224", &column_type, &mut b)?;
        assert_eq!(compare(&column_type, &a, 0, &b, 0)?, Ordering::Less);
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        assert!(compare(&ColumnType::FixedInt64, &[0; 4], 0, &[0; 8], 0).is_err());
    }

    #[test]
    fn test_records() -> Result<(), anyhow::Error> {
        let layout = RecordLayout::new(vec![
            ColumnType::FixedInt32,
            ColumnType::fixed_string(2, Charset::UsAscii)?,
        ]);
        let sort_key = SortKey::new(vec![
            Field::new(0, FieldType::Integer),
            Field::new(1, FieldType::String).with_order(Order::Desc),
        ]);
        let comparator = RecordComparator::new(layout, &sort_key)?;
        let a = [0, 0, 0, 5, b'a', b'a'];
        let b = [0, 0, 0, 5, b'b', b'b'];
        let c = [0, 0, 0, 2, b'z', b'z'];
        assert_eq!(comparator.compare(&a, &b)?, Ordering::Greater);
        assert_eq!(comparator.compare(&c, &a)?, Ordering::Less);
        let ka = comparator.keys(&a)?;
        let kb = comparator.keys(&b)?;
        assert_eq!(comparator.compare_keys(&ka, &kb), Ordering::Greater);
        Ok(())
    }

    #[test]
    fn test_field_type_wins() -> Result<(), anyhow::Error> {
        let layout = RecordLayout::new(vec![ColumnType::FixedInt32]);
        let mut nine = [0u8; 4];
        let mut ten = [0u8; 4];
        crate::codec::encode("9", &ColumnType::FixedInt32, &mut nine)?;
        crate::codec::encode("10", &ColumnType::FixedInt32, &mut ten)?;
        let as_text = RecordComparator::new(layout.clone(), &SortKey::of(Field::new(0, FieldType::String)))?;
        assert_eq!(as_text.compare(&nine, &ten)?, Ordering::Greater);
        let as_number = RecordComparator::new(layout, &SortKey::of(Field::new(0, FieldType::Integer)))?;
        assert_eq!(as_number.compare(&nine, &ten)?, Ordering::Less);
        Ok(())
    }

    #[test]
    fn test_row_keys_match_records() -> Result<(), anyhow::Error> {
        let layout = RecordLayout::new(vec![
            ColumnType::FixedInt32,
            ColumnType::fixed_string(2, Charset::UsAscii)?,
        ]);
        let sort_key = SortKey::new(vec![Field::new(0, FieldType::String), Field::new(1, FieldType::String)]);
        let comparator = RecordComparator::new(layout.clone(), &sort_key)?;
        for row in [["+8", "é"], ["08", "abc"], ["-0", "zz"]] {
            let row: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            let mut record = vec![0u8; layout.record_length()];
            layout.encode_row(&row, &mut record)?;
            assert_eq!(comparator.row_keys(&row)?, comparator.keys(&record)?);
        }
        let keys = comparator.row_keys(&["+8".to_string(), "é".to_string()])?;
        assert_eq!(keys[0].to_string(), "8");
        assert_eq!(keys[1].to_string(), "?");
        Ok(())
    }

    #[test]
    fn test_row_keys_errors() -> Result<(), anyhow::Error> {
        let layout = RecordLayout::new(vec![ColumnType::FixedInt32, ColumnType::FixedInt32]);
        let comparator = RecordComparator::new(layout, &SortKey::of(Field::new(1, FieldType::Integer)))?;
        assert!(matches!(comparator.row_keys(&["1".to_string()]), Err(SortError::MalformedInput(_))));
        assert!(matches!(comparator.row_keys(&["1".to_string(), "x".to_string()]), Err(SortError::Encoding(_))));
        assert!(matches!(
            comparator.row_keys(&["1".to_string(), "99999999999".to_string()]),
            Err(SortError::Encoding(_))
        ));
        Ok(())
    }
}
