use crate::error::SortError;
use crate::field::Field;
use crate::field_type::FieldType;
use crate::order::Order;

/// Ordered list of [Field]s, compared lexicographically.
///
/// # Examples
/// ```
/// use table_file_sort::field::Field;
/// use table_file_sort::field_type::FieldType;
/// use table_file_sort::order::Order;
/// use table_file_sort::sort_key::SortKey;
///
/// // by the first column as an integer, then by the second column descending
/// let sort_key = SortKey::new(vec![
///     Field::new(0, FieldType::Integer),
///     Field::new(1, FieldType::String).with_order(Order::Desc),
/// ]);
/// assert_eq!(sort_key.fields().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    fields: Vec<Field>,
    orders: Vec<Order>,
}

impl SortKey {
    pub fn new(fields: Vec<Field>) -> SortKey {
        let orders = fields.iter().map(|f| f.order()).collect();
        SortKey {
            fields,
            orders,
        }
    }

    /// Sort key made of a single field
    pub fn of(field: Field) -> SortKey {
        SortKey::new(vec![field])
    }

    /// Every column in ascending string order, used when no field is given
    pub fn all_columns(columns: usize) -> SortKey {
        SortKey::new((0..columns).map(|i| Field::new(i, FieldType::String)).collect())
    }

    pub fn fields(&self) -> &Vec<Field> {
        &self.fields
    }

    pub(crate) fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Fail when a field refers to a column beyond `columns`
    pub fn validate(&self, columns: usize) -> Result<(), SortError> {
        if self.fields.is_empty() {
            return Err(SortError::Configuration("sort key has no fields".to_string()));
        }
        match self.fields.iter().find(|f| f.index() >= columns) {
            Some(field) => Err(
                SortError::Configuration(
                    format!("sort field {} is out of range for {} columns", field.index(), columns)
                )
            ),
            None => Ok(()),
        }
    }

    /// Key of the narrow index built from the key columns followed by a row ordinal.
    ///
    /// Field `i` of the index is field `i` of this key, the ordinal ascends and breaks ties.
    pub fn index_key(&self) -> SortKey {
        let mut fields: Vec<Field> = self.fields.iter()
            .enumerate()
            .map(|(i, f)| f.clone().with_index(i))
            .collect();
        fields.push(Field::new(self.fields.len(), FieldType::Integer));
        SortKey::new(fields)
    }

    /// Column indices of the key fields, in key order
    pub fn columns(&self) -> Vec<usize> {
        self.fields.iter().map(|f| f.index()).collect()
    }
}
