use crate::field_type::FieldType;
use crate::order::Order;

/// Defines a sort key field of a row.
///
/// Fields are compared in the order they are listed in a [SortKey](crate::sort_key::SortKey),
/// later fields break ties of earlier ones.
///
/// # Examples
/// ```
/// // sort by the third column as an integer, largest first
/// use table_file_sort::field::Field;
/// use table_file_sort::field_type::FieldType;
/// use table_file_sort::order::Order;
/// let field = Field::new(2, FieldType::Integer)
///     .with_order(Order::Desc);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    index: usize,
    field_type: FieldType,
    order: Order,
}

impl Field {
    /// Create a new ascending [Field]
    ///
    /// # Arguments
    /// * `index` - the index of the column, starting at 0
    /// * `field_type` - the type used to compare text values. See [FieldType] for supported types
    pub fn new(
        index: usize,
        field_type: FieldType,
    ) -> Field {
        Field {
            index,
            field_type,
            order: Order::Asc,
        }
    }

    /// Get the index for this field.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the [FieldType] for this field.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Get the [Order] for this field.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Specify the column index for this field, starting at 0.
    pub fn with_index(mut self, index: usize) -> Field {
        self.index = index;
        self
    }

    /// Specify the field type for this field. See [FieldType] for supported types.
    pub fn with_field_type(mut self, field_type: FieldType) -> Field {
        self.field_type = field_type;
        self
    }

    /// Specify the order for this field.
    pub fn with_order(mut self, order: Order) -> Field {
        self.order = order;
        self
    }
}
