use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use num_bigint::BigInt;

use crate::error::SortError;
use crate::field::Field;
use crate::field_type::FieldType;
use crate::order::Order;

/// Logical value of a sort key field, either parsed from text or decoded from a binary record.
#[derive(Clone, Debug)]
pub enum Key {
    String(String),
    Integer(i64),
    BigInteger(BigInt),
}

impl Key {
    pub(crate) fn new(field: &str, field_def: &Field) -> Result<Key, SortError> {
        match field_def.field_type() {
            FieldType::String => {
                Ok(Key::String(field.to_string()))
            }
            FieldType::Integer => {
                let i = i64::from_str(field)
                    .map_err(|e| SortError::Encoding(
                        format!("field {}: '{}' is not an integer: {}", field_def.index(), field, e)
                    ))?;
                Ok(Key::Integer(i))
            }
            FieldType::BigInteger => {
                let i = BigInt::from_str(field)
                    .map_err(|e| SortError::Encoding(
                        format!("field {}: '{}' is not an integer: {}", field_def.index(), field, e)
                    ))?;
                Ok(Key::BigInteger(i))
            }
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Key::Integer(_) | Key::BigInteger(_) => 0,
            Key::String(_) => 1,
        }
    }
}

/// Compare two key tuples field by field, inverting fields in [Order::Desc]
pub(crate) fn compare_keys(a: &[Key], b: &[Key], orders: &[Order]) -> Ordering {
    for ((ka, kb), order) in a.iter().zip(b.iter()).zip(orders.iter()) {
        let ordering = match order {
            Order::Asc => ka.cmp(kb),
            Order::Desc => kb.cmp(ka),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::String(s) => write!(f, "{}", s),
            Key::Integer(i) => write!(f, "{}", i),
            Key::BigInteger(i) => write!(f, "{}", i),
        }
    }
}

impl Eq for Key {}

impl PartialEq<Self> for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd<Self> for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::String(a), Key::String(b)) => a.cmp(b),
            (Key::Integer(a), Key::Integer(b)) => a.cmp(b),
            (Key::BigInteger(a), Key::BigInteger(b)) => a.cmp(b),
            (Key::Integer(a), Key::BigInteger(b)) => BigInt::from(*a).cmp(b),
            (Key::BigInteger(a), Key::Integer(b)) => a.cmp(&BigInt::from(*b)),
            // numbers sort before strings
            _ => self.rank().cmp(&other.rank()),
        }
    }
}
