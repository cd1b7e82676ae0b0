//! Conversion of text values to and from their fixed width binary form.
//!
//! * integers are stored big endian in two's complement
//! * big integers are stored as one length byte followed by the minimal two's complement
//!   representation sign extended to the declared width. Sign extension alone cannot tell
//!   `[0x00, 0xE0]` (224) from a padded `[0xE0]` (-32), the length byte can.
//! * strings are truncated to the declared width and zero padded on the left

use std::str::FromStr;

use num_bigint::{BigInt, Sign};

use crate::column_type::{Charset, ColumnType};
use crate::error::SortError;
use crate::key::Key;

/// Encode `value` into `out`, which must be exactly `column_type.width()` bytes long.
pub fn encode(value: &str, column_type: &ColumnType, out: &mut [u8]) -> Result<(), SortError> {
    check_width(out.len(), column_type)?;
    match column_type {
        ColumnType::FixedInt32 => {
            let i = i32::from_str(value)
                .map_err(|e| SortError::Encoding(format!("'{value}' is not a 32 bit integer: {e}")))?;
            out.copy_from_slice(&i.to_be_bytes());
        }
        ColumnType::FixedInt64 => {
            let i = i64::from_str(value)
                .map_err(|e| SortError::Encoding(format!("'{value}' is not a 64 bit integer: {e}")))?;
            out.copy_from_slice(&i.to_be_bytes());
        }
        ColumnType::FixedBigInt { byte_width } => {
            encode_big_int(value, *byte_width, out)?;
        }
        ColumnType::FixedString { char_width, charset } => {
            encode_string(value, *char_width, charset, out);
        }
    }
    Ok(())
}

/// Decode the text value stored in `bytes`.
pub fn decode(bytes: &[u8], column_type: &ColumnType) -> Result<String, SortError> {
    Ok(decode_key(bytes, column_type)?.to_string())
}

/// Decode the logical value stored in `bytes`.
pub fn decode_key(bytes: &[u8], column_type: &ColumnType) -> Result<Key, SortError> {
    check_width(bytes.len(), column_type)?;
    let key = match column_type {
        ColumnType::FixedInt32 => Key::Integer(i32::from_be_bytes(array(bytes)?) as i64),
        ColumnType::FixedInt64 => Key::Integer(i64::from_be_bytes(array(bytes)?)),
        ColumnType::FixedBigInt { byte_width } => Key::BigInteger(decode_big_int(bytes, *byte_width)?),
        ColumnType::FixedString { charset, .. } => {
            let s = bytes.iter()
                .skip_while(|b| **b == 0)
                .map(|b| charset.decode_byte(*b))
                .collect();
            Key::String(s)
        }
    };
    Ok(key)
}

fn check_width(len: usize, column_type: &ColumnType) -> Result<(), SortError> {
    if len != column_type.width() {
        Err(SortError::InternalInvariant(
            format!("{:?} needs {} bytes, got {}", column_type, column_type.width(), len)
        ))
    } else {
        Ok(())
    }
}

fn array<const N: usize>(bytes: &[u8]) -> Result<[u8; N], SortError> {
    bytes.try_into()
        .map_err(|_| SortError::InternalInvariant(format!("expected {} bytes, got {}", N, bytes.len())))
}

fn encode_big_int(value: &str, byte_width: usize, out: &mut [u8]) -> Result<(), SortError> {
    let i = BigInt::from_str(value)
        .map_err(|e| SortError::Encoding(format!("'{value}' is not an integer: {e}")))?;
    let mut minimal = i.to_signed_bytes_be();
    if minimal.is_empty() {
        minimal.push(0);
    }
    if minimal.len() > byte_width {
        return Err(
            SortError::Encoding(
                format!("'{}' needs {} bytes but the column holds {}", value, minimal.len(), byte_width)
            )
        );
    }

    // 256 wraps to 128, which decodes to 0 and is read back as 256
    out[0] = (minimal.len() as i32 - 128) as u8;
    let pad = if i.sign() == Sign::Minus { 0xff } else { 0x00 };
    let padding = byte_width - minimal.len();
    out[1..=padding].fill(pad);
    out[1 + padding..].copy_from_slice(&minimal);
    Ok(())
}

fn decode_big_int(bytes: &[u8], byte_width: usize) -> Result<BigInt, SortError> {
    let mut len = (bytes[0] as i8 as i32 + 128) as usize;
    if len == 0 {
        len = 256;
    }
    if len > byte_width {
        return Err(
            SortError::InternalInvariant(
                format!("stored big integer length {len} exceeds column width {byte_width}")
            )
        );
    }
    Ok(BigInt::from_signed_bytes_be(&bytes[1 + byte_width - len..]))
}

fn encode_string(value: &str, char_width: usize, charset: &Charset, out: &mut [u8]) {
    let encoded: Vec<u8> = value.chars()
        .take(char_width)
        .map(|c| charset.encode_char(c))
        .collect();
    let padding = out.len() - encoded.len();
    out[..padding].fill(0);
    out[padding..].copy_from_slice(&encoded);
}
