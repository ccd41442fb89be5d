//! The property block codec: u16 column-position tags followed by
//! fixed-width or length-prefixed values, little-endian throughout.
//!
//! Absence is represented by omission. A row's block holds one tag/value
//! pair per present property, in column order; columns never written for a
//! row simply do not appear.

use crate::error::{Error, Result};
use crate::row::Value;
use crate::schema::{Column, ColumnType};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::collections::BTreeMap;
use std::mem::size_of;
use std::str;

/// Serialize the present properties of a row. Validation happens before
/// any byte of the offending pair is emitted, so a mismatch leaves the
/// output untouched.
pub(crate) fn encode_properties(
    columns: &[Column],
    properties: &BTreeMap<u16, Value>,
) -> Result<Vec<u8>> {
    if let Some((&position, _)) = properties.range(columns.len() as u16..).next() {
        return Err(Error::ColumnOutOfRange(position));
    }
    let mut block = Vec::new();
    for (position, column) in columns.iter().enumerate() {
        let position = position as u16;
        let Some(value) = properties.get(&position) else {
            continue;
        };
        match column.r#type {
            ColumnType::Json | ColumnType::DateTime | ColumnType::Binary => {
                return Err(Error::UnsupportedColumnType(column.r#type));
            }
            declared if declared != value.column_type() => {
                return Err(Error::TypeMismatch {
                    column: column.name.clone(),
                    expected: declared,
                    actual: value.type_name(),
                });
            }
            _ => {}
        }
        block.write_u16::<LittleEndian>(position)?;
        match value {
            Value::Byte(v) => block.write_i8(*v)?,
            Value::UByte(v) => block.write_u8(*v)?,
            Value::Bool(v) => block.write_u8(*v as u8)?,
            Value::Short(v) => block.write_i16::<LittleEndian>(*v)?,
            Value::UShort(v) => block.write_u16::<LittleEndian>(*v)?,
            Value::Int(v) => block.write_i32::<LittleEndian>(*v)?,
            Value::UInt(v) => block.write_u32::<LittleEndian>(*v)?,
            Value::Long(v) => block.write_i64::<LittleEndian>(*v)?,
            Value::ULong(v) => block.write_u64::<LittleEndian>(*v)?,
            Value::Float(v) => block.write_f32::<LittleEndian>(*v)?,
            Value::Double(v) => block.write_f64::<LittleEndian>(*v)?,
            Value::String(v) => {
                block.write_u32::<LittleEndian>(v.len() as u32)?;
                block.extend_from_slice(v.as_bytes());
            }
        }
    }
    Ok(block)
}

fn take<'a>(block: &'a [u8], offset: &mut usize, n: usize) -> Result<&'a [u8]> {
    if block.len() - *offset < n {
        return Err(Error::Truncated {
            expected: n,
            actual: block.len() - *offset,
        });
    }
    let slice = &block[*offset..*offset + n];
    *offset += n;
    Ok(slice)
}

/// Parse a property block back into the sparse positional mapping.
pub(crate) fn decode_properties(
    columns: &[Column],
    block: &[u8],
) -> Result<BTreeMap<u16, Value>> {
    let mut properties = BTreeMap::new();
    let mut offset = 0;
    // a stray trailing byte (seen in data written by other encoders after a
    // final Binary column) falls below the tag width and is left unread
    while offset + size_of::<u16>() <= block.len() {
        let position = LittleEndian::read_u16(take(block, &mut offset, size_of::<u16>())?);
        let column = columns
            .get(position as usize)
            .ok_or(Error::ColumnOutOfRange(position))?;
        let value = match column.r#type {
            ColumnType::Byte => Value::Byte(take(block, &mut offset, 1)?[0] as i8),
            ColumnType::UByte => Value::UByte(take(block, &mut offset, 1)?[0]),
            ColumnType::Bool => Value::Bool(take(block, &mut offset, 1)?[0] != 0),
            ColumnType::Short => {
                Value::Short(LittleEndian::read_i16(take(block, &mut offset, 2)?))
            }
            ColumnType::UShort => {
                Value::UShort(LittleEndian::read_u16(take(block, &mut offset, 2)?))
            }
            ColumnType::Int => Value::Int(LittleEndian::read_i32(take(block, &mut offset, 4)?)),
            ColumnType::UInt => Value::UInt(LittleEndian::read_u32(take(block, &mut offset, 4)?)),
            ColumnType::Long => Value::Long(LittleEndian::read_i64(take(block, &mut offset, 8)?)),
            ColumnType::ULong => {
                Value::ULong(LittleEndian::read_u64(take(block, &mut offset, 8)?))
            }
            ColumnType::Float => {
                Value::Float(LittleEndian::read_f32(take(block, &mut offset, 4)?))
            }
            ColumnType::Double => {
                Value::Double(LittleEndian::read_f64(take(block, &mut offset, 8)?))
            }
            ColumnType::String => {
                let len = LittleEndian::read_u32(take(block, &mut offset, 4)?) as usize;
                Value::String(str::from_utf8(take(block, &mut offset, len)?)?.to_string())
            }
            ColumnType::Json | ColumnType::DateTime | ColumnType::Binary => {
                return Err(Error::UnsupportedColumnType(column.r#type));
            }
        };
        properties.insert(position, value);
    }
    Ok(properties)
}
