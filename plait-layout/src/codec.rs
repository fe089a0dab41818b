//! The byte encoding of a column chunk.
//!
//! Each occurrence is encoded as a little-endian `u16` repetition level, a `u16` definition
//! level, and then the value only if the definition level equals the column's maximum. Booleans
//! are one byte, numbers are their little-endian bytes, and UTF-8 and binary values are a `u32`
//! byte length followed by the bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use plait_error::{PlaitResult, plait_bail, plait_err};
use plait_scalar::Value;
use plait_schema::{ColumnDescriptor, PType};

use crate::{Levels, Triple};

/// The encoded size of a triple's levels.
pub const LEVELS_SIZE: usize = 4;

/// Append one triple to `buf`. The triple must already be valid for `column`.
pub fn encode_triple(
    buf: &mut BytesMut,
    column: &ColumnDescriptor,
    triple: &Triple,
) -> PlaitResult<()> {
    buf.put_u16_le(triple.rep);
    buf.put_u16_le(triple.def);
    if triple.def < column.max_def() {
        return Ok(());
    }
    match (&triple.value, column.ptype()) {
        (Value::Bool(v), PType::Bool) => buf.put_u8(u8::from(*v)),
        (Value::I32(v), PType::I32) => buf.put_i32_le(*v),
        (Value::I64(v), PType::I64) => buf.put_i64_le(*v),
        (Value::F32(v), PType::F32) => buf.put_f32_le(*v),
        (Value::F64(v), PType::F64) => buf.put_f64_le(*v),
        (Value::Utf8(v), PType::Utf8) => put_var_len(buf, v.as_bytes())?,
        (Value::Binary(v), PType::Binary) => put_var_len(buf, v)?,
        (value, ptype) => plait_bail!(
            "cannot encode {} value into {ptype} column {}",
            value.type_name(),
            column.path()
        ),
    }
    Ok(())
}

fn put_var_len(buf: &mut BytesMut, bytes: &[u8]) -> PlaitResult<()> {
    buf.put_u32_le(u32::try_from(bytes.len())?);
    buf.put_slice(bytes);
    Ok(())
}

/// Decode the levels of the occurrence starting at `pos`.
pub fn decode_levels(data: &[u8], pos: usize) -> PlaitResult<Levels> {
    let mut buf = remaining(data, pos, LEVELS_SIZE)?;
    Ok(Levels::new(buf.get_u16_le(), buf.get_u16_le()))
}

/// Decode a value of type `ptype` starting at `pos`, returning it and its encoded size.
pub fn decode_value(data: &Bytes, pos: usize, ptype: PType) -> PlaitResult<(Value, usize)> {
    if let Some(width) = ptype.byte_width() {
        let mut buf = remaining(data, pos, width)?;
        let value = match ptype {
            PType::Bool => Value::Bool(buf.get_u8() != 0),
            PType::I32 => Value::I32(buf.get_i32_le()),
            PType::I64 => Value::I64(buf.get_i64_le()),
            PType::F32 => Value::F32(buf.get_f32_le()),
            PType::F64 => Value::F64(buf.get_f64_le()),
            PType::Utf8 | PType::Binary => plait_bail!(InvalidSerde: "{ptype} has no fixed width"),
        };
        return Ok((value, width));
    }

    let len = var_len(data, pos)?;
    let start = pos + 4;
    remaining(data, start, len)?;
    let bytes = data.slice(start..start + len);
    let value = match ptype {
        PType::Utf8 => Value::Utf8(
            std::str::from_utf8(&bytes)
                .map_err(|e| plait_err!(InvalidSerde: "invalid utf8 value at offset {pos}: {e}"))?
                .into(),
        ),
        _ => Value::Binary(bytes),
    };
    Ok((value, 4 + len))
}

/// The encoded size of the value of type `ptype` starting at `pos`, without decoding it.
pub fn value_size(data: &[u8], pos: usize, ptype: PType) -> PlaitResult<usize> {
    let size = match ptype.byte_width() {
        Some(width) => width,
        None => 4 + var_len(data, pos)?,
    };
    remaining(data, pos, size)?;
    Ok(size)
}

fn var_len(data: &[u8], pos: usize) -> PlaitResult<usize> {
    Ok(usize::try_from(remaining(data, pos, 4)?.get_u32_le())?)
}

fn remaining(data: &[u8], pos: usize, len: usize) -> PlaitResult<&[u8]> {
    match pos.checked_add(len) {
        Some(end) if end <= data.len() => Ok(&data[pos..end]),
        _ => plait_bail!(
            InvalidSerde: "column chunk truncated: need {len} bytes at offset {pos}, have {}",
            data.len().saturating_sub(pos)
        ),
    }
}
