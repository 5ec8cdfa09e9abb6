//! Little-endian binary codecs for KV values.
//!
//! Everything the index persists (embeddings, hyperplane matrices,
//! configuration scalars) goes through these functions, so the formats here
//! are the on-disk contract. `f64` values round-trip bitwise, which is what
//! makes sketches stable across process restarts.

use crate::error::{Error, Result};

/// Encode an `f64` slice as a packed little-endian byte sequence.
pub fn encode_f64_slice(values: &[f64]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(values.len() * 8);
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

/// Decode a packed little-endian `f64` sequence.
///
/// Fails with [`Error::Format`] if the payload is not a multiple of 8 bytes.
pub fn decode_f64_slice(data: &[u8]) -> Result<Vec<f64>> {
    if data.len() % 8 != 0 {
        return Err(Error::Format(format!(
            "f64 payload length {} is not a multiple of 8",
            data.len()
        )));
    }

    Ok(data
        .chunks_exact(8)
        .map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            f64::from_le_bytes(bytes)
        })
        .collect())
}

/// Encode a row-major `f64` matrix as a packed little-endian byte sequence.
///
/// Rows are concatenated in order; the row width is not stored and must be
/// supplied again on decode.
pub fn encode_f64_matrix(rows: &[Vec<f64>]) -> Vec<u8> {
    let width = rows.first().map_or(0, Vec::len);
    let mut buf = Vec::with_capacity(rows.len() * width * 8);
    for row in rows {
        for v in row {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }
    buf
}

/// Decode a row-major `f64` matrix with `num_cols` columns per row.
///
/// Fails with [`Error::Format`] if `num_cols` is zero or the payload does not
/// divide evenly into rows of that width.
pub fn decode_f64_matrix(data: &[u8], num_cols: usize) -> Result<Vec<Vec<f64>>> {
    if num_cols == 0 {
        return Err(Error::Format("matrix width cannot be zero".into()));
    }

    let flat = decode_f64_slice(data)?;
    if flat.len() % num_cols != 0 {
        return Err(Error::Format(format!(
            "matrix payload of {} values does not divide into rows of {}",
            flat.len(),
            num_cols
        )));
    }

    Ok(flat.chunks_exact(num_cols).map(<[f64]>::to_vec).collect())
}

/// Encode a `u32` as little-endian bytes.
pub fn encode_u32(value: u32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// Decode a little-endian `u32`.
///
/// Fails with [`Error::Format`] if the payload is not exactly 4 bytes.
pub fn decode_u32(data: &[u8]) -> Result<u32> {
    let bytes: [u8; 4] = data
        .try_into()
        .map_err(|_| Error::Format(format!("u32 payload has {} bytes, expected 4", data.len())))?;
    Ok(u32::from_le_bytes(bytes))
}
