//! zlib compression applied to framed objects before they reach disk.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::error::{StoreError, StoreResult};

/// Default zlib level, matching git's `core.compression` default.
pub const DEFAULT_LEVEL: u32 = 6;

/// Compress `data` as a single zlib stream. Levels above 9 are clamped.
pub fn compress(data: &[u8], level: u32) -> StoreResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 16),
        Compression::new(level.min(9)),
    );
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflate a complete zlib stream.
///
/// The stream must reach its end marker and fill `data` exactly. flate2's
/// `Read` adapters report a truncated stream as a clean EOF, so the inflater
/// is driven directly.
pub fn decompress(data: &[u8]) -> StoreResult<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len().saturating_mul(2).max(64));

    loop {
        let (before_in, before_out) = (inflater.total_in(), inflater.total_out());
        let consumed = before_in as usize;
        let status = inflater
            .decompress_vec(&data[consumed..], &mut out, FlushDecompress::Finish)
            .map_err(|e| StoreError::CorruptStream(e.to_string()))?;

        match status {
            Status::StreamEnd if inflater.total_in() as usize == data.len() => return Ok(out),
            Status::StreamEnd => {
                return Err(StoreError::CorruptStream(
                    "trailing bytes after zlib stream".into(),
                ))
            }
            Status::Ok | Status::BufError => {
                if out.len() == out.capacity() {
                    out.reserve(out.capacity());
                    continue;
                }
                let stalled =
                    inflater.total_in() == before_in && inflater.total_out() == before_out;
                let starved =
                    inflater.total_in() as usize == data.len() && status == Status::BufError;
                if stalled || starved {
                    return Err(StoreError::CorruptStream("truncated zlib stream".into()));
                }
            }
        }
    }
}
