//! Carryless adaptive range coder used by PBG6 for both the table of
//! contents and each entry's payload.
//!
//! A direct port of `InitCryptPools`/`CryptStep`/`encrypt`/`decrypt` from
//! the original `pbg6.cpp`. The model is order-0 over 258 symbols: the 256
//! byte values plus one end-of-stream symbol (257 is allocated in the
//! cumulative table but never assigned any probability mass). `pool1` holds
//! cumulative frequencies (`pool1[sym]..pool1[sym+1]` is symbol `sym`'s
//! slice of the range), `pool2` holds each symbol's individual weight.
//!
//! The decoder's symbol lookup is a cumulative-frequency binary search
//! rather than the original's hand-unrolled register shuffle — the wire
//! format only depends on the `low`/`range` renormalization, which is
//! ported arithmetically as-is.

/// Symbol emitted once after the last real byte, so the decoder's model
/// stays in lockstep even though decoding itself stops by count, not by
/// seeing this symbol (see `decode`).
const EOF_SYMBOL: usize = 256;
/// Index of the running total in `pool1` (also `CP1_SIZE - 1`).
const TOTAL_INDEX: usize = 0x101;
const POOL1_LEN: usize = 0x102;
const POOL2_LEN: usize = 0x400;
const BOTTOM: u32 = 0x0001_0000;

struct Model {
    pool1: [u32; POOL1_LEN],
    pool2: [u32; POOL2_LEN],
}

impl Model {
    fn new() -> Self {
        let mut pool1 = [0u32; POOL1_LEN];
        for (i, slot) in pool1.iter_mut().enumerate() {
            *slot = i as u32;
        }
        Self { pool1, pool2: [1u32; POOL2_LEN] }
    }

    /// Folds one occurrence of `sym` into the model, rescaling both pools
    /// once the running total would overflow 16 bits.
    fn update(&mut self, sym: usize) {
        self.pool2[sym] += 1;
        for s in (sym + 1)..=TOTAL_INDEX {
            self.pool1[s] += 1;
        }
        if self.pool1[TOTAL_INDEX] < 0x10000 {
            return;
        }
        self.pool1[0] = 0;
        for c in 0..TOTAL_INDEX {
            self.pool2[c] = (self.pool2[c] | 2) >> 1;
            self.pool1[c + 1] = self.pool1[c] + self.pool2[c];
        }
    }
}

/// Encodes `data` followed by an implicit end-of-stream symbol.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut model = Model::new();
    let mut low: u32 = 0;
    let mut range: u32 = 0xFFFF_FFFF;
    let mut out = Vec::new();

    for i in 0..=data.len() {
        let sym = if i != data.len() { data[i] as usize } else { EOF_SYMBOL };

        let total = model.pool1[TOTAL_INDEX];
        let unit = range / total;
        low = low.wrapping_add(model.pool1[sym].wrapping_mul(unit));
        range = model.pool2[sym].wrapping_mul(unit);

        loop {
            let diff = low.wrapping_add(range) ^ low;
            if diff & 0xFF00_0000 != 0 {
                break;
            }
            out.push((low >> 24) as u8);
            low <<= 8;
            range <<= 8;
        }
        while range < BOTTOM {
            range = BOTTOM.wrapping_sub(low & 0xFFFF);
            out.push((low >> 24) as u8);
            low <<= 8;
            range <<= 8;
        }

        if sym != EOF_SYMBOL {
            model.update(sym);
        }
    }

    for _ in 0..4 {
        out.push((low >> 24) as u8);
        low <<= 8;
    }
    out
}

/// Decodes exactly `decompressed_size` bytes from `source`.
///
/// Decoding stops purely by count, matching the original: the end-of-
/// stream symbol keeps the model's arithmetic in sync with the encoder but
/// is never itself looked for on the way out, since every container format
/// records an exact decompressed size up front. Unlike the original's
/// commented-out bounds check, a renormalization read that runs past the
/// end of `source` is a fatal `Error::Truncated`, not a zero-padded guess.
pub fn decode(source: &[u8], decompressed_size: usize) -> Result<Vec<u8>, crate::Error> {
    if decompressed_size == 0 {
        return Ok(Vec::new());
    }
    if source.len() < 4 {
        return Err(crate::Error::Truncated { needed: 4, available: source.len() });
    }

    let mut model = Model::new();
    let mut s = 4usize;
    let mut next_byte = |s: &mut usize, source: &[u8]| -> Result<u32, crate::Error> {
        let b = source
            .get(*s)
            .copied()
            .ok_or(crate::Error::Truncated { needed: *s + 1, available: source.len() })?;
        *s += 1;
        Ok(b as u32)
    };

    let mut code = u32::from_be_bytes(source[0..4].try_into().expect("checked length above"));
    let mut low: u32 = 0;
    let mut range: u32 = 0xFFFF_FFFF;
    let mut out = Vec::with_capacity(decompressed_size);

    loop {
        let total = model.pool1[TOTAL_INDEX];
        if total == 0 {
            return Err(crate::Error::CorruptCodec("range coder total frequency collapsed to zero".into()));
        }
        let unit = range / total;
        if unit == 0 {
            return Err(crate::Error::CorruptCodec("range coder unit scale collapsed to zero".into()));
        }
        let scaled = code.wrapping_sub(low) / unit;

        let mut lo = 0usize;
        let mut hi = TOTAL_INDEX;
        while lo + 1 < hi {
            let mid = (lo + hi) / 2;
            if model.pool1[mid] <= scaled {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let sym = lo;

        out.push(sym as u8);
        if out.len() >= decompressed_size {
            return Ok(out);
        }

        range = model.pool2[sym].wrapping_mul(unit);
        low = low.wrapping_add(model.pool1[sym].wrapping_mul(unit));
        model.update(sym);

        loop {
            let diff = low.wrapping_add(range) ^ low;
            if diff & 0xFF00_0000 != 0 {
                break;
            }
            low <<= 8;
            range <<= 8;
            code = (code << 8) | next_byte(&mut s, source)?;
        }
        while range < BOTTOM {
            range = BOTTOM.wrapping_sub(low & 0xFFFF);
            low <<= 8;
            range <<= 8;
            code = (code << 8) | next_byte(&mut s, source)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_empty() {
        let compressed = encode(&[]);
        let out = decode(&compressed, 0).expect("decode failed");
        assert_eq!(out, Vec::<u8>::new());
    }

    #[test]
    fn round_trip_single_byte() {
        let data = [0x5Au8];
        let compressed = encode(&data);
        let out = decode(&compressed, data.len()).expect("decode failed");
        assert_eq!(out, data);
    }

    #[test]
    fn round_trip_skewed_distribution() {
        let mut data = vec![0u8; 200];
        data.extend_from_slice(&[1, 2, 3, 255, 254]);
        let compressed = encode(&data);
        let out = decode(&compressed, data.len()).expect("decode failed");
        assert_eq!(out, data);
    }

    #[test]
    fn round_trip_triggers_model_rescale() {
        // Enough repeated symbols to push pool1[TOTAL_INDEX] past the
        // 0x10000 rescale threshold at least once.
        let data: Vec<u8> = (0..70_000u32).map(|i| (i % 7) as u8).collect();
        let compressed = encode(&data);
        let out = decode(&compressed, data.len()).expect("decode failed");
        assert_eq!(out, data);
    }

    #[test]
    fn round_trip_all_256_byte_values() {
        let data: Vec<u8> = (0..=255u8).collect();
        let compressed = encode(&data);
        let out = decode(&compressed, data.len()).expect("decode failed");
        assert_eq!(out, data);
    }

    #[test]
    fn truncated_source_reports_error_not_panic() {
        let err = decode(&[0u8; 2], 5);
        assert!(err.is_err());
    }

    #[test]
    fn truncated_mid_stream_source_is_an_error_not_corrupt_ok() {
        // Enough symbols that the renormalization loop must pull bytes
        // well past the 4-byte header before finishing.
        let data: Vec<u8> = (0..2000u32).map(|i| (i % 13) as u8).collect();
        let compressed = encode(&data);
        let truncated = &compressed[..compressed.len() / 2];
        let result = decode(truncated, data.len());
        assert!(result.is_err(), "truncated payload must not decode to a silently-padded Ok");
    }
}
