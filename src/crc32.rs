//! Table-driven CRC32 (IEEE polynomial `0xEDB88320`), as used by PBG5 and
//! PBG6 for their per-entry checksums.

use std::sync::OnceLock;

const POLY: u32 = 0xEDB88320;

fn table() -> &'static [u32; 256] {
    static TABLE: OnceLock<[u32; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            let mut c = i as u32;
            for _ in 0..8 {
                c = if c & 1 != 0 { POLY ^ (c >> 1) } else { c >> 1 };
            }
            *slot = c;
        }
        table
    })
}

/// Computes the IEEE CRC32 of `bytes`, continuing from `seed` (use `0` for a
/// fresh checksum; the running value, not its bitwise complement, is the
/// convention this format stores on disk).
pub fn crc32(seed: u32, bytes: &[u8]) -> u32 {
    let table = table();
    let mut c = seed;
    for &b in bytes {
        c = table[((c ^ b as u32) & 0xFF) as usize] ^ (c >> 8);
    }
    c
}
