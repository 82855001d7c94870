//! Dictionary LZSS codec shared by PBG1A, PBG3, PBG4 and PBG5.
//!
//! A direct port of `compress`/`decompress` from the original `lzss.cpp`:
//! textbook LZSS expansion, and a hash-chained (not tree-based) match
//! finder for the compressor, using a single-head linked list per hash
//! bucket rather than a binary tree.
//!
//! Two dictionary widths are in use: 13 bits (PBG1A/PBG3/PBG4) and 15 bits
//! (PBG5 and later). The encoded token shape is otherwise identical: one
//! flag bit, then either 8 literal bits or a `dict_bits`-wide offset plus a
//! 4-bit length (biased by [`SEQ_MIN`]).

use crate::bitstream::{BitReader, BitWriter};

/// Bits used for the match-length field of a back-reference token.
pub const SEQ_BITS: u32 = 4;
/// Shortest match length worth encoding as a back-reference.
pub const SEQ_MIN: u32 = 3;
/// Longest match length a single token can express.
pub const SEQ_MAX: u32 = SEQ_MIN + (1 << SEQ_BITS) - 1;

/// Hash-chained index into the sliding dictionary. `0` is the null
/// sentinel throughout: dictionary position 0 is never inserted into a
/// chain, so it doubles as "no entry" without needing an `Option`.
struct Hash {
    /// `key -> most recently inserted dictionary position with that key`.
    hash: Vec<u32>,
    /// `position -> position inserted immediately after it` (older).
    prev: Vec<u32>,
    /// `position -> position inserted immediately before it` (newer).
    next: Vec<u32>,
}

impl Hash {
    fn new(dict_size: usize) -> Self {
        Self { hash: vec![0; 0x10000], prev: vec![0; dict_size], next: vec![0; dict_size] }
    }
}

fn generate_key(dict: &[u8], base: u32, mask: u32) -> usize {
    let a = dict[((base + 1) & mask) as usize] as u32;
    let b = dict[((base + 2) & mask) as usize] as u32;
    let c = dict[(base & mask) as usize] as u32;
    (((a << 8) | b) ^ (c << 4)) as usize
}

/// Removes `offset` from its hash chain. Always removes the tail: callers
/// only ever evict a position exactly `SEQ_MAX` slots after it was
/// inserted, by which point nothing newer points past it.
fn list_remove(hash: &mut Hash, key: usize, offset: u32) {
    let older = hash.prev[offset as usize];
    hash.next[older as usize] = 0;
    if older == 0 && hash.hash[key] == offset {
        hash.hash[key] = 0;
    }
}

fn list_add(hash: &mut Hash, key: usize, offset: u32) {
    let old_head = hash.hash[key];
    hash.next[offset as usize] = old_head;
    hash.prev[offset as usize] = 0;
    hash.prev[old_head as usize] = offset;
    hash.hash[key] = offset;
}

/// Expands `data` (the compressed bytes) into exactly `uncompressed_size`
/// bytes, using a `dict_bits`-wide sliding dictionary.
///
/// Never panics on truncated input: a flag bit or field that runs past the
/// end of `data` reads as `BitReader`'s zero/sentinel fill, and a
/// back-reference offset of zero (the compressor's end-of-stream marker
/// for the 13-bit format) simply stops expansion early, returning fewer
/// than `uncompressed_size` bytes.
pub fn decompress(data: &[u8], uncompressed_size: usize, dict_bits: u32) -> Vec<u8> {
    let dict_mask = (1u32 << dict_bits) - 1;
    let dict_size = 1usize << dict_bits;
    let mut reader = BitReader::new(data);
    let mut dict = vec![0u8; dict_size];
    let mut out = Vec::with_capacity(uncompressed_size);

    while out.len() < uncompressed_size {
        let is_literal = reader.get_bit();
        if is_literal != 0 {
            let byte = reader.get_bits(8) as u8;
            out.push(byte);
            let pos = (out.len() as u32 - 1) & dict_mask;
            dict[pos as usize] = byte;
        } else {
            let raw_offset = reader.get_bits(dict_bits);
            if raw_offset == 0 {
                break;
            }
            let mut seq_offset = raw_offset - 1;
            let seq_length = reader.get_bits(SEQ_BITS).wrapping_add(SEQ_MIN);
            for _ in 0..seq_length {
                if out.len() >= uncompressed_size {
                    break;
                }
                let byte = dict[(seq_offset & dict_mask) as usize];
                out.push(byte);
                let pos = (out.len() as u32 - 1) & dict_mask;
                dict[pos as usize] = byte;
                seq_offset = seq_offset.wrapping_add(1);
            }
        }
    }
    out
}

/// Compresses `data` with a `dict_bits`-wide sliding dictionary.
///
/// `dict_bits` must be 13 (PBG1A/PBG3/PBG4) or 15 (PBG5 and later); the
/// 13-bit format additionally terminates its stream with an explicit
/// zero-offset sentinel token, which the 15-bit format omits because its
/// container format always records an exact uncompressed size.
pub fn compress(data: &[u8], dict_bits: u32) -> Vec<u8> {
    let mask = (1u32 << dict_bits) - 1;
    let dict_size = 1usize << dict_bits;

    let mut writer = BitWriter::new();
    let mut hash = Hash::new(dict_size);
    let mut dict = vec![0u8; dict_size];
    let mut dict_head: u32 = 1;
    let mut waiting_bytes: u32 = 0;
    let mut bytes_read: usize = 0;

    let prefetch = (SEQ_MAX as usize).min(data.len());
    for i in 0..prefetch {
        dict[1 + i] = data[bytes_read];
        bytes_read += 1;
        waiting_bytes += 1;
    }
    let mut dict_head_key = generate_key(&dict, dict_head, mask);

    while waiting_bytes != 0 {
        let mut match_len = SEQ_MIN - 1;
        let mut match_offset = 0u32;

        let mut offset = hash.hash[dict_head_key];
        while offset != 0 && waiting_bytes > match_len {
            let ahead = (dict_head + match_len) & mask;
            let ahead_candidate = (offset + match_len) & mask;
            if dict[ahead as usize] == dict[ahead_candidate as usize] {
                let mut i = 0;
                while i < match_len
                    && dict[((dict_head + i) & mask) as usize] == dict[((offset + i) & mask) as usize]
                {
                    i += 1;
                }
                if i >= match_len {
                    match_len += 1;
                    while match_len < waiting_bytes
                        && dict[((dict_head + match_len) & mask) as usize]
                            == dict[((offset + match_len) & mask) as usize]
                    {
                        match_len += 1;
                    }
                    match_offset = offset;
                }
            }
            offset = hash.next[offset as usize];
        }

        if match_len < SEQ_MIN {
            match_len = 1;
            writer.put_bit(1);
            writer.put_bits(dict[dict_head as usize] as u32, 8);
        } else {
            writer.put_bit(0);
            writer.put_bits(match_offset, dict_bits);
            writer.put_bits(match_len - SEQ_MIN, SEQ_BITS);
        }

        for _ in 0..match_len {
            let slot = (dict_head + SEQ_MAX) & mask;
            if slot != 0 {
                list_remove(&mut hash, generate_key(&dict, slot, mask), slot);
            }
            if dict_head != 0 {
                list_add(&mut hash, dict_head_key, dict_head);
            }
            if bytes_read < data.len() {
                dict[slot as usize] = data[bytes_read];
                bytes_read += 1;
            } else {
                waiting_bytes -= 1;
            }
            dict_head = (dict_head + 1) & mask;
            dict_head_key = generate_key(&dict, dict_head, mask);
        }
    }

    if dict_bits == 13 {
        writer.put_bit(0);
        writer.put_bits(0, dict_bits);
    }

    writer.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_empty() {
        let compressed = compress(&[], 13);
        let out = decompress(&compressed, 0, 13);
        assert_eq!(out, Vec::<u8>::new());
    }

    #[test]
    fn round_trip_all_zeros_dict13() {
        let data = vec![0u8; 64];
        let compressed = compress(&data, 13);
        let out = decompress(&compressed, data.len(), 13);
        assert_eq!(out, data);
    }

    #[test]
    fn round_trip_repeating_pattern_dict15() {
        let data = b"ABABABABABAB".repeat(4);
        let compressed = compress(&data, 15);
        let out = decompress(&compressed, data.len(), 15);
        assert_eq!(out, data);
    }

    #[test]
    fn round_trip_single_byte() {
        let data = [0x42u8];
        let compressed = compress(&data, 13);
        let out = decompress(&compressed, 1, 13);
        assert_eq!(out, data);
    }

    #[test]
    fn round_trip_longer_than_seq_max_run() {
        // A run long enough to require more than one back-reference token.
        let data = vec![0x7Eu8; SEQ_MAX as usize * 3 + 5];
        let compressed = compress(&data, 15);
        let out = decompress(&compressed, data.len(), 15);
        assert_eq!(out, data);
    }

    #[test]
    fn round_trip_incompressible_data() {
        let data: Vec<u8> = (0..=255u8).cycle().take(500).collect();
        let compressed = compress(&data, 13);
        let out = decompress(&compressed, data.len(), 13);
        assert_eq!(out, data);
    }

    #[test]
    fn truncated_compressed_stream_does_not_panic() {
        let data = vec![0xAAu8; 40];
        let compressed = compress(&data, 15);
        let truncated = &compressed[..compressed.len() / 2];
        // Should return early rather than panic, however short the match.
        let out = decompress(truncated, data.len(), 15);
        assert!(out.len() <= data.len());
    }
}
