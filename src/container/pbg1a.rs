//! PBG1A: the oldest format, used by Shuusou Gyoku. No filenames are
//! stored on disk at all — entries are addressed purely by index, and the
//! CLI layer is responsible for assigning output names (see
//! `cli::rename`). Ported from `pbg1a.cpp`.

use super::{check_magic, compressed_span, read_u32_le};
use crate::{lzss, Entry, EntryAux, Error};

const MAGIC: [u8; 4] = *b"PBG\x1A";
const HEADER_LEN: usize = 12;
const ENTRY_LEN: usize = 12;
const DICT_BITS: u32 = 13;

struct RawEntry {
    uncompressed_size: u32,
    offset: u32,
    compressed_checksum: u32,
}

/// Extracts every entry. `Entry::name` is always empty; PBG1A has no
/// concept of a stored filename, only index order.
pub fn extract(data: &[u8]) -> Result<(Vec<Entry>, Vec<Error>), Error> {
    check_magic(data, MAGIC)?;
    let stored_checksum = read_u32_le(data, 4)?;
    let num_files = read_u32_le(data, 8)? as usize;

    let mut raw = Vec::with_capacity(num_files);
    for i in 0..num_files {
        let base = HEADER_LEN + i * ENTRY_LEN;
        raw.push(RawEntry {
            uncompressed_size: read_u32_le(data, base)?,
            offset: read_u32_le(data, base + 4)?,
            compressed_checksum: read_u32_le(data, base + 8)?,
        });
    }

    let offsets: Vec<u32> = raw.iter().map(|r| r.offset).collect();
    let mut entries = Vec::with_capacity(num_files);
    let mut soft_errors = Vec::new();
    let mut computed_checksum: u32 = 0;

    for (i, r) in raw.iter().enumerate() {
        let span = compressed_span(&offsets, i, data.len() as u32) as usize;
        let start = r.offset as usize;
        let compressed = data
            .get(start..start + span)
            .ok_or(Error::Truncated { needed: start + span, available: data.len() })?;

        let byte_sum: u32 = compressed.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32));
        if byte_sum != r.compressed_checksum {
            soft_errors.push(Error::ChecksumMismatch { computed: byte_sum, stored: r.compressed_checksum });
        }
        computed_checksum = computed_checksum
            .wrapping_add(r.compressed_checksum)
            .wrapping_add(r.uncompressed_size)
            .wrapping_add(r.offset);

        let payload = lzss::decompress(compressed, r.uncompressed_size as usize, DICT_BITS);
        entries.push(Entry { name: Vec::new(), payload, aux: EntryAux::None });
    }

    if computed_checksum != stored_checksum {
        soft_errors.push(Error::ChecksumMismatch { computed: computed_checksum, stored: stored_checksum });
    }

    Ok((entries, soft_errors))
}

/// Packs `entries` in the given order; entry names are ignored, since
/// PBG1A addresses entries by index alone.
pub fn pack(entries: &[Entry]) -> Result<Vec<u8>, Error> {
    let mut out = vec![0u8; HEADER_LEN + entries.len() * ENTRY_LEN];

    let mut checksum: u32 = 0;
    let mut cursor = out.len();
    let mut raw = Vec::with_capacity(entries.len());
    for entry in entries {
        let compressed = lzss::compress(&entry.payload, DICT_BITS);
        let byte_sum: u32 = compressed.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32));
        let offset = cursor as u32;
        checksum = checksum
            .wrapping_add(byte_sum)
            .wrapping_add(entry.payload.len() as u32)
            .wrapping_add(offset);
        raw.push((entry.payload.len() as u32, offset, byte_sum));
        out.extend_from_slice(&compressed);
        cursor = out.len();
    }

    out[0..4].copy_from_slice(&MAGIC);
    out[4..8].copy_from_slice(&checksum.to_le_bytes());
    out[8..12].copy_from_slice(&(entries.len() as u32).to_le_bytes());
    for (i, (uncompressed_size, offset, compressed_checksum)) in raw.iter().enumerate() {
        let base = HEADER_LEN + i * ENTRY_LEN;
        out[base..base + 4].copy_from_slice(&uncompressed_size.to_le_bytes());
        out[base + 4..base + 8].copy_from_slice(&offset.to_le_bytes());
        out[base + 8..base + 12].copy_from_slice(&compressed_checksum.to_le_bytes());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(payload: &[u8]) -> Entry {
        Entry { name: Vec::new(), payload: payload.to_vec(), aux: EntryAux::None }
    }

    #[test]
    fn round_trip_two_entries() {
        let entries = vec![entry(b"hello world"), entry(&[0u8; 50])];
        let packed = pack(&entries).expect("pack failed");
        let (extracted, soft_errors) = extract(&packed).expect("extract failed");
        assert!(soft_errors.is_empty());
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].payload, entries[0].payload);
        assert_eq!(extracted[1].payload, entries[1].payload);
    }

    #[test]
    fn round_trip_no_entries() {
        let packed = pack(&[]).expect("pack failed");
        let (extracted, soft_errors) = extract(&packed).expect("extract failed");
        assert!(extracted.is_empty());
        assert!(soft_errors.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut packed = pack(&[entry(b"x")]).expect("pack failed");
        packed[0] = b'X';
        assert!(matches!(extract(&packed), Err(Error::BadMagic { .. })));
    }

    #[test]
    fn flags_tampered_entry_without_failing_extraction() {
        let mut packed = pack(&[entry(b"hello world")]).expect("pack failed");
        // Corrupt a payload byte inside the compressed region without
        // touching its size, so extraction itself still succeeds.
        let last = packed.len() - 1;
        packed[last] ^= 0xFF;
        let (entries, soft_errors) = extract(&packed).expect("extract should tolerate a bad checksum");
        assert_eq!(entries.len(), 1);
        assert!(!soft_errors.is_empty());
    }
}
