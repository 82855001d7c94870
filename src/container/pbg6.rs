//! PBG6: used by the Banshiryuu C74 build. Both the table of contents and
//! every entry's payload are compressed with the adaptive
//! [`crate::range_coder`] rather than LZSS. Entry names are stored with a
//! leading `/` (a quirk of the original packer prefixing each bare
//! filename before Shift-JIS encoding it); `extract` strips it and `pack`
//! restores it. Ported from `pbg6.cpp`.

use super::{check_magic, read_cstr, read_u32_le};
use crate::{crc32, range_coder, Entry, EntryAux, Error};

const MAGIC: [u8; 4] = *b"PBG6";
const HEADER_LEN: usize = 16;

struct RawEntry {
    name: Vec<u8>,
    compressed_size: u32,
    decompressed_size: u32,
    offset: u32,
    crc: u32,
}

pub fn extract(data: &[u8]) -> Result<(Vec<Entry>, Vec<Error>), Error> {
    check_magic(data, MAGIC)?;
    let toc_offset = read_u32_le(data, 4)? as usize;
    let decompressed_toc_size = read_u32_le(data, 8)? as usize;
    let stored_toc_checksum = read_u32_le(data, 12)?;

    let compressed_toc = data
        .get(toc_offset..)
        .ok_or(Error::Truncated { needed: toc_offset, available: data.len() })?;
    let toc = range_coder::decode(compressed_toc, decompressed_toc_size)?;

    let mut soft_errors = Vec::new();
    let computed_toc_checksum = crc32::crc32(0, &toc);
    if computed_toc_checksum != stored_toc_checksum {
        soft_errors.push(Error::ChecksumMismatch { computed: computed_toc_checksum, stored: stored_toc_checksum });
    }

    let num_files = read_u32_le(&toc, 0)? as usize;
    let mut pos = 4usize;
    let mut raw = Vec::with_capacity(num_files);
    for _ in 0..num_files {
        let (mut name, next) = read_cstr(&toc, pos)?;
        pos = next;
        if name.first() == Some(&b'/') {
            name.remove(0);
        }
        let compressed_size = read_u32_le(&toc, pos)?;
        let decompressed_size = read_u32_le(&toc, pos + 4)?;
        let offset = read_u32_le(&toc, pos + 8)?;
        let crc = read_u32_le(&toc, pos + 12)?;
        pos += 16;
        raw.push(RawEntry { name, compressed_size, decompressed_size, offset, crc });
    }

    let mut entries = Vec::with_capacity(num_files);
    for r in raw {
        let start = r.offset as usize;
        let end = start + r.compressed_size as usize;
        let compressed = data.get(start..end).ok_or(Error::Truncated { needed: end, available: data.len() })?;
        let payload = range_coder::decode(compressed, r.decompressed_size as usize)?;

        let computed = crc32::crc32(0, &payload);
        if computed != r.crc {
            soft_errors.push(Error::ChecksumMismatch { computed, stored: r.crc });
        }
        entries.push(Entry { name: r.name, payload, aux: EntryAux::Crc32(r.crc) });
    }

    Ok((entries, soft_errors))
}

pub fn pack(entries: &[Entry]) -> Result<Vec<u8>, Error> {
    let mut out = vec![0u8; HEADER_LEN];

    let mut offsets = Vec::with_capacity(entries.len());
    let mut compressed_sizes = Vec::with_capacity(entries.len());
    let mut crcs = Vec::with_capacity(entries.len());
    for entry in entries {
        offsets.push(out.len() as u32);
        crcs.push(crc32::crc32(0, &entry.payload));
        let compressed = range_coder::encode(&entry.payload);
        compressed_sizes.push(compressed.len() as u32);
        out.extend_from_slice(&compressed);
    }

    let toc_offset = out.len() as u32;
    let mut toc = Vec::new();
    toc.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for (((entry, &offset), &compressed_size), &crc) in
        entries.iter().zip(&offsets).zip(&compressed_sizes).zip(&crcs)
    {
        toc.push(b'/');
        toc.extend_from_slice(&entry.name);
        toc.push(0);
        toc.extend_from_slice(&compressed_size.to_le_bytes());
        toc.extend_from_slice(&(entry.payload.len() as u32).to_le_bytes());
        toc.extend_from_slice(&offset.to_le_bytes());
        toc.extend_from_slice(&crc.to_le_bytes());
    }
    let decompressed_toc_size = toc.len() as u32;
    let toc_checksum = crc32::crc32(0, &toc);
    out.extend_from_slice(&range_coder::encode(&toc));

    out[0..4].copy_from_slice(&MAGIC);
    out[4..8].copy_from_slice(&toc_offset.to_le_bytes());
    out[8..12].copy_from_slice(&decompressed_toc_size.to_le_bytes());
    out[12..16].copy_from_slice(&toc_checksum.to_le_bytes());

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &[u8], payload: &[u8]) -> Entry {
        Entry { name: name.to_vec(), payload: payload.to_vec(), aux: EntryAux::None }
    }

    #[test]
    fn round_trip_two_entries() {
        let entries = vec![entry(b"GRP/BOSS1", b"picture bytes go here"), entry(b"BGM/STAGE1", &[9u8; 80])];
        let packed = pack(&entries).expect("pack failed");
        let (extracted, soft_errors) = extract(&packed).expect("extract failed");
        assert!(soft_errors.is_empty());
        assert_eq!(extracted[0].name, entries[0].name);
        assert_eq!(extracted[0].payload, entries[0].payload);
        assert_eq!(extracted[1].payload, entries[1].payload);
    }

    #[test]
    fn leading_slash_is_stripped_on_extract() {
        // The on-disk quirk is internal to pack/extract; callers only ever
        // see the bare name, never the leading slash.
        let entries = vec![entry(b"NO_SLASH_HERE", b"abc")];
        let packed = pack(&entries).expect("pack failed");
        let (extracted, _) = extract(&packed).expect("extract failed");
        assert_eq!(extracted[0].name, b"NO_SLASH_HERE");
    }

    #[test]
    fn round_trip_no_entries() {
        let packed = pack(&[]).expect("pack failed");
        let (extracted, _) = extract(&packed).expect("extract failed");
        assert!(extracted.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut packed = pack(&[entry(b"x", b"y")]).expect("pack failed");
        packed[3] = b'9';
        assert!(matches!(extract(&packed), Err(Error::BadMagic { .. })));
    }
}
