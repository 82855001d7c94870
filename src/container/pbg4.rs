//! PBG4: early Seihou 3 builds. A named table of contents, itself LZSS
//! compressed with a 13-bit dictionary, lists each entry's filename,
//! offset and uncompressed size plus a field that is always zero in every
//! archive we've seen (`EntryAux::Pbg4`). Ported from `pbg4.cpp`.

use super::{check_magic, compressed_span, read_cstr, read_u32_le};
use crate::{lzss, Entry, EntryAux, Error};

const MAGIC: [u8; 4] = *b"PBG4";
const HEADER_LEN: usize = 16;
const DICT_BITS: u32 = 13;

struct RawEntry {
    name: Vec<u8>,
    offset: u32,
    uncompressed_size: u32,
    zeros: u32,
}

pub fn extract(data: &[u8]) -> Result<(Vec<Entry>, Vec<Error>), Error> {
    check_magic(data, MAGIC)?;
    let num_files = read_u32_le(data, 4)? as usize;
    let toc_offset = read_u32_le(data, 8)? as usize;
    let decompressed_toc_size = read_u32_le(data, 12)? as usize;

    let compressed_toc = data
        .get(toc_offset..)
        .ok_or(Error::Truncated { needed: toc_offset, available: data.len() })?;
    let toc = lzss::decompress(compressed_toc, decompressed_toc_size, DICT_BITS);

    let mut raw = Vec::with_capacity(num_files);
    let mut pos = 0usize;
    for _ in 0..num_files {
        let (name, next) = read_cstr(&toc, pos)?;
        pos = next;
        let offset = read_u32_le(&toc, pos)?;
        let uncompressed_size = read_u32_le(&toc, pos + 4)?;
        let zeros = read_u32_le(&toc, pos + 8)?;
        pos += 12;
        raw.push(RawEntry { name, offset, uncompressed_size, zeros });
    }

    let offsets: Vec<u32> = raw.iter().map(|r| r.offset).collect();
    let mut entries = Vec::with_capacity(num_files);
    for (i, r) in raw.into_iter().enumerate() {
        let span = compressed_span(&offsets, i, toc_offset as u32) as usize;
        let start = r.offset as usize;
        let compressed = data
            .get(start..start + span)
            .ok_or(Error::Truncated { needed: start + span, available: data.len() })?;
        let payload = lzss::decompress(compressed, r.uncompressed_size as usize, DICT_BITS);
        entries.push(Entry { name: r.name, payload, aux: EntryAux::Pbg4 { zeros: r.zeros } });
    }

    Ok((entries, Vec::new()))
}

pub fn pack(entries: &[Entry]) -> Result<Vec<u8>, Error> {
    let mut out = vec![0u8; HEADER_LEN];

    let mut offsets = Vec::with_capacity(entries.len());
    for entry in entries {
        offsets.push(out.len() as u32);
        out.extend_from_slice(&lzss::compress(&entry.payload, DICT_BITS));
    }

    let toc_offset = out.len() as u32;
    let mut toc = Vec::new();
    for (entry, &offset) in entries.iter().zip(&offsets) {
        let zeros = match entry.aux {
            EntryAux::Pbg4 { zeros } => zeros,
            _ => 0,
        };
        toc.extend_from_slice(&entry.name);
        toc.push(0);
        toc.extend_from_slice(&offset.to_le_bytes());
        toc.extend_from_slice(&(entry.payload.len() as u32).to_le_bytes());
        toc.extend_from_slice(&zeros.to_le_bytes());
    }
    let decompressed_toc_size = toc.len() as u32;
    out.extend_from_slice(&lzss::compress(&toc, DICT_BITS));

    out[0..4].copy_from_slice(&MAGIC);
    out[4..8].copy_from_slice(&(entries.len() as u32).to_le_bytes());
    out[8..12].copy_from_slice(&toc_offset.to_le_bytes());
    out[12..16].copy_from_slice(&decompressed_toc_size.to_le_bytes());

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &[u8], payload: &[u8], zeros: u32) -> Entry {
        Entry { name: name.to_vec(), payload: payload.to_vec(), aux: EntryAux::Pbg4 { zeros } }
    }

    #[test]
    fn round_trip_two_entries() {
        let entries = vec![entry(b"GRP/TITLE.BMP", b"some image bytes", 0), entry(b"SE/HIT.WAV", &[7u8; 30], 0)];
        let packed = pack(&entries).expect("pack failed");
        let (extracted, soft_errors) = extract(&packed).expect("extract failed");
        assert!(soft_errors.is_empty());
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].name, entries[0].name);
        assert_eq!(extracted[0].payload, entries[0].payload);
        assert_eq!(extracted[1].name, entries[1].name);
        assert_eq!(extracted[1].payload, entries[1].payload);
    }

    #[test]
    fn round_trip_no_entries() {
        let packed = pack(&[]).expect("pack failed");
        let (extracted, _) = extract(&packed).expect("extract failed");
        assert!(extracted.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut packed = pack(&[entry(b"x", b"y", 0)]).expect("pack failed");
        packed[3] = b'9';
        assert!(matches!(extract(&packed), Err(Error::BadMagic { .. })));
    }
}
