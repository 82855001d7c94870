//! PBG3: used by Kioh Gyoku. The header and table of contents are both
//! raw [`crate::pbg3_varint`] bitstreams — unlike every later format, the
//! TOC itself is never LZSS-compressed. The header is a fixed 13-byte
//! placeholder (4-byte magic plus 9 reserved bytes), rewritten once the
//! real file count and TOC offset are known; `pack` returns
//! [`Error::BadArgument`] rather than corrupt that placeholder if the two
//! header integers somehow don't fit in 9 bytes. Ported from `pbg3.cpp`.

use super::{check_magic, compressed_span};
use crate::bitstream::{BitReader, BitWriter};
use crate::{lzss, pbg3_varint, Entry, EntryAux, Error};

const MAGIC: [u8; 4] = *b"PBG3";
const HEADER_LEN: usize = 13;
const DICT_BITS: u32 = 13;

struct RawEntry {
    aux1: u32,
    aux2: u32,
    compressed_checksum: u32,
    offset: u32,
    uncompressed_size: u32,
    name: Vec<u8>,
}

pub fn extract(data: &[u8]) -> Result<(Vec<Entry>, Vec<Error>), Error> {
    check_magic(data, MAGIC)?;
    let header_body = data
        .get(4..HEADER_LEN)
        .ok_or(Error::Truncated { needed: HEADER_LEN, available: data.len() })?;
    let mut header_reader = BitReader::new(header_body);
    let num_files = pbg3_varint::read_int(&mut header_reader) as usize;
    let toc_offset = pbg3_varint::read_int(&mut header_reader) as usize;

    let toc_bytes = data
        .get(toc_offset..)
        .ok_or(Error::Truncated { needed: toc_offset, available: data.len() })?;
    let mut toc_reader = BitReader::new(toc_bytes);

    let mut raw = Vec::with_capacity(num_files);
    for _ in 0..num_files {
        raw.push(RawEntry {
            aux1: pbg3_varint::read_int(&mut toc_reader),
            aux2: pbg3_varint::read_int(&mut toc_reader),
            compressed_checksum: pbg3_varint::read_int(&mut toc_reader),
            offset: pbg3_varint::read_int(&mut toc_reader),
            uncompressed_size: pbg3_varint::read_int(&mut toc_reader),
            name: pbg3_varint::read_string(&mut toc_reader),
        });
    }

    let offsets: Vec<u32> = raw.iter().map(|r| r.offset).collect();
    let mut entries = Vec::with_capacity(num_files);
    let mut soft_errors = Vec::new();
    for (i, r) in raw.into_iter().enumerate() {
        let span = compressed_span(&offsets, i, toc_offset as u32) as usize;
        let start = r.offset as usize;
        let compressed = data
            .get(start..start + span)
            .ok_or(Error::Truncated { needed: start + span, available: data.len() })?;

        let byte_sum: u32 = compressed.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32));
        if byte_sum != r.compressed_checksum {
            soft_errors.push(Error::ChecksumMismatch { computed: byte_sum, stored: r.compressed_checksum });
        }

        let payload = lzss::decompress(compressed, r.uncompressed_size as usize, DICT_BITS);
        entries.push(Entry { name: r.name, payload, aux: EntryAux::Pbg3 { aux1: r.aux1, aux2: r.aux2 } });
    }

    Ok((entries, soft_errors))
}

pub fn pack(entries: &[Entry]) -> Result<Vec<u8>, Error> {
    let mut out = vec![0u8; HEADER_LEN];

    let mut offsets = Vec::with_capacity(entries.len());
    let mut checksums = Vec::with_capacity(entries.len());
    for entry in entries {
        offsets.push(out.len() as u32);
        let compressed = lzss::compress(&entry.payload, DICT_BITS);
        checksums.push(compressed.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32)));
        out.extend_from_slice(&compressed);
    }

    let toc_offset = out.len() as u32;
    let mut toc_writer = BitWriter::new();
    for ((entry, &offset), &checksum) in entries.iter().zip(&offsets).zip(&checksums) {
        let (aux1, aux2) = match entry.aux {
            EntryAux::Pbg3 { aux1, aux2 } => (aux1, aux2),
            _ => (0, 0),
        };
        pbg3_varint::write_int(&mut toc_writer, aux1);
        pbg3_varint::write_int(&mut toc_writer, aux2);
        pbg3_varint::write_int(&mut toc_writer, checksum);
        pbg3_varint::write_int(&mut toc_writer, offset);
        pbg3_varint::write_int(&mut toc_writer, entry.payload.len() as u32);
        pbg3_varint::write_string(&mut toc_writer, &entry.name);
    }
    out.extend_from_slice(&toc_writer.into_bytes());

    let mut header_writer = BitWriter::new();
    pbg3_varint::write_int(&mut header_writer, entries.len() as u32);
    pbg3_varint::write_int(&mut header_writer, toc_offset);
    let header_body = header_writer.into_bytes();
    if header_body.len() > HEADER_LEN - 4 {
        return Err(Error::BadArgument(format!(
            "PBG3 header bitstream needs {} bytes but only {} are reserved",
            header_body.len(),
            HEADER_LEN - 4
        )));
    }

    out[0..4].copy_from_slice(&MAGIC);
    out[4..4 + header_body.len()].copy_from_slice(&header_body);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &[u8], payload: &[u8], aux1: u32, aux2: u32) -> Entry {
        Entry { name: name.to_vec(), payload: payload.to_vec(), aux: EntryAux::Pbg3 { aux1, aux2 } }
    }

    #[test]
    fn round_trip_two_entries() {
        let entries = vec![
            entry(b"SCRIPT/STAGE1", b"enemy script bytecode", 0, 0),
            entry(b"GRP/TITLE", &[0x11u8; 40], 0, 0),
        ];
        let packed = pack(&entries).expect("pack failed");
        let (extracted, soft_errors) = extract(&packed).expect("extract failed");
        assert!(soft_errors.is_empty());
        assert_eq!(extracted[0].name, entries[0].name);
        assert_eq!(extracted[0].payload, entries[0].payload);
        assert_eq!(extracted[1].payload, entries[1].payload);
    }

    #[test]
    fn aux_fields_survive_round_trip() {
        let entries = vec![entry(b"x", b"y", 7, 42)];
        let packed = pack(&entries).expect("pack failed");
        let (extracted, _) = extract(&packed).expect("extract failed");
        assert_eq!(extracted[0].aux, EntryAux::Pbg3 { aux1: 7, aux2: 42 });
    }

    #[test]
    fn round_trip_no_entries() {
        let packed = pack(&[]).expect("pack failed");
        let (extracted, _) = extract(&packed).expect("extract failed");
        assert!(extracted.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut packed = pack(&[entry(b"x", b"y", 0, 0)]).expect("pack failed");
        packed[3] = b'9';
        assert!(matches!(extract(&packed), Err(Error::BadMagic { .. })));
    }
}
