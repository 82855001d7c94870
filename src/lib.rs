//! # pbgtool
//!
//! Extract and repack the packfile containers used by the Seihou series of
//! doujin shooting games: `PBG1A`, `PBG3`, `PBG4`, `PBG5`, `PBG6`.
//!
//! * `bitstream` is the MSB-first bit-level I/O layer shared by `lzss` and
//!   `pbg3_varint`.
//! * `lzss` is the dictionary-LZSS codec used by PBG1A/3/4/5.
//! * `range_coder` is the carryless adaptive range coder used by PBG6.
//! * `crc32` is the IEEE CRC32 used by PBG5 and PBG6.
//! * `pbg3_varint` is PBG3's variable-width integer bitstream encoding.
//! * `container` holds one module per packfile format, each exposing
//!   `extract` and `pack`.
//!
//! ## Example
//!
//! ```rs
//! use pbgtool::container::pbg5;
//! let dat = std::fs::read("some_archive.dat").expect("read failed");
//! let (entries, _soft_errors) = pbg5::extract(&dat).expect("extract failed");
//! for entry in &entries {
//!     eprintln!("{:?}: {} bytes", entry.name, entry.payload.len());
//! }
//! ```

pub mod bitstream;
pub mod lzss;
pub mod range_coder;
pub mod crc32;
pub mod pbg3_varint;
pub mod container;
pub mod cli;

/// Errors produced by the core codec and container layer.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad magic number: expected {expected:?}, found {found:?}")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },
    #[error("truncated input: needed {needed} bytes, had {available}")]
    Truncated { needed: usize, available: usize },
    #[error("corrupt codec state: {0}")]
    CorruptCodec(String),
    #[error("checksum mismatch: computed {computed:#x}, stored {stored:#x}")]
    ChecksumMismatch { computed: u32, stored: u32 },
    #[error("bad argument: {0}")]
    BadArgument(String),
}

/// An in-memory file inside a packfile container.
///
/// `name` is opaque to the core: on disk it is Shift-JIS (or absent, for
/// PBG1A); the CLI layer (`cli::names`) handles transcoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: Vec<u8>,
    pub payload: Vec<u8>,
    pub aux: EntryAux,
}

/// Per-format auxiliary metadata carried through unchanged on repack.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum EntryAux {
    /// PBG1A: no auxiliary metadata beyond the name index.
    #[default]
    None,
    /// PBG3: two integers of unknown semantics, preserved verbatim.
    Pbg3 { aux1: u32, aux2: u32 },
    /// PBG4: a field that is always zero in observed archives.
    Pbg4 { zeros: u32 },
    /// PBG5 / PBG6: CRC32 of the uncompressed payload.
    Crc32(u32),
}
