//! CLI-facing glue: format dispatch, directory walking, and Shift-JIS
//! name transcoding. The `container` modules know nothing about paths or
//! encodings; this module is where that mapping lives.

pub mod names;
pub mod rename;

use crate::container::{pbg1a, pbg3, pbg4, pbg5, pbg6};
use crate::{Entry, EntryAux, Error};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// One of the five packfile formats this tool understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Pbg1a,
    Pbg3,
    Pbg4,
    Pbg5,
    Pbg6,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "1" => Ok(Format::Pbg1a),
            "3" => Ok(Format::Pbg3),
            "4" => Ok(Format::Pbg4),
            "5" => Ok(Format::Pbg5),
            "6" => Ok(Format::Pbg6),
            other => Err(Error::BadArgument(format!(
                "unknown format {other:?}, expected one of 1, 3, 4, 5, 6"
            ))),
        }
    }
}

impl Format {
    /// Only PBG1A and PBG3 ever had named rename presets in the original
    /// tool; PBG4/5/6 already store a real filename.
    pub fn supports_rename(self) -> bool {
        matches!(self, Format::Pbg1a | Format::Pbg3)
    }

    /// `--remove-extensions` only makes sense for PBG3, whose archives
    /// conventionally store extensionless names.
    pub fn supports_remove_extensions(self) -> bool {
        matches!(self, Format::Pbg3)
    }
}

/// Extracts every entry of `data` into `out_dir`, optionally applying a
/// named rename preset. Returns the soft (non-fatal) errors accumulated
/// while verifying per-entry checksums.
pub fn extract(
    format: Format,
    data: &[u8],
    out_dir: &Path,
    rename_preset: Option<&str>,
) -> Result<Vec<Error>, Error> {
    let (entries, soft_errors) = match format {
        Format::Pbg1a => pbg1a::extract(data)?,
        Format::Pbg3 => pbg3::extract(data)?,
        Format::Pbg4 => pbg4::extract(data)?,
        Format::Pbg5 => pbg5::extract(data)?,
        Format::Pbg6 => pbg6::extract(data)?,
    };

    fs::create_dir_all(out_dir)?;
    for (index, entry) in entries.iter().enumerate() {
        let disk_path = match format {
            Format::Pbg1a => {
                let name = rename_preset
                    .and_then(|preset| rename::pbg1a_name(preset, index))
                    .map(|suffix| format!("{}_{suffix}", names::index_name(index)))
                    .unwrap_or_else(|| names::index_name(index));
                out_dir.join(name)
            }
            Format::Pbg3 => {
                let stored = String::from_utf8_lossy(&entry.name).into_owned();
                let name = match rename_preset {
                    Some(preset) => {
                        let ext = rename::pbg3_extension(preset, &stored);
                        if ext.is_empty() { stored } else { format!("{stored}.{ext}") }
                    }
                    None => stored,
                };
                names::to_disk_path(out_dir, name.as_bytes())
            }
            _ => names::to_disk_path(out_dir, &entry.name),
        };
        if let Some(parent) = disk_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&disk_path, &entry.payload)?;
    }

    Ok(soft_errors)
}

/// Packs every regular file under `in_dir` into a fresh archive of the
/// given format. `remove_extensions` strips each stored name's file
/// extension, matching how PBG3 archives store names.
pub fn pack(format: Format, in_dir: &Path, remove_extensions: bool) -> Result<Vec<u8>, Error> {
    let mut paths: Vec<_> = walkdir::WalkDir::new(in_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();

    let entries = paths
        .iter()
        .map(|path| {
            let payload = fs::read(path)?;
            let name = match format {
                Format::Pbg1a => Vec::new(),
                _ => {
                    let stored = names::from_disk_path(in_dir, path);
                    if remove_extensions { strip_extension(&stored) } else { stored }
                }
            };
            let aux = match format {
                Format::Pbg3 => EntryAux::Pbg3 { aux1: 0, aux2: 0 },
                Format::Pbg4 => EntryAux::Pbg4 { zeros: 0 },
                _ => EntryAux::None,
            };
            Ok(Entry { name, payload, aux })
        })
        .collect::<Result<Vec<Entry>, Error>>()?;

    match format {
        Format::Pbg1a => pbg1a::pack(&entries),
        Format::Pbg3 => pbg3::pack(&entries),
        Format::Pbg4 => pbg4::pack(&entries),
        Format::Pbg5 => pbg5::pack(&entries),
        Format::Pbg6 => pbg6::pack(&entries),
    }
}

fn strip_extension(name: &[u8]) -> Vec<u8> {
    let last_slash = name.iter().rposition(|&b| b == b'/').map(|i| i + 1).unwrap_or(0);
    match name[last_slash..].iter().rposition(|&b| b == b'.') {
        Some(rel_dot) => name[..last_slash + rel_dot].to_vec(),
        None => name.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_digits() {
        assert_eq!("1".parse::<Format>().unwrap(), Format::Pbg1a);
        assert_eq!("6".parse::<Format>().unwrap(), Format::Pbg6);
        assert!("2".parse::<Format>().is_err());
    }

    #[test]
    fn rename_support_matches_original_tool() {
        assert!(Format::Pbg1a.supports_rename());
        assert!(Format::Pbg3.supports_rename());
        assert!(!Format::Pbg4.supports_rename());
        assert!(Format::Pbg3.supports_remove_extensions());
        assert!(!Format::Pbg1a.supports_remove_extensions());
    }

    #[test]
    fn strip_extension_only_touches_final_component() {
        assert_eq!(strip_extension(b"GRP/TITLE.BMP"), b"GRP/TITLE");
        assert_eq!(strip_extension(b"NOEXT"), b"NOEXT");
        assert_eq!(strip_extension(b"a.b/c"), b"a.b/c");
    }

    #[test]
    fn extract_and_pack_round_trip_pbg4() {
        let dir = tempfile::tempdir().expect("tempdir");
        let in_dir = dir.path().join("in");
        fs::create_dir_all(in_dir.join("GRP")).unwrap();
        fs::write(in_dir.join("GRP").join("TITLE.BMP"), b"hello image").unwrap();

        let packed = pack(Format::Pbg4, &in_dir, false).expect("pack failed");

        let out_dir = dir.path().join("out");
        let soft_errors = extract(Format::Pbg4, &packed, &out_dir, None).expect("extract failed");
        assert!(soft_errors.is_empty());
        let roundtripped = fs::read(out_dir.join("GRP").join("TITLE.BMP")).expect("read back");
        assert_eq!(roundtripped, b"hello image");
    }
}
