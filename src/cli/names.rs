//! Transcoding between a container entry's on-disk name (Shift-JIS,
//! `/`-separated regardless of host platform) and a filesystem [`Path`].

use encoding_rs::SHIFT_JIS;
use std::path::{Path, PathBuf};

/// Decodes a stored Shift-JIS name into a platform-native relative path,
/// joined under `base`. Empty path components (a leading or doubled `/`)
/// are skipped rather than rejected.
pub fn to_disk_path(base: &Path, name: &[u8]) -> PathBuf {
    let (decoded, _encoding, _had_errors) = SHIFT_JIS.decode(name);
    let mut path = base.to_path_buf();
    for part in decoded.split('/') {
        if !part.is_empty() {
            path.push(part);
        }
    }
    path
}

/// Encodes a filesystem path, relative to `base`, back into a Shift-JIS
/// name with `/` as the separator, as every container format expects.
pub fn from_disk_path(base: &Path, path: &Path) -> Vec<u8> {
    let relative = path.strip_prefix(base).unwrap_or(path);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    let (encoded, _encoding, _had_errors) = SHIFT_JIS.encode(&joined);
    encoded.into_owned()
}

/// PBG1A entries carry no stored name; this is the bare `{index:02}`
/// fallback used when no `--rename` preset supplies one.
pub fn index_name(index: usize) -> String {
    format!("{index:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ascii_path_with_subdirectory() {
        let base = Path::new("/out");
        let disk = to_disk_path(base, b"GRP/TITLE.BMP");
        assert_eq!(disk, Path::new("/out/GRP/TITLE.BMP"));
        let back = from_disk_path(base, &disk);
        assert_eq!(back, b"GRP/TITLE.BMP");
    }

    #[test]
    fn decodes_shift_jis_bytes() {
        let base = Path::new("/out");
        // "タイトル" (title) in Shift-JIS.
        let sjis = [0x83, 0x5E, 0x83, 0x43, 0x83, 0x67, 0x83, 0x8B];
        let disk = to_disk_path(base, &sjis);
        assert_eq!(disk.file_name().unwrap().to_str().unwrap(), "タイトル");
    }

    #[test]
    fn index_name_is_zero_padded() {
        assert_eq!(index_name(3), "03");
        assert_eq!(index_name(42), "42");
    }
}
