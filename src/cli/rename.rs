//! Auto-rename presets for PBG1A and PBG3 extraction.
//!
//! PBG1A has no stored names at all, so its presets reconstruct a whole
//! filename from the entry's index; PBG3 already has a name, so its
//! presets only pick an extension. Both are ported from the inline
//! rename logic in `pbg1a.cpp` and `pbg3.cpp` — not lookup tables in the
//! original, but index/name-keyed branches, kept that way here.

/// Suggests the part of a PBG1A output filename that follows
/// `{index:02}_`, for one of `enemy`, `graph`, `graph2`, `music`, `sound`.
/// Returns `None` for an unrecognized preset or an index the original
/// tool never assigned a name to.
pub fn pbg1a_name(preset: &str, index: usize) -> Option<String> {
    match preset {
        "enemy" => Some(pbg1a_enemy_name(index)).filter(|s| !s.is_empty()),
        "graph" => Some(pbg1a_graph_name(index)),
        "graph2" => Some(pbg1a_graph2_name(index)),
        "music" => Some(format!("SH01_{:02}.MID", index)),
        "sound" => PBG1A_SOUND_NAMES.get(index).map(|s| s.to_string()),
        _ => None,
    }
}

fn pbg1a_enemy_name(index: usize) -> String {
    match index {
        0..=5 => format!("STG{}.ECL", (index % 6) + 1),
        6..=11 => format!("STG{}.SCL", (index % 6) + 1),
        12..=17 => format!("STG{}.MAP", (index % 6) + 1),
        18..=23 => format!("STG{}.DEM", (index % 6) + 1),
        24 => "STG7.ECL".to_string(),
        25 => "STG7.SCL".to_string(),
        26 => "STG7.MAP".to_string(),
        27..=46 => format!("MUSCMT{:02}.TXT", index % 27),
        47 => "ENDING.SCL".to_string(),
        _ => String::new(),
    }
}

fn pbg1a_graph_name(index: usize) -> String {
    let body = match index {
        0 => "COMMON".to_string(),
        1..=6 => format!("STG{}ENM", index),
        7..=12 => format!("STG{}BG", (index % 7) + 1),
        13..=22 => format!("FACE{}", index % 13),
        23 => "MUSICROOM".to_string(),
        24 => "TITLE".to_string(),
        25 => "SCORE".to_string(),
        26 => "VIVBOMB".to_string(),
        27 => "STG7BG".to_string(),
        28 => "STG7ENM".to_string(),
        29 => "STG7ENM2".to_string(),
        30 => "STG7ENM3".to_string(),
        31 => "SH01LOGO".to_string(),
        _ => String::new(),
    };
    format!("{body}.BMP")
}

fn pbg1a_graph2_name(index: usize) -> String {
    let body = if index != 0 { format!("END{index:02}") } else { "CREDITS".to_string() };
    format!("{body}.BMP")
}

const PBG1A_SOUND_NAMES: [&str; 20] = [
    "KEBARI.WAV",
    "TAME.WAV",
    "LASER.WAV",
    "LASER2.WAV",
    "BOMB.WAV",
    "SELECT.WAV",
    "HIT.WAV",
    "CANCEL.WAV",
    "WARNING.WAV",
    "SBLASER.WAV",
    "BUZZ.WAV",
    "MISSILE.WAV",
    "JOINT.WAV",
    "DEAD.WAV",
    "SBBOMB.WAV",
    "BOSSBOMB.WAV",
    "ENEMYSHOT.WAV",
    "HLASER.WAV",
    "TAMEFAST.WAV",
    "WARP.WAV",
];

/// Suggests the extension to append to a PBG3 entry's already-stored
/// name, for one of `enemy`, `graph`, `graph2`/`graph3`, `music`, `sound`.
/// Returns an empty string for an unrecognized preset.
pub fn pbg3_extension(preset: &str, name: &str) -> &'static str {
    if name == "@VERSION@" {
        return "STR";
    }
    match preset {
        "enemy" => {
            if name.starts_with("SCRIPT/") {
                "SCL"
            } else {
                "STR"
            }
        }
        "graph" => {
            if name == "GRP/タイトル" {
                "JPG"
            } else {
                "BMP"
            }
        }
        "graph2" | "graph3" => {
            if name.starts_with("LOAD/") || name == "YUKA/ATK02D" || name == "YUKA/ATK02U" {
                "BMP"
            } else {
                "TGA"
            }
        }
        "music" => {
            if name.starts_with("MUSIC/") {
                "BMP"
            } else {
                "POS"
            }
        }
        "sound" => "WAV",
        _ => "",
    }
}
