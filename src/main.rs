use clap::{arg, crate_version, Command};
use pbgtool::cli::{self, Format};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

const RCH: &str = "unreachable was reached";

fn main() -> ExitCode {
    env_logger::init();

    let long_help =
"Examples:
---------
Extract a PBG5 archive:  pbgtool extract --format 5 --input stage.dat --output stage/
Repack a PBG3 directory: pbgtool pack --format 3 --input stage/ --output stage.dat
Apply a rename preset:   pbgtool extract --format 1 --input ed.dat --output ed/ --rename graph";

    let formats = ["1", "3", "4", "5", "6"];
    let presets = ["enemy", "graph", "graph2", "graph3", "music", "sound"];

    let mut main_cmd = Command::new("pbgtool")
        .about("Extract and repack Seihou PBG packfiles")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("extract")
            .about("unpack an archive into a directory")
            .arg(arg!(-f --format <FORMAT> "container format").value_parser(formats).required(true))
            .arg(arg!(-i --input <PATH> "archive to read").required(true))
            .arg(arg!(-o --output <PATH> "directory to write extracted files into").required(true))
            .arg(arg!(-r --rename <PRESET> "auto-rename entries using a known preset (PBG1A, PBG3 only)")
                .value_parser(presets)
                .required(false)),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("pack")
            .about("build an archive from a directory")
            .arg(arg!(-f --format <FORMAT> "container format").value_parser(formats).required(true))
            .arg(arg!(-i --input <PATH> "directory to read files from").required(true))
            .arg(arg!(-o --output <PATH> "archive to write").required(true))
            .arg(arg!(--"remove-extensions" "strip file extensions from stored names (PBG3 only)")
                .required(false)),
    );

    let matches = main_cmd.get_matches();

    let result = if let Some(cmd) = matches.subcommand_matches("extract") {
        run_extract(cmd)
    } else if let Some(cmd) = matches.subcommand_matches("pack") {
        run_pack(cmd)
    } else {
        eprintln!("no subcommand given; try `pbgtool --help`");
        return ExitCode::FAILURE;
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Distinguishes failure categories by exit code rather than collapsing
/// every error onto a single failure status: missing/unreadable input or
/// output (`Io`), a file that isn't the format it claims to be
/// (`BadMagic`), a file shorter than its own header says (`Truncated`),
/// a codec that hit an internal inconsistency (`CorruptCodec`), a
/// checksum that didn't verify (`ChecksumMismatch`), and a bad CLI
/// argument such as an unsupported `--rename` preset (`BadArgument`).
fn exit_code_for(err: &pbgtool::Error) -> u8 {
    match err {
        pbgtool::Error::Io(_) => 2,
        pbgtool::Error::BadMagic { .. } => 3,
        pbgtool::Error::Truncated { .. } => 4,
        pbgtool::Error::CorruptCodec(_) => 5,
        pbgtool::Error::ChecksumMismatch { .. } => 6,
        pbgtool::Error::BadArgument(_) => 7,
    }
}

fn run_extract(cmd: &clap::ArgMatches) -> Result<(), pbgtool::Error> {
    let format_str = cmd.get_one::<String>("format").expect(RCH);
    let format = Format::from_str(format_str)?;
    let input = PathBuf::from(cmd.get_one::<String>("input").expect(RCH));
    let output = PathBuf::from(cmd.get_one::<String>("output").expect(RCH));
    let rename_preset = cmd.get_one::<String>("rename").map(|s| s.as_str());

    if rename_preset.is_some() && !format.supports_rename() {
        return Err(pbgtool::Error::BadArgument(format!(
            "--rename is not supported for format {format_str}"
        )));
    }

    log::info!("extracting {} ({format_str}) into {}", input.display(), output.display());
    let data = std::fs::read(&input)?;
    let soft_errors = cli::extract(format, &data, &output, rename_preset)?;
    for err in &soft_errors {
        log::warn!("{err}");
    }
    log::info!("extracted with {} checksum warning(s)", soft_errors.len());
    Ok(())
}

fn run_pack(cmd: &clap::ArgMatches) -> Result<(), pbgtool::Error> {
    let format_str = cmd.get_one::<String>("format").expect(RCH);
    let format = Format::from_str(format_str)?;
    let input = PathBuf::from(cmd.get_one::<String>("input").expect(RCH));
    let output = PathBuf::from(cmd.get_one::<String>("output").expect(RCH));
    let remove_extensions = cmd.get_flag("remove-extensions");

    if remove_extensions && !format.supports_remove_extensions() {
        return Err(pbgtool::Error::BadArgument(format!(
            "--remove-extensions is not supported for format {format_str}"
        )));
    }

    log::info!("packing {} ({format_str}) into {}", input.display(), output.display());
    let packed = cli::pack(format, &input, remove_extensions)?;
    std::fs::write(&output, &packed)?;
    log::info!("wrote {} bytes to {}", packed.len(), output.display());
    Ok(())
}
