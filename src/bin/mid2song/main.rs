// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! `mid2song` converts MIDI files into compact JSON songs.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use mid2song::{app_version, prelude::*};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Default)]
#[clap(author, about, long_about = None)]
struct Args {
    /// Names of files to process. Accepts Standard MIDI Files.
    input: Vec<String>,

    /// Read conversion settings from this JSON file
    #[clap(short = 'c', long, value_parser)]
    config: Option<PathBuf>,

    /// Write output here instead of next to each input file
    #[clap(short = 'o', long, value_parser)]
    output_dir: Option<PathBuf>,

    /// Convert and report, but don't write anything
    #[clap(short = 'n', long, value_parser)]
    dry_run: bool,

    /// Print version and exit
    #[clap(short = 'v', long, value_parser)]
    version: bool,
}

/// `song.mid` becomes `song.mid.json`, either beside the input or in
/// `output_dir`.
fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let mut name = input.file_name().unwrap_or_default().to_os_string();
    name.push(".json");
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn convert_file(converter: &Converter, input: &Path, args: &Args) -> anyhow::Result<()> {
    log::info!("reading {}", input.display());
    let messages = SmfReader::read_file(input)
        .with_context(|| format!("while reading {}", input.display()))?;
    let mut conversion = converter
        .convert(&messages)
        .with_context(|| format!("while converting {}", input.display()))?;
    let json = conversion
        .check_size()
        .with_context(|| format!("while serializing {}", input.display()))?;

    let report = &conversion.report;
    log::info!(
        "{}: {} notes, {} melodic channels reduced to {} slots, {} warning(s)",
        input.display(),
        conversion.song.song_length,
        report.used_before.len(),
        report.slots.len(),
        report.warnings.len()
    );

    if args.dry_run {
        return Ok(());
    }
    let output = output_path(input, args.output_dir.as_deref());
    std::fs::write(&output, json).with_context(|| format!("while writing {}", output.display()))?;
    eprintln!("Wrote {}", output.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.version {
        println!("{}", app_version());
        return Ok(());
    }

    let settings = match &args.config {
        Some(path) => ConvertSettings::load(path)?,
        None => ConvertSettings::default(),
    };
    let converter = Converter::new(settings);

    let mut failures = 0;
    for input in args.input.iter() {
        if let Err(e) = convert_file(&converter, Path::new(input), &args) {
            eprintln!("error: {e:?}");
            failures += 1;
        }
    }
    if failures > 0 {
        return Err(anyhow::format_err!(
            "{failures} of {} file(s) failed to convert",
            args.input.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_goes_next_to_input_by_default() {
        assert_eq!(
            output_path(Path::new("songs/tune.mid"), None),
            PathBuf::from("songs/tune.mid.json")
        );
        assert_eq!(
            output_path(Path::new("songs/tune.mid"), Some(Path::new("/tmp/out"))),
            PathBuf::from("/tmp/out/tune.mid.json")
        );
    }
}
