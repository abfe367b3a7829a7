use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use id3_retroencode::LegacyEncoding;

#[derive(Parser, Debug)]
#[clap(name = "id3-retroencode", author, version, about, long_about = None)] // Read from `Cargo.toml`
pub struct Args {
    #[command(subcommand)]
    pub action: Action,
    /// Log more: -v for every file, -vv for every frame.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Copy FILEs into DIR with their text frames re-encoded for old players.
    Retroencode(RetroencodeArgs),
    /// Print the frames of each FILE.
    Inspect {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        /// Show single byte frames as this legacy encoding instead of ISO-8859-1.
        #[arg(short, long, value_name = "ENCODING")]
        legacy: Option<LegacyEncoding>,
    },
}

#[derive(clap::Args, Debug)]
pub struct RetroencodeArgs {
    /// Input files.
    #[arg(short, long = "input", value_name = "FILE", num_args = 1.., required = true)]
    pub inputs: Vec<PathBuf>,
    /// Output directory, created if missing. Files keep their names.
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,
    /// Frames to keep; the rest are dropped.
    /// Default: TALB TPE1 TPE2 TCOP TPOS TCON TIT2 TRCK TYER
    #[arg(short, long, value_name = "ID", num_args = 1..)]
    pub preserve: Option<Vec<String>>,
    /// Target encoding: shift-jis (default) or latin-1.
    #[arg(short, long, value_name = "ENCODING")]
    pub encoding: Option<LegacyEncoding>,
    /// Take suggested replacements for unmappable characters without asking.
    #[arg(short = 'u', long)]
    pub automatic: bool,
    /// Overwrite existing output files without asking.
    #[arg(short = 'w', long)]
    pub overwrite: bool,
    /// TOML config file; ID3_RETROENCODE_* variables override it.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn retroencode_args_test() {
        let args = Args::try_parse_from(&[
            "id3-retroencode",
            "-v",
            "retroencode",
            "-i",
            "a.mp3",
            "b.mp3",
            "-o",
            "out",
            "-p",
            "TIT2",
            "TPE1",
            "-e",
            "latin-1",
            "-uw",
        ])
        .unwrap();

        assert_eq!(args.verbose, 1);
        match args.action {
            Action::Retroencode(args) => {
                assert_eq!(
                    args.inputs,
                    vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")]
                );
                assert_eq!(args.output, PathBuf::from("out"));
                assert_eq!(
                    args.preserve,
                    Some(vec!["TIT2".to_string(), "TPE1".to_string()])
                );
                assert_eq!(args.encoding, Some(LegacyEncoding::Latin1));
                assert!(args.automatic);
                assert!(args.overwrite);
                assert_eq!(args.config, None);
            }
            x => panic!("expected retroencode, got {:?}", x),
        }
    }

    #[test]
    fn inspect_args_test() {
        let args =
            Args::try_parse_from(&["id3-retroencode", "inspect", "a.mp3", "-l", "sjis", "-vv"])
                .unwrap();

        assert_eq!(args.verbose, 2);
        match args.action {
            Action::Inspect { files, legacy } => {
                assert_eq!(files, vec![PathBuf::from("a.mp3")]);
                assert_eq!(legacy, Some(LegacyEncoding::ShiftJis));
            }
            x => panic!("expected inspect, got {:?}", x),
        }
    }

    #[test]
    fn missing_args_test() {
        assert!(Args::try_parse_from(&["id3-retroencode", "retroencode", "-o", "out"]).is_err());
        assert!(Args::try_parse_from(&["id3-retroencode", "retroencode", "-i", "a.mp3"]).is_err());
        assert!(Args::try_parse_from(&["id3-retroencode", "inspect"]).is_err());
        assert!(Args::try_parse_from(&[
            "id3-retroencode",
            "retroencode",
            "-i",
            "a.mp3",
            "-o",
            "out",
            "-e",
            "utf-8"
        ])
        .is_err());
    }
}
