mod cli;
mod prompt;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use id3_retroencode::config::{PreserveSet, SubstitutionMode};
use id3_retroencode::id3v2::{Header, Tag};
use id3_retroencode::text::{self, TextEncoding};
use id3_retroencode::{
    inspect_file, retroencode_file, AutomaticResolver, Config, InteractiveResolver,
    LegacyEncoding, SubstitutionRequest, SubstitutionResolver,
};
use log::{error, info};

use cli::{Action, RetroencodeArgs};
use prompt::SubstitutionPrompt;

/// One input and where its output goes.
type Job = (PathBuf, PathBuf);

fn main() -> Result<()> {
    let args = cli::Args::parse();

    if std::env::var_os("RUST_LOG").is_none() {
        let level = match args.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        std::env::set_var("RUST_LOG", level);
    }
    lovely_env_logger::init_default();

    match args.action {
        Action::Retroencode(args) => retroencode(&args),
        Action::Inspect { files, legacy } => inspect(&files, legacy),
    }
}

fn get_config(args: &RetroencodeArgs) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref()).context("Could not load config")?;

    if let Some(ids) = &args.preserve {
        config.preserve = PreserveSet::new(ids).map_err(|e| anyhow!(e))?;
    }
    if let Some(encoding) = args.encoding {
        config.target = encoding;
    }
    if args.automatic {
        config.substitution = SubstitutionMode::Automatic;
    }
    Ok(config)
}

fn retroencode(args: &RetroencodeArgs) -> Result<()> {
    let config = get_config(args)?;
    info!(
        "target {}, preserving {}",
        config.target,
        config.preserve.iter().collect::<Vec<_>>().join(" ")
    );

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Could not create {}", args.output.display()))?;

    // overwrite questions come first, before any work starts
    let mut jobs = Vec::new();
    let mut planned = HashSet::new();
    let mut failed = 0;
    for input in &args.inputs {
        match plan(input, &args.output, args.overwrite, &mut planned) {
            Ok(Some(output)) => jobs.push((input.clone(), output)),
            Ok(None) => println!("{}: skipped", input.display()),
            Err(e) => {
                error!("{}: {}", input.display(), e);
                failed += 1;
            }
        }
    }

    failed += match config.substitution {
        SubstitutionMode::Automatic => run_automatic(&jobs, &config),
        SubstitutionMode::Interactive => {
            let mut prompt = SubstitutionPrompt::default();
            let mut failed = 0;
            for job in &jobs {
                let mut resolver =
                    InteractiveResolver::new(|r: &SubstitutionRequest<'_>| prompt.ask(r));
                if !run(job, &config, &mut resolver) {
                    failed += 1;
                }
            }
            failed
        }
    };

    if failed > 0 {
        bail!("{} of {} files failed", failed, args.inputs.len());
    }
    Ok(())
}

/// The output path for `input`, or `None` if the user doesn't want it overwritten.
/// Every output path goes into `planned`; two inputs may not share one.
fn plan(
    input: &Path,
    output_dir: &Path,
    overwrite: bool,
    planned: &mut HashSet<PathBuf>,
) -> Result<Option<PathBuf>> {
    let name = input
        .file_name()
        .ok_or_else(|| anyhow!("not a file name"))?;
    let output = output_dir.join(name);

    if same_file(input, &output) {
        bail!("output would overwrite the input");
    }
    if planned.contains(&output) {
        bail!(
            "{} is already the output of another input",
            output.display()
        );
    }
    if output.exists()
        && !overwrite
        && !prompt::yes_no(&format!(
            "{} exists. Allow overwrite?",
            output.display()
        ))
    {
        return Ok(None);
    }

    planned.insert(output.clone());
    Ok(Some(output))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn run(job: &Job, config: &Config, resolver: &mut dyn SubstitutionResolver) -> bool {
    let (input, output) = job;
    match retroencode_file(input, output, config, resolver) {
        Ok(()) => {
            println!("{} >>> {}", input.display(), output.display());
            true
        }
        Err(e) => {
            error!("{}: {}", input.display(), e);
            false
        }
    }
}

#[cfg(feature = "parallel")]
fn run_automatic(jobs: &[Job], config: &Config) -> usize {
    use rayon::prelude::*;

    jobs.par_iter()
        .filter(|job| !run(job, config, &mut AutomaticResolver))
        .count()
}

#[cfg(not(feature = "parallel"))]
fn run_automatic(jobs: &[Job], config: &Config) -> usize {
    jobs.iter()
        .filter(|job| !run(job, config, &mut AutomaticResolver))
        .count()
}

fn inspect(files: &[PathBuf], legacy: Option<LegacyEncoding>) -> Result<()> {
    let mut failed = 0;
    for path in files {
        match inspect_file(path) {
            Ok((header, tag)) => print_tag(path, &header, &tag, legacy),
            Err(e) => {
                error!("{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed", failed, files.len());
    }
    Ok(())
}

fn print_tag(path: &Path, header: &Header, tag: &Tag, legacy: Option<LegacyEncoding>) {
    let mut flags = Vec::new();
    if header.is_unsynchronized {
        flags.push("unsynchronised");
    }
    if header.has_extended_header {
        flags.push("extended header");
    }
    if header.is_experimental {
        flags.push("experimental");
    }
    if header.has_footer {
        flags.push("footer");
    }

    println!(
        "{}: ID3v2.{}.{}, {} bytes{}{}",
        path.display(),
        header.version,
        header.revision,
        header.tag_len(),
        if flags.is_empty() { "" } else { ", " },
        flags.join(", ")
    );
    for frame in &tag.frames {
        println!(
            "  {} {:>7} [{:02X} {:02X}] {}",
            frame.id,
            frame.payload.len(),
            frame.flags[0],
            frame.flags[1],
            describe(frame, tag.version, legacy)
        );
    }
    println!("  padding {}", tag.padding);
}

fn describe(frame: &id3_retroencode::Frame, version: u8, legacy: Option<LegacyEncoding>) -> String {
    let prefix_len = match text::prefix_len(&frame.id) {
        Some(n) if !frame.is_opaque(version) && !frame.payload.is_empty() => n,
        _ => return format!("<{} bytes>", frame.payload.len()),
    };

    match (frame.payload[0], legacy) {
        (marker, Some(legacy)) if marker == TextEncoding::Latin1.marker() => {
            let text = frame.payload.get(1 + prefix_len..).unwrap_or_default();
            let values: Vec<String> = text
                .split(|&b| b == 0x00)
                .filter(|s| !s.is_empty())
                .map(|s| legacy.decode(s))
                .collect();
            format!("({}) {}", legacy, values.join(" / "))
        }
        _ => match text::decode_prefixed(&frame.payload, prefix_len) {
            Ok((_, value)) => format!("({:?}) {}", value.encoding, value.joined()),
            Err(e) => format!("<{}>", e),
        },
    }
}
