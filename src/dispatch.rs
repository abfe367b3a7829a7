use std::ffi::OsString;
use std::fs::{self, File};
use std::io::prelude::*;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::Config;
use crate::id3v2::{self, Header, Tag, HEADER_LEN};
use crate::retro::Retroencoder;
use crate::substitute::SubstitutionResolver;
use crate::Error;

/// Whole file in, whole file out: the rebuilt tag followed by everything
/// after the old one (audio, and an ID3v1 block if there is one).
pub fn retroencode_bytes(
    input: &[u8],
    config: &Config,
    resolver: &mut dyn SubstitutionResolver,
) -> Result<Vec<u8>, Error> {
    let (header, tag) = id3v2::parse_with_header(input)?;
    let output = Retroencoder::new(config).retroencode(&tag, resolver)?;

    let mut bytes = id3v2::serialize(&output)?;
    let rest = input.get(header.tag_len()..).unwrap_or_default();
    debug!(
        "tag: {} -> {} bytes, {} bytes of audio",
        header.tag_len(),
        bytes.len(),
        rest.len()
    );
    bytes.extend_from_slice(rest);
    Ok(bytes)
}

/// Reads `input`, and writes the result to `output` only once the whole tag
/// has been rebuilt. `output` is replaced in one rename, so it is never left
/// half written.
pub fn retroencode_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &Config,
    resolver: &mut dyn SubstitutionResolver,
) -> Result<(), Error> {
    let (input, output) = (input.as_ref(), output.as_ref());

    let bytes = retroencode_bytes(&fs::read(input)?, config, resolver)?;

    let tmp_path = tmp_path(output);
    if let Err(x) = write_all(&tmp_path, &bytes) {
        // on failure, delete temporary file
        fs::remove_file(&tmp_path).ok();
        return Err(x);
    }

    // replace output file
    fs::rename(&tmp_path, output)?;
    info!("{} -> {}", input.display(), output.display());
    Ok(())
}

/// Reads just the tag at the start of the file at `path`.
pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<(Header, Tag), Error> {
    let mut file = File::open(path)?;

    let mut buf = vec![0; HEADER_LEN];
    file.read_exact(&mut buf)?;
    let header = id3v2::header(&buf)?;

    // a short read is reported by the parser as truncated input
    (&mut file)
        .take((header.tag_len() - HEADER_LEN) as u64)
        .read_to_end(&mut buf)?;
    Ok(id3v2::parse_with_header(&buf)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_all(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let mut file = BufWriter::new(
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?,
    );
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}
