//! Settings handed to the engine. Nothing in here changes while files are
//! being processed, so one `Config` can be shared by every worker.

use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::id3v2::is_frame_id;
use crate::legacy::LegacyEncoding;

pub const DEFAULT_PRESERVED_FRAMES: [&str; 9] = [
    "TALB", "TPE1", "TPE2", "TCOP", "TPOS", "TCON", "TIT2", "TRCK", "TYER",
];

/// Prefix for environment variables overriding the config file,
/// e.g. `ID3_RETROENCODE_TARGET=latin-1`.
pub const ENV_PREFIX: &str = "ID3_RETROENCODE_";

/// Frame ids to keep; everything else is dropped from the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PreserveSet(BTreeSet<String>);

impl PreserveSet {
    pub fn new<I, S>(ids: I) -> Result<PreserveSet, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for id in ids {
            let id = id.as_ref().trim().to_ascii_uppercase();
            if !is_frame_id(&id) {
                return Err(format!("\"{}\" is not a frame id", id));
            }
            set.insert(id);
        }
        Ok(PreserveSet(set))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for PreserveSet {
    fn default() -> Self {
        PreserveSet(DEFAULT_PRESERVED_FRAMES.iter().map(|s| s.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for PreserveSet {
    type Error = String;

    fn try_from(ids: Vec<String>) -> Result<Self, Self::Error> {
        PreserveSet::new(ids)
    }
}

impl From<PreserveSet> for Vec<String> {
    fn from(set: PreserveSet) -> Self {
        set.0.into_iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstitutionMode {
    Automatic,
    Interactive,
}

/// What happens to frames that are already `$00` (Latin-1, or legacy bytes
/// written by an earlier run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Latin1Frames {
    Passthrough,
    Transcode,
}

/// How values of a multi-value frame are joined in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiValueStyle {
    /// `$00` between values (ID3v2.4)
    Null,
    /// `/` between values, for readers that stop at the first null
    Slash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preserve: PreserveSet,
    pub target: LegacyEncoding,
    pub substitution: SubstitutionMode,
    pub latin1_frames: Latin1Frames,
    pub multi_value: MultiValueStyle,
    /// last resort for unmappable characters; empty to abort instead
    pub placeholder: String,
    /// zero bytes after the last frame
    pub padding: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            preserve: PreserveSet::default(),
            target: LegacyEncoding::ShiftJis,
            substitution: SubstitutionMode::Interactive,
            latin1_frames: Latin1Frames::Passthrough,
            multi_value: MultiValueStyle::Null,
            placeholder: "_".to_string(),
            padding: 32,
        }
    }
}

impl Config {
    /// Defaults, overridden by the TOML file at `path` (if given), overridden
    /// by `ID3_RETROENCODE_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Config, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX)).extract()
    }
}
