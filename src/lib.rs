#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod id3v2;
pub mod legacy;
pub mod retro;
pub mod substitute;
pub mod text;

mod dispatch;
mod tools;

pub use crate::config::Config;
pub use crate::dispatch::inspect_file;
pub use crate::dispatch::retroencode_bytes;
pub use crate::dispatch::retroencode_file;
pub use crate::id3v2::{Frame, Tag, TagError};
pub use crate::legacy::LegacyEncoding;
pub use crate::retro::{EngineError, Retroencoder};
pub use crate::substitute::{
    AutomaticResolver, InteractiveResolver, SubstitutionDecision, SubstitutionRequest,
    SubstitutionResolver,
};
pub use crate::text::{DecodeError, TextEncoding, TextValue};

use std::io;
use thiserror::Error;

/// Everything that can go wrong while retroencoding a single file.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Error reading tag: {0}")]
    Tag(#[from] TagError),
    #[error("Error re-encoding tag: {0}")]
    Engine(#[from] EngineError),
}
