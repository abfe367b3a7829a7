//! The retroencoding engine: builds a new tag holding only the preserved
//! frames, with every Unicode text frame rewritten in the legacy target.

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::{Config, Latin1Frames, MultiValueStyle};
use crate::id3v2::{Frame, Tag};
use crate::legacy::LegacyEncoding;
use crate::substitute::{
    FoldingPolicy, SubstitutionDecision, SubstitutionRequest, SubstitutionResolver,
    SuggestionPolicy,
};
use crate::text::{self, DecodeError, TextEncoding};

/// Replacements the target can't represent either are sent back to the
/// resolver this many times before the file is given up on.
pub const MAX_REPLACEMENT_ATTEMPTS: usize = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot decode {frame}: {source}")]
    Decode {
        frame: String,
        #[source]
        source: DecodeError,
    },
    #[error("aborted on {character:?} in {frame} (position {position})")]
    Aborted {
        frame: String,
        character: char,
        position: usize,
    },
}

pub struct Retroencoder<'a> {
    config: &'a Config,
    policy: Box<dyn SuggestionPolicy + Send + Sync + 'a>,
}

impl<'a> Retroencoder<'a> {
    /// An engine that suggests replacements with [`FoldingPolicy`].
    pub fn new(config: &'a Config) -> Self {
        Retroencoder {
            config,
            policy: Box::new(FoldingPolicy::new(&config.placeholder)),
        }
    }

    pub fn with_policy<P>(config: &'a Config, policy: P) -> Self
    where
        P: SuggestionPolicy + Send + Sync + 'a,
    {
        Retroencoder {
            config,
            policy: Box::new(policy),
        }
    }

    /// Builds the output tag. `input` is left as it is; on error nothing
    /// of the partial output survives.
    pub fn retroencode(
        &self,
        input: &Tag,
        resolver: &mut dyn SubstitutionResolver,
    ) -> Result<Tag, EngineError> {
        let mut output = Tag {
            version: input.version,
            revision: input.revision,
            is_experimental: input.is_experimental,
            frames: Vec::with_capacity(input.frames.len()),
            padding: self.config.padding,
        };

        for frame in &input.frames {
            if !self.config.preserve.contains(&frame.id) {
                debug!("{}: not preserved, dropping", frame.id);
                continue;
            }
            if frame.payload.is_empty() {
                debug!("{}: empty, dropping", frame.id);
                continue;
            }
            output.frames.push(self.frame(frame, input.version, resolver)?);
        }

        info!(
            "kept {} of {} frames as {}",
            output.frames.len(),
            input.frames.len(),
            self.config.target
        );
        Ok(output)
    }

    fn frame(
        &self,
        frame: &Frame,
        version: u8,
        resolver: &mut dyn SubstitutionResolver,
    ) -> Result<Frame, EngineError> {
        let prefix_len = match text::prefix_len(&frame.id) {
            Some(n) if !frame.is_opaque(version) => n,
            _ => {
                debug!("{}: passing through {} bytes", frame.id, frame.payload.len());
                return Ok(frame.clone());
            }
        };

        // an unknown marker is left for the decoder to report
        let is_unicode = TextEncoding::from_marker(frame.payload[0])
            .map(TextEncoding::is_unicode)
            .unwrap_or(true);
        if !is_unicode && self.config.latin1_frames == Latin1Frames::Passthrough {
            debug!("{}: already single byte, passing through", frame.id);
            return Ok(frame.clone());
        }

        let (prefix, value) =
            text::decode_prefixed(&frame.payload, prefix_len).map_err(|source| {
                EngineError::Decode {
                    frame: frame.id.clone(),
                    source,
                }
            })?;
        debug!("{} ({:?}): {}", frame.id, value.encoding, value.joined());

        let separator = self.separator(&frame.id);
        let mut payload = vec![TextEncoding::Latin1.marker()];
        payload.extend_from_slice(&prefix);
        for (index, v) in value.values.iter().enumerate() {
            if index > 0 {
                payload.push(separator);
            }
            payload.append(&mut self.transcode(&frame.id, index, v, resolver)?);
        }
        payload.push(0x00);

        debug!("{}: re-encoded as {:02X?}", frame.id, payload);
        Ok(frame.with_payload(payload))
    }

    fn separator(&self, id: &str) -> u8 {
        match (self.config.multi_value, id) {
            // description and text, not a list
            (_, "TXXX") | (_, "COMM") | (_, "USLT") => 0x00,
            (MultiValueStyle::Null, _) => 0x00,
            (MultiValueStyle::Slash, _) => b'/',
        }
    }

    fn transcode(
        &self,
        frame: &str,
        value_index: usize,
        value: &str,
        resolver: &mut dyn SubstitutionResolver,
    ) -> Result<Vec<u8>, EngineError> {
        let target = self.config.target;
        let mut result = Vec::with_capacity(value.len());

        for (position, c) in value.chars().enumerate() {
            if let Some(mut bytes) = target.map(c) {
                result.append(&mut bytes);
                continue;
            }

            let aborted = || EngineError::Aborted {
                frame: frame.to_string(),
                character: c,
                position,
            };
            let suggestion = self.policy.suggest(c, target);
            let mut rejected: Option<String> = None;
            let mut attempts = 0;

            loop {
                let decision = resolver.resolve(&SubstitutionRequest {
                    frame,
                    value,
                    value_index,
                    position,
                    character: c,
                    target,
                    suggestion: suggestion.as_deref(),
                    rejected: rejected.as_deref(),
                });

                match decision {
                    SubstitutionDecision::Accept => {
                        let s = suggestion.as_deref().ok_or_else(aborted)?;
                        let mut bytes = encode(target, s).ok_or_else(aborted)?;
                        warn!("{}: {:?} replaced with {:?}", frame, c, s);
                        result.append(&mut bytes);
                        break;
                    }
                    SubstitutionDecision::Replace(s) => match encode(target, &s) {
                        Some(mut bytes) => {
                            warn!("{}: {:?} replaced with {:?}", frame, c, s);
                            result.append(&mut bytes);
                            break;
                        }
                        None => {
                            attempts += 1;
                            if attempts >= MAX_REPLACEMENT_ATTEMPTS {
                                return Err(aborted());
                            }
                            rejected = Some(s);
                        }
                    },
                    SubstitutionDecision::Skip => {
                        warn!("{}: {:?} dropped", frame, c);
                        break;
                    }
                    SubstitutionDecision::Abort => return Err(aborted()),
                }
            }
        }

        Ok(result)
    }
}

// replacements go into a null separated payload, so no nulls of their own
fn encode(target: LegacyEncoding, s: &str) -> Option<Vec<u8>> {
    if s.contains('\0') {
        return None;
    }
    target.encode(s)
}
