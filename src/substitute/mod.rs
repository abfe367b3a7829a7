//! What to do with characters the target encoding can't represent.
//!
//! The engine asks a [`SuggestionPolicy`] for a replacement, then hands a
//! [`SubstitutionRequest`] to a [`SubstitutionResolver`] and applies the
//! [`SubstitutionDecision`] it gets back.

mod fold;

use crate::legacy::LegacyEncoding;

/// Everything needed to decide about one unmappable character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRequest<'a> {
    pub frame: &'a str,
    /// the whole value the character appears in
    pub value: &'a str,
    pub value_index: usize,
    /// position in characters, not bytes
    pub position: usize,
    pub character: char,
    pub target: LegacyEncoding,
    pub suggestion: Option<&'a str>,
    /// a replacement given earlier for this same character that was itself unmappable
    pub rejected: Option<&'a str>,
}

impl SubstitutionRequest<'_> {
    /// The value as it would read with the suggestion applied.
    pub fn suggested_value(&self) -> Option<String> {
        let suggestion = self.suggestion?;
        Some(
            self.value
                .chars()
                .enumerate()
                .fold(String::new(), |mut s, (i, c)| {
                    if i == self.position {
                        s.push_str(suggestion);
                    } else {
                        s.push(c);
                    }
                    s
                }),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionDecision {
    /// use the suggestion from the request
    Accept,
    Replace(String),
    /// drop the character
    Skip,
    /// give up on the whole file
    Abort,
}

pub trait SubstitutionResolver {
    fn resolve(&mut self, request: &SubstitutionRequest<'_>) -> SubstitutionDecision;
}

/// Takes every suggestion; aborts when there is none.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutomaticResolver;

impl SubstitutionResolver for AutomaticResolver {
    fn resolve(&mut self, request: &SubstitutionRequest<'_>) -> SubstitutionDecision {
        match request.suggestion {
            Some(_) => SubstitutionDecision::Accept,
            None => SubstitutionDecision::Abort,
        }
    }
}

/// Hands every request to a callback, typically one that asks the user.
pub struct InteractiveResolver<F> {
    prompt: F,
}

impl<F> InteractiveResolver<F>
where
    F: FnMut(&SubstitutionRequest<'_>) -> SubstitutionDecision,
{
    pub fn new(prompt: F) -> Self {
        InteractiveResolver { prompt }
    }
}

impl<F> SubstitutionResolver for InteractiveResolver<F>
where
    F: FnMut(&SubstitutionRequest<'_>) -> SubstitutionDecision,
{
    fn resolve(&mut self, request: &SubstitutionRequest<'_>) -> SubstitutionDecision {
        (self.prompt)(request)
    }
}

pub trait SuggestionPolicy {
    /// A replacement for `c` that `target` can represent in full, if there is one.
    fn suggest(&self, c: char, target: LegacyEncoding) -> Option<String>;
}

/// Tries, in order: fullwidth to halfwidth, a few fixed folds (`™` to `TM`,
/// zero width characters to nothing), ASCII transliteration, then a fixed
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldingPolicy {
    placeholder: Option<String>,
}

impl FoldingPolicy {
    /// An empty placeholder means no placeholder at all.
    pub fn new(placeholder: &str) -> Self {
        FoldingPolicy {
            placeholder: if placeholder.is_empty() {
                None
            } else {
                Some(placeholder.to_string())
            },
        }
    }
}

impl Default for FoldingPolicy {
    fn default() -> Self {
        FoldingPolicy::new("_")
    }
}

impl SuggestionPolicy for FoldingPolicy {
    fn suggest(&self, c: char, target: LegacyEncoding) -> Option<String> {
        fold::width(c)
            .map(String::from)
            .into_iter()
            .chain(fold::table(c).map(String::from))
            .chain(fold::transliterate(c).map(String::from))
            .chain(self.placeholder.clone())
            .find(|s| target.encode(s).is_some())
    }
}
