use std::collections::HashMap;
use std::convert::TryFrom;

use deunicode::deunicode_char;

// overrides for characters that transliterate badly for old players
const FOLDS: &[(&str, &str)] = &[
    ("™", "TM"),
    ("©", "(C)"),
    ("®", "(R)"),
    ("\u{2116}", "No."),
    // zero width, nothing to show
    ("\u{200B}\u{200C}\u{200D}\u{2060}\u{FEFF}", ""),
];

lazy_static! {
    static ref TABLE: HashMap<char, &'static str> = FOLDS
        .iter()
        .flat_map(|(from, to)| from.chars().map(move |c| (c, *to)))
        .collect();
}

/// Fullwidth ASCII and the ideographic space to their plain ASCII forms.
pub fn width(c: char) -> Option<char> {
    match c {
        '\u{3000}' => Some(' '),
        '\u{FF01}'..='\u{FF5E}' => char::try_from(c as u32 - 0xFEE0).ok(),
        _ => None,
    }
}

pub fn table(c: char) -> Option<&'static str> {
    TABLE.get(&c).copied()
}

/// ASCII transliteration of any script: diacritics stripped, Cyrillic and
/// Greek romanised, ligatures and typographic punctuation spelled out.
pub fn transliterate(c: char) -> Option<&'static str> {
    match deunicode_char(c) {
        Some("") | Some("[?]") | None => None,
        s => s,
    }
}
