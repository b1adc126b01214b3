use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

static BRACED_LETTER: OnceLock<Regex> = OnceLock::new();

fn braced_letter() -> &'static Regex {
    BRACED_LETTER
        .get_or_init(|| Regex::new(r"\{([A-D])\}").expect("valid brace regex"))
}

/// A multiple-choice selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub fn all() -> [OptionLetter; 4] {
        [
            OptionLetter::A,
            OptionLetter::B,
            OptionLetter::C,
            OptionLetter::D,
        ]
    }

    /// Case-insensitive conversion from a single character.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLetter::A),
            'B' => Some(OptionLetter::B),
            'C' => Some(OptionLetter::C),
            'D' => Some(OptionLetter::D),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            OptionLetter::A => 'A',
            OptionLetter::B => 'B',
            OptionLetter::C => 'C',
            OptionLetter::D => 'D',
        }
    }

    /// Reads a ground-truth answer as an option letter.
    ///
    /// Unlike [`extract_option`] this is strict: the answer, trimmed and with
    /// surrounding brackets removed, must be exactly one letter. Open-form
    /// answers such as `"[AD]"` are not option answers.
    pub fn from_ground_truth(answer: &str) -> Option<Self> {
        let inner = answer
            .trim()
            .trim_matches(|c| c == '[' || c == ']')
            .trim();
        let mut chars = inner.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Pulls the model's chosen option out of free text.
///
/// Searched in order, last match wins within a tier:
/// 1. a letter in braces, e.g. `{B}`
/// 2. a letter standing alone between non-letters
/// 3. any A-D character at all
///
/// Returns `None` when the text holds no candidate letter.
pub fn extract_option(text: &str) -> Option<OptionLetter> {
    let upper = text.to_uppercase();

    if let Some(letter) = braced_letter()
        .captures_iter(&upper)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().chars().next())
        .filter_map(OptionLetter::from_char)
        .last()
    {
        return Some(letter);
    }

    let chars: Vec<char> = upper.chars().collect();
    let isolated = (0..chars.len()).rev().find_map(|i| {
        let letter = OptionLetter::from_char(chars[i])?;
        let before_ok = i == 0 || !chars[i - 1].is_alphabetic();
        let after_ok = i + 1 == chars.len() || !chars[i + 1].is_alphabetic();
        (before_ok && after_ok).then_some(letter)
    });
    if isolated.is_some() {
        return isolated;
    }

    chars.iter().rev().find_map(|&c| OptionLetter::from_char(c))
}
