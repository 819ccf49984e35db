//! Classification responses and the indicator color table
//!
//! The classifier answers with a single line shaped `<Category> -> <Color>`.
//! Only the category is used; the color half is advisory and ignored, the
//! station looks colors up in its own table.

use heapless::String;

use crate::traits::{Color, MAX_RESPONSE_LEN};

/// Category used when the response cannot be understood
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Longest category kept after normalization
pub const MAX_CATEGORY_LEN: usize = 32;

const SEPARATOR: &str = "->";

/// Category → indicator color; anything else shows the alert color
const COLOR_TABLE: [(&str, Color); 4] = [
    ("glass", Color::PURPLE),
    ("paper or cardboard", Color::BLUE),
    ("paper/cardboard", Color::BLUE),
    ("general trash", Color::GREEN),
];

/// Shown for categories missing from the table
pub const ALERT_COLOR: Color = Color::RED;

/// A parsed classifier response
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClassificationResult {
    /// Normalized lower-case category
    pub category: String<MAX_CATEGORY_LEN>,
    /// The line as received, truncated to capacity
    pub raw: String<MAX_RESPONSE_LEN>,
    /// Whether the line had the expected shape
    pub well_formed: bool,
}

impl ClassificationResult {
    /// Parse a response line
    ///
    /// Takes the text before the first `->`, trimmed and lower-cased. A line
    /// without the separator, or with nothing before it, is "unknown".
    pub fn parse(line: &str) -> Self {
        let mut raw = String::new();
        push_truncated(&mut raw, line.trim());

        let category = line
            .split_once(SEPARATOR)
            .map(|(before, _)| before.trim())
            .filter(|c| !c.is_empty());

        match category {
            Some(c) => Self {
                category: normalize(c),
                raw,
                well_formed: true,
            },
            None => Self {
                category: unknown(),
                raw,
                well_formed: false,
            },
        }
    }

    /// Indicator color for this category
    pub fn color(&self) -> Color {
        color_for(&self.category)
    }

    /// Whether the category is in the color table
    pub fn is_known(&self) -> bool {
        lookup(&self.category).is_some()
    }
}

/// Case-insensitive color table lookup; unmatched categories get the alert color
pub fn color_for(category: &str) -> Color {
    lookup(category).unwrap_or(ALERT_COLOR)
}

fn lookup(category: &str) -> Option<Color> {
    let category = category.trim();
    COLOR_TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(category))
        .map(|(_, color)| *color)
}

fn normalize(category: &str) -> String<MAX_CATEGORY_LEN> {
    let mut out = String::new();
    'chars: for c in category.chars() {
        for lower in c.to_lowercase() {
            if out.push(lower).is_err() {
                break 'chars;
            }
        }
    }
    out
}

fn unknown() -> String<MAX_CATEGORY_LEN> {
    let mut s = String::new();
    let _ = s.push_str(UNKNOWN_CATEGORY);
    s
}

fn push_truncated<const N: usize>(out: &mut String<N>, s: &str) {
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
}
