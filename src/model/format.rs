//! Semantic format tags attached to spans.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A semantic formatting tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    Plain,
    Math,
    Chemical,
    Bold,
    Italic,
}

impl TextFormat {
    /// Lowercase tag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextFormat::Plain => "plain",
            TextFormat::Math => "math",
            TextFormat::Chemical => "chemical",
            TextFormat::Bold => "bold",
            TextFormat::Italic => "italic",
        }
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of format tags.
pub type FormatSet = BTreeSet<TextFormat>;
