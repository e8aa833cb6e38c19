//! Closed vocabularies shared by the column schema and the graph document.
//!
//! Every enumerated value that can appear in a table cell (edge types, node
//! and edge shapes, colors) is parsed here, so the coercer and the document
//! writer agree on spelling.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A cell value that is not part of the expected vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyError {
    value: String,
    expected: String,
}

impl VocabularyError {
    fn new(value: &str, expected: impl Into<String>) -> Self {
        Self {
            value: value.to_owned(),
            expected: expected.into(),
        }
    }

    /// The rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Human-readable description of the accepted values.
    pub fn expected(&self) -> &str {
        &self.expected
    }
}

impl fmt::Display for VocabularyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not {}", self.value, self.expected)
    }
}

impl std::error::Error for VocabularyError {}

/// Parses `value` by exact match against the spelling of each candidate.
pub(crate) fn parse_exact<T: Copy>(
    value: &str,
    all: &[T],
    name: impl Fn(T) -> &'static str,
) -> Result<T, VocabularyError> {
    all.iter().copied().find(|&v| name(v) == value).ok_or_else(|| {
        let names: Vec<&str> = all.iter().map(|&v| name(v)).collect();
        VocabularyError::new(value, format!("one of {}", names.join(", ")))
    })
}

/// Edge directedness, used both as the graph default and per edge.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    #[default]
    Directed,
    Undirected,
    Mutual,
}

impl EdgeType {
    /// Every edge type, in the order error messages list them.
    pub const ALL: [Self; 3] = [Self::Directed, Self::Undirected, Self::Mutual];

    /// The GEXF spelling, as used in `type` and `defaultedgetype`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Directed => "directed",
            Self::Undirected => "undirected",
            Self::Mutual => "mutual",
        }
    }
}

impl FromStr for EdgeType {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_exact(s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shapes a node may be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeShape {
    Disc,
    Square,
    Triangle,
    Diamond,
}

impl NodeShape {
    /// Every variant, in the order error messages list them.
    pub const ALL: [Self; 4] =
        [Self::Disc, Self::Square, Self::Triangle, Self::Diamond];

    /// The `viz:shape` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disc => "disc",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Diamond => "diamond",
        }
    }
}

impl FromStr for NodeShape {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_exact(s, &Self::ALL, Self::as_str)
    }
}

/// Line styles an edge may be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeShape {
    Solid,
    Dotted,
    Dashed,
    Double,
}

impl EdgeShape {
    /// Every variant, in the order error messages list them.
    pub const ALL: [Self; 4] =
        [Self::Solid, Self::Dotted, Self::Dashed, Self::Double];

    /// The `viz:shape` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dotted => "dotted",
            Self::Dashed => "dashed",
            Self::Double => "double",
        }
    }
}

impl FromStr for EdgeShape {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_exact(s, &Self::ALL, Self::as_str)
    }
}

/// An RGB color with optional alpha, written as `rgb(r,g,b)` or
/// `rgba(r,g,b,a)` in table cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`; `None` means fully opaque and is not written.
    pub a: Option<f32>,
}

impl Color {
    /// An opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }
}

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(rgba?)\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*(\d*\.?\d+)\s*)?\)$",
    )
    .expect("color pattern is valid")
});

const COLOR_EXPECTED: &str =
    "a color of the form rgb(r,g,b) or rgba(r,g,b,a)";

impl FromStr for Color {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VocabularyError::new(s, COLOR_EXPECTED);
        let caps = COLOR_RE.captures(s.trim()).ok_or_else(invalid)?;

        let channel = |i: usize| -> Result<u8, VocabularyError> {
            caps[i].parse::<u8>().map_err(|_| invalid())
        };
        let (r, g, b) = (channel(2)?, channel(3)?, channel(4)?);

        let has_alpha_prefix = caps[1].eq_ignore_ascii_case("rgba");
        let a = match (has_alpha_prefix, caps.get(5)) {
            (true, Some(alpha)) => {
                let alpha: f32 =
                    alpha.as_str().parse().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&alpha) {
                    return Err(invalid());
                }
                Some(alpha)
            }
            (false, None) => None,
            _ => return Err(invalid()),
        };

        Ok(Self { r, g, b, a })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.a {
            Some(a) => write!(f, "rgba({},{},{},{a})", self.r, self.g, self.b),
            None => write!(f, "rgb({},{},{})", self.r, self.g, self.b),
        }
    }
}
