//! Typed cell values.

use std::borrow::Cow;
use std::fmt;

/// A single value read from a database or derived by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for `Null` and for NaN reals.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Real(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the cell; text is parsed, `Null` and NaN are `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) if v.is_nan() => None,
            Self::Real(v) => Some(*v),
            Self::Text(s) => parse_number(s),
        }
    }

    /// Text view of the cell, `None` unless it is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the cell as a CSV field.
    ///
    /// Missing values render empty; reals use the shortest representation
    /// that parses back to the same value.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Integer(v) => Cow::Owned(v.to_string()),
            Self::Real(v) if v.is_nan() => Cow::Borrowed(""),
            Self::Real(v) => Cow::Owned(v.to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Parses a string as `f64`, returning `None` for empty, invalid, or NaN input.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}
