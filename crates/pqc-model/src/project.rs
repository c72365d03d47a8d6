//! Project identifiers derived from sample file names.
//!
//! Sample files follow `<instrument>_<yyyymmdd>_<tag>_<rest...>`. The first
//! three underscore-separated tokens form the project id. Samples of the same
//! project are often acquired over several days, so the patterns wildcard the
//! last two digits of the date code:
//!
//! | sample                           | id                    | regex                         | SQL `LIKE`             |
//! |----------------------------------|-----------------------|-------------------------------|------------------------|
//! | `Astral_20250716_XYZ_HSdia_01`   | `Astral_20250716_XYZ` | `Astral_202507[0-9]{2}_XYZ`   | `Astral_202507__XYZ%`  |

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{ModelError, Result};

static STANDARD_SAMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("HSstd|[Ss]tandar[dt]").expect("standard sample regex"));

/// Returns true for QC standard injections, which never form a project.
pub fn is_standard_sample(name: &str) -> bool {
    STANDARD_SAMPLE.is_match(name)
}

/// Canonical project identifier plus its fuzzy date patterns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct ProjectId {
    id: String,
    regex_pattern: String,
    sql_pattern: String,
    date_code: Option<String>,
}

impl ProjectId {
    /// Derives the project id from a sample name or file name.
    ///
    /// Directory components and the last extension are ignored, so
    /// `/data/Astral_20250716_XYZ_HS_01.raw` and `Astral_20250716_XYZ_HS_01`
    /// yield the same id. Names with fewer than three tokens use the whole
    /// stem as the id.
    pub fn from_sample_name(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        let stem = Path::new(trimmed)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("");
        if stem.is_empty() {
            return Err(ModelError::EmptySampleName);
        }

        let tokens: Vec<&str> = stem.split('_').collect();
        if tokens.len() < 3 {
            return Ok(Self {
                id: stem.to_string(),
                regex_pattern: stem.to_string(),
                sql_pattern: format!("{stem}%"),
                date_code: None,
            });
        }

        let (instrument, date_code, tag) = (tokens[0], tokens[1], tokens[2]);
        let id = format!("{instrument}_{date_code}_{tag}");
        let (regex_pattern, sql_pattern) = match strip_day_digits(date_code) {
            Some(month) => (
                format!("{instrument}_{month}[0-9]{{2}}_{tag}"),
                format!("{instrument}_{month}__{tag}%"),
            ),
            None => (id.clone(), format!("{id}%")),
        };

        Ok(Self {
            id,
            regex_pattern,
            sql_pattern,
            date_code: Some(date_code.to_string()),
        })
    }

    /// The literal project id, e.g. `Astral_20250716_XYZ`.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Regex flavor of the fuzzy pattern, e.g. `Astral_202507[0-9]{2}_XYZ`.
    pub fn regex_pattern(&self) -> &str {
        &self.regex_pattern
    }

    /// SQL `LIKE` flavor of the fuzzy pattern, e.g. `Astral_202507__XYZ%`.
    pub fn sql_pattern(&self) -> &str {
        &self.sql_pattern
    }

    /// Date token of the id, when the name had one.
    pub fn date_code(&self) -> Option<&str> {
        self.date_code.as_deref()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<ProjectId> for String {
    fn from(value: ProjectId) -> Self {
        value.id
    }
}

/// Returns the date code without its last two characters when both are digits.
fn strip_day_digits(date_code: &str) -> Option<&str> {
    let bytes = date_code.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let tail = &bytes[bytes.len() - 2..];
    if tail.iter().all(u8::is_ascii_digit) {
        Some(&date_code[..date_code.len() - 2])
    } else {
        None
    }
}
