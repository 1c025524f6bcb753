//! npm version range parsing and matching.
//!
//! npm ranges are compiled into a disjunction of [`semver::VersionReq`], one
//! per `||` alternative. Within an alternative, comparators are separated by
//! whitespace (npm) and joined with commas (semver crate). The semver crate
//! supplies comparator semantics and the pre-release rule: a pre-release
//! version only matches when a comparator in the same set names the same
//! `major.minor.patch` with a pre-release tag.
//!
//! Accepted forms:
//! - `^1.2.3`, `~1.2`, `>=1.0.0 <2.0.0`, `=1.2.3`, `>= 1.2.3`
//! - bare versions: `1.2.3` is exact, `1.2` means `1.2.x`
//! - x-ranges: `*`, `x`, `1.x`, `1.2.*`, the empty string, `latest`
//! - hyphen ranges: `1.2.3 - 2.3` (`<=2.3` keeps every `2.3.x`)
//! - `||` alternatives and a leading `v` on versions

use std::fmt;

use semver::{Version, VersionReq};
use thiserror::Error;

/// A range that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RangeError {
    pub message: String,
}

impl RangeError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A compiled npm range.
#[derive(Debug, Clone)]
pub struct NpmRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

const OPERATORS: &[&str] = &["", "=", "<", "<=", ">", ">=", "^", "~", "~>"];

/// A comparator no version satisfies; `<*` and `>*` compile to it.
const NOTHING: &str = "<0.0.0-0";

impl NpmRange {
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let alternatives = input
            .split("||")
            .map(parse_set)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: input.to_string(),
            alternatives,
        })
    }

    /// Whether `version` satisfies any alternative.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// The range as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for NpmRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse a published version string, tolerating a leading `v` or `=`.
pub fn parse_version(s: &str) -> Option<Version> {
    let s = s.trim();
    let s = s.strip_prefix('=').unwrap_or(s);
    let s = s
        .strip_prefix('v')
        .or_else(|| s.strip_prefix('V'))
        .unwrap_or(s);
    Version::parse(s).ok()
}

/// Compile one whitespace-separated comparator set.
fn parse_set(set: &str) -> Result<VersionReq, RangeError> {
    let tokens: Vec<&str> = set.split_whitespace().collect();

    let comparators = match tokens.as_slice() {
        [] | ["latest"] => Vec::new(),
        [low, "-", high] => hyphen(low, high)?,
        _ => merge_operators(&tokens)?
            .iter()
            .map(|t| comparator(t))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect(),
    };

    if comparators.is_empty() {
        return Ok(VersionReq::STAR);
    }
    let joined = comparators.join(", ");
    VersionReq::parse(&joined).map_err(|e| RangeError::new(e.to_string()))
}

/// Glue a bare operator token (`>=`) onto the version that follows it.
fn merge_operators(tokens: &[&str]) -> Result<Vec<String>, RangeError> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut pending: Option<&str> = None;
    for token in tokens {
        let is_operator = !token.is_empty() && token.chars().all(|c| "<>=^~".contains(c));
        match pending.take() {
            Some(op) if is_operator => {
                return Err(RangeError::new(format!(
                    "operator '{op}' followed by operator '{token}'"
                )));
            }
            Some(op) => merged.push(format!("{op}{token}")),
            None if is_operator => pending = Some(token),
            None => merged.push(token.to_string()),
        }
    }
    if let Some(op) = pending {
        return Err(RangeError::new(format!("missing version after '{op}'")));
    }
    Ok(merged)
}

/// A version with wildcard components removed.
struct Partial {
    /// Numeric components up to the first wildcard, e.g. `["1", "2"]` for `1.2.x`.
    parts: Vec<String>,
    /// Pre-release and build suffix, kept only for fully specified versions.
    pre: Option<String>,
}

impl Partial {
    fn parse(text: &str) -> Self {
        let text = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);
        let (core, rest) = match text.find(|c| c == '-' || c == '+') {
            Some(i) => (&text[..i], Some(&text[i..])),
            None => (text, None),
        };
        let mut parts = Vec::new();
        let mut wildcard = false;
        for part in core.split('.') {
            if matches!(part, "x" | "X" | "*") {
                wildcard = true;
                break;
            }
            parts.push(part.to_string());
        }
        // Build metadata never affects matching.
        let pre = rest
            .filter(|_| !wildcard && parts.len() == 3)
            .and_then(|r| r.split('+').next())
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self { parts, pre }
    }

    fn is_any(&self) -> bool {
        self.parts.is_empty()
    }

    fn render(&self) -> String {
        let mut out = self.parts.join(".");
        if let Some(ref pre) = self.pre {
            out.push_str(pre);
        }
        out
    }
}

/// Translate one npm comparator. `None` means it places no constraint.
fn comparator(token: &str) -> Result<Option<String>, RangeError> {
    let split = token
        .find(|c: char| !"<>=^~".contains(c))
        .unwrap_or(token.len());
    let (op, rest) = token.split_at(split);
    if !OPERATORS.contains(&op) {
        return Err(RangeError::new(format!("unknown operator '{op}' in '{token}'")));
    }
    let op = match op {
        "" => "=",
        "~>" => "~",
        other => other,
    };

    let partial = Partial::parse(rest);
    if partial.is_any() {
        return Ok(match op {
            // Valid, but nothing sorts below the lowest possible pre-release.
            "<" | ">" => Some(NOTHING.to_string()),
            _ => None,
        });
    }
    Ok(Some(format!("{op}{}", partial.render())))
}

/// `low - high` as a pair of inclusive bounds.
fn hyphen(low: &str, high: &str) -> Result<Vec<String>, RangeError> {
    let mut out = Vec::with_capacity(2);
    let low = Partial::parse(low);
    if !low.is_any() {
        out.push(format!(">={}", low.render()));
    }
    let high = Partial::parse(high);
    if !high.is_any() {
        out.push(format!("<={}", high.render()));
    }
    Ok(out)
}
