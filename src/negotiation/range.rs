//! Client range dialect.
//!
//! Clients declare ranges the way npm does: `^v1.0.0`, `1.x`,
//! `>=1.2.0 <2.0.0`, `1.0.0 - 2.0.0`, `1.x || 3.x`. `semver::VersionReq`
//! speaks Cargo's dialect instead (comma-separated comparators, a bare
//! version means caret, no `||`), so ranges are translated here before they
//! reach the `semver` crate.
//!
//! # Translation
//! - `||` splits alternatives; any alternative may match
//! - whitespace splits comparators inside an alternative (AND)
//! - `a - b` becomes `>=a, <=b`
//! - a bare version means exact match (`=`)
//! - `x`, `X` and `*` components truncate the version (`1.x` → `=1`)
//! - a version may carry one leading `=` and then one lowercase `v`
//! - a fully wildcard alternative (`*`, `x`, empty) matches any release but
//!   no prerelease, as `VersionReq::STAR` does

use semver::{Version, VersionReq};

/// Operators understood in client ranges, longest first.
const OPERATORS: [&str; 9] = ["<=", ">=", "~>", "<", ">", "=", "^", "~", ""];

/// Error raised while translating a client range.
#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    #[error("invalid comparator `{0}`")]
    InvalidComparator(String),

    #[error("operator `{0}` is missing a version")]
    DanglingOperator(String),

    #[error(transparent)]
    Semver(#[from] semver::Error),
}

/// A client range, parsed into `semver` requirements.
#[derive(Debug, Clone)]
pub struct ClientRange {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone)]
enum Alternative {
    Any,
    Never,
    Req(VersionReq),
}

/// One translated comparator.
#[derive(Debug, PartialEq, Eq)]
enum Term {
    Any,
    Never,
    Comparator(String),
}

impl ClientRange {
    /// Parse a client range.
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let alternatives = input
            .split("||")
            .map(parse_alternative)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    /// Returns true if `version` satisfies any alternative.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|alternative| match alternative {
            Alternative::Any => version.pre.is_empty(),
            Alternative::Never => false,
            Alternative::Req(req) => req.matches(version),
        })
    }
}

/// Parse a concrete version, tolerating a leading `=` and `v`.
pub fn parse_version(input: &str) -> Result<Version, semver::Error> {
    Version::parse(strip_prefix(input.trim()))
}

fn parse_alternative(input: &str) -> Result<Alternative, RangeError> {
    let input = input.trim();

    if let Some((low, high)) = input.split_once(" - ") {
        let low = translate(">=", strip_prefix(low.trim()))?;
        let high = translate("<=", strip_prefix(high.trim()))?;
        return combine(vec![low, high]);
    }

    let mut terms = Vec::new();
    let mut pending: Option<&str> = None;

    for token in input.split_whitespace() {
        let (op, version) = split_operator(token);
        let op = match (pending.take(), op) {
            (Some(held), "") => held,
            (Some(held), _) => return Err(RangeError::DanglingOperator(held.to_string())),
            (None, op) => op,
        };

        // `>= 1.2.3`: the operator arrives as its own token
        if version.is_empty() && !op.is_empty() {
            pending = Some(op);
            continue;
        }

        // an `=` already taken as (part of) the operator is not stripped twice
        let version = if op.ends_with('=') {
            strip_v(version)
        } else {
            strip_prefix(version)
        };
        terms.push(translate(op, version)?);
    }

    if let Some(held) = pending {
        return Err(RangeError::DanglingOperator(held.to_string()));
    }

    combine(terms)
}

fn split_operator(token: &str) -> (&str, &str) {
    for op in OPERATORS {
        if let Some(rest) = token.strip_prefix(op) {
            return (op, rest);
        }
    }
    ("", token)
}

fn strip_prefix(version: &str) -> &str {
    strip_v(version.strip_prefix('=').unwrap_or(version))
}

fn strip_v(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "x" | "X" | "*")
}

/// Translate one comparator whose version prefix is already stripped.
fn translate(op: &str, version: &str) -> Result<Term, RangeError> {
    let invalid = || RangeError::InvalidComparator(format!("{op}{version}"));

    let (core, suffix) = match version.find(['-', '+']) {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    };

    let components: Vec<&str> = core.split('.').collect();
    if components.len() > 3 {
        return Err(invalid());
    }

    let mut numeric = Vec::with_capacity(components.len());
    for part in &components {
        if part.is_empty() && components.len() == 1 {
            // empty alternative, e.g. `1.0.0 ||`
            break;
        }
        if is_wildcard(part) {
            break;
        }
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        numeric.push(*part);
    }

    let truncated = numeric.len() < components.len();
    if truncated && !suffix.is_empty() {
        return Err(invalid());
    }

    if numeric.is_empty() {
        return Ok(match op {
            "<" | ">" => Term::Never,
            _ => Term::Any,
        });
    }

    let op = match op {
        "" => "=",
        "~>" => "~",
        other => other,
    };

    Ok(Term::Comparator(format!("{op}{}{suffix}", numeric.join("."))))
}

fn combine(terms: Vec<Term>) -> Result<Alternative, RangeError> {
    if terms.iter().any(|term| *term == Term::Never) {
        return Ok(Alternative::Never);
    }

    let comparators: Vec<String> = terms
        .into_iter()
        .filter_map(|term| match term {
            Term::Comparator(c) => Some(c),
            _ => None,
        })
        .collect();

    if comparators.is_empty() {
        return Ok(Alternative::Any);
    }

    let req = VersionReq::parse(&comparators.join(", "))?;
    Ok(Alternative::Req(req))
}
