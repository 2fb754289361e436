//! Filter engine: decides whether a candidate is visible for a query.
//!
//! A [`Matcher`] is compiled once per refilter pass from the query text and
//! the configured [`MatchMode`], then applied to every candidate. It holds no
//! mutable state, so a single matcher can be shared across threads.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use caseless::Caseless;
use serde::{Deserialize, Serialize};

use crate::MenuError;

/// Matching strategy, chosen at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Query must occur as a contiguous substring of the candidate.
    #[default]
    Substring,
    /// Shell-style pattern (`*`, `?`, `[...]`) matched against the whole candidate.
    Glob,
    /// Regular expression searched anywhere in the candidate.
    Regex,
}

impl FromStr for MatchMode {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" | "substr" => Ok(MatchMode::Substring),
            "glob" => Ok(MatchMode::Glob),
            "regex" | "re" => Ok(MatchMode::Regex),
            _ => Err(MenuError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchMode::Substring => "substring",
            MatchMode::Glob => "glob",
            MatchMode::Regex => "regex",
        })
    }
}

/// First matched region of a candidate, in Unicode code points of the
/// original (unfolded) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub len: usize,
}

/// Locale-independent full Unicode case fold (`ß` becomes `ss`, `ﬁ`
/// becomes `fi`, both sigmas become `σ`).
pub fn fold_case(s: &str) -> String {
    s.chars().default_case_fold().collect()
}

fn fold_char(c: char) -> impl Iterator<Item = char> {
    std::iter::once(c).default_case_fold()
}

fn fold_if(s: &str, fold: bool) -> Cow<'_, str> {
    if fold {
        Cow::Owned(fold_case(s))
    } else {
        Cow::Borrowed(s)
    }
}

/// Folded text that remembers which original char produced each folded char.
struct IndexedText {
    text: String,
    // (byte offset in `text`, index of the original char)
    origins: Vec<(usize, usize)>,
}

impl IndexedText {
    fn new(s: &str, fold: bool) -> Self {
        let mut text = String::with_capacity(s.len());
        let mut origins = Vec::with_capacity(s.len());
        for (index, c) in s.chars().enumerate() {
            if fold {
                for l in fold_char(c) {
                    origins.push((text.len(), index));
                    text.push(l);
                }
            } else {
                origins.push((text.len(), index));
                text.push(c);
            }
        }
        Self { text, origins }
    }

    /// Map a non-empty byte range of the folded text back to original chars.
    fn span(&self, byte_start: usize, byte_len: usize) -> MatchSpan {
        let first = self.origins.partition_point(|&(b, _)| b < byte_start);
        let last = self
            .origins
            .partition_point(|&(b, _)| b < byte_start + byte_len)
            .saturating_sub(1)
            .max(first);
        let start = self.origins[first].1;
        let stop = self.origins[last].1 + 1;
        MatchSpan {
            start,
            len: stop - start,
        }
    }
}

const GLOB_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    // folding is done up front so non-ASCII letters compare correctly
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
enum Compiled {
    Everything,
    Substring(String),
    Exact(String),
    Glob(glob::Pattern),
    Regex(regex::Regex),
}

/// A query compiled for one matching strategy.
#[derive(Debug, Clone)]
pub struct Matcher {
    query: String,
    mode: MatchMode,
    case_sensitive: bool,
    compiled: Compiled,
}

impl Matcher {
    pub fn new(mode: MatchMode, case_sensitive: bool, query: &str) -> Self {
        let fold = !case_sensitive;
        let compiled = if query.is_empty() {
            Compiled::Everything
        } else {
            match mode {
                MatchMode::Substring => Compiled::Substring(fold_if(query, fold).into_owned()),
                MatchMode::Glob => compile_glob(fold_if(query, fold).into_owned()),
                MatchMode::Regex => compile_regex(query, case_sensitive),
            }
        };
        Self {
            query: query.to_string(),
            mode,
            case_sensitive,
            compiled,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// True when the query is empty and every candidate is visible.
    pub fn matches_everything(&self) -> bool {
        matches!(self.compiled, Compiled::Everything)
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        let fold = !self.case_sensitive;
        match &self.compiled {
            Compiled::Everything => true,
            Compiled::Substring(needle) => fold_if(candidate, fold).contains(needle.as_str()),
            Compiled::Exact(literal) => fold_if(candidate, fold) == literal.as_str(),
            Compiled::Glob(pattern) => {
                pattern.matches_with(&fold_if(candidate, fold), GLOB_OPTIONS)
            }
            Compiled::Regex(re) => re.is_match(candidate),
        }
    }

    /// First occurrence of the query inside `candidate`. Only substring
    /// matching reports a span; glob and regex rows render plain.
    pub fn highlight(&self, candidate: &str) -> Option<MatchSpan> {
        let Compiled::Substring(needle) = &self.compiled else {
            return None;
        };
        if self.mode != MatchMode::Substring {
            return None;
        }
        let indexed = IndexedText::new(candidate, !self.case_sensitive);
        let at = indexed.text.find(needle.as_str())?;
        Some(indexed.span(at, needle.len()))
    }
}

fn compile_glob(pattern: String) -> Compiled {
    match glob::Pattern::new(&pattern) {
        Ok(p) => Compiled::Glob(p),
        Err(err) => {
            tracing::debug!(%err, pattern = pattern.as_str(), "invalid glob, matching literally");
            Compiled::Exact(pattern)
        }
    }
}

fn compile_regex(query: &str, case_sensitive: bool) -> Compiled {
    match regex::RegexBuilder::new(query)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(re) => Compiled::Regex(re),
        Err(err) => {
            tracing::debug!(%err, query, "invalid regex, matching literally");
            Compiled::Substring(fold_if(query, !case_sensitive).into_owned())
        }
    }
}

/// Default visibility test: case-insensitive substring containment, with the
/// empty query matching everything.
pub fn visible(query: &str, candidate: &str) -> bool {
    Matcher::new(MatchMode::Substring, false, query).is_match(candidate)
}
