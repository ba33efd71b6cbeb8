//! Ignore and exclude rules for the asset scanner.
//!
//! Two independent rule lists are held, each tested in registration order:
//!
//! - **exclude**: the path and everything beneath it are skipped; the scanner
//!   never descends into an excluded directory.
//! - **ignore**: only the path's own manifest entry is suppressed. An ignored
//!   directory is still walked and its contents are manifested.
//!
//! Matching is anchored at both ends: a rule applies only when its match,
//! starting at the first byte of the scan-relative path, ends at the last byte.
//! A rule that matches just a prefix (`sub` against `sub/file`) does not apply.
//!
//! Rules can also be loaded from a pattern file, one rule per line:
//!
//! ```text
//! # comment
//! exclude (.*/)?\.svn
//! ignore  .*\.bak
//! ```

use crate::error::{BuildError, PatternError};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;

/// Which list a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Ignore,
    Exclude,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Ignore => "ignore",
            RuleKind::Exclude => "exclude",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    regex: Regex,
}

impl Rule {
    fn compile(kind: RuleKind, pattern: &str) -> Result<Self, PatternError> {
        // Only the start is anchored in the regex; the end is checked on the match span.
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| PatternError {
            kind,
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    fn covers(&self, path: &str) -> bool {
        self.regex
            .find(path)
            .map(|m| m.start() == 0 && m.end() == path.len())
            .unwrap_or(false)
    }
}

/// Result of testing one path against a [`PatternSet`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternMatch {
    pub ignored: bool,
    pub excluded: bool,
}

/// Compiled ignore/exclude rules. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    ignore: Vec<Rule>,
    exclude: Vec<Rule>,
}

impl PatternSet {
    /// A set with no rules; every path is kept.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile both rule lists. Fails on the first unparsable pattern.
    pub fn new<E, I, S, T>(exclude: E, ignore: I) -> Result<Self, PatternError>
    where
        E: IntoIterator<Item = S>,
        I: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut set = Self::empty();
        for pattern in exclude {
            set.add(RuleKind::Exclude, pattern.as_ref())?;
        }
        for pattern in ignore {
            set.add(RuleKind::Ignore, pattern.as_ref())?;
        }
        Ok(set)
    }

    /// Append a rule to the end of its list
    pub fn add(&mut self, kind: RuleKind, pattern: &str) -> Result<(), PatternError> {
        let rule = Rule::compile(kind, pattern)?;
        match kind {
            RuleKind::Ignore => self.ignore.push(rule),
            RuleKind::Exclude => self.exclude.push(rule),
        }
        Ok(())
    }

    /// Exclude exactly one literal relative path
    pub fn exclude_literal(&mut self, relative_path: &str) -> Result<(), PatternError> {
        self.add(RuleKind::Exclude, &regex::escape(relative_path))
    }

    /// Test a scan-relative, `/`-separated path against both lists
    pub fn matches(&self, relative_path: &str) -> PatternMatch {
        PatternMatch {
            ignored: self.ignore.iter().any(|r| r.covers(relative_path)),
            excluded: self.exclude.iter().any(|r| r.covers(relative_path)),
        }
    }

    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.matches(relative_path).excluded
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.matches(relative_path).ignored
    }

    /// Exclude patterns in registration order, as written
    pub fn exclude_patterns(&self) -> impl Iterator<Item = &str> {
        self.exclude.iter().map(|r| r.pattern.as_str())
    }

    /// Ignore patterns in registration order, as written
    pub fn ignore_patterns(&self) -> impl Iterator<Item = &str> {
        self.ignore.iter().map(|r| r.pattern.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.ignore.is_empty() && self.exclude.is_empty()
    }
}

/// Parse pattern file contents into `(kind, pattern)` pairs.
///
/// Patterns are not compiled here; feed the result to [`PatternSet::add`].
pub fn parse_pattern_file(contents: &str) -> Result<Vec<(RuleKind, String)>, BuildError> {
    let mut rules = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, pattern) = line
            .split_once(char::is_whitespace)
            .map(|(k, p)| (k, p.trim()))
            .unwrap_or((line, ""));
        let kind = match keyword {
            "exclude" => RuleKind::Exclude,
            "ignore" => RuleKind::Ignore,
            other => {
                return Err(BuildError::ConfigError(format!(
                    "Pattern file line {}: unknown rule kind '{}' (expected 'exclude' or 'ignore')",
                    index + 1,
                    other
                )))
            }
        };
        if pattern.is_empty() {
            return Err(BuildError::ConfigError(format!(
                "Pattern file line {}: missing pattern after '{}'",
                index + 1,
                keyword
            )));
        }
        rules.push((kind, pattern.to_string()));
    }
    Ok(rules)
}

/// Read and parse a pattern file from disk
pub fn load_pattern_file(path: &Path) -> Result<Vec<(RuleKind, String)>, BuildError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        BuildError::ConfigError(format!(
            "Failed to read pattern file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_pattern_file(&contents)
}
