//! Handshake header set and `"Name: Value"` line parsing.
//!
//! Headers are supplied on the command line as repeated `-H "Name: Value"`
//! arguments.  Each line is split on its **first** colon, so values may
//! themselves contain colons (e.g. `Authorization: Basic a:b` or a URL).
//!
//! # Ordering and duplicates
//!
//! [`HeaderSet`] is an ordered multimap.  Two lines with the same name become
//! two separate entries, in the order given; nothing is merged or replaced.
//! This mirrors how HTTP allows a header field to repeat in a request.

use crate::domain::config::ConfigError;

/// Ordered collection of `(name, value)` pairs attached to the handshake.
///
/// Built once before connecting and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every line with [`HeaderSet::parse_line`] and collects the
    /// results in input order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::MalformedHeader`] encountered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wsrelay_core::HeaderSet;
    ///
    /// let set = HeaderSet::from_lines(["X-Token: abc", "X-Token: def"]).unwrap();
    /// assert_eq!(set.get_all("x-token"), vec!["abc", "def"]);
    /// ```
    pub fn from_lines<I, S>(lines: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for line in lines {
            let (name, value) = Self::parse_line(line.as_ref())?;
            set.push(name, value);
        }
        Ok(set)
    }

    /// Splits a single `"Name: Value"` line on its first colon and trims
    /// surrounding whitespace from both halves.
    ///
    /// An empty value is accepted (`"X-Empty:"`); an empty name is not.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedHeader`] when the line has no colon or
    /// the name part is blank.
    pub fn parse_line(line: &str) -> Result<(String, String), ConfigError> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ConfigError::MalformedHeader(line.to_string()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::MalformedHeader(line.to_string()));
        }

        Ok((name.to_string(), value.trim().to_string()))
    }

    /// Appends an entry, keeping any earlier entry with the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns every value recorded for `name`, compared case-insensitively
    /// as HTTP header names are.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
