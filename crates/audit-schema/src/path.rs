//! Key paths for addressing field values
//!
//! A path such as `opportunities[2].estimatedSavings.unit` names one leaf in
//! a section. Record indices are positional: after a removal the caller
//! rebuilds paths for the shifted records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One step of a key path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Named object key
    Key(String),
    /// Position inside a list
    Index(usize),
}

/// Stable address of a field value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Path starting at `key`; dots split nested keys
    #[must_use]
    pub fn root(key: &str) -> Self {
        Self::default().key(key)
    }

    /// Append a (possibly dotted) key
    #[must_use]
    pub fn key(mut self, key: &str) -> Self {
        self.segments.extend(
            key.split('.')
                .filter(|s| !s.is_empty())
                .map(|s| Segment::Key(s.to_string())),
        );
        self
    }

    /// Append a list index
    #[inline]
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    /// All segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First list index on the path, if any
    #[must_use]
    pub fn record_index(&self) -> Option<usize> {
        self.segments.iter().find_map(|s| match s {
            Segment::Index(i) => Some(*i),
            Segment::Key(_) => None,
        })
    }

    /// Dotted key below the last list index (the record-local field key)
    #[must_use]
    pub fn leaf_key(&self) -> String {
        let start = self
            .segments
            .iter()
            .rposition(|s| matches!(s, Segment::Index(_)))
            .map_or(0, |i| i + 1);
        self.segments[start..]
            .iter()
            .filter_map(|s| match s {
                Segment::Key(k) => Some(k.as_str()),
                Segment::Index(_) => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(k) if i == 0 => f.write_str(k)?,
                Segment::Key(k) => write!(f, ".{k}")?,
                Segment::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}

/// Key path parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty input
    #[error("empty key path")]
    Empty,

    /// Two separators in a row, or a leading/trailing separator
    #[error("empty segment in key path '{0}'")]
    EmptySegment(String),

    /// Malformed `[n]` index
    #[error("invalid index in key path '{0}'")]
    InvalidIndex(String),
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for part in s.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(pos) => part.split_at(pos),
                None => (part, ""),
            };
            if name.is_empty() {
                return Err(PathError::EmptySegment(s.to_string()));
            }
            segments.push(Segment::Key(name.to_string()));

            while !rest.is_empty() {
                let close = rest
                    .find(']')
                    .ok_or_else(|| PathError::InvalidIndex(s.to_string()))?;
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| PathError::InvalidIndex(s.to_string()))?;
                segments.push(Segment::Index(index));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(PathError::InvalidIndex(s.to_string()));
                }
            }
        }

        Ok(Self { segments })
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
