//! Typed leaf values held by form fields

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Boolean-like answer rendered as a yes/no radio group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    /// Affirmative
    Yes,
    /// Negative
    No,
}

impl YesNo {
    /// Wire tag (`"yes"` / `"no"`)
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    /// Parse a wire tag
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named leaf value
///
/// Values are stored as the user entered them; the validator decides whether
/// a `Text` value is acceptable for a numeric or enum field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text, or a numeric string as typed
    Text(String),
    /// Already-coerced integer
    Integer(i64),
    /// Enum tag picked from a closed set
    Tag(String),
    /// Yes/no answer
    Flag(YesNo),
}

impl FieldValue {
    /// Empty text, the default for most fields
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Text value
    #[inline]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Enum tag value
    #[inline]
    pub fn tag(s: impl Into<String>) -> Self {
        Self::Tag(s.into())
    }

    /// Whether the value counts as "not filled in"
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::Tag(s) => s.is_empty(),
            Self::Integer(_) | Self::Flag(_) => false,
        }
    }

    /// Textual form used for comparisons and numeric parsing
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) | Self::Tag(s) => Cow::Borrowed(s),
            Self::Integer(n) => Cow::Owned(n.to_string()),
            Self::Flag(f) => Cow::Borrowed(f.as_str()),
        }
    }

    /// JSON form written to the record store
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) | Self::Tag(s) => Value::String(s.clone()),
            Self::Integer(n) => Value::from(*n),
            Self::Flag(f) => Value::String(f.as_str().to_string()),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<YesNo> for FieldValue {
    fn from(f: YesNo) -> Self {
        Self::Flag(f)
    }
}
