//! Query keys and cache entry descriptions.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One primitive segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySegment {
    /// Boolean segment.
    Bool(bool),
    /// Integer segment.
    Int(i64),
    /// String segment.
    Str(String),
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for KeySegment {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for KeySegment {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i64> for KeySegment {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for KeySegment {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for KeySegment {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Ordered identifier of a cached asynchronous result.
///
/// Two equal keys always address the same cache entry, which is what lets
/// concurrent identical requests share a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    /// Build a key from its segments.
    pub fn from_segments(segments: Vec<KeySegment>) -> Self {
        Self(segments)
    }

    /// Append a segment, returning the extended key.
    #[must_use]
    pub fn with(mut self, segment: impl Into<KeySegment>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// The key's segments in order.
    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    /// Whether `prefix` matches the leading segments of this key.
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{segment}")?;
        }
        f.write_str("]")
    }
}

impl<S: Into<KeySegment>> FromIterator<S> for QueryKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Build a [`QueryKey`] from a list of segments.
///
/// ```
/// use mfe_shell::query_key;
/// let key = query_key!["github", "commits", "facebook", "react"];
/// assert_eq!(key.to_string(), r#"["github","commits","facebook","react"]"#);
/// ```
#[macro_export]
macro_rules! query_key {
    ($($segment:expr),* $(,)?) => {
        $crate::domain::models::QueryKey::from_segments(vec![
            $($crate::domain::models::KeySegment::from($segment)),*
        ])
    };
}

/// Lifecycle status of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// No result yet; the first fetch is running.
    Pending,
    /// The last fetch (or `set`) produced a value.
    Success,
    /// The last fetch failed.
    Error,
}

impl QueryStatus {
    /// Lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-query options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Freshness window; `None` uses the client's default.
    pub stale_time: Option<Duration>,
}

impl QueryOptions {
    /// Options with an explicit freshness window.
    pub const fn stale_time(stale_time: Duration) -> Self {
        Self {
            stale_time: Some(stale_time),
        }
    }
}

/// Diagnostic view of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySnapshot {
    /// Key of the entry.
    pub key: QueryKey,
    /// Outcome of the last fetch.
    pub status: QueryStatus,
    /// Time of the last successful fetch.
    pub last_updated_at: Option<DateTime<Utc>>,
    /// Whether the next fetch runs the producer.
    pub is_stale: bool,
    /// Whether a producer is running.
    pub is_fetching: bool,
    /// Message of the last failure while the entry is in the error state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
