//! Topic matching.

use std::fmt;

/// An event that knows which topic it is published on.
pub trait Topic {
    /// Topic string, e.g. `"cart:changed"`.
    fn topic(&self) -> &str;
}

/// What a subscription listens to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicPattern {
    /// Exactly one topic.
    Exact(String),
    /// Every topic starting with the prefix (`"cart:*"`).
    Prefix(String),
    /// Every topic (`"*"`).
    Any,
}

impl TopicPattern {
    /// Parse a pattern string.
    ///
    /// `"*"` matches everything, a trailing `*` matches by prefix, anything
    /// else is an exact topic.
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" {
            Self::Any
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            Self::Prefix(prefix.to_string())
        } else {
            Self::Exact(pattern.to_string())
        }
    }

    /// Check if a topic matches this pattern.
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            Self::Exact(t) => t == topic,
            Self::Prefix(p) => topic.starts_with(p.as_str()),
            Self::Any => true,
        }
    }
}

impl From<&str> for TopicPattern {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for TopicPattern {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for TopicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(t) => write!(f, "{}", t),
            Self::Prefix(p) => write!(f, "{}*", p),
            Self::Any => write!(f, "*"),
        }
    }
}
