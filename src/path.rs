//! Nested path resolution over associative data
//!
//! A path is a sequence of [`PathKey`]s. [`resolve_path`] walks a root node one
//! key at a time and yields a [`Maybe`] for whatever the path ends on. A
//! missing key short-circuits to `Absent`; a key bound to `null` resolves to
//! `Absent` through the final wrap.

use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::fmt;

use crate::error::{MaybeError, Result};
use crate::maybe::{Maybe, Nullable};

/// A single key in a path
///
/// Integer keys and their canonical decimal spelling address the same
/// binding: `Index(0)` finds the `"0"` member of an object and `Name("0")`
/// finds the first element of an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    /// Member name (e.g., "hello", "user")
    Name(String),
    /// Sequence position (e.g., 0, 1)
    Index(usize),
}

impl PathKey {
    /// Create a name key
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create an index key
    pub fn index(index: usize) -> Self {
        Self::Index(index)
    }

    /// Parse a textual key: canonical decimal integers become indexes
    ///
    /// Only the empty string is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(MaybeError::invalid_path_key(text));
        }
        Ok(match canonical_index(text) {
            Some(index) => Self::Index(index),
            None => Self::Name(text.to_string()),
        })
    }

    /// Parse every token of a textual path
    pub fn parse_all<I, S>(tokens: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .map(|token| Self::parse(token.as_ref()))
            .collect()
    }

    /// The position this key addresses in a sequence, if any
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Name(name) => canonical_index(name),
        }
    }

    /// The member name this key addresses in a mapping
    pub fn as_name(&self) -> Cow<'_, str> {
        match self {
            Self::Name(name) => Cow::Borrowed(name),
            Self::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

// "0" and "17" qualify; "017", "+1" and "-1" stay names.
pub(crate) fn canonical_index(text: &str) -> Option<usize> {
    let digits_only = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || (text.len() > 1 && text.starts_with('0')) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Name(name) => write!(f, "{name}"),
            PathKey::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for PathKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PathKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for PathKey {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<u32> for PathKey {
    fn from(index: u32) -> Self {
        Self::Index(index as usize)
    }
}

impl From<i32> for PathKey {
    fn from(index: i32) -> Self {
        Self::from(i64::from(index))
    }
}

impl From<i64> for PathKey {
    fn from(index: i64) -> Self {
        match usize::try_from(index) {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Name(index.to_string()),
        }
    }
}

/// Render a key path for messages: `user.names[0]`
pub fn format_path(keys: &[PathKey]) -> String {
    let mut rendered = String::new();
    for key in keys {
        match key {
            PathKey::Index(_) => rendered.push_str(&key.to_string()),
            PathKey::Name(name) => {
                if !rendered.is_empty() {
                    rendered.push('.');
                }
                rendered.push_str(name);
            }
        }
    }
    rendered
}

/// A node of an associative structure that paths can descend into
pub trait PathNode: Clone + Nullable {
    /// Whether keys can be looked up on this node at all
    fn is_container(&self) -> bool;

    /// The child bound to `key`, or `None` if there is no such binding
    fn child(&self, key: &PathKey) -> Option<&Self>;
}

impl PathNode for JsonValue {
    fn is_container(&self) -> bool {
        matches!(self, JsonValue::Object(_) | JsonValue::Array(_))
    }

    fn child(&self, key: &PathKey) -> Option<&Self> {
        match self {
            JsonValue::Object(entries) => entries.get(key.as_name().as_ref()),
            JsonValue::Array(items) => key.as_index().and_then(|index| items.get(index)),
            _ => None,
        }
    }
}

/// Resolve `keys` against `root`
///
/// - an unbound root (`None`) is `Absent` without any lookup;
/// - a root that is not a container is wrapped as a scalar and the remaining
///   keys are ignored, at the top level and after every descent;
/// - the first key without a binding yields `Absent`;
/// - the value the path ends on is snapshotted and wrapped, so `null` is
///   `Absent`.
pub fn resolve_path<N: PathNode>(root: Option<&N>, keys: &[PathKey]) -> Maybe<N> {
    let Some(mut node) = root else {
        return Maybe::Absent;
    };

    for (depth, key) in keys.iter().enumerate() {
        if !node.is_container() {
            break;
        }
        match node.child(key) {
            Some(child) => node = child,
            None => {
                log::trace!("path key {key} is not bound at depth {depth}");
                return Maybe::Absent;
            }
        }
    }

    Maybe::of(node.clone())
}

/// Resolve a single key against `root`
pub fn resolve_key<N: PathNode>(root: Option<&N>, key: impl Into<PathKey>) -> Maybe<N> {
    resolve_path(root, &[key.into()])
}

/// Resolve a variadic key path: `resolve!(Some(&doc), "hello", 0)`
///
/// Each key goes through `PathKey::from`, so string and integer literals mix
/// freely.
#[macro_export]
macro_rules! resolve {
    ($root:expr $(, $key:expr)* $(,)?) => {
        $crate::resolve_path($root, &[$($crate::PathKey::from($key)),*])
    };
}
