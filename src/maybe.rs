//! The `Maybe` container: a value that is either present or absent
//!
//! [`Maybe`] differs from [`std::option::Option`] in one respect that matters
//! for loosely-typed data: construction goes through [`Maybe::wrap`], which
//! folds every null-equivalent (a JSON `null`, a nested `None`, a nested
//! `Absent`) into [`Maybe::Absent`]. A `Present` value is therefore always a
//! real value, even when it is falsy (`0`, `false`, `""`, `[]`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::borrow::{Borrow, Cow};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{MaybeError, Result};

/// Classification of payload values
///
/// `is_null` reports whether a value is the null-equivalent of its type and
/// must collapse to [`Maybe::Absent`]. `has_length` reports whether a present
/// value is non-empty; only empty text, empty sequences and empty mappings
/// answer `false`.
///
/// Both methods have defaults, so a plain domain type opts in with an empty
/// impl:
///
/// ```
/// use maybe_path::{Maybe, Nullable};
///
/// struct Course;
/// impl Nullable for Course {}
///
/// assert!(Maybe::of(Course).is_defined());
/// ```
pub trait Nullable {
    /// Whether this value is the null-equivalent
    fn is_null(&self) -> bool {
        false
    }

    /// Whether this value is non-empty text, a non-empty collection, or not a
    /// collection at all
    fn has_length(&self) -> bool {
        true
    }
}

macro_rules! impl_never_null {
    ($($ty:ty),* $(,)?) => {
        $(impl Nullable for $ty {})*
    };
}

impl_never_null!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
);

macro_rules! impl_sized_collection {
    ($([$($generics:tt)*] $ty:ty),* $(,)?) => {
        $(impl<$($generics)*> Nullable for $ty {
            fn has_length(&self) -> bool {
                !self.is_empty()
            }
        })*
    };
}

impl_sized_collection!(
    [] str,
    [] String,
    [T] [T],
    [T] Vec<T>,
    [T] VecDeque<T>,
    [T, S] HashSet<T, S>,
    [T] BTreeSet<T>,
    [K, V, S] HashMap<K, V, S>,
    [K, V] BTreeMap<K, V>,
    [] serde_json::Map<String, JsonValue>,
);

impl<T: Nullable + ?Sized> Nullable for &T {
    fn is_null(&self) -> bool {
        (**self).is_null()
    }

    fn has_length(&self) -> bool {
        (**self).has_length()
    }
}

macro_rules! impl_delegating_pointer {
    ($($ptr:ident),* $(,)?) => {
        $(impl<T: Nullable + ?Sized> Nullable for $ptr<T> {
            fn is_null(&self) -> bool {
                (**self).is_null()
            }

            fn has_length(&self) -> bool {
                (**self).has_length()
            }
        })*
    };
}

impl_delegating_pointer!(Box, Rc, Arc);

impl Nullable for Cow<'_, str> {
    fn has_length(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Nullable> Nullable for Option<T> {
    fn is_null(&self) -> bool {
        match self {
            Some(value) => value.is_null(),
            None => true,
        }
    }

    fn has_length(&self) -> bool {
        self.as_ref().is_some_and(|value| value.has_length())
    }
}

impl<T: Nullable> Nullable for Maybe<T> {
    fn is_null(&self) -> bool {
        match self {
            Maybe::Present(value) => value.is_null(),
            Maybe::Absent => true,
        }
    }

    fn has_length(&self) -> bool {
        Maybe::has_length(self)
    }
}

impl Nullable for JsonValue {
    fn is_null(&self) -> bool {
        self.is_null()
    }

    fn has_length(&self) -> bool {
        match self {
            JsonValue::Null => false,
            JsonValue::String(text) => !text.is_empty(),
            JsonValue::Array(items) => !items.is_empty(),
            JsonValue::Object(entries) => !entries.is_empty(),
            JsonValue::Bool(_) | JsonValue::Number(_) => true,
        }
    }
}

/// A value that may be absent
///
/// Build values with [`Maybe::wrap`] or [`Maybe::of`] so that null-equivalents
/// collapse to `Absent`. `Present` is public for pattern matching; a
/// hand-built `Present(JsonValue::Null)` reports `is_defined() == true`.
/// Pass such values through [`Maybe::normalize`] when their origin is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Maybe<T> {
    /// No value
    Absent,
    /// A captured value
    ///
    /// Constructing this variant directly skips the null check done by
    /// [`Maybe::of`].
    Present(T),
}

impl<T> Maybe<T> {
    /// Create an absent value
    pub fn absent() -> Self {
        Self::Absent
    }

    /// Wrap a candidate that may be unbound (`None`) or null-equivalent
    pub fn wrap(candidate: Option<T>) -> Self
    where
        T: Nullable,
    {
        match candidate {
            Some(value) if !value.is_null() => Self::Present(value),
            _ => Self::Absent,
        }
    }

    /// Wrap a bound candidate, collapsing it to `Absent` if it is null-equivalent
    pub fn of(value: T) -> Self
    where
        T: Nullable,
    {
        Self::wrap(Some(value))
    }

    /// Collapse a null-equivalent payload to `Absent`
    ///
    /// Restores the `wrap` invariant for values built from the `Present`
    /// variant directly.
    pub fn normalize(self) -> Self
    where
        T: Nullable,
    {
        match self {
            Self::Present(value) => Self::of(value),
            Self::Absent => Self::Absent,
        }
    }

    /// `true` for `Absent`
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Present(_) => false,
        }
    }

    /// `true` for `Present`
    pub fn is_defined(&self) -> bool {
        !self.is_empty()
    }

    /// Take the value, failing with [`MaybeError::NoValuePresent`] if absent
    ///
    /// Prefer [`get_or_else`](Self::get_or_else) unless the caller has already
    /// checked [`is_defined`](Self::is_defined).
    pub fn get(self) -> Result<T> {
        match self {
            Self::Present(value) => Ok(value),
            Self::Absent => Err(MaybeError::NoValuePresent),
        }
    }

    /// Borrow the value, failing with [`MaybeError::NoValuePresent`] if absent
    pub fn get_ref(&self) -> Result<&T> {
        match self {
            Self::Present(value) => Ok(value),
            Self::Absent => Err(MaybeError::NoValuePresent),
        }
    }

    /// Take the value, or `default` if absent
    pub fn get_or_else(self, default: T) -> T {
        match self {
            Self::Present(value) => value,
            Self::Absent => default,
        }
    }

    /// Take the value, or `T::default()` if absent
    pub fn get_or_default(self) -> T
    where
        T: Default,
    {
        match self {
            Self::Present(value) => value,
            Self::Absent => T::default(),
        }
    }

    /// Adapter for APIs that model absence as `None`
    pub fn get_or_null(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Apply `f` to a present value and re-wrap the result
    ///
    /// `f` is never called on `Absent`. A null-equivalent result collapses to
    /// `Absent`, so `Maybe::of(v).map(f) == Maybe::of(f(v))`.
    pub fn map<U, F>(self, f: F) -> Maybe<U>
    where
        U: Nullable,
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Present(value) => Maybe::of(f(value)),
            Self::Absent => Maybe::Absent,
        }
    }

    /// Borrow the payload
    pub fn as_ref(&self) -> Maybe<&T> {
        match self {
            Self::Present(value) => Maybe::Present(value),
            Self::Absent => Maybe::Absent,
        }
    }

    /// `false` for `Absent` and for empty text, sequences and mappings
    ///
    /// Separates "no value" from "falsy but present": `0` and `false` answer
    /// `true`.
    pub fn has_length(&self) -> bool
    where
        T: Nullable,
    {
        match self {
            Self::Present(value) => value.has_length(),
            Self::Absent => false,
        }
    }

    /// Render the value, or the empty string if absent
    ///
    /// Uses the payload's `Display`. For `serde_json::Value` that is JSON
    /// text, so strings come out quoted; see
    /// [`to_plain_text`](Maybe::to_plain_text) for the raw form.
    pub fn to_display_text(&self) -> String
    where
        T: fmt::Display,
    {
        self.to_string()
    }
}

impl Maybe<JsonValue> {
    /// Render strings without JSON quoting, other payloads as compact JSON
    ///
    /// `Absent` renders as the empty string.
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Present(JsonValue::String(text)) => text.clone(),
            Self::Present(value) => value.to_string(),
            Self::Absent => String::new(),
        }
    }
}

impl<V: Clone + Nullable> Maybe<V> {
    /// Look `key` up in a hash map, snapshotting the bound value
    ///
    /// A missing key and a key bound to a null-equivalent are both `Absent`.
    pub fn wrap_from<K, Q, S>(map: &HashMap<K, V, S>, key: &Q) -> Self
    where
        K: Borrow<Q> + Hash + Eq,
        Q: Hash + Eq + ?Sized,
        S: BuildHasher,
    {
        Self::wrap(map.get(key).cloned())
    }

    /// Look `key` up in an ordered map, snapshotting the bound value
    pub fn wrap_from_btree<K, Q>(map: &BTreeMap<K, V>, key: &Q) -> Self
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        Self::wrap(map.get(key).cloned())
    }
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T: Nullable> From<Option<T>> for Maybe<T> {
    fn from(candidate: Option<T>) -> Self {
        Self::wrap(candidate)
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(maybe: Maybe<T>) -> Self {
        maybe.get_or_null()
    }
}

impl<T: fmt::Display> fmt::Display for Maybe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(value) => write!(f, "{value}"),
            Self::Absent => Ok(()),
        }
    }
}

impl<T: Serialize> Serialize for Maybe<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => serializer.serialize_some(value),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de, T> Deserialize<'de> for Maybe<T>
where
    T: Deserialize<'de> + Nullable,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::wrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_wrap_present() {
        let var = String::from("hello");
        let some = Maybe::of(var);

        assert!(some.is_defined());
        assert!(!some.is_empty());
        assert_eq!(some.get_ref().unwrap(), "hello");
        assert_eq!(some.clone().get_or_else("hi".to_string()), "hello");
        assert_eq!(some.clone().get_or_null(), Some("hello".to_string()));
        assert_eq!(some.get().unwrap(), "hello");
    }

    #[test]
    fn test_wrap_unbound() {
        let nonexisting: Option<String> = None;
        let none = Maybe::wrap(nonexisting);

        assert!(none.is_empty());
        assert!(!none.is_defined());
        assert_eq!(none.clone().get_or_else("hi".to_string()), "hi");
        assert_eq!(none.clone().get_or_null(), None);
        assert_eq!(none.get(), Err(MaybeError::NoValuePresent));
    }

    #[test]
    fn test_wrap_null() {
        let none = Maybe::of(JsonValue::Null);

        assert!(none.is_empty());
        assert_eq!(none.clone().get_or_else(json!("hi")), json!("hi"));
        assert!(none.get_ref().unwrap_err().is_no_value_present());
    }

    #[test]
    fn test_wrap_nested_none_collapses() {
        assert!(Maybe::of(None::<i32>).is_empty());
        assert!(Maybe::of(Some(JsonValue::Null)).is_empty());
        assert!(Maybe::of(Maybe::<i32>::Absent).is_empty());
        assert!(Maybe::of(Some(3)).is_defined());
    }

    #[test]
    fn test_falsy_values_are_present() {
        assert!(Maybe::of(0).is_defined());
        assert!(Maybe::of(false).is_defined());
        assert!(Maybe::of(String::new()).is_defined());
        assert!(Maybe::of(json!([])).is_defined());
        assert!(Maybe::of(json!(0)).is_defined());
    }

    #[test]
    fn test_map_uppercases() {
        let some = Maybe::of("hi");
        assert_eq!(some.map(str::to_uppercase), Maybe::Present("HI".to_string()));

        let closure = Maybe::of("HELLO".to_string()).map(|arg| arg.to_lowercase());
        assert_eq!(closure.get().unwrap(), "hello");
    }

    #[test]
    fn test_map_skips_absent() {
        let calls = Cell::new(0);
        let none: Maybe<&str> = Maybe::Absent;

        let mapped = none.map(|value| {
            calls.set(calls.get() + 1);
            value.to_uppercase()
        });

        assert!(mapped.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_map_rewraps_null_result() {
        let some = Maybe::of(json!({"name": "bob"}));
        let missing = some.clone().map(|value| value.get("age").cloned());
        let null = some.map(|_| JsonValue::Null);

        assert!(missing.is_empty());
        assert!(null.is_empty());
    }

    #[test]
    fn test_value_capture() {
        let mut binding = String::from("hi");
        let captured = Maybe::of(binding.clone());
        binding.push_str("llo");

        assert_eq!(binding, "hillo");
        assert_eq!(captured.get().unwrap(), "hi");
    }

    #[test]
    fn test_has_length() {
        assert!(!Maybe::of(json!([])).has_length());
        assert!(Maybe::of(json!([1, 2, 3])).has_length());
        assert!(!Maybe::of("").has_length());
        assert!(Maybe::of(0).has_length());
        assert!(Maybe::of(false).has_length());
        assert!(Maybe::of(json!({"a": 1})).has_length());
        assert!(!Maybe::of(json!({})).has_length());
        assert!(!Maybe::<Vec<u8>>::Absent.has_length());
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Maybe::<i32>::Absent.to_display_text(), "");
        assert_eq!(Maybe::of(42).to_display_text(), "42");
        assert_eq!(format!("[{}]", Maybe::of("x")), "[x]");
    }

    #[test]
    fn test_plain_text_of_json() {
        assert_eq!(Maybe::of(json!("hi")).to_display_text(), "\"hi\"");
        assert_eq!(Maybe::of(json!("hi")).to_plain_text(), "hi");
        assert_eq!(Maybe::of(json!({"a": [1]})).to_plain_text(), r#"{"a":[1]}"#);
        assert_eq!(Maybe::of(json!(0)).to_plain_text(), "0");
        assert_eq!(Maybe::<JsonValue>::Absent.to_plain_text(), "");
    }

    #[test]
    fn test_normalize_hand_built_present() {
        let hand_built = Maybe::Present(JsonValue::Null);
        assert!(hand_built.is_defined());
        assert!(hand_built.normalize().is_empty());

        assert!(Maybe::Present(Maybe::<i32>::Absent).normalize().is_empty());
        assert_eq!(Maybe::Present(json!(0)).normalize(), Maybe::Present(json!(0)));
        assert_eq!(Maybe::<String>::Absent.normalize(), Maybe::Absent);
    }

    #[test]
    fn test_get_or_default() {
        assert_eq!(Maybe::<u32>::Absent.get_or_default(), 0);
        assert_eq!(Maybe::of(7u32).get_or_default(), 7);
    }

    #[test]
    fn test_wrap_from_maps() {
        let mut params = HashMap::new();
        params.insert("name".to_string(), json!("bob"));
        params.insert("nickname".to_string(), JsonValue::Null);

        assert_eq!(Maybe::wrap_from(&params, "name"), Maybe::Present(json!("bob")));
        assert!(Maybe::wrap_from(&params, "nickname").is_empty());
        assert!(Maybe::wrap_from(&params, "age").is_empty());

        let ordered: BTreeMap<&str, i32> = [("zero", 0)].into_iter().collect();
        assert_eq!(Maybe::wrap_from_btree(&ordered, "zero"), Maybe::Present(0));
    }

    #[test]
    fn test_serde() {
        let absent: Maybe<String> = serde_json::from_value(JsonValue::Null).unwrap();
        assert!(absent.is_empty());

        let present: Maybe<Vec<i32>> = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(serde_json::to_value(&present).unwrap(), json!([1, 2]));
        assert_eq!(serde_json::to_value(&absent).unwrap(), JsonValue::Null);
    }

    #[test]
    fn test_option_conversions() {
        let maybe: Maybe<i32> = Some(5).into();
        let back: Option<i32> = maybe.into();
        assert_eq!(back, Some(5));
    }
}
