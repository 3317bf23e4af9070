//! Named request sources bound to the path resolver
//!
//! [`RequestSources`] holds three parameter trees (query string, form body and
//! server metadata) and forwards key paths to [`resolve_path`] with the root
//! fixed to one of them. The request methods layer a precedence policy on top:
//! the second source is consulted only when the first resolves to `Absent`.
//!
//! Query and form text use the `application/x-www-form-urlencoded` encoding
//! with bracket nesting:
//!
//! ```text
//! user[name]=bob&tags[]=a&tags[]=b   =>   {"user": {"name": "bob"}, "tags": ["a", "b"]}
//! ```

use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use url::form_urlencoded;

use crate::config::{Precedence, SourcesConfig};
use crate::error::{MaybeError, Result};
use crate::maybe::Maybe;
use crate::path::{PathKey, canonical_index, format_path, resolve_path};

/// One bracket segment of a parameter name
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Name(String),
    Append,
}

/// Query string, form body and server parameters of a request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSources {
    query: JsonValue,
    form: JsonValue,
    server: JsonValue,
    precedence: Precedence,
}

impl Default for RequestSources {
    fn default() -> Self {
        Self {
            query: JsonValue::Object(Map::new()),
            form: JsonValue::Object(Map::new()),
            server: JsonValue::Object(Map::new()),
            precedence: Precedence::default(),
        }
    }
}

impl RequestSources {
    /// Create sources with all three trees empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string and a form body
    pub fn from_strings(query: &str, form: &str) -> Result<Self> {
        Ok(Self::new()
            .with_query(parse_params(query)?)
            .with_form(parse_params(form)?))
    }

    /// Parse a query string and a form body, applying `config`
    pub fn from_config(config: &SourcesConfig, query: &str, form: &str) -> Result<Self> {
        let mut sources = Self::from_strings(query, form)?.with_precedence(config.precedence);
        if config.include_environment {
            sources = sources.with_environment();
        }
        Ok(sources)
    }

    /// Replace the query string tree
    pub fn with_query(mut self, query: JsonValue) -> Self {
        self.query = query;
        self
    }

    /// Replace the form body tree
    pub fn with_form(mut self, form: JsonValue) -> Self {
        self.form = form;
        self
    }

    /// Replace the server metadata tree
    pub fn with_server(mut self, server: JsonValue) -> Self {
        self.server = server;
        self
    }

    /// Set the precedence used by [`preferred`](Self::preferred)
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Fill the server tree from the process environment
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn with_environment(self) -> Self {
        let server: Map<String, JsonValue> = std::env::vars_os()
            .filter_map(|(name, value)| {
                let name = name.into_string().ok()?;
                let value = value.into_string().ok()?;
                Some((name, JsonValue::String(value)))
            })
            .collect();
        log::debug!("loaded {} environment variables into server source", server.len());
        self.with_server(JsonValue::Object(server))
    }

    /// The query string tree
    pub fn query_params(&self) -> &JsonValue {
        &self.query
    }

    /// The form body tree
    pub fn form_params(&self) -> &JsonValue {
        &self.form
    }

    /// The server metadata tree
    pub fn server_params(&self) -> &JsonValue {
        &self.server
    }

    /// The configured precedence
    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Resolve `keys` in the query string
    pub fn query(&self, keys: &[PathKey]) -> Maybe<JsonValue> {
        resolve_path(Some(&self.query), keys)
    }

    /// Resolve `keys` in the form body
    pub fn form(&self, keys: &[PathKey]) -> Maybe<JsonValue> {
        resolve_path(Some(&self.form), keys)
    }

    /// Resolve `keys` in the server metadata
    pub fn server(&self, keys: &[PathKey]) -> Maybe<JsonValue> {
        resolve_path(Some(&self.server), keys)
    }

    /// Query string first, form body if the query has no value
    pub fn request(&self, keys: &[PathKey]) -> Maybe<JsonValue> {
        self.request_with(Precedence::QueryFirst, keys)
    }

    /// Form body first, query string if the form has no value
    pub fn request_form_first(&self, keys: &[PathKey]) -> Maybe<JsonValue> {
        self.request_with(Precedence::FormFirst, keys)
    }

    /// Resolve with the configured precedence
    pub fn preferred(&self, keys: &[PathKey]) -> Maybe<JsonValue> {
        self.request_with(self.precedence, keys)
    }

    /// Resolve in the preferred source, falling back to the other one
    pub fn request_with(&self, precedence: Precedence, keys: &[PathKey]) -> Maybe<JsonValue> {
        let (first, second, fallback) = match precedence {
            Precedence::QueryFirst => (&self.query, &self.form, "form body"),
            Precedence::FormFirst => (&self.form, &self.query, "query string"),
        };

        let found = resolve_path(Some(first), keys);
        if found.is_defined() {
            return found;
        }

        log::debug!(
            "'{}' not found with {precedence} precedence, trying {fallback}",
            format_path(keys)
        );
        resolve_path(Some(second), keys)
    }
}

/// Deepest bracket nesting accepted in a parameter name
pub const MAX_NESTING: usize = 64;

/// Decode `application/x-www-form-urlencoded` text into a parameter tree
///
/// `a[b]=1` nests into objects and `a[]=1` appends to an array. A later scalar
/// assignment to the same name replaces the earlier one. Parameter names that
/// are empty, have unbalanced brackets or nest deeper than [`MAX_NESTING`]
/// are rejected.
pub fn parse_params(input: &str) -> Result<JsonValue> {
    let mut root = ParamNode::table();
    for (name, value) in form_urlencoded::parse(input.as_bytes()) {
        let segments = parse_name(&name)?;
        root.insert(&segments, value.into_owned());
    }
    Ok(root.into_json())
}

fn parse_name(raw: &str) -> Result<Vec<Segment>> {
    let (base, mut rest) = match raw.find('[') {
        Some(pos) => raw.split_at(pos),
        None => (raw, ""),
    };
    if base.is_empty() {
        return Err(MaybeError::invalid_query(format!(
            "parameter '{raw}' has no name"
        )));
    }

    let mut segments = vec![Segment::Name(base.to_string())];
    while !rest.is_empty() {
        if segments.len() > MAX_NESTING {
            return Err(MaybeError::invalid_query(format!(
                "parameter '{base}' nests deeper than {MAX_NESTING} levels"
            )));
        }
        let inner = rest
            .strip_prefix('[')
            .and_then(|tail| tail.split_once(']'))
            .filter(|(inner, _)| !inner.contains('['));
        let Some((inner, tail)) = inner else {
            return Err(MaybeError::invalid_query(format!(
                "parameter '{raw}' has unbalanced brackets"
            )));
        };
        segments.push(if inner.is_empty() {
            Segment::Append
        } else {
            Segment::Name(inner.to_string())
        });
        rest = tail;
    }
    Ok(segments)
}

/// Parameter tree under construction
///
/// Tables remember the next position for `[]` so appends stay constant time
/// after named keys have turned a list into a table.
#[derive(Debug)]
enum ParamNode {
    Empty,
    Leaf(String),
    List(Vec<ParamNode>),
    Table {
        entries: BTreeMap<String, ParamNode>,
        next_index: usize,
    },
}

impl ParamNode {
    fn table() -> Self {
        Self::Table {
            entries: BTreeMap::new(),
            next_index: 0,
        }
    }

    fn insert(&mut self, segments: &[Segment], value: String) {
        let Some((first, rest)) = segments.split_first() else {
            *self = Self::Leaf(value);
            return;
        };

        match first {
            Segment::Append => {
                if !matches!(self, Self::List(_) | Self::Table { .. }) {
                    *self = Self::List(Vec::new());
                }
                let child = match self {
                    Self::List(items) => {
                        items.push(Self::Empty);
                        items.last_mut()
                    }
                    Self::Table {
                        entries,
                        next_index,
                    } => {
                        let key = next_index.to_string();
                        *next_index += 1;
                        Some(entries.entry(key).or_insert(Self::Empty))
                    }
                    _ => None,
                };
                if let Some(child) = child {
                    child.insert(rest, value);
                }
            }
            Segment::Name(name) => {
                if !matches!(self, Self::Table { .. }) {
                    // Lists keep their elements under decimal keys, scalars are replaced.
                    *self = match std::mem::replace(self, Self::Empty) {
                        Self::List(items) => Self::Table {
                            next_index: items.len(),
                            entries: items
                                .into_iter()
                                .enumerate()
                                .map(|(index, item)| (index.to_string(), item))
                                .collect(),
                        },
                        _ => Self::table(),
                    };
                }
                if let Self::Table {
                    entries,
                    next_index,
                } = self
                {
                    if let Some(index) = canonical_index(name) {
                        *next_index = (*next_index).max(index.saturating_add(1));
                    }
                    entries
                        .entry(name.clone())
                        .or_insert(Self::Empty)
                        .insert(rest, value);
                }
            }
        }
    }

    fn into_json(self) -> JsonValue {
        match self {
            Self::Empty => JsonValue::Null,
            Self::Leaf(text) => JsonValue::String(text),
            Self::List(items) => JsonValue::Array(items.into_iter().map(Self::into_json).collect()),
            Self::Table { entries, .. } => JsonValue::Object(
                entries
                    .into_iter()
                    .map(|(key, node)| (key, node.into_json()))
                    .collect(),
            ),
        }
    }
}
