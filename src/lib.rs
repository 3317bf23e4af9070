//! Present-or-absent values and safe nested-path resolution
//!
//! [`Maybe`] is a two-variant container whose constructor folds null-equivalents
//! into `Absent`, so a `Present` value is always real even when it is `0`,
//! `false` or empty. [`resolve_path`] walks nested JSON-like data by a sequence
//! of keys and yields a `Maybe` instead of failing on missing segments.
//!
//! ```
//! use maybe_path::{Maybe, resolve};
//! use serde_json::json;
//!
//! let params = json!({"hello": ["hi"]});
//!
//! assert_eq!(resolve!(Some(&params), "hello", 0), Maybe::Present(json!("hi")));
//! assert!(resolve!(Some(&params), "hello", 1).is_empty());
//! assert_eq!(resolve!(Some(&params), "missing").get_or_else(json!("default")), json!("default"));
//! ```

pub mod config;
pub mod error;
pub mod maybe;
pub mod path;
pub mod sources;

// Re-export main types
pub use config::{Precedence, SourcesConfig};
pub use error::{MaybeError, Result};
pub use maybe::{Maybe, Nullable};
pub use path::{PathKey, PathNode, format_path, resolve_key, resolve_path};
pub use sources::{RequestSources, parse_params};
