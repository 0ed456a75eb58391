//! # piwik-custom-vars
//!
//! Custom variables for Piwik tracking requests.
//!
//! Piwik's custom-variable query parameters (`_cvar`, `cvar`) take a JSON
//! object that maps 1-based indices to `[key, value]` pairs. This crate
//! keeps the pairs in a [`CustomVariableSet`] and renders that object on
//! demand. Building the request URL and sending it are left to the caller.
//!
//! ## Usage
//!
//! ```
//! use piwik_custom_vars::CustomVariableSet;
//!
//! let mut vars = CustomVariableSet::new();
//! vars.put("key1", "value1");
//! vars.put("key2", "value2");
//!
//! // Either pair may be assigned index "1".
//! let json = vars.serialize();
//! assert!(json.contains(r#"["key1","value1"]"#));
//! assert!(json.contains(r#"["key2","value2"]"#));
//!
//! let parsed = CustomVariableSet::parse(&json)?;
//! assert_eq!(parsed, vars);
//! # Ok::<(), piwik_custom_vars::CustomVarsError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod custom_vars;
pub mod error;

pub use custom_vars::{CustomVariableSet, Iter};
pub use error::CustomVarsError;
