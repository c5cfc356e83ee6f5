//! # jsonschema-stream
//!
//! A crate for streaming JSON Schema validation. A schema (Draft-4 flavored)
//! is compiled into a validation tree once; documents are then validated
//! directly from the token stream of a built-in tokenizer, without building
//! a DOM. Validation is a pushdown automaton over lexical events, so a
//! failure is reported with the byte offset of the offending token and the
//! cost of combinators (`anyOf`, `oneOf`, `not`) is bounded by schema depth,
//! not document size.
//!
//! ## Example:
//!
//! ```rust
//! use jsonschema_stream::{ErrorCode, Schema};
//! use serde_json::json;
//!
//! fn main() -> Result<(), jsonschema_stream::SchemaError> {
//!     let schema = json!({"type": "object", "required": ["id"],
//!                         "properties": {"id": {"type": "integer"}}});
//!     let compiled = Schema::compile(&schema)?;
//!     assert!(compiled.is_valid(r#"{"id": 42}"#));
//!
//!     let error = compiled.validate(r#"{"id": true}"#).unwrap_err();
//!     assert_eq!(error.code(), ErrorCode::NotNumber);
//!     assert_eq!(error.offset(), 7);
//!     Ok(())
//! }
//! ```
#![warn(
    clippy::doc_markdown,
    clippy::redundant_closure,
    clippy::explicit_iter_loop,
    clippy::match_same_arms,
    clippy::needless_borrow,
    clippy::print_stdout,
    clippy::trivially_copy_pass_by_ref,
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]
mod compilation;
mod error;
mod event;
mod number;
mod resolver;
mod state;
mod tokenizer;
mod validators;
mod value;

pub use compilation::{CompilationOptions, Schema};
pub use error::{ErrorCode, SchemaError, ValidationError};
pub use resolver::{SchemaResolver, SchemaResolverError};
pub use state::Validation;

use serde_json::Value;

/// Parse a schema document and compile it with default options.
pub fn parse_schema(input: &str) -> Result<Schema, SchemaError> {
    let schema: Value = serde_json::from_str(input)?;
    Schema::compile(&schema)
}

/// A shortcut for validating `instance` against `schema`.
///
/// ```rust
/// use jsonschema_stream::is_valid;
/// use serde_json::json;
///
/// let schema = json!({"maxLength": 5});
/// assert!(is_valid(&schema, "\"foo\""));
/// ```
///
/// This function panics if an invalid schema is passed.
#[must_use]
pub fn is_valid(schema: &Value, instance: &str) -> bool {
    let compiled = Schema::compile(schema).expect("Invalid schema");
    compiled.is_valid(instance)
}
