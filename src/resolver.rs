//! URI registry and external document resolution for `$ref`.
//!
//! During compilation every subschema is registered under its canonical
//! absolute URI (document plus fragment); references hold such URIs and are
//! looked up here. References crossing documents load the target through a
//! [`SchemaResolver`], which embedders can replace.
use crate::error::SchemaError;
use crate::validators::ValidatorRef;
use ahash::AHashMap;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use url::Url;

/// An opaque error type returned by resolvers on resolution failures.
pub type SchemaResolverError = anyhow::Error;

/// Loads schema documents referenced across document boundaries.
///
/// Internal references such as `#/definitions/…` are handled by the engine;
/// a resolver is only consulted for URIs pointing outside the compiled
/// document. All operations are blocking.
///
/// # Example
///
/// ```
/// # use serde_json::{json, Value};
/// # use anyhow::anyhow;
/// # use jsonschema_stream::{SchemaResolver, SchemaResolverError};
/// # use std::sync::Arc;
/// # use url::Url;
/// struct MyCustomResolver;
///
/// impl SchemaResolver for MyCustomResolver {
///     fn resolve(&self, url: &Url, _reference: &str) -> Result<Arc<Value>, SchemaResolverError> {
///         match url.scheme() {
///             "http" | "https" => Ok(Arc::new(json!({"type": "string"}))),
///             _ => Err(anyhow!("scheme is not supported")),
///         }
///     }
/// }
/// ```
pub trait SchemaResolver: Send + Sync {
    /// Load the schema document behind `url`. The original reference text is
    /// passed along; it preserves relative paths that the absolute URL has
    /// already resolved away.
    fn resolve(&self, url: &Url, original_reference: &str) -> Result<Arc<Value>, SchemaResolverError>;
}

pub(crate) struct DefaultResolver;

impl SchemaResolver for DefaultResolver {
    #[allow(unused_variables)]
    fn resolve(&self, url: &Url, reference: &str) -> Result<Arc<Value>, SchemaResolverError> {
        match url.scheme() {
            "http" | "https" => {
                #[cfg(feature = "resolve-http")]
                {
                    let response = reqwest::blocking::get(url.as_str())?;
                    let document: Value = response.json()?;
                    Ok(Arc::new(document))
                }
                #[cfg(not(feature = "resolve-http"))]
                Err(anyhow::anyhow!(
                    "the `resolve-http` feature or a custom resolver is required to load remote schemas"
                ))
            }
            "file" => {
                #[cfg(feature = "resolve-file")]
                {
                    if let Ok(path) = url.to_file_path() {
                        let file = std::fs::File::open(path)?;
                        let document: Value = serde_json::from_reader(file)?;
                        Ok(Arc::new(document))
                    } else {
                        Err(anyhow::anyhow!("invalid file path"))
                    }
                }
                #[cfg(not(feature = "resolve-file"))]
                Err(anyhow::anyhow!(
                    "the `resolve-file` feature or a custom resolver is required to load schemas from files"
                ))
            }
            _ => Err(anyhow::anyhow!("unknown scheme {}", url.scheme())),
        }
    }
}

/// Mapping from canonical absolute URI to the finalized validator there.
pub(crate) struct UriResolver {
    validators: AHashMap<String, ValidatorRef>,
}

impl UriResolver {
    pub(crate) fn new() -> UriResolver {
        UriResolver {
            validators: AHashMap::new(),
        }
    }

    /// Register a validator under its canonical URI. Registering the same
    /// URI twice is a schema error: two subschemas would be indistinguishable
    /// to references.
    pub(crate) fn register(
        &mut self,
        uri: String,
        validator: ValidatorRef,
    ) -> Result<(), SchemaError> {
        match self.validators.entry(uri) {
            Entry::Occupied(entry) => Err(SchemaError::duplicate_fragment(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(validator);
                Ok(())
            }
        }
    }

    pub(crate) fn lookup(&self, uri: &str) -> Option<ValidatorRef> {
        self.validators.get(uri).map(Arc::clone)
    }

    pub(crate) fn contains(&self, uri: &str) -> bool {
        self.validators.contains_key(uri)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.validators.len()
    }

    #[cfg(test)]
    pub(crate) fn uris(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        uris.sort_unstable();
        uris
    }
}

impl std::fmt::Debug for UriResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UriResolver")
            .field("registered", &self.validators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::generic::generic_validator;

    #[test]
    fn duplicate_registration_fails() {
        let mut resolver = UriResolver::new();
        resolver
            .register("json-schema:///#".to_string(), generic_validator())
            .unwrap();
        let err = resolver
            .register("json-schema:///#".to_string(), generic_validator())
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFragment(_)));
    }

    #[test]
    fn lookup_after_registration() {
        let mut resolver = UriResolver::new();
        assert!(!resolver.contains("json-schema:///#/definitions/a"));
        resolver
            .register(
                "json-schema:///#/definitions/a".to_string(),
                generic_validator(),
            )
            .unwrap();
        assert!(resolver.contains("json-schema:///#/definitions/a"));
        assert!(resolver.lookup("json-schema:///#/definitions/a").is_some());
        assert!(resolver.lookup("json-schema:///#/definitions/b").is_none());
    }
}
