//! Schema compilation.
//!
//! A schema document is compiled into a tree of validators that carries
//! everything needed at validation time. Compilation runs in passes: build
//! the transient AST (resolving `$ref` targets against the `id` scope
//! stack), finalize it into runtime validators, register every subschema in
//! the URI resolver, then resolve references — loading and compiling
//! referenced external documents through the configured resolver.
pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod features;
pub(crate) mod parsing;

use crate::error::{ErrorCode, SchemaError, ValidationError};
use crate::resolver::{DefaultResolver, SchemaResolver, UriResolver};
use crate::state::Validation;
use crate::tokenizer::Tokenizer;
use crate::validators::ValidatorRef;
use ahash::AHashSet;
use self::context::{UriScope, DEFAULT_ROOT_URL};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A schema compiled into an immutable validation tree. May be shared
/// read-only among concurrent validations.
pub struct Schema {
    root: ValidatorRef,
    resolver: UriResolver,
}

/// Configures schema compilation.
///
/// ```
/// # use jsonschema_stream::Schema;
/// # let schema = serde_json::json!({"type": "integer"});
/// let compiled = Schema::options().compile(&schema).unwrap();
/// assert!(compiled.is_valid("42"));
/// ```
pub struct CompilationOptions {
    external: Arc<dyn SchemaResolver>,
    base_uri: Option<Url>,
}

impl Default for CompilationOptions {
    fn default() -> CompilationOptions {
        CompilationOptions {
            external: Arc::new(DefaultResolver),
            base_uri: None,
        }
    }
}

impl CompilationOptions {
    /// Use a custom resolver for references crossing document boundaries.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl SchemaResolver + 'static) -> CompilationOptions {
        self.external = Arc::new(resolver);
        self
    }

    /// Base URI the root document is known under; relative references
    /// resolve against it. Defaults to a private scheme.
    #[must_use]
    pub fn with_base_uri(mut self, base_uri: Url) -> CompilationOptions {
        self.base_uri = Some(base_uri);
        self
    }

    /// Compile `schema` with these options.
    pub fn compile(&self, schema: &Value) -> Result<Schema, SchemaError> {
        let root_url = match &self.base_uri {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_ROOT_URL).expect("the default root URL is valid"),
        };
        let mut resolver = UriResolver::new();
        let mut pending = Vec::new();
        let root = compile_document(schema, root_url.clone(), &mut resolver, &mut pending)?;

        // References may lead into documents not compiled yet; load each
        // missing document once and compile it into the same resolver.
        let mut loaded: AHashSet<String> = AHashSet::new();
        let mut root_document = root_url;
        root_document.set_fragment(None);
        loaded.insert(root_document.to_string());
        while let Some(uri) = pending.pop() {
            if resolver.contains(&uri) {
                continue;
            }
            let document = match uri.split_once('#') {
                Some((document, _)) => document.to_string(),
                None => uri.clone(),
            };
            if loaded.contains(&document) {
                return Err(SchemaError::unresolved_ref(uri));
            }
            let document_url = Url::parse(&document)
                .map_err(|_| SchemaError::unresolved_ref(uri.clone()))?;
            let external = self
                .external
                .resolve(&document_url, &uri)
                .map_err(|source| SchemaError::resolver(document.clone(), source))?;
            loaded.insert(document);
            let mut found = Vec::new();
            compile_document(&external, document_url, &mut resolver, &mut found)?;
            pending.push(uri);
            pending.extend(found);
        }
        Ok(Schema { root, resolver })
    }
}

impl Schema {
    /// A default set of [`CompilationOptions`].
    #[must_use]
    pub fn options() -> CompilationOptions {
        CompilationOptions::default()
    }

    /// Compile `schema` with default options.
    pub fn compile(schema: &Value) -> Result<Schema, SchemaError> {
        Schema::options().compile(schema)
    }

    /// Validate a JSON document. On failure, the error carries the first
    /// violation's code and the byte offset of the offending token.
    pub fn validate(&self, input: &str) -> Result<(), ValidationError> {
        drive(self.validation(), input)
    }

    /// Like [`Schema::validate`], with a hook observing default values
    /// injected for missing required object properties.
    pub fn validate_with_defaults<'a, F>(
        &'a self,
        input: &str,
        hook: F,
    ) -> Result<(), ValidationError>
    where
        F: FnMut(&str, &Value) + 'a,
    {
        let mut validation = self.validation();
        validation.on_default(hook);
        drive(validation, input)
    }

    /// Whether a JSON document satisfies the schema.
    #[must_use]
    pub fn is_valid(&self, input: &str) -> bool {
        self.validate(input).is_ok()
    }

    /// Start an event-driven validation, for embedders that run their own
    /// tokenizer.
    #[must_use]
    pub fn validation(&self) -> Validation<'_> {
        Validation::new(&self.root, &self.resolver)
    }

    /// Validate an already-parsed document by replaying it as events.
    /// Reported offsets are zero; the DOM has no byte positions.
    pub fn validate_value(&self, instance: &Value) -> Result<(), ValidationError> {
        let mut validation = self.validation();
        if replay(instance, &mut validation) {
            validation
                .finish()
                .map_err(|code| ValidationError::new(code, 0))
        } else {
            let code = validation.error().unwrap_or(ErrorCode::Internal);
            Err(ValidationError::new(code, 0))
        }
    }

    #[cfg(test)]
    pub(crate) fn resolver(&self) -> &UriResolver {
        &self.resolver
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("root", &self.root)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl fmt::Debug for CompilationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationOptions")
            .field("base_uri", &self.base_uri)
            .finish()
    }
}

/// Build, finalize and collect one document into the shared resolver.
fn compile_document(
    schema: &Value,
    base: Url,
    resolver: &mut UriResolver,
    refs: &mut Vec<String>,
) -> Result<ValidatorRef, SchemaError> {
    let mut scope = UriScope::new(base.clone());
    let mut node = {
        let mut ctx = builder::BuildContext {
            scope: &mut scope,
            refs,
        };
        builder::build(schema, &mut ctx)?
    };
    node.finalize()?;
    let mut scope = UriScope::new(base);
    node.collect(&mut scope, resolver)?;
    Ok(node.validator())
}

fn drive(mut validation: Validation<'_>, input: &str) -> Result<(), ValidationError> {
    let mut tokenizer = Tokenizer::new(input);
    loop {
        match tokenizer.next() {
            Err(err) => return Err(ValidationError::new(ErrorCode::Syntax, err.offset)),
            Ok(None) => break,
            Ok(Some((offset, event))) => {
                if !validation.event(&event) {
                    let code = validation.error().unwrap_or(ErrorCode::Internal);
                    return Err(ValidationError::new(code, offset));
                }
            }
        }
    }
    validation
        .finish()
        .map_err(|code| ValidationError::new(code, input.len()))
}

fn replay(value: &Value, validation: &mut Validation<'_>) -> bool {
    match value {
        Value::Null => validation.on_null(),
        Value::Bool(boolean) => validation.on_bool(*boolean),
        Value::Number(number) => validation.on_number(&number.to_string()),
        Value::String(string) => validation.on_string(string),
        Value::Array(items) => {
            validation.on_array_begin()
                && items.iter().all(|item| replay(item, validation))
                && validation.on_array_end()
        }
        Value::Object(map) => {
            validation.on_object_begin()
                && map
                    .iter()
                    .all(|(key, item)| validation.on_object_key(key) && replay(item, validation))
                && validation.on_object_end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_keyword() {
        let schema = json!({"type": "string"});
        let compiled = Schema::compile(&schema).unwrap();
        assert!(compiled.validate("\"AB\"").is_ok());
        assert!(compiled.validate("1").is_err());
    }

    #[test]
    fn registered_uris() {
        let schema = json!({
            "type": "object",
            "properties": {
                "node": {"$ref": "#/definitions/node"}
            },
            "definitions": {
                "node": {"type": "integer"}
            }
        });
        let compiled = Schema::compile(&schema).unwrap();
        assert_eq!(
            compiled.resolver().uris(),
            vec![
                "json-schema:///#",
                "json-schema:///#/definitions/node",
                "json-schema:///#/properties/node",
            ]
        );
    }

    #[test]
    fn scope_registration() {
        let schema = json!({
            "id": "http://localhost:1234/tree",
            "properties": {
                "nodes": {
                    "id": "http://localhost:1234/node",
                    "type": "number"
                }
            }
        });
        let compiled = Schema::compile(&schema).unwrap();
        assert_eq!(
            compiled.resolver().uris(),
            vec![
                "http://localhost:1234/node#",
                "http://localhost:1234/tree#",
            ]
        );
    }

    #[test]
    fn unresolved_reference() {
        let schema = json!({"$ref": "#/definitions/missing"});
        assert!(matches!(
            Schema::compile(&schema),
            Err(SchemaError::UnresolvedRef(_))
        ));
    }

    #[test]
    fn duplicate_fragment_fails_compilation() {
        // Two ids resolving to the same URI clash in the resolver.
        let schema = json!({
            "properties": {
                "a": {"id": "#dup", "type": "integer"},
                "b": {"id": "#dup", "type": "string"}
            }
        });
        assert!(matches!(
            Schema::compile(&schema),
            Err(SchemaError::DuplicateFragment(_))
        ));
    }

    #[test]
    fn external_documents_are_compiled() {
        struct Fixed;
        impl SchemaResolver for Fixed {
            fn resolve(
                &self,
                url: &Url,
                _reference: &str,
            ) -> Result<Arc<Value>, crate::SchemaResolverError> {
                assert_eq!(url.as_str(), "http://example.com/item.json");
                Ok(Arc::new(json!({"type": "integer", "minimum": 0})))
            }
        }
        let schema = json!({
            "id": "http://example.com/list.json",
            "type": "array",
            "items": {"$ref": "item.json"}
        });
        let compiled = Schema::options()
            .with_resolver(Fixed)
            .compile(&schema)
            .unwrap();
        assert!(compiled.is_valid("[0, 1, 2]"));
        assert!(!compiled.is_valid("[-1]"));
        assert!(!compiled.is_valid("[\"x\"]"));
    }

    #[test]
    fn validate_value_matches_text_validation() {
        let schema = json!({
            "type": "object",
            "required": ["id"],
            "properties": {"id": {"type": "integer"}}
        });
        let compiled = Schema::compile(&schema).unwrap();
        assert!(compiled.validate_value(&json!({"id": 42})).is_ok());
        let err = compiled.validate_value(&json!({"id": "x"})).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotNumber);
    }
}
