//! The transient schema AST and the post-build passes.
//!
//! [`SchemaParsing`] accumulates everything the builder recognized in one
//! schema object: features, the `type` specification, combinators, the
//! draft-3 `extends` terms, a reference, the scope-introducing `id` and the
//! `definitions` children. It never validates anything itself; finalization
//! collapses it into a runtime validator, after which the URI-collection
//! pass registers every node's validator in the resolver.
use crate::compilation::context::UriScope;
use crate::compilation::features::{Feature, ItemsFeature, Policy, TypeBuilder};
use crate::error::SchemaError;
use crate::resolver::UriResolver;
use crate::validators::combined::{all_of, any_of, not, one_of, CombinedKind};
use crate::validators::default::DefaultValidator;
use crate::validators::generic::generic_validator;
use crate::validators::reference::RefValidator;
use crate::validators::ValidatorRef;
use std::sync::Arc;
use url::Url;

/// The `type` keyword: one primitive name or a list of them.
pub(crate) enum TypeSpec {
    One(SchemaType),
    Many(Vec<SchemaType>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchemaType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl SchemaType {
    pub(crate) fn from_name(name: &str) -> Option<SchemaType> {
        match name {
            "null" => Some(SchemaType::Null),
            "boolean" => Some(SchemaType::Boolean),
            "integer" => Some(SchemaType::Integer),
            "number" => Some(SchemaType::Number),
            "string" => Some(SchemaType::String),
            "array" => Some(SchemaType::Array),
            "object" => Some(SchemaType::Object),
            _ => None,
        }
    }
}

pub(crate) struct SchemaParsing {
    pub(crate) features: Vec<Feature>,
    pub(crate) type_spec: Option<TypeSpec>,
    pub(crate) combinators: Vec<(CombinedKind, Vec<SchemaParsing>)>,
    pub(crate) extends: Vec<SchemaParsing>,
    /// Canonical absolute URI recorded for `$ref`.
    pub(crate) reference: Option<String>,
    /// Absolute URI of a scope-introducing `id`.
    pub(crate) id: Option<Url>,
    pub(crate) definitions: Vec<(String, SchemaParsing)>,
    finalized: Option<ValidatorRef>,
}

impl SchemaParsing {
    pub(crate) fn new() -> SchemaParsing {
        SchemaParsing {
            features: Vec::new(),
            type_spec: None,
            combinators: Vec::new(),
            extends: Vec::new(),
            reference: None,
            id: None,
            definitions: Vec::new(),
            finalized: None,
        }
    }

    /// The collapsed validator. Only meaningful after [`SchemaParsing::finalize`].
    pub(crate) fn validator(&self) -> ValidatorRef {
        Arc::clone(
            self.finalized
                .as_ref()
                .expect("finalize runs before the validator is taken"),
        )
    }

    /// Collapse the node bottom-up: finalize the children, synthesize a type
    /// validator from the features, fuse combinators and `extends` terms
    /// into an `allOf`, and attach the `default` wrapper.
    pub(crate) fn finalize(&mut self) -> Result<(), SchemaError> {
        for feature in &mut self.features {
            for child in feature.children_mut() {
                child.finalize()?;
            }
        }
        for (_, children) in &mut self.combinators {
            for child in children {
                child.finalize()?;
            }
        }
        for child in &mut self.extends {
            child.finalize()?;
        }
        for (_, child) in &mut self.definitions {
            child.finalize()?;
        }

        if let Some(uri) = &self.reference {
            self.finalized = Some(Arc::new(RefValidator::new(uri.clone())));
            return Ok(());
        }

        let mut builder = TypeBuilder::new(self.type_spec.as_ref());
        for feature in &self.features {
            builder.apply(feature);
        }
        let default = builder.take_default();

        let mut terms: Vec<ValidatorRef> = Vec::new();
        if let Some(validator) = builder.build() {
            terms.push(validator);
        }
        for (kind, children) in &self.combinators {
            let members: Vec<ValidatorRef> =
                children.iter().map(SchemaParsing::validator).collect();
            terms.push(match kind {
                CombinedKind::AllOf => all_of(members),
                CombinedKind::AnyOf => any_of(members),
                CombinedKind::OneOf => one_of(members),
                CombinedKind::Not => {
                    let mut members = members;
                    not(members.swap_remove(0))
                }
            });
        }
        for child in &self.extends {
            terms.push(child.validator());
        }

        let fused = match terms.len() {
            0 => generic_validator(),
            1 => terms.swap_remove(0),
            _ => all_of(terms),
        };
        self.finalized = Some(match default {
            Some(value) => Arc::new(DefaultValidator::new(fused, value)),
            None => fused,
        });
        Ok(())
    }

    /// Register every node's finalized validator under its canonical URI:
    /// the traversal fragment within the current document, plus the `id`
    /// itself for scope-introducing nodes.
    pub(crate) fn collect(
        &self,
        scope: &mut UriScope,
        resolver: &mut UriResolver,
    ) -> Result<(), SchemaError> {
        let pushed = match &self.id {
            Some(id) => {
                scope.push_id(id);
                true
            }
            None => false,
        };
        let result = self.collect_inner(scope, resolver);
        if pushed {
            scope.pop_id();
        }
        result
    }

    fn collect_inner(
        &self,
        scope: &mut UriScope,
        resolver: &mut UriResolver,
    ) -> Result<(), SchemaError> {
        resolver.register(scope.key(), self.validator())?;

        for (name, child) in &self.definitions {
            scope.push_chunk("definitions");
            scope.push_chunk(name);
            let result = child.collect(scope, resolver);
            scope.pop_chunk();
            scope.pop_chunk();
            result?;
        }
        for feature in &self.features {
            match feature {
                Feature::Properties(properties) => {
                    for (name, child) in properties {
                        scope.push_chunk("properties");
                        scope.push_chunk(name);
                        let result = child.collect(scope, resolver);
                        scope.pop_chunk();
                        scope.pop_chunk();
                        result?;
                    }
                }
                Feature::AdditionalProperties(Policy::Schema(child)) => {
                    scope.push_chunk("additionalProperties");
                    let result = child.collect(scope, resolver);
                    scope.pop_chunk();
                    result?;
                }
                Feature::AdditionalItems(Policy::Schema(child)) => {
                    scope.push_chunk("additionalItems");
                    let result = child.collect(scope, resolver);
                    scope.pop_chunk();
                    result?;
                }
                Feature::Items(ItemsFeature::Uniform(child)) => {
                    scope.push_chunk("items");
                    let result = child.collect(scope, resolver);
                    scope.pop_chunk();
                    result?;
                }
                Feature::Items(ItemsFeature::Tuple(children)) => {
                    scope.push_chunk("items");
                    for (index, child) in children.iter().enumerate() {
                        scope.push_index(index);
                        let result = child.collect(scope, resolver);
                        scope.pop_chunk();
                        result?;
                    }
                    scope.pop_chunk();
                }
                _ => {}
            }
        }
        for (kind, children) in &self.combinators {
            let keyword = match kind {
                CombinedKind::AllOf => "allOf",
                CombinedKind::AnyOf => "anyOf",
                CombinedKind::OneOf => "oneOf",
                CombinedKind::Not => "not",
            };
            if let CombinedKind::Not = kind {
                scope.push_chunk(keyword);
                let result = children[0].collect(scope, resolver);
                scope.pop_chunk();
                result?;
            } else {
                scope.push_chunk(keyword);
                for (index, child) in children.iter().enumerate() {
                    scope.push_index(index);
                    let result = child.collect(scope, resolver);
                    scope.pop_chunk();
                    result?;
                }
                scope.pop_chunk();
            }
        }
        if self.extends.len() == 1 {
            scope.push_chunk("extends");
            let result = self.extends[0].collect(scope, resolver);
            scope.pop_chunk();
            result?;
        } else {
            for (index, child) in self.extends.iter().enumerate() {
                scope.push_chunk("extends");
                scope.push_index(index);
                let result = child.collect(scope, resolver);
                scope.pop_chunk();
                scope.pop_chunk();
                result?;
            }
        }
        Ok(())
    }
}
