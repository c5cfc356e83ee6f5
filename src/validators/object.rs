//! Validator for `{"type": "object"}`.
//!
//! Keys are resolved against `properties` as they arrive; the matched value
//! validator is pushed and consumes the value events. Unknown keys follow the
//! `additionalProperties` policy. At the closing event, missing required keys
//! are filled from child defaults where available (observable through the
//! embedder's default hook), then `required` and the cardinality bounds are
//! enforced.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Context, Stack, ValidationCtx};
use crate::validators::generic::generic_validator;
use crate::validators::{Validate, ValidatorRef};
use ahash::{AHashMap, AHashSet};
use std::fmt;
use std::mem;
use std::sync::Arc;

pub(crate) enum AdditionalProperties {
    Allow,
    Forbid,
    Schema(ValidatorRef),
}

pub(crate) struct ObjectValidator {
    pub(crate) properties: AHashMap<String, ValidatorRef>,
    pub(crate) required: Vec<String>,
    pub(crate) additional: AdditionalProperties,
    pub(crate) min_properties: Option<u64>,
    pub(crate) max_properties: Option<u64>,
}

#[derive(Debug, Default)]
pub(crate) struct ObjectContext {
    started: bool,
    seen: AHashSet<String>,
}

impl ObjectValidator {
    pub(crate) fn new() -> ObjectValidator {
        ObjectValidator {
            properties: AHashMap::new(),
            required: Vec::new(),
            additional: AdditionalProperties::Allow,
            min_properties: None,
            max_properties: None,
        }
    }
}

impl Validate for ObjectValidator {
    fn init_context(&self) -> Context {
        Context::Object(ObjectContext::default())
    }

    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        let started = match stack.top_context() {
            Context::Object(context) => context.started,
            _ => {
                ctx.notify(ErrorCode::Internal);
                stack.pop();
                return false;
            }
        };
        if !started {
            return if let Event::ObjectBegin = event {
                if let Context::Object(context) = stack.top_context() {
                    context.started = true;
                }
                true
            } else {
                ctx.notify(ErrorCode::NotObject);
                stack.pop();
                false
            };
        }
        match event {
            Event::ObjectKey(key) => {
                let child = match self.properties.get(*key) {
                    Some(validator) => Arc::clone(validator),
                    None => match &self.additional {
                        AdditionalProperties::Allow => generic_validator(),
                        AdditionalProperties::Schema(validator) => Arc::clone(validator),
                        AdditionalProperties::Forbid => {
                            ctx.notify(ErrorCode::AdditionalPropertyNotAllowed);
                            stack.pop();
                            return false;
                        }
                    },
                };
                if let Context::Object(context) = stack.top_context() {
                    context.seen.insert((*key).to_string());
                }
                stack.push(child);
                true
            }
            Event::ObjectEnd => {
                let mut seen = match stack.top_context() {
                    Context::Object(context) => mem::take(&mut context.seen),
                    _ => {
                        ctx.notify(ErrorCode::Internal);
                        stack.pop();
                        return false;
                    }
                };
                stack.pop();
                for key in &self.required {
                    if seen.contains(key.as_str()) {
                        continue;
                    }
                    let default = self
                        .properties
                        .get(key)
                        .and_then(|validator| validator.default_value());
                    match default {
                        Some(value) => {
                            ctx.notify_default(key, value);
                            seen.insert(key.clone());
                        }
                        None => {
                            ctx.notify(ErrorCode::MissingRequiredKey);
                            return false;
                        }
                    }
                }
                let count = seen.len() as u64;
                if let Some(minimum) = self.min_properties {
                    if count < minimum {
                        ctx.notify(ErrorCode::TooFewProperties);
                        return false;
                    }
                }
                if let Some(maximum) = self.max_properties {
                    if count > maximum {
                        ctx.notify(ErrorCode::TooManyProperties);
                        return false;
                    }
                }
                true
            }
            _ => {
                ctx.notify(ErrorCode::Internal);
                stack.pop();
                false
            }
        }
    }
}

impl fmt::Display for ObjectValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.properties.keys().map(String::as_str).collect();
        names.sort_unstable();
        write!(f, "properties: [{}]", names.join(", "))
    }
}
