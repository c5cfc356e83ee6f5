//! Validator for `{"type": "array"}`.
//!
//! Each element is delegated to a child validator pushed onto the stack at
//! the element's first event: the `items` validator in uniform mode, the
//! positional validator in tuple mode, with the `additionalItems` policy for
//! elements beyond the tuple. Cardinality is checked at the closing event;
//! `uniqueItems` is handled by a parallel collecting validator (see
//! [`crate::validators::unique_items`]).
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Context, Stack, ValidationCtx};
use crate::validators::generic::generic_validator;
use crate::validators::{Validate, ValidatorRef};
use std::fmt;
use std::sync::Arc;

pub(crate) enum Items {
    /// One validator applied to every element.
    Uniform(ValidatorRef),
    /// Positional validators plus a policy for the rest.
    Tuple(Vec<ValidatorRef>, AdditionalItems),
}

pub(crate) enum AdditionalItems {
    Allow,
    Forbid,
    Schema(ValidatorRef),
}

pub(crate) struct ArrayValidator {
    pub(crate) items: Items,
    pub(crate) min_items: Option<u64>,
    pub(crate) max_items: Option<u64>,
}

#[derive(Debug, Default)]
pub(crate) struct ArrayContext {
    started: bool,
    index: u64,
}

impl ArrayValidator {
    pub(crate) fn new(
        items: Items,
        min_items: Option<u64>,
        max_items: Option<u64>,
    ) -> ArrayValidator {
        ArrayValidator {
            items,
            min_items,
            max_items,
        }
    }
}

impl Validate for ArrayValidator {
    fn init_context(&self) -> Context {
        Context::Array(ArrayContext::default())
    }

    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        let (started, index) = match stack.top_context() {
            Context::Array(context) => (context.started, context.index),
            _ => {
                ctx.notify(ErrorCode::Internal);
                stack.pop();
                return false;
            }
        };
        if !started {
            return if let Event::ArrayBegin = event {
                if let Context::Array(context) = stack.top_context() {
                    context.started = true;
                }
                true
            } else {
                ctx.notify(ErrorCode::NotArray);
                stack.pop();
                false
            };
        }
        if let Event::ArrayEnd = event {
            stack.pop();
            if let Some(minimum) = self.min_items {
                if index < minimum {
                    ctx.notify(ErrorCode::ArrayTooShort);
                    return false;
                }
            }
            if let Some(maximum) = self.max_items {
                if index > maximum {
                    ctx.notify(ErrorCode::ArrayTooLong);
                    return false;
                }
            }
            return true;
        }
        // First event of the next element: delegate it to a child.
        let item = match &self.items {
            Items::Uniform(validator) => Arc::clone(validator),
            Items::Tuple(validators, additional) => {
                if (index as usize) < validators.len() {
                    Arc::clone(&validators[index as usize])
                } else {
                    match additional {
                        AdditionalItems::Allow => generic_validator(),
                        AdditionalItems::Schema(validator) => Arc::clone(validator),
                        AdditionalItems::Forbid => {
                            ctx.notify(ErrorCode::ArrayTooLong);
                            stack.pop();
                            return false;
                        }
                    }
                }
            }
        };
        if let Context::Array(context) = stack.top_context() {
            context.index += 1;
        }
        stack.push(item);
        stack.check(event, ctx)
    }
}

impl fmt::Display for ArrayValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.items {
            Items::Uniform(validator) => write!(f, "items: {{{}}}", validator),
            Items::Tuple(validators, _) => write!(
                f,
                "items: [{}]",
                crate::validators::format_validators(validators)
            ),
        }
    }
}
