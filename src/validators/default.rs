//! Wrapper carrying a schema `default` value.
//!
//! Validation delegates to the wrapped validator; the value is only consulted
//! by an enclosing object validator filling a missing required property.
use crate::event::Event;
use crate::state::{Stack, ValidationCtx};
use crate::validators::{Validate, ValidatorRef};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub(crate) struct DefaultValidator {
    inner: ValidatorRef,
    value: Value,
}

impl DefaultValidator {
    pub(crate) fn new(inner: ValidatorRef, value: Value) -> DefaultValidator {
        DefaultValidator { inner, value }
    }
}

impl Validate for DefaultValidator {
    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        let inner = Arc::clone(&self.inner);
        stack.pop();
        stack.push(inner);
        stack.check(event, ctx)
    }

    fn default_value(&self) -> Option<&Value> {
        Some(&self.value)
    }
}

impl fmt::Display for DefaultValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
