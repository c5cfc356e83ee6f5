//! `$ref` indirection.
//!
//! A reference stores the absolute URI it resolved to during compilation and
//! looks the target up in the URI resolver on each check, then replaces
//! itself with it. Holding the URI rather than the target keeps reference
//! cycles out of the ownership graph; a hop guard cuts chains of references
//! that never consume an event.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Stack, ValidationCtx};
use crate::validators::Validate;
use std::fmt;

pub(crate) struct RefValidator {
    uri: String,
}

impl RefValidator {
    pub(crate) fn new(uri: String) -> RefValidator {
        RefValidator { uri }
    }
}

impl Validate for RefValidator {
    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        if !ctx.enter_ref() {
            ctx.notify(ErrorCode::Internal);
            stack.pop();
            return false;
        }
        match ctx.resolve(&self.uri) {
            Some(target) => {
                stack.pop();
                stack.push(target);
                stack.check(event, ctx)
            }
            None => {
                ctx.notify(ErrorCode::Internal);
                stack.pop();
                false
            }
        }
    }
}

impl fmt::Display for RefValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$ref: {}", self.uri)
    }
}
