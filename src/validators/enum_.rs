//! `enum` membership for values that have no dedicated leaf representation.
//!
//! Numbers and strings carry their options inside the leaf validator; every
//! other shape (and typeless schemas) materializes the incoming value and
//! compares it at the value boundary, so `1` matches an option spelled `1.0`.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Context, Stack, ValidationCtx};
use crate::validators::Validate;
use crate::value::{CanonValue, ValueBuilder};
use std::fmt;

pub(crate) struct EnumValidator {
    options: Vec<CanonValue>,
}

impl EnumValidator {
    pub(crate) fn new(options: Vec<CanonValue>) -> EnumValidator {
        EnumValidator { options }
    }
}

impl Validate for EnumValidator {
    fn init_context(&self) -> Context {
        Context::Value(ValueBuilder::new())
    }

    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        let (progress, value) = match stack.top_context() {
            Context::Value(builder) => match builder.feed(event) {
                Some(true) => (true, builder.take()),
                Some(false) => return true,
                None => (false, None),
            },
            _ => (false, None),
        };
        stack.pop();
        if !progress {
            ctx.notify(ErrorCode::Internal);
            return false;
        }
        match value {
            Some(value) if self.options.contains(&value) => true,
            _ => {
                ctx.notify(ErrorCode::UnexpectedValue);
                false
            }
        }
    }
}

impl fmt::Display for EnumValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enum: [{} options]", self.options.len())
    }
}
