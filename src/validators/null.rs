//! Validator for `{"type": "null"}`.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Stack, ValidationCtx};
use crate::validators::{Validate, ValidatorRef};
use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

pub(crate) struct NullValidator;

lazy_static! {
    static ref NULL: ValidatorRef = Arc::new(NullValidator);
}

pub(crate) fn null_validator() -> ValidatorRef {
    Arc::clone(&NULL)
}

impl Validate for NullValidator {
    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        stack.pop();
        if let Event::Null = event {
            true
        } else {
            ctx.notify(ErrorCode::NotNull);
            false
        }
    }
}

impl fmt::Display for NullValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("type: null")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{run_events, run_events_err};

    #[test]
    fn accepts_null_only() {
        assert!(run_events(null_validator(), &[Event::Null]));
        assert_eq!(
            run_events_err(null_validator(), &[Event::Boolean(true)]),
            Some(ErrorCode::NotNull)
        );
        assert_eq!(
            run_events_err(null_validator(), &[Event::String("null")]),
            Some(ErrorCode::NotNull)
        );
    }
}
