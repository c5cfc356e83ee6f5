//! Validator for `{"type": "boolean"}`, optionally pinned to one value.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Stack, ValidationCtx};
use crate::validators::{Validate, ValidatorRef};
use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

pub(crate) struct BooleanValidator {
    expected: Option<bool>,
}

lazy_static! {
    static ref BOOLEAN: ValidatorRef = Arc::new(BooleanValidator { expected: None });
}

pub(crate) fn boolean_validator() -> ValidatorRef {
    Arc::clone(&BOOLEAN)
}

impl BooleanValidator {
    #[cfg(test)]
    pub(crate) fn with_value(expected: bool) -> ValidatorRef {
        Arc::new(BooleanValidator {
            expected: Some(expected),
        })
    }
}

impl Validate for BooleanValidator {
    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        stack.pop();
        match event {
            Event::Boolean(value) => {
                if let Some(expected) = self.expected {
                    if *value != expected {
                        ctx.notify(ErrorCode::UnexpectedValue);
                        return false;
                    }
                }
                true
            }
            _ => {
                ctx.notify(ErrorCode::NotBoolean);
                false
            }
        }
    }
}

impl fmt::Display for BooleanValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("type: boolean")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{run_events, run_events_err};

    #[test]
    fn accepts_any_boolean() {
        assert!(run_events(boolean_validator(), &[Event::Boolean(true)]));
        assert!(run_events(boolean_validator(), &[Event::Boolean(false)]));
    }

    #[test]
    fn rejects_other_types() {
        assert_eq!(
            run_events_err(boolean_validator(), &[Event::Number("1")]),
            Some(ErrorCode::NotBoolean)
        );
    }

    #[test]
    fn expected_value() {
        assert!(run_events(
            BooleanValidator::with_value(true),
            &[Event::Boolean(true)]
        ));
        assert_eq!(
            run_events_err(BooleanValidator::with_value(true), &[Event::Boolean(false)]),
            Some(ErrorCode::UnexpectedValue)
        );
    }

    #[test]
    fn through_a_compiled_schema() {
        use crate::tests_util;
        use serde_json::json;

        tests_util::assert_code_at(&json!({"type": "boolean"}), "1", ErrorCode::NotBoolean, 0);
    }
}
