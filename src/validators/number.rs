//! Validator for `{"type": "number"}` and `{"type": "integer"}` with the
//! numeric constraint keywords applied.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::number::Number;
use crate::state::{Stack, ValidationCtx};
use crate::validators::Validate;
use std::fmt;

#[derive(Default)]
pub(crate) struct NumberValidator {
    pub(crate) integer_only: bool,
    pub(crate) minimum: Option<Number>,
    pub(crate) exclusive_minimum: bool,
    pub(crate) maximum: Option<Number>,
    pub(crate) exclusive_maximum: bool,
    pub(crate) multiple_of: Option<Number>,
    /// Numeric `enum` options; non-numeric options can never match a number
    /// and are dropped at compilation.
    pub(crate) enumeration: Option<Vec<Number>>,
}

impl NumberValidator {
    fn verdict(&self, literal: &str) -> Result<(), ErrorCode> {
        let value = Number::parse(literal).map_err(|_| ErrorCode::Internal)?;
        if self.integer_only && !value.is_integer() {
            return Err(ErrorCode::NotIntegerNumber);
        }
        if let Some(minimum) = &self.minimum {
            if value < *minimum || (self.exclusive_minimum && value == *minimum) {
                return Err(ErrorCode::NumberTooSmall);
            }
        }
        if let Some(maximum) = &self.maximum {
            if value > *maximum || (self.exclusive_maximum && value == *maximum) {
                return Err(ErrorCode::NumberTooLarge);
            }
        }
        if let Some(multiple_of) = &self.multiple_of {
            if !value.is_multiple_of(multiple_of) {
                return Err(ErrorCode::NumberNotMultiple);
            }
        }
        if let Some(options) = &self.enumeration {
            if !options.iter().any(|option| *option == value) {
                return Err(ErrorCode::UnexpectedValue);
            }
        }
        Ok(())
    }
}

impl Validate for NumberValidator {
    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        stack.pop();
        match event {
            Event::Number(literal) => match self.verdict(literal) {
                Ok(()) => true,
                Err(code) => {
                    ctx.notify(code);
                    false
                }
            },
            _ => {
                ctx.notify(ErrorCode::NotNumber);
                false
            }
        }
    }
}

impl fmt::Display for NumberValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.integer_only {
            f.write_str("type: integer")
        } else {
            f.write_str("type: number")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::ValidatorRef;
    use crate::state::test_support::{run_events, run_events_err};
    use std::sync::Arc;
    use test_case::test_case;

    fn number(configure: impl FnOnce(&mut NumberValidator)) -> Arc<NumberValidator> {
        let mut validator = NumberValidator::default();
        configure(&mut validator);
        Arc::new(validator)
    }

    #[test]
    fn plain_number() {
        assert!(run_events(number(|_| {}), &[Event::Number("-1.5e3")]));
        assert_eq!(
            run_events_err(number(|_| {}), &[Event::String("1")]),
            Some(ErrorCode::NotNumber)
        );
    }

    #[test_case("42", true)]
    #[test_case("42.0", true)]
    #[test_case("4.2e1", true)]
    #[test_case("42.5", false)]
    fn integer_only(literal: &str, valid: bool) {
        let validator = number(|v| v.integer_only = true);
        if valid {
            assert!(run_events(validator, &[Event::Number(literal)]));
        } else {
            assert_eq!(
                run_events_err(validator, &[Event::Number(literal)]),
                Some(ErrorCode::NotIntegerNumber)
            );
        }
    }

    #[test]
    fn minimum_inclusive_and_exclusive() {
        let inclusive = number(|v| v.minimum = Some(Number::parse("1").unwrap()));
        assert!(run_events(Arc::clone(&inclusive) as ValidatorRef, &[Event::Number("1")]));
        assert_eq!(
            run_events_err(inclusive, &[Event::Number("0.999")]),
            Some(ErrorCode::NumberTooSmall)
        );

        let exclusive = number(|v| {
            v.minimum = Some(Number::parse("1").unwrap());
            v.exclusive_minimum = true;
        });
        assert_eq!(
            run_events_err(exclusive, &[Event::Number("1.0")]),
            Some(ErrorCode::NumberTooSmall)
        );
    }

    #[test]
    fn maximum_inclusive_and_exclusive() {
        let inclusive = number(|v| v.maximum = Some(Number::parse("3").unwrap()));
        assert!(run_events(Arc::clone(&inclusive) as ValidatorRef, &[Event::Number("3.0")]));
        assert_eq!(
            run_events_err(inclusive, &[Event::Number("3.5")]),
            Some(ErrorCode::NumberTooLarge)
        );

        let exclusive = number(|v| {
            v.maximum = Some(Number::parse("3").unwrap());
            v.exclusive_maximum = true;
        });
        assert_eq!(
            run_events_err(exclusive, &[Event::Number("3")]),
            Some(ErrorCode::NumberTooLarge)
        );
    }

    #[test]
    fn multiple_of() {
        let validator = number(|v| v.multiple_of = Some(Number::parse("0.1").unwrap()));
        assert!(run_events(Arc::clone(&validator) as ValidatorRef, &[Event::Number("1.1")]));
        assert_eq!(
            run_events_err(validator, &[Event::Number("4.55")]),
            Some(ErrorCode::NumberNotMultiple)
        );
    }

    #[test]
    fn enumeration() {
        let validator = number(|v| {
            v.enumeration = Some(vec![
                Number::parse("1.0").unwrap(),
                Number::parse("2").unwrap(),
            ])
        });
        assert!(run_events(Arc::clone(&validator) as ValidatorRef, &[Event::Number("1")]));
        assert_eq!(
            run_events_err(validator, &[Event::Number("3")]),
            Some(ErrorCode::UnexpectedValue)
        );
    }

    #[test]
    fn through_a_compiled_schema() {
        use crate::tests_util;
        use serde_json::json;

        tests_util::is_valid(&json!({"minimum": 1.1}), "1.1");
        tests_util::is_not_valid(&json!({"minimum": 1.1}), "0.6");
        tests_util::assert_code(
            &json!({"type": "integer", "multipleOf": 2}),
            "7",
            ErrorCode::NumberNotMultiple,
        );
        // Exact decimal semantics, not float remainders.
        tests_util::is_valid(&json!({"multipleOf": 0.01}), "4.55");
    }
}
