//! Validator for `{"type": "string"}` with the string constraint keywords
//! applied. Lengths are counted in UTF-8 code points.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Stack, ValidationCtx};
use crate::validators::Validate;
use fancy_regex::Regex;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct StringValidator {
    pub(crate) min_length: Option<u64>,
    pub(crate) max_length: Option<u64>,
    pub(crate) pattern: Option<Arc<Regex>>,
    /// String `enum` options; other options can never match.
    pub(crate) enumeration: Option<Vec<String>>,
}

impl StringValidator {
    fn verdict(&self, value: &str) -> Result<(), ErrorCode> {
        if self.min_length.is_some() || self.max_length.is_some() {
            let length = bytecount::num_chars(value.as_bytes()) as u64;
            if let Some(minimum) = self.min_length {
                if length < minimum {
                    return Err(ErrorCode::StringTooShort);
                }
            }
            if let Some(maximum) = self.max_length {
                if length > maximum {
                    return Err(ErrorCode::StringTooLong);
                }
            }
        }
        if let Some(pattern) = &self.pattern {
            if !matches!(pattern.is_match(value), Ok(true)) {
                return Err(ErrorCode::StringDoesNotMatchPattern);
            }
        }
        if let Some(options) = &self.enumeration {
            if !options.iter().any(|option| option == value) {
                return Err(ErrorCode::UnexpectedValue);
            }
        }
        Ok(())
    }
}

impl Validate for StringValidator {
    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        stack.pop();
        match event {
            Event::String(value) => match self.verdict(value) {
                Ok(()) => true,
                Err(code) => {
                    ctx.notify(code);
                    false
                }
            },
            _ => {
                ctx.notify(ErrorCode::NotString);
                false
            }
        }
    }
}

impl fmt::Display for StringValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("type: string")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::ValidatorRef;
    use crate::state::test_support::{run_events, run_events_err};

    fn string(configure: impl FnOnce(&mut StringValidator)) -> Arc<StringValidator> {
        let mut validator = StringValidator::default();
        configure(&mut validator);
        Arc::new(validator)
    }

    #[test]
    fn plain_string() {
        assert!(run_events(string(|_| {}), &[Event::String("x")]));
        assert_eq!(
            run_events_err(string(|_| {}), &[Event::Null]),
            Some(ErrorCode::NotString)
        );
    }

    #[test]
    fn lengths_count_code_points() {
        let validator = string(|v| {
            v.min_length = Some(2);
            v.max_length = Some(3);
        });
        // Three code points, six bytes.
        assert!(run_events(Arc::clone(&validator) as ValidatorRef, &[Event::String("äöü")]));
        assert_eq!(
            run_events_err(Arc::clone(&validator) as ValidatorRef, &[Event::String("ä")]),
            Some(ErrorCode::StringTooShort)
        );
        assert_eq!(
            run_events_err(validator, &[Event::String("äöüä")]),
            Some(ErrorCode::StringTooLong)
        );
    }

    #[test]
    fn pattern() {
        let validator = string(|v| v.pattern = Some(Arc::new(Regex::new("^a+$").unwrap())));
        assert!(run_events(Arc::clone(&validator) as ValidatorRef, &[Event::String("aaa")]));
        assert_eq!(
            run_events_err(validator, &[Event::String("abc")]),
            Some(ErrorCode::StringDoesNotMatchPattern)
        );
    }

    #[test]
    fn enumeration() {
        let validator = string(|v| v.enumeration = Some(vec!["on".to_string(), "off".to_string()]));
        assert!(run_events(Arc::clone(&validator) as ValidatorRef, &[Event::String("off")]));
        assert_eq!(
            run_events_err(validator, &[Event::String("idle")]),
            Some(ErrorCode::UnexpectedValue)
        );
    }

    #[test]
    fn through_a_compiled_schema() {
        use crate::tests_util;
        use serde_json::json;

        tests_util::is_valid(&json!({"maxLength": 5}), "\"foo\"");
        tests_util::is_not_valid(&json!({"pattern": "^a*$"}), "\"abc\"");
        tests_util::assert_code(
            &json!({"minLength": 2}),
            "\"f\"",
            ErrorCode::StringTooShort,
        );
    }
}
