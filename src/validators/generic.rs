//! The validator behind an absent or unconstrained schema: accepts exactly
//! one JSON value of any type.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Context, Stack, ValidationCtx};
use crate::validators::{Validate, ValidatorRef};
use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

pub(crate) struct GenericValidator;

lazy_static! {
    static ref GENERIC: ValidatorRef = Arc::new(GenericValidator);
}

/// The process-wide generic validator instance.
pub(crate) fn generic_validator() -> ValidatorRef {
    Arc::clone(&GENERIC)
}

impl Validate for GenericValidator {
    fn init_context(&self) -> Context {
        // Sum of object and array depths of incoming events. The tokenizer
        // checks event ordering, so when it drops back to zero all opened
        // containers have been closed.
        Context::Depth(0)
    }

    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        let depth = match stack.top_context() {
            Context::Depth(depth) => depth,
            _ => {
                ctx.notify(ErrorCode::Internal);
                stack.pop();
                return false;
            }
        };
        let pop = match event {
            Event::ObjectBegin | Event::ArrayBegin => {
                *depth += 1;
                false
            }
            Event::ObjectEnd | Event::ArrayEnd => match depth.checked_sub(1) {
                Some(left) => {
                    *depth = left;
                    left == 0
                }
                None => {
                    ctx.notify(ErrorCode::Internal);
                    stack.pop();
                    return false;
                }
            },
            _ => *depth == 0,
        };
        if pop {
            stack.pop();
        }
        true
    }
}

impl fmt::Display for GenericValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::run_events;

    #[test]
    fn scalar_is_consumed_in_one_event() {
        assert!(run_events(generic_validator(), &[Event::Null]));
        assert!(run_events(generic_validator(), &[Event::Boolean(false)]));
        assert!(run_events(generic_validator(), &[Event::Number("4.2")]));
    }

    #[test]
    fn nested_containers_are_tracked() {
        let events = [
            Event::ObjectBegin,
            Event::ObjectKey("a"),
            Event::ArrayBegin,
            Event::ObjectBegin,
            Event::ObjectEnd,
            Event::Number("1"),
            Event::ArrayEnd,
            Event::ObjectEnd,
        ];
        assert!(run_events(generic_validator(), &events));
    }
}
