//! `uniqueItems` check.
//!
//! Runs next to the array validator inside an `allOf` pair, materializes the
//! array and detects duplicates at the value boundary. Equality is at the
//! JSON-value level: `[1, 1.0]` has duplicates, `[{"a":1},{"a":2}]` does not.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Context, Stack, ValidationCtx};
use crate::validators::{Validate, ValidatorRef};
use crate::value::{CanonValue, ValueBuilder};
use ahash::AHashSet;
use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

pub(crate) struct UniqueItemsValidator;

lazy_static! {
    static ref UNIQUE: ValidatorRef = Arc::new(UniqueItemsValidator);
}

pub(crate) fn unique_items_validator() -> ValidatorRef {
    Arc::clone(&UNIQUE)
}

impl Validate for UniqueItemsValidator {
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
            Some(CanonValue::Array(items)) => {
                let mut seen = AHashSet::with_capacity(items.len());
                for item in &items {
                    if !seen.insert(item) {
                        ctx.notify(ErrorCode::ArrayNotUnique);
                        return false;
                    }
                }
                true
            }
            _ => {
                ctx.notify(ErrorCode::Internal);
                false
            }
        }
    }
}

impl fmt::Display for UniqueItemsValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("uniqueItems: true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{run_events, run_events_err};

    #[test]
    fn distinct_items() {
        let events = [
            Event::ArrayBegin,
            Event::Number("1"),
            Event::Number("2"),
            Event::String("1"),
            Event::ArrayEnd,
        ];
        assert!(run_events(unique_items_validator(), &events));
    }

    #[test]
    fn duplicates_across_spellings() {
        let events = [
            Event::ArrayBegin,
            Event::Number("1"),
            Event::Number("1.0"),
            Event::ArrayEnd,
        ];
        assert_eq!(
            run_events_err(unique_items_validator(), &events),
            Some(ErrorCode::ArrayNotUnique)
        );
    }

    #[test]
    fn duplicate_objects_ignore_key_order() {
        let events = [
            Event::ArrayBegin,
            Event::ObjectBegin,
            Event::ObjectKey("a"),
            Event::Number("1"),
            Event::ObjectKey("b"),
            Event::Number("2"),
            Event::ObjectEnd,
            Event::ObjectBegin,
            Event::ObjectKey("b"),
            Event::Number("2"),
            Event::ObjectKey("a"),
            Event::Number("1"),
            Event::ObjectEnd,
            Event::ArrayEnd,
        ];
        assert_eq!(
            run_events_err(unique_items_validator(), &events),
            Some(ErrorCode::ArrayNotUnique)
        );
    }
}
