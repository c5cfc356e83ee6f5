//! Dispatch table for schemas listing several primitive `type` values.
//!
//! On the first event of a value, the table pops itself and pushes the
//! validator for the event's JSON type, re-dispatching that same event to it.
use crate::error::ErrorCode;
use crate::event::{Event, JsonType, JSON_TYPE_COUNT};
use crate::state::{Stack, ValidationCtx};
use crate::validators::{Validate, ValidatorRef};
use std::fmt;
use std::sync::Arc;

pub(crate) struct CombinedTypesValidator {
    types: [Option<ValidatorRef>; JSON_TYPE_COUNT],
}

impl CombinedTypesValidator {
    pub(crate) fn new(types: [Option<ValidatorRef>; JSON_TYPE_COUNT]) -> CombinedTypesValidator {
        CombinedTypesValidator { types }
    }
}

impl Validate for CombinedTypesValidator {
    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        let json_type = match event.json_type() {
            Some(json_type) => json_type,
            None => {
                ctx.notify(ErrorCode::Internal);
                stack.pop();
                return false;
            }
        };
        match &self.types[json_type.index()] {
            Some(validator) => {
                let validator = Arc::clone(validator);
                stack.pop();
                stack.push(validator);
                stack.check(event, ctx)
            }
            None => {
                ctx.notify(ErrorCode::TypeNotAllowed);
                stack.pop();
                false
            }
        }
    }
}

impl fmt::Display for CombinedTypesValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const ORDER: [JsonType; JSON_TYPE_COUNT] = [
            JsonType::Null,
            JsonType::Boolean,
            JsonType::Number,
            JsonType::String,
            JsonType::Array,
            JsonType::Object,
        ];
        let names: Vec<&str> = ORDER
            .iter()
            .filter(|json_type| self.types[json_type.index()].is_some())
            .map(|json_type| json_type.as_str())
            .collect();
        write!(f, "type: [{}]", names.join(", "))
    }
}
