//! The validator tree.
//!
//! A compiled schema is a DAG of validators sharing ownership through `Arc`.
//! Validators are immutable once compiled; all per-validation state lives in
//! the frame contexts of a [`crate::state::Stack`].
pub(crate) mod array;
pub(crate) mod boolean;
pub(crate) mod combined;
pub(crate) mod combined_types;
pub(crate) mod default;
pub(crate) mod enum_;
pub(crate) mod generic;
pub(crate) mod null;
pub(crate) mod number;
pub(crate) mod object;
pub(crate) mod reference;
pub(crate) mod string;
pub(crate) mod unique_items;

use crate::event::Event;
use crate::state::{Context, Stack, ValidationCtx};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub(crate) trait Validate: Send + Sync + fmt::Display {
    /// Consume one event. By contract the implementation either returns
    /// `true` and leaves the stack as it wishes (including popping itself
    /// once its value is complete), or notifies an error code, pops itself
    /// and returns `false`.
    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool;

    /// The per-invocation context pushed alongside this validator.
    fn init_context(&self) -> Context {
        Context::None
    }

    /// The `default` value to inject for a missing required property.
    fn default_value(&self) -> Option<&Value> {
        None
    }
}

pub(crate) type ValidatorRef = Arc<dyn Validate>;

impl fmt::Debug for dyn Validate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string())
    }
}

pub(crate) fn format_validators(validators: &[ValidatorRef]) -> String {
    validators
        .iter()
        .map(|validator| format!("{{{}}}", validator))
        .collect::<Vec<String>>()
        .join(", ")
}
