//! The validation state machine.
//!
//! Validation is a pushdown automaton: a stack of active validators, each
//! paired with its private context, driven by the token event stream. The
//! top validator consumes each event; it may push children (delegating the
//! next events to them) and pops itself once its value is complete. The
//! stack draining means the document satisfied the schema.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::resolver::UriResolver;
use crate::validators::array::ArrayContext;
use crate::validators::combined::CombinedContext;
use crate::validators::object::ObjectContext;
use crate::validators::ValidatorRef;
use crate::value::ValueBuilder;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Chains of `$ref` hops that never consume an event are cut here; they can
/// only come from reference cycles.
const MAX_REF_HOPS: u32 = 64;

/// Per-invocation state owned by the frame of the validator that pushed it.
pub(crate) enum Context {
    None,
    /// Nesting depth for the generic validator.
    Depth(u32),
    Array(ArrayContext),
    Object(ObjectContext),
    Combined(CombinedContext),
    /// A value being materialized (`enum`, `uniqueItems`).
    Value(ValueBuilder),
}

struct Frame {
    validator: ValidatorRef,
    context: Context,
}

/// The validator stack with the parallel context stack. Combinators own
/// private instances of it, one per branch.
pub(crate) struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    pub(crate) fn new() -> Stack {
        Stack { frames: Vec::new() }
    }

    /// Push a validator together with its fresh context.
    pub(crate) fn push(&mut self, validator: ValidatorRef) {
        let context = validator.init_context();
        self.frames.push(Frame { validator, context });
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.frames.is_empty()
    }

    /// The context of the top frame. Only the active validator calls this,
    /// so a frame is always present.
    pub(crate) fn top_context(&mut self) -> &mut Context {
        &mut self
            .frames
            .last_mut()
            .expect("the active validator owns the top frame")
            .context
    }

    /// Dispatch one event to the top validator.
    pub(crate) fn check(&mut self, event: &Event<'_>, ctx: &mut ValidationCtx<'_>) -> bool {
        let validator = match self.frames.last() {
            Some(frame) => Arc::clone(&frame.validator),
            None => {
                ctx.notify(ErrorCode::Internal);
                return false;
            }
        };
        validator.check(event, self, ctx)
    }
}

/// Per-event environment shared by the whole stack, including combinator
/// substates: the URI resolver for `$ref` hops, the error notification slot
/// and the default-injection hook.
pub(crate) struct ValidationCtx<'a> {
    resolver: Option<&'a UriResolver>,
    pub(crate) error: Option<ErrorCode>,
    muted: u32,
    ref_hops: u32,
    default_hook: Option<&'a mut (dyn FnMut(&str, &Value) + 'a)>,
}

impl<'a> ValidationCtx<'a> {
    pub(crate) fn new(
        resolver: Option<&'a UriResolver>,
        default_hook: Option<&'a mut (dyn FnMut(&str, &Value) + 'a)>,
    ) -> ValidationCtx<'a> {
        ValidationCtx {
            resolver,
            error: None,
            muted: 0,
            ref_hops: 0,
            default_hook,
        }
    }

    /// Record the first error. Muted while a combinator still has live
    /// alternatives; the combinator reports its own code if all fail.
    pub(crate) fn notify(&mut self, code: ErrorCode) {
        if self.muted == 0 && self.error.is_none() {
            self.error = Some(code);
        }
    }

    pub(crate) fn mute(&mut self) {
        self.muted += 1;
    }

    pub(crate) fn unmute(&mut self) {
        self.muted = self.muted.saturating_sub(1);
    }

    pub(crate) fn resolve(&self, uri: &str) -> Option<ValidatorRef> {
        self.resolver.and_then(|resolver| resolver.lookup(uri))
    }

    pub(crate) fn enter_ref(&mut self) -> bool {
        self.ref_hops += 1;
        self.ref_hops <= MAX_REF_HOPS
    }

    /// Report a default value injected for a missing required property.
    /// Suppressed inside combinator branches whose outcome is still open.
    pub(crate) fn notify_default(&mut self, key: &str, value: &Value) {
        if self.muted == 0 {
            if let Some(hook) = self.default_hook.as_mut() {
                hook(key, value);
            }
        }
    }
}

/// An in-flight validation consuming tokenizer events.
///
/// This is the embedder-facing event interface: feed one call per lexical
/// token, in document order. Every method returns `true` to continue or
/// `false` to abort, in which case [`Validation::error`] holds the code.
/// Borrowed `&str` arguments are not retained past the call.
pub struct Validation<'s> {
    resolver: &'s UriResolver,
    stack: Stack,
    error: Option<ErrorCode>,
    default_hook: Option<Box<dyn FnMut(&str, &Value) + 's>>,
}

impl<'s> Validation<'s> {
    pub(crate) fn new(root: &ValidatorRef, resolver: &'s UriResolver) -> Validation<'s> {
        let mut stack = Stack::new();
        stack.push(Arc::clone(root));
        Validation {
            resolver,
            stack,
            error: None,
            default_hook: None,
        }
    }

    /// Install a hook observing default values injected for missing required
    /// object properties. The engine never materializes the values itself;
    /// patching them into a DOM is up to the embedder.
    pub fn on_default<F: FnMut(&str, &Value) + 's>(&mut self, hook: F) {
        self.default_hook = Some(Box::new(hook));
    }

    pub(crate) fn event(&mut self, event: &Event<'_>) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.stack.is_drained() {
            // A complete value has already been consumed.
            self.error = Some(ErrorCode::Internal);
            return false;
        }
        let hook = match self.default_hook.as_mut() {
            Some(hook) => Some(&mut **hook as &mut (dyn FnMut(&str, &Value))),
            None => None,
        };
        let mut ctx = ValidationCtx::new(Some(self.resolver), hook);
        let result = self.stack.check(event, &mut ctx);
        if !result {
            self.error = Some(ctx.error.unwrap_or(ErrorCode::Internal));
        }
        result
    }

    /// A `null` token.
    pub fn on_null(&mut self) -> bool {
        self.event(&Event::Null)
    }

    /// A `true` or `false` token.
    pub fn on_bool(&mut self, value: bool) -> bool {
        self.event(&Event::Boolean(value))
    }

    /// A number token, as its unparsed literal.
    pub fn on_number(&mut self, literal: &str) -> bool {
        self.event(&Event::Number(literal))
    }

    /// A string token, already unescaped.
    pub fn on_string(&mut self, value: &str) -> bool {
        self.event(&Event::String(value))
    }

    /// A `{` token.
    pub fn on_object_begin(&mut self) -> bool {
        self.event(&Event::ObjectBegin)
    }

    /// An object key.
    pub fn on_object_key(&mut self, key: &str) -> bool {
        self.event(&Event::ObjectKey(key))
    }

    /// A `}` token.
    pub fn on_object_end(&mut self) -> bool {
        self.event(&Event::ObjectEnd)
    }

    /// A `[` token.
    pub fn on_array_begin(&mut self) -> bool {
        self.event(&Event::ArrayBegin)
    }

    /// A `]` token.
    pub fn on_array_end(&mut self) -> bool {
        self.event(&Event::ArrayEnd)
    }

    /// The code of the first error, if any call returned `false`.
    #[must_use]
    pub fn error(&self) -> Option<ErrorCode> {
        self.error
    }

    /// Finish the stream: succeeds when no error was recorded and the event
    /// sequence formed one complete value.
    pub fn finish(self) -> Result<(), ErrorCode> {
        match self.error {
            Some(code) => Err(code),
            None if self.stack.is_drained() => Ok(()),
            None => Err(ErrorCode::Syntax),
        }
    }
}

impl fmt::Debug for Validation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("depth", &self.stack.frames.len())
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Drive a bare validator with events, no resolver attached. True when
    /// every event was accepted and the stack drained.
    pub(crate) fn run_events(validator: ValidatorRef, events: &[Event<'_>]) -> bool {
        let mut stack = Stack::new();
        stack.push(validator);
        for event in events {
            let mut ctx = ValidationCtx::new(None, None);
            if !stack.check(event, &mut ctx) {
                return false;
            }
        }
        stack.is_drained()
    }

    /// Like [`run_events`] but returns the notified code of the first
    /// rejected event.
    pub(crate) fn run_events_err(
        validator: ValidatorRef,
        events: &[Event<'_>],
    ) -> Option<ErrorCode> {
        let mut stack = Stack::new();
        stack.push(validator);
        for event in events {
            let mut ctx = ValidationCtx::new(None, None);
            if !stack.check(event, &mut ctx) {
                return Some(ctx.error.unwrap_or(ErrorCode::Internal));
            }
        }
        None
    }
}
