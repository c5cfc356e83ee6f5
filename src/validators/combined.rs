//! `allOf` / `anyOf` / `oneOf` / `not` combinators.
//!
//! A combinator drives every child against the same event stream without
//! buffering: each child runs in its own substate (a private validator
//! stack), so children may disagree about where they are in the value. A
//! child terminates when its substate drains; the combinator terminates when
//! no child is still consuming, and then evaluates its verdict.
//!
//! `anyOf`, `oneOf` and `not` swallow child errors while alternatives remain
//! and report a single combinator code; `allOf` propagates the first child
//! failure as-is.
use crate::error::ErrorCode;
use crate::event::Event;
use crate::state::{Context, Stack, ValidationCtx};
use crate::validators::generic::generic_validator;
use crate::validators::{format_validators, Validate, ValidatorRef};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CombinedKind {
    AllOf,
    AnyOf,
    OneOf,
    Not,
}

pub(crate) struct CombinedValidator {
    kind: CombinedKind,
    children: Vec<ValidatorRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchState {
    Active,
    Accepted,
    Retired,
}

pub(crate) struct Branch {
    stack: Stack,
    state: BranchState,
}

pub(crate) struct CombinedContext {
    branches: Vec<Branch>,
}

pub(crate) fn all_of(children: Vec<ValidatorRef>) -> ValidatorRef {
    Arc::new(CombinedValidator {
        kind: CombinedKind::AllOf,
        children,
    })
}

pub(crate) fn any_of(children: Vec<ValidatorRef>) -> ValidatorRef {
    Arc::new(CombinedValidator {
        kind: CombinedKind::AnyOf,
        children,
    })
}

pub(crate) fn one_of(children: Vec<ValidatorRef>) -> ValidatorRef {
    Arc::new(CombinedValidator {
        kind: CombinedKind::OneOf,
        children,
    })
}

/// `not` runs the negated child next to the generic validator: the generic
/// branch marks the value boundary even after the child has been retired, and
/// the verdict inverts the child's outcome there.
pub(crate) fn not(child: ValidatorRef) -> ValidatorRef {
    Arc::new(CombinedValidator {
        kind: CombinedKind::Not,
        children: vec![child, generic_validator()],
    })
}

impl Validate for CombinedValidator {
    fn init_context(&self) -> Context {
        let branches = self
            .children
            .iter()
            .map(|child| {
                let mut stack = Stack::new();
                stack.push(Arc::clone(child));
                Branch {
                    stack,
                    state: BranchState::Active,
                }
            })
            .collect();
        Context::Combined(CombinedContext { branches })
    }

    fn check(&self, event: &Event<'_>, stack: &mut Stack, ctx: &mut ValidationCtx<'_>) -> bool {
        let muted = self.kind != CombinedKind::AllOf;
        let (done, accepted, first_accepted, failed) = {
            let context = match stack.top_context() {
                Context::Combined(context) => context,
                _ => {
                    ctx.notify(ErrorCode::Internal);
                    stack.pop();
                    return false;
                }
            };
            if muted {
                ctx.mute();
            }
            let mut failed = false;
            for branch in context.branches.iter_mut() {
                if branch.state != BranchState::Active {
                    continue;
                }
                if branch.stack.check(event, ctx) {
                    if branch.stack.is_drained() {
                        branch.state = BranchState::Accepted;
                    }
                } else {
                    branch.state = BranchState::Retired;
                    if self.kind == CombinedKind::AllOf {
                        failed = true;
                        break;
                    }
                }
            }
            if muted {
                ctx.unmute();
            }
            let done = context
                .branches
                .iter()
                .all(|branch| branch.state != BranchState::Active);
            let accepted = context
                .branches
                .iter()
                .filter(|branch| branch.state == BranchState::Accepted)
                .count();
            let first_accepted = context
                .branches
                .first()
                .map_or(false, |branch| branch.state == BranchState::Accepted);
            (done, accepted, first_accepted, failed)
        };
        if failed {
            // The failing child already notified its code.
            stack.pop();
            return false;
        }
        if !done {
            return true;
        }
        stack.pop();
        match self.kind {
            CombinedKind::AllOf => true,
            CombinedKind::AnyOf => {
                if accepted > 0 {
                    true
                } else {
                    ctx.notify(ErrorCode::AnyOfNoMatch);
                    false
                }
            }
            CombinedKind::OneOf => {
                if accepted == 1 {
                    true
                } else {
                    ctx.notify(ErrorCode::OneOfNotOne);
                    false
                }
            }
            CombinedKind::Not => {
                if first_accepted {
                    ctx.notify(ErrorCode::NotNotRejected);
                    false
                } else {
                    true
                }
            }
        }
    }
}

impl fmt::Display for CombinedValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.kind {
            CombinedKind::AllOf => "allOf",
            CombinedKind::AnyOf => "anyOf",
            CombinedKind::OneOf => "oneOf",
            CombinedKind::Not => return write!(f, "not: {{{}}}", self.children[0]),
        };
        write!(f, "{}: [{}]", keyword, format_validators(&self.children))
    }
}
