//! # statecheck-model
//!
//! Value objects for statecheck.
//!
//! This crate provides:
//! - State machine and scope definitions
//! - The seven state kinds and their transitions
//! - Retry and catch policies
//! - Choice rules and their recursive conditions
//!
//! Everything here is plain data. Values are built once, either directly or
//! through the `with_*` helpers, and handed to `statecheck-core` for
//! validation. Required fields are modelled as `Option` so that a partially
//! built definition can still be represented and rejected with a precise
//! diagnostic.

pub mod condition;
pub mod error_code;
pub mod machine;
pub mod state;

pub use condition::{ChoiceRule, Comparison, ComparisonOperator, Condition};
pub use machine::{Branch, StateMap, StateMachine};
pub use state::{
    Catcher, ChoiceState, FailState, ParallelState, PassState, Retrier, State, StateKind,
    SucceedState, TaskState, Transition, WaitFor, WaitState,
};
