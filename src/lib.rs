//! statecheck - offline validator for workflow state machine definitions
//!
//! A definition is a named set of states (Pass, Task, Wait, Choice, Succeed,
//! Fail, Parallel) with a start state. Validation checks required fields and
//! numeric ranges, path syntax, transition targets and that some execution
//! from the start state can reach a terminal state. Parallel branches are
//! validated as independent nested scopes.
//!
//! ```
//! use statecheck::{validate, ChoiceRule, ChoiceState, Condition, ErrorKind};
//! use statecheck::{PassState, StateMachine, SucceedState};
//!
//! let machine = StateMachine::new("Initial")
//!     .with_state("Initial", PassState::new().with_next("Choice"))
//!     .with_state(
//!         "Choice",
//!         ChoiceState::new()
//!             .with_choice(ChoiceRule::new(Condition::string_equals("$.foo", "bar"), "Initial"))
//!             .with_default("Done"),
//!     )
//!     .with_state("Done", SucceedState::new());
//! assert!(validate(&machine).is_ok());
//!
//! let looping = StateMachine::new("A")
//!     .with_state("A", PassState::new().with_next("B"))
//!     .with_state("B", PassState::new().with_next("A"));
//! let err = validate(&looping).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::CycleDetected);
//! assert_eq!(err.to_string(), "Root.States[A]: Cycle detected.");
//! ```

pub use statecheck_core::{
    validate, validate_path, ConfigError, DiagnosticStyle, ErrorKind, Location, PathMode,
    PathSyntaxError, StateMachineValidator, ValidationError, ValidatorConfig,
};
pub use statecheck_model::*;
