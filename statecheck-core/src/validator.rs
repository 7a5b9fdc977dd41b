//! Validation entry point.
//!
//! Each scope (the top-level machine and every parallel branch, recursively)
//! runs through the same checks in a fixed order:
//!
//! 1. nesting depth (branches only, when limited)
//! 2. scope fields
//! 3. fields of every state, in declaration order
//! 4. path syntax of every state
//! 5. transition target resolution
//! 6. parallel branches, each as a scope of its own
//! 7. termination
//! 8. unreachable states (when enabled)
//!
//! The first violation ends validation.

use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use crate::location::Location;
use crate::{fields, path, reachability, transitions};
use statecheck_model::{State, StateMachine};

/// Validates state machine definitions.
#[derive(Debug, Clone, Default)]
pub struct StateMachineValidator {
    config: ValidatorConfig,
}

impl StateMachineValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates a whole definition, returning the first violation found.
    pub fn validate(&self, machine: &StateMachine) -> Result<(), ValidationError> {
        let result = self.validate_scope(&Location::root(), machine, 0);

        match &result {
            Ok(()) => tracing::debug!(
                "Accepted state machine ({} top-level states)",
                machine.states.len()
            ),
            Err(e) => tracing::debug!("Rejected state machine: [{}] {}", e.error_code(), e),
        }

        result
    }

    fn validate_scope(
        &self,
        location: &Location,
        machine: &StateMachine,
        depth: usize,
    ) -> Result<(), ValidationError> {
        if self.config.limits_nesting() && depth > self.config.max_nesting_depth {
            return Err(ValidationError::NestingTooDeep {
                location: location.clone(),
                depth,
                max: self.config.max_nesting_depth,
            });
        }

        tracing::debug!("Validating scope {} (depth {})", location, depth);

        fields::validate_scope(location, machine)?;

        for (name, state) in machine.states.iter() {
            fields::validate_state(&location.state(name), state)?;
        }

        for (name, state) in machine.states.iter() {
            path::validate_state_paths(&location.state(name), state)?;
        }

        transitions::resolve_transitions(location, machine)?;

        for (name, state) in machine.states.iter() {
            match state {
                State::Parallel(parallel) => {
                    let state_location = location.state(name);
                    for (i, branch) in parallel.branches.iter().enumerate() {
                        self.validate_scope(&state_location.branch(i), &branch.machine, depth + 1)?;
                    }
                }
                State::Pass(_)
                | State::Task(_)
                | State::Wait(_)
                | State::Choice(_)
                | State::Succeed(_)
                | State::Fail(_) => {}
            }
        }

        reachability::check_termination(location, machine, self.config.diagnostics)?;

        if self.config.reject_unreachable_states {
            if let Some(name) = reachability::unreachable_states(machine).first() {
                return Err(ValidationError::UnreachableState {
                    location: location.state(*name),
                });
            }
        }

        Ok(())
    }
}

/// Validates a definition with the default configuration.
pub fn validate(machine: &StateMachine) -> Result<(), ValidationError> {
    StateMachineValidator::default().validate(machine)
}
