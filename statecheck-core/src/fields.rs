//! Field-level validation of scopes and states.
//!
//! Each check looks only at the fields of one element: required values,
//! numeric ranges and the local structure of retriers, catchers and choice
//! conditions. Cross-state concerns (transition targets, termination) are
//! handled by [`crate::transitions`] and [`crate::reachability`].

use crate::error::ValidationError;
use crate::location::Location;
use crate::property;
use statecheck_model::error_code;
use statecheck_model::{
    Catcher, ChoiceState, Condition, FailState, ParallelState, PassState, Retrier, State,
    StateMachine, TaskState, Transition, WaitFor, WaitState,
};
use std::collections::HashSet;

/// Validates the scope-level fields of a state machine or branch.
pub fn validate_scope(location: &Location, machine: &StateMachine) -> Result<(), ValidationError> {
    require_str(location, property::START_AT, machine.start_at.as_deref())?;
    require_positive(location, property::TIMEOUT_SECONDS, machine.timeout_seconds)?;

    if machine.states.is_empty() {
        return Err(missing(location, property::STATES));
    }

    let mut seen = HashSet::with_capacity(machine.states.len());
    for name in machine.states.names() {
        if name.is_empty() {
            return Err(missing(location, property::STATE_NAME));
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateStateName {
                location: location.state(name),
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

/// Validates the fields of a single state.
pub fn validate_state(location: &Location, state: &State) -> Result<(), ValidationError> {
    match state {
        State::Pass(s) => validate_pass(location, s),
        State::Task(s) => validate_task(location, s),
        State::Wait(s) => validate_wait(location, s),
        State::Choice(s) => validate_choice(location, s),
        State::Succeed(_) => Ok(()),
        State::Fail(s) => validate_fail(location, s),
        State::Parallel(s) => validate_parallel(location, s),
    }
}

fn validate_pass(location: &Location, state: &PassState) -> Result<(), ValidationError> {
    validate_transition(location, state.transition.as_ref())
}

fn validate_task(location: &Location, state: &TaskState) -> Result<(), ValidationError> {
    require_positive(location, property::TIMEOUT_SECONDS, state.timeout_seconds)?;
    require_positive(location, property::HEARTBEAT_SECONDS, state.heartbeat_seconds)?;

    if let (Some(timeout), Some(heartbeat)) = (state.timeout_seconds, state.heartbeat_seconds) {
        if heartbeat > timeout {
            return Err(ValidationError::InvalidNumericRange {
                location: location.clone(),
                field: property::HEARTBEAT_SECONDS,
                reason: format!(
                    "must be smaller than or equal to {} ({} > {})",
                    property::TIMEOUT_SECONDS,
                    heartbeat,
                    timeout
                ),
            });
        }
    }

    require_str(location, property::RESOURCE, state.resource.as_deref())?;
    validate_retriers(location, &state.retriers)?;
    validate_catchers(location, &state.catchers)?;
    validate_transition(location, state.transition.as_ref())
}

fn validate_wait(location: &Location, state: &WaitState) -> Result<(), ValidationError> {
    match &state.wait_for {
        None => return Err(missing(location, property::WAIT_FOR)),
        Some(WaitFor::Seconds(secs)) => {
            require_positive(location, property::SECONDS, Some(*secs))?;
        }
        Some(WaitFor::SecondsPath(path)) => {
            require_str(location, property::SECONDS_PATH, Some(path.as_str()))?;
        }
        Some(WaitFor::Timestamp(timestamp)) => {
            if timestamp.is_none() {
                return Err(missing(location, property::TIMESTAMP));
            }
        }
        Some(WaitFor::TimestampPath(path)) => {
            require_str(location, property::TIMESTAMP_PATH, Some(path.as_str()))?;
        }
    }

    validate_transition(location, state.transition.as_ref())
}

fn validate_choice(location: &Location, state: &ChoiceState) -> Result<(), ValidationError> {
    if state.choices.is_empty() {
        return Err(ValidationError::EmptyChoiceRuleList {
            location: location.clone(),
        });
    }

    if let Some(default) = &state.default_state_name {
        require_str(location, property::DEFAULT, Some(default.as_str()))?;
    }

    for (i, rule) in state.choices.iter().enumerate() {
        let rule_location = location.choice(i);
        require_str(&rule_location, property::NEXT, rule.next.as_deref())?;
        match &rule.condition {
            Some(condition) => validate_condition(&rule_location, condition)?,
            None => return Err(missing(&rule_location, property::CONDITION)),
        }
    }

    Ok(())
}

fn validate_condition(location: &Location, condition: &Condition) -> Result<(), ValidationError> {
    match condition {
        Condition::Comparison(c) => {
            require_str(location, property::VARIABLE, c.variable.as_deref())?;
            // A JSON null literal is treated like an absent value
            match &c.expected {
                None | Some(serde_json::Value::Null) => {
                    Err(missing(location, property::EXPECTED_VALUE))
                }
                Some(_) => Ok(()),
            }
        }
        Condition::And(children) | Condition::Or(children) => {
            if children.is_empty() {
                return Err(missing(location, property::CONDITIONS));
            }
            for child in children {
                validate_condition(location, child)?;
            }
            Ok(())
        }
        Condition::Not(Some(child)) => validate_condition(location, child),
        Condition::Not(None) => Err(missing(location, property::CONDITION)),
    }
}

fn validate_fail(location: &Location, state: &FailState) -> Result<(), ValidationError> {
    require_str(location, property::CAUSE, state.cause.as_deref())
}

fn validate_parallel(location: &Location, state: &ParallelState) -> Result<(), ValidationError> {
    // Branch contents are validated as scopes of their own by the orchestrator
    if state.branches.is_empty() {
        return Err(ValidationError::EmptyBranchList {
            location: location.clone(),
        });
    }

    validate_retriers(location, &state.retriers)?;
    validate_catchers(location, &state.catchers)?;
    validate_transition(location, state.transition.as_ref())
}

fn validate_retriers(location: &Location, retriers: &[Retrier]) -> Result<(), ValidationError> {
    let mut has_retry_all = false;

    for (i, retrier) in retriers.iter().enumerate() {
        let retrier_location = location.retrier(i);
        if has_retry_all {
            return Err(ValidationError::InvalidErrorCodeList {
                location: retrier_location,
                reason: format!("{} must only be used in the last Retrier", error_code::ALL),
            });
        }

        // MaxAttempts may be zero
        if let Some(attempts) = retrier.max_attempts {
            if attempts < 0 {
                return Err(ValidationError::InvalidNumericRange {
                    location: retrier_location,
                    field: property::MAX_ATTEMPTS,
                    reason: format!("must not be negative (got {})", attempts),
                });
            }
        }
        require_positive(
            &retrier_location,
            property::INTERVAL_SECONDS,
            retrier.interval_seconds,
        )?;
        if let Some(rate) = retrier.backoff_rate {
            if rate.is_nan() || rate < 1.0 {
                return Err(ValidationError::InvalidNumericRange {
                    location: retrier_location,
                    field: property::BACKOFF_RATE,
                    reason: format!("must be greater than or equal to 1.0 (got {})", rate),
                });
            }
        }

        has_retry_all = validate_error_equals(&retrier_location, &retrier.error_equals)?;
    }

    Ok(())
}

fn validate_catchers(location: &Location, catchers: &[Catcher]) -> Result<(), ValidationError> {
    let mut has_catch_all = false;

    for (i, catcher) in catchers.iter().enumerate() {
        let catcher_location = location.catcher(i);
        if has_catch_all {
            return Err(ValidationError::InvalidErrorCodeList {
                location: catcher_location,
                reason: format!("{} must only be used in the last Catcher", error_code::ALL),
            });
        }

        require_str(&catcher_location, property::NEXT, catcher.next.as_deref())?;
        has_catch_all = validate_error_equals(&catcher_location, &catcher.error_equals)?;
    }

    Ok(())
}

/// Returns whether the list is the match-all list.
fn validate_error_equals(location: &Location, codes: &[String]) -> Result<bool, ValidationError> {
    if codes.is_empty() {
        return Err(ValidationError::InvalidErrorCodeList {
            location: location.clone(),
            reason: "must not be empty".to_string(),
        });
    }

    if codes.iter().any(|c| error_code::is_match_all(c)) {
        if codes.len() != 1 {
            return Err(ValidationError::InvalidErrorCodeList {
                location: location.clone(),
                reason: format!(
                    "must contain {} as its only error code",
                    error_code::ALL
                ),
            });
        }
        return Ok(true);
    }

    Ok(false)
}

fn validate_transition(
    location: &Location,
    transition: Option<&Transition>,
) -> Result<(), ValidationError> {
    match transition {
        None => Err(missing(location, property::TRANSITION)),
        Some(Transition::Next(name)) => require_str(location, property::NEXT, Some(name.as_str())),
        Some(Transition::End) => Ok(()),
    }
}

fn require_str(
    location: &Location,
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(missing(location, field)),
    }
}

fn require_positive(
    location: &Location,
    field: &'static str,
    value: Option<i64>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if v <= 0 => Err(ValidationError::InvalidNumericRange {
            location: location.clone(),
            field,
            reason: format!("must be positive (got {})", v),
        }),
        _ => Ok(()),
    }
}

fn missing(location: &Location, field: &'static str) -> ValidationError {
    ValidationError::MissingRequiredField {
        location: location.clone(),
        field,
    }
}
