//! Validation error types.

use crate::location::Location;
use crate::path::{PathMode, PathSyntaxError};
use std::fmt;
use thiserror::Error;

/// Rule category of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingRequiredField,
    InvalidNumericRange,
    InvalidPathSyntax,
    UnknownTransitionTarget,
    DuplicateStateName,
    InvalidErrorCodeList,
    EmptyChoiceRuleList,
    EmptyBranchList,
    CycleDetected,
    NoTerminalPath,
    NestingTooDeep,
    UnreachableState,
}

impl ErrorKind {
    /// Stable code suitable for machine consumption.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorKind::InvalidNumericRange => "INVALID_NUMERIC_RANGE",
            ErrorKind::InvalidPathSyntax => "INVALID_PATH_SYNTAX",
            ErrorKind::UnknownTransitionTarget => "UNKNOWN_TRANSITION_TARGET",
            ErrorKind::DuplicateStateName => "DUPLICATE_STATE_NAME",
            ErrorKind::InvalidErrorCodeList => "INVALID_ERROR_CODE_LIST",
            ErrorKind::EmptyChoiceRuleList => "EMPTY_CHOICE_RULE_LIST",
            ErrorKind::EmptyBranchList => "EMPTY_BRANCH_LIST",
            ErrorKind::CycleDetected => "CYCLE_DETECTED",
            ErrorKind::NoTerminalPath => "NO_TERMINAL_PATH",
            ErrorKind::NestingTooDeep => "NESTING_TOO_DEEP",
            ErrorKind::UnreachableState => "UNREACHABLE_STATE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single diagnostic returned when a definition is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{location}: {field} is required")]
    MissingRequiredField {
        location: Location,
        field: &'static str,
    },

    #[error("{location}: {field} {reason}")]
    InvalidNumericRange {
        location: Location,
        field: &'static str,
        reason: String,
    },

    #[error("{location}: {field} '{path}' is not a valid {mode} path: {source}")]
    InvalidPathSyntax {
        location: Location,
        field: &'static str,
        path: String,
        mode: PathMode,
        source: PathSyntaxError,
    },

    #[error("{location}: {target} is not a valid state")]
    UnknownTransitionTarget { location: Location, target: String },

    #[error("{location}: duplicate state name '{name}'")]
    DuplicateStateName { location: Location, name: String },

    #[error("{location}: ErrorEquals {reason}")]
    InvalidErrorCodeList { location: Location, reason: String },

    #[error("{location}: Choices must not be empty")]
    EmptyChoiceRuleList { location: Location },

    #[error("{location}: Branches must not be empty")]
    EmptyBranchList { location: Location },

    #[error("{location}: Cycle detected.")]
    CycleDetected { location: Location },

    #[error("{location}: No path to a terminal state exists in the state machine.")]
    NoTerminalPath { location: Location },

    #[error("{location}: nesting depth {depth} exceeds maximum of {max}")]
    NestingTooDeep {
        location: Location,
        depth: usize,
        max: usize,
    },

    #[error("{location}: state is not reachable from StartAt")]
    UnreachableState { location: Location },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            ValidationError::InvalidNumericRange { .. } => ErrorKind::InvalidNumericRange,
            ValidationError::InvalidPathSyntax { .. } => ErrorKind::InvalidPathSyntax,
            ValidationError::UnknownTransitionTarget { .. } => ErrorKind::UnknownTransitionTarget,
            ValidationError::DuplicateStateName { .. } => ErrorKind::DuplicateStateName,
            ValidationError::InvalidErrorCodeList { .. } => ErrorKind::InvalidErrorCodeList,
            ValidationError::EmptyChoiceRuleList { .. } => ErrorKind::EmptyChoiceRuleList,
            ValidationError::EmptyBranchList { .. } => ErrorKind::EmptyBranchList,
            ValidationError::CycleDetected { .. } => ErrorKind::CycleDetected,
            ValidationError::NoTerminalPath { .. } => ErrorKind::NoTerminalPath,
            ValidationError::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
            ValidationError::UnreachableState { .. } => ErrorKind::UnreachableState,
        }
    }

    /// Returns an error code suitable for reporting to callers.
    pub fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn location(&self) -> &Location {
        match self {
            ValidationError::MissingRequiredField { location, .. }
            | ValidationError::InvalidNumericRange { location, .. }
            | ValidationError::InvalidPathSyntax { location, .. }
            | ValidationError::UnknownTransitionTarget { location, .. }
            | ValidationError::DuplicateStateName { location, .. }
            | ValidationError::InvalidErrorCodeList { location, .. }
            | ValidationError::EmptyChoiceRuleList { location }
            | ValidationError::EmptyBranchList { location }
            | ValidationError::CycleDetected { location }
            | ValidationError::NoTerminalPath { location }
            | ValidationError::NestingTooDeep { location, .. }
            | ValidationError::UnreachableState { location } => location,
        }
    }

    /// Name of the state the violation belongs to, if any.
    pub fn state_name(&self) -> Option<&str> {
        self.location().state_name()
    }

    /// Returns the offending field for field-level violations.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingRequiredField { field, .. }
            | ValidationError::InvalidNumericRange { field, .. }
            | ValidationError::InvalidPathSyntax { field, .. } => Some(*field),
            _ => None,
        }
    }
}
