//! # statecheck-core
//!
//! Validation engine for statecheck.
//!
//! This crate provides:
//! - Per-state field validation
//! - Restricted path syntax validation
//! - Transition target resolution
//! - Termination (reachability) analysis
//! - Orchestration over nested parallel branches
//!
//! Validation is a pure function of the definition: it performs no I/O and
//! stops at the first violation found.

pub mod config;
pub mod error;
pub mod fields;
pub mod location;
pub mod path;
pub mod property;
pub mod reachability;
pub mod transitions;
pub mod validator;

pub use config::{ConfigError, DiagnosticStyle, ValidatorConfig};
pub use error::{ErrorKind, ValidationError};
pub use location::Location;
pub use path::{validate_path, PathMode, PathSyntaxError};
pub use validator::{validate, StateMachineValidator};
