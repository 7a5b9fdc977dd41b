//! State kinds and their policies.

use crate::condition::ChoiceRule;
use crate::machine::Branch;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

/// How a state continues once it has finished.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Continue with the named state of the same scope.
    Next(String),
    /// Terminate the enclosing scope.
    End,
}

impl Transition {
    pub fn next(name: impl Into<String>) -> Self {
        Transition::Next(name.into())
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Transition::End)
    }

    /// Returns the target state name for a `Next` transition.
    pub fn target(&self) -> Option<&str> {
        match self {
            Transition::Next(name) => Some(name),
            Transition::End => None,
        }
    }
}

/// Discriminant of [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Pass,
    Task,
    Wait,
    Choice,
    Succeed,
    Fail,
    Parallel,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Pass => "Pass",
            StateKind::Task => "Task",
            StateKind::Wait => "Wait",
            StateKind::Choice => "Choice",
            StateKind::Succeed => "Succeed",
            StateKind::Fail => "Fail",
            StateKind::Parallel => "Parallel",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a workflow graph.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Pass(PassState),
    Task(TaskState),
    Wait(WaitState),
    Choice(ChoiceState),
    Succeed(SucceedState),
    Fail(FailState),
    Parallel(ParallelState),
}

impl State {
    pub fn kind(&self) -> StateKind {
        match self {
            State::Pass(_) => StateKind::Pass,
            State::Task(_) => StateKind::Task,
            State::Wait(_) => StateKind::Wait,
            State::Choice(_) => StateKind::Choice,
            State::Succeed(_) => StateKind::Succeed,
            State::Fail(_) => StateKind::Fail,
            State::Parallel(_) => StateKind::Parallel,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            State::Pass(s) => s.comment.as_deref(),
            State::Task(s) => s.comment.as_deref(),
            State::Wait(s) => s.comment.as_deref(),
            State::Choice(s) => s.comment.as_deref(),
            State::Succeed(s) => s.comment.as_deref(),
            State::Fail(s) => s.comment.as_deref(),
            State::Parallel(s) => s.comment.as_deref(),
        }
    }

    /// Returns the input path. Fail states never have one.
    pub fn input_path(&self) -> Option<&str> {
        match self {
            State::Pass(s) => s.input_path.as_deref(),
            State::Task(s) => s.input_path.as_deref(),
            State::Wait(s) => s.input_path.as_deref(),
            State::Choice(s) => s.input_path.as_deref(),
            State::Succeed(s) => s.input_path.as_deref(),
            State::Parallel(s) => s.input_path.as_deref(),
            State::Fail(_) => None,
        }
    }

    /// Returns the output path. Fail states never have one.
    pub fn output_path(&self) -> Option<&str> {
        match self {
            State::Pass(s) => s.output_path.as_deref(),
            State::Task(s) => s.output_path.as_deref(),
            State::Wait(s) => s.output_path.as_deref(),
            State::Choice(s) => s.output_path.as_deref(),
            State::Succeed(s) => s.output_path.as_deref(),
            State::Parallel(s) => s.output_path.as_deref(),
            State::Fail(_) => None,
        }
    }

    /// Returns the `Next`/`End` transition of kinds that carry one.
    ///
    /// Choice, Succeed and Fail states never do; a continuing kind whose
    /// transition was never set also returns `None`.
    pub fn transition(&self) -> Option<&Transition> {
        match self {
            State::Pass(s) => s.transition.as_ref(),
            State::Task(s) => s.transition.as_ref(),
            State::Wait(s) => s.transition.as_ref(),
            State::Parallel(s) => s.transition.as_ref(),
            State::Choice(_) | State::Succeed(_) | State::Fail(_) => None,
        }
    }
}

/// Passes its input to its output, optionally injecting a fixed result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassState {
    pub comment: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub result_path: Option<String>,
    pub result: Option<Value>,
    pub transition: Option<Transition>,
}

impl PassState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_next(mut self, name: impl Into<String>) -> Self {
        self.transition = Some(Transition::next(name));
        self
    }

    pub fn with_end(mut self) -> Self {
        self.transition = Some(Transition::End);
        self
    }

    pub fn with_input_path(mut self, path: impl Into<String>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }
}

/// Invokes an external resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskState {
    pub comment: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub result_path: Option<String>,
    /// Opaque identifier of the work to run. Required.
    pub resource: Option<String>,
    pub timeout_seconds: Option<i64>,
    pub heartbeat_seconds: Option<i64>,
    pub retriers: Vec<Retrier>,
    pub catchers: Vec<Catcher>,
    pub transition: Option<Transition>,
}

impl TaskState {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..Self::default()
        }
    }

    pub fn with_next(mut self, name: impl Into<String>) -> Self {
        self.transition = Some(Transition::next(name));
        self
    }

    pub fn with_end(mut self) -> Self {
        self.transition = Some(Transition::End);
        self
    }

    pub fn with_timeout_seconds(mut self, secs: i64) -> Self {
        self.timeout_seconds = Some(secs);
        self
    }

    pub fn with_heartbeat_seconds(mut self, secs: i64) -> Self {
        self.heartbeat_seconds = Some(secs);
        self
    }

    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    pub fn with_retrier(mut self, retrier: Retrier) -> Self {
        self.retriers.push(retrier);
        self
    }

    pub fn with_catcher(mut self, catcher: Catcher) -> Self {
        self.catchers.push(catcher);
        self
    }
}

/// What a wait state waits for. Exactly one strategy per state.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitFor {
    /// A fixed number of seconds.
    Seconds(i64),
    /// A reference path to a number of seconds in the input.
    SecondsPath(String),
    /// An absolute point in time.
    Timestamp(Option<DateTime<Utc>>),
    /// A reference path to a timestamp in the input.
    TimestampPath(String),
}

/// Delays the execution for a time span or until a point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaitState {
    pub comment: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub wait_for: Option<WaitFor>,
    pub transition: Option<Transition>,
}

impl WaitState {
    pub fn new(wait_for: WaitFor) -> Self {
        Self {
            wait_for: Some(wait_for),
            ..Self::default()
        }
    }

    pub fn with_next(mut self, name: impl Into<String>) -> Self {
        self.transition = Some(Transition::next(name));
        self
    }

    pub fn with_end(mut self) -> Self {
        self.transition = Some(Transition::End);
        self
    }
}

/// Branches to one of several states depending on the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceState {
    pub comment: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    /// Rules evaluated in order; the first matching one wins.
    pub choices: Vec<ChoiceRule>,
    /// State to go to when no rule matches.
    pub default_state_name: Option<String>,
}

impl ChoiceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_choice(mut self, rule: ChoiceRule) -> Self {
        self.choices.push(rule);
        self
    }

    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default_state_name = Some(name.into());
        self
    }
}

/// Ends the scope successfully.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SucceedState {
    pub comment: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
}

impl SucceedState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Ends the scope with a failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailState {
    pub comment: Option<String>,
    pub error: Option<String>,
    /// Human readable failure cause. Required.
    pub cause: Option<String>,
}

impl FailState {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: Some(cause.into()),
            ..Self::default()
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Runs several independent branches concurrently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallelState {
    pub comment: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub result_path: Option<String>,
    pub branches: Vec<Branch>,
    pub retriers: Vec<Retrier>,
    pub catchers: Vec<Catcher>,
    pub transition: Option<Transition>,
}

impl ParallelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    pub fn with_next(mut self, name: impl Into<String>) -> Self {
        self.transition = Some(Transition::next(name));
        self
    }

    pub fn with_end(mut self) -> Self {
        self.transition = Some(Transition::End);
        self
    }

    pub fn with_retrier(mut self, retrier: Retrier) -> Self {
        self.retriers.push(retrier);
        self
    }

    pub fn with_catcher(mut self, catcher: Catcher) -> Self {
        self.catchers.push(catcher);
        self
    }
}

/// Automatic retry policy for matching errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrier {
    pub error_equals: Vec<String>,
    pub interval_seconds: Option<i64>,
    pub max_attempts: Option<i64>,
    pub backoff_rate: Option<f64>,
}

impl Retrier {
    pub const DEFAULT_INTERVAL_SECONDS: i64 = 1;
    pub const DEFAULT_MAX_ATTEMPTS: i64 = 3;
    pub const DEFAULT_BACKOFF_RATE: f64 = 2.0;

    pub fn new<I, S>(error_equals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            error_equals: error_equals.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_interval_seconds(mut self, secs: i64) -> Self {
        self.interval_seconds = Some(secs);
        self
    }

    pub fn with_max_attempts(mut self, attempts: i64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_backoff_rate(mut self, rate: f64) -> Self {
        self.backoff_rate = Some(rate);
        self
    }

    /// Interval before the first retry, in seconds.
    pub fn effective_interval_seconds(&self) -> i64 {
        self.interval_seconds
            .unwrap_or(Self::DEFAULT_INTERVAL_SECONDS)
    }

    pub fn effective_max_attempts(&self) -> i64 {
        self.max_attempts.unwrap_or(Self::DEFAULT_MAX_ATTEMPTS)
    }

    pub fn effective_backoff_rate(&self) -> f64 {
        self.backoff_rate.unwrap_or(Self::DEFAULT_BACKOFF_RATE)
    }
}

/// Routes matching errors to another state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catcher {
    pub error_equals: Vec<String>,
    pub result_path: Option<String>,
    /// Target state. Required.
    pub next: Option<String>,
}

impl Catcher {
    pub fn new<I, S>(error_equals: I, next: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            error_equals: error_equals.into_iter().map(Into::into).collect(),
            result_path: None,
            next: Some(next.into()),
        }
    }

    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }
}

impl From<PassState> for State {
    fn from(s: PassState) -> Self {
        State::Pass(s)
    }
}

impl From<TaskState> for State {
    fn from(s: TaskState) -> Self {
        State::Task(s)
    }
}

impl From<WaitState> for State {
    fn from(s: WaitState) -> Self {
        State::Wait(s)
    }
}

impl From<ChoiceState> for State {
    fn from(s: ChoiceState) -> Self {
        State::Choice(s)
    }
}

impl From<SucceedState> for State {
    fn from(s: SucceedState) -> Self {
        State::Succeed(s)
    }
}

impl From<FailState> for State {
    fn from(s: FailState) -> Self {
        State::Fail(s)
    }
}

impl From<ParallelState> for State {
    fn from(s: ParallelState) -> Self {
        State::Parallel(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_code;

    #[test]
    fn test_transition_target() {
        assert_eq!(Transition::next("A").target(), Some("A"));
        assert_eq!(Transition::End.target(), None);
        assert!(Transition::End.is_end());
    }

    #[test]
    fn test_only_continuing_kinds_have_transitions() {
        let pass: State = PassState::new().with_end().into();
        assert!(pass.transition().is_some());

        let choice: State = ChoiceState::new().with_default("A").into();
        assert!(choice.transition().is_none());

        let fail: State = FailState::new("boom").into();
        assert!(fail.transition().is_none());
        assert_eq!(fail.kind(), StateKind::Fail);
    }

    #[test]
    fn test_retrier_defaults() {
        let retrier = Retrier::new([error_code::ALL]);
        assert_eq!(retrier.effective_interval_seconds(), 1);
        assert_eq!(retrier.effective_max_attempts(), 3);
        assert_eq!(retrier.effective_backoff_rate(), 2.0);

        let retrier = retrier.with_max_attempts(0).with_backoff_rate(1.5);
        assert_eq!(retrier.effective_max_attempts(), 0);
        assert_eq!(retrier.effective_backoff_rate(), 1.5);
    }

    #[test]
    fn test_common_accessors() {
        let state: State = PassState::new()
            .with_input_path("$.in")
            .with_output_path("$.out")
            .with_end()
            .into();
        assert_eq!(state.input_path(), Some("$.in"));
        assert_eq!(state.output_path(), Some("$.out"));
        assert_eq!(state.comment(), None);
        assert_eq!(state.kind().to_string(), "Pass");
    }
}
