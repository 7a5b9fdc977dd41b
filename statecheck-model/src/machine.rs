//! State machine and branch definitions.

use crate::state::State;

/// Named states of one scope, in declaration order.
///
/// Unlike a map, inserting an existing name keeps both entries, so a
/// definition that declares a name twice can still be represented and
/// rejected by the validator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMap {
    entries: Vec<(String, State)>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a state.
    pub fn insert(&mut self, name: impl Into<String>, state: impl Into<State>) {
        self.entries.push((name.into(), state.into()));
    }

    /// Returns the first state declared under `name`.
    pub fn get(&self, name: &str) -> Option<&State> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &State)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, S> FromIterator<(N, S)> for StateMap
where
    N: Into<String>,
    S: Into<State>,
{
    fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, s)| (n.into(), s.into()))
                .collect(),
        }
    }
}

/// A scope: a start state plus the states it may reach.
///
/// Used both for the top-level definition and for each parallel branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMachine {
    pub comment: Option<String>,
    pub version: Option<String>,
    pub timeout_seconds: Option<i64>,
    /// Name of the first state to run. Required.
    pub start_at: Option<String>,
    pub states: StateMap,
}

impl StateMachine {
    pub fn new(start_at: impl Into<String>) -> Self {
        Self {
            start_at: Some(start_at.into()),
            ..Self::default()
        }
    }

    /// Adds a state, keeping declaration order.
    pub fn with_state(mut self, name: impl Into<String>, state: impl Into<State>) -> Self {
        self.states.insert(name, state);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_timeout_seconds(mut self, secs: i64) -> Self {
        self.timeout_seconds = Some(secs);
        self
    }
}

/// One branch of a parallel state. Owns a complete, independent scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Branch {
    pub comment: Option<String>,
    pub machine: StateMachine,
}

impl Branch {
    pub fn new(machine: StateMachine) -> Self {
        Self {
            comment: None,
            machine,
        }
    }
}

impl From<StateMachine> for Branch {
    fn from(machine: StateMachine) -> Self {
        Branch::new(machine)
    }
}
