//! Transition target resolution.
//!
//! Every name a state can move to must be declared in the same scope.
//! Branches of a parallel state are scopes of their own and cannot refer to
//! sibling or outer states.

use crate::error::ValidationError;
use crate::location::Location;
use statecheck_model::{State, StateMachine};
use std::collections::HashSet;

/// Returns every state name `state` may hand control to, including
/// catcher targets.
pub fn outgoing_targets(state: &State) -> Vec<&str> {
    match state {
        State::Pass(s) => s.transition.iter().filter_map(|t| t.target()).collect(),
        State::Wait(s) => s.transition.iter().filter_map(|t| t.target()).collect(),
        State::Task(s) => s
            .transition
            .iter()
            .filter_map(|t| t.target())
            .chain(s.catchers.iter().filter_map(|c| c.next.as_deref()))
            .collect(),
        State::Parallel(s) => s
            .transition
            .iter()
            .filter_map(|t| t.target())
            .chain(s.catchers.iter().filter_map(|c| c.next.as_deref()))
            .collect(),
        State::Choice(s) => s
            .choices
            .iter()
            .filter_map(|rule| rule.next.as_deref())
            .chain(s.default_state_name.as_deref())
            .collect(),
        State::Succeed(_) | State::Fail(_) => Vec::new(),
    }
}

/// Checks that `StartAt` and every transition target of one scope name a
/// state of that scope.
///
/// An unknown `StartAt` is reported at the scope's own location, so the
/// error carries no state name. Every other unknown target is reported at
/// the state that refers to it.
pub fn resolve_transitions(
    location: &Location,
    machine: &StateMachine,
) -> Result<(), ValidationError> {
    let names: HashSet<&str> = machine.states.names().collect();

    if let Some(start_at) = machine.start_at.as_deref() {
        if !names.contains(start_at) {
            return Err(ValidationError::UnknownTransitionTarget {
                location: location.clone(),
                target: start_at.to_string(),
            });
        }
    }

    for (name, state) in machine.states.iter() {
        for target in outgoing_targets(state) {
            if !names.contains(target) {
                return Err(ValidationError::UnknownTransitionTarget {
                    location: location.state(name),
                    target: target.to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use statecheck_model::{
        Branch, Catcher, ChoiceRule, ChoiceState, Condition, ParallelState, PassState,
        SucceedState, TaskState,
    };

    fn unknown_target(result: Result<(), ValidationError>) -> Option<(Option<String>, String)> {
        match result {
            Err(ValidationError::UnknownTransitionTarget { location, target }) => {
                Some((location.state_name().map(str::to_string), target))
            }
            _ => None,
        }
    }

    #[test]
    fn test_all_targets_resolve() {
        let machine = StateMachine::new("Start")
            .with_state("Start", PassState::new().with_next("Choose"))
            .with_state(
                "Choose",
                ChoiceState::new()
                    .with_choice(ChoiceRule::new(Condition::string_equals("$.a", "x"), "Work"))
                    .with_default("Done"),
            )
            .with_state(
                "Work",
                TaskState::new("resource")
                    .with_catcher(Catcher::new(["States.ALL"], "Done"))
                    .with_next("Done"),
            )
            .with_state("Done", SucceedState::new());

        assert!(resolve_transitions(&Location::root(), &machine).is_ok());
    }

    #[test]
    fn test_unknown_start_at() {
        let machine = StateMachine::new("Foo").with_state("Initial", SucceedState::new());
        assert_eq!(
            unknown_target(resolve_transitions(&Location::root(), &machine)),
            Some((None, "Foo".to_string()))
        );
    }

    #[test]
    fn test_unknown_next() {
        let machine = StateMachine::new("A").with_state("A", PassState::new().with_next("B"));
        assert_eq!(
            unknown_target(resolve_transitions(&Location::root(), &machine)),
            Some((Some("A".to_string()), "B".to_string()))
        );
    }

    #[test]
    fn test_unknown_choice_targets() {
        let rule_target = StateMachine::new("C")
            .with_state(
                "C",
                ChoiceState::new()
                    .with_choice(ChoiceRule::new(Condition::string_equals("$.a", "x"), "Nope"))
                    .with_default("Done"),
            )
            .with_state("Done", SucceedState::new());
        assert_eq!(
            unknown_target(resolve_transitions(&Location::root(), &rule_target)),
            Some((Some("C".to_string()), "Nope".to_string()))
        );

        let default_target = StateMachine::new("C")
            .with_state(
                "C",
                ChoiceState::new()
                    .with_choice(ChoiceRule::new(Condition::string_equals("$.a", "x"), "Done"))
                    .with_default("Missing"),
            )
            .with_state("Done", SucceedState::new());
        assert_eq!(
            unknown_target(resolve_transitions(&Location::root(), &default_target)),
            Some((Some("C".to_string()), "Missing".to_string()))
        );
    }

    #[test]
    fn test_unknown_catcher_target() {
        let machine = StateMachine::new("Work").with_state(
            "Work",
            TaskState::new("resource")
                .with_catcher(Catcher::new(["Foo"], "Recover"))
                .with_end(),
        );
        assert_eq!(
            unknown_target(resolve_transitions(&Location::root(), &machine)),
            Some((Some("Work".to_string()), "Recover".to_string()))
        );
    }

    #[test]
    fn test_resolution_is_local_to_scope() {
        // The branch refers to a state of the outer scope
        let branch = Branch::new(
            StateMachine::new("Inner").with_state("Inner", PassState::new().with_next("Done")),
        );
        let machine = StateMachine::new("Fan")
            .with_state("Fan", ParallelState::new().with_branch(branch).with_next("Done"))
            .with_state("Done", SucceedState::new());

        // The outer scope resolves on its own
        assert!(resolve_transitions(&Location::root(), &machine).is_ok());

        let branch_machine = match machine.states.get("Fan") {
            Some(State::Parallel(p)) => &p.branches[0].machine,
            _ => unreachable!(),
        };
        let branch_location = Location::root().state("Fan").branch(0);
        assert_eq!(
            unknown_target(resolve_transitions(&branch_location, branch_machine)),
            Some((Some("Inner".to_string()), "Done".to_string()))
        );
    }

    #[test]
    fn test_outgoing_targets() {
        let state: State = ChoiceState::new()
            .with_choice(ChoiceRule::new(Condition::string_equals("$.a", "x"), "A"))
            .with_choice(ChoiceRule::new(Condition::string_equals("$.a", "y"), "B"))
            .with_default("C")
            .into();
        assert_eq!(outgoing_targets(&state), vec!["A", "B", "C"]);

        let state: State = PassState::new().with_end().into();
        assert!(outgoing_targets(&state).is_empty());
    }
}
