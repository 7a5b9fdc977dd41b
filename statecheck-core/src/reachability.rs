//! Termination analysis for a single scope.
//!
//! At validation time the branch a choice state will take is unknown, so a
//! scope is accepted as soon as *some* execution from `StartAt` can reach a
//! terminal state. Cycles are fine as long as one of their states offers an
//! exit.
//!
//! The scope is turned into an index-based graph: one node per state, one
//! edge per `Next` target, one edge per choice rule and one for the choice
//! default. Terminal nodes are states with an `End` transition plus every
//! Succeed and Fail state. The set of nodes that can terminate is the least
//! fixed point of "terminal, or has an edge into the set", computed with a
//! breadth-first walk over the reversed edges starting from the terminal
//! nodes.
//!
//! Parallel branches are not part of this graph. They are checked as scopes
//! of their own by the orchestrator; in the enclosing scope a parallel state
//! is an ordinary node with a single `Next`/`End`.

use crate::config::DiagnosticStyle;
use crate::error::ValidationError;
use crate::location::Location;
use statecheck_model::{State, StateKind, StateMap, StateMachine, Transition};
use std::collections::{HashMap, VecDeque};

/// Transition graph of one scope.
#[derive(Debug)]
pub struct ScopeGraph<'a> {
    names: Vec<&'a str>,
    kinds: Vec<StateKind>,
    terminal: Vec<bool>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    handlers: Vec<Vec<usize>>,
    index: HashMap<&'a str, usize>,
}

impl<'a> ScopeGraph<'a> {
    /// Builds the graph of a scope. Targets that do not resolve are skipped.
    pub fn build(states: &'a StateMap) -> Self {
        let mut index = HashMap::with_capacity(states.len());
        for (i, name) in states.names().enumerate() {
            // Duplicates resolve to the first declaration, like StateMap::get
            index.entry(name).or_insert(i);
        }

        let mut graph = Self {
            names: Vec::with_capacity(states.len()),
            kinds: Vec::with_capacity(states.len()),
            terminal: Vec::with_capacity(states.len()),
            successors: vec![Vec::new(); states.len()],
            predecessors: vec![Vec::new(); states.len()],
            handlers: vec![Vec::new(); states.len()],
            index,
        };

        for (i, (name, state)) in states.iter().enumerate() {
            graph.names.push(name);
            graph.kinds.push(state.kind());
            graph.terminal.push(is_terminal(state));

            for target in edge_targets(state) {
                if let Some(&j) = graph.index.get(target) {
                    graph.successors[i].push(j);
                    graph.predecessors[j].push(i);
                }
            }
            for target in catcher_targets(state) {
                if let Some(&j) = graph.index.get(target) {
                    graph.handlers[i].push(j);
                }
            }
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name(&self, node: usize) -> &'a str {
        self.names[node]
    }

    pub fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    pub fn is_terminal(&self, node: usize) -> bool {
        self.terminal[node]
    }

    /// Returns whether the node can fan out into more than one path.
    pub fn is_branching(&self, node: usize) -> bool {
        matches!(self.kinds[node], StateKind::Choice | StateKind::Parallel)
    }

    /// Computes, for every node, whether some path from it reaches a
    /// terminal node.
    pub fn can_terminate(&self) -> Vec<bool> {
        let mut can = self.terminal.clone();
        let mut queue: VecDeque<usize> = (0..self.len()).filter(|&n| can[n]).collect();

        while let Some(node) = queue.pop_front() {
            for &pred in &self.predecessors[node] {
                if !can[pred] {
                    can[pred] = true;
                    queue.push_back(pred);
                }
            }
        }

        can
    }

    /// Computes, for every node, whether it is reachable from `start`.
    /// Catcher targets are followed only when `follow_catchers` is set.
    pub fn reachable_from(&self, start: usize, follow_catchers: bool) -> Vec<bool> {
        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::new();
        seen[start] = true;
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            let handlers: &[usize] = if follow_catchers {
                self.handlers[node].as_slice()
            } else {
                &[]
            };
            for &next in self.successors[node].iter().chain(handlers) {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }

        seen
    }
}

fn is_terminal(state: &State) -> bool {
    match state {
        State::Succeed(_) | State::Fail(_) => true,
        State::Choice(_) => false,
        State::Pass(_) | State::Task(_) | State::Wait(_) | State::Parallel(_) => {
            matches!(state.transition(), Some(Transition::End))
        }
    }
}

/// Targets that count as graph edges. Catcher targets are excluded.
fn edge_targets(state: &State) -> Vec<&str> {
    match state {
        State::Choice(s) => s
            .choices
            .iter()
            .filter_map(|rule| rule.next.as_deref())
            .chain(s.default_state_name.as_deref())
            .collect(),
        State::Succeed(_) | State::Fail(_) => Vec::new(),
        State::Pass(_) | State::Task(_) | State::Wait(_) | State::Parallel(_) => {
            state.transition().and_then(Transition::target).into_iter().collect()
        }
    }
}

fn catcher_targets(state: &State) -> Vec<&str> {
    let catchers = match state {
        State::Task(s) => &s.catchers,
        State::Parallel(s) => &s.catchers,
        State::Pass(_) | State::Wait(_) | State::Choice(_) | State::Succeed(_) | State::Fail(_) => {
            return Vec::new()
        }
    };
    catchers.iter().filter_map(|c| c.next.as_deref()).collect()
}

/// Checks that `StartAt` of the scope can reach a terminal state.
pub fn check_termination(
    location: &Location,
    machine: &StateMachine,
    style: DiagnosticStyle,
) -> Result<(), ValidationError> {
    let graph = ScopeGraph::build(&machine.states);
    let start = match machine.start_at.as_deref().and_then(|s| graph.index_of(s)) {
        Some(start) => start,
        // Resolution has already rejected an unknown StartAt
        None => return Ok(()),
    };

    let can_terminate = graph.can_terminate();
    tracing::trace!(
        "{}: {} of {} states can terminate",
        location,
        can_terminate.iter().filter(|&&c| c).count(),
        graph.len()
    );

    if can_terminate[start] {
        return Ok(());
    }

    if style == DiagnosticStyle::Split {
        if let Some(at) = pure_cycle_entry(&graph, start) {
            return Err(ValidationError::CycleDetected {
                location: location.state(graph.name(at)),
            });
        }
    }

    Err(ValidationError::NoTerminalPath {
        location: location.state(graph.name(start)),
    })
}

/// If everything reachable from `start` is a single deterministic chain,
/// returns the node at which the chain first loops back on itself.
fn pure_cycle_entry(graph: &ScopeGraph<'_>, start: usize) -> Option<usize> {
    let reachable = graph.reachable_from(start, false);
    if (0..graph.len()).any(|n| reachable[n] && graph.is_branching(n)) {
        return None;
    }

    let mut visited = vec![false; graph.len()];
    let mut node = start;
    loop {
        if visited[node] {
            return Some(node);
        }
        visited[node] = true;
        node = *graph.successors(node).first()?;
    }
}

/// Returns the states of a scope that cannot be reached from `StartAt`, in
/// declaration order. A state entered only through a catcher is reachable.
pub fn unreachable_states(machine: &StateMachine) -> Vec<&str> {
    let graph = ScopeGraph::build(&machine.states);
    let start = match machine.start_at.as_deref().and_then(|s| graph.index_of(s)) {
        Some(start) => start,
        None => return Vec::new(),
    };

    let reachable = graph.reachable_from(start, true);
    (0..graph.len())
        .filter(|&n| !reachable[n])
        .map(|n| graph.name(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use statecheck_model::{
        Branch, Catcher, ChoiceRule, ChoiceState, Condition, FailState, ParallelState, PassState,
        SucceedState, TaskState,
    };

    fn eq(next: &str) -> ChoiceRule {
        ChoiceRule::new(Condition::string_equals("$.foo", "bar"), next)
    }

    fn check(machine: &StateMachine) -> Result<(), ValidationError> {
        check_termination(&Location::root(), machine, DiagnosticStyle::Split)
    }

    #[test]
    fn test_single_terminal_state() {
        let machine = StateMachine::new("Initial").with_state("Initial", SucceedState::new());
        assert!(check(&machine).is_ok());
    }

    #[test]
    fn test_fail_state_counts_as_terminal() {
        let machine = StateMachine::new("A")
            .with_state("A", PassState::new().with_next("B"))
            .with_state("B", FailState::new("boom"));
        assert!(check(&machine).is_ok());
    }

    #[test]
    fn test_two_state_cycle() {
        let machine = StateMachine::new("A")
            .with_state("A", PassState::new().with_next("B"))
            .with_state("B", PassState::new().with_next("A"));

        match check(&machine) {
            Err(ValidationError::CycleDetected { location }) => {
                assert_eq!(location.state_name(), Some("A"));
            }
            other => panic!("expected CycleDetected, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_entered_after_prefix() {
        let machine = StateMachine::new("Init")
            .with_state("Init", TaskState::new("r").with_next("Loop1"))
            .with_state("Loop1", PassState::new().with_next("Loop2"))
            .with_state("Loop2", PassState::new().with_next("Loop1"));

        match check(&machine) {
            Err(ValidationError::CycleDetected { location }) => {
                assert_eq!(location.state_name(), Some("Loop1"));
            }
            other => panic!("expected CycleDetected, got {:?}", other),
        }
    }

    #[test]
    fn test_self_loop() {
        let machine = StateMachine::new("A").with_state("A", PassState::new().with_next("A"));
        assert!(matches!(
            check(&machine),
            Err(ValidationError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_choice_with_exit() {
        let machine = StateMachine::new("Initial")
            .with_state("Initial", PassState::new().with_next("Choice"))
            .with_state(
                "Choice",
                ChoiceState::new()
                    .with_choice(eq("Initial"))
                    .with_choice(eq("Done")),
            )
            .with_state("Done", SucceedState::new());
        assert!(check(&machine).is_ok());
    }

    #[test]
    fn test_choice_with_exit_through_default() {
        let machine = StateMachine::new("Initial")
            .with_state("Initial", PassState::new().with_next("Choice"))
            .with_state(
                "Choice",
                ChoiceState::new()
                    .with_default("Default")
                    .with_choice(eq("Initial"))
                    .with_choice(eq("Default")),
            )
            .with_state("Default", PassState::new().with_end());
        assert!(check(&machine).is_ok());
    }

    #[test]
    fn test_choice_with_only_cycles() {
        let machine = StateMachine::new("Initial")
            .with_state("Initial", PassState::new().with_next("Choice"))
            .with_state(
                "Choice",
                ChoiceState::new()
                    .with_default("Default")
                    .with_choice(eq("Initial"))
                    .with_choice(eq("Default")),
            )
            .with_state("Default", PassState::new().with_next("Choice"));

        match check(&machine) {
            Err(ValidationError::NoTerminalPath { location }) => {
                assert_eq!(location.state_name(), Some("Initial"));
            }
            other => panic!("expected NoTerminalPath, got {:?}", other),
        }
    }

    #[test]
    fn test_choice_with_closed_cycle_and_exit() {
        // One rule leads into a closed loop, the other terminates
        let machine = StateMachine::new("Initial")
            .with_state("Initial", PassState::new().with_next("Choice"))
            .with_state(
                "Choice",
                ChoiceState::new()
                    .with_default("Terminal")
                    .with_choice(eq("Terminal"))
                    .with_choice(eq("NonTerminal")),
            )
            .with_state("Terminal", PassState::new().with_end())
            .with_state("NonTerminal", PassState::new().with_next("Cyclic"))
            .with_state("Cyclic", PassState::new().with_next("NonTerminal"));
        assert!(check(&machine).is_ok());
    }

    #[test]
    fn test_nested_choices_with_path_out() {
        let machine = StateMachine::new("Initial")
            .with_state("Initial", PassState::new().with_next("ChoiceOne"))
            .with_state(
                "ChoiceOne",
                ChoiceState::new()
                    .with_default("DefaultOne")
                    .with_choice(eq("ChoiceTwo")),
            )
            .with_state("DefaultOne", SucceedState::new())
            .with_state(
                "ChoiceTwo",
                ChoiceState::new()
                    .with_default("DefaultTwo")
                    .with_choice(eq("ChoiceOne")),
            )
            .with_state("DefaultTwo", PassState::new().with_next("ChoiceTwo"));
        assert!(check(&machine).is_ok());
    }

    #[test]
    fn test_parallel_node_uses_own_transition() {
        // The branch itself never terminates; that is the orchestrator's
        // concern, not part of this graph
        let branch = Branch::new(
            StateMachine::new("X")
                .with_state("X", PassState::new().with_next("Y"))
                .with_state("Y", PassState::new().with_next("X")),
        );
        let machine = StateMachine::new("Fan")
            .with_state("Fan", ParallelState::new().with_branch(branch).with_next("Done"))
            .with_state("Done", SucceedState::new());
        assert!(check(&machine).is_ok());
    }

    #[test]
    fn test_parallel_in_loop_reports_no_terminal_path() {
        let branch = Branch::new(StateMachine::new("X").with_state("X", SucceedState::new()));
        let machine = StateMachine::new("Fan")
            .with_state("Fan", ParallelState::new().with_branch(branch).with_next("Again"))
            .with_state("Again", PassState::new().with_next("Fan"));
        assert!(matches!(
            check(&machine),
            Err(ValidationError::NoTerminalPath { .. })
        ));
    }

    #[test]
    fn test_unified_diagnostics() {
        let machine = StateMachine::new("A")
            .with_state("A", PassState::new().with_next("B"))
            .with_state("B", PassState::new().with_next("A"));
        let result = check_termination(&Location::root(), &machine, DiagnosticStyle::Unified);
        assert!(matches!(result, Err(ValidationError::NoTerminalPath { .. })));
    }

    #[test]
    fn test_unreachable_states() {
        let machine = StateMachine::new("A")
            .with_state("Orphan", PassState::new().with_next("A"))
            .with_state("A", PassState::new().with_next("B"))
            .with_state("B", SucceedState::new())
            .with_state("Island", SucceedState::new());
        assert_eq!(unreachable_states(&machine), vec!["Orphan", "Island"]);
        // Dead states do not affect termination
        assert!(check(&machine).is_ok());
    }

    #[test]
    fn test_catcher_target_is_reachable() {
        let machine = StateMachine::new("Work")
            .with_state(
                "Work",
                TaskState::new("r")
                    .with_catcher(Catcher::new(["States.ALL"], "Recover"))
                    .with_end(),
            )
            .with_state("Recover", FailState::new("gave up"));
        assert!(unreachable_states(&machine).is_empty());

        let graph = ScopeGraph::build(&machine.states);
        assert_eq!(graph.reachable_from(0, false), vec![true, false]);
        assert_eq!(graph.reachable_from(0, true), vec![true, true]);
    }

    #[test]
    fn test_graph_indices() {
        let machine = StateMachine::new("A")
            .with_state("A", PassState::new().with_next("B"))
            .with_state("B", SucceedState::new());
        let graph = ScopeGraph::build(&machine.states);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.index_of("B"), Some(1));
        assert_eq!(graph.successors(0), &[1]);
        assert!(graph.is_terminal(1));
        assert!(!graph.is_terminal(0));
        assert_eq!(graph.can_terminate(), vec![true, true]);
    }

    /// Shape of a generated state: index targets are taken modulo the
    /// number of states.
    #[derive(Debug, Clone)]
    enum Shape {
        Next(usize),
        End,
        Succeed,
        Choice(Vec<usize>),
    }

    fn shape() -> impl Strategy<Value = Shape> {
        prop_oneof![
            4 => any::<usize>().prop_map(Shape::Next),
            1 => Just(Shape::End),
            1 => Just(Shape::Succeed),
            2 => prop::collection::vec(any::<usize>(), 1..4).prop_map(Shape::Choice),
        ]
    }

    fn to_state(shape: &Shape, n: usize) -> State {
        let name = |i: usize| format!("S{}", i % n);
        match shape {
            Shape::Next(t) => PassState::new().with_next(name(*t)).into(),
            Shape::End => PassState::new().with_end().into(),
            Shape::Succeed => SucceedState::new().into(),
            Shape::Choice(targets) => targets
                .iter()
                .fold(ChoiceState::new(), |c, t| c.with_choice(eq(&name(*t))))
                .into(),
        }
    }

    /// Builds the machine declaring states in the given order.
    fn build(shapes: &[Shape], order: &[usize]) -> StateMachine {
        let n = shapes.len();
        order.iter().fold(StateMachine::new("S0"), |m, &i| {
            m.with_state(format!("S{}", i), to_state(&shapes[i], n))
        })
    }

    /// Naive fixed point: iterate until nothing changes.
    fn naive_can_terminate(machine: &StateMachine) -> HashMap<String, bool> {
        let mut can: HashMap<String, bool> = machine
            .states
            .iter()
            .map(|(name, state)| (name.to_string(), is_terminal(state)))
            .collect();

        let mut changed = true;
        while changed {
            changed = false;
            for (name, state) in machine.states.iter() {
                if !can[name] && edge_targets(state).iter().any(|t| can[*t]) {
                    can.insert(name.to_string(), true);
                    changed = true;
                }
            }
        }
        can
    }

    proptest! {
        #[test]
        fn prop_outcome_independent_of_declaration_order(
            (shapes, order) in prop::collection::vec(shape(), 1..8)
                .prop_flat_map(|shapes| {
                    let n = shapes.len();
                    (Just(shapes), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
                })
        ) {
            let in_order: Vec<usize> = (0..shapes.len()).collect();
            let declared = build(&shapes, &in_order);
            let shuffled = build(&shapes, &order);

            prop_assert_eq!(check(&declared).is_ok(), check(&shuffled).is_ok());
        }

        #[test]
        fn prop_matches_naive_fixed_point(shapes in prop::collection::vec(shape(), 1..8)) {
            let order: Vec<usize> = (0..shapes.len()).collect();
            let machine = build(&shapes, &order);

            let graph = ScopeGraph::build(&machine.states);
            let fast = graph.can_terminate();
            let naive = naive_can_terminate(&machine);

            for node in 0..graph.len() {
                prop_assert_eq!(fast[node], naive[graph.name(node)]);
            }
        }
    }
}
