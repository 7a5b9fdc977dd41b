//! Locations of diagnostics inside a definition.
//!
//! A location is the chain of scopes, states and sub-structures leading to
//! the offending element, e.g. `Root.States[Fan].Branches[0].States[Work].Retriers[1]`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    State(String),
    Branch(usize),
    Choice(usize),
    Retrier(usize),
    Catcher(usize),
}

/// Position of an element inside a state machine definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    segments: Vec<Segment>,
}

impl Location {
    /// The top-level definition.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn state(&self, name: impl Into<String>) -> Self {
        self.child(Segment::State(name.into()))
    }

    pub fn branch(&self, index: usize) -> Self {
        self.child(Segment::Branch(index))
    }

    pub fn choice(&self, index: usize) -> Self {
        self.child(Segment::Choice(index))
    }

    pub fn retrier(&self, index: usize) -> Self {
        self.child(Segment::Retrier(index))
    }

    pub fn catcher(&self, index: usize) -> Self {
        self.child(Segment::Catcher(index))
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Returns the innermost state name, if the location is inside a state.
    pub fn state_name(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|s| match s {
            Segment::State(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Number of parallel branches between the root and this location.
    pub fn branch_depth(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Branch(_)))
            .count()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Root")?;
        for segment in &self.segments {
            match segment {
                Segment::State(name) => write!(f, ".States[{}]", name)?,
                Segment::Branch(i) => write!(f, ".Branches[{}]", i)?,
                Segment::Choice(i) => write!(f, ".Choices[{}]", i)?,
                Segment::Retrier(i) => write!(f, ".Retriers[{}]", i)?,
                Segment::Catcher(i) => write!(f, ".Catchers[{}]", i)?,
            }
        }
        Ok(())
    }
}
