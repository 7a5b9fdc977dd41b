//! Choice rules and the condition language they use.
//!
//! Conditions form a tree:
//!
//! - `Comparison` - compares the value at a reference path with a literal
//! - `And` / `Or` - combine one or more child conditions
//! - `Not` - negates exactly one child condition

use serde_json::Value;
use std::fmt;

/// Comparison operators supported by choice rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    StringEquals,
    StringLessThan,
    StringGreaterThan,
    StringLessThanEquals,
    StringGreaterThanEquals,
    NumericEquals,
    NumericLessThan,
    NumericGreaterThan,
    NumericLessThanEquals,
    NumericGreaterThanEquals,
    BooleanEquals,
    TimestampEquals,
    TimestampLessThan,
    TimestampGreaterThan,
    TimestampLessThanEquals,
    TimestampGreaterThanEquals,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::StringEquals => "StringEquals",
            ComparisonOperator::StringLessThan => "StringLessThan",
            ComparisonOperator::StringGreaterThan => "StringGreaterThan",
            ComparisonOperator::StringLessThanEquals => "StringLessThanEquals",
            ComparisonOperator::StringGreaterThanEquals => "StringGreaterThanEquals",
            ComparisonOperator::NumericEquals => "NumericEquals",
            ComparisonOperator::NumericLessThan => "NumericLessThan",
            ComparisonOperator::NumericGreaterThan => "NumericGreaterThan",
            ComparisonOperator::NumericLessThanEquals => "NumericLessThanEquals",
            ComparisonOperator::NumericGreaterThanEquals => "NumericGreaterThanEquals",
            ComparisonOperator::BooleanEquals => "BooleanEquals",
            ComparisonOperator::TimestampEquals => "TimestampEquals",
            ComparisonOperator::TimestampLessThan => "TimestampLessThan",
            ComparisonOperator::TimestampGreaterThan => "TimestampGreaterThan",
            ComparisonOperator::TimestampLessThanEquals => "TimestampLessThanEquals",
            ComparisonOperator::TimestampGreaterThanEquals => "TimestampGreaterThanEquals",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf condition: `variable <operator> expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Reference path to the value under test. Required.
    pub variable: Option<String>,
    pub operator: ComparisonOperator,
    /// Literal to compare against. Required; JSON `null` counts as missing.
    pub expected: Option<Value>,
}

/// A choice rule condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Comparison(Comparison),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    /// Holds `None` when the negated condition was never supplied.
    Not(Option<Box<Condition>>),
}

impl Condition {
    pub fn compare(
        variable: impl Into<String>,
        operator: ComparisonOperator,
        expected: impl Into<Value>,
    ) -> Self {
        Condition::Comparison(Comparison {
            variable: Some(variable.into()),
            operator,
            expected: Some(expected.into()),
        })
    }

    /// Shorthand for a `StringEquals` comparison.
    pub fn string_equals(variable: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::compare(
            variable,
            ComparisonOperator::StringEquals,
            Value::String(expected.into()),
        )
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::And(conditions)
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Or(conditions)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Some(Box::new(condition)))
    }
}

/// One rule of a choice state.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceRule {
    /// Required.
    pub condition: Option<Condition>,
    /// Target state when the condition matches. Required.
    pub next: Option<String>,
}

impl ChoiceRule {
    pub fn new(condition: Condition, next: impl Into<String>) -> Self {
        Self {
            condition: Some(condition),
            next: Some(next.into()),
        }
    }
}
