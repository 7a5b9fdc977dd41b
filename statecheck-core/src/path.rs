//! Path syntax validation.
//!
//! Paths address locations inside the JSON document flowing through a
//! state. Every path starts with the root marker `$` followed by zero or more
//! segments:
//!
//! - `.name` - child field
//! - `['name']` / `["name"]` - quoted child field
//! - `[0]` - array index
//!
//! General paths (`InputPath`, `OutputPath`) additionally accept:
//!
//! - `.*` / `[*]` - wildcard
//! - `..name` - deep scan
//! - `[1:5]`, `[::2]` - slices
//! - `[0,2]`, `['a','b']` - unions
//! - `[?(@.price < 10)]` - filter expressions
//! - `[(@.length-1)]` - script expressions
//!
//! Reference paths (`ResultPath`, `Variable`, `SecondsPath`, ...) must
//! address a single location, so they accept only the first three forms.
//!
//! Only the syntax is checked; the data a path would select is never
//! examined.

use crate::error::ValidationError;
use crate::location::Location;
use crate::property;
use statecheck_model::{Catcher, Condition, State, WaitFor};
use std::fmt;
use thiserror::Error;

/// Which path dialect a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathMode {
    General,
    Reference,
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathMode::General => f.write_str("JSON"),
            PathMode::Reference => f.write_str("reference"),
        }
    }
}

/// Why a path failed to parse. Positions are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathSyntaxError {
    #[error("path is empty")]
    Empty,

    #[error("path must start with '$'")]
    MissingRoot,

    #[error("empty segment at position {position}")]
    EmptySegment { position: usize },

    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar { position: usize, found: char },

    #[error("unterminated bracket starting at position {position}")]
    UnterminatedBracket { position: usize },

    #[error("invalid bracket expression at position {position}")]
    InvalidBracket { position: usize },

    #[error("{construct} is not allowed in a reference path (position {position})")]
    NotAllowed {
        position: usize,
        construct: &'static str,
    },
}

/// Validates an optional path. An absent path is always valid.
pub fn validate_path(path: Option<&str>, mode: PathMode) -> Result<(), PathSyntaxError> {
    match path {
        Some(path) => PathParser::new(path, mode).parse(),
        None => Ok(()),
    }
}

/// Checks the syntax of every path a state carries, including the paths
/// nested in its catchers and choice conditions.
pub fn validate_state_paths(location: &Location, state: &State) -> Result<(), ValidationError> {
    check(location, property::INPUT_PATH, state.input_path(), PathMode::General)?;
    check(location, property::OUTPUT_PATH, state.output_path(), PathMode::General)?;

    match state {
        State::Pass(s) => check(
            location,
            property::RESULT_PATH,
            s.result_path.as_deref(),
            PathMode::Reference,
        ),
        State::Task(s) => {
            check(
                location,
                property::RESULT_PATH,
                s.result_path.as_deref(),
                PathMode::Reference,
            )?;
            check_catchers(location, &s.catchers)
        }
        State::Parallel(s) => {
            check(
                location,
                property::RESULT_PATH,
                s.result_path.as_deref(),
                PathMode::Reference,
            )?;
            check_catchers(location, &s.catchers)
        }
        State::Wait(s) => match &s.wait_for {
            Some(WaitFor::SecondsPath(path)) => check(
                location,
                property::SECONDS_PATH,
                Some(path.as_str()),
                PathMode::Reference,
            ),
            Some(WaitFor::TimestampPath(path)) => check(
                location,
                property::TIMESTAMP_PATH,
                Some(path.as_str()),
                PathMode::Reference,
            ),
            Some(WaitFor::Seconds(_)) | Some(WaitFor::Timestamp(_)) | None => Ok(()),
        },
        State::Choice(s) => {
            for (i, rule) in s.choices.iter().enumerate() {
                if let Some(condition) = &rule.condition {
                    check_condition(&location.choice(i), condition)?;
                }
            }
            Ok(())
        }
        State::Succeed(_) | State::Fail(_) => Ok(()),
    }
}

fn check_catchers(location: &Location, catchers: &[Catcher]) -> Result<(), ValidationError> {
    for (i, catcher) in catchers.iter().enumerate() {
        check(
            &location.catcher(i),
            property::RESULT_PATH,
            catcher.result_path.as_deref(),
            PathMode::Reference,
        )?;
    }
    Ok(())
}

fn check_condition(location: &Location, condition: &Condition) -> Result<(), ValidationError> {
    match condition {
        Condition::Comparison(c) => check(
            location,
            property::VARIABLE,
            c.variable.as_deref(),
            PathMode::Reference,
        ),
        Condition::And(children) | Condition::Or(children) => {
            for child in children {
                check_condition(location, child)?;
            }
            Ok(())
        }
        Condition::Not(Some(child)) => check_condition(location, child),
        Condition::Not(None) => Ok(()),
    }
}

fn check(
    location: &Location,
    field: &'static str,
    path: Option<&str>,
    mode: PathMode,
) -> Result<(), ValidationError> {
    validate_path(path, mode).map_err(|source| ValidationError::InvalidPathSyntax {
        location: location.clone(),
        field,
        path: path.unwrap_or_default().to_string(),
        mode,
        source,
    })
}

/// Recursive descent parser for path expressions.
struct PathParser<'a> {
    input: &'a str,
    mode: PathMode,
    pos: usize,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str, mode: PathMode) -> Self {
        Self {
            input,
            mode,
            pos: 0,
        }
    }

    fn parse(&mut self) -> Result<(), PathSyntaxError> {
        if self.input.is_empty() {
            return Err(PathSyntaxError::Empty);
        }
        if self.peek_char() != Some('$') {
            return Err(PathSyntaxError::MissingRoot);
        }
        self.pos += 1;

        while let Some(c) = self.peek_char() {
            match c {
                '.' => self.parse_dot_segment()?,
                '[' => self.parse_bracket_segment()?,
                found => {
                    return Err(PathSyntaxError::UnexpectedChar {
                        position: self.pos,
                        found,
                    })
                }
            }
        }

        Ok(())
    }

    fn parse_dot_segment(&mut self) -> Result<(), PathSyntaxError> {
        let start = self.pos;

        if self.peek_str("..") {
            self.reject_in_reference(start, "deep scan")?;
            self.pos += 2;
        } else {
            self.pos += 1;
        }

        if self.peek_char() == Some('*') {
            self.reject_in_reference(self.pos, "wildcard")?;
            self.pos += 1;
            return Ok(());
        }

        let name_start = self.pos;
        while let Some(c) = self.peek_char() {
            match c {
                '.' | '[' => break,
                ']' => {
                    return Err(PathSyntaxError::UnexpectedChar {
                        position: self.pos,
                        found: c,
                    })
                }
                c if c.is_whitespace() => {
                    return Err(PathSyntaxError::UnexpectedChar {
                        position: self.pos,
                        found: c,
                    })
                }
                c => self.pos += c.len_utf8(),
            }
        }

        if self.pos == name_start {
            return Err(PathSyntaxError::EmptySegment { position: start });
        }
        Ok(())
    }

    fn parse_bracket_segment(&mut self) -> Result<(), PathSyntaxError> {
        let open = self.pos;
        self.pos += 1;

        match self.peek_char() {
            None => Err(PathSyntaxError::UnterminatedBracket { position: open }),
            Some(']') => Err(PathSyntaxError::EmptySegment { position: open }),
            Some(q @ ('\'' | '"')) => self.parse_quoted_names(open, q),
            Some('?') => {
                self.reject_in_reference(open, "filter expression")?;
                self.pos += 1;
                if self.peek_char() != Some('(') {
                    return Err(PathSyntaxError::InvalidBracket { position: open });
                }
                self.parse_expression(open)
            }
            Some('(') => {
                self.reject_in_reference(open, "script expression")?;
                self.parse_expression(open)
            }
            Some(_) => self.parse_index_expression(open),
        }
    }

    /// Parses `'a']` or, in general paths, `'a','b']`.
    fn parse_quoted_names(&mut self, open: usize, quote: char) -> Result<(), PathSyntaxError> {
        loop {
            let name = self.parse_quoted(open, quote)?;
            if name.is_empty() {
                return Err(PathSyntaxError::EmptySegment { position: open });
            }

            match self.peek_char() {
                Some(']') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(',') => {
                    self.reject_in_reference(open, "union")?;
                    self.pos += 1;
                    if self.peek_char() != Some(quote) {
                        return Err(PathSyntaxError::InvalidBracket { position: open });
                    }
                }
                Some(found) => {
                    return Err(PathSyntaxError::UnexpectedChar {
                        position: self.pos,
                        found,
                    })
                }
                None => return Err(PathSyntaxError::UnterminatedBracket { position: open }),
            }
        }
    }

    fn parse_quoted(&mut self, open: usize, quote: char) -> Result<&'a str, PathSyntaxError> {
        // Skip the opening quote
        self.pos += 1;
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if c == quote {
                let name = &self.input[start..self.pos];
                self.pos += 1;
                return Ok(name);
            }
            if c == '\\' {
                self.pos += 1;
                match self.peek_char() {
                    Some(escaped) => self.pos += escaped.len_utf8(),
                    None => break,
                }
            } else {
                self.pos += c.len_utf8();
            }
        }

        Err(PathSyntaxError::UnterminatedBracket { position: open })
    }

    /// Parses a parenthesised filter or script body up to and including `]`.
    fn parse_expression(&mut self, open: usize) -> Result<(), PathSyntaxError> {
        // Skip the opening parenthesis
        self.pos += 1;
        let body_start = self.pos;
        let mut depth = 1usize;
        let mut in_quote: Option<char> = None;

        while let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
            match (in_quote, c) {
                (Some(q), c) if c == q => in_quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') => in_quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                (None, _) => {}
            }
        }

        if depth != 0 {
            return Err(PathSyntaxError::UnterminatedBracket { position: open });
        }
        // Body excludes the closing parenthesis
        if self.input[body_start..self.pos - 1].trim().is_empty() {
            return Err(PathSyntaxError::InvalidBracket { position: open });
        }
        if self.peek_char() != Some(']') {
            return Err(PathSyntaxError::InvalidBracket { position: open });
        }
        self.pos += 1;
        Ok(())
    }

    /// Parses `*`, an index, a slice or an index union up to and including `]`.
    fn parse_index_expression(&mut self, open: usize) -> Result<(), PathSyntaxError> {
        let start = self.pos;
        let end = match self.input[start..].find(']') {
            Some(offset) => start + offset,
            None => return Err(PathSyntaxError::UnterminatedBracket { position: open }),
        };
        let body = &self.input[start..end];
        self.pos = end + 1;

        if body == "*" {
            return self.reject_in_reference(open, "wildcard");
        }
        if is_unsigned(body) {
            return Ok(());
        }
        if body.contains(':') {
            self.reject_in_reference(open, "slice")?;
            let parts: Vec<&str> = body.split(':').collect();
            if parts.len() <= 3 && parts.iter().all(|p| p.is_empty() || is_signed(p)) {
                return Ok(());
            }
            return Err(PathSyntaxError::InvalidBracket { position: open });
        }
        if body.contains(',') {
            self.reject_in_reference(open, "union")?;
            if body.split(',').all(|p| is_signed(p.trim())) {
                return Ok(());
            }
            return Err(PathSyntaxError::InvalidBracket { position: open });
        }
        if is_signed(body) {
            return self.reject_in_reference(open, "negative index");
        }

        Err(PathSyntaxError::InvalidBracket { position: open })
    }

    fn reject_in_reference(
        &self,
        position: usize,
        construct: &'static str,
    ) -> Result<(), PathSyntaxError> {
        match self.mode {
            PathMode::Reference => Err(PathSyntaxError::NotAllowed {
                position,
                construct,
            }),
            PathMode::General => Ok(()),
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }
}

fn is_unsigned(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_signed(s: &str) -> bool {
    is_unsigned(s.strip_prefix('-').unwrap_or(s))
}
