/*!
The two error taxonomies of [`argtree`][crate].

[`DeclarationError`]s happen while a [`Cli`][crate::Cli] is being built from
its declarations. They mean the program itself is wrong, and they abort the
build entirely.

[`ArgumentError`]s happen while handling a command line. They're the user's
fault, and they're always collected into an [`ArgumentErrors`] block so that
every problem with an invocation is reported at once.
 */

use std::{fmt, io};

use indent_write::fmt::IndentWriter;
use thiserror::Error;

/// Something is wrong with the declared entry points or option sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DeclarationError {
    /// A path segment doesn't follow the segment grammar, or is reserved
    #[error("name {segment:?} cannot be used as a path segment (in {path:?})")]
    InvalidSegment { path: String, segment: String },

    /// A path runs through a node that's already an entry point
    #[error("path {prefix:?} has a declared entry point, it cannot have sub-paths (declaring {path:?})")]
    ExtendsEntryPoint { path: String, prefix: String },

    /// Two entry points were declared at the same path
    #[error("path {0:?} already has an entry point")]
    DuplicateEntryPoint(String),

    /// An entry point was declared at a path that's already a prefix of
    /// another entry point
    #[error("path {0:?} already has sub-paths, it cannot be an entry point")]
    HasSubPaths(String),

    /// The root entry point was combined with other entry points
    #[error("the root entry point cannot coexist with other entry points (declaring {0:?})")]
    RootConflict(String),

    /// Nothing was declared at all
    #[error("no entry points were declared")]
    NoEntryPoints,

    /// An option's long name doesn't follow the `--name` grammar, or is
    /// reserved
    #[error("{name:?} in option set {set:?} cannot be used as an option name")]
    InvalidOptionName { set: String, name: String },

    /// An option's short alias isn't a single letter
    #[error("{name:?} in option set {set:?} cannot be used as a short alias")]
    InvalidShortAlias { set: String, name: String },

    /// Two options in one (flattened) option set claim the same name
    #[error("name {name:?} is declared more than once in option set {set:?}")]
    DuplicateOption { set: String, name: String },

    /// The same flag name takes a value in one option set and is a boolean
    /// flag in another
    #[error(
        "option {name:?} was defined in two option sets, only one taking an argument \
        (second occurrence in {set:?})"
    )]
    ArityConflict { set: String, name: String },

    /// An entry point or option set refers to an option set that was never
    /// declared
    #[error("option set {0:?} is not declared")]
    UnknownOptionSet(String),

    /// Two option sets share a name
    #[error("option set {0:?} is declared more than once")]
    DuplicateOptionSet(String),

    /// An option set includes itself, directly or through other sets
    #[error("option set {0:?} includes itself")]
    RecursiveOptionSet(String),

    /// Two arguments of one entry point share a name
    #[error("argument {argument:?} of {path:?} is declared more than once")]
    DuplicateArgument { path: String, argument: String },

    /// A required argument follows an argument with a default
    #[error(
        "argument {argument:?} of {path:?} must have a default value, \
        because a previous argument has one"
    )]
    DefaultNotTrailing { path: String, argument: String },

    /// A default value literal doesn't coerce to its declared type
    #[error("invalid default value for {name} in {owner:?}: {message}")]
    InvalidDefault {
        owner: String,
        name: String,
        message: String,
    },
}

/// One problem with a command line. These are collected into
/// [`ArgumentErrors`] rather than returned one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ArgumentError {
    /// A non-flag token didn't match any command at its position
    #[error("Unknown usage - {token}")]
    UnknownPath { token: String },

    /// The arguments stopped at a branch rather than at an entry point
    #[error("Missing command, expected one of {expected}")]
    IncompletePath { expected: String },

    /// A value-taking option had no value, either because the arguments ran
    /// out or because it wasn't last in a `-abc` stack
    #[error("Option {0} requires a value")]
    MissingValue(String),

    /// A boolean flag was given a value with `--flag=value`
    #[error("Option {0} does not take a value")]
    UnexpectedValue(String),

    /// A required positional argument was absent
    #[error("Missing argument for <{0}>")]
    MissingArgument(String),

    /// More positional arguments than the entry point declares
    #[error("Too many arguments given")]
    TooManyArguments,

    #[error("Expected integer value for <{name}>, got '{token}'")]
    ExpectedInteger { name: String, token: String },

    #[error("Expected double value for <{name}>, got '{token}'")]
    ExpectedFloat { name: String, token: String },

    #[error("Expected boolean value for <{name}>, got '{token}'")]
    ExpectedBoolean { name: String, token: String },

    /// The member list is already pipe-joined
    #[error("Expected one of {members} for <{name}>, got '{token}'")]
    ExpectedMember {
        name: String,
        token: String,
        members: String,
    },

    #[error("Cannot resolve path {token}: {message}")]
    UnresolvablePath { token: String, message: String },

    /// A flag that the entry point's option set doesn't know
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// Options were given to an entry point that takes none
    #[error("Unexpected options: {}", .0.join(", "))]
    UnexpectedOptions(Vec<String>),
}

/**
Every [`ArgumentError`] found in one invocation, along with the usage string
that should be shown alongside them.

```text
Invalid arguments:
  Missing argument for <name>
Usage: prog build <name> [count]
```
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentErrors {
    errors: Vec<ArgumentError>,
    usage: String,
}

impl ArgumentErrors {
    pub fn new(errors: Vec<ArgumentError>, usage: impl Into<String>) -> Self {
        Self {
            errors,
            usage: usage.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[ArgumentError] {
        &self.errors
    }

    #[inline]
    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Print the whole block, usage included
    pub fn write_to(&self, out: &mut impl io::Write) -> io::Result<()> {
        writeln!(out, "{self}")
    }
}

impl fmt::Display for ArgumentErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;

        writeln!(f, "Invalid arguments:")?;

        {
            let mut out = IndentWriter::new("  ", &mut *f);
            self.errors
                .iter()
                .try_for_each(|error| writeln!(out, "{error}"))?;
        }

        write!(f, "{}", self.usage)
    }
}

impl std::error::Error for ArgumentErrors {}

/// A handler asked an [`Invocation`][crate::Invocation] or
/// [`Options`][crate::Options] for something it doesn't have. This is a
/// mistake in the handler, not in the command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AccessError {
    #[error("no argument or option named {0:?}")]
    Unknown(String),

    #[error("{0:?} has no value")]
    Absent(String),

    #[error("{name:?} holds {found}, not {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_errors_list_every_message_then_usage() {
        let errors = ArgumentErrors::new(
            vec![
                ArgumentError::MissingArgument("name".to_owned()),
                ArgumentError::UnknownOption("--nope".to_owned()),
            ],
            "Usage: prog build <name> [count]",
        );

        assert_eq!(
            errors.to_string(),
            "Invalid arguments:\n  Missing argument for <name>\n  Unknown option: --nope\n\
            Usage: prog build <name> [count]"
        );
    }

    #[test]
    fn unexpected_options_are_comma_joined() {
        let error = ArgumentError::UnexpectedOptions(vec!["-v".to_owned(), "--jobs".to_owned()]);
        assert_eq!(error.to_string(), "Unexpected options: -v, --jobs");
    }

    #[test]
    fn coercion_messages_match_user_facing_wording() {
        let error = ArgumentError::ExpectedMember {
            name: "level".to_owned(),
            token: "loud".to_owned(),
            members: "LOW|HIGH".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "Expected one of LOW|HIGH for <level>, got 'loud'"
        );
    }
}
