/*!
Resolution: the single left-to-right pass that splits a command line into
path segments, flags, and positional arguments, and finds the node of the
command tree they lead to.

Flags may appear anywhere, interleaved with path segments and arguments.
Everything else is strictly positional: non-flag tokens select children of
the current node until an entry point is reached, and every non-flag token
after that is a positional argument.
 */

use std::ffi::OsStr;

use argtree_parser::{Arg, ArgAccess, ArgumentsParser, Visitor};
use tracing::{debug, trace};

use crate::{
    errors::ArgumentError,
    options::ArityTable,
    tree::{CommandNode, CommandTree},
    util,
};

/// A flag as it appeared on the command line. `value` is `None` for boolean
/// flags, meaning "toggle".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOption {
    pub flag: String,
    pub value: Option<String>,
}

/// The result of resolving a command line against a [`CommandTree`].
#[derive(Debug)]
pub struct Resolution<'t> {
    node: &'t CommandNode,
    consumed: Vec<String>,
    options: Vec<RawOption>,
    positionals: Vec<String>,
    help: bool,
    errors: Vec<ArgumentError>,
    /// Segments consumed when the first unknown segment was found
    unknown_at: Option<usize>,
}

impl<'t> Resolution<'t> {
    /// The node the path segments led to
    #[inline]
    #[must_use]
    pub fn node(&self) -> &'t CommandNode {
        self.node
    }

    /// The path segments that were matched, in order
    #[inline]
    #[must_use]
    pub fn consumed(&self) -> &[String] {
        &self.consumed
    }

    /// Every flag, in command line order
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[RawOption] {
        &self.options
    }

    #[inline]
    #[must_use]
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// True if the first token was a help marker
    #[inline]
    #[must_use]
    pub fn help_requested(&self) -> bool {
        self.help
    }

    /// Problems found while resolving: at most one unknown path segment,
    /// plus any value-taking flag that didn't get its value
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[ArgumentError] {
        &self.errors
    }

    /// The number of segments that had been matched when the first unknown
    /// segment was seen, if one was
    #[inline]
    #[must_use]
    pub fn unknown_at(&self) -> Option<usize> {
        self.unknown_at
    }

    fn push_segment(&mut self, token: String) {
        if self.node.entry_point().is_some() {
            trace!(token = %token, "positional argument");
            self.positionals.push(token);
        } else if let Some(child) = self.node.child(&token) {
            trace!(token = %token, "path segment");
            self.node = child;
            self.consumed.push(token);
        } else if self.unknown_at.is_none() {
            trace!(token = %token, "unknown path segment");
            self.unknown_at = Some(self.consumed.len());
            self.errors.push(ArgumentError::UnknownPath { token });
        }
    }
}

struct Step<'a, 't> {
    resolution: &'a mut Resolution<'t>,
    arity: &'a ArityTable,
}

impl Step<'_, '_> {
    fn flag<'arg>(self, flag: String, access: impl ArgAccess<'arg>) {
        trace!(flag = %flag, "option");

        let resolution = self.resolution;

        match self.arity.takes_argument(&flag) {
            Some(true) => match access.take() {
                Some(value) => resolution.options.push(RawOption {
                    flag,
                    value: Some(value.to_string()),
                }),
                None => resolution.errors.push(ArgumentError::MissingValue(flag)),
            },
            // Flags nobody declared are recorded as booleans; dispatch
            // reports them against the entry point's option set
            Some(false) | None => resolution.options.push(RawOption { flag, value: None }),
        }
    }
}

impl<'arg> Visitor<'arg> for Step<'_, '_> {
    type Value = ();

    fn visit_positional(self, argument: &'arg Arg) {
        self.resolution.push_segment(argument.to_string());
    }

    fn visit_long_option(self, option: &'arg Arg, argument: &'arg Arg) {
        let flag = format!("--{option}");
        trace!(flag = %flag, "option with inline value");

        match self.arity.takes_argument(&flag) {
            Some(false) => self
                .resolution
                .errors
                .push(ArgumentError::UnexpectedValue(flag)),
            Some(true) | None => self.resolution.options.push(RawOption {
                flag,
                value: Some(argument.to_string()),
            }),
        }
    }

    fn visit_long(self, option: &'arg Arg, arg: impl ArgAccess<'arg>) {
        let flag = format!("--{option}");
        self.flag(flag, arg);
    }

    fn visit_short(self, option: u8, arg: impl ArgAccess<'arg>) {
        let flag = format!("-{}", char::from(option));
        self.flag(flag, arg);
    }

    fn visit_non_ascii_short(self, flags: &'arg Arg) {
        // Never a declared alias; kept whole so dispatch names it as typed
        let flag = format!("-{flags}");
        trace!(flag = %flag, "non-ASCII short option");

        self.resolution.options.push(RawOption { flag, value: None });
    }
}

/**
Resolve `args` (excluding the program name) against `tree`. A help marker
as the very first argument is dropped and recorded. This never fails; the
problems it finds are collected in [`Resolution::errors`].
*/
pub fn resolve<'t, S: AsRef<OsStr>>(
    tree: &'t CommandTree,
    arity: &ArityTable,
    args: &[S],
) -> Resolution<'t> {
    let (help, args) = match args.split_first() {
        Some((first, rest)) if first.as_ref().to_str().is_some_and(util::is_help_marker) => {
            (true, rest)
        }
        _ => (false, args),
    };

    let mut resolution = Resolution {
        node: tree.root(),
        consumed: Vec::new(),
        options: Vec::new(),
        positionals: Vec::new(),
        help,
        errors: Vec::new(),
        unknown_at: None,
    };

    let mut parser = ArgumentsParser::new(args.iter().map(|arg| arg.as_ref().as_encoded_bytes()));

    while let Some(()) = parser.next_arg(Step {
        resolution: &mut resolution,
        arity,
    }) {}

    debug!(
        path = ?resolution.consumed,
        entry_point = resolution.node.entry_point().is_some(),
        positionals = resolution.positionals.len(),
        options = resolution.options.len(),
        errors = resolution.errors.len(),
        help,
        "resolved command line"
    );

    resolution
}
