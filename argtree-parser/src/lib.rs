#![no_std]

/*!
Low-level implementation of argument handling. Takes care of distinctions
between flags, options, and positionals, and of expanding stacked short flags
like `-abc`. No type handling happens here, and the tokenizer never decides
on its own whether a flag takes a value; that knowledge belongs to whoever
implements [`Visitor`]. Usually this is too low level to use directly.
*/

mod arg;

use ::core::marker::PhantomData;

pub use arg::Arg;

/**
The [`ArgumentsParser`] type operates by passing arguments it finds into a
[`Visitor`], to be handled.
 */
pub trait Visitor<'arg> {
    type Value;

    /// A non-flag argument. Whether it's a path segment or a positional
    /// argument is up to the visitor.
    fn visit_positional(self, argument: &'arg Arg) -> Self::Value;

    /// A long option that definitely has an argument, because it was given
    /// as `--option=argument`
    fn visit_long_option(self, option: &'arg Arg, argument: &'arg Arg) -> Self::Value;

    /// A long option or flag, such as `--option`
    fn visit_long(self, option: &'arg Arg, arg: impl ArgAccess<'arg>) -> Self::Value;

    /// A short option or flag, such as `-o`. Each character of a stacked
    /// `-abc` is visited separately.
    fn visit_short(self, option: u8, arg: impl ArgAccess<'arg>) -> Self::Value;

    /// A short flag token containing non-ASCII text, such as `-é`. It's
    /// visited whole, without the leading dash, and never takes a value.
    fn visit_non_ascii_short(self, flags: &'arg Arg) -> Self::Value;
}

/**
[`ArgAccess`] allows a visitor to decide if a given parameter needs an argument,
based on the identity of the flag or option.

Consider `--foo bar`. Is this a pair of parameters (the flag `--foo` and the
positional parameter `bar`) or a single option `--foo bar` that takes an
argument? The [`ArgumentsParser`] can't independently classify a given
argument, so instead, a visitor can request an argument via this trait only for
options that need them.

Stacked short flags are stricter than most parsers: in `-abc`, only `c` may
take a value, and that value is always the *next* command line argument. The
[`ArgAccess`] handed to `a` and `b` never yields anything.
*/
pub trait ArgAccess<'arg>: Sized {
    /**
    Get an argument from the parser. This should only be called by options that
    need it; flags should simply ignore it, to ensure that the next command
    line argument can correctly be parsed independently.

    This returns [`None`] if all of the CLI arguments have been exhausted, if
    the option is in the middle of a stack of short flags, or if there are
    known to only be positional parameters remaining (because a raw `--` was
    parsed at some point).
    */
    fn take(self) -> Option<&'arg Arg>;
}

#[derive(Debug, Clone)]
enum State<'arg> {
    Ready,
    PositionalOnly,
    /// The rest of a `-abc` stack; never empty
    StackInProgress(&'arg [u8]),
}

/**
An `ArgumentsParser` is the main entry point into `argtree_parser`. It parses
arguments in each call to `next_arg`, sending those arguments to the given
[`Visitor`]. It handles distinguishing flags, options, and positionals; logic
related to how flags get their argument values, and the `--` separator.

Arguments are consumed as they're parsed: a value taken through
[`ArgAccess::take`] is removed from the stream and will never be visited
on its own.

[argtree-parser][crate] operates entirely on borrowed data. The ubiquitous
`'arg` lifetime refers to this borrowed command line data.
*/
#[derive(Debug, Clone)]
pub struct ArgumentsParser<'arg, I> {
    state: State<'arg>,
    args: I,
}

impl<'arg, I> ArgumentsParser<'arg, I>
where
    I: Iterator<Item = &'arg [u8]>,
{
    /**
    Create a new [`ArgumentsParser`] from an iterator of byte slices, where
    each byte slice is a single argument received from the command line. This
    list should *exclude* the name of the program, which is commonly passed as
    the first argument in the list.
     */
    #[inline]
    #[must_use]
    pub fn new(args: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            state: State::Ready,
            args: args.into_iter(),
        }
    }

    /// True once a raw `--` has been seen; every remaining argument will be
    /// visited as a positional.
    #[inline]
    #[must_use]
    pub fn positional_only(&self) -> bool {
        matches!(self.state, State::PositionalOnly)
    }

    /// Put `self` into a `PositionalOnly` state, then process a positional
    /// argument
    #[inline]
    fn positional_only_arg<V>(&mut self, visitor: V) -> Option<V::Value>
    where
        V: Visitor<'arg>,
    {
        debug_assert!(!matches!(self.state, State::StackInProgress(_)));

        self.state = State::PositionalOnly;
        self.args
            .next()
            .map(Arg::new)
            .map(|arg| visitor.visit_positional(arg))
    }

    /// Put `self` into a `Ready` state, then return a StandardArgAccess
    #[inline]
    fn standard_arg(&mut self) -> StandardArgAccess<'_, 'arg, I> {
        debug_assert!(!matches!(self.state, State::PositionalOnly));

        self.state = State::Ready;
        StandardArgAccess { parent: self }
    }

    /// Handle one character of a `-abc` short flag stack. The last character
    /// is the only one allowed to take the next argument; everything before
    /// it gets an access that never yields a value.
    #[inline]
    fn handle_short<V>(&mut self, option: u8, rest: &'arg [u8], visitor: V) -> V::Value
    where
        V: Visitor<'arg>,
    {
        match rest {
            [] => visitor.visit_short(option, self.standard_arg()),
            rest => {
                self.state = State::StackInProgress(rest);
                visitor.visit_short(
                    option,
                    StackedArgAccess {
                        phantom: PhantomData,
                    },
                )
            }
        }
    }

    pub fn next_arg<V>(&mut self, visitor: V) -> Option<V::Value>
    where
        V: Visitor<'arg>,
    {
        match self.state {
            State::Ready => match self.args.next()? {
                b"--" => self.positional_only_arg(visitor),
                argument => Some(match argument {
                    [b'-', b'-', option @ ..] => {
                        let option = Arg::new(option);

                        match option.split_value() {
                            Some((option, argument)) => visitor.visit_long_option(option, argument),
                            None => visitor.visit_long(option, self.standard_arg()),
                        }
                    }
                    [b'-', flags @ ..] if !flags.is_ascii() => {
                        visitor.visit_non_ascii_short(Arg::new(flags))
                    }
                    [b'-', option, rest @ ..] => self.handle_short(*option, rest, visitor),
                    positional => visitor.visit_positional(Arg::new(positional)),
                }),
            },
            State::PositionalOnly => self.positional_only_arg(visitor),
            State::StackInProgress(stack) => match stack {
                [option, rest @ ..] => Some(self.handle_short(*option, rest, visitor)),
                [] => {
                    self.state = State::Ready;
                    self.next_arg(visitor)
                }
            },
        }
    }
}

/// ArgAccess implementation that gets the next argument from the list.
/// Handles logic around `--` PositionalOnly parameters.
struct StandardArgAccess<'a, 'arg, I> {
    parent: &'a mut ArgumentsParser<'arg, I>,
}

impl<'arg, I> ArgAccess<'arg> for StandardArgAccess<'_, 'arg, I>
where
    I: Iterator<Item = &'arg [u8]>,
{
    fn take(self) -> Option<&'arg Arg> {
        match self.parent.args.next()? {
            b"--" if !matches!(self.parent.state, State::PositionalOnly) => {
                self.parent.state = State::PositionalOnly;
                None
            }
            arg => Some(Arg::new(arg)),
        }
    }
}

/// ArgAccess implementation for a short flag that isn't the last one in its
/// stack. It can't take a value: `-ab 5` gives `5` to `b`, never to `a`.
struct StackedArgAccess<'arg> {
    phantom: PhantomData<&'arg Arg>,
}

impl<'arg> ArgAccess<'arg> for StackedArgAccess<'arg> {
    #[inline(always)]
    fn take(self) -> Option<&'arg Arg> {
        None
    }
}
