/*!
Entry points: the invocable commands at the leaves of the command tree, and
the [`Invocation`] their handlers receive.
 */

use std::{collections::HashSet, fmt, sync::Arc};

use crate::{
    errors::{AccessError, DeclarationError},
    impls::{Choice, FromValue},
    options::{OptionSet, Options},
    tree::CommandPath,
    value::{Value, ValueType, coerce},
};

/// The behavior bound to an entry point.
pub type Handler = Arc<dyn Fn(&Invocation) -> anyhow::Result<()> + Send + Sync>;

/// The declaration of one positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    pub value_type: ValueType,
    pub description: String,

    /// A literal coerced when the entry point is built. Once one argument
    /// has a default, every later argument must have one too.
    pub default: Option<String>,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            description: String::new(),
            default: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }
}

/// Everything needed to register one command.
#[derive(Clone)]
pub struct EntryPointDecl {
    /// Space-separated segments, or [`CommandPath::ROOT`]
    pub path: String,
    pub arguments: Vec<ArgumentSpec>,

    /// The name of the option set this command accepts, if any
    pub options: Option<String>,

    /// Free text shown under the usage line
    pub help: String,
    pub handler: Handler,
}

impl EntryPointDecl {
    pub fn new(
        path: impl Into<String>,
        handler: impl Fn(&Invocation) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            arguments: Vec::new(),
            options: None,
            help: String::new(),
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn options(mut self, set: impl Into<String>) -> Self {
        self.options = Some(set.into());
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

impl fmt::Debug for EntryPointDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPointDecl")
            .field("path", &self.path)
            .field("arguments", &self.arguments)
            .field("options", &self.options)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

/// A validated positional argument, with its default already coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDef {
    spec: ArgumentSpec,
    default: Option<Value>,
}

impl ArgumentDef {
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &ArgumentSpec {
        &self.spec
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    #[inline]
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// A built, immutable command.
pub struct EntryPoint {
    path: CommandPath,
    arguments: Vec<ArgumentDef>,
    options: Option<Arc<OptionSet>>,
    help: String,
    handler: Handler,
}

impl EntryPoint {
    /**
    Validate a declaration. `options` is the already built option set named
    by `decl.options`. Argument names must be unique, defaults must be
    trailing, and every default must coerce to its argument's type.
     */
    pub fn build(
        decl: EntryPointDecl,
        path: CommandPath,
        options: Option<Arc<OptionSet>>,
    ) -> Result<Self, DeclarationError> {
        let mut seen = HashSet::new();
        let mut defaulted = false;

        let arguments = decl
            .arguments
            .into_iter()
            .map(|spec| {
                if !seen.insert(spec.name.clone()) {
                    return Err(DeclarationError::DuplicateArgument {
                        path: path.to_string(),
                        argument: spec.name,
                    });
                }

                let default = match spec.default {
                    None if defaulted => {
                        return Err(DeclarationError::DefaultNotTrailing {
                            path: path.to_string(),
                            argument: spec.name,
                        });
                    }
                    None => None,
                    Some(ref literal) => {
                        defaulted = true;
                        Some(coerce(literal, &spec.value_type, &spec.name).map_err(|err| {
                            DeclarationError::InvalidDefault {
                                owner: path.to_string(),
                                name: spec.name.clone(),
                                message: err.to_string(),
                            }
                        })?)
                    }
                };

                Ok(ArgumentDef { spec, default })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            path,
            arguments,
            options,
            help: decl.help,
            handler: decl.handler,
        })
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &[ArgumentDef] {
        &self.arguments
    }

    /// The number of arguments that must be given on the command line
    #[must_use]
    pub fn required_count(&self) -> usize {
        self.arguments
            .iter()
            .take_while(|argument| argument.default.is_none())
            .count()
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> Option<&OptionSet> {
        self.options.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Run the handler. Its error, if any, is returned untouched.
    pub fn invoke(&self, invocation: &Invocation) -> anyhow::Result<()> {
        (self.handler)(invocation)
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("path", &self.path)
            .field("arguments", &self.arguments)
            .field("options", &self.options.as_ref().map(|set| set.name()))
            .finish_non_exhaustive()
    }
}

/**
A fully validated call to an entry point: every declared argument has a
value (given or defaulted), and the options value has had every flag
applied.

Names without dashes refer to positional arguments; `--long` names refer to
options.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    path: CommandPath,
    arguments: Vec<(String, Value)>,
    options: Option<Options>,
}

impl Invocation {
    pub(crate) fn new(
        path: CommandPath,
        arguments: Vec<(String, Value)>,
        options: Option<Options>,
    ) -> Self {
        Self {
            path,
            arguments,
            options,
        }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    /// Every argument, in declaration order
    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &[(String, Value)] {
        &self.arguments
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> Option<&Options> {
        self.options.as_ref()
    }

    /// The raw value of an argument or option
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        match name.starts_with('-') {
            true => self.options.as_ref()?.value(name),
            false => self
                .arguments
                .iter()
                .find(|(argument, _)| argument == name)
                .map(|(_, value)| value),
        }
    }

    /// The typed value of an argument or option
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, AccessError> {
        if name.starts_with('-') {
            return self
                .options
                .as_ref()
                .ok_or_else(|| AccessError::Unknown(name.to_owned()))?
                .get(name);
        }

        let value = self
            .value(name)
            .ok_or_else(|| AccessError::Unknown(name.to_owned()))?;

        T::from_value(value).ok_or_else(|| AccessError::WrongType {
            name: name.to_owned(),
            expected: T::EXPECTED,
            found: value.kind().to_owned(),
        })
    }

    /// The state of a boolean option. `false` if the command has no such
    /// option.
    #[must_use]
    pub fn flag(&self, long: &str) -> bool {
        self.options
            .as_ref()
            .is_some_and(|options| options.flag(long))
    }

    /// The value of an enum-typed argument or option, as a Rust enum
    pub fn choice<T: Choice>(&self, name: &str) -> Result<T, AccessError> {
        let value = self
            .value(name)
            .ok_or_else(|| AccessError::Absent(name.to_owned()))?;

        T::from_value(value).ok_or_else(|| AccessError::WrongType {
            name: name.to_owned(),
            expected: T::NAME,
            found: value.kind().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::IntKind;

    fn build(decl: EntryPointDecl) -> Result<EntryPoint, DeclarationError> {
        let path = CommandPath::parse(&decl.path)?;
        EntryPoint::build(decl, path, None)
    }

    fn noop() -> EntryPointDecl {
        EntryPointDecl::new("build", |_| Ok(()))
    }

    #[test]
    fn defaults_are_coerced_at_build_time() {
        let entry = build(
            noop()
                .argument(ArgumentSpec::new("name", ValueType::String))
                .argument(ArgumentSpec::new("count", ValueType::Int(IntKind::I32)).default("1")),
        )
        .unwrap();

        assert_eq!(entry.required_count(), 1);
        assert_eq!(entry.arguments()[1].default(), Some(&Value::Integer(1)));
    }

    #[test]
    fn defaults_must_be_trailing() {
        let err = build(
            noop()
                .argument(ArgumentSpec::new("a", ValueType::String).default("x"))
                .argument(ArgumentSpec::new("b", ValueType::String)),
        )
        .unwrap_err();

        assert_eq!(
            err,
            DeclarationError::DefaultNotTrailing {
                path: "build".to_owned(),
                argument: "b".to_owned()
            }
        );
    }

    #[test]
    fn invalid_default_literal() {
        let err = build(
            noop().argument(ArgumentSpec::new("count", ValueType::Int(IntKind::U8)).default("-1")),
        )
        .unwrap_err();

        assert!(matches!(err, DeclarationError::InvalidDefault { .. }));
    }

    #[test]
    fn duplicate_argument_names() {
        let err = build(
            noop()
                .argument(ArgumentSpec::new("x", ValueType::String))
                .argument(ArgumentSpec::new("x", ValueType::Bool)),
        )
        .unwrap_err();

        assert!(matches!(err, DeclarationError::DuplicateArgument { .. }));
    }

    #[test]
    fn invocation_accessors() {
        let invocation = Invocation::new(
            CommandPath::parse("build").unwrap(),
            vec![
                ("name".to_owned(), Value::String("proj".to_owned())),
                ("count".to_owned(), Value::Integer(3)),
            ],
            None,
        );

        assert_eq!(invocation.get::<String>("name"), Ok("proj".to_owned()));
        assert_eq!(invocation.get::<u32>("count"), Ok(3));
        assert!(!invocation.flag("--verbose"));
        assert!(matches!(
            invocation.get::<bool>("name"),
            Err(AccessError::WrongType { .. })
        ));
        assert_eq!(
            invocation.get::<String>("missing"),
            Err(AccessError::Unknown("missing".to_owned()))
        );
        assert_eq!(
            invocation.get::<bool>("--verbose"),
            Err(AccessError::Unknown("--verbose".to_owned()))
        );
    }
}
