/*!
Option sets: named, flattened collections of `--long`/`-s` flags.

An [`OptionSetDecl`] lists its own [`OptionSpec`]s and the names of the
option sets nested inside it. The [`OptionRegistry`] turns declarations into
built [`OptionSet`]s, merging nested sets and rejecting name collisions. The
[`ArityTable`] records, program-wide, whether each flag name takes a value,
which is what the resolver needs to tokenize a command line before it knows
which entry point it's talking to.

At run time, an [`Options`] value is instantiated from a set's defaults and
then updated by each flag on the command line, in order.
 */

use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry},
    sync::Arc,
};

use tracing::debug;

use crate::{
    errors::{AccessError, ArgumentError, DeclarationError},
    impls::{Choice, FromValue},
    util,
    value::{Value, ValueType, coerce},
};

/// The declaration of a single option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// The long name, including the dashes: `--verbose`
    pub long: String,

    /// The short alias, without the dash
    pub short: Option<char>,

    pub value_type: ValueType,

    pub description: String,

    /// The placeholder shown in help for value-taking options
    pub value_name: String,

    /// A literal that's coerced like a command line token when the set is
    /// built. Boolean options without one default to `false`.
    pub default: Option<String>,
}

impl OptionSpec {
    /// A value-taking option
    pub fn value(long: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            long: long.into(),
            short: None,
            value_type,
            description: String::new(),
            value_name: "value".to_owned(),
            default: None,
        }
    }

    /// A boolean flag, which toggles each time it appears
    pub fn flag(long: impl Into<String>) -> Self {
        Self::value(long, ValueType::Bool)
    }

    #[must_use]
    pub fn short(mut self, alias: char) -> Self {
        self.short = Some(alias);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = value_name.into();
        self
    }

    #[must_use]
    pub fn default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn takes_argument(&self) -> bool {
        self.value_type.takes_argument()
    }

    /// The short alias as a flag, `-v`
    #[must_use]
    pub fn short_flag(&self) -> Option<String> {
        self.short.map(|alias| format!("-{alias}"))
    }
}

/// The declaration of an option set: its own options, plus the names of the
/// option sets nested inside of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSetDecl {
    pub name: String,
    pub options: Vec<OptionSpec>,
    pub nested: Vec<String>,
}

impl OptionSetDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
            nested: Vec::new(),
        }
    }

    #[must_use]
    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    #[must_use]
    pub fn nest(mut self, name: impl Into<String>) -> Self {
        self.nested.push(name.into());
        self
    }
}

/// A validated option, with its default already coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef {
    spec: OptionSpec,
    default: Option<Value>,
}

impl OptionDef {
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &OptionSpec {
        &self.spec
    }

    #[inline]
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/**
A built option set. Every flag name (long and short) in the set, including
those contributed by nested sets, is unique and maps to exactly one option.
*/
#[derive(Debug, Clone)]
pub struct OptionSet {
    name: String,
    options: Vec<OptionDef>,
    nested: Vec<Arc<OptionSet>>,
    /// Every flag name, long or short, mapped to its option's long name
    index: BTreeMap<String, String>,
}

impl OptionSet {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every option, this set's own first, then each nested set's in order
    pub fn options(&self) -> Box<dyn Iterator<Item = &OptionDef> + '_> {
        Box::new(
            self.options
                .iter()
                .chain(self.nested.iter().flat_map(|nested| nested.options())),
        )
    }

    /// Number of options, nested ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.options().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options().next().is_none()
    }

    /// Look up an option by any of its flag names (`--verbose` or `-v`)
    #[must_use]
    pub fn find(&self, flag: &str) -> Option<&OptionDef> {
        let long = self.index.get(flag)?;
        self.options().find(|option| option.spec.long == *long)
    }

    /// Build an options value holding every default, nested sets included
    #[must_use]
    pub fn instantiate(&self) -> Options {
        Options {
            set: self.name.clone(),
            values: self
                .options
                .iter()
                .map(|option| (option.spec.long.clone(), option.default.clone()))
                .collect(),
            nested: self.nested.iter().map(|nested| nested.instantiate()).collect(),
        }
    }

    /**
    Apply one flag from the command line to `options`. Boolean options toggle
    their current value; other options are coerced from `raw`.
     */
    pub fn apply(
        &self,
        options: &mut Options,
        flag: &str,
        raw: Option<&str>,
    ) -> Result<(), ArgumentError> {
        let option = self
            .find(flag)
            .ok_or_else(|| ArgumentError::UnknownOption(flag.to_owned()))?;

        let value = match (&option.spec.value_type, raw) {
            (ValueType::Bool, None) => {
                let current = options
                    .slot(&option.spec.long)
                    .and_then(|slot| slot.as_ref())
                    .and_then(bool::from_value)
                    .unwrap_or(false);

                Value::Bool(!current)
            }
            (ValueType::Bool, Some(_)) => {
                return Err(ArgumentError::UnexpectedValue(flag.to_owned()));
            }
            (_, None) => return Err(ArgumentError::MissingValue(flag.to_owned())),
            (kind, Some(raw)) => coerce(raw, kind, flag)?,
        };

        if let Some(slot) = options.slot_mut(&option.spec.long) {
            *slot = Some(value);
        }

        Ok(())
    }
}

/**
Program-wide table of whether each flag name takes a value. Option sets are
registered as the entry points that use them are registered; the same flag
name may appear in several sets, as long as it's consistently a boolean flag
or consistently a value-taking option.
*/
#[derive(Debug, Clone, Default)]
pub struct ArityTable {
    takes_argument: HashMap<String, bool>,
}

impl ArityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, set: &OptionSet) -> Result<(), DeclarationError> {
        set.options().try_for_each(|option| {
            let takes_argument = option.spec.takes_argument();

            [Some(option.spec.long.clone()), option.spec.short_flag()]
                .into_iter()
                .flatten()
                .try_for_each(|name| match self.takes_argument.entry(name) {
                    Entry::Vacant(entry) => {
                        entry.insert(takes_argument);
                        Ok(())
                    }
                    Entry::Occupied(entry) if *entry.get() == takes_argument => Ok(()),
                    Entry::Occupied(entry) => Err(DeclarationError::ArityConflict {
                        set: set.name.clone(),
                        name: entry.key().clone(),
                    }),
                })
        })
    }

    /// `None` if no registered option set knows this flag
    #[inline]
    #[must_use]
    pub fn takes_argument(&self, flag: &str) -> Option<bool> {
        self.takes_argument.get(flag).copied()
    }
}

/// Collects [`OptionSetDecl`]s and builds them into [`OptionSet`]s, in any
/// order.
#[derive(Debug, Default)]
pub struct OptionRegistry {
    declared: BTreeMap<String, OptionSetDecl>,
    built: HashMap<String, Arc<OptionSet>>,
}

impl OptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, decl: OptionSetDecl) -> Result<(), DeclarationError> {
        if self.declared.contains_key(&decl.name) {
            return Err(DeclarationError::DuplicateOptionSet(decl.name));
        }

        self.declared.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Build every declared set, so that invalid sets are reported even if
    /// no entry point uses them
    pub fn build_all(&mut self) -> Result<(), DeclarationError> {
        let names: Vec<String> = self.declared.keys().cloned().collect();
        names.iter().try_for_each(|name| self.build(name).map(drop))
    }

    /// Build (or fetch the already built) option set called `name`
    pub fn build(&mut self, name: &str) -> Result<Arc<OptionSet>, DeclarationError> {
        self.build_inner(name, &mut Vec::new())
    }

    fn build_inner(
        &mut self,
        name: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Arc<OptionSet>, DeclarationError> {
        if let Some(set) = self.built.get(name) {
            return Ok(Arc::clone(set));
        }

        if visiting.iter().any(|visited| visited == name) {
            return Err(DeclarationError::RecursiveOptionSet(name.to_owned()));
        }

        let decl = self
            .declared
            .get(name)
            .cloned()
            .ok_or_else(|| DeclarationError::UnknownOptionSet(name.to_owned()))?;

        visiting.push(name.to_owned());
        let nested = decl
            .nested
            .iter()
            .map(|nested| self.build_inner(nested, visiting))
            .collect::<Result<Vec<_>, _>>()?;
        visiting.pop();

        let set = Arc::new(assemble(decl, nested)?);
        debug!(set = set.name(), options = set.len(), "built option set");

        self.built.insert(name.to_owned(), Arc::clone(&set));
        Ok(set)
    }
}

/// Validate a declaration's own options and merge them with its already
/// built nested sets.
fn assemble(decl: OptionSetDecl, nested: Vec<Arc<OptionSet>>) -> Result<OptionSet, DeclarationError> {
    let mut index = BTreeMap::new();

    let mut claim = |flag: String, long: &str| match index.entry(flag) {
        std::collections::btree_map::Entry::Vacant(entry) => {
            entry.insert(long.to_owned());
            Ok(())
        }
        std::collections::btree_map::Entry::Occupied(entry) => {
            Err(DeclarationError::DuplicateOption {
                set: decl.name.clone(),
                name: entry.key().clone(),
            })
        }
    };

    let options = decl
        .options
        .iter()
        .map(|spec| {
            if !util::is_long_option_name(&spec.long) {
                return Err(DeclarationError::InvalidOptionName {
                    set: decl.name.clone(),
                    name: spec.long.clone(),
                });
            }

            if let Some(alias) = spec.short
                && !util::is_short_alias(alias)
            {
                return Err(DeclarationError::InvalidShortAlias {
                    set: decl.name.clone(),
                    name: format!("-{alias}"),
                });
            }

            claim(spec.long.clone(), &spec.long)?;
            if let Some(short) = spec.short_flag() {
                claim(short, &spec.long)?;
            }

            let default = match (&spec.default, &spec.value_type) {
                (Some(literal), kind) => Some(coerce(literal, kind, &spec.long).map_err(|err| {
                    DeclarationError::InvalidDefault {
                        owner: decl.name.clone(),
                        name: spec.long.clone(),
                        message: err.to_string(),
                    }
                })?),
                (None, ValueType::Bool) => Some(Value::Bool(false)),
                (None, _) => None,
            };

            Ok(OptionDef {
                spec: spec.clone(),
                default,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    nested
        .iter()
        .flat_map(|set| set.index.iter())
        .try_for_each(|(flag, long)| claim(flag.clone(), long))?;

    Ok(OptionSet {
        name: decl.name,
        options,
        nested,
        index,
    })
}

/**
The options an entry point was invoked with. Values are keyed by long name;
lookups search nested option sets too, and each nested set is also
available on its own through [`nested`][Options::nested].
*/
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    set: String,
    values: Vec<(String, Option<Value>)>,
    nested: Vec<Options>,
}

impl Options {
    /// The name of the option set this value was instantiated from
    #[inline]
    #[must_use]
    pub fn set(&self) -> &str {
        &self.set
    }

    /// The nested options value for the option set called `set`
    #[must_use]
    pub fn nested(&self, set: &str) -> Option<&Options> {
        self.nested.iter().find_map(|nested| match nested.set == set {
            true => Some(nested),
            false => nested.nested(set),
        })
    }

    fn slot(&self, long: &str) -> Option<&Option<Value>> {
        self.values
            .iter()
            .find(|(name, _)| name == long)
            .map(|(_, value)| value)
            .or_else(|| self.nested.iter().find_map(|nested| nested.slot(long)))
    }

    fn slot_mut(&mut self, long: &str) -> Option<&mut Option<Value>> {
        if let Some(index) = self.values.iter().position(|(name, _)| name == long) {
            return Some(&mut self.values[index].1);
        }

        self.nested
            .iter_mut()
            .find_map(|nested| nested.slot_mut(long))
    }

    /// The current value of an option, by long name. `None` if the option
    /// has no value (no default, and absent from the command line) or
    /// doesn't exist.
    #[must_use]
    pub fn value(&self, long: &str) -> Option<&Value> {
        self.slot(long).and_then(Option::as_ref)
    }

    /// The typed value of an option that must have one
    pub fn get<T: FromValue>(&self, long: &str) -> Result<T, AccessError> {
        self.try_get(long)?
            .ok_or_else(|| AccessError::Absent(long.to_owned()))
    }

    /// The typed value of an option, or `None` if it has no value
    pub fn try_get<T: FromValue>(&self, long: &str) -> Result<Option<T>, AccessError> {
        let slot = self
            .slot(long)
            .ok_or_else(|| AccessError::Unknown(long.to_owned()))?;

        slot.as_ref()
            .map(|value| {
                T::from_value(value).ok_or_else(|| AccessError::WrongType {
                    name: long.to_owned(),
                    expected: T::EXPECTED,
                    found: value.kind().to_owned(),
                })
            })
            .transpose()
    }

    /// The state of a boolean flag; `false` for unknown flags
    #[must_use]
    pub fn flag(&self, long: &str) -> bool {
        matches!(self.value(long), Some(Value::Bool(true)))
    }

    /// The value of an enum-typed option, as a Rust enum
    pub fn choice<T: Choice>(&self, long: &str) -> Result<T, AccessError> {
        let value = self
            .slot(long)
            .ok_or_else(|| AccessError::Unknown(long.to_owned()))?
            .as_ref()
            .ok_or_else(|| AccessError::Absent(long.to_owned()))?;

        T::from_value(value).ok_or_else(|| AccessError::WrongType {
            name: long.to_owned(),
            expected: T::NAME,
            found: value.kind().to_owned(),
        })
    }
}
