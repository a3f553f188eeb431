/*!
Dispatch: turning a resolved entry point plus raw strings into a typed
[`Invocation`]. Every problem is collected (arity, coercion, and options
alike) so that one run reports all of them.
 */

use tracing::debug;

use crate::{
    entry::{EntryPoint, Invocation},
    errors::ArgumentError,
    resolve::RawOption,
    value::coerce,
};

/**
Validate `positionals` and `options` against `entry`, producing the
invocation its handler will receive. Missing trailing arguments are filled
in from their defaults; the options value starts from the option set's
defaults and has each flag applied in order.
*/
pub fn dispatch(
    entry: &EntryPoint,
    positionals: &[String],
    options: &[RawOption],
) -> Result<Invocation, Vec<ArgumentError>> {
    let declared = entry.arguments();
    let mut errors = Vec::new();

    errors.extend(
        declared
            .iter()
            .take(entry.required_count())
            .skip(positionals.len())
            .map(|argument| ArgumentError::MissingArgument(argument.name().to_owned())),
    );

    if positionals.len() > declared.len() {
        errors.push(ArgumentError::TooManyArguments);
    }

    let arguments: Vec<_> = declared
        .iter()
        .enumerate()
        .filter_map(|(index, argument)| {
            let value = match positionals.get(index) {
                Some(token) => coerce(token, &argument.spec().value_type, argument.name())
                    .map_err(|err| errors.push(err))
                    .ok()?,
                None => argument.default()?.clone(),
            };

            Some((argument.name().to_owned(), value))
        })
        .collect();

    let options = match entry.options() {
        None => {
            if !options.is_empty() {
                errors.push(ArgumentError::UnexpectedOptions(
                    options.iter().map(|option| option.flag.clone()).collect(),
                ));
            }

            None
        }
        Some(set) => {
            let mut value = set.instantiate();

            errors.extend(options.iter().filter_map(|option| {
                set.apply(&mut value, &option.flag, option.value.as_deref())
                    .err()
            }));

            Some(value)
        }
    };

    debug!(path = %entry.path(), errors = errors.len(), "dispatched");

    match errors.is_empty() {
        true => Ok(Invocation::new(entry.path().clone(), arguments, options)),
        false => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entry::{ArgumentSpec, EntryPointDecl},
        options::{OptionRegistry, OptionSetDecl, OptionSpec},
        tree::CommandPath,
        value::{EnumType, IntKind, Value, ValueType},
    };

    fn build_entry(with_options: bool) -> EntryPoint {
        let decl = EntryPointDecl::new("build", |_| Ok(()))
            .argument(ArgumentSpec::new("name", ValueType::String))
            .argument(ArgumentSpec::new("count", ValueType::Int(IntKind::I32)).default("1"));

        if !with_options {
            return EntryPoint::build(decl, CommandPath::parse("build").unwrap(), None).unwrap();
        }

        let mut registry = OptionRegistry::new();
        registry
            .declare(
                OptionSetDecl::new("build")
                    .option(OptionSpec::flag("--verbose").short('v'))
                    .option(OptionSpec::flag("--cache").default("true"))
                    .option(OptionSpec::value(
                        "--level",
                        ValueType::Enum(EnumType::new("Level", ["LOW", "HIGH"])),
                    )),
            )
            .unwrap();

        EntryPoint::build(
            decl.options("build"),
            CommandPath::parse("build").unwrap(),
            Some(registry.build("build").unwrap()),
        )
        .unwrap()
    }

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|&token| token.to_owned()).collect()
    }

    fn flag(flag: &str) -> RawOption {
        RawOption {
            flag: flag.to_owned(),
            value: None,
        }
    }

    #[test]
    fn defaults_back_fill_missing_arguments() {
        let entry = build_entry(true);
        let invocation = dispatch(&entry, &strings(&["proj"]), &[flag("-v")]).unwrap();

        assert_eq!(
            invocation.arguments(),
            [
                ("name".to_owned(), Value::String("proj".to_owned())),
                ("count".to_owned(), Value::Integer(1)),
            ]
        );
        assert!(invocation.flag("--verbose"));
    }

    #[test]
    fn boolean_flags_toggle_their_default() {
        let entry = build_entry(true);

        let once = dispatch(&entry, &strings(&["p"]), &[flag("--cache")]).unwrap();
        assert!(!once.flag("--cache"));

        let twice = dispatch(&entry, &strings(&["p"]), &[flag("--cache"), flag("--cache")]).unwrap();
        assert!(twice.flag("--cache"));
    }

    #[test]
    fn every_problem_is_reported() {
        let entry = build_entry(true);
        let errors = dispatch(
            &entry,
            &strings(&["proj", "many"]),
            &[
                flag("--nope"),
                RawOption {
                    flag: "--level".to_owned(),
                    value: Some("loud".to_owned()),
                },
            ],
        )
        .unwrap_err();

        assert_eq!(
            errors,
            [
                ArgumentError::ExpectedInteger {
                    name: "count".to_owned(),
                    token: "many".to_owned()
                },
                ArgumentError::UnknownOption("--nope".to_owned()),
                ArgumentError::ExpectedMember {
                    name: "--level".to_owned(),
                    token: "loud".to_owned(),
                    members: "LOW|HIGH".to_owned()
                },
            ]
        );
    }

    #[test]
    fn missing_required_argument() {
        let entry = build_entry(false);
        let errors = dispatch(&entry, &[], &[]).unwrap_err();

        assert_eq!(errors, [ArgumentError::MissingArgument("name".to_owned())]);
    }

    #[test]
    fn too_many_arguments_is_a_single_error() {
        let entry = build_entry(false);
        let errors = dispatch(&entry, &strings(&["proj", "5", "extra"]), &[]).unwrap_err();

        assert_eq!(errors, [ArgumentError::TooManyArguments]);
    }

    #[test]
    fn options_without_an_option_set() {
        let entry = build_entry(false);
        let errors = dispatch(&entry, &strings(&["proj"]), &[flag("-v"), flag("--x")]).unwrap_err();

        assert_eq!(
            errors,
            [ArgumentError::UnexpectedOptions(vec![
                "-v".to_owned(),
                "--x".to_owned()
            ])]
        );
    }

    #[test]
    fn handler_reads_typed_values() {
        let entry = build_entry(true);
        let invocation = dispatch(
            &entry,
            &strings(&["proj", "4"]),
            &[RawOption {
                flag: "--level".to_owned(),
                value: Some("high".to_owned()),
            }],
        )
        .unwrap();

        assert_eq!(invocation.get::<i32>("count"), Ok(4));
        assert_eq!(invocation.get::<String>("--level"), Ok("HIGH".to_owned()));
    }
}
