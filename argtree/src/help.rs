/*!
Usage and help text. Everything here is rendered from the same metadata the
resolver and dispatcher use, and the output is deterministic: children are
listed in sorted order, and options in declaration order with nested sets
after the set's own options.

```text
Usage: prog (--verbose) (--jobs) build <name> [count]
Build a project

Arguments:
  name (string) - project to build
  count (i32)   - how many times [default: 1]

Options:
  --verbose (-v)  - print more
  --jobs (-j) <n> - parallel jobs [default: 4]
```
 */

use std::{fmt::Display, io};

use indent_write::io::IndentWriter;
use joinery::JoinableIterator;
use lazy_format::lazy_format;
use textwrap::core::display_width;

use crate::{
    cli::Settings,
    entry::{ArgumentDef, EntryPoint},
    options::OptionSet,
    tree::{CommandNode, CommandTree},
    value::Value,
};

/// Section bodies are indented by this much
const INDENT: &str = "  ";

/// Entry points with more options than this abbreviate them in the synopsis
const MAX_INLINE_OPTIONS: usize = 3;

fn option_synopsis(set: &OptionSet) -> impl Display {
    lazy_format!(match (set.len() > MAX_INLINE_OPTIONS) {
        true => " (...options)",
        false => (
            "{}",
            lazy_format!(" ({long})" for long in set.options().map(|option| &option.spec().long))
        ),
    })
}

fn placeholder(argument: &ArgumentDef) -> impl Display {
    let name = argument.name();

    lazy_format!(match (argument.default()) {
        None => " <{name}>",
        Some(_) => " [{name}]",
    })
}

/**
The usage synopsis of an entry point, followed by its help text if it has
any: `Usage: prog (--verbose) build <name> [count]`.
 */
pub fn entry_usage(program: &str, entry: &EntryPoint) -> impl Display {
    let options = lazy_format!(match (entry.options()) {
        None => "",
        Some(set) => ("{}", option_synopsis(set)),
    });

    let path = lazy_format!(match (entry.path().is_root()) {
        true => "",
        false => (" {}", entry.path().words()),
    });

    let arguments = lazy_format!("{item}" for item in entry.arguments().iter().map(placeholder));

    let help = lazy_format!(match (entry.help().is_empty()) {
        true => "",
        false => ("\n{}", entry.help()),
    });

    lazy_format!("Usage: {program}{options}{path}{arguments}{help}")
}

/// The usage of a branch: the path so far, then every child, then a pointer
/// to per-command help.
pub fn branch_usage<'a>(
    program: &'a str,
    consumed: &'a [String],
    node: &'a CommandNode,
) -> impl Display + 'a {
    let path = lazy_format!(" {segment}" for segment in consumed);
    let children = node.child_names().join_with("|");

    lazy_format!("Usage: {program}{path} {children} ...\nUse '{program} --help <cmd>' for help")
}

/// One labeled row of an `Arguments` or `Options` section
struct Row {
    label: String,
    description: String,
}

fn with_default(description: &str, default: Option<&Value>) -> String {
    match (description.is_empty(), default) {
        (_, None) => description.to_owned(),
        (true, Some(default)) => format!("[default: {default}]"),
        (false, Some(default)) => format!("{description} [default: {default}]"),
    }
}

fn argument_row(argument: &ArgumentDef) -> Row {
    let spec = argument.spec();

    Row {
        label: format!("{} ({})", spec.name, spec.value_type),
        description: with_default(&spec.description, argument.default()),
    }
}

fn option_rows(set: &OptionSet) -> Vec<Row> {
    set.options()
        .map(|option| {
            let spec = option.spec();

            let short = lazy_format!(match (spec.short) {
                None => "",
                Some(alias) => " (-{alias})",
            });

            let value = lazy_format!(match (spec.takes_argument()) {
                true => (" <{}>", spec.value_name),
                false => "",
            });

            // Boolean defaults aren't interesting; every occurrence toggles
            let default = option.default().filter(|_| spec.takes_argument());

            Row {
                label: format!("{}{short}{value}", spec.long),
                description: with_default(&spec.description, default),
            }
        })
        .collect()
}

/**
Print a complete help message for an entry point: its usage, then one row
per argument, then one row per option.
 */
pub fn print_entry_help(
    out: &mut impl io::Write,
    program: &str,
    entry: &EntryPoint,
    settings: &Settings,
) -> io::Result<()> {
    writeln!(out, "{}", entry_usage(program, entry))?;

    let arguments: Vec<Row> = entry.arguments().iter().map(argument_row).collect();
    print_rows(out, "Arguments", &arguments, settings)?;

    match entry.options() {
        None => Ok(()),
        Some(set) => print_rows(out, "Options", &option_rows(set), settings),
    }
}

/// Print the help for the root of the tree: the program documentation, then
/// either the root entry point's help or the top-level branch usage.
pub fn print_root_help(
    out: &mut impl io::Write,
    program: &str,
    doc: &str,
    tree: &CommandTree,
    settings: &Settings,
) -> io::Result<()> {
    if !doc.is_empty() {
        writeln!(out, "{doc}")?;
    }

    match tree.root().entry_point() {
        Some(entry) => print_entry_help(out, program, entry, settings),
        None => writeln!(out, "{}", branch_usage(program, &[], tree.root())),
    }
}

fn print_rows(
    out: &mut impl io::Write,
    header: &str,
    rows: &[Row],
    settings: &Settings,
) -> io::Result<()> {
    let width = rows
        .iter()
        .map(|row| display_width(&row.label))
        .max()
        .unwrap_or(0)
        .min(settings.max_label_width);

    let wrap_width = settings.wrap_width.saturating_sub(INDENT.len());

    maybe_section(out, header, rows, |out, row| {
        describe(out, row, width, wrap_width)
    })
}

/// Write a section by writing a newline, then the `header`, then an
/// indented `body`.
fn section<O: io::Write + ?Sized, T>(
    out: &mut O,
    header: &str,
    body: impl FnOnce(IndentWriter<&mut O>) -> io::Result<T>,
) -> io::Result<T> {
    writeln!(out, "\n{header}:")?;
    body(IndentWriter::new(INDENT, out))
}

/// Write an optional section, only if the iterator is not empty.
/// Otherwise identical to `section`.
fn maybe_section<O: io::Write + ?Sized, I: IntoIterator>(
    out: &mut O,
    header: &str,
    items: I,
    body: impl Fn(&mut IndentWriter<&mut O>, I::Item) -> io::Result<()>,
) -> io::Result<()> {
    let mut items = items.into_iter();

    match items.next() {
        None => Ok(()),
        Some(first) => section(out, header, |mut out| {
            body(&mut out, first)?;
            items.try_for_each(|item| body(&mut out, item))
        }),
    }
}

/**
Describe a row by printing its label padded to `width`, then ` - ` and the
description, wrapped to `wrap_width` with a hanging indent. A label wider
than `width` gets a line of its own, and the description starts on the
next line at the hanging indent.
 */
fn describe(
    out: &mut (impl io::Write + ?Sized),
    row: &Row,
    width: usize,
    wrap_width: usize,
) -> io::Result<()> {
    if row.description.is_empty() {
        return writeln!(out, "{}", row.label);
    }

    let hanging = " ".repeat(width + 3);
    let label_width = display_width(&row.label);

    let first = match label_width.checked_sub(width) {
        Some(0) | None => {
            let padding = " ".repeat(width - label_width.min(width));
            format!("{}{padding} - ", row.label)
        }
        Some(_) => {
            writeln!(out, "{}", row.label)?;
            format!("{} - ", " ".repeat(width))
        }
    };

    let options = textwrap::Options::new(wrap_width)
        .initial_indent(&first)
        .subsequent_indent(&hanging);

    writeln!(out, "{}", textwrap::fill(&row.description, options))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        entry::{ArgumentSpec, EntryPointDecl},
        options::{OptionRegistry, OptionSetDecl, OptionSpec},
        tree::CommandPath,
        value::{EnumType, IntKind, ValueType},
    };

    fn build_options(specs: impl IntoIterator<Item = OptionSpec>) -> Arc<OptionSet> {
        let mut registry = OptionRegistry::new();
        let decl = specs
            .into_iter()
            .fold(OptionSetDecl::new("opts"), OptionSetDecl::option);
        registry.declare(decl).unwrap();
        registry.build("opts").unwrap()
    }

    fn build_entry() -> EntryPoint {
        let options = build_options([
            OptionSpec::flag("--verbose")
                .short('v')
                .description("print more"),
            OptionSpec::value("--jobs", ValueType::Int(IntKind::U8))
                .short('j')
                .value_name("n")
                .default("4")
                .description("parallel jobs"),
        ]);

        let decl = EntryPointDecl::new("build", |_| Ok(()))
            .help("Build a project")
            .argument(ArgumentSpec::new("name", ValueType::String).description("project to build"))
            .argument(
                ArgumentSpec::new("count", ValueType::Int(IntKind::I32))
                    .default("1")
                    .description("how many times"),
            )
            .options("opts");

        EntryPoint::build(decl, CommandPath::parse("build").unwrap(), Some(options)).unwrap()
    }

    fn render(print: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        print(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn entry_usage_synopsis() {
        let entry = build_entry();
        assert_eq!(
            entry_usage("prog", &entry).to_string(),
            "Usage: prog (--verbose) (--jobs) build <name> [count]\nBuild a project"
        );
    }

    #[test]
    fn many_options_are_abbreviated() {
        let options = build_options(["--a", "--b", "--c", "--d"].map(OptionSpec::flag));
        let decl = EntryPointDecl::new(CommandPath::ROOT, |_| Ok(())).options("opts");
        let entry = EntryPoint::build(decl, CommandPath::root(), Some(options)).unwrap();

        assert_eq!(entry_usage("prog", &entry).to_string(), "Usage: prog (...options)");
    }

    #[test]
    fn branch_usage_lists_sorted_children() {
        let mut tree = CommandTree::new();
        for path in ["remote remove", "remote add", "remote show"] {
            let decl = EntryPointDecl::new(path, |_| Ok(()));
            tree.declare(EntryPoint::build(decl, CommandPath::parse(path).unwrap(), None).unwrap())
                .unwrap();
        }

        let consumed = ["remote".to_owned()];
        let node = tree.find(&CommandPath::parse("remote").unwrap()).unwrap();

        assert_eq!(
            branch_usage("git", &consumed, node).to_string(),
            "Usage: git remote add|remove|show ...\nUse 'git --help <cmd>' for help"
        );
        assert_eq!(
            branch_usage("git", &[], tree.root()).to_string(),
            "Usage: git remote ...\nUse 'git --help <cmd>' for help"
        );
    }

    #[test]
    fn entry_help_aligns_rows() {
        let entry = build_entry();
        let text = render(|out| print_entry_help(out, "prog", &entry, &Settings::default()));

        assert_eq!(
            text,
            "Usage: prog (--verbose) (--jobs) build <name> [count]\n\
            Build a project\n\
            \n\
            Arguments:\n\
            \x20 name (string) - project to build\n\
            \x20 count (i32)   - how many times [default: 1]\n\
            \n\
            Options:\n\
            \x20 --verbose (-v)  - print more\n\
            \x20 --jobs (-j) <n> - parallel jobs [default: 4]\n"
        );
    }

    #[test]
    fn enum_arguments_show_their_members() {
        let decl = EntryPointDecl::new("set", |_| Ok(())).argument(ArgumentSpec::new(
            "level",
            ValueType::Enum(EnumType::new("Level", ["LOW", "HIGH"])),
        ));
        let entry = EntryPoint::build(decl, CommandPath::parse("set").unwrap(), None).unwrap();
        let text = render(|out| print_entry_help(out, "prog", &entry, &Settings::default()));

        assert_eq!(
            text,
            "Usage: prog set <level>\n\nArguments:\n  level (LOW|HIGH)\n"
        );
    }

    #[test]
    fn wide_labels_get_a_hanging_indent() {
        let entry = build_entry();
        let settings = Settings {
            max_label_width: 10,
            ..Settings::default()
        };
        let text = render(|out| print_entry_help(out, "prog", &entry, &settings));

        assert!(text.contains("  name (string)\n             - project to build\n"));
    }

    #[test]
    fn long_descriptions_wrap_under_the_description_column() {
        let decl = EntryPointDecl::new("x", |_| Ok(())).argument(
            ArgumentSpec::new("file", ValueType::Path)
                .description("the file that will be read, parsed, checked and then written back"),
        );
        let entry = EntryPoint::build(decl, CommandPath::parse("x").unwrap(), None).unwrap();
        let settings = Settings {
            wrap_width: 40,
            ..Settings::default()
        };
        let text = render(|out| print_entry_help(out, "prog", &entry, &settings));

        let rows: Vec<&str> = text
            .lines()
            .skip_while(|line| *line != "Arguments:")
            .skip(1)
            .collect();

        assert!(rows.len() > 1);
        assert!(rows[0].starts_with("  file (path) - the file"));
        assert!(rows[1..].iter().all(|row| row.starts_with("                ")));
        assert!(rows.iter().all(|row| row.len() <= 40));
    }
}
